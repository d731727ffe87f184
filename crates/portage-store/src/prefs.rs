// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::path::PathBuf;

use portage_app::{Preferences, StoreError};

use crate::{data_dir, parse_error, read_store_file, write_store_file};

pub const SETTINGS_FILE: &str = "settings.json";

/// Display preferences. Loading never fails: a missing or unreadable file
/// just yields the defaults, and saves are best effort at the call sites.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(data_dir()?.join(SETTINGS_FILE)))
    }

    pub fn load(&self) -> Preferences {
        read_store_file(&self.path)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, preferences: Preferences) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&preferences)
            .map_err(|error| parse_error(&self.path, error))?;
        write_store_file(&self.path, &raw)
    }
}
