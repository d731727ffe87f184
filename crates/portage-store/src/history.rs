// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::path::PathBuf;

use time::OffsetDateTime;

use portage_app::{HistoryEntry, SshProfile, StoreError};

use crate::{data_dir, parse_error, read_store_file, write_store_file};

pub const HISTORY_FILE: &str = "history.json";

/// Connection history: one JSON array, one entry per known destination.
/// Reconnecting to a known destination refreshes its timestamp instead of
/// appending a duplicate.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(data_dir()?.join(HISTORY_FILE)))
    }

    fn load(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        match read_store_file(&self.path)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|error| parse_error(&self.path, error)),
        }
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|error| parse_error(&self.path, error))?;
        write_store_file(&self.path, &raw)
    }

    /// All entries, most recent connection first.
    pub fn fetch_all(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        let mut entries = self.load()?;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    pub fn append(&self, profile: SshProfile) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.retain(|entry| {
            entry.profile.name != profile.name || entry.profile.host != profile.host
        });
        entries.push(HistoryEntry {
            profile,
            timestamp: OffsetDateTime::now_utc(),
        });
        self.save(&entries)
    }

    pub fn remove_by_host(&self, host: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.retain(|entry| entry.profile.host != host);
        self.save(&entries)
    }

    pub fn remove_by_name(&self, name: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.retain(|entry| entry.profile.name != name);
        self.save(&entries)
    }
}
