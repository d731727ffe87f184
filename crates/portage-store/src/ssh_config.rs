// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::path::PathBuf;

use portage_app::{SshProfile, StoreError};

use crate::read_store_file;

/// Read-only view over the user's `~/.ssh/config`. Only concrete `Host`
/// aliases surface; wildcard patterns are skipped.
#[derive(Debug, Clone)]
pub struct SshConfigStore {
    path: PathBuf,
}

impl SshConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn open_default() -> Result<Self, StoreError> {
        let home = dirs::home_dir().ok_or_else(|| StoreError::Io {
            path: PathBuf::from("~"),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cannot resolve home directory",
            ),
        })?;
        Ok(Self::new(home.join(".ssh").join("config")))
    }

    pub fn fetch_all(&self) -> Result<Vec<SshProfile>, StoreError> {
        match read_store_file(&self.path)? {
            None => Ok(Vec::new()),
            Some(raw) => Ok(parse_config(&raw)),
        }
    }

    /// Case-insensitive substring match on the alias name.
    pub fn search(&self, term: &str) -> Result<Vec<SshProfile>, StoreError> {
        let needle = term.to_lowercase();
        Ok(self
            .fetch_all()?
            .into_iter()
            .filter(|profile| profile.name.to_lowercase().contains(&needle))
            .collect())
    }
}

fn parse_config(raw: &str) -> Vec<SshProfile> {
    let mut profiles: Vec<SshProfile> = Vec::new();
    // Indices of the profiles the current Host block declares; one Host
    // line can list several aliases.
    let mut current: Vec<usize> = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((keyword, value)) = line.split_once([' ', '\t', '=']) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match keyword.to_ascii_lowercase().as_str() {
            "host" => {
                current.clear();
                for pattern in value.split_whitespace() {
                    if pattern.contains(['*', '?', '!']) {
                        continue;
                    }
                    profiles.push(SshProfile {
                        name: pattern.to_owned(),
                        ..SshProfile::default()
                    });
                    current.push(profiles.len() - 1);
                }
            }
            "hostname" => {
                for index in &current {
                    profiles[*index].host = value.to_owned();
                }
            }
            "user" => {
                for index in &current {
                    profiles[*index].user = value.to_owned();
                }
            }
            "port" => {
                for index in &current {
                    profiles[*index].port = value.to_owned();
                }
            }
            "identityfile" => {
                for index in &current {
                    profiles[*index].key = value.to_owned();
                }
            }
            _ => {}
        }
    }

    profiles
}
