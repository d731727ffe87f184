// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use portage_app::StoreError;

pub mod history;
pub mod prefs;
pub mod ssh_config;
pub mod tunnels;

pub use history::HistoryStore;
pub use prefs::PreferenceStore;
pub use ssh_config::SshConfigStore;
pub use tunnels::TunnelStore;

pub const APP_NAME: &str = "portage";

/// The per-user data directory, `~/.portage` unless overridden through
/// `PORTAGE_DATA_DIR`. Created lazily by the first write.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    if let Ok(custom) = env::var("PORTAGE_DATA_DIR")
        && !custom.is_empty()
    {
        return Ok(PathBuf::from(custom));
    }
    let home = dirs::home_dir().ok_or_else(|| StoreError::Io {
        path: PathBuf::from("~"),
        source: io::Error::new(
            io::ErrorKind::NotFound,
            "cannot resolve home directory; set PORTAGE_DATA_DIR",
        ),
    })?;
    Ok(home.join(format!(".{APP_NAME}")))
}

/// Reads a store file; a missing or empty file is an empty store, not an
/// error.
pub(crate) fn read_store_file(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => Ok(Some(raw)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source: error,
        }),
    }
}

/// Serializes and replaces the whole file, creating the parent directory on
/// first use.
pub(crate) fn write_store_file(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| StoreError::Io {
            path: parent.to_path_buf(),
            source: error,
        })?;
    }
    fs::write(path, contents).map_err(|error| StoreError::Io {
        path: path.to_path_buf(),
        source: error,
    })
}

pub(crate) fn parse_error(
    path: &Path,
    source: impl std::error::Error + Send + Sync + 'static,
) -> StoreError {
    StoreError::Parse {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}
