// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the record and preference stores.
///
/// The first three variants are recoverable from inside a picker session:
/// the form shows them inline and stays open. `Io` and `Parse` mean the
/// backing file itself is unusable and abort the invocation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("a record named {0:?} already exists")]
    DuplicateName(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    /// Whether the error ends the session rather than showing inline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Parse { .. })
    }
}
