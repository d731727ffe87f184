// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use portage_app::{StoreError, Tunnel, TunnelDraft, TunnelId};

use crate::{data_dir, parse_error, read_store_file, write_store_file};

pub const TUNNELS_FILE: &str = "tunnels.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct TunnelFile {
    #[serde(default)]
    tunnels: Vec<Tunnel>,
}

/// Saved tunnels in a single JSON file. Every read reloads the file and
/// every mutation rewrites it whole; there is no cross-process locking.
#[derive(Debug, Clone)]
pub struct TunnelStore {
    path: PathBuf,
}

impl TunnelStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(data_dir()?.join(TUNNELS_FILE)))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load(&self) -> Result<Vec<Tunnel>, StoreError> {
        match read_store_file(&self.path)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str::<TunnelFile>(&raw)
                .map(|file| file.tunnels)
                .map_err(|error| parse_error(&self.path, error)),
        }
    }

    fn save(&self, tunnels: Vec<Tunnel>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&TunnelFile { tunnels })
            .map_err(|error| parse_error(&self.path, error))?;
        write_store_file(&self.path, &raw)
    }

    /// All tunnels, most recently used first, never-used last, ties broken
    /// by name.
    pub fn fetch_all(&self) -> Result<Vec<Tunnel>, StoreError> {
        let mut tunnels = self.load()?;
        tunnels.sort_by(|a, b| match (&a.last_used, &b.last_used) {
            (Some(left), Some(right)) => right.cmp(left).then_with(|| a.name.cmp(&b.name)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.name.cmp(&b.name),
        });
        Ok(tunnels)
    }

    pub fn fetch_by_id(&self, id: &TunnelId) -> Result<Tunnel, StoreError> {
        self.load()?
            .into_iter()
            .find(|tunnel| tunnel.id == *id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Records for the given ids in store order; unknown ids are skipped.
    pub fn fetch_by_ids(&self, ids: &[TunnelId]) -> Result<Vec<Tunnel>, StoreError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|tunnel| ids.contains(&tunnel.id))
            .collect())
    }

    pub fn fetch_by_name(&self, name: &str) -> Result<Option<Tunnel>, StoreError> {
        Ok(self.load()?.into_iter().find(|tunnel| tunnel.name == name))
    }

    pub fn create(&self, draft: TunnelDraft) -> Result<Tunnel, StoreError> {
        let now = OffsetDateTime::now_utc();
        let tunnel = Tunnel {
            id: generate_id(&draft.name, now),
            name: draft.name,
            description: draft.description,
            kind: draft.kind,
            local_port: draft.local_port,
            remote_host: draft.remote_host,
            remote_port: draft.remote_port,
            bind_address: draft.bind_address,
            created_at: now,
            last_used: None,
        };
        tunnel.validate()?;

        let mut tunnels = self.load()?;
        if tunnels.iter().any(|existing| existing.name == tunnel.name) {
            return Err(StoreError::DuplicateName(tunnel.name));
        }
        tunnels.push(tunnel.clone());
        self.save(tunnels)?;
        Ok(tunnel)
    }

    /// Full-record replace. Identity and creation time are preserved;
    /// `last_used` restarts from scratch, matching create semantics.
    pub fn update(
        &self,
        id: &TunnelId,
        created_at: OffsetDateTime,
        draft: TunnelDraft,
    ) -> Result<Tunnel, StoreError> {
        let tunnel = Tunnel {
            id: id.clone(),
            name: draft.name,
            description: draft.description,
            kind: draft.kind,
            local_port: draft.local_port,
            remote_host: draft.remote_host,
            remote_port: draft.remote_port,
            bind_address: draft.bind_address,
            created_at,
            last_used: None,
        };
        tunnel.validate()?;

        let mut tunnels = self.load()?;
        let index = tunnels
            .iter()
            .position(|existing| existing.id == *id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if tunnels
            .iter()
            .any(|existing| existing.id != *id && existing.name == tunnel.name)
        {
            return Err(StoreError::DuplicateName(tunnel.name));
        }
        tunnels[index] = tunnel.clone();
        self.save(tunnels)?;
        Ok(tunnel)
    }

    pub fn delete(&self, id: &TunnelId) -> Result<(), StoreError> {
        let mut tunnels = self.load()?;
        let before = tunnels.len();
        tunnels.retain(|tunnel| tunnel.id != *id);
        if tunnels.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.save(tunnels)
    }

    /// Stamps every listed tunnel with the same timestamp; unknown ids are
    /// silently ignored.
    pub fn bump_last_used(&self, ids: &[TunnelId]) -> Result<(), StoreError> {
        let now = OffsetDateTime::now_utc();
        let mut tunnels = self.load()?;
        for tunnel in &mut tunnels {
            if ids.contains(&tunnel.id) {
                tunnel.last_used = Some(now);
            }
        }
        self.save(tunnels)
    }
}

fn generate_id(name: &str, now: OffsetDateTime) -> TunnelId {
    let digest = Sha256::digest(format!("{name}{}", now.unix_timestamp_nanos()).as_bytes());
    let mut id = String::with_capacity(12);
    for byte in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut id, "{byte:02x}");
    }
    TunnelId::new(id)
}
