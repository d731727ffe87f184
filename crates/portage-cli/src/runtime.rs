// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use portage_app::{Preferences, StoreError, Tunnel, TunnelId, TunnelSubmission};
use portage_store::{HistoryStore, PreferenceStore, TunnelStore};
use portage_tui::PickerRuntime;

/// [`PickerRuntime`] backed by the on-disk stores.
pub struct StoreRuntime {
    tunnels: TunnelStore,
    history: HistoryStore,
    preferences: PreferenceStore,
}

impl StoreRuntime {
    pub fn new(tunnels: TunnelStore, history: HistoryStore, preferences: PreferenceStore) -> Self {
        Self {
            tunnels,
            history,
            preferences,
        }
    }

    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(
            TunnelStore::open_default()?,
            HistoryStore::open_default()?,
            PreferenceStore::open_default()?,
        ))
    }
}

impl PickerRuntime for StoreRuntime {
    fn save_preferences(&mut self, preferences: Preferences) -> Result<(), StoreError> {
        self.preferences.save(preferences)
    }

    fn delete_tunnel(&mut self, id: &TunnelId) -> Result<(), StoreError> {
        self.tunnels.delete(id)
    }

    fn remove_history_by_host(&mut self, host: &str) -> Result<(), StoreError> {
        self.history.remove_by_host(host)
    }

    fn remove_history_by_name(&mut self, name: &str) -> Result<(), StoreError> {
        self.history.remove_by_name(name)
    }

    fn submit_tunnel(&mut self, submission: &TunnelSubmission) -> Result<Vec<Tunnel>, StoreError> {
        match &submission.existing {
            Some(existing) => {
                self.tunnels
                    .update(&existing.id, existing.created_at, submission.draft.clone())?;
            }
            None => {
                self.tunnels.create(submission.draft.clone())?;
            }
        }
        self.tunnels.fetch_all()
    }
}
