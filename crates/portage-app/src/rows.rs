// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

use crate::model::{HistoryEntry, SshProfile, Tunnel, TunnelId, TunnelKind, readable_age};

/// Descriptions longer than this render truncated; the record keeps the
/// full text and editing re-reads the record, never the row.
pub const DESCRIPTION_DISPLAY_MAX: usize = 40;

/// One table row as displayed. `tunnel_id` is the hidden correlation field
/// for tunnel rows; it never participates in filtering or width math.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub columns: Vec<String>,
    pub tunnel_id: Option<TunnelId>,
}

impl DisplayRow {
    pub fn plain(columns: Vec<String>) -> Self {
        Self {
            columns,
            tunnel_id: None,
        }
    }

    pub fn with_id(columns: Vec<String>, id: TunnelId) -> Self {
        Self {
            columns,
            tunnel_id: Some(id),
        }
    }

    /// The lowercased haystack the filter engine matches against.
    pub fn filter_text(&self) -> String {
        self.columns.join(" ").to_lowercase()
    }
}

pub fn tunnel_to_row(tunnel: &Tunnel) -> DisplayRow {
    let remote = if tunnel.kind == TunnelKind::Dynamic {
        "-".to_owned()
    } else {
        format!(
            "{}:{}",
            tunnel.remote_host.as_deref().unwrap_or_default(),
            tunnel.remote_port.unwrap_or_default()
        )
    };
    DisplayRow::with_id(
        vec![
            tunnel.name.clone(),
            tunnel.kind.as_str().to_owned(),
            tunnel.local_port.to_string(),
            remote,
            truncate_description(&tunnel.description),
        ],
        tunnel.id.clone(),
    )
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_DISPLAY_MAX {
        let head: String = description.chars().take(DESCRIPTION_DISPLAY_MAX - 3).collect();
        format!("{head}...")
    } else {
        description.to_owned()
    }
}

pub fn config_to_row(profile: &SshProfile) -> DisplayRow {
    DisplayRow::plain(vec![
        profile.name.clone(),
        profile.host.clone(),
        profile.port.clone(),
        profile.user.clone(),
        profile.key.clone(),
    ])
}

pub fn history_to_row(now: OffsetDateTime, entry: &HistoryEntry) -> DisplayRow {
    DisplayRow::plain(vec![
        entry.profile.name.clone(),
        entry.profile.host.clone(),
        entry.profile.port.clone(),
        entry.profile.user.clone(),
        entry.profile.key.clone(),
        readable_age(now - entry.timestamp),
    ])
}

/// Rebuilds the profile a config or history row was projected from.
pub fn profile_from_row(row: &DisplayRow) -> SshProfile {
    let column = |index: usize| row.columns.get(index).cloned().unwrap_or_default();
    SshProfile {
        name: column(0),
        host: column(1),
        port: column(2),
        user: column(3),
        key: column(4),
    }
}
