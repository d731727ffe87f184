// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use crate::error::StoreError;

/// Opaque tunnel identifier. Assigned by the store on creation and stable
/// for the lifetime of the record; rows carry it as a hidden field so a
/// display row can always be correlated back to its record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TunnelId(String);

impl TunnelId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TunnelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TunnelKind {
    Local,
    Remote,
    Dynamic,
}

impl TunnelKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Dynamic => "dynamic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "local" => Some(Self::Local),
            "remote" => Some(Self::Remote),
            "dynamic" => Some(Self::Dynamic),
            _ => None,
        }
    }
}

/// A saved SSH port-forwarding configuration.
///
/// `created_at` is set once on creation and survives edits; `last_used` is
/// absent until the tunnel is first applied to a connection and is bumped in
/// batch for every tunnel of that connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tunnel {
    pub id: TunnelId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TunnelKind,
    pub local_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_used: Option<OffsetDateTime>,
}

impl Tunnel {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.is_empty() {
            return Err(StoreError::InvalidRecord(
                "tunnel name cannot be empty".to_owned(),
            ));
        }
        if self.local_port == 0 {
            return Err(StoreError::InvalidRecord(format!(
                "invalid local port: {} (must be 1-65535)",
                self.local_port
            )));
        }
        if matches!(self.kind, TunnelKind::Local | TunnelKind::Remote) {
            if self.remote_host.as_deref().unwrap_or_default().is_empty() {
                return Err(StoreError::InvalidRecord(format!(
                    "{} forwarding requires remote host",
                    self.kind.as_str()
                )));
            }
            match self.remote_port {
                Some(port) if port > 0 => {}
                other => {
                    return Err(StoreError::InvalidRecord(format!(
                        "invalid remote port: {} (must be 1-65535)",
                        other.unwrap_or(0)
                    )));
                }
            }
        }
        Ok(())
    }

    /// The `ssh` argument pair for this forward: `-L`/`-R`
    /// `[bind:]lport:host:rport`, or `-D` `[bind:]port` for dynamic.
    pub fn to_ssh_args(&self) -> Result<Vec<String>, StoreError> {
        self.validate()?;

        let bind = self.bind_address.as_deref().unwrap_or_default();
        let args = match self.kind {
            TunnelKind::Local | TunnelKind::Remote => {
                let flag = if self.kind == TunnelKind::Local {
                    "-L"
                } else {
                    "-R"
                };
                let host = self.remote_host.as_deref().unwrap_or_default();
                let remote_port = self.remote_port.unwrap_or_default();
                let spec = if bind.is_empty() {
                    format!("{}:{}:{}", self.local_port, host, remote_port)
                } else {
                    format!("{}:{}:{}:{}", bind, self.local_port, host, remote_port)
                };
                vec![flag.to_owned(), spec]
            }
            TunnelKind::Dynamic => {
                let spec = if bind.is_empty() {
                    self.local_port.to_string()
                } else {
                    format!("{}:{}", bind, self.local_port)
                };
                vec!["-D".to_owned(), spec]
            }
        };
        Ok(args)
    }

    pub fn display_string(&self) -> String {
        match self.kind {
            TunnelKind::Local => format!(
                "Local: {} -> {}:{}",
                self.local_port,
                self.remote_host.as_deref().unwrap_or_default(),
                self.remote_port.unwrap_or_default()
            ),
            TunnelKind::Remote => format!(
                "Remote: {} -> {}:{}",
                self.local_port,
                self.remote_host.as_deref().unwrap_or_default(),
                self.remote_port.unwrap_or_default()
            ),
            TunnelKind::Dynamic => format!("Dynamic SOCKS: {}", self.local_port),
        }
    }
}

/// Parses a forward argument pair (`"-L 8080:localhost:80"`, `"-D 1080"`,
/// with or without a leading bind address) back into a tunnel skeleton.
/// The result carries no name, identifier or timestamps; callers validate
/// separately when turning it into a stored record.
pub fn parse_forward_arg(flag: &str) -> Result<Tunnel, StoreError> {
    let parts: Vec<&str> = flag.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(StoreError::InvalidRecord(format!(
            "invalid forward format: {flag}"
        )));
    }

    let kind = match parts[0] {
        "-L" => TunnelKind::Local,
        "-R" => TunnelKind::Remote,
        "-D" => TunnelKind::Dynamic,
        other => {
            return Err(StoreError::InvalidRecord(format!(
                "unknown forward flag: {other}"
            )));
        }
    };

    let parse_port = |raw: &str| -> Result<u16, StoreError> {
        raw.parse::<u16>()
            .ok()
            .filter(|port| *port > 0)
            .ok_or_else(|| StoreError::InvalidRecord(format!("invalid port: {raw}")))
    };

    let spec: Vec<&str> = parts[1].split(':').collect();
    let mut tunnel = Tunnel {
        id: TunnelId::new(""),
        name: String::new(),
        description: String::new(),
        kind,
        local_port: 0,
        remote_host: None,
        remote_port: None,
        bind_address: None,
        created_at: OffsetDateTime::UNIX_EPOCH,
        last_used: None,
    };

    if kind == TunnelKind::Dynamic {
        match spec.as_slice() {
            [port] => tunnel.local_port = parse_port(port)?,
            [bind, port] => {
                tunnel.bind_address = Some((*bind).to_owned());
                tunnel.local_port = parse_port(port)?;
            }
            _ => {
                return Err(StoreError::InvalidRecord(format!(
                    "invalid port specification format: {}",
                    parts[1]
                )));
            }
        }
    } else {
        match spec.as_slice() {
            [port, host, remote_port] => {
                tunnel.local_port = parse_port(port)?;
                tunnel.remote_host = Some((*host).to_owned());
                tunnel.remote_port = Some(parse_port(remote_port)?);
            }
            [bind, port, host, remote_port] => {
                tunnel.bind_address = Some((*bind).to_owned());
                tunnel.local_port = parse_port(port)?;
                tunnel.remote_host = Some((*host).to_owned());
                tunnel.remote_port = Some(parse_port(remote_port)?);
            }
            _ => {
                return Err(StoreError::InvalidRecord(format!(
                    "invalid port specification format: {}",
                    parts[1]
                )));
            }
        }
    }

    Ok(tunnel)
}

pub fn tunnels_to_ssh_args(tunnels: &[Tunnel]) -> Result<Vec<String>, StoreError> {
    let mut args = Vec::with_capacity(tunnels.len() * 2);
    for tunnel in tunnels {
        let pair = tunnel.to_ssh_args().map_err(|error| {
            StoreError::InvalidRecord(format!(
                "failed to convert tunnel {:?}: {error}",
                tunnel.name
            ))
        })?;
        args.extend(pair);
    }
    Ok(args)
}

pub fn format_tunnels_summary(tunnels: &[Tunnel]) -> String {
    if tunnels.is_empty() {
        return "No tunnels active".to_owned();
    }

    let mut lines = vec![format!("Active tunnels ({}):", tunnels.len())];
    for tunnel in tunnels {
        let mut line = format!("  - {}: {}", tunnel.name, tunnel.display_string());
        if !tunnel.description.is_empty() {
            line.push_str(&format!(" ({})", tunnel.description));
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// One resolvable SSH destination: either a client-config alias (`name`
/// carries the alias, the rest comes from the config block) or a direct
/// `user@host` connection recorded from raw arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshProfile {
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub key: String,
}

impl SshProfile {
    /// Direct connections are launched by rebuilding the full argument list;
    /// alias entries just pass the alias and let ssh resolve the config.
    pub fn is_direct(&self) -> bool {
        !self.host.is_empty()
            && (self.name.is_empty() || self.name.contains('@') || self.name == self.host)
    }

    pub fn launch_args(&self) -> Vec<String> {
        if !self.is_direct() {
            return vec![self.name.clone()];
        }

        let destination = if self.user.is_empty() {
            self.host.clone()
        } else {
            format!("{}@{}", self.user, self.host)
        };
        let mut args = vec![destination];
        if !self.port.is_empty() && self.port != "22" {
            args.push("-p".to_owned());
            args.push(self.port.clone());
        }
        if !self.key.is_empty() {
            args.push("-i".to_owned());
            args.push(self.key.clone());
        }
        args
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub profile: SshProfile,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Compact age string for the history table's "Last login" column.
pub fn readable_age(age: time::Duration) -> String {
    let seconds = age.whole_seconds().max(0);
    if seconds < 60 {
        format!("{seconds}s ago")
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub fullscreen: bool,
}
