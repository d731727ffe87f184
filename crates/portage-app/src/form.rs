// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

use crate::model::{Tunnel, TunnelId, TunnelKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Kind,
    LocalPort,
    RemoteHost,
    RemotePort,
    BindAddress,
    Description,
}

impl FormField {
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Kind,
        Self::LocalPort,
        Self::RemoteHost,
        Self::RemotePort,
        Self::BindAddress,
        Self::Description,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Kind => "Type",
            Self::LocalPort => "Local Port",
            Self::RemoteHost => "Remote Host",
            Self::RemotePort => "Remote Port",
            Self::BindAddress => "Bind Address",
            Self::Description => "Description",
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Name => "my-tunnel",
            Self::Kind => "local/remote/dynamic",
            Self::LocalPort => "8080",
            Self::RemoteHost => "localhost",
            Self::RemotePort => "80",
            Self::BindAddress => "0.0.0.0 (optional)",
            Self::Description => "Tunnel description",
        }
    }

    pub const fn required(self) -> bool {
        matches!(self, Self::Name | Self::Kind | Self::LocalPort)
    }
}

/// Identity carried through an edit: the store preserves both on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingRecord {
    pub id: TunnelId,
    pub created_at: OffsetDateTime,
}

/// A validated form submission, ready for the store to turn into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelDraft {
    pub name: String,
    pub kind: TunnelKind,
    pub local_port: u16,
    pub remote_host: Option<String>,
    pub remote_port: Option<u16>,
    pub bind_address: Option<String>,
    pub description: String,
}

/// The tunnel create/edit form: seven text fields, one focused at a time.
///
/// Validation happens only on submit and reports the first failure as an
/// inline message; editing any field clears the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    values: [String; 7],
    pub focus: usize,
    pub error: Option<String>,
    pub existing: Option<ExistingRecord>,
}

impl FormState {
    pub fn blank() -> Self {
        Self {
            values: Default::default(),
            focus: 0,
            error: None,
            existing: None,
        }
    }

    pub fn for_tunnel(tunnel: &Tunnel) -> Self {
        let mut form = Self::blank();
        form.values = [
            tunnel.name.clone(),
            tunnel.kind.as_str().to_owned(),
            tunnel.local_port.to_string(),
            tunnel.remote_host.clone().unwrap_or_default(),
            tunnel
                .remote_port
                .map(|port| port.to_string())
                .unwrap_or_default(),
            tunnel.bind_address.clone().unwrap_or_default(),
            tunnel.description.clone(),
        ];
        form.existing = Some(ExistingRecord {
            id: tunnel.id.clone(),
            created_at: tunnel.created_at,
        });
        form
    }

    pub fn is_editing(&self) -> bool {
        self.existing.is_some()
    }

    pub fn value(&self, field: FormField) -> &str {
        &self.values[field as usize]
    }

    pub fn focused_field(&self) -> FormField {
        FormField::ALL[self.focus]
    }

    /// Remote host/port rows disappear from the rendered form while the
    /// kind field reads `dynamic`; focus still cycles through them.
    pub fn field_hidden(&self, field: FormField) -> bool {
        matches!(field, FormField::RemoteHost | FormField::RemotePort)
            && self.value(FormField::Kind) == "dynamic"
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FormField::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = if self.focus == 0 {
            FormField::ALL.len() - 1
        } else {
            self.focus - 1
        };
    }

    pub fn push_char(&mut self, c: char) {
        self.values[self.focus].push(c);
        self.error = None;
    }

    pub fn pop_char(&mut self) {
        self.values[self.focus].pop();
        self.error = None;
    }

    /// Validates in fixed order and reports only the first failure.
    pub fn submit(&self) -> Result<TunnelDraft, String> {
        let name = self.value(FormField::Name).trim();
        if name.is_empty() {
            return Err("Name is required".to_owned());
        }

        let kind = TunnelKind::parse(self.value(FormField::Kind).trim())
            .ok_or_else(|| "Type must be 'local', 'remote', or 'dynamic'".to_owned())?;

        let local_raw = self.value(FormField::LocalPort).trim();
        if local_raw.is_empty() {
            return Err("Local port is required".to_owned());
        }
        let local_port = parse_port(local_raw)
            .ok_or_else(|| "Local port must be a number between 1 and 65535".to_owned())?;

        let mut remote_host = None;
        let mut remote_port = None;
        if kind != TunnelKind::Dynamic {
            let host = self.value(FormField::RemoteHost).trim();
            if host.is_empty() {
                return Err(format!(
                    "Remote host is required for {} forwarding",
                    kind.as_str()
                ));
            }
            let remote_raw = self.value(FormField::RemotePort).trim();
            if remote_raw.is_empty() {
                return Err(format!(
                    "Remote port is required for {} forwarding",
                    kind.as_str()
                ));
            }
            remote_host = Some(host.to_owned());
            remote_port = Some(
                parse_port(remote_raw)
                    .ok_or_else(|| "Remote port must be a number between 1 and 65535".to_owned())?,
            );
        }

        let bind = self.value(FormField::BindAddress).trim();
        Ok(TunnelDraft {
            name: name.to_owned(),
            kind,
            local_port,
            remote_host,
            remote_port,
            bind_address: (!bind.is_empty()).then(|| bind.to_owned()),
            description: self.value(FormField::Description).trim().to_owned(),
        })
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.parse::<u16>().ok().filter(|port| *port > 0)
}
