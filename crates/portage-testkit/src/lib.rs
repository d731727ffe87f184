// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use portage_app::{HistoryEntry, SshProfile, Tunnel, TunnelDraft, TunnelId, TunnelKind};
use std::path::PathBuf;
use time::{Duration, OffsetDateTime};

const HOST_NAMES: [&str; 10] = [
    "staging", "web", "db", "cache", "metrics", "bastion", "ci", "mail", "proxy", "backup",
];

const DOMAINS: [&str; 4] = ["internal", "corp.example", "lab.example", "dmz.example"];

const USERS: [&str; 6] = ["deploy", "ops", "root", "admin", "ubuntu", "git"];

const TUNNEL_SERVICES: [(&str, u16); 8] = [
    ("postgres", 5432),
    ("mysql", 3306),
    ("redis", 6379),
    ("grafana", 3000),
    ("prometheus", 9090),
    ("rabbitmq", 5672),
    ("elastic", 9200),
    ("registry", 5000),
];

const TUNNEL_KINDS: [TunnelKind; 3] = [TunnelKind::Local, TunnelKind::Remote, TunnelKind::Dynamic];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Deterministic sample-data generator for picker and store tests.
#[derive(Debug, Clone)]
pub struct SshFaker {
    rng: DeterministicRng,
    counter: usize,
}

impl SshFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            counter: 0,
        }
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[self.rng.int_n(options.len())]
    }

    fn unique(&mut self) -> usize {
        self.counter += 1;
        self.counter
    }

    pub fn profile(&mut self) -> SshProfile {
        let host = self.pick(&HOST_NAMES);
        let name = format!("{host}{}", self.unique());
        SshProfile {
            host: format!("{name}.{}", self.pick(&DOMAINS)),
            name,
            port: if self.rng.bool() {
                "22".to_owned()
            } else {
                "2222".to_owned()
            },
            user: self.pick(&USERS).to_owned(),
            key: if self.rng.bool() {
                "~/.ssh/id_ed25519".to_owned()
            } else {
                String::new()
            },
        }
    }

    pub fn history_entry(&mut self) -> HistoryEntry {
        let age = Duration::minutes(self.rng.int_n(10_000) as i64);
        HistoryEntry {
            profile: self.profile(),
            timestamp: reference_now() - age,
        }
    }

    pub fn draft(&mut self) -> TunnelDraft {
        let (service, port) = TUNNEL_SERVICES[self.rng.int_n(TUNNEL_SERVICES.len())];
        let kind = TUNNEL_KINDS[self.rng.int_n(TUNNEL_KINDS.len())];
        let name = format!("{service}-{}", self.unique());
        self.draft_for(&name, kind, port)
    }

    pub fn draft_for(&mut self, name: &str, kind: TunnelKind, port: u16) -> TunnelDraft {
        let remote = kind != TunnelKind::Dynamic;
        TunnelDraft {
            name: name.to_owned(),
            kind,
            local_port: port,
            remote_host: remote.then(|| "localhost".to_owned()),
            remote_port: remote.then_some(port),
            bind_address: None,
            description: format!("{name} forward"),
        }
    }

    pub fn tunnel(&mut self) -> Tunnel {
        let draft = self.draft();
        let id = format!("fixture{}", self.unique());
        Tunnel {
            id: TunnelId::new(id),
            name: draft.name,
            description: draft.description,
            kind: draft.kind,
            local_port: draft.local_port,
            remote_host: draft.remote_host,
            remote_port: draft.remote_port,
            bind_address: draft.bind_address,
            created_at: reference_now(),
            last_used: None,
        }
    }
}

/// A temp directory for file-backed stores; dropped with its contents.
pub fn temp_store_dir() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().to_path_buf();
    Ok((dir, path))
}

pub fn reference_now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_771_500_000).expect("valid fixture timestamp")
}

pub fn sample_ssh_config() -> &'static str {
    "\
Host staging
    HostName staging.internal
    User deploy
    Port 2222
    IdentityFile ~/.ssh/staging

Host web1 web2
    HostName web.internal
    User www

Host *
    ForwardAgent yes
"
}
