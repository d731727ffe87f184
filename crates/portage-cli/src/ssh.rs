// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use portage_app::SshProfile;
use std::env;
use std::path::PathBuf;
use std::process::Command;

pub fn ensure_ssh_available() -> Result<()> {
    let path = env::var_os("PATH").unwrap_or_default();
    let found = env::split_paths(&path).any(|dir| is_executable(dir.join("ssh")));
    if !found {
        bail!("ssh client not found in PATH");
    }
    Ok(())
}

#[cfg(unix)]
fn is_executable(path: PathBuf) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: PathBuf) -> bool {
    path.is_file()
}

/// Hands the terminal over to ssh and mirrors its exit code.
pub fn run_ssh(args: &[String]) -> Result<()> {
    let status = Command::new("ssh")
        .args(args)
        .status()
        .context("launch ssh")?;
    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}

/// Reconstructs a history profile from raw ssh arguments: the first
/// non-flag argument is the destination, `-p` and `-i` carry port and key.
/// Returns `None` when there is nothing resembling a destination.
pub fn profile_from_args(args: &[String]) -> Option<SshProfile> {
    let mut port = String::new();
    let mut key = String::new();
    let mut destination: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-p" => port = iter.next().cloned().unwrap_or_default(),
            "-i" => key = iter.next().cloned().unwrap_or_default(),
            // Value-carrying flags whose values must not be mistaken for
            // the destination.
            "-L" | "-R" | "-D" | "-o" | "-F" | "-J" | "-l" | "-b" | "-e" | "-c" => {
                let _ = iter.next();
            }
            other if other.starts_with('-') => {}
            other => {
                if destination.is_none() {
                    destination = Some(other.to_owned());
                }
            }
        }
    }

    let destination = destination?;
    let (user, host) = match destination.split_once('@') {
        Some((user, host)) => (user.to_owned(), host.to_owned()),
        None => (String::new(), destination.clone()),
    };
    Some(SshProfile {
        name: destination,
        host,
        port,
        user,
        key,
    })
}

#[cfg(test)]
mod tests {
    use super::profile_from_args;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| (*arg).to_owned()).collect()
    }

    #[test]
    fn destination_with_user_port_and_key() {
        let profile = profile_from_args(&args(&[
            "root@198.51.100.7",
            "-p",
            "2222",
            "-i",
            "~/.ssh/ops",
        ]))
        .expect("profile");
        assert_eq!(profile.name, "root@198.51.100.7");
        assert_eq!(profile.host, "198.51.100.7");
        assert_eq!(profile.user, "root");
        assert_eq!(profile.port, "2222");
        assert_eq!(profile.key, "~/.ssh/ops");
    }

    #[test]
    fn bare_host_has_no_user() {
        let profile = profile_from_args(&args(&["bastion"])).expect("profile");
        assert_eq!(profile.host, "bastion");
        assert_eq!(profile.user, "");
    }

    #[test]
    fn forward_values_are_not_destinations() {
        let profile =
            profile_from_args(&args(&["-L", "8080:localhost:80", "db-host"])).expect("profile");
        assert_eq!(profile.host, "db-host");
    }

    #[test]
    fn flags_only_is_no_profile() {
        assert!(profile_from_args(&args(&["-v", "-p", "22"])).is_none());
        assert!(profile_from_args(&[]).is_none());
    }
}
