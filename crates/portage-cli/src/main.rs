// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod runtime;
mod ssh;

use anyhow::{Context, Result};
use portage_app::{
    DisplayRow, Outcome, TableProfile, TableSession, config_to_row, format_tunnels_summary,
    history_to_row, tunnel_to_row, tunnels_to_ssh_args,
};
use portage_store::{HistoryStore, PreferenceStore, SshConfigStore, TunnelStore};
use runtime::StoreRuntime;
use std::env;
use time::OffsetDateTime;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    ssh::ensure_ssh_available()?;

    match parse_cli_args(env::args().skip(1)) {
        Command::HistoryPicker => {
            if let Some(args) = pick_history()? {
                ssh::run_ssh(&args)?;
            }
        }
        Command::ConfigPicker { term } => {
            if let Some(args) = pick_config(term.as_deref())? {
                ssh::run_ssh(&args)?;
            }
        }
        Command::ListHistory => list_history()?,
        Command::ListConfig => list_config()?,
        Command::ListTunnels => list_tunnels()?,
        Command::TunnelManager => manage_tunnels()?,
        Command::TunnelsForConnection => connect_with_tunnels()?,
        Command::Version => println!("portage {}", env!("CARGO_PKG_VERSION")),
        Command::Help => print_help(),
        Command::Passthrough(args) => passthrough(args)?,
    }
    Ok(())
}

/// Runs the history picker. Returns the ssh arguments for the chosen
/// destination, or `None` when there was nothing to pick or the user
/// backed out.
fn pick_history() -> Result<Option<Vec<String>>> {
    let history = HistoryStore::open_default()?;
    let entries = history.fetch_all()?;
    if entries.is_empty() {
        println!("No history found.");
        return Ok(None);
    }

    let preferences = PreferenceStore::open_default()?.load();
    let mut session = TableSession::history(OffsetDateTime::now_utc(), &entries, preferences);
    let mut runtime = StoreRuntime::open_default()?;
    portage_tui::run_picker(&mut session, &mut runtime)?;

    match session.outcome() {
        Some(Outcome::Profile(profile)) => {
            let profile = profile.clone();
            // Reconnecting bumps the entry back to the top of the list.
            history.append(profile.clone())?;
            Ok(Some(profile.launch_args()))
        }
        _ => Ok(None),
    }
}

/// Runs the client-config picker, optionally narrowed to aliases matching
/// `term` before the table opens.
fn pick_config(term: Option<&str>) -> Result<Option<Vec<String>>> {
    let store = SshConfigStore::open_default()?;
    let profiles = match term {
        Some(term) => store.search(term)?,
        None => store.fetch_all()?,
    };
    if profiles.is_empty() {
        println!("No config found.");
        return Ok(None);
    }

    let preferences = PreferenceStore::open_default()?.load();
    let mut session = TableSession::config(&profiles, preferences);
    let mut runtime = StoreRuntime::open_default()?;
    portage_tui::run_picker(&mut session, &mut runtime)?;

    match session.outcome() {
        Some(Outcome::Profile(profile)) => {
            let profile = profile.clone();
            HistoryStore::open_default()?.append(profile.clone())?;
            Ok(Some(profile.launch_args()))
        }
        _ => Ok(None),
    }
}

/// The standalone tunnel manager: create, edit and delete records. Any
/// selection made on exit is deliberately discarded.
fn manage_tunnels() -> Result<()> {
    let store = TunnelStore::open_default()?;
    let records = store.fetch_all()?;
    let preferences = PreferenceStore::open_default()?.load();

    // Opens even when empty so `n` can create the first record.
    let mut session = TableSession::tunnels(records, preferences, true);
    let mut runtime = StoreRuntime::open_default()?;
    portage_tui::run_picker(&mut session, &mut runtime)
}

/// The `-t` flow: pick tunnels, pick a destination from history, then
/// launch ssh with the forwarding arguments prepended.
fn connect_with_tunnels() -> Result<()> {
    let store = TunnelStore::open_default()?;
    let records = store.fetch_all()?;
    if records.is_empty() {
        println!("No tunnels found.");
        return Ok(());
    }

    let preferences = PreferenceStore::open_default()?.load();
    let mut session = TableSession::tunnels(records, preferences, true);
    let mut runtime = StoreRuntime::open_default()?;
    portage_tui::run_picker(&mut session, &mut runtime)?;

    let tunnels = session.committed_tunnels();
    if tunnels.is_empty() {
        return Ok(());
    }

    let Some(destination) = pick_history()? else {
        return Ok(());
    };

    let ids: Vec<_> = tunnels.iter().map(|tunnel| tunnel.id.clone()).collect();
    // Best effort: a failed bump never blocks the connection.
    let _ = store.bump_last_used(&ids);

    println!("{}", format_tunnels_summary(&tunnels));
    println!();

    let mut args = tunnels_to_ssh_args(&tunnels).context("build tunnel arguments")?;
    args.extend(destination);
    ssh::run_ssh(&args)
}

/// Any argument shape we do not recognize belongs to ssh. The connection
/// still lands in history when a destination can be made out.
fn passthrough(args: Vec<String>) -> Result<()> {
    if let Some(profile) = ssh::profile_from_args(&args) {
        let _ = HistoryStore::open_default().and_then(|history| history.append(profile));
    }
    ssh::run_ssh(&args)
}

fn list_history() -> Result<()> {
    let entries = HistoryStore::open_default()?.fetch_all()?;
    if entries.is_empty() {
        println!("No history found.");
        return Ok(());
    }
    let now = OffsetDateTime::now_utc();
    let rows: Vec<_> = entries
        .iter()
        .map(|entry| history_to_row(now, entry))
        .collect();
    print_rows(TableProfile::History, &rows);
    Ok(())
}

fn list_config() -> Result<()> {
    let profiles = SshConfigStore::open_default()?.fetch_all()?;
    if profiles.is_empty() {
        println!("No config found.");
        return Ok(());
    }
    let rows: Vec<_> = profiles.iter().map(config_to_row).collect();
    print_rows(TableProfile::Config, &rows);
    Ok(())
}

fn list_tunnels() -> Result<()> {
    let records = TunnelStore::open_default()?.fetch_all()?;
    if records.is_empty() {
        println!("No tunnels found.");
        return Ok(());
    }
    let rows: Vec<_> = records.iter().map(tunnel_to_row).collect();
    print_rows(TableProfile::Tunnel, &rows);
    Ok(())
}

/// Plain column listing for the non-interactive flags, padded to the same
/// base widths the table uses.
fn print_rows(profile: TableProfile, rows: &[DisplayRow]) {
    let widths = profile.base_widths();
    println!("{}", format_row(profile.titles(), widths));
    for row in rows {
        println!("{}", format_row(&row.columns, widths));
    }
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[u16]) -> String {
    let mut line = String::new();
    for (cell, width) in cells.iter().zip(widths) {
        let width = *width as usize + 2;
        line.push_str(&format!("{:<width$}", cell.as_ref()));
    }
    line.trim_end().to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    HistoryPicker,
    ConfigPicker { term: Option<String> },
    ListHistory,
    ListConfig,
    ListTunnels,
    TunnelManager,
    TunnelsForConnection,
    Version,
    Help,
    Passthrough(Vec<String>),
}

/// Argument dispatch. Unknown shapes are never errors here; they pass
/// through to ssh untouched.
fn parse_cli_args<I, S>(args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<String> = args
        .into_iter()
        .map(|arg| arg.as_ref().to_owned())
        .collect();

    match args.as_slice() {
        [] => return Command::HistoryPicker,
        [only] => match only.as_str() {
            "-" => return Command::ConfigPicker { term: None },
            "-t" => return Command::TunnelsForConnection,
            "tunnels" => return Command::TunnelManager,
            "--history" => return Command::ListHistory,
            "--config" => return Command::ListConfig,
            "--tunnels" => return Command::ListTunnels,
            "-v" | "--version" | "version" => return Command::Version,
            "-h" | "--help" => return Command::Help,
            _ => {}
        },
        [dash, rest @ ..] if dash == "-" => {
            return Command::ConfigPicker {
                term: Some(rest.join(" ")),
            };
        }
        _ => {}
    }
    Command::Passthrough(args)
}

fn print_help() {
    println!("portage -- ssh with a memory");
    println!("  portage                  Pick a destination from connection history");
    println!("  portage -                Pick a destination from ~/.ssh/config");
    println!("  portage - <term>         Config picker narrowed to matching aliases");
    println!("  portage -t               Pick tunnels, then a destination, and connect");
    println!("  portage tunnels          Manage saved tunnels");
    println!("  portage --history        List connection history");
    println!("  portage --config         List ~/.ssh/config entries");
    println!("  portage --tunnels        List saved tunnels");
    println!("  portage --version        Show version");
    println!("  portage <ssh args>       Pass through to ssh and record the connection");
}

#[cfg(test)]
mod tests {
    use super::{Command, format_row, parse_cli_args};
    use portage_app::{TableProfile, tunnel_to_row};
    use portage_testkit::SshFaker;

    #[test]
    fn parse_cli_args_defaults_to_the_history_picker() {
        assert_eq!(
            parse_cli_args(Vec::<String>::new()),
            Command::HistoryPicker
        );
    }

    #[test]
    fn parse_cli_args_maps_the_single_flag_forms() {
        assert_eq!(
            parse_cli_args(vec!["-"]),
            Command::ConfigPicker { term: None }
        );
        assert_eq!(parse_cli_args(vec!["-t"]), Command::TunnelsForConnection);
        assert_eq!(parse_cli_args(vec!["tunnels"]), Command::TunnelManager);
        assert_eq!(parse_cli_args(vec!["--history"]), Command::ListHistory);
        assert_eq!(parse_cli_args(vec!["--config"]), Command::ListConfig);
        assert_eq!(parse_cli_args(vec!["--tunnels"]), Command::ListTunnels);
        assert_eq!(parse_cli_args(vec!["-h"]), Command::Help);
    }

    #[test]
    fn parse_cli_args_accepts_all_version_spellings() {
        for spelling in ["-v", "--version", "version"] {
            assert_eq!(parse_cli_args(vec![spelling]), Command::Version);
        }
    }

    #[test]
    fn parse_cli_args_passes_a_search_term_to_the_config_picker() {
        assert_eq!(
            parse_cli_args(vec!["-", "web"]),
            Command::ConfigPicker {
                term: Some("web".to_owned())
            }
        );
        assert_eq!(
            parse_cli_args(vec!["-", "web", "prod"]),
            Command::ConfigPicker {
                term: Some("web prod".to_owned())
            }
        );
    }

    #[test]
    fn parse_cli_args_passes_everything_else_to_ssh() {
        assert_eq!(
            parse_cli_args(vec!["root@example.com", "-p", "2222"]),
            Command::Passthrough(vec![
                "root@example.com".to_owned(),
                "-p".to_owned(),
                "2222".to_owned(),
            ])
        );
        assert_eq!(
            parse_cli_args(vec!["-x"]),
            Command::Passthrough(vec!["-x".to_owned()])
        );
    }

    #[test]
    fn format_row_pads_and_trims() {
        let line = format_row(&["alpha", "b"], &[8, 4]);
        assert_eq!(line, "alpha     b");
    }

    #[test]
    fn listing_cells_line_up_with_the_header() {
        let mut faker = SshFaker::new(5);
        let widths = TableProfile::Tunnel.base_widths();

        let header = format_row(TableProfile::Tunnel.titles(), widths);
        let row = tunnel_to_row(&faker.tunnel());
        let line = format_row(&row.columns, widths);

        // The second column starts right after the padded Name cell.
        let offset = widths[0] as usize + 2;
        assert_eq!(&header[offset..offset + 4], "Type");
        assert!(line[offset..].starts_with(&row.columns[1]));
    }
}
