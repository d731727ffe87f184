// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use time::OffsetDateTime;

use crate::filter::FilterSet;
use crate::form::{FormState, TunnelDraft};
use crate::layout::{self, TableLayout, TableProfile};
use crate::model::{HistoryEntry, Preferences, SshProfile, Tunnel, TunnelId};
use crate::rows::{self, DisplayRow};

/// Terminal-agnostic input, produced by the driver from raw key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Backspace,
    Enter,
    AltEnter,
    CtrlS,
    CtrlC,
    Esc,
    Tab,
    BackTab,
    Up,
    Down,
    Resize { width: i32, height: i32 },
}

/// Side effects the driver must execute after a transition. The session
/// itself never touches the terminal or the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    EnterAltScreen,
    ExitAltScreen,
    /// Best effort: a failed save never undoes the in-memory flip.
    SavePreferences(Preferences),
    DeleteTunnel(TunnelId),
    RemoveHistoryByHost(String),
    RemoveHistoryByName(String),
    SubmitTunnel(TunnelSubmission),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelSubmission {
    pub draft: TunnelDraft,
    /// Present when editing: the store preserves id and created_at.
    pub existing: Option<crate::form::ExistingRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Browse,
    Filtering,
    FormEditing,
}

/// How the session ended. `Empty` is a committed quit with nothing to act
/// on (the last row was deleted), distinct from a user cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Profile(SshProfile),
    Tunnels(Vec<TunnelId>),
    Empty,
    Cancelled,
}

/// The picker state machine: one table, three modes, an optional form.
///
/// `handle_event` is a pure reducer returning effects; the TUI driver
/// executes them and feeds store results back through
/// [`TableSession::apply_tunnel_deletion`], [`TableSession::set_form_error`]
/// and [`TableSession::finish_form`].
#[derive(Debug, Clone)]
pub struct TableSession {
    profile: TableProfile,
    rows: FilterSet,
    records: Vec<Tunnel>,
    cursor: usize,
    selected: BTreeSet<TunnelId>,
    multi_select: bool,
    mode: SessionMode,
    form: Option<FormState>,
    preferences: Preferences,
    window_width: i32,
    window_height: i32,
    layout: TableLayout,
    outcome: Option<Outcome>,
}

impl TableSession {
    fn new(
        profile: TableProfile,
        rows: Vec<DisplayRow>,
        records: Vec<Tunnel>,
        preferences: Preferences,
    ) -> Self {
        Self {
            layout: TableLayout {
                table_width: 0,
                table_height: 0,
                columns: profile.base_columns(),
            },
            profile,
            rows: FilterSet::new(rows),
            records,
            cursor: 0,
            selected: BTreeSet::new(),
            multi_select: false,
            mode: SessionMode::Browse,
            form: None,
            preferences,
            window_width: 0,
            window_height: 0,
            outcome: None,
        }
    }

    pub fn config(profiles: &[SshProfile], preferences: Preferences) -> Self {
        let rows = profiles.iter().map(rows::config_to_row).collect();
        Self::new(TableProfile::Config, rows, Vec::new(), preferences)
    }

    pub fn history(
        now: OffsetDateTime,
        entries: &[HistoryEntry],
        preferences: Preferences,
    ) -> Self {
        let rows = entries
            .iter()
            .map(|entry| rows::history_to_row(now, entry))
            .collect();
        Self::new(TableProfile::History, rows, Vec::new(), preferences)
    }

    pub fn tunnels(records: Vec<Tunnel>, preferences: Preferences, multi_select: bool) -> Self {
        let rows = records.iter().map(rows::tunnel_to_row).collect();
        let mut session = Self::new(TableProfile::Tunnel, rows, records, preferences);
        session.multi_select = multi_select;
        session
    }

    /// Seeds the filter as if the user had typed `term`, leaving the
    /// session in filtering mode.
    pub fn with_initial_filter(mut self, term: &str) -> Self {
        self.mode = SessionMode::Filtering;
        self.rows.begin();
        for c in term.chars() {
            self.rows.push_char(c);
        }
        self.clamp_cursor();
        self
    }

    pub fn profile(&self) -> TableProfile {
        self.profile
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn visible_rows(&self) -> &[DisplayRow] {
        self.rows.filtered()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn filter_text(&self) -> &str {
        self.rows.filter_text()
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    pub fn columns(&self) -> &[layout::ColumnSpec] {
        &self.layout.columns
    }

    pub fn table_width(&self) -> i32 {
        self.layout.table_width
    }

    /// The raw table area; below the minimum the terminal is too small to
    /// render.
    pub fn table_height(&self) -> i32 {
        self.layout.table_height
    }

    pub fn visible_height(&self) -> i32 {
        layout::visible_table_height(
            self.layout.table_height,
            self.rows.filtered().len(),
            self.preferences.fullscreen,
        )
    }

    pub fn multi_select(&self) -> bool {
        self.multi_select
    }

    pub fn selected_ids(&self) -> &BTreeSet<TunnelId> {
        &self.selected
    }

    pub fn selected_row(&self) -> Option<&DisplayRow> {
        self.rows.filtered().get(self.cursor)
    }

    pub fn records(&self) -> &[Tunnel] {
        &self.records
    }

    /// Maps a committed tunnel outcome back to full records, in store order.
    pub fn committed_tunnels(&self) -> Vec<Tunnel> {
        let Some(Outcome::Tunnels(ids)) = &self.outcome else {
            return Vec::new();
        };
        self.records
            .iter()
            .filter(|record| ids.contains(&record.id))
            .cloned()
            .collect()
    }

    pub fn handle_event(&mut self, event: InputEvent) -> Vec<SessionEffect> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        if let InputEvent::Resize { width, height } = event {
            return self.resize(width, height);
        }
        match self.mode {
            SessionMode::Browse => self.handle_browse(event),
            SessionMode::Filtering => self.handle_filtering(event),
            SessionMode::FormEditing => self.handle_form(event),
        }
    }

    // Resize applies in every mode, form included.
    fn resize(&mut self, width: i32, height: i32) -> Vec<SessionEffect> {
        self.window_width = width;
        self.window_height = height;
        self.layout = layout::adjust_dimensions(self.profile, width, height);
        vec![if self.preferences.fullscreen {
            SessionEffect::EnterAltScreen
        } else {
            SessionEffect::ExitAltScreen
        }]
    }

    fn handle_browse(&mut self, event: InputEvent) -> Vec<SessionEffect> {
        match event {
            InputEvent::Char('/') => {
                self.mode = SessionMode::Filtering;
                self.rows.begin();
                self.clamp_cursor();
                Vec::new()
            }
            InputEvent::Char('d') => self.delete_selected(),
            InputEvent::Char('r') if self.profile == TableProfile::History => {
                self.remove_selected_by_name()
            }
            InputEvent::Char('w') => self.toggle_fullscreen(),
            InputEvent::Char(' ')
                if self.multi_select && self.profile == TableProfile::Tunnel =>
            {
                if let Some(id) = self.selected_row().and_then(|row| row.tunnel_id.clone()) {
                    if !self.selected.remove(&id) {
                        self.selected.insert(id);
                    }
                }
                Vec::new()
            }
            InputEvent::Char('n') if self.profile == TableProfile::Tunnel => {
                self.mode = SessionMode::FormEditing;
                self.form = Some(FormState::blank());
                Vec::new()
            }
            InputEvent::Char('e') if self.profile == TableProfile::Tunnel => {
                // Prefill from the record, not the row: the row's
                // description may be truncated.
                let record = self
                    .selected_row()
                    .and_then(|row| row.tunnel_id.clone())
                    .and_then(|id| self.records.iter().find(|record| record.id == id));
                if let Some(record) = record {
                    self.form = Some(FormState::for_tunnel(record));
                    self.mode = SessionMode::FormEditing;
                }
                Vec::new()
            }
            InputEvent::Char('q') | InputEvent::Esc | InputEvent::CtrlC => {
                self.outcome = Some(Outcome::Cancelled);
                Vec::new()
            }
            InputEvent::Enter => self.commit(),
            InputEvent::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                Vec::new()
            }
            InputEvent::Down => {
                if self.cursor + 1 < self.rows.filtered().len() {
                    self.cursor += 1;
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    // While filtering, every printable character belongs to the needle;
    // 'q' and '/' get no special meaning.
    fn handle_filtering(&mut self, event: InputEvent) -> Vec<SessionEffect> {
        match event {
            InputEvent::Char(c) => {
                self.rows.push_char(c);
                self.clamp_cursor();
            }
            InputEvent::Backspace => {
                self.rows.pop_char();
                self.clamp_cursor();
            }
            InputEvent::Esc | InputEvent::CtrlC => {
                self.mode = SessionMode::Browse;
                self.rows.clear();
                self.clamp_cursor();
            }
            InputEvent::Enter => return self.commit(),
            InputEvent::Up => self.cursor = self.cursor.saturating_sub(1),
            InputEvent::Down => {
                if self.cursor + 1 < self.rows.filtered().len() {
                    self.cursor += 1;
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_form(&mut self, event: InputEvent) -> Vec<SessionEffect> {
        let Some(form) = self.form.as_mut() else {
            self.mode = SessionMode::Browse;
            return Vec::new();
        };
        match event {
            InputEvent::Esc | InputEvent::CtrlC => {
                self.form = None;
                self.mode = SessionMode::Browse;
            }
            InputEvent::Tab | InputEvent::Down | InputEvent::Enter => form.focus_next(),
            InputEvent::BackTab | InputEvent::Up => form.focus_prev(),
            InputEvent::AltEnter | InputEvent::CtrlS => return self.submit_form(),
            InputEvent::Backspace => form.pop_char(),
            InputEvent::Char(c) => form.push_char(c),
            _ => {}
        }
        Vec::new()
    }

    fn submit_form(&mut self) -> Vec<SessionEffect> {
        let Some(form) = self.form.as_mut() else {
            return Vec::new();
        };
        match form.submit() {
            Ok(draft) => vec![SessionEffect::SubmitTunnel(TunnelSubmission {
                draft,
                existing: form.existing.clone(),
            })],
            Err(message) => {
                form.error = Some(message);
                Vec::new()
            }
        }
    }

    fn commit(&mut self) -> Vec<SessionEffect> {
        match self.profile {
            TableProfile::Tunnel => {
                if self.multi_select && !self.selected.is_empty() {
                    // Commit in record order, not toggle order.
                    let ids = self
                        .records
                        .iter()
                        .map(|record| record.id.clone())
                        .filter(|id| self.selected.contains(id))
                        .collect();
                    self.outcome = Some(Outcome::Tunnels(ids));
                } else if let Some(id) =
                    self.selected_row().and_then(|row| row.tunnel_id.clone())
                {
                    // Enter with nothing toggled commits the highlighted
                    // row directly.
                    self.outcome = Some(Outcome::Tunnels(vec![id]));
                }
            }
            TableProfile::Config | TableProfile::History => {
                if let Some(row) = self.selected_row() {
                    self.outcome = Some(Outcome::Profile(rows::profile_from_row(row)));
                }
            }
        }
        Vec::new()
    }

    fn delete_selected(&mut self) -> Vec<SessionEffect> {
        let Some(row) = self.selected_row().cloned() else {
            return Vec::new();
        };
        match self.profile {
            TableProfile::History => {
                // Drop every history row for the same host; the store
                // removal is best effort.
                let Some(host) = row.columns.get(1).cloned() else {
                    return Vec::new();
                };
                self.rows
                    .retain(|candidate| candidate.columns.get(1) != Some(&host));
                self.after_row_removal();
                vec![SessionEffect::RemoveHistoryByHost(host)]
            }
            TableProfile::Tunnel => {
                // Store first; rows go when the driver confirms.
                match row.tunnel_id {
                    Some(id) => vec![SessionEffect::DeleteTunnel(id)],
                    None => Vec::new(),
                }
            }
            TableProfile::Config => Vec::new(),
        }
    }

    fn remove_selected_by_name(&mut self) -> Vec<SessionEffect> {
        let Some(name) = self
            .selected_row()
            .and_then(|row| row.columns.first().cloned())
        else {
            return Vec::new();
        };
        self.rows
            .retain(|candidate| candidate.columns.first() != Some(&name));
        self.after_row_removal();
        vec![SessionEffect::RemoveHistoryByName(name)]
    }

    /// Confirmation callback for [`SessionEffect::DeleteTunnel`].
    pub fn apply_tunnel_deletion(&mut self, id: &TunnelId) {
        self.records.retain(|record| record.id != *id);
        self.rows
            .retain(|candidate| candidate.tunnel_id.as_ref() != Some(id));
        self.selected.remove(id);
        self.after_row_removal();
    }

    /// Inline form failure from [`SessionEffect::SubmitTunnel`].
    pub fn set_form_error(&mut self, message: String) {
        if let Some(form) = self.form.as_mut() {
            form.error = Some(message);
        }
    }

    /// Successful form submission: close the form and reload the table
    /// from the store's view of the records.
    pub fn finish_form(&mut self, records: Vec<Tunnel>) {
        self.form = None;
        self.mode = SessionMode::Browse;
        let rows = records.iter().map(rows::tunnel_to_row).collect();
        self.records = records;
        self.rows = FilterSet::new(rows);
        self.clamp_cursor();
    }

    fn toggle_fullscreen(&mut self) -> Vec<SessionEffect> {
        self.preferences.fullscreen = !self.preferences.fullscreen;
        let screen = if self.preferences.fullscreen {
            SessionEffect::EnterAltScreen
        } else {
            SessionEffect::ExitAltScreen
        };
        vec![SessionEffect::SavePreferences(self.preferences), screen]
    }

    fn after_row_removal(&mut self) {
        self.clamp_cursor();
        if self.rows.filtered().is_empty() {
            self.outcome = Some(Outcome::Empty);
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.rows.filtered().len();
        self.cursor = if len == 0 {
            0
        } else {
            self.cursor.min(len - 1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{InputEvent, Outcome, SessionEffect, SessionMode, TableSession};
    use crate::model::{
        HistoryEntry, Preferences, SshProfile, Tunnel, TunnelId, TunnelKind,
    };
    use time::OffsetDateTime;

    fn profiles() -> Vec<SshProfile> {
        ["alpha", "beta", "gamma"]
            .iter()
            .map(|name| SshProfile {
                name: (*name).to_owned(),
                host: format!("{name}.internal"),
                port: "22".to_owned(),
                user: "ops".to_owned(),
                key: String::new(),
            })
            .collect()
    }

    fn history_entries() -> Vec<HistoryEntry> {
        profiles()
            .into_iter()
            .map(|profile| HistoryEntry {
                profile,
                timestamp: OffsetDateTime::UNIX_EPOCH,
            })
            .collect()
    }

    fn tunnel(id: &str, name: &str) -> Tunnel {
        Tunnel {
            id: TunnelId::new(id),
            name: name.to_owned(),
            description: String::new(),
            kind: TunnelKind::Local,
            local_port: 8080,
            remote_host: Some("localhost".to_owned()),
            remote_port: Some(80),
            bind_address: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            last_used: None,
        }
    }

    fn type_chars(session: &mut TableSession, text: &str) {
        for c in text.chars() {
            session.handle_event(InputEvent::Char(c));
        }
    }

    #[test]
    fn enter_commits_the_highlighted_profile() {
        let mut session = TableSession::config(&profiles(), Preferences::default());
        session.handle_event(InputEvent::Down);
        session.handle_event(InputEvent::Enter);
        match session.outcome() {
            Some(Outcome::Profile(profile)) => assert_eq!(profile.name, "beta"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn cursor_clamps_at_both_ends() {
        let mut session = TableSession::config(&profiles(), Preferences::default());
        session.handle_event(InputEvent::Up);
        assert_eq!(session.cursor(), 0);
        for _ in 0..10 {
            session.handle_event(InputEvent::Down);
        }
        assert_eq!(session.cursor(), 2);
    }

    #[test]
    fn quit_keys_cancel() {
        for key in [InputEvent::Char('q'), InputEvent::Esc, InputEvent::CtrlC] {
            let mut session = TableSession::config(&profiles(), Preferences::default());
            session.handle_event(key);
            assert_eq!(session.outcome(), Some(&Outcome::Cancelled));
        }
    }

    #[test]
    fn filter_scenario_db_then_backspace() {
        let records = vec![
            tunnel("1", "db"),
            tunnel("2", "web"),
            tunnel("3", "db-replica"),
        ];
        let mut session = TableSession::tunnels(records, Preferences::default(), false);
        session.handle_event(InputEvent::Char('/'));
        assert_eq!(session.mode(), SessionMode::Filtering);

        type_chars(&mut session, "db");
        assert_eq!(session.visible_rows().len(), 2);

        session.handle_event(InputEvent::Backspace);
        session.handle_event(InputEvent::Backspace);
        assert_eq!(session.visible_rows().len(), 3);
    }

    #[test]
    fn q_is_a_filter_character_while_filtering() {
        let mut session = TableSession::config(&profiles(), Preferences::default());
        session.handle_event(InputEvent::Char('/'));
        session.handle_event(InputEvent::Char('q'));
        assert_eq!(session.outcome(), None);
        assert_eq!(session.filter_text(), "q");
    }

    #[test]
    fn escape_leaves_filtering_and_restores_rows() {
        let mut session = TableSession::config(&profiles(), Preferences::default());
        session.handle_event(InputEvent::Char('/'));
        type_chars(&mut session, "alpha");
        assert_eq!(session.visible_rows().len(), 1);

        session.handle_event(InputEvent::Esc);
        assert_eq!(session.mode(), SessionMode::Browse);
        assert_eq!(session.visible_rows().len(), 3);
        assert_eq!(session.filter_text(), "");
    }

    #[test]
    fn enter_commits_from_filtering_mode() {
        let mut session = TableSession::config(&profiles(), Preferences::default());
        session.handle_event(InputEvent::Char('/'));
        type_chars(&mut session, "gamma");
        session.handle_event(InputEvent::Enter);
        match session.outcome() {
            Some(Outcome::Profile(profile)) => assert_eq!(profile.name, "gamma"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn initial_filter_preseeds_the_needle() {
        let session = TableSession::config(&profiles(), Preferences::default())
            .with_initial_filter("bet");
        assert_eq!(session.mode(), SessionMode::Filtering);
        assert_eq!(session.visible_rows().len(), 1);
    }

    #[test]
    fn history_delete_removes_all_rows_for_host() {
        let mut entries = history_entries();
        entries.push(HistoryEntry {
            profile: SshProfile {
                name: "alpha-again".to_owned(),
                host: "alpha.internal".to_owned(),
                port: "22".to_owned(),
                user: "root".to_owned(),
                key: String::new(),
            },
            timestamp: OffsetDateTime::UNIX_EPOCH,
        });
        let mut session =
            TableSession::history(OffsetDateTime::UNIX_EPOCH, &entries, Preferences::default());

        let effects = session.handle_event(InputEvent::Char('d'));
        assert_eq!(
            effects,
            vec![SessionEffect::RemoveHistoryByHost("alpha.internal".to_owned())]
        );
        assert_eq!(session.visible_rows().len(), 2);
        assert!(
            session
                .visible_rows()
                .iter()
                .all(|row| row.columns[1] != "alpha.internal")
        );
    }

    #[test]
    fn history_remove_by_name_drops_one_alias() {
        let mut session = TableSession::history(
            OffsetDateTime::UNIX_EPOCH,
            &history_entries(),
            Preferences::default(),
        );
        session.handle_event(InputEvent::Down);
        let effects = session.handle_event(InputEvent::Char('r'));
        assert_eq!(
            effects,
            vec![SessionEffect::RemoveHistoryByName("beta".to_owned())]
        );
        assert_eq!(session.visible_rows().len(), 2);
    }

    #[test]
    fn deleting_the_last_row_commits_empty() {
        let entries = vec![history_entries().remove(0)];
        let mut session =
            TableSession::history(OffsetDateTime::UNIX_EPOCH, &entries, Preferences::default());
        session.handle_event(InputEvent::Char('d'));
        assert_eq!(session.outcome(), Some(&Outcome::Empty));
    }

    #[test]
    fn tunnel_delete_waits_for_store_confirmation() {
        let records = vec![tunnel("1", "db"), tunnel("2", "web")];
        let mut session = TableSession::tunnels(records, Preferences::default(), false);

        let effects = session.handle_event(InputEvent::Char('d'));
        assert_eq!(
            effects,
            vec![SessionEffect::DeleteTunnel(TunnelId::new("1"))]
        );
        // Rows are untouched until the driver confirms.
        assert_eq!(session.visible_rows().len(), 2);

        session.apply_tunnel_deletion(&TunnelId::new("1"));
        assert_eq!(session.visible_rows().len(), 1);
        assert_eq!(session.records().len(), 1);
    }

    #[test]
    fn confirmed_delete_of_last_tunnel_commits_empty() {
        let mut session =
            TableSession::tunnels(vec![tunnel("1", "db")], Preferences::default(), false);
        session.handle_event(InputEvent::Char('d'));
        session.apply_tunnel_deletion(&TunnelId::new("1"));
        assert_eq!(session.outcome(), Some(&Outcome::Empty));
    }

    #[test]
    fn delete_keeps_caches_consistent_while_filtered() {
        let entries = history_entries();
        let mut session =
            TableSession::history(OffsetDateTime::UNIX_EPOCH, &entries, Preferences::default());
        session.handle_event(InputEvent::Char('/'));
        type_chars(&mut session, "internal");
        session.handle_event(InputEvent::Esc);

        session.handle_event(InputEvent::Char('d'));
        session.handle_event(InputEvent::Char('/'));
        // Everything still visible must also be in the full cache.
        assert_eq!(session.visible_rows().len(), 2);
    }

    #[test]
    fn space_toggles_multi_selection() {
        let records = vec![tunnel("1", "db"), tunnel("2", "web")];
        let mut session = TableSession::tunnels(records, Preferences::default(), true);

        session.handle_event(InputEvent::Char(' '));
        assert_eq!(session.selected_ids().len(), 1);
        session.handle_event(InputEvent::Char(' '));
        assert!(session.selected_ids().is_empty());
    }

    #[test]
    fn multi_select_commits_in_record_order() {
        let records = vec![tunnel("1", "db"), tunnel("2", "web"), tunnel("3", "socks")];
        let mut session = TableSession::tunnels(records, Preferences::default(), true);

        // Toggle the third, then the first.
        session.handle_event(InputEvent::Down);
        session.handle_event(InputEvent::Down);
        session.handle_event(InputEvent::Char(' '));
        session.handle_event(InputEvent::Up);
        session.handle_event(InputEvent::Up);
        session.handle_event(InputEvent::Char(' '));
        session.handle_event(InputEvent::Enter);

        assert_eq!(
            session.outcome(),
            Some(&Outcome::Tunnels(vec![
                TunnelId::new("1"),
                TunnelId::new("3"),
            ]))
        );
        let committed = session.committed_tunnels();
        assert_eq!(committed.len(), 2);
        assert_eq!(committed[0].name, "db");
    }

    #[test]
    fn enter_with_nothing_toggled_commits_highlighted_tunnel() {
        let records = vec![tunnel("1", "db"), tunnel("2", "web")];
        let mut session = TableSession::tunnels(records, Preferences::default(), true);
        session.handle_event(InputEvent::Down);
        session.handle_event(InputEvent::Enter);
        assert_eq!(
            session.outcome(),
            Some(&Outcome::Tunnels(vec![TunnelId::new("2")]))
        );
    }

    #[test]
    fn space_is_ignored_without_multi_select() {
        let mut session =
            TableSession::tunnels(vec![tunnel("1", "db")], Preferences::default(), false);
        session.handle_event(InputEvent::Char(' '));
        assert!(session.selected_ids().is_empty());
    }

    #[test]
    fn fullscreen_toggle_emits_save_and_screen_effects() {
        let mut session = TableSession::config(&profiles(), Preferences::default());
        let effects = session.handle_event(InputEvent::Char('w'));
        assert!(session.preferences().fullscreen);
        assert_eq!(effects.len(), 2);
        assert!(matches!(effects[0], SessionEffect::SavePreferences(p) if p.fullscreen));
        assert_eq!(effects[1], SessionEffect::EnterAltScreen);

        let effects = session.handle_event(InputEvent::Char('w'));
        assert!(!session.preferences().fullscreen);
        assert_eq!(effects[1], SessionEffect::ExitAltScreen);
    }

    #[test]
    fn resize_relayouts_in_every_mode() {
        let mut session =
            TableSession::tunnels(vec![tunnel("1", "db")], Preferences::default(), false);
        session.handle_event(InputEvent::Char('n'));
        assert_eq!(session.mode(), SessionMode::FormEditing);

        let effects = session.handle_event(InputEvent::Resize {
            width: 120,
            height: 40,
        });
        assert_eq!(effects, vec![SessionEffect::ExitAltScreen]);
        assert_eq!(session.table_width(), 117);
        assert_eq!(session.table_height(), 37);
        assert_eq!(session.mode(), SessionMode::FormEditing);
    }

    #[test]
    fn relayout_is_independent_of_earlier_sizes() {
        // Column widths depend only on the current window, not on whatever
        // adjusted layout a previous resize left behind.
        let mut resized_twice = TableSession::config(&profiles(), Preferences::default());
        resized_twice.handle_event(InputEvent::Resize {
            width: 100,
            height: 30,
        });
        resized_twice.handle_event(InputEvent::Resize {
            width: 120,
            height: 40,
        });

        let mut resized_once = TableSession::config(&profiles(), Preferences::default());
        resized_once.handle_event(InputEvent::Resize {
            width: 120,
            height: 40,
        });

        assert_eq!(resized_twice.columns(), resized_once.columns());
        assert_eq!(resized_twice.table_width(), resized_once.table_width());
        assert_eq!(resized_twice.table_height(), resized_once.table_height());
    }

    #[test]
    fn form_lifecycle_create_and_cancel() {
        let mut session = TableSession::tunnels(Vec::new(), Preferences::default(), false);
        session.handle_event(InputEvent::Char('n'));
        assert!(session.form().is_some());
        assert!(!session.form().unwrap().is_editing());

        session.handle_event(InputEvent::Esc);
        assert!(session.form().is_none());
        assert_eq!(session.mode(), SessionMode::Browse);
        assert_eq!(session.outcome(), None);
    }

    #[test]
    fn edit_prefills_from_the_record() {
        let mut record = tunnel("1", "db");
        record.description = "d".repeat(50);
        let mut session =
            TableSession::tunnels(vec![record], Preferences::default(), false);
        session.handle_event(InputEvent::Char('e'));

        let form = session.form().expect("form open");
        assert!(form.is_editing());
        // Full description, not the truncated row cell.
        assert_eq!(
            form.value(crate::form::FormField::Description).len(),
            50
        );
    }

    #[test]
    fn invalid_submit_stays_in_form_with_error() {
        let mut session = TableSession::tunnels(Vec::new(), Preferences::default(), false);
        session.handle_event(InputEvent::Char('n'));
        let effects = session.handle_event(InputEvent::CtrlS);
        assert!(effects.is_empty());
        assert_eq!(
            session.form().unwrap().error.as_deref(),
            Some("Name is required")
        );
        assert_eq!(session.mode(), SessionMode::FormEditing);
    }

    #[test]
    fn valid_submit_emits_submission_effect() {
        let mut session = TableSession::tunnels(Vec::new(), Preferences::default(), false);
        session.handle_event(InputEvent::Char('n'));
        type_chars(&mut session, "db");
        session.handle_event(InputEvent::Tab);
        type_chars(&mut session, "dynamic");
        session.handle_event(InputEvent::Tab);
        type_chars(&mut session, "1080");

        let effects = session.handle_event(InputEvent::AltEnter);
        match effects.as_slice() {
            [SessionEffect::SubmitTunnel(submission)] => {
                assert_eq!(submission.draft.name, "db");
                assert_eq!(submission.draft.kind, TunnelKind::Dynamic);
                assert!(submission.existing.is_none());
            }
            other => panic!("unexpected effects: {other:?}"),
        }

        // Driver reports success and reloads the table.
        session.finish_form(vec![tunnel("9", "db")]);
        assert_eq!(session.mode(), SessionMode::Browse);
        assert_eq!(session.visible_rows().len(), 1);
    }

    #[test]
    fn duplicate_name_reported_inline_keeps_form_open() {
        let mut session = TableSession::tunnels(Vec::new(), Preferences::default(), false);
        session.handle_event(InputEvent::Char('n'));
        session.set_form_error("a record named \"db\" already exists".to_owned());
        assert!(session.form().unwrap().error.is_some());
        assert_eq!(session.mode(), SessionMode::FormEditing);
    }

    #[test]
    fn events_after_outcome_are_ignored() {
        let mut session = TableSession::config(&profiles(), Preferences::default());
        session.handle_event(InputEvent::Char('q'));
        let effects = session.handle_event(InputEvent::Char('w'));
        assert!(effects.is_empty());
        assert_eq!(session.outcome(), Some(&Outcome::Cancelled));
    }

    #[test]
    fn commit_with_no_rows_is_a_no_op() {
        let mut session = TableSession::config(&[], Preferences::default());
        session.handle_event(InputEvent::Enter);
        assert_eq!(session.outcome(), None);
    }

    #[test]
    fn delete_is_a_no_op_for_config_tables() {
        let mut session = TableSession::config(&profiles(), Preferences::default());
        let effects = session.handle_event(InputEvent::Char('d'));
        assert!(effects.is_empty());
        assert_eq!(session.visible_rows().len(), 3);
    }
}
