// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use portage_app::{
    FormField, FormState, InputEvent, MIN_TABLE_HEIGHT, Preferences, SessionEffect, SessionMode,
    StoreError, TableProfile, TableSession, Tunnel, TunnelId, TunnelSubmission,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use std::io;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(120);

/// Store operations the picker needs while running. The session emits
/// effects; the loop calls back through this trait and feeds results in.
pub trait PickerRuntime {
    fn save_preferences(&mut self, preferences: Preferences) -> Result<(), StoreError>;
    fn delete_tunnel(&mut self, id: &TunnelId) -> Result<(), StoreError>;
    fn remove_history_by_host(&mut self, host: &str) -> Result<(), StoreError>;
    fn remove_history_by_name(&mut self, name: &str) -> Result<(), StoreError>;
    /// On success returns the refreshed record list for the table.
    fn submit_tunnel(&mut self, submission: &TunnelSubmission) -> Result<Vec<Tunnel>, StoreError>;
}

/// Runs the picker loop until the session reaches an outcome. The caller
/// inspects `session.outcome()` afterwards.
pub fn run_picker<R: PickerRuntime>(session: &mut TableSession, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut alt_active = false;
    if session.preferences().fullscreen {
        execute!(io::stdout(), terminal::EnterAlternateScreen).context("enter alternate screen")?;
        alt_active = true;
    }

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut result = run_loop(session, runtime, &mut terminal, &mut alt_active);

    if let Err(error) = disable_raw_mode().context("disable raw mode")
        && result.is_ok()
    {
        result = Err(error);
    }
    if alt_active {
        let left =
            execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen");
        if let Err(error) = left
            && result.is_ok()
        {
            result = Err(error);
        }
    }
    result
}

fn run_loop<R: PickerRuntime>(
    session: &mut TableSession,
    runtime: &mut R,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    alt_active: &mut bool,
) -> Result<()> {
    let (width, height) = terminal::size().context("query terminal size")?;
    let effects = session.handle_event(InputEvent::Resize {
        width: i32::from(width),
        height: i32::from(height),
    });
    execute_effects(session, runtime, alt_active, effects)?;

    loop {
        if session.outcome().is_some() {
            return Ok(());
        }

        terminal
            .draw(|frame| render(frame, session))
            .context("draw frame")?;

        if !event::poll(POLL_INTERVAL).context("poll event")? {
            continue;
        }
        let input = match event::read().context("read event")? {
            Event::Key(key) if key.kind != KeyEventKind::Release => map_key_event(key),
            Event::Resize(width, height) => Some(InputEvent::Resize {
                width: i32::from(width),
                height: i32::from(height),
            }),
            _ => None,
        };
        let Some(input) = input else {
            continue;
        };
        let effects = session.handle_event(input);
        execute_effects(session, runtime, alt_active, effects)?;
    }
}

/// Translates a terminal key event into session input. Modifier chords the
/// session does not know are dropped here.
pub fn map_key_event(key: KeyEvent) -> Option<InputEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(InputEvent::CtrlC),
            KeyCode::Char('s') => Some(InputEvent::CtrlS),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => Some(InputEvent::AltEnter),
        KeyCode::Enter => Some(InputEvent::Enter),
        KeyCode::Esc => Some(InputEvent::Esc),
        KeyCode::Tab => Some(InputEvent::Tab),
        KeyCode::BackTab => Some(InputEvent::BackTab),
        KeyCode::Up => Some(InputEvent::Up),
        KeyCode::Down => Some(InputEvent::Down),
        KeyCode::Backspace => Some(InputEvent::Backspace),
        KeyCode::Char(c) => Some(InputEvent::Char(c)),
        _ => None,
    }
}

/// Executes session effects against the terminal and the stores, feeding
/// store results back into the session.
fn execute_effects<R: PickerRuntime>(
    session: &mut TableSession,
    runtime: &mut R,
    alt_active: &mut bool,
    effects: Vec<SessionEffect>,
) -> Result<()> {
    for effect in effects {
        match effect {
            SessionEffect::EnterAltScreen => {
                if !*alt_active {
                    execute!(io::stdout(), terminal::EnterAlternateScreen)
                        .context("enter alternate screen")?;
                    *alt_active = true;
                }
            }
            SessionEffect::ExitAltScreen => {
                if *alt_active {
                    execute!(io::stdout(), terminal::LeaveAlternateScreen)
                        .context("leave alternate screen")?;
                    *alt_active = false;
                }
            }
            // Best effort: the in-memory flip already happened.
            SessionEffect::SavePreferences(preferences) => {
                let _ = runtime.save_preferences(preferences);
            }
            SessionEffect::DeleteTunnel(id) => match runtime.delete_tunnel(&id) {
                Ok(()) => session.apply_tunnel_deletion(&id),
                Err(error) if error.is_fatal() => {
                    return Err(error).context("delete tunnel");
                }
                // Already gone or rejected: leave the row in place.
                Err(_) => {}
            },
            SessionEffect::RemoveHistoryByHost(host) => {
                let _ = runtime.remove_history_by_host(&host);
            }
            SessionEffect::RemoveHistoryByName(name) => {
                let _ = runtime.remove_history_by_name(&name);
            }
            SessionEffect::SubmitTunnel(submission) => match runtime.submit_tunnel(&submission) {
                Ok(records) => session.finish_form(records),
                Err(error) if error.is_fatal() => {
                    return Err(error).context("save tunnel");
                }
                Err(error) => session.set_form_error(error.to_string()),
            },
        }
    }
    Ok(())
}

fn render(frame: &mut ratatui::Frame<'_>, session: &TableSession) {
    if session.table_height() < MIN_TABLE_HEIGHT {
        let warning = Paragraph::new("Terminal too small")
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(warning, frame.area());
        return;
    }

    if session.mode() == SessionMode::FormEditing {
        if let Some(form) = session.form() {
            render_form(frame, form);
        }
        return;
    }

    let table_rows = session.visible_height().max(MIN_TABLE_HEIGHT) as u16;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(table_rows.saturating_add(2)),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(frame.area());

    render_table(frame, layout[0], session);

    let help = Paragraph::new(help_text(session)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, layout[1]);
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, session: &TableSession) {
    let widths = session
        .columns()
        .iter()
        .map(|column| Constraint::Length(column.width))
        .collect::<Vec<_>>();

    let header_cells = session.columns().iter().map(|column| {
        Cell::from(column.title).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let rows = session.visible_rows().iter().map(|row| {
        let toggled = row
            .tunnel_id
            .as_ref()
            .is_some_and(|id| session.selected_ids().contains(id));
        let style = if toggled {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        Row::new(row.columns.iter().map(|cell| Cell::from(cell.as_str()))).style(style)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(table_title(session)),
        )
        .row_highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let mut table_state = TableState::default();
    if !session.visible_rows().is_empty() {
        table_state.select(Some(session.cursor()));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn table_title(session: &TableSession) -> String {
    let base = match session.profile() {
        TableProfile::Config => "ssh config",
        TableProfile::History => "history",
        TableProfile::Tunnel => "tunnels",
    };
    if session.mode() == SessionMode::Filtering {
        format!("{base} /{}", session.filter_text())
    } else {
        base.to_owned()
    }
}

fn help_text(session: &TableSession) -> String {
    if session.mode() == SessionMode::Filtering {
        return "type to filter | esc cancel | enter select".to_owned();
    }
    let mut parts: Vec<String> = vec!["enter select".to_owned()];
    match session.profile() {
        TableProfile::Config => {}
        TableProfile::History => {
            parts.push("d delete host".to_owned());
            parts.push("r remove entry".to_owned());
        }
        TableProfile::Tunnel => {
            if session.multi_select() {
                parts.push("space toggle".to_owned());
                let count = session.selected_ids().len();
                if count > 0 {
                    parts.push(format!("[{count} selected]"));
                }
            }
            parts.push("n new".to_owned());
            parts.push("e edit".to_owned());
            parts.push("d delete".to_owned());
        }
    }
    parts.push("/ filter".to_owned());
    parts.push("w fullscreen".to_owned());
    parts.push("q quit".to_owned());
    parts.join(" | ")
}

fn render_form(frame: &mut ratatui::Frame<'_>, form: &FormState) {
    let title = if form.is_editing() {
        "Edit Tunnel"
    } else {
        "New Tunnel"
    };

    let mut lines: Vec<String> = Vec::new();
    for (index, field) in FormField::ALL.iter().enumerate() {
        if form.field_hidden(*field) {
            continue;
        }
        let marker = if index == form.focus { "> " } else { "  " };
        let value = form.value(*field);
        let shown = if value.is_empty() {
            format!("({})", field.placeholder())
        } else {
            value.to_owned()
        };
        let required = if field.required() { "*" } else { "" };
        lines.push(format!("{marker}{}{required}: {shown}", field.label()));
    }
    lines.push(String::new());
    if let Some(error) = &form.error {
        lines.push(format!("! {error}"));
    }
    lines.push("tab/enter next field | ctrl+s save | esc cancel".to_owned());

    let area = centered_rect(60, (lines.len() as u16).saturating_add(2), frame.area());
    let body = Paragraph::new(lines.join("\n"))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(body, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
