// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const MARGIN_WIDTH: i32 = 3;
pub const MARGIN_HEIGHT: i32 = 3;
pub const MIN_TABLE_WIDTH: i32 = 3;
pub const CONTENT_EXTRA_MARGIN: i32 = 12;
pub const PREFERRED_KEY_EXTRA: i32 = 15;
pub const MAX_KEY_EXTRA: i32 = 30;
pub const MIN_TABLE_HEIGHT: i32 = 3;
pub const MAX_TABLE_HEIGHT: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub title: &'static str,
    pub width: u16,
}

/// Which table is being laid out. The profile carries the base widths and
/// the elastic-column policy; it is chosen when the session is built, never
/// inferred from the column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableProfile {
    Config,
    History,
    Tunnel,
}

impl TableProfile {
    pub const fn titles(self) -> &'static [&'static str] {
        match self {
            Self::Config => &["Name", "Host", "Port", "User", "Key"],
            Self::History => &["Name", "Host", "Port", "User", "Key", "Last login"],
            Self::Tunnel => &["Name", "Type", "Local Port", "Remote", "Description"],
        }
    }

    pub const fn base_widths(self) -> &'static [u16] {
        match self {
            Self::Config => &[15, 20, 5, 10, 10],
            Self::History => &[10, 20, 5, 10, 0, 15],
            Self::Tunnel => &[15, 10, 10, 20, 25],
        }
    }

    pub fn base_columns(self) -> Vec<ColumnSpec> {
        self.titles()
            .iter()
            .zip(self.base_widths())
            .map(|(title, width)| ColumnSpec {
                title,
                width: *width,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub table_width: i32,
    /// Window height minus the chrome margin; may be below the minimum,
    /// which the renderer reports as a too-small terminal.
    pub table_height: i32,
    pub columns: Vec<ColumnSpec>,
}

/// Recomputes table dimensions and column widths for a terminal size.
///
/// Surplus space goes to the profile's elastic columns: Config and History
/// grow Key up to +15, then Key and Name together until Key reaches +30,
/// then Name alone; Tunnel splits the surplus between Description and
/// Remote, Description taking the odd unit. A deficit scales every column
/// proportionally, rounding to nearest with a floor of one cell.
pub fn adjust_dimensions(
    profile: TableProfile,
    window_width: i32,
    window_height: i32,
) -> TableLayout {
    let table_height = window_height - MARGIN_HEIGHT;
    let table_width = (window_width - MARGIN_WIDTH).max(MIN_TABLE_WIDTH);
    let content_width = table_width - CONTENT_EXTRA_MARGIN;

    let base = profile.base_widths();
    let total: i32 = base.iter().map(|width| i32::from(*width)).sum();
    let mut widths: Vec<i32> = base.iter().map(|width| i32::from(*width)).collect();

    if content_width >= total {
        let mut leftover = content_width - total;
        match profile {
            TableProfile::Config | TableProfile::History => {
                // Name is column 0, Key is column 4 in both profiles.
                let mut name_extra = 0;
                let mut key_extra = 0;
                while leftover > 0 {
                    if key_extra < PREFERRED_KEY_EXTRA {
                        key_extra += 1;
                        leftover -= 1;
                    } else if key_extra < MAX_KEY_EXTRA && leftover > 1 {
                        name_extra += 1;
                        key_extra += 1;
                        leftover -= 2;
                    } else {
                        name_extra += 1;
                        leftover -= 1;
                    }
                }
                widths[0] += name_extra;
                widths[4] += key_extra;
            }
            TableProfile::Tunnel => {
                let mut remote_extra = 0;
                let mut description_extra = 0;
                while leftover > 0 {
                    if leftover >= 2 {
                        remote_extra += 1;
                        description_extra += 1;
                        leftover -= 2;
                    } else {
                        description_extra += 1;
                        leftover -= 1;
                    }
                }
                widths[3] += remote_extra;
                widths[4] += description_extra;
            }
        }
    } else {
        let ratio = f64::from(content_width) / f64::from(total);
        for (width, base_width) in widths.iter_mut().zip(base) {
            *width = ((f64::from(*base_width) * ratio).round() as i32).max(1);
        }
    }

    let columns = profile
        .titles()
        .iter()
        .zip(widths)
        .map(|(title, width)| ColumnSpec {
            title,
            width: width.max(0) as u16,
        })
        .collect();

    TableLayout {
        table_width,
        table_height,
        columns,
    }
}

/// The number of terminal rows the table widget occupies: the full area in
/// fullscreen, otherwise just enough for the visible rows plus the header,
/// clamped between the minimum and `min(8, available)`.
pub fn visible_table_height(table_height: i32, filtered_rows: usize, fullscreen: bool) -> i32 {
    let expected = if fullscreen {
        table_height
    } else {
        let cap = MAX_TABLE_HEIGHT.min(table_height);
        (filtered_rows as i32 + 2).min(cap)
    };
    expected.max(MIN_TABLE_HEIGHT)
}
