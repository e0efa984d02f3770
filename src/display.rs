// src/display.rs
//! What to show, decided before any widget is built.

use crate::data_types::{cell_text, Table};
use crate::errors::SheetError;
use crate::viewer::{format_last_update, Status};

pub const AUTO_UPDATE_NOTICE: &str = "Updates automatically every minute";
pub const NO_DATA: &str = "No data available";

#[derive(Debug, Clone, PartialEq)]
pub enum SheetView {
    Loading,
    Error(String),
    NoData,
    Table(TableLayout),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub headers: Vec<String>,
    /// Body rows as fetched; lengths may differ from the header.
    pub rows: Vec<Vec<String>>,
    pub column_width_percent: f32,
}

impl TableLayout {
    /// Width of the grid: the header or the longest body row, whichever
    /// is wider. Every row, header included, is padded out to it.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or_default()
    }
}

/// Loading wins over an error, an error over missing data.
pub fn render_sheet(table: Option<&Table>, is_loading: bool, error: Option<&SheetError>) -> SheetView {
    if is_loading {
        return SheetView::Loading;
    }
    if let Some(err) = error {
        return SheetView::Error(err.to_string());
    }
    let table = match table {
        Some(table) if !table.is_empty() => table,
        _ => return SheetView::NoData,
    };

    let headers: Vec<String> = table
        .header()
        .unwrap_or_default()
        .iter()
        .map(cell_text)
        .collect();
    let rows = table
        .body()
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    let column_width_percent = if headers.is_empty() {
        100.0
    } else {
        100.0 / headers.len() as f32
    };

    SheetView::Table(TableLayout {
        headers,
        rows,
        column_width_percent,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusView {
    /// Configuration or initialization failure.
    pub banner: Option<String>,
    pub auto_update_notice: Option<&'static str>,
    pub last_updated: Option<String>,
}

pub fn render_status(status: &Status) -> StatusView {
    let banner = status
        .config_error
        .as_ref()
        .or(status.init_error.as_ref())
        .map(ToString::to_string);

    StatusView {
        banner,
        auto_update_notice: status.client_ready.then_some(AUTO_UPDATE_NOTICE),
        last_updated: status
            .last_update
            .map(|at| format!("Last updated: {}", format_last_update(Some(at)))),
    }
}
