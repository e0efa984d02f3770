// src/config.rs
//! Startup configuration from CLI flags, the environment and `.env`.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::errors::SheetError;

/// Cell range read on every poll.
pub const RANGE: &str = "Sheet1!A1:Z1000";
pub const DISCOVERY_DOC: &str = "https://sheets.googleapis.com/$discovery/rest?version=v4";
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Google Sheets Viewer: shows a spreadsheet range and keeps it up to date.
#[derive(Parser, Debug, Default)]
#[command(name = "sheet_viewer", version, about)]
pub struct AppConfig {
    /// Google API key with read access to the Sheets API.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Identifier of the spreadsheet to display.
    #[arg(long, env = "GOOGLE_SHEET_ID")]
    pub sheet_id: Option<String>,

    /// Use the dark palette.
    #[arg(long)]
    pub dark: bool,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validate the required values. The API key is checked first.
    pub fn viewer_config(&self) -> Result<ViewerConfig, SheetError> {
        let api_key = non_blank(&self.api_key).ok_or(SheetError::MissingApiKey)?;
        let spreadsheet_id = non_blank(&self.sheet_id).ok_or(SheetError::MissingSheetId)?;

        Ok(ViewerConfig {
            api_key,
            spreadsheet_id,
            range: RANGE.to_string(),
            discovery_url: DISCOVERY_DOC.to_string(),
            poll_interval: POLL_INTERVAL,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Validated configuration, fixed for the lifetime of the app.
#[derive(Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub api_key: String,
    pub spreadsheet_id: String,
    pub range: String,
    pub discovery_url: String,
    pub poll_interval: Duration,
}

impl ViewerConfig {
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for ViewerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerConfig")
            .field("api_key", &"<redacted>")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("range", &self.range)
            .field("discovery_url", &self.discovery_url)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}
