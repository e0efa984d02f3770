// src/errors.rs
//! Error types surfaced to the user.
//!
//! The `Display` text of every variant is what the viewer shows on screen.
//! Underlying causes are kept in `detail` for the log only.

use thiserror::Error;

/// Broad class of a [`SheetError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required startup configuration is missing.
    Configuration,
    /// The API client could not be loaded or initialized.
    ClientInit,
    /// A read of the sheet range failed.
    Fetch,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error("Missing API key. Please check your environment variables.")]
    MissingApiKey,
    #[error("Missing Sheet ID. Please check your environment variables.")]
    MissingSheetId,
    #[error("Error loading Google API. Please check your internet connection and try again.")]
    ClientLoad { detail: String },
    #[error("Failed to initialize Google API client. Please check your API key.")]
    ClientInit { detail: String },
    // The cause is a guess; the real failure is only in `detail`.
    #[error("Error loading sheet data. Please check your sheet permissions and make sure the sheet is shared publicly or with the service account.")]
    Fetch { detail: String },
}

impl SheetError {
    pub fn client_load(detail: impl ToString) -> Self {
        SheetError::ClientLoad {
            detail: detail.to_string(),
        }
    }

    pub fn client_init(detail: impl ToString) -> Self {
        SheetError::ClientInit {
            detail: detail.to_string(),
        }
    }

    pub fn fetch(detail: impl ToString) -> Self {
        SheetError::Fetch {
            detail: detail.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SheetError::MissingApiKey | SheetError::MissingSheetId => ErrorKind::Configuration,
            SheetError::ClientLoad { .. } | SheetError::ClientInit { .. } => ErrorKind::ClientInit,
            SheetError::Fetch { .. } => ErrorKind::Fetch,
        }
    }

    /// Underlying cause, if one was recorded.
    pub fn detail(&self) -> Option<&str> {
        match self {
            SheetError::MissingApiKey | SheetError::MissingSheetId => None,
            SheetError::ClientLoad { detail }
            | SheetError::ClientInit { detail }
            | SheetError::Fetch { detail } => Some(detail),
        }
    }
}
