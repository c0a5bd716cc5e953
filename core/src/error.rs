// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

/// Errors that abort an entire handler call.
///
/// Per-event problems during import never surface here; they are collected in
/// [`ImportOutcome::errors`](crate::ImportOutcome) instead.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Acquiring or preparing import input failed.
    #[error("ICS import failed: {0}")]
    Import(String),

    /// A remote calendar could not be fetched.
    #[error("Failed to import from URL: {0}")]
    Fetch(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP layer error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The calendar store rejected an operation.
    #[error("calendar store error: {0}")]
    Store(String),
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}
