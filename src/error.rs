// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the content guard

use thiserror::Error;

/// Library error types.
///
/// Validation failures, detected attacks and server rejections are not
/// errors; they come back as [`crate::guard::Outcome`] values.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid attack pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GuardError>;
