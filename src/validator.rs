// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Content length validator.
//!
//! Runs before any other processing. Length is counted in characters, not
//! bytes, so accented text is measured the way a user sees it.

use crate::config::ValidationConfig;
use thiserror::Error;
use tracing::debug;

/// Minimum content length after trimming.
pub const MIN_CONTENT_CHARS: usize = 10;

/// Maximum content length.
pub const MAX_CONTENT_CHARS: usize = 50;

/// Length validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LengthError {
    #[error("Content cannot be empty")]
    Empty,

    #[error("Content is too short: at least {min} characters required, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Content is too long: at most {max} characters allowed, got {actual}")]
    TooLong { max: usize, actual: usize },
}

impl LengthError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooShort { .. } => "too_short",
            Self::TooLong { .. } => "too_long",
        }
    }
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    /// Content is within bounds
    Valid,
    /// Content is out of bounds
    Invalid(LengthError),
}

impl ValidationVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationVerdict::Valid)
    }

    pub fn error(&self) -> Option<&LengthError> {
        match self {
            ValidationVerdict::Valid => None,
            ValidationVerdict::Invalid(e) => Some(e),
        }
    }
}

/// Inclusive length window validator.
#[derive(Debug, Clone)]
pub struct LengthValidator {
    config: ValidationConfig,
}

impl Default for LengthValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl LengthValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a candidate.
    ///
    /// The lower bound applies to the trimmed text, the upper bound to the
    /// text as typed.
    pub fn validate(&self, text: &str) -> ValidationVerdict {
        let trimmed = text.trim().chars().count();
        if trimmed == 0 {
            debug!("Empty content");
            return ValidationVerdict::Invalid(LengthError::Empty);
        }

        if trimmed < self.config.min_chars {
            debug!(length = trimmed, min = self.config.min_chars, "Content too short");
            return ValidationVerdict::Invalid(LengthError::TooShort {
                min: self.config.min_chars,
                actual: trimmed,
            });
        }

        let full = text.chars().count();
        if full > self.config.max_chars {
            debug!(length = full, max = self.config.max_chars, "Content too long");
            return ValidationVerdict::Invalid(LengthError::TooLong {
                max: self.config.max_chars,
                actual: full,
            });
        }

        ValidationVerdict::Valid
    }
}
