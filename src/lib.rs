// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Content Guard
//!
//! Client-side guard for user-submitted text bound for an entries backend:
//!
//! - Length validation (10 to 50 characters by default)
//! - Attack detection on the raw text, with reporting to the backend
//! - Markup stripping before submission
//! - Cooldown and ban synchronisation with a local one-second countdown

pub mod client;
pub mod config;
pub mod cooldown;
pub mod detector;
pub mod error;
pub mod guard;
pub mod sanitizer;
pub mod session;
pub mod validator;

pub use client::{Entry, EntryBackend, HttpBackend};
pub use config::Config;
pub use cooldown::{CooldownDirective, CooldownKind, CooldownState, CooldownTracker};
pub use detector::{AttackDetector, DetectionRule, PatternRule};
pub use error::{GuardError, Result};
pub use guard::{Action, Alert, Outcome, RejectReason, Severity, SubmissionGuard, Target};
pub use sanitizer::sanitize;
pub use session::GuardSession;
pub use validator::{LengthError, LengthValidator, ValidationVerdict};
