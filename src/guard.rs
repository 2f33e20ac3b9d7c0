// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission orchestrator.
//!
//! Every create or edit runs the same pipeline, each step short-circuiting
//! the rest:
//!
//! 1. length validation (no network on failure)
//! 2. attack detection on the raw text; a hit is reported, the draft is
//!    cleared and nothing is submitted
//! 3. sanitization
//! 4. submission
//! 5. cooldown reconciliation from whatever directive the response carries
//!
//! Nothing is retried. A failed attempt is re-triggered by the user.

use crate::client::{EntryBackend, EntryResponse};
use crate::config::{Config, ReportingConfig};
use crate::cooldown::{CooldownDirective, CooldownState, CooldownTracker};
use crate::detector::AttackDetector;
use crate::sanitizer::sanitize;
use crate::validator::{LengthError, LengthValidator, ValidationVerdict};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Shown when an attack is reported and the server gives no message.
/// Deliberately says nothing about what was matched.
pub const ATTACK_NOTICE: &str =
    "Suspicious content detected. Submissions are suspended for a while.";

/// Shown when no usable response was obtained.
pub const NETWORK_NOTICE: &str = "Connection error. Please try again.";

/// Where a submission goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `POST /entries`
    Create,
    /// `PUT /entries/{id}`
    Update(String),
}

/// What the user asked for, for alert wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl From<&Target> for Action {
    fn from(target: &Target) -> Self {
        match target {
            Target::Create => Action::Create,
            Target::Update(_) => Action::Update,
        }
    }
}

impl Action {
    fn success_message(self) -> &'static str {
        match self {
            Action::Create => "Entry created",
            Action::Update => "Entry updated",
            Action::Delete => "Entry deleted",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Action::Create => "Could not create entry",
            Action::Update => "Could not update entry",
            Action::Delete => "Could not delete entry",
        }
    }
}

/// How loudly an alert should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// User-facing notice for an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
}

/// Why a submission was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Length out of bounds; never reached the network
    Validation(LengthError),
    /// Refused locally while throttled
    Throttled(CooldownState),
    /// Refused locally while another request is in flight
    Busy,
    /// The server said no
    Server { message: String, severity: Severity },
}

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Persisted; the caller should refresh its listing
    Accepted { data: Option<serde_json::Value> },
    Rejected {
        reason: RejectReason,
        cooldown: Option<CooldownDirective>,
    },
    /// Flagged as an attack, reported and discarded
    AttackReported {
        cooldown: Option<CooldownDirective>,
        message: Option<String>,
    },
    /// No response obtained; cooldown untouched
    NetworkError,
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }

    /// Alert to show the user for this outcome.
    pub fn alert(&self, action: Action) -> Alert {
        let (severity, message) = match self {
            Outcome::Accepted { .. } => (Severity::Success, action.success_message().to_string()),
            Outcome::Rejected { reason, .. } => match reason {
                RejectReason::Validation(err) => (Severity::Error, err.to_string()),
                RejectReason::Throttled(state) => (
                    Severity::Warning,
                    format!(
                        "Submissions paused ({}): try again in {}s",
                        state.kind.map_or("cooldown".to_string(), |k| k.to_string()),
                        state.remaining_seconds
                    ),
                ),
                RejectReason::Busy => (
                    Severity::Warning,
                    "Another request is still in progress".to_string(),
                ),
                RejectReason::Server { message, severity } => (*severity, message.clone()),
            },
            Outcome::AttackReported { message, .. } => (
                Severity::Warning,
                message.clone().unwrap_or_else(|| ATTACK_NOTICE.to_string()),
            ),
            Outcome::NetworkError => (Severity::Error, NETWORK_NOTICE.to_string()),
        };
        Alert { severity, message }
    }
}

/// Clears the in-flight flag on every exit path.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Validates, screens and submits user content.
pub struct SubmissionGuard<B> {
    backend: B,
    validator: LengthValidator,
    detector: AttackDetector,
    cooldown: CooldownTracker,
    reporting: ReportingConfig,
    loading: AtomicBool,
}

impl<B: EntryBackend> SubmissionGuard<B> {
    /// Create a guard with the built-in attack rules.
    pub fn new(config: &Config, backend: B) -> Self {
        Self::with_detector(config, backend, AttackDetector::builtin())
    }

    /// Create a guard with a custom rule set.
    pub fn with_detector(config: &Config, backend: B, detector: AttackDetector) -> Self {
        Self {
            backend,
            validator: LengthValidator::new(config.validation.clone()),
            detector,
            cooldown: CooldownTracker::new(config.cooldown.clone()),
            reporting: config.reporting.clone(),
            loading: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }

    /// Whether a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Submit `draft` to `target`.
    ///
    /// `draft` is the caller's input buffer. It is cleared when the content
    /// is accepted and when it is discarded as an attack.
    pub async fn submit(&self, target: &Target, draft: &mut String) -> Outcome {
        let state = self.cooldown.snapshot();
        if state.refuses_submission() {
            debug!(
                remaining_seconds = state.remaining_seconds,
                "Submission refused while throttled"
            );
            return Outcome::Rejected {
                reason: RejectReason::Throttled(state),
                cooldown: None,
            };
        }

        if let ValidationVerdict::Invalid(err) = self.validator.validate(draft) {
            info!(error = %err, "Validation failed");
            return Outcome::Rejected {
                reason: RejectReason::Validation(err),
                cooldown: None,
            };
        }

        let Some(_in_flight) = InFlight::acquire(&self.loading) else {
            return busy();
        };

        if self.detector.is_attack(draft) {
            let outcome = self.report_attack().await;
            draft.clear();
            return outcome;
        }

        let sanitized = sanitize(draft);
        let result = match target {
            Target::Create => self.backend.create(&sanitized).await,
            Target::Update(id) => self.backend.update(id, &sanitized).await,
        };

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Submission failed without a response");
                return Outcome::NetworkError;
            }
        };

        let outcome = self.settle(response, target.into());
        if outcome.is_accepted() {
            draft.clear();
        }
        outcome
    }

    /// Delete an entry. Allowed during a plain cooldown, refused while
    /// blocked.
    pub async fn delete(&self, id: &str) -> Outcome {
        let state = self.cooldown.snapshot();
        if state.refuses_deletion() {
            debug!(
                remaining_seconds = state.remaining_seconds,
                "Deletion refused while blocked"
            );
            return Outcome::Rejected {
                reason: RejectReason::Throttled(state),
                cooldown: None,
            };
        }

        let Some(_in_flight) = InFlight::acquire(&self.loading) else {
            return busy();
        };

        match self.backend.delete(id).await {
            Ok(response) => self.settle(response, Action::Delete),
            Err(err) => {
                warn!(error = %err, "Deletion failed without a response");
                Outcome::NetworkError
            }
        }
    }

    /// Seed the cooldown from the server's status endpoint.
    pub async fn sync_cooldown(&self) -> Option<CooldownState> {
        match self.backend.cooldown_status().await {
            Ok(status) => self.cooldown.reconcile(status.directive()),
            Err(err) => {
                warn!(error = %err, "Could not fetch cooldown status");
                None
            }
        }
    }

    async fn report_attack(&self) -> Outcome {
        warn!(attack_type = %self.reporting.attack_type, "Attack detected, reporting");
        match self.backend.report_attack(&self.reporting.attack_type).await {
            Ok(response) => {
                self.cooldown.reconcile(response.cooldown.as_ref());
                Outcome::AttackReported {
                    cooldown: response.cooldown,
                    message: response.message,
                }
            }
            Err(err) => {
                warn!(error = %err, "Attack report failed");
                Outcome::AttackReported {
                    cooldown: None,
                    message: None,
                }
            }
        }
    }

    /// Turn a response into an outcome, reconciling its directive.
    fn settle(&self, response: EntryResponse, action: Action) -> Outcome {
        self.cooldown.reconcile(response.cooldown.as_ref());

        if response.is_success() {
            info!(?action, status = response.status, "Request accepted");
            return Outcome::Accepted {
                data: response.data,
            };
        }

        let severity = self.classify(response.error.as_deref());
        let message = response
            .message
            .or(response.error)
            .unwrap_or_else(|| action.failure_message().to_string());
        info!(?action, status = response.status, ?severity, "Request rejected");

        Outcome::Rejected {
            reason: RejectReason::Server { message, severity },
            cooldown: response.cooldown,
        }
    }

    /// Rejections whose error text mentions blocking or attacks are
    /// warnings; everything else is an error.
    fn classify(&self, error: Option<&str>) -> Severity {
        let Some(error) = error else {
            return Severity::Error;
        };
        let error = error.to_lowercase();
        if self
            .reporting
            .warning_terms
            .iter()
            .any(|term| error.contains(&term.to_lowercase()))
        {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}

fn busy() -> Outcome {
    debug!("Request refused while another is in flight");
    Outcome::Rejected {
        reason: RejectReason::Busy,
        cooldown: None,
    }
}
