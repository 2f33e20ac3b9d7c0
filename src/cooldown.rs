// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client-side cooldown state and its countdown.
//!
//! The server is the authority: any directive it sends replaces the local
//! state wholesale. Between directives a local ticker counts the remaining
//! seconds down and clears the state when they run out. Both writers go
//! through the same watch channel without further locking, so the most
//! recent write wins.

use crate::config::CooldownConfig;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

/// Seconds applied when a directive does not say how long to wait.
pub const DEFAULT_COOLDOWN_SECS: u64 = 30;

/// Kind of throttling the server imposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CooldownKind {
    /// Short rate-limit pause
    Cooldown,
    /// Harsher penalty, e.g. after a reported attack
    Blocked,
}

impl CooldownKind {
    /// Parse the wire value. Unknown values yield `None`.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "cooldown" => Some(Self::Cooldown),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

impl std::fmt::Display for CooldownKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cooldown => write!(f, "cooldown"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

/// Server instruction to enter a cooldown. Every field is optional on the
/// wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownDirective {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<CooldownKind>,

    #[serde(
        default,
        deserialize_with = "lenient_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub remaining_seconds: Option<i64>,

    #[serde(
        default,
        deserialize_with = "lenient_reason",
        skip_serializing_if = "Option::is_none"
    )]
    pub reason: Option<String>,
}

// The decoders below never fail. A directive with badly typed fields still
// throttles, with the defaults filling in whatever could not be read.

/// An unrecognised or non-string `type` still throttles, as a plain cooldown.
fn lenient_kind<'de, D>(deserializer: D) -> Result<Option<CooldownKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(CooldownKind::from_wire))
}

/// Integers as is, floats truncated, numeric strings parsed.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(seconds_from_value))
}

fn seconds_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

fn lenient_reason<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Decode the `cooldown` field of a response body.
///
/// An object is read field by field. Any other truthy value is an
/// instruction to throttle with defaults; `null`, `false`, `0` and `""`
/// mean no directive.
pub(crate) fn lenient_directive<'de, D>(
    deserializer: D,
) -> Result<Option<CooldownDirective>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(object @ Value::Object(_)) => Some(serde_json::from_value(object).unwrap_or_default()),
        Some(_) => Some(CooldownDirective::default()),
    })
}

/// Local view of the throttle.
///
/// At rest the state is inactive with zero seconds remaining.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownState {
    pub active: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<CooldownKind>,
    pub remaining_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CooldownState {
    /// The rest state.
    pub fn clear() -> Self {
        Self::default()
    }

    /// State entered on receipt of `directive`.
    ///
    /// A missing type means `cooldown`; a missing, zero or negative duration
    /// means `default_secs`.
    pub fn from_directive(directive: &CooldownDirective, default_secs: u64) -> Self {
        let remaining_seconds = match directive.remaining_seconds {
            Some(secs) if secs > 0 => secs as u64,
            _ => default_secs,
        };
        Self {
            active: true,
            kind: Some(directive.kind.unwrap_or(CooldownKind::Cooldown)),
            remaining_seconds,
            reason: directive.reason.clone(),
        }
    }

    /// Advance the countdown by one second. Returns whether the state is
    /// still active afterwards.
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }
        if self.remaining_seconds <= 1 {
            *self = Self::clear();
            return false;
        }
        self.remaining_seconds -= 1;
        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_blocked(&self) -> bool {
        self.active && self.kind == Some(CooldownKind::Blocked)
    }

    /// Creates and edits are refused while any throttle is active.
    pub fn refuses_submission(&self) -> bool {
        self.active
    }

    /// Deletes are refused only while blocked.
    pub fn refuses_deletion(&self) -> bool {
        self.is_blocked()
    }
}

/// Owner of the session's cooldown state and of the countdown task.
///
/// The countdown task only exists while the state is active. It is replaced
/// whenever a directive arrives and aborted on [`CooldownTracker::shutdown`]
/// or drop.
pub struct CooldownTracker {
    config: CooldownConfig,
    state: Arc<watch::Sender<CooldownState>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl CooldownTracker {
    /// Create an inactive tracker.
    pub fn new(config: CooldownConfig) -> Self {
        let (tx, _rx) = watch::channel(CooldownState::clear());
        Self {
            config,
            state: Arc::new(tx),
            ticker: Mutex::new(None),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> CooldownState {
        self.state.borrow().clone()
    }

    /// Observe state changes, including every countdown tick.
    pub fn subscribe(&self) -> watch::Receiver<CooldownState> {
        self.state.subscribe()
    }

    /// Whether a countdown task is currently running.
    pub fn is_ticking(&self) -> bool {
        self.lock_ticker()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Apply the directive carried by a response, if any.
    ///
    /// Absence of a directive never shortens an existing cooldown. Must be
    /// called from within a Tokio runtime.
    pub fn reconcile(&self, directive: Option<&CooldownDirective>) -> Option<CooldownState> {
        let directive = directive?;
        let next = CooldownState::from_directive(directive, self.config.default_seconds);

        info!(
            kind = ?next.kind,
            remaining_seconds = next.remaining_seconds,
            reason = ?next.reason,
            "Cooldown directive applied"
        );

        let mut ticker = self.lock_ticker();
        if let Some(previous) = ticker.take() {
            previous.abort();
        }
        self.state.send_replace(next.clone());
        *ticker = Some(self.spawn_ticker());

        Some(next)
    }

    /// Clear the state and stop the countdown. Used on session teardown.
    pub fn shutdown(&self) {
        if let Some(handle) = self.lock_ticker().take() {
            handle.abort();
        }
        self.state.send_replace(CooldownState::clear());
        debug!("Cooldown tracker shut down");
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let period = self.config.tick_period();

        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let mut still_active = false;
                state.send_modify(|s| still_active = s.tick());
                if !still_active {
                    info!("Cooldown expired");
                    break;
                }
            }
        })
    }

    fn lock_ticker(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ticker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new(CooldownConfig::default())
    }
}

impl Drop for CooldownTracker {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_ticker().take() {
            handle.abort();
        }
    }
}
