// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome tallies for attack simulation runs.

use content_guard::{Outcome, RejectReason};
use std::collections::HashMap;
use std::fmt;

/// Coarse classification of a pipeline outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Accepted,
    AttackReported,
    ValidationFailed,
    Throttled,
    Busy,
    ServerRejected,
    NetworkError,
}

impl From<&Outcome> for Verdict {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Accepted { .. } => Verdict::Accepted,
            Outcome::AttackReported { .. } => Verdict::AttackReported,
            Outcome::NetworkError => Verdict::NetworkError,
            Outcome::Rejected { reason, .. } => match reason {
                RejectReason::Validation(_) => Verdict::ValidationFailed,
                RejectReason::Throttled(_) => Verdict::Throttled,
                RejectReason::Busy => Verdict::Busy,
                RejectReason::Server { .. } => Verdict::ServerRejected,
            },
        }
    }
}

/// Collects outcomes during a simulation.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    outcomes: HashMap<Verdict, usize>,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &Outcome) {
        *self.outcomes.entry(Verdict::from(outcome)).or_insert(0) += 1;
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.outcomes.get(&verdict).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Share of attempts that did not get through (0.0-1.0).
    pub fn block_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            1.0 - self.count(Verdict::Accepted) as f64 / self.total() as f64
        }
    }
}

impl fmt::Display for PipelineMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Pipeline Report ===")?;
        writeln!(f, "Total:           {}", self.total())?;
        for verdict in [
            Verdict::Accepted,
            Verdict::AttackReported,
            Verdict::ValidationFailed,
            Verdict::Throttled,
            Verdict::Busy,
            Verdict::ServerRejected,
            Verdict::NetworkError,
        ] {
            writeln!(f, "{:<16} {}", format!("{verdict:?}:"), self.count(verdict))?;
        }
        write!(f, "Block rate:      {:.1}%", self.block_rate() * 100.0)
    }
}
