// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Session context.
//!
//! Owns everything that lives for one user session: the guard with its
//! cooldown state, and the last entry listing. Created explicitly with
//! [`GuardSession::start`] and torn down with [`GuardSession::end`]; nothing
//! survives a restart.

use crate::client::{Entry, EntryBackend, HttpBackend};
use crate::config::Config;
use crate::cooldown::{CooldownState, CooldownTracker};
use crate::error::Result;
use crate::guard::{Outcome, SubmissionGuard, Target};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// One user session against the entries backend.
pub struct GuardSession<B> {
    guard: SubmissionGuard<B>,
    entries: RwLock<Vec<Entry>>,
}

impl GuardSession<HttpBackend> {
    /// Start a session against the configured HTTP backend.
    pub async fn connect(config: Config) -> Result<Self> {
        let backend = HttpBackend::new(&config.api)?;
        Self::start(config, backend).await
    }
}

impl<B: EntryBackend> GuardSession<B> {
    /// Start a session: seed the cooldown from the server and load the
    /// listing. Neither failing prevents the session from starting.
    pub async fn start(config: Config, backend: B) -> Result<Self> {
        config.validate()?;

        let session = Self {
            guard: SubmissionGuard::new(&config, backend),
            entries: RwLock::new(Vec::new()),
        };

        session.guard.sync_cooldown().await;
        session.refresh().await;

        info!(
            entries = session.entries.read().await.len(),
            cooldown_active = session.cooldown_state().active,
            "Session started"
        );
        Ok(session)
    }

    pub fn guard(&self) -> &SubmissionGuard<B> {
        &self.guard
    }

    pub fn cooldown(&self) -> &CooldownTracker {
        self.guard.cooldown()
    }

    pub fn cooldown_state(&self) -> CooldownState {
        self.guard.cooldown().snapshot()
    }

    /// Last loaded listing.
    pub async fn entries(&self) -> Vec<Entry> {
        self.entries.read().await.clone()
    }

    /// Reload the listing. Keeps the previous listing on failure.
    pub async fn refresh(&self) -> bool {
        match self.guard.backend().list().await {
            Ok(list) if list.success => {
                debug!(count = list.data.len(), "Listing refreshed");
                *self.entries.write().await = list.data;
                true
            }
            Ok(_) => {
                warn!("Listing request was not successful");
                false
            }
            Err(err) => {
                warn!(error = %err, "Could not load entries");
                false
            }
        }
    }

    /// Create an entry from `draft`, refreshing the listing on success.
    pub async fn create(&self, draft: &mut String) -> Outcome {
        self.submit(&Target::Create, draft).await
    }

    /// Replace the content of entry `id` with `draft`.
    pub async fn update(&self, id: &str, draft: &mut String) -> Outcome {
        self.submit(&Target::Update(id.to_string()), draft).await
    }

    /// Delete entry `id`, refreshing the listing on success.
    pub async fn delete(&self, id: &str) -> Outcome {
        let outcome = self.guard.delete(id).await;
        if outcome.is_accepted() {
            self.refresh().await;
        }
        outcome
    }

    async fn submit(&self, target: &Target, draft: &mut String) -> Outcome {
        let outcome = self.guard.submit(target, draft).await;
        if outcome.is_accepted() {
            self.refresh().await;
        }
        outcome
    }

    /// Tear the session down, stopping the countdown.
    pub async fn end(self) {
        self.guard.cooldown().shutdown();
        self.entries.write().await.clear();
        info!("Session ended");
    }
}
