// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Entries backend: wire types, the backend seam and its HTTP implementation.
//!
//! Routes, relative to the configured base URL:
//!
//! - `GET /entries`
//! - `POST /entries`, `PUT /entries/{id}`, `DELETE /entries/{id}`
//! - `POST /entries/report-attack`
//! - `GET /entries/cooldown/status`
//!
//! Any response body may carry a `cooldown` directive, whatever its status.

use crate::config::ApiConfig;
use crate::cooldown::{lenient_directive, CooldownDirective};
use crate::error::{GuardError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// A persisted entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    #[serde(rename = "contenido")]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of create, update and delete requests.
#[derive(Debug, Serialize)]
pub struct EntryPayload<'a> {
    #[serde(rename = "contenido")]
    pub content: &'a str,
}

/// Body of an attack report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackReport<'a> {
    pub attack_type: &'a str,
}

/// Response to create, update and delete.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryResponse {
    /// HTTP status code, filled in after decoding
    #[serde(skip)]
    pub status: u16,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_directive")]
    pub cooldown: Option<CooldownDirective>,
}

impl EntryResponse {
    /// Success needs both a 2xx status and `success: true`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.success
    }
}

/// Response to an attack report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_directive")]
    pub cooldown: Option<CooldownDirective>,
}

/// Response to the listing request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<Entry>,
}

/// Response to the cooldown status request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub cooldown: Option<CooldownStatus>,
}

/// Server-side view of the caller's throttle.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CooldownStatus {
    /// Explicit `false` means the caller is not throttled
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(flatten)]
    pub directive: CooldownDirective,
}

impl StatusResponse {
    /// Directive to apply, unless the server says the caller is clear.
    pub fn directive(&self) -> Option<&CooldownDirective> {
        self.cooldown
            .as_ref()
            .filter(|status| status.active != Some(false))
            .map(|status| &status.directive)
    }
}

/// The entries backend as seen by the guard.
///
/// `Err` means no usable response was obtained (transport failure or an
/// undecodable body). A rejection is an `Ok` response with `success: false`.
#[async_trait]
pub trait EntryBackend: Send + Sync {
    async fn list(&self) -> Result<ListResponse>;

    async fn create(&self, content: &str) -> Result<EntryResponse>;

    async fn update(&self, id: &str, content: &str) -> Result<EntryResponse>;

    async fn delete(&self, id: &str) -> Result<EntryResponse>;

    async fn report_attack(&self, attack_type: &str) -> Result<ReportResponse>;

    async fn cooldown_status(&self) -> Result<StatusResponse>;
}

/// `reqwest` implementation of [`EntryBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    /// Build a backend for the configured base URL.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base: parse_base(&config.base_url)?,
        })
    }

    /// Base URL with a trailing slash.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    fn entry_url(&self, id: &str) -> Result<Url> {
        let mut url = self.endpoint("entries")?;
        url.path_segments_mut()
            .map_err(|_| GuardError::InvalidConfig(format!("{} cannot be a base URL", self.base)))?
            .push(id);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<(u16, T)> {
        let resp = request.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        debug!(status, bytes = text.len(), "Backend responded");
        Ok((status, serde_json::from_str(&text)?))
    }

    async fn send_entry(&self, request: RequestBuilder) -> Result<EntryResponse> {
        let (status, mut body): (u16, EntryResponse) = self.send(request).await?;
        body.status = status;
        Ok(body)
    }
}

#[async_trait]
impl EntryBackend for HttpBackend {
    async fn list(&self) -> Result<ListResponse> {
        let url = self.endpoint("entries")?;
        let (_, body) = self.send(self.client.get(url)).await?;
        Ok(body)
    }

    async fn create(&self, content: &str) -> Result<EntryResponse> {
        let url = self.endpoint("entries")?;
        self.send_entry(self.client.post(url).json(&EntryPayload { content }))
            .await
    }

    async fn update(&self, id: &str, content: &str) -> Result<EntryResponse> {
        let url = self.entry_url(id)?;
        self.send_entry(self.client.put(url).json(&EntryPayload { content }))
            .await
    }

    async fn delete(&self, id: &str) -> Result<EntryResponse> {
        let url = self.entry_url(id)?;
        self.send_entry(self.client.delete(url)).await
    }

    async fn report_attack(&self, attack_type: &str) -> Result<ReportResponse> {
        let url = self.endpoint("entries/report-attack")?;
        let (_, body) = self
            .send(self.client.post(url).json(&AttackReport { attack_type }))
            .await?;
        Ok(body)
    }

    async fn cooldown_status(&self) -> Result<StatusResponse> {
        let url = self.endpoint("entries/cooldown/status")?;
        let (_, body) = self.send(self.client.get(url)).await?;
        Ok(body)
    }
}

/// Parse the base URL so that relative joins extend its path.
fn parse_base(base_url: &str) -> Result<Url> {
    let mut normalized = base_url.trim_end_matches('/').to_string();
    normalized.push('/');
    Ok(Url::parse(&normalized)?)
}
