//! Rust client for the Carnet journal HTTP API.
//!
//! Thin wrapper over `reqwest` that unwraps the server's
//! `{success, data, error}` envelope and speaks `carnet-core` types.
//!
//! # Example
//! ```rust,no_run
//! use carnet_client::CarnetClient;
//! use carnet_core::{EntryBody, Grace};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let user = uuid::Uuid::now_v7();
//!     let client = CarnetClient::new("http://localhost:9091", user);
//!
//!     let entry = client.create_entry(&EntryBody::Grace(Grace {
//!         date: chrono::NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
//!         text: "A quiet morning".into(),
//!         location: None,
//!         tags: vec![],
//!     })).await?;
//!
//!     println!("Created {}", entry.entry_ref());
//!     Ok(())
//! }
//! ```
use anyhow::{anyhow, bail, Context};
use carnet_core::{
    Entry, EntryBody, EntryDetail, EntryRef, EntrySummary, EntryVariant, GraphExport, LinkId,
    LinkKind, LinkedEntry, SpiritualLink, UserId, ViewOrigin,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Header carrying the acting user's id.
pub const USER_HEADER: &str = "x-carnet-user";

/// Body of `POST /links`. Field names follow the stored link shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateLinkRequest {
    #[serde(rename = "element_source_type")]
    pub source_variant: EntryVariant,
    #[serde(rename = "element_source_id")]
    pub source_id: uuid::Uuid,
    #[serde(rename = "element_cible_type")]
    pub target_variant: EntryVariant,
    #[serde(rename = "element_cible_id")]
    pub target_id: uuid::Uuid,
    #[serde(rename = "type_lien")]
    pub kind: LinkKind,
    #[serde(default)]
    pub description: String,
}

impl CreateLinkRequest {
    pub fn new(
        source: EntryRef,
        target: EntryRef,
        kind: LinkKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source_variant: source.variant,
            source_id: source.id,
            target_variant: target.variant,
            target_id: target.id,
            kind,
            description: description.into(),
        }
    }

    pub fn source(&self) -> EntryRef {
        EntryRef::new(self.source_variant, self.source_id)
    }

    pub fn target(&self) -> EntryRef {
        EntryRef::new(self.target_variant, self.target_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthInfo {
    pub healthy: bool,
    pub version: String,
    pub entry_count: u64,
    pub link_count: u64,
    /// Seconds since the server started.
    #[serde(default)]
    pub uptime_secs: u64,
}

/// Display metadata for one link kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkKindInfo {
    pub kind: LinkKind,
    pub label: String,
    pub icon: String,
}

impl From<LinkKind> for LinkKindInfo {
    fn from(kind: LinkKind) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            icon: kind.icon().to_string(),
        }
    }
}

/// Outcome of a delete that may remove links along the way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Removed {
    pub links_removed: usize,
}

/// Query of the graph endpoints.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphQuery {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub hover: Option<EntryRef>,
}

impl GraphQuery {
    fn to_pairs(self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(w) = self.width {
            pairs.push(("width", w.to_string()));
        }
        if let Some(h) = self.height {
            pairs.push(("height", h.to_string()));
        }
        if let Some(hover) = self.hover {
            pairs.push(("hover", hover.to_string()));
        }
        pairs
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

/// Client for one user of a running Carnet server.
#[derive(Debug, Clone)]
pub struct CarnetClient {
    http: reqwest::Client,
    base: String,
    user: UserId,
}

impl CarnetClient {
    /// `base` is the server root, e.g. `"http://localhost:9091"`.
    pub fn new(base: impl Into<String>, user: UserId) -> Self {
        Self::with_http(reqwest::Client::new(), base, user)
    }

    pub fn with_http(http: reqwest::Client, base: impl Into<String>, user: UserId) -> Self {
        Self {
            http,
            base: base.into().trim_end_matches('/').to_string(),
            user,
        }
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base, path))
            .header(USER_HEADER, self.user.to_string())
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> anyhow::Result<T> {
        let resp = req.send().await.context("Failed to reach Carnet server")?;
        let status = resp.status();
        let envelope: Envelope<T> = resp
            .json()
            .await
            .with_context(|| format!("Unexpected response body (HTTP {})", status))?;

        if !envelope.success {
            bail!(
                "HTTP {}: {}",
                status,
                envelope.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
        envelope
            .data
            .ok_or_else(|| anyhow!("HTTP {}: response carried no data", status))
    }

    pub async fn health(&self) -> anyhow::Result<HealthInfo> {
        self.send(self.request(Method::GET, "/health")).await
    }

    /// List entries with their link counts, optionally restricted to one variant.
    pub async fn list_entries(
        &self,
        variant: Option<EntryVariant>,
    ) -> anyhow::Result<Vec<EntrySummary>> {
        let mut req = self.request(Method::GET, "/entries");
        if let Some(v) = variant {
            req = req.query(&[("variant", v.as_str())]);
        }
        self.send(req).await
    }

    pub async fn get_entry(
        &self,
        entry: EntryRef,
        origin: ViewOrigin,
    ) -> anyhow::Result<EntryDetail> {
        let from = match origin {
            ViewOrigin::List => "list",
            ViewOrigin::Graph => "graph",
        };
        self.send(self.request(Method::GET, &entry.path()).query(&[("from", from)]))
            .await
    }

    pub async fn create_entry(&self, body: &EntryBody) -> anyhow::Result<Entry> {
        self.send(self.request(Method::POST, "/entries").json(body)).await
    }

    pub async fn update_entry(&self, entry: EntryRef, body: &EntryBody) -> anyhow::Result<Entry> {
        self.send(self.request(Method::PUT, &entry.path()).json(body))
            .await
    }

    /// Delete an entry. Returns how many links went with it.
    pub async fn delete_entry(&self, entry: EntryRef) -> anyhow::Result<usize> {
        let removed: Removed = self
            .send(self.request(Method::DELETE, &entry.path()))
            .await?;
        Ok(removed.links_removed)
    }

    pub async fn entry_links(&self, entry: EntryRef) -> anyhow::Result<Vec<LinkedEntry>> {
        self.send(self.request(Method::GET, &format!("{}/links", entry.path())))
            .await
    }

    pub async fn list_links(&self) -> anyhow::Result<Vec<SpiritualLink>> {
        self.send(self.request(Method::GET, "/links")).await
    }

    pub async fn create_link(&self, req: &CreateLinkRequest) -> anyhow::Result<SpiritualLink> {
        self.send(self.request(Method::POST, "/links").json(req)).await
    }

    pub async fn delete_link(&self, id: LinkId) -> anyhow::Result<()> {
        let _: serde_json::Value = self
            .send(self.request(Method::DELETE, &format!("/links/{}", id)))
            .await?;
        Ok(())
    }

    /// Remove links whose endpoints no longer exist.
    pub async fn prune_links(&self) -> anyhow::Result<usize> {
        let removed: Removed = self
            .send(self.request(Method::POST, "/links/prune"))
            .await?;
        Ok(removed.links_removed)
    }

    pub async fn link_kinds(&self) -> anyhow::Result<Vec<LinkKindInfo>> {
        self.send(self.request(Method::GET, "/link-kinds")).await
    }

    pub async fn graph(&self, query: GraphQuery) -> anyhow::Result<GraphExport> {
        self.send(self.request(Method::GET, "/graph").query(&query.to_pairs()))
            .await
    }

    /// The graph as a standalone SVG document. Not enveloped.
    pub async fn graph_svg(&self, query: GraphQuery) -> anyhow::Result<String> {
        let resp = self
            .request(Method::GET, "/graph/svg")
            .query(&query.to_pairs())
            .send()
            .await
            .context("Failed to reach Carnet server")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("HTTP {}: {}", status, body);
        }
        Ok(resp.text().await?)
    }
}
