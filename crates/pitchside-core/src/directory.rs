// Player directory source: the remote endpoint (or a local fixture file)
// serving the JSON array of player records.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::config::DirectoryConfig;
use crate::player::Player;

/// Read-only source of player records.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn fetch_players(&self) -> Result<Vec<Player>>;
}

/// Parse the directory payload: a JSON array of player objects.
pub fn parse_players_json(raw: &str) -> Result<Vec<Player>> {
    serde_json::from_str(raw).context("failed to parse player directory JSON")
}

/// Fetch the directory, degrading any failure to an empty list.
///
/// Failures are logged and never surfaced to the caller.
pub async fn load_directory(source: &dyn DirectorySource) -> Vec<Player> {
    match source.fetch_players().await {
        Ok(players) => {
            debug!("Directory returned {} players", players.len());
            players
        }
        Err(e) => {
            error!("Player directory fetch failed: {:#}", e);
            Vec::new()
        }
    }
}

/// Build the configured source: the fixture file when one is set, otherwise
/// the HTTP endpoint.
pub fn from_config(config: &DirectoryConfig) -> Result<Box<dyn DirectorySource>> {
    match &config.fixture {
        Some(path) => {
            info!("Using player fixture {}", path.display());
            Ok(Box::new(FileDirectory::new(path.clone())))
        }
        None => Ok(Box::new(HttpDirectory::new(
            &config.url,
            Duration::from_secs(config.timeout_secs),
        )?)),
    }
}

// ---------------------------------------------------------------------------
// HttpDirectory
// ---------------------------------------------------------------------------

/// Single unauthenticated GET against a fixed endpoint.
pub struct HttpDirectory {
    http: reqwest::Client,
    url: String,
}

impl HttpDirectory {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl DirectorySource for HttpDirectory {
    async fn fetch_players(&self) -> Result<Vec<Player>> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.url))?;
        let status = resp.status();
        let body = resp.text().await.context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, body));
        }
        parse_players_json(&body)
    }
}

// ---------------------------------------------------------------------------
// FileDirectory
// ---------------------------------------------------------------------------

/// Directory served from a local JSON file.
pub struct FileDirectory {
    path: PathBuf,
}

impl FileDirectory {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DirectorySource for FileDirectory {
    async fn fetch_players(&self) -> Result<Vec<Player>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        parse_players_json(&raw)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
