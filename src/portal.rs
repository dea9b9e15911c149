//! Polling transparency portal.
//!
//! Fetches one neighborhood's metrics from the city API on a fixed period and
//! mounts the rendered fragments on a [`RenderTarget`]. Failures are logged and
//! kept in a short history instead of being returned.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::PortalConfig;
use crate::error::{PortalError, Result};
use crate::metrics::NeighborhoodMetrics;
use crate::render;
use crate::target::RenderTarget;

/// One failed refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEntry {
    pub ts: DateTime<Utc>,
    pub message: String,
}

pub struct TransparencyPortal {
    config: PortalConfig,
    client: reqwest::Client,
    target: Box<dyn RenderTarget>,
    metrics: Option<NeighborhoodMetrics>,
    errors: VecDeque<ErrorEntry>,
    last_update: Option<DateTime<Utc>>,
}

impl TransparencyPortal {
    pub fn new(config: PortalConfig, target: Box<dyn RenderTarget>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .user_agent(concat!("transparency-portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PortalError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let capacity = config.error_history.max(1);
        Ok(Self {
            config,
            client,
            target,
            metrics: None,
            errors: VecDeque::with_capacity(capacity),
            last_update: None,
        })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn metrics(&self) -> Option<&NeighborhoodMetrics> {
        self.metrics.as_ref()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Retained failures, oldest first
    pub fn errors(&self) -> impl Iterator<Item = &ErrorEntry> {
        self.errors.iter()
    }

    pub fn metrics_path(&self) -> String {
        format!(
            "/neighborhoods/{}/metrics",
            urlencoding::encode(&self.config.neighborhood_id)
        )
    }

    /// GET `{base_url}{path}` and decode the JSON body.
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(PortalError::Http { status, body });
        }

        Ok(response.json::<T>().await?)
    }

    /// One poll. Never fails; errors land in the history and the error list.
    pub async fn refresh_metrics(&mut self) {
        match self.try_refresh().await {
            Ok(()) => debug!(
                "Metrics refreshed for {}",
                self.config.neighborhood_id
            ),
            Err(e) => {
                error!("Metrics fetch failed: {}", e);
                self.record_error(e.to_string());
                if let Err(render_err) = self.render_errors().await {
                    warn!("Could not mount error list: {}", render_err);
                }
            }
        }
    }

    async fn try_refresh(&mut self) -> Result<()> {
        let path = self.metrics_path();
        let metrics: NeighborhoodMetrics = self.fetch_json(&path).await?;
        self.metrics = Some(metrics);
        self.last_update = Some(Utc::now());
        self.render().await
    }

    fn record_error(&mut self, message: String) {
        while self.errors.len() >= self.config.error_history.max(1) {
            self.errors.pop_front();
        }
        self.errors.push_back(ErrorEntry {
            ts: Utc::now(),
            message,
        });
    }

    /// Mount the metrics body; nothing to do before the first successful fetch.
    pub async fn render(&self) -> Result<()> {
        let (Some(metrics), Some(updated)) = (&self.metrics, &self.last_update) else {
            return Ok(());
        };
        let html = render::render_metrics(metrics, updated);
        self.target.mount_root(&html).await
    }

    pub async fn render_errors(&self) -> Result<()> {
        let html = render::render_errors(&self.errors);
        self.target.mount_errors(&html).await
    }

    /// Refresh now, then every `refresh_ms`, until `shutdown` fires.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        let period = self.config.refresh_interval();
        info!(
            "Polling {} for {} every {}ms",
            self.config.base_url,
            self.config.neighborhood_id,
            period.as_millis()
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.refresh_metrics().await,
            }
        }
        info!("Portal polling stopped");
    }

    /// Run the loop on its own task; the portal comes back once it stops.
    pub fn spawn(mut self, shutdown: CancellationToken) -> JoinHandle<Self> {
        tokio::spawn(async move {
            self.run(shutdown).await;
            self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::MemoryTarget;

    fn portal(id: &str, history: usize) -> TransparencyPortal {
        let config = PortalConfig {
            error_history: history,
            ..PortalConfig::new("http://127.0.0.1:9/api/", id)
        };
        TransparencyPortal::new(config, Box::new(MemoryTarget::new())).unwrap()
    }

    #[test]
    fn metrics_path_encodes_neighborhood_id() {
        assert_eq!(
            portal("phx-west-001", 5).metrics_path(),
            "/neighborhoods/phx-west-001/metrics"
        );
        assert_eq!(
            portal("west side/7", 5).metrics_path(),
            "/neighborhoods/west%20side%2F7/metrics"
        );
    }

    #[test]
    fn error_history_drops_oldest() {
        let mut p = portal("n", 3);
        for i in 0..5 {
            p.record_error(format!("e{i}"));
        }
        let kept: Vec<&str> = p.errors().map(|e| e.message.as_str()).collect();
        assert_eq!(kept, ["e2", "e3", "e4"]);
    }

    #[tokio::test]
    async fn render_before_first_fetch_mounts_nothing() {
        let target = MemoryTarget::new();
        let p = TransparencyPortal::new(
            PortalConfig::new("http://127.0.0.1:9/api", "n"),
            Box::new(target.clone()),
        )
        .unwrap();

        p.render().await.unwrap();
        assert_eq!(target.snapshot().root_mounts, 0);
    }
}
