//! Gauge collection and pushgateway export.
//!
//! The collector is constructed per run, populated by whoever has state
//! worth reporting, and pushed once at the end. A push failure is the
//! caller's to log; nothing here treats it as fatal.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Default request timeout for the push.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Metrics adapter errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The configured pushgateway URL or job name was unusable.
    #[error("invalid push target: {reason}")]
    InvalidTarget { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The gateway rejected the push.
    #[error("pushgateway error ({status}): {message}")]
    Gateway { status: u16, message: String },
}

/// A per-run set of named gauges.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    gauges: BTreeMap<String, f64>,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a gauge, replacing any earlier value under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.gauges.insert(name.into(), value);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty()
    }

    /// Renders the gauges in text exposition format, one `# TYPE` header
    /// and one sample per gauge, in name order.
    #[must_use]
    pub fn to_text(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        for (name, value) in &self.gauges {
            // write! to a String cannot fail
            let _ = writeln!(out, "# TYPE {name} gauge");
            let _ = writeln!(out, "{name} {value}");
        }
        out
    }
}

/// Pushgateway client bound to one job.
pub struct MetricsPushClient {
    http: reqwest::Client,
    push_url: String,
}

impl fmt::Debug for MetricsPushClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsPushClient")
            .field("push_url", &self.push_url)
            .finish_non_exhaustive()
    }
}

impl MetricsPushClient {
    /// Creates a client pushing to `base_url` under `job`.
    ///
    /// # Errors
    ///
    /// Returns an error if either argument is empty, or if the HTTP client
    /// fails to build.
    pub fn new(base_url: &str, job: &str) -> Result<Self, MetricsError> {
        if base_url.trim().is_empty() {
            return Err(MetricsError::InvalidTarget {
                reason: "pushgateway URL cannot be empty",
            });
        }
        if job.trim().is_empty() {
            return Err(MetricsError::InvalidTarget {
                reason: "job name cannot be empty",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(MetricsError::ClientBuild)?;

        Ok(Self {
            http,
            push_url: format!("{}/metrics/job/{job}", base_url.trim_end_matches('/')),
        })
    }

    /// Pushes the collector's gauges. An empty collector is a no-op.
    pub async fn push(&self, collector: &MetricsCollector) -> Result<(), MetricsError> {
        if collector.is_empty() {
            tracing::debug!("no gauges to push");
            return Ok(());
        }

        let response = self
            .http
            .put(&self.push_url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain; version=0.0.4")
            .body(collector.to_text())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MetricsError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(push_url = %self.push_url, "pushed metrics");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_renders_gauges_in_name_order() {
        let mut collector = MetricsCollector::new();
        collector.set("nest_humidity", 45.0);
        collector.set("nest_ambient_temperature_f", 71.5);

        let text = collector.to_text();
        assert_eq!(
            text,
            "# TYPE nest_ambient_temperature_f gauge\n\
             nest_ambient_temperature_f 71.5\n\
             # TYPE nest_humidity gauge\n\
             nest_humidity 45\n"
        );
    }

    #[test]
    fn collector_replaces_values_under_the_same_name() {
        let mut collector = MetricsCollector::new();
        collector.set("nest_user_state", 0.0);
        collector.set("nest_user_state", 1.0);

        assert_eq!(
            collector.to_text(),
            "# TYPE nest_user_state gauge\nnest_user_state 1\n"
        );
    }

    #[test]
    fn empty_collector_renders_nothing() {
        let collector = MetricsCollector::new();
        assert!(collector.is_empty());
        assert_eq!(collector.to_text(), "");
    }

    #[test]
    fn push_client_rejects_empty_target() {
        assert!(matches!(
            MetricsPushClient::new("", "wfh"),
            Err(MetricsError::InvalidTarget { .. })
        ));
        assert!(matches!(
            MetricsPushClient::new("http://localhost:9091", ""),
            Err(MetricsError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn push_client_builds_job_url() {
        let client = MetricsPushClient::new("http://localhost:9091/", "wfh").unwrap();
        assert_eq!(client.push_url, "http://localhost:9091/metrics/job/wfh");
    }
}
