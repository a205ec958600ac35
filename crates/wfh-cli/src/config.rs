//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono_tz::Tz;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// A presence signal source selectable in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Today's calendar markers.
    Calendar,
    /// Reference device visible on the local network.
    Network,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Calendar => "calendar",
            Self::Network => "network",
        };
        f.write_str(s)
    }
}

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Calendar holding the work-presence markers.
    pub calendar_id: String,
    /// OAuth access token for the calendar API.
    pub calendar_token: Option<String>,
    /// IANA timezone of the work calendar.
    pub timezone: String,
    /// Thermostat vendor access token.
    pub nest_token: Option<String>,
    /// Thermostat vendor endpoint.
    pub nest_api_url: String,
    /// Weather API key.
    pub weather_api_key: Option<String>,
    /// Weather location (city id).
    pub weather_city_id: Option<String>,
    /// Subnet scanned when probing for the reference device.
    pub subnet: Option<String>,
    /// MAC address of the reference device.
    pub reference_mac: Option<String>,
    /// Pushgateway base URL; metrics are skipped when unset.
    pub pushgateway_url: Option<String>,
    /// Job label used for pushed metrics.
    pub metrics_job: String,
    /// Presence sources, evaluated in order.
    pub presence_sources: Vec<SourceKind>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("calendar_id", &self.calendar_id)
            .field(
                "calendar_token",
                &self.calendar_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timezone", &self.timezone)
            .field("nest_token", &self.nest_token.as_ref().map(|_| "[REDACTED]"))
            .field("nest_api_url", &self.nest_api_url)
            .field(
                "weather_api_key",
                &self.weather_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("weather_city_id", &self.weather_city_id)
            .field("subnet", &self.subnet)
            .field("reference_mac", &self.reference_mac)
            .field("pushgateway_url", &self.pushgateway_url)
            .field("metrics_job", &self.metrics_job)
            .field("presence_sources", &self.presence_sources)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            calendar_token: None,
            timezone: "UTC".to_string(),
            nest_token: None,
            nest_api_url: wfh_api::DEFAULT_NEST_API_URL.to_string(),
            weather_api_key: None,
            weather_city_id: None,
            subnet: None,
            reference_mac: None,
            pushgateway_url: None,
            metrics_job: "wfh".to_string(),
            presence_sources: vec![SourceKind::Calendar],
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WFH_*)
        figment = figment.merge(Env::prefixed("WFH_"));

        figment.extract()
    }

    /// The work calendar's timezone.
    pub fn work_timezone(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {}", self.timezone))
    }

    /// The calendar access token, required for any calendar call.
    pub fn calendar_token(&self) -> anyhow::Result<&str> {
        required(
            self.calendar_token.as_deref(),
            "missing calendar token (set WFH_CALENDAR_TOKEN or calendar_token in config.toml)",
        )
    }

    /// The vendor access token, required for any thermostat call.
    pub fn nest_token(&self) -> anyhow::Result<&str> {
        required(
            self.nest_token.as_deref(),
            "missing vendor token (set WFH_NEST_TOKEN or nest_token in config.toml)",
        )
    }

    /// The scan subnet, required by the network presence source.
    pub fn subnet(&self) -> anyhow::Result<&str> {
        required(
            self.subnet.as_deref(),
            "missing subnet (set WFH_SUBNET or subnet in config.toml)",
        )
    }

    /// The reference MAC address, required by the network presence source.
    pub fn reference_mac(&self) -> anyhow::Result<&str> {
        required(
            self.reference_mac.as_deref(),
            "missing reference MAC (set WFH_REFERENCE_MAC or reference_mac in config.toml)",
        )
    }

    /// Weather key and city id, when both are configured.
    #[must_use]
    pub fn weather_location(&self) -> Option<(&str, &str)> {
        match (self.weather_api_key.as_deref(), self.weather_city_id.as_deref()) {
            (Some(key), Some(city)) => Some((key, city)),
            _ => None,
        }
    }
}

fn required<'a>(value: Option<&'a str>, message: &'static str) -> anyhow::Result<&'a str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .context(message)
}

/// Returns the platform-specific config directory for wfh.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wfh"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_selects_calendar_source_only() {
        let config = Config::default();
        assert_eq!(config.presence_sources, vec![SourceKind::Calendar]);
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.metrics_job, "wfh");
    }

    #[test]
    fn default_timezone_parses() {
        assert_eq!(Config::default().work_timezone().unwrap(), chrono_tz::UTC);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            calendar_id = "work@example.com"
            timezone = "America/New_York"
            presence_sources = ["network", "calendar"]
            subnet = "192.168.1.0/24"
            reference_mac = "aa:bb:cc:dd:ee:ff"
            "#
        )
        .unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.calendar_id, "work@example.com");
        assert_eq!(config.work_timezone().unwrap(), chrono_tz::America::New_York);
        assert_eq!(
            config.presence_sources,
            vec![SourceKind::Network, SourceKind::Calendar]
        );
        assert_eq!(config.subnet().unwrap(), "192.168.1.0/24");
        // Untouched fields keep their defaults.
        assert_eq!(config.nest_api_url, wfh_api::DEFAULT_NEST_API_URL);
    }

    #[test]
    fn missing_secrets_produce_actionable_errors() {
        let config = Config::default();
        let err = config.calendar_token().unwrap_err();
        assert!(err.to_string().contains("WFH_CALENDAR_TOKEN"));
        let err = config.nest_token().unwrap_err();
        assert!(err.to_string().contains("WFH_NEST_TOKEN"));
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let config = Config {
            calendar_token: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(config.calendar_token().is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = Config {
            calendar_token: Some("token-a".to_string()),
            nest_token: Some("token-b".to_string()),
            weather_api_key: Some("key-c".to_string()),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("token-a"));
        assert!(!debug.contains("token-b"));
        assert!(!debug.contains("key-c"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn weather_location_requires_both_fields() {
        let mut config = Config::default();
        assert!(config.weather_location().is_none());
        config.weather_api_key = Some("key".to_string());
        assert!(config.weather_location().is_none());
        config.weather_city_id = Some("5128581".to_string());
        assert_eq!(config.weather_location(), Some(("key", "5128581")));
    }
}
