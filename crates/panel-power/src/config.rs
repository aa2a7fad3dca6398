//! Connection and scenario configuration
//!
//! JSON file (all fields optional) plus environment overrides:
//!
//! - `STK_CONNECT_ADDR`: Connect address used for every candidate version
//! - `STK_CONNECT_TIMEOUT_MS`: per-command read/write timeout

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use stk_connect::client::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_IO_TIMEOUT_MS};
use stk_connect::{Endpoint, StkVersion, TcpConnector};
use uuid::Uuid;

use crate::{PanelPowerError, RenderMethod, Result};

pub const ENV_CONNECT_ADDR: &str = "STK_CONNECT_ADDR";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "STK_CONNECT_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// Candidate endpoints, tried in order
    pub endpoints: Vec<Endpoint>,
    pub connect_timeout_ms: u64,
    pub io_timeout_ms: u64,
    pub scenario: ScenarioOptions,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            endpoints: StkVersion::FALLBACK_ORDER
                .iter()
                .map(|&v| Endpoint::local(v))
                .collect(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            io_timeout_ms: DEFAULT_IO_TIMEOUT_MS,
            scenario: ScenarioOptions::default(),
        }
    }
}

impl ConnectConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ConnectConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// File (or defaults) plus environment overrides, validated
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(
            std::env::var(ENV_CONNECT_ADDR).ok(),
            std::env::var(ENV_CONNECT_TIMEOUT_MS).ok(),
        )?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, address: Option<String>, io_timeout_ms: Option<String>) -> Result<()> {
        if let Some(address) = address {
            for endpoint in &mut self.endpoints {
                endpoint.address = address.clone();
            }
        }
        if let Some(ms) = io_timeout_ms {
            self.io_timeout_ms = ms.trim().parse().map_err(|_| {
                PanelPowerError::Config(format!("{} must be milliseconds, got '{}'", ENV_CONNECT_TIMEOUT_MS, ms))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(PanelPowerError::Config("no STK endpoints configured".to_string()));
        }
        let versions = self.versions();
        if let Some(dup) = versions
            .iter()
            .enumerate()
            .find(|(i, v)| versions[..*i].contains(v))
            .map(|(_, v)| v)
        {
            return Err(PanelPowerError::Config(format!("STK {} listed twice", dup)));
        }
        if self.connect_timeout_ms == 0 || self.io_timeout_ms == 0 {
            return Err(PanelPowerError::Config("timeouts must be non-zero".to_string()));
        }
        self.scenario.validate()
    }

    /// Candidate versions in fallback order
    pub fn versions(&self) -> Vec<StkVersion> {
        self.endpoints.iter().map(|e| e.version).collect()
    }

    pub fn connector(&self) -> TcpConnector {
        TcpConnector::new(self.endpoints.clone())
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .io_timeout(Duration::from_millis(self.io_timeout_ms))
    }
}

/// Names and teardown behaviour for the scenario a run creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioOptions {
    /// Generated when absent
    pub scenario_name: Option<String>,
    pub satellite_name: String,
    /// Leave the scenario loaded after the run
    pub keep_scenario_open: bool,
    pub render_method: RenderMethod,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            scenario_name: None,
            satellite_name: "PowerSat".to_string(),
            keep_scenario_open: false,
            render_method: RenderMethod::default(),
        }
    }
}

impl ScenarioOptions {
    /// Configured scenario name, or `Power_<uuid>`
    pub fn resolve_scenario_name(&self) -> String {
        self.scenario_name
            .clone()
            .unwrap_or_else(|| format!("Power_{}", Uuid::new_v4().simple()))
    }

    pub fn validate(&self) -> Result<()> {
        let names = self.scenario_name.iter().chain(std::iter::once(&self.satellite_name));
        for name in names {
            if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == '"' || c == '/') {
                return Err(PanelPowerError::Config(format!(
                    "object name '{}' must be a single token without '/' or quotes",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ConnectConfig::default();
        assert_eq!(config.versions(), StkVersion::FALLBACK_ORDER.to_vec());
        assert_eq!(config.endpoints[0].address, "127.0.0.1:5001");
        assert!(config.validate().is_ok());
        assert!(!config.scenario.keep_scenario_open);
    }

    #[test]
    fn test_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "endpoints": [{{"version": 12, "address": "10.0.0.5:5001"}}],
                "scenario": {{"scenario_name": "Legacy", "keep_scenario_open": true}}
            }}"#
        )
        .unwrap();

        let config = ConnectConfig::from_file(file.path()).unwrap();
        assert_eq!(config.versions(), vec![StkVersion(12)]);
        assert_eq!(config.io_timeout_ms, DEFAULT_IO_TIMEOUT_MS);
        assert_eq!(config.scenario.satellite_name, "PowerSat");
        assert_eq!(config.scenario.resolve_scenario_name(), "Legacy");
        assert!(config.scenario.keep_scenario_open);
        assert_eq!(config.connector().versions(), vec![StkVersion(12)]);
    }

    #[test]
    fn test_overrides() {
        let mut config = ConnectConfig::default();
        config
            .apply_overrides(Some("stk-host:6001".to_string()), Some("1500".to_string()))
            .unwrap();
        assert!(config.endpoints.iter().all(|e| e.address == "stk-host:6001"));
        assert_eq!(config.io_timeout_ms, 1500);

        assert!(matches!(
            config.apply_overrides(None, Some("soon".to_string())),
            Err(PanelPowerError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = ConnectConfig::default();
        config.endpoints.push(Endpoint::local(StkVersion(11)));
        assert!(config.validate().is_err());

        let mut config = ConnectConfig::default();
        config.endpoints.clear();
        assert!(config.validate().is_err());

        let mut config = ConnectConfig::default();
        config.scenario.satellite_name = "Power Sat".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_generated_scenario_names() {
        let options = ScenarioOptions::default();
        let a = options.resolve_scenario_name();
        let b = options.resolve_scenario_name();
        assert!(a.starts_with("Power_"));
        assert_ne!(a, b);
        assert!(ScenarioOptions { scenario_name: Some(a), ..options }.validate().is_ok());
    }
}
