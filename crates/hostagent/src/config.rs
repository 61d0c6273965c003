//! Configuration loading and types

use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{WrapErr, bail, eyre};
use hostagent_client::DeliveryConfig;
use hostagent_inventory::FetcherConfig;
use serde::{Deserialize, Serialize};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "HOSTAGENT_CONFIG";

/// Top-level configuration of the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Agent-wide settings
    #[serde(default)]
    pub agent: AgentConfig,
    /// Collector endpoint and credentials
    pub delivery: DeliveryConfig,
    /// Schedule persistence
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Gatherer commands
    pub fetchers: FetcherConfig,
}

/// Agent-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Hours between two collections
    #[serde(default = "default_period_hours")]
    pub period_hours: u64,
    /// Debug logging and diagnostic copies of every document
    #[serde(default)]
    pub verbose: bool,
    /// Also write logs to `<dir>/hostagent.log`
    #[serde(default)]
    pub log_directory: Option<PathBuf>,
    /// Environment label copied into every document
    #[serde(default)]
    pub environment: String,
    /// Location label copied into every document
    #[serde(default)]
    pub location: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            period_hours: default_period_hours(),
            verbose: false,
            log_directory: None,
            environment: String::new(),
            location: String::new(),
        }
    }
}

fn default_period_hours() -> u64 {
    24
}

/// Schedule persistence settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// JSON file keeping the schedule across restarts; in memory when unset
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("can't read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .wrap_err_with(|| format!("can't parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load from `explicit`, `$HOSTAGENT_CONFIG`, or the first default path
    /// that exists
    ///
    /// # Errors
    /// Returns error if no config file is found or it cannot be loaded
    pub fn load_default(explicit: Option<&Path>) -> eyre::Result<(Self, PathBuf)> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(path) => PathBuf::from(path),
                None => default_paths()
                    .into_iter()
                    .find(|p| p.exists())
                    .ok_or_else(|| eyre!("no config file found, tried {:?}", default_paths()))?,
            },
        };

        Ok((Self::load(&path)?, path))
    }

    /// Reject settings the agent cannot run with
    ///
    /// # Errors
    /// Returns error on a zero period, a missing or malformed collector URL,
    /// or an empty host gatherer
    pub fn validate(&self) -> eyre::Result<()> {
        if self.agent.period_hours == 0 {
            bail!("agent.period_hours must be at least 1");
        }
        if self.delivery.url.trim().is_empty() {
            bail!("delivery.url must be set");
        }
        url::Url::parse(&self.delivery.url)
            .wrap_err_with(|| format!("invalid delivery.url {:?}", self.delivery.url))?;
        if self.fetchers.host.trim().is_empty() {
            bail!("fetchers.host must be set");
        }
        Ok(())
    }

    /// Collection period
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.agent.period_hours.saturating_mul(3600))
    }

    /// Delivery settings with the agent-wide verbose flag applied
    #[must_use]
    pub fn delivery(&self) -> DeliveryConfig {
        let mut delivery = self.delivery.clone();
        delivery.verbose |= self.agent.verbose;
        delivery
    }
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("hostagent.toml"),
        PathBuf::from("/etc/hostagent/hostagent.toml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("hostagent/hostagent.toml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use hostagent_inventory::HypervisorKind;
    use tempfile::TempDir;

    use super::*;

    const FULL: &str = r#"
[agent]
period_hours = 12
verbose = true
log_directory = "/var/log/hostagent"
environment = "PROD"
location = "Italy"

[delivery]
url = "https://collector.example.com"
user = "agent"
password = "secret"
enable_server_validation = false

[schedule]
state_file = "/var/lib/hostagent/schedule.json"

[fetchers]
host = "/opt/hostagent/fetch/host"
filesystem = "/opt/hostagent/fetch/filesystem"
timeout_secs = 60

[[fetchers.hypervisors]]
kind = "vmware"
command = "/opt/hostagent/fetch/vmware"

[[fetchers.hypervisors]]
kind = "ovm"
command = "/opt/hostagent/fetch/ovm"
"#;

    const MINIMAL: &str = r#"
[delivery]
url = "https://collector.example.com"
user = "agent"
password = "secret"

[fetchers]
host = "/opt/hostagent/fetch/host"
"#;

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("hostagent.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_full_config() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&write(&dir, FULL)).unwrap();

        config.validate().unwrap();
        assert_eq!(config.period(), Duration::from_secs(12 * 3600));
        assert_eq!(config.agent.environment, "PROD");
        assert_eq!(
            config.schedule.state_file,
            Some(PathBuf::from("/var/lib/hostagent/schedule.json"))
        );
        assert_eq!(config.fetchers.hypervisors.len(), 2);
        assert_eq!(config.fetchers.hypervisors[1].kind, HypervisorKind::Ovm);
        assert!(!config.delivery.enable_server_validation);
        assert!(config.delivery().verbose);
    }

    #[test]
    fn test_minimal_config_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&write(&dir, MINIMAL)).unwrap();

        config.validate().unwrap();
        assert_eq!(config.agent.period_hours, 24);
        assert!(!config.agent.verbose);
        assert!(config.agent.log_directory.is_none());
        assert!(config.schedule.state_file.is_none());
        assert!(config.fetchers.hypervisors.is_empty());
        assert!(config.delivery.enable_server_validation);
        assert!(!config.delivery().verbose);
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, MINIMAL);

        let (_, found) = Config::load_default(Some(&path)).unwrap();
        assert_eq!(found, path);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_zero_period_rejected() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.agent.period_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_url_rejected() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.delivery.url = String::new();
        assert!(config.validate().is_err());

        config.delivery.url = "collector without scheme".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_host_gatherer_rejected() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.fetchers.host = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_delivery_section_rejected() {
        let text = "[fetchers]\nhost = \"/opt/hostagent/fetch/host\"\n";
        assert!(toml::from_str::<Config>(text).is_err());
    }
}
