//! Gatherer configuration

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which gatherers to run and how long to let each one take
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Command producing the `Key: value` host report (mandatory)
    pub host: String,
    /// Command producing the filesystem listing
    #[serde(default)]
    pub filesystem: Option<String>,
    /// Directory gatherers are run from
    #[serde(default)]
    pub workdir: Option<PathBuf>,
    /// Upper bound on a single gatherer run, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Hypervisors whose guests are listed
    #[serde(default)]
    pub hypervisors: Vec<HypervisorConfig>,
}

fn default_timeout_secs() -> u64 {
    300
}

impl FetcherConfig {
    /// Config running only the host gatherer
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            filesystem: None,
            workdir: None,
            timeout_secs: default_timeout_secs(),
            hypervisors: Vec::new(),
        }
    }

    /// Per-gatherer timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One hypervisor to list guests from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypervisorConfig {
    /// Listing dialect
    pub kind: HypervisorKind,
    /// Command producing the comma-separated guest listing
    pub command: String,
}

/// Supported hypervisor listing dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypervisorKind {
    /// VMware vSphere
    Vmware,
    /// Oracle VM
    Ovm,
}

impl fmt::Display for HypervisorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HypervisorKind::Vmware => write!(f, "vmware"),
            HypervisorKind::Ovm => write!(f, "ovm"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_defaults() {
        let config: FetcherConfig = toml::from_str(r#"host = "/opt/fetch/host""#).unwrap();

        assert_eq!(config.host, "/opt/fetch/host");
        assert!(config.filesystem.is_none());
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert!(config.hypervisors.is_empty());
    }

    #[test]
    fn test_deserialize_hypervisors() {
        let config: FetcherConfig = toml::from_str(
            r#"
host = "host"
filesystem = "filesystem"
timeout_secs = 60

[[hypervisors]]
kind = "vmware"
command = "vmware.ps1 vcenter01"

[[hypervisors]]
kind = "ovm"
command = "ovm ovmm01"
"#,
        )
        .unwrap();

        assert_eq!(config.hypervisors.len(), 2);
        assert_eq!(config.hypervisors[0].kind, HypervisorKind::Vmware);
        assert_eq!(config.hypervisors[1].kind, HypervisorKind::Ovm);
        assert_eq!(config.hypervisors[1].kind.to_string(), "ovm");
    }

    #[test]
    fn test_unknown_hypervisor_rejected() {
        let result: Result<FetcherConfig, _> = toml::from_str(
            r#"
host = "host"
[[hypervisors]]
kind = "hyperv"
command = "x"
"#,
        );
        assert!(result.is_err());
    }
}
