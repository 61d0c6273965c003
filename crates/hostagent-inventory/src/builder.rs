//! Document assembly from gatherer output

use std::sync::Arc;

use hostagent_api::{Filesystem, Host, HostData, SCHEMA_VERSION, VmInfo};
use hostagent_exec::CommandExecutor;
use tracing::{debug, info, instrument, warn};

use crate::config::{FetcherConfig, HypervisorConfig};
use crate::error::InventoryError;
use crate::marshal;

/// Runs the configured gatherers and assembles one [`HostData`] per call
pub struct InventoryBuilder {
    executor: Arc<dyn CommandExecutor>,
    config: FetcherConfig,
    environment: String,
    location: String,
    agent_version: String,
}

impl InventoryBuilder {
    /// Create a new builder
    pub fn new(executor: Arc<dyn CommandExecutor>, config: FetcherConfig) -> Self {
        Self {
            executor,
            config,
            environment: String::new(),
            location: String::new(),
            agent_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Set the environment and location labels copied into every document
    #[must_use]
    pub fn with_labels(
        mut self,
        environment: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        self.environment = environment.into();
        self.location = location.into();
        self
    }

    /// Override the agent version stamped into every document
    #[must_use]
    pub fn with_agent_version(mut self, version: impl Into<String>) -> Self {
        self.agent_version = version.into();
        self
    }

    /// Collect every fact and assemble the document
    ///
    /// # Errors
    /// Fails only when the host fact cannot be gathered or parsed, or reports
    /// no hostname. Filesystem and guest failures are logged and leave their
    /// section empty.
    #[instrument(skip(self))]
    pub async fn build(&self) -> Result<HostData, InventoryError> {
        info!("collecting host inventory");

        let host = self.host().await?;
        let mut data = HostData::new(host);

        match self.filesystems().await {
            Ok(filesystems) => data.filesystems = filesystems,
            Err(e) => warn!(error = %e, "failed to collect filesystems"),
        }

        for hypervisor in &self.config.hypervisors {
            match self.vms(hypervisor).await {
                Ok(mut vms) => data.vms.append(&mut vms),
                Err(e) => warn!(
                    hypervisor = %hypervisor.kind,
                    error = %e,
                    "failed to collect guests"
                ),
            }
        }

        data.environment.clone_from(&self.environment);
        data.location.clone_from(&self.location);
        data.agent_version.clone_from(&self.agent_version);
        data.schema_version = SCHEMA_VERSION;
        data.tags = Vec::new();

        info!(
            hostname = %data.hostname,
            filesystems = data.filesystems.len(),
            vms = data.vms.len(),
            "inventory collection completed"
        );

        Ok(data)
    }

    /// Collect the host fact
    ///
    /// The hostname identifies the document to the collector, so a report
    /// without a `Hostname` key (or with an empty one) is rejected and the
    /// cycle sends nothing.
    ///
    /// # Errors
    /// Returns an error if the gatherer fails, its output does not parse, or
    /// no hostname is reported (`InventoryError::MissingHostname`).
    pub async fn host(&self) -> Result<Host, InventoryError> {
        let output = self.gather("host", &self.config.host).await?;
        let host = marshal::host(&output)
            .map_err(|source| InventoryError::Marshal { fact: "host", source })?;

        if host.hostname.is_empty() {
            return Err(InventoryError::MissingHostname);
        }

        Ok(host)
    }

    /// Collect the filesystem list, empty when no gatherer is configured
    ///
    /// # Errors
    /// Returns an error if the gatherer fails or its output does not parse.
    pub async fn filesystems(&self) -> Result<Vec<Filesystem>, InventoryError> {
        let Some(cmd) = &self.config.filesystem else {
            debug!("no filesystem gatherer configured");
            return Ok(Vec::new());
        };

        let output = self.gather("filesystem", cmd).await?;
        marshal::filesystems(&output).map_err(|source| InventoryError::Marshal {
            fact: "filesystem",
            source,
        })
    }

    /// Collect the guests of one hypervisor
    ///
    /// # Errors
    /// Returns an error if the gatherer fails. Malformed rows are dropped, not
    /// reported.
    pub async fn vms(&self, hypervisor: &HypervisorConfig) -> Result<Vec<VmInfo>, InventoryError> {
        let output = self.gather("vms", &hypervisor.command).await?;
        let vms = marshal::vms(hypervisor.kind, &output);
        debug!(hypervisor = %hypervisor.kind, count = vms.len(), "collected guests");
        Ok(vms)
    }

    async fn gather(&self, fact: &'static str, cmd: &str) -> Result<String, InventoryError> {
        debug!(fact, executor = self.executor.executor_type(), "running gatherer");

        self.executor
            .run_with_timeout(cmd, self.config.timeout())
            .await
            .and_then(hostagent_exec::CommandResult::into_stdout)
            .map_err(|source| InventoryError::Gatherer { fact, source })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use hostagent_exec::{CommandResult, ExecError};

    use super::*;
    use crate::config::HypervisorKind;

    /// Serves canned stdout per command; unknown commands exit 127
    struct MockExecutor {
        outputs: HashMap<String, String>,
    }

    impl MockExecutor {
        fn new(outputs: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                outputs: outputs
                    .iter()
                    .map(|(cmd, out)| ((*cmd).to_string(), (*out).to_string()))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl CommandExecutor for MockExecutor {
        async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError> {
            let (status, stdout) = match self.outputs.get(cmd) {
                Some(out) => (0, out.clone()),
                None => (127, String::new()),
            };
            Ok(CommandResult {
                status,
                stdout,
                stderr: String::new(),
                duration: Duration::from_millis(1),
            })
        }

        async fn run_with_timeout(
            &self,
            cmd: &str,
            _timeout: Duration,
        ) -> Result<CommandResult, ExecError> {
            self.run(cmd).await
        }

        fn executor_type(&self) -> &'static str {
            "mock"
        }
    }

    fn config() -> FetcherConfig {
        let mut config = FetcherConfig::new("host");
        config.filesystem = Some("fs".to_string());
        config.hypervisors = vec![
            HypervisorConfig {
                kind: HypervisorKind::Vmware,
                command: "vmware".to_string(),
            },
            HypervisorConfig {
                kind: HypervisorKind::Ovm,
                command: "ovm".to_string(),
            },
        ];
        config
    }

    #[tokio::test]
    async fn test_build_full_document() {
        let executor = MockExecutor::new(&[
            ("host", "Hostname: db01\nCPUCores: 4\n"),
            ("fs", "/dev/sda1 ext4 1024 512 512 50% /\n"),
            ("vmware", "Cluster,Name,guestHostname\nc1,vm1,,esx1\n"),
            ("ovm", "p1,g1,g1.local,yes,ovs1\n"),
        ]);

        let data = InventoryBuilder::new(executor, config())
            .with_labels("PROD", "Milan")
            .with_agent_version("9.9.9")
            .build()
            .await
            .unwrap();

        assert_eq!(data.hostname, "db01");
        assert_eq!(data.info.cpu_cores, 4);
        assert_eq!(data.environment, "PROD");
        assert_eq!(data.location, "Milan");
        assert_eq!(data.agent_version, "9.9.9");
        assert_eq!(data.schema_version, SCHEMA_VERSION);
        assert!(data.tags.is_empty());
        assert_eq!(data.filesystems.len(), 1);
        assert_eq!(data.vms.len(), 2);
        assert_eq!(data.vms[0].hostname, "vm1");
        assert!(data.vms[1].capped_cpu);
    }

    #[tokio::test]
    async fn test_optional_failures_leave_sections_empty() {
        let executor = MockExecutor::new(&[
            ("host", "Hostname: db01\n"),
            ("fs", "/dev/sda1 ext4 lots 512 512 50% /\n"),
            ("ovm", "p1,g1,g1.local,no,ovs1\n"),
        ]);

        let data = InventoryBuilder::new(executor, config()).build().await.unwrap();

        assert!(data.filesystems.is_empty());
        assert_eq!(data.vms.len(), 1);
        assert_eq!(data.vms[0].name, "g1");
    }

    #[tokio::test]
    async fn test_host_gatherer_failure_is_fatal() {
        let executor = MockExecutor::new(&[("fs", "/dev/sda1 ext4 1 1 0 100% /\n")]);

        let err = InventoryBuilder::new(executor, config()).build().await.unwrap_err();

        assert!(matches!(
            err,
            InventoryError::Gatherer {
                fact: "host",
                source: ExecError::CommandFailed { status: 127, .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_host_parse_failure_is_fatal() {
        let executor = MockExecutor::new(&[("host", "Hostname: db01\nCPUCores: many\n")]);

        let err = InventoryBuilder::new(executor, config()).build().await.unwrap_err();

        assert_eq!(err.fact(), "host");
        assert!(matches!(err, InventoryError::Marshal { .. }));
    }

    #[tokio::test]
    async fn test_missing_hostname_is_fatal() {
        let executor = MockExecutor::new(&[("host", "CPUCores: 4\n")]);

        let err = InventoryBuilder::new(executor, FetcherConfig::new("host"))
            .build()
            .await
            .unwrap_err();

        assert!(matches!(err, InventoryError::MissingHostname));
    }

    #[tokio::test]
    async fn test_no_filesystem_gatherer() {
        let executor = MockExecutor::new(&[("host", "Hostname: db01\n")]);

        let data = InventoryBuilder::new(executor, FetcherConfig::new("host"))
            .build()
            .await
            .unwrap();

        assert!(data.filesystems.is_empty());
        assert!(data.vms.is_empty());
    }
}
