//! Build-and-send cycle run on every fire of the agent's job

use async_trait::async_trait;
use tracing::{error, info, instrument};

use hostagent_client::{DeliveryClient, DeliveryOutcome};
use hostagent_inventory::InventoryBuilder;

use crate::error::CoreError;
use crate::job::{ActionError, JobAction};

/// Collects the host inventory and delivers it to the collector
pub struct Pipeline {
    builder: InventoryBuilder,
    client: DeliveryClient,
}

impl Pipeline {
    #[must_use]
    pub fn new(builder: InventoryBuilder, client: DeliveryClient) -> Self {
        Self { builder, client }
    }

    /// Build one document and send it
    ///
    /// Nothing is sent when the document cannot be built.
    ///
    /// # Errors
    /// Returns `CoreError::Inventory` if the host fact cannot be collected.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<DeliveryOutcome, CoreError> {
        let data = match self.builder.build().await {
            Ok(data) => data,
            Err(e) => {
                error!(fact = e.fact(), error = %e, "can't build host data, nothing sent");
                return Err(e.into());
            }
        };

        info!(
            hostname = %data.hostname,
            filesystems = data.filesystems.len(),
            vms = data.vms.len(),
            "host data built"
        );

        Ok(self.client.send(&data).await)
    }
}

#[async_trait]
impl JobAction for Pipeline {
    async fn run(&self) -> Result<(), ActionError> {
        match self.run_cycle().await? {
            DeliveryOutcome::Success => Ok(()),
            DeliveryOutcome::Failed => Err("delivery failed".into()),
        }
    }
}
