//! hostagent-inventory: fact parsing and document assembly
//!
//! `marshal` turns the text output of each gatherer into typed records;
//! [`InventoryBuilder`] runs the configured gatherers and assembles a
//! [`hostagent_api::HostData`] document from their records.

pub mod builder;
pub mod config;
pub mod error;
pub mod marshal;

pub use builder::InventoryBuilder;
pub use config::{FetcherConfig, HypervisorConfig, HypervisorKind};
pub use error::{InventoryError, MarshalError};
