//! hostagent-client: delivery of the host inventory document
//!
//! One `POST {url}/hosts` per cycle, HTTP Basic authenticated, JSON body.
//! The outcome is logged and returned; retrying is left to the next cycle.
//!
//! ```no_run
//! use hostagent_api::HostData;
//! use hostagent_client::{DeliveryClient, DeliveryConfig};
//!
//! # async fn example(data: HostData) -> Result<(), Box<dyn std::error::Error>> {
//! let config = DeliveryConfig::new("https://collector.example.com", "agent", "secret");
//! let client = DeliveryClient::new(&config)?;
//!
//! let outcome = client.send(&data).await;
//! println!("Sending result: {outcome}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;

pub use config::DeliveryConfig;
pub use error::{ClientError, Result};
pub use http::{DeliveryClient, DeliveryOutcome};
