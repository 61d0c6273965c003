//! hostagent-api: Host inventory document
//!
//! Wire types of the document the agent assembles every cycle and posts to the
//! collection service. Field names serialize in camelCase.

pub mod hostdata;

pub use hostdata::{Filesystem, Host, HostData, SCHEMA_VERSION, VmInfo};
