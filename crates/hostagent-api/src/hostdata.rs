//! Host inventory document types

use serde::{Deserialize, Serialize};

/// Version of the document layout understood by the collection service
pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Document
// ============================================================================

/// Complete host inventory, built fresh every cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostData {
    /// Hostname as reported by the host fact
    pub hostname: String,
    /// Free-form environment label from configuration
    pub environment: String,
    /// Free-form location label from configuration
    pub location: String,
    /// Version of the agent that produced this document
    pub agent_version: String,
    /// Layout version, see [`SCHEMA_VERSION`]
    pub schema_version: u32,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Host identity and hardware facts
    pub info: Host,
    /// Mounted filesystems
    pub filesystems: Vec<Filesystem>,
    /// Guests of every configured hypervisor
    pub vms: Vec<VmInfo>,
}

impl HostData {
    /// Start a document around the mandatory host fact
    #[must_use]
    pub fn new(info: Host) -> Self {
        Self {
            hostname: info.hostname.clone(),
            info,
            ..Self::default()
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// Host identity, CPU, kernel and memory facts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub hostname: String,
    pub cpu_model: String,
    pub cpu_frequency: String,
    pub cpu_sockets: i64,
    pub cpu_cores: i64,
    pub cpu_threads: i64,
    pub threads_per_core: i64,
    pub cores_per_socket: i64,
    /// `PH` for physical, `VIRT` for virtual
    pub hardware_abstraction: String,
    /// Virtualization technology, when virtual
    pub hardware_abstraction_technology: String,
    pub kernel: String,
    pub kernel_version: String,
    pub os: String,
    pub os_version: String,
    /// Total memory in GiB
    pub memory_total: f64,
    /// Total swap in GiB
    pub swap_total: f64,
}

/// One mounted filesystem
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filesystem {
    /// Device or source
    pub filesystem: String,
    /// Filesystem type
    #[serde(rename = "type")]
    pub fs_type: String,
    /// Size in bytes
    pub size: i64,
    /// Used space in bytes
    pub used_space: i64,
    /// Available space in bytes
    pub available_space: i64,
    /// Mount point
    pub mounted_on: String,
}

/// One guest virtual machine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmInfo {
    /// Cluster the guest belongs to
    pub cluster_name: String,
    /// Logical VM name
    pub name: String,
    /// Guest OS hostname, defaults to `name` when the hypervisor reports none
    pub hostname: String,
    /// Whether the guest's CPU is capped
    #[serde(rename = "cappedCPU")]
    pub capped_cpu: bool,
    /// Physical host running the guest
    pub physical_host: String,
}
