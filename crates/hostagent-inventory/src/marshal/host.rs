//! Host facts: `Key: value` report

use hostagent_api::Host;

use super::KeyValues;
use crate::error::MarshalError;

/// Parse the host gatherer output
///
/// Unknown keys are ignored and absent keys leave their field at its zero
/// value.
///
/// # Errors
/// Returns `MarshalError::Conversion` when a numeric key carries a value that
/// is not a number.
pub fn host(output: &str) -> Result<Host, MarshalError> {
    let kv = KeyValues::parse(output);

    Ok(Host {
        hostname: kv.text("Hostname"),
        cpu_model: kv.text("CPUModel"),
        cpu_frequency: kv.text("CPUFrequency"),
        cpu_sockets: kv.int("CPUSockets")?,
        cpu_cores: kv.int("CPUCores")?,
        cpu_threads: kv.int("CPUThreads")?,
        threads_per_core: kv.int("ThreadsPerCore")?,
        cores_per_socket: kv.int("CoresPerSocket")?,
        hardware_abstraction: kv.text("HardwareAbstraction"),
        hardware_abstraction_technology: kv.text("HardwareAbstractionTechnology"),
        kernel: kv.text("Kernel"),
        kernel_version: kv.text("KernelVersion"),
        os: kv.text("OS"),
        os_version: kv.text("OSVersion"),
        memory_total: kv.float("MemoryTotal")?,
        swap_total: kv.float("SwapTotal")?,
    })
}
