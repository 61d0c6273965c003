//! Guest VM listings: comma-separated rows, one dialect per hypervisor

use hostagent_api::VmInfo;

use super::parse_bool;
use crate::config::HypervisorKind;

/// Column layout of one hypervisor's guest listing
struct Dialect {
    /// Rows with fewer columns are dropped
    min_columns: usize,
    /// Exact first line that is a header rather than a guest
    header: &'static str,
    /// Column holding the capped-CPU flag, if the dialect reports one
    capped_cpu: Option<usize>,
    /// Column holding the physical host
    physical_host: usize,
}

const VMWARE: Dialect = Dialect {
    min_columns: 4,
    header: "Cluster,Name,guestHostname",
    capped_cpu: None,
    physical_host: 3,
};

const OVM: Dialect = Dialect {
    min_columns: 5,
    header: "Cluster,Name,guestHostname",
    capped_cpu: Some(3),
    physical_host: 4,
};

/// Parse a guest listing in the dialect of `kind`
#[must_use]
pub fn vms(kind: HypervisorKind, output: &str) -> Vec<VmInfo> {
    match kind {
        HypervisorKind::Vmware => vmware_vms(output),
        HypervisorKind::Ovm => ovm_vms(output),
    }
}

/// Parse a VMware guest listing: cluster, name, guest hostname, physical host
#[must_use]
pub fn vmware_vms(output: &str) -> Vec<VmInfo> {
    parse(&VMWARE, output)
}

/// Parse an OVM guest listing: cluster, name, guest hostname, capped CPU, physical host
#[must_use]
pub fn ovm_vms(output: &str) -> Vec<VmInfo> {
    parse(&OVM, output)
}

fn parse(dialect: &Dialect, output: &str) -> Vec<VmInfo> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .enumerate()
        .filter(|(index, line)| !(*index == 0 && *line == dialect.header))
        .filter_map(|(_, line)| guest(dialect, line))
        .collect()
}

fn guest(dialect: &Dialect, line: &str) -> Option<VmInfo> {
    let columns: Vec<&str> = line.split(',').map(str::trim).collect();
    if columns.len() < dialect.min_columns {
        return None;
    }

    let name = columns[1].to_string();
    let hostname = match columns[2] {
        "" => name.clone(),
        hostname => hostname.to_string(),
    };

    Some(VmInfo {
        cluster_name: columns[0].to_string(),
        name,
        hostname,
        capped_cpu: dialect.capped_cpu.is_some_and(|i| parse_bool(columns[i])),
        physical_host: columns[dialect.physical_host].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vmware_skips_header() {
        let output = "Cluster,Name,guestHostname\n\
                      prod,vm01,vm01.example.com,esx01\n\
                      prod,vm02,,esx02\n";

        let vms = vmware_vms(output);

        assert_eq!(vms.len(), 2);
        assert_eq!(
            vms[0],
            VmInfo {
                cluster_name: "prod".to_string(),
                name: "vm01".to_string(),
                hostname: "vm01.example.com".to_string(),
                capped_cpu: false,
                physical_host: "esx01".to_string(),
            }
        );
        assert_eq!(vms[1].hostname, "vm02");
    }

    #[test]
    fn test_header_only_counts_as_first_line() {
        let output = "prod,vm01,h1,esx01\nCluster,Name,guestHostname\n";
        let vms = vmware_vms(output);
        assert_eq!(vms.len(), 1);
    }

    #[test]
    fn test_short_rows_are_dropped() {
        let output = "prod,vm01,h1\nprod,vm02,h2,esx02\n\n";
        let vms = vmware_vms(output);
        assert_eq!(vms.len(), 1);
        assert_eq!(vms[0].name, "vm02");
    }

    #[test]
    fn test_crlf_header() {
        let output = "Cluster,Name,guestHostname\r\nprod,vm01,h1,esx01\r\n";
        let vms = vmware_vms(output);
        assert_eq!(vms.len(), 1);
        assert_eq!(vms[0].physical_host, "esx01");
    }

    #[test]
    fn test_ovm_rows() {
        let output = "pool1, guest1, , true, ovs01\n\
                      pool1,guest2,g2.local,no,ovs02\n\
                      pool1,guest3,g3.local,ovs03\n";

        let vms = ovm_vms(output);

        assert_eq!(vms.len(), 2);
        assert_eq!(vms[0].name, "guest1");
        assert_eq!(vms[0].hostname, "guest1");
        assert!(vms[0].capped_cpu);
        assert_eq!(vms[0].physical_host, "ovs01");
        assert!(!vms[1].capped_cpu);
    }

    #[test]
    fn test_ovm_unknown_bool_is_false() {
        let vms = ovm_vms("pool1,guest1,g1,capped?,ovs01\n");
        assert!(!vms[0].capped_cpu);
    }

    #[test]
    fn test_dispatch_by_kind() {
        let row = "c,n,h,x,y\n";
        assert_eq!(vms(HypervisorKind::Vmware, row)[0].physical_host, "x");
        assert_eq!(vms(HypervisorKind::Ovm, row)[0].physical_host, "y");
    }
}
