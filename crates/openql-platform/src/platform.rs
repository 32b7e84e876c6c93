//! The immutable platform description: qubit count, cycle time, catalogue,
//! topology, and resource configuration.

use serde::{Deserialize, Serialize};

use crate::catalogue::Catalogue;
use crate::resource_config::ResourceConfig;
use crate::topology::Topology;

/// Immutable description of a target device, as loaded from platform JSON
/// (see [`crate::json`]) or constructed directly for tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    /// Platform name, for diagnostics.
    pub name: String,
    /// Number of physical qubits.
    pub num_qubits: u32,
    /// Cycle duration in nanoseconds.
    pub cycle_time_ns: u64,
    /// Number of cores (1 for single-core platforms).
    pub num_cores: u32,
    /// Communication qubits available per core.
    pub num_comm_qubits_per_core: u32,
    /// Number of declared classical (multi-bit) registers.
    pub creg_count: u32,
    /// Number of declared single-bit registers.
    pub breg_count: u32,
    /// Instruction catalogue.
    pub catalogue: Catalogue,
    /// Qubit topology.
    pub topology: Topology,
    /// Resource configuration records, in declaration order (the resource
    /// manager composes them in this same order).
    pub resources: Vec<ResourceConfig>,
}

impl Platform {
    /// Duration in cycles for a catalogue instruction, given this
    /// platform's cycle time.
    pub fn duration_cycles(&self, name: &str) -> Option<u64> {
        self.catalogue
            .get(name)
            .map(|e| e.duration_cycles(self.cycle_time_ns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::InstructionEntry;
    use rustc_hash::FxHashMap;

    #[test]
    fn test_duration_cycles_via_platform() {
        let mut catalogue = Catalogue::new();
        catalogue.insert(
            "cnot",
            InstructionEntry {
                duration_ns: 40,
                type_tag: "flux".to_string(),
                attributes: FxHashMap::default(),
            },
        );
        let platform = Platform {
            name: "test".to_string(),
            num_qubits: 2,
            cycle_time_ns: 20,
            num_cores: 1,
            num_comm_qubits_per_core: 0,
            creg_count: 0,
            breg_count: 0,
            catalogue,
            topology: Topology::full(2),
            resources: Vec::new(),
        };
        assert_eq!(platform.duration_cycles("cnot"), Some(2));
        assert_eq!(platform.duration_cycles("missing"), None);
    }
}
