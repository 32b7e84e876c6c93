//! Resource manager: composes the concrete resources declared by a
//! platform's `resources` list and offers one all-or-nothing try/commit
//! across all of them.
//!
//! Resources are a closed, tagged-variant set rather than trait objects:
//! there are exactly three resource shapes a platform can declare, and an
//! enum gives every variant `Clone` for free, which the router's
//! speculative alternative-scoring snapshots depend on.

use openql_ir::Gate;
use openql_platform::{Platform, ResourceConfig};

use crate::config::ScheduleMode;

use super::channel::ChannelResource;
use super::instrument::InstrumentResource;
use super::qubit::QubitResource;

/// One concrete resource instance.
#[derive(Debug, Clone)]
pub enum Resource {
    /// Per-physical-qubit exclusivity.
    Qubit(QubitResource),
    /// A shared control instrument.
    Instrument(InstrumentResource),
    /// An inter-core channel pool.
    Channel(ChannelResource),
}

impl Resource {
    fn try_reserve(&self, cycle: u64, gate: &Gate, platform: &Platform) -> bool {
        match self {
            Resource::Qubit(r) => r.try_reserve(cycle, gate, platform),
            Resource::Instrument(r) => r.try_reserve(cycle, gate, platform),
            Resource::Channel(r) => r.try_reserve(cycle, gate, platform),
        }
    }

    fn commit(&mut self, cycle: u64, gate: &Gate, platform: &Platform, mode: ScheduleMode) {
        match self {
            Resource::Qubit(r) => r.commit(cycle, gate, mode),
            Resource::Instrument(r) => r.commit(cycle, gate, platform, mode),
            Resource::Channel(r) => r.commit(cycle, gate, platform, mode),
        }
    }

    /// Human-readable description, for logging.
    pub fn describe(&self) -> String {
        match self {
            Resource::Qubit(r) => r.describe(),
            Resource::Instrument(r) => r.describe(),
            Resource::Channel(r) => r.describe(),
        }
    }
}

/// All resources declared by a platform, offering an all-or-nothing
/// try/commit contract across the whole set.
#[derive(Debug, Clone)]
pub struct ResourceManager {
    resources: Vec<Resource>,
}

impl ResourceManager {
    /// Build a resource manager from a platform's declared resources. A
    /// platform that declares no explicit `Qubit` resource still gets one
    /// for free, since qubit exclusivity is not optional.
    pub fn from_platform(platform: &Platform) -> Self {
        let mut resources = Vec::with_capacity(platform.resources.len() + 1);
        let mut has_qubit_resource = false;

        for cfg in &platform.resources {
            match cfg {
                ResourceConfig::Qubit { .. } => {
                    has_qubit_resource = true;
                    resources.push(Resource::Qubit(QubitResource::new(platform.num_qubits)));
                }
                ResourceConfig::Instrument {
                    name,
                    predicate,
                    function,
                    allow_overlap,
                    instruments,
                } => {
                    resources.push(Resource::Instrument(InstrumentResource::new(
                        name.clone(),
                        predicate.clone(),
                        function.clone(),
                        *allow_overlap,
                        instruments,
                    )));
                }
                ResourceConfig::InterCoreChannel {
                    name,
                    predicate,
                    num_channels,
                    inter_core_required,
                    communication_qubit_only,
                } => {
                    resources.push(Resource::Channel(ChannelResource::new(
                        name.clone(),
                        predicate.clone(),
                        platform.topology.num_cores(),
                        *num_channels,
                        *inter_core_required,
                        *communication_qubit_only,
                    )));
                }
            }
        }

        if !has_qubit_resource {
            resources.push(Resource::Qubit(QubitResource::new(platform.num_qubits)));
        }

        Self { resources }
    }

    /// Whether `gate` can start at `cycle` on every composed resource.
    pub fn try_reserve(&self, cycle: u64, gate: &Gate, platform: &Platform) -> bool {
        self.resources
            .iter()
            .all(|r| r.try_reserve(cycle, gate, platform))
    }

    /// Reserve `gate` at `cycle` across every composed resource. Callers
    /// must have already confirmed [`Self::try_reserve`] for the same
    /// `(cycle, gate)`; committing without a prior successful try can
    /// corrupt resource state.
    pub fn commit(&mut self, cycle: u64, gate: &Gate, platform: &Platform, mode: ScheduleMode) {
        for r in &mut self.resources {
            r.commit(cycle, gate, platform, mode);
        }
    }

    /// Human-readable dump of every composed resource, for logging.
    pub fn describe(&self) -> String {
        self.resources
            .iter()
            .map(Resource::describe)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openql_ir::QubitId;
    use openql_platform::{Catalogue, InstructionEntry, Topology};
    use rustc_hash::FxHashMap as Map;

    fn platform() -> Platform {
        let mut catalogue = Catalogue::new();
        catalogue.insert(
            "x",
            InstructionEntry {
                duration_ns: 20,
                type_tag: "mw".to_string(),
                attributes: Map::default(),
            },
        );
        Platform {
            name: "t".into(),
            num_qubits: 2,
            cycle_time_ns: 20,
            num_cores: 1,
            num_comm_qubits_per_core: 0,
            creg_count: 0,
            breg_count: 0,
            catalogue,
            topology: Topology::full(2),
            resources: vec![ResourceConfig::Qubit {
                name: "qubits".into(),
            }],
        }
    }

    fn gate(qubit: u32) -> Gate {
        let mut g = Gate::new("x", [QubitId(qubit)]);
        g.duration_cycles = 1;
        g
    }

    #[test]
    fn test_manager_composes_qubit_resource() {
        let platform = platform();
        let mut mgr = ResourceManager::from_platform(&platform);
        let g0 = gate(0);
        assert!(mgr.try_reserve(0, &g0, &platform));
        mgr.commit(0, &g0, &platform, ScheduleMode::Asap);
        assert!(!mgr.try_reserve(0, &g0, &platform));
        assert!(mgr.try_reserve(1, &g0, &platform));
    }

    #[test]
    fn test_manager_adds_implicit_qubit_resource() {
        let mut platform = platform();
        platform.resources.clear();
        let mgr = ResourceManager::from_platform(&platform);
        assert_eq!(mgr.resources.len(), 1);
    }
}
