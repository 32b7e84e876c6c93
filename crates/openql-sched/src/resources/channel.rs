//! Inter-core communication channel resource: each core has a fixed number
//! of channels, modelled as independent range-sets.

use openql_ir::Gate;
use openql_platform::{Platform, Predicate};

use crate::config::ScheduleMode;
use crate::rangemap::{Range, RangeMap};

/// An inter-core channel pool resource.
#[derive(Debug, Clone)]
pub struct ChannelResource {
    name: String,
    predicate: Predicate,
    inter_core_required: bool,
    communication_qubit_only: bool,
    /// `channels[core][channel]`.
    channels: Vec<Vec<RangeMap<u64, ()>>>,
}

impl ChannelResource {
    /// Build a channel resource for `num_cores` cores, `num_channels` each.
    pub fn new(
        name: String,
        predicate: Predicate,
        num_cores: u32,
        num_channels: u32,
        inter_core_required: bool,
        communication_qubit_only: bool,
    ) -> Self {
        Self {
            name,
            predicate,
            inter_core_required,
            communication_qubit_only,
            channels: (0..num_cores)
                .map(|_| (0..num_channels).map(|_| RangeMap::new()).collect())
                .collect(),
        }
    }

    fn touches_multiple_cores(&self, gate: &Gate, platform: &Platform) -> Vec<u32> {
        let mut cores: Vec<u32> = gate
            .operands
            .iter()
            .map(|q| platform.topology.core_of(q.0))
            .collect();
        cores.sort_unstable();
        cores.dedup();
        cores
    }

    fn applies_to(&self, gate: &Gate, platform: &Platform, cores: &[u32]) -> bool {
        let Some(entry) = platform.catalogue.get(&gate.name) else {
            return false;
        };
        if !self.predicate.matches(&entry.attributes) {
            return false;
        }
        if self.inter_core_required && cores.len() < 2 {
            return false;
        }
        // `communication_qubit_only` is a platform-capacity constraint
        // (only designated comm qubits may carry inter-core traffic); with
        // a uniform core partition every qubit in a multi-qubit core is
        // eligible, so this flag is accepted but not further restrictive
        // here beyond the core-touch check already performed.
        let _ = self.communication_qubit_only;
        true
    }

    /// Whether `gate` can start at `cycle`: for every core it touches,
    /// at least one of that core's channels must be free for the proposed
    /// range.
    pub fn try_reserve(&self, cycle: u64, gate: &Gate, platform: &Platform) -> bool {
        let cores = self.touches_multiple_cores(gate, platform);
        if !self.applies_to(gate, platform, &cores) {
            return true;
        }
        let range = Range::new(cycle, cycle + gate.duration_cycles.max(1));
        cores.iter().all(|&core| {
            self.channels[core as usize]
                .iter()
                .any(|ch| !ch.overlaps(range))
        })
    }

    /// Reserve the first free channel per touched core.
    pub fn commit(&mut self, cycle: u64, gate: &Gate, platform: &Platform, mode: ScheduleMode) {
        let cores = self.touches_multiple_cores(gate, platform);
        if !self.applies_to(gate, platform, &cores) {
            return;
        }
        let range = Range::new(cycle, cycle + gate.duration_cycles.max(1));
        for core in cores {
            if let Some(ch) = self.channels[core as usize]
                .iter_mut()
                .find(|ch| !ch.overlaps(range))
            {
                match mode {
                    ScheduleMode::Asap if cycle > 0 => ch.erase(Range::new(0, cycle)),
                    ScheduleMode::Alap if range.hi < u64::MAX => {
                        ch.erase(Range::new(range.hi, u64::MAX));
                    }
                    _ => {}
                }
                ch.set(range, (), |_, _| false);
            }
        }
    }

    /// Human-readable per-core channel occupancy dump.
    pub fn describe(&self) -> String {
        let lines: Vec<String> = self
            .channels
            .iter()
            .enumerate()
            .map(|(core, chans)| {
                let busy = chans.iter().filter(|c| !c.is_empty()).count();
                format!("core {core}: {busy}/{} channels busy", chans.len())
            })
            .collect();
        format!("channel resource '{}': [{}]", self.name, lines.join(", "))
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
            "tcnot",
            InstructionEntry {
                duration_ns: 5,
                type_tag: "inter_core".to_string(),
                attributes: Map::default(),
            },
        );
        let topology =
            Topology::new(4, vec![(0, 1), (1, 2), (2, 3)], None, vec![0, 0, 1, 1]).unwrap();
        Platform {
            name: "t".into(),
            num_qubits: 4,
            cycle_time_ns: 1,
            num_cores: 2,
            num_comm_qubits_per_core: 1,
            creg_count: 0,
            breg_count: 0,
            catalogue,
            topology,
            resources: Vec::new(),
        }
    }

    fn channel() -> ChannelResource {
        ChannelResource::new("xbar".into(), Predicate::default(), 2, 1, true, false)
    }

    fn gate() -> Gate {
        let mut g = Gate::new("tcnot", [QubitId(1), QubitId(2)]);
        g.duration_cycles = 5;
        g
    }

    #[test]
    fn test_single_channel_saturates() {
        let mut ch = channel();
        let g = gate();
        let p = platform();
        assert!(ch.try_reserve(1, &g, &p));
        ch.commit(1, &g, &p, ScheduleMode::Asap);
        assert!(!ch.try_reserve(3, &g, &p));
        assert!(ch.try_reserve(6, &g, &p));
    }
}
