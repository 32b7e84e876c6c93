//! Qubit exclusivity resource: one range-set per physical qubit.

use openql_ir::Gate;
use openql_platform::Platform;

use crate::config::ScheduleMode;
use crate::rangemap::{Range, RangeMap};

/// One range-set per physical qubit, tracking which cycles it is busy.
#[derive(Debug, Clone)]
pub struct QubitResource {
    per_qubit: Vec<RangeMap<u64, ()>>,
}

impl QubitResource {
    /// Create an unreserved qubit resource for `num_qubits` physical qubits.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            per_qubit: (0..num_qubits).map(|_| RangeMap::new()).collect(),
        }
    }

    /// Whether `gate` can start at `cycle` without conflicting with any
    /// already-reserved interval on any of its qubit operands.
    pub fn try_reserve(&self, cycle: u64, gate: &Gate, _platform: &Platform) -> bool {
        if gate.duration_cycles == 0 {
            return true;
        }
        let range = Range::new(cycle, cycle + gate.duration_cycles);
        gate.operands
            .iter()
            .all(|q| !self.per_qubit[q.0 as usize].overlaps(range))
    }

    /// Reserve `gate`'s qubit operands at `cycle`. `mode` decides which
    /// strictly-past ranges are erased to bound memory use.
    pub fn commit(&mut self, cycle: u64, gate: &Gate, mode: ScheduleMode) {
        if gate.duration_cycles == 0 {
            return;
        }
        let range = Range::new(cycle, cycle + gate.duration_cycles);
        for q in &gate.operands {
            let set = &mut self.per_qubit[q.0 as usize];
            set.set(range, (), |_, _| false);
            match mode {
                ScheduleMode::Asap if cycle > 0 => set.erase(Range::new(0, cycle)),
                ScheduleMode::Alap if range.hi < u64::MAX => {
                    set.erase(Range::new(range.hi, u64::MAX));
                }
                _ => {}
            }
        }
    }

    /// Human-readable dump of per-qubit reservation counts.
    pub fn describe(&self) -> String {
        let busy: usize = self.per_qubit.iter().filter(|s| !s.is_empty()).count();
        format!(
            "qubit resource: {busy}/{} qubits hold reservations",
            self.per_qubit.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openql_ir::QubitId;

    fn gate(duration: u64, ops: &[u32]) -> Gate {
        let mut g = Gate::new("g", ops.iter().map(|&i| QubitId(i)));
        g.duration_cycles = duration;
        g
    }

    #[test]
    fn test_disjoint_reservations_both_succeed() {
        let mut r = QubitResource::new(2);
        let g0 = gate(2, &[0]);
        assert!(r.try_reserve(1, &g0, &test_platform()));
        r.commit(1, &g0, ScheduleMode::Asap);
        let g1 = gate(2, &[1]);
        assert!(r.try_reserve(1, &g1, &test_platform()));
    }

    #[test]
    fn test_overlapping_same_qubit_rejected() {
        let mut r = QubitResource::new(1);
        let g0 = gate(3, &[0]);
        r.commit(1, &g0, ScheduleMode::Asap);
        let g1 = gate(1, &[0]);
        assert!(!r.try_reserve(2, &g1, &test_platform()));
        assert!(r.try_reserve(4, &g1, &test_platform()));
    }

    fn test_platform() -> Platform {
        Platform {
            name: "t".into(),
            num_qubits: 4,
            cycle_time_ns: 1,
            num_cores: 1,
            num_comm_qubits_per_core: 0,
            creg_count: 0,
            breg_count: 0,
            catalogue: openql_platform::Catalogue::new(),
            topology: openql_platform::Topology::full(4),
            resources: Vec::new(),
        }
    }
}
