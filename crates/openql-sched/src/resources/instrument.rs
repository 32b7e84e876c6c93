//! Shared instrument resource: gates sharing a control instrument (e.g. an
//! AWG/QWG) may only overlap in time if they share the same "function".

use rustc_hash::FxHashMap;

use openql_ir::Gate;
use openql_platform::{FunctionSpec, InstrumentBinding, Platform, Predicate};

use crate::config::ScheduleMode;
use crate::rangemap::{Range, RangeMatchType, RangeMap};

/// A shared-instrument resource instance.
#[derive(Debug, Clone)]
pub struct InstrumentResource {
    name: String,
    predicate: Predicate,
    function_keys: Vec<String>,
    exclusive: bool,
    allow_overlap: bool,
    instrument_names: Vec<String>,
    qubit_instruments: FxHashMap<u32, Vec<usize>>,
    edge_instruments: FxHashMap<(u32, u32), Vec<usize>>,
    /// Per instrument, a range-map from reserved cycle range to the
    /// function tuple that occupies it (empty tuple in exclusive mode,
    /// where the tuple is never compared).
    state: Vec<RangeMap<u64, Vec<String>>>,
}

impl InstrumentResource {
    /// Build an instrument resource from its declared configuration.
    pub fn new(
        name: String,
        predicate: Predicate,
        function: FunctionSpec,
        allow_overlap: bool,
        instruments: &[InstrumentBinding],
    ) -> Self {
        let mut qubit_instruments: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
        let mut edge_instruments: FxHashMap<(u32, u32), Vec<usize>> = FxHashMap::default();
        let mut instrument_names = Vec::with_capacity(instruments.len());
        for (idx, binding) in instruments.iter().enumerate() {
            instrument_names.push(binding.name.clone());
            for &q in &binding.qubits {
                qubit_instruments.entry(q).or_default().push(idx);
            }
            for &(a, b) in &binding.edges {
                let key = (a.min(b), a.max(b));
                edge_instruments.entry(key).or_default().push(idx);
            }
        }
        let (exclusive, function_keys) = match function {
            FunctionSpec::Exclusive => (true, Vec::new()),
            FunctionSpec::Keys(keys) => (false, keys),
        };
        Self {
            name,
            predicate,
            function_keys,
            exclusive,
            allow_overlap,
            state: vec![RangeMap::new(); instrument_names.len()],
            instrument_names,
            qubit_instruments,
            edge_instruments,
        }
    }

    fn engaged_instruments(&self, gate: &Gate) -> Vec<usize> {
        let mut idx = Vec::new();
        if gate.operands.len() == 2 {
            let key = (
                gate.operands[0].0.min(gate.operands[1].0),
                gate.operands[0].0.max(gate.operands[1].0),
            );
            if let Some(v) = self.edge_instruments.get(&key) {
                idx.extend(v);
            }
        }
        for q in &gate.operands {
            if let Some(v) = self.qubit_instruments.get(&q.0) {
                idx.extend(v);
            }
        }
        idx.sort_unstable();
        idx.dedup();
        idx
    }

    fn function_of(&self, gate: &Gate, platform: &Platform) -> Vec<String> {
        if self.exclusive {
            return Vec::new();
        }
        let Some(entry) = platform.catalogue.get(&gate.name) else {
            return Vec::new();
        };
        self.function_keys
            .iter()
            .map(|k| entry.attr_str(k).unwrap_or("").to_string())
            .collect()
    }

    /// Whether `gate` matches this resource's predicate at all; gates that
    /// don't match are always admissible (the resource simply doesn't
    /// apply to them).
    fn applies_to(&self, gate: &Gate, platform: &Platform) -> bool {
        let Some(entry) = platform.catalogue.get(&gate.name) else {
            return false;
        };
        // The catalogue's `type` tag is a dedicated field, not part of the
        // free-form attribute map, but predicates reference it as though it
        // were: fold it in under the "type" key for matching purposes.
        let mut attrs = entry.attributes.clone();
        attrs
            .entry("type".to_string())
            .or_insert_with(|| serde_json::Value::String(entry.type_tag.clone()));
        self.predicate.matches(&attrs)
    }

    /// Whether `gate` can start at `cycle` on every instrument it engages.
    pub fn try_reserve(&self, cycle: u64, gate: &Gate, platform: &Platform) -> bool {
        if !self.applies_to(gate, platform) {
            return true;
        }
        let affected = self.engaged_instruments(gate);
        if affected.is_empty() {
            return true;
        }
        let range = Range::new(cycle, cycle + gate.duration_cycles.max(1));
        let function = self.function_of(gate, platform);

        for idx in affected {
            let result = self.state[idx].find(range);
            match result.kind {
                RangeMatchType::None => {}
                RangeMatchType::Exact => {
                    if self.exclusive || result.overlaps[0].1 != function {
                        return false;
                    }
                }
                _ => {
                    if self.exclusive || !self.allow_overlap {
                        return false;
                    }
                    if result.overlaps.iter().any(|(_, f)| *f != function) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Reserve `gate`'s engaged instruments at `cycle`.
    pub fn commit(&mut self, cycle: u64, gate: &Gate, platform: &Platform, mode: ScheduleMode) {
        if !self.applies_to(gate, platform) {
            return;
        }
        let affected = self.engaged_instruments(gate);
        if affected.is_empty() {
            return;
        }
        let range = Range::new(cycle, cycle + gate.duration_cycles.max(1));
        let function = self.function_of(gate, platform);
        for idx in affected {
            let set = &mut self.state[idx];
            match mode {
                ScheduleMode::Asap if cycle > 0 => set.erase(Range::new(0, cycle)),
                ScheduleMode::Alap if range.hi < u64::MAX => {
                    set.erase(Range::new(range.hi, u64::MAX));
                }
                _ => {}
            }
            set.set(range, function.clone(), |a, b| a == b);
        }
    }

    /// Human-readable dump of per-instrument reservation counts.
    pub fn describe(&self) -> String {
        let lines: Vec<String> = self
            .instrument_names
            .iter()
            .zip(&self.state)
            .map(|(name, state)| format!("{name}: {} reservation(s)", state.len()))
            .collect();
        format!("instrument resource '{}': [{}]", self.name, lines.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openql_ir::QubitId;
    use openql_platform::{Catalogue, InstructionEntry, Topology};
    use rustc_hash::FxHashMap as Map;
    use serde_json::Value;

    fn platform_with(gates: &[(&str, &str)]) -> Platform {
        let mut catalogue = Catalogue::new();
        for (name, type_tag) in gates {
            let mut attributes = Map::default();
            attributes.insert("fn".to_string(), Value::String((*name).to_string()));
            catalogue.insert(
                *name,
                InstructionEntry {
                    duration_ns: 20,
                    type_tag: type_tag.to_string(),
                    attributes,
                },
            );
        }
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
            resources: Vec::new(),
        }
    }

    fn qwg(num_qubits: u32) -> InstrumentResource {
        let binding = InstrumentBinding {
            name: "QWG".into(),
            qubits: (0..num_qubits).collect(),
            edges: Vec::new(),
        };
        let mut fields = Map::default();
        fields.insert("type".to_string(), vec![Value::String("mw".into())]);
        InstrumentResource::new(
            "qwg".into(),
            Predicate { fields },
            FunctionSpec::Keys(vec!["fn".into()]),
            false,
            std::slice::from_ref(&binding),
        )
    }

    fn gate(name: &str, qubit: u32, duration_cycles: u64) -> Gate {
        let mut g = Gate::new(name, [QubitId(qubit)]);
        g.duration_cycles = duration_cycles;
        g
    }

    #[test]
    fn test_same_function_parallel_allowed() {
        let platform = platform_with(&[("h", "mw")]);
        let mut r = qwg(2);
        let g0 = gate("h", 0, 1);
        let g1 = gate("h", 1, 1);
        assert!(r.try_reserve(1, &g0, &platform));
        r.commit(1, &g0, &platform, ScheduleMode::Asap);
        assert!(r.try_reserve(1, &g1, &platform));
    }

    #[test]
    fn test_different_function_serialized() {
        let platform = platform_with(&[("h", "mw"), ("x", "mw")]);
        let mut r = qwg(2);
        let g0 = gate("h", 0, 1);
        r.commit(1, &g0, &platform, ScheduleMode::Asap);
        let g1 = gate("x", 1, 1);
        assert!(!r.try_reserve(1, &g1, &platform));
        assert!(r.try_reserve(2, &g1, &platform));
    }

    #[test]
    fn test_non_matching_predicate_always_available() {
        let platform = platform_with(&[("cnot", "flux")]);
        let r = qwg(2);
        let g = gate("cnot", 0, 1);
        assert!(r.try_reserve(1, &g, &platform));
    }
}
