//! Typed resource configuration records, as declared in the platform JSON's
//! `resources` array.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gate predicate: a gate qualifies for a resource if, for every key in the
/// predicate, the gate's catalogue attribute under that key is present in
/// the associated value list. An empty predicate matches every gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// key -> allowed values.
    #[serde(flatten)]
    pub fields: FxHashMap<String, Vec<Value>>,
}

impl Predicate {
    /// Whether `attrs` satisfies this predicate.
    pub fn matches(&self, attrs: &FxHashMap<String, Value>) -> bool {
        self.fields.iter().all(|(key, allowed)| {
            attrs
                .get(key)
                .is_some_and(|v| allowed.iter().any(|a| a == v))
        })
    }
}

/// How an instrument resource derives its "function" tuple, which decides
/// whether two overlapping reservations on the same instrument may coexist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FunctionSpec {
    /// Concatenate these gate attribute keys (in order) into the interned
    /// function tuple.
    Keys(Vec<String>),
    /// No two overlapping reservations are ever allowed, regardless of
    /// attributes (function matching is disabled).
    Exclusive,
}

/// One named instrument and the physical qubits/edges it serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentBinding {
    /// Instrument name, for diagnostics and `Resource::describe`.
    pub name: String,
    /// Physical qubits served by this instrument, for single-qubit gates.
    #[serde(default)]
    pub qubits: Vec<u32>,
    /// Physical qubit-pair edges served, for two-qubit gates.
    #[serde(default)]
    pub edges: Vec<(u32, u32)>,
}

/// One resource configuration entry, discriminated by `type` in the JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceConfig {
    /// Per-physical-qubit exclusivity. No parameters beyond the implicit
    /// `num_qubits` already carried by the platform.
    Qubit {
        /// Resource instance name, for diagnostics.
        #[serde(default = "default_qubit_resource_name")]
        name: String,
    },
    /// A shared control instrument (e.g. an AWG/QWG).
    Instrument {
        /// Resource instance name.
        name: String,
        /// Which gates this resource cares about.
        #[serde(default)]
        predicate: Predicate,
        /// Function derivation.
        function: FunctionSpec,
        /// Whether concurrent same-function reservations are permitted at
        /// all (if false, any overlap is rejected regardless of function).
        #[serde(default)]
        allow_overlap: bool,
        /// Instrument bindings.
        instruments: Vec<InstrumentBinding>,
    },
    /// An inter-core communication channel pool.
    InterCoreChannel {
        /// Resource instance name.
        name: String,
        /// Which gates this resource cares about.
        #[serde(default)]
        predicate: Predicate,
        /// Channels available per core.
        num_channels: u32,
        /// Whether a gate must be inter-core to be considered at all.
        #[serde(default)]
        inter_core_required: bool,
        /// Whether a gate must touch a designated communication qubit.
        #[serde(default)]
        communication_qubit_only: bool,
    },
}

fn default_qubit_resource_name() -> String {
    "qubits".to_string()
}
