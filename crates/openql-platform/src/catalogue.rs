//! Instruction catalogue: maps a gate name to its duration, type tag, and
//! any custom attributes resources consult (predicates, instrument ids).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One instruction catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionEntry {
    /// Duration in nanoseconds.
    pub duration_ns: u64,
    /// Free-form type tag (e.g. `"mw"`, `"flux"`, `"readout"`), consulted by
    /// resource predicates.
    pub type_tag: String,
    /// Custom JSON attributes beyond `duration`/`type`, consulted verbatim
    /// by resource predicates (e.g. instrument-function keys).
    pub attributes: FxHashMap<String, Value>,
}

impl InstructionEntry {
    /// Duration in cycles given a platform cycle time, rounded up.
    pub fn duration_cycles(&self, cycle_time_ns: u64) -> u64 {
        self.duration_ns.div_ceil(cycle_time_ns)
    }

    /// Fetch a string-valued attribute, if present.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

/// The instruction catalogue: a name-indexed table of known instructions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalogue {
    instructions: FxHashMap<String, InstructionEntry>,
}

impl Catalogue {
    /// Create an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a catalogue entry.
    pub fn insert(&mut self, name: impl Into<String>, entry: InstructionEntry) {
        self.instructions.insert(name.into(), entry);
    }

    /// Look up a catalogue entry by exact name.
    pub fn get(&self, name: &str) -> Option<&InstructionEntry> {
        self.instructions.get(name)
    }

    /// Whether the catalogue declares this exact instruction name.
    pub fn contains(&self, name: &str) -> bool {
        self.instructions.contains_key(name)
    }

    /// Resolve the decomposition name to materialize `name` with, per the
    /// router's priority order: `{name}_prim` (fully primitive) if present,
    /// else `{name}_real` (post-mapping form), else `name` as written.
    /// Returns `None` only if none of the three exist in the catalogue.
    pub fn resolve_decomposition<'a>(&self, name: &'a str) -> Option<std::borrow::Cow<'a, str>> {
        let prim = format!("{name}_prim");
        if self.contains(&prim) {
            return Some(std::borrow::Cow::Owned(prim));
        }
        let real = format!("{name}_real");
        if self.contains(&real) {
            return Some(std::borrow::Cow::Owned(real));
        }
        if self.contains(name) {
            return Some(std::borrow::Cow::Borrowed(name));
        }
        None
    }

    /// Number of declared instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the catalogue has no entries.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
