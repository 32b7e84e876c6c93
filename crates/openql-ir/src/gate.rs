//! The gate IR node.

use serde::{Deserialize, Serialize};

use crate::condition::ConditionKind;
use crate::qubit::{BregId, CregId, QubitId};

/// Sentinel cycle value meaning "not yet scheduled".
pub const UNDEFINED_CYCLE: u64 = u64::MAX;

/// Virtual↔physical qubit pair recorded on a router-inserted swap or move
/// gate: the two physical registers the gate touches (`r0`, `r1`) and the
/// virtual qubits they held immediately before the hop (`v0`, `v1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    /// First physical register touched.
    pub r0: QubitId,
    /// Second physical register touched.
    pub r1: QubitId,
    /// Virtual qubit held by `r0` before the hop.
    pub v0: QubitId,
    /// Virtual qubit held by `r1` before the hop.
    pub v1: QubitId,
}

/// A single gate in the intermediate representation.
///
/// Gates are not a closed enum: `name` is looked up against the platform's
/// instruction catalogue for duration, type tag, and resource-relevant
/// attributes. This mirrors how the IR has to stay open to whatever
/// instruction set a given platform JSON declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// Catalogue instruction name.
    pub name: String,
    /// Ordered qubit operands. Virtual before routing, physical after.
    pub operands: Vec<QubitId>,
    /// Classical (multi-bit) register operands.
    pub creg_operands: Vec<CregId>,
    /// Single-bit register operands (e.g. measurement destinations).
    pub breg_operands: Vec<BregId>,
    /// Bregs read by this gate's classical condition.
    pub cond_operands: Vec<BregId>,
    /// Classical condition gating execution of this gate.
    pub condition: ConditionKind,
    /// Duration in nanoseconds, from the catalogue.
    pub duration_ns: u64,
    /// Duration in scheduler cycles, `ceil(duration_ns / cycle_time_ns)`.
    pub duration_cycles: u64,
    /// Rotation angle, present only on parameterized gates.
    pub angle: Option<f64>,
    /// Assigned cycle, `UNDEFINED_CYCLE` until the scheduler runs.
    pub cycle: u64,
    /// Present only on router-inserted swap/move gates.
    pub swap_params: Option<SwapParams>,
}

impl Gate {
    /// Construct a new, unscheduled gate with the given name and qubit
    /// operands. Duration fields are left at zero; callers fill them in
    /// from the platform catalogue (see `openql-platform`).
    pub fn new(name: impl Into<String>, operands: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            name: name.into(),
            operands: operands.into_iter().collect(),
            creg_operands: Vec::new(),
            breg_operands: Vec::new(),
            cond_operands: Vec::new(),
            condition: ConditionKind::Always,
            duration_ns: 0,
            duration_cycles: 0,
            angle: None,
            cycle: UNDEFINED_CYCLE,
            swap_params: None,
        }
    }

    /// Whether this gate has been assigned a cycle.
    pub fn is_scheduled(&self) -> bool {
        self.cycle != UNDEFINED_CYCLE
    }

    /// Number of qubit operands.
    pub fn num_qubits(&self) -> usize {
        self.operands.len()
    }

    /// Whether this gate is a router-inserted swap/move hop.
    pub fn is_swap_like(&self) -> bool {
        self.swap_params.is_some()
    }

    /// Clear the assigned cycle, e.g. before re-scheduling a block.
    pub fn clear_cycle(&mut self) {
        self.cycle = UNDEFINED_CYCLE;
    }
}
