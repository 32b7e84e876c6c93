//! Error types for the IR crate.

use crate::qubit::{BregId, CregId, QubitId};
use thiserror::Error;

/// Errors that can occur building or mutating IR values.
///
/// These are structural/bounds errors internal to `openql-ir` itself, not
/// the compile-time errors of the scheduler or platform loader (those live
/// in `openql_sched::SchedError` and `openql_platform::PlatformError`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit operand out of range for the declared qubit count.
    #[error("qubit {qubit} out of range{}", format_gate_context(.gate_name))]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Creg operand out of range for the declared creg count.
    #[error("creg {creg} out of range{}", format_gate_context(.gate_name))]
    CregOutOfRange {
        /// The offending creg.
        creg: CregId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Breg operand out of range for the declared breg count.
    #[error("breg {breg} out of range{}", format_gate_context(.gate_name))]
    BregOutOfRange {
        /// The offending breg.
        breg: BregId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// A gate's condition kind does not match its `cond_operands` count.
    #[error(
        "gate '{gate_name}' condition expects {expected} operand(s), got {got}"
    )]
    ConditionArityMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of condition operands.
        expected: usize,
        /// Actual number of condition operands supplied.
        got: usize,
    },

    /// Duplicate qubit operand within a single gate.
    #[error("duplicate qubit {qubit} in operands{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
