//! Classical conditions that gate whether a gate executes.

use serde::{Deserialize, Serialize};

/// The kind of classical condition attached to a gate, and by extension the
/// number of `cond_operands` (bregs) it consumes: 0 for `Always`/`Never`,
/// 1 for `Unary`/`Not`, 2 for the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionKind {
    /// Always executes; 0 operands.
    Always,
    /// Never executes; 0 operands.
    Never,
    /// Executes iff the single breg operand is set; 1 operand.
    Unary,
    /// Executes iff the single breg operand is clear; 1 operand.
    Not,
    /// Executes iff both breg operands are set; 2 operands.
    And,
    /// Executes iff not both breg operands are set; 2 operands.
    Nand,
    /// Executes iff at least one breg operand is set; 2 operands.
    Or,
    /// Executes iff neither breg operand is set; 2 operands.
    Nor,
    /// Executes iff exactly one breg operand is set; 2 operands.
    Xor,
    /// Executes iff the breg operands agree; 2 operands.
    Nxor,
}

impl ConditionKind {
    /// Number of `cond_operands` this condition kind requires.
    pub fn operand_count(self) -> usize {
        match self {
            ConditionKind::Always | ConditionKind::Never => 0,
            ConditionKind::Unary | ConditionKind::Not => 1,
            ConditionKind::And
            | ConditionKind::Nand
            | ConditionKind::Or
            | ConditionKind::Nor
            | ConditionKind::Xor
            | ConditionKind::Nxor => 2,
        }
    }

    /// Whether this condition can statically be proven non-trivial, i.e. is
    /// anything other than the default `Always`.
    pub fn is_conditional(self) -> bool {
        !matches!(self, ConditionKind::Always)
    }
}

impl Default for ConditionKind {
    fn default() -> Self {
        ConditionKind::Always
    }
}
