//! Index types for the quantum, classical-register, and bit-register address
//! spaces a gate can operate on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a qubit operand.
///
/// Before routing this is a virtual qubit index; after routing (see
/// `openql-sched`'s router) the same type carries a physical qubit index.
/// The two spaces share a representation by design, mirroring how the
/// mapper overwrites `operands` in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Index of a classical (multi-bit) register operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CregId(pub u32);

impl fmt::Display for CregId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for CregId {
    fn from(id: u32) -> Self {
        CregId(id)
    }
}

/// Index of a single-bit (measurement/condition result) register operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BregId(pub u32);

impl fmt::Display for BregId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl From<u32> for BregId {
    fn from(id: u32) -> Self {
        BregId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(QubitId(3).to_string(), "q3");
        assert_eq!(CregId(1).to_string(), "c1");
        assert_eq!(BregId(2).to_string(), "b2");
    }
}
