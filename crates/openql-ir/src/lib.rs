//! OpenQL circuit intermediate representation.
//!
//! This crate provides the core data structures shared by the platform
//! loader and the scheduler/router: qubit and register index types, the
//! mutable [`Gate`] IR node, classical [`ConditionKind`]s, [`Block`]s, and
//! the top-level [`Program`].
//!
//! Gates are catalogue-driven rather than a closed enum: a [`Gate`] carries
//! only its instruction `name`, and duration/type/attribute information is
//! looked up in the platform's instruction catalogue (see `openql-platform`).
//! This keeps the IR open to whatever instruction set a platform JSON
//! declares, including router-inserted swap/move hops and per-target
//! decompositions.

pub mod block;
pub mod condition;
pub mod error;
pub mod gate;
pub mod program;
pub mod qubit;

pub use block::{Block, BlockKind};
pub use condition::ConditionKind;
pub use error::{IrError, IrResult};
pub use gate::{Gate, SwapParams, UNDEFINED_CYCLE};
pub use program::Program;
pub use qubit::{BregId, CregId, QubitId};
