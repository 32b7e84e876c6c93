//! OpenQL platform model.
//!
//! A [`Platform`] is the immutable description the scheduler and router
//! compile against: qubit count and cycle time, an instruction
//! [`Catalogue`], a [`Topology`], and a list of [`ResourceConfig`] records.
//! [`json::load_platform`] parses and validates the external JSON format.

pub mod catalogue;
pub mod error;
pub mod json;
pub mod platform;
pub mod resource_config;
pub mod topology;

pub use catalogue::{Catalogue, InstructionEntry};
pub use error::{PlatformError, PlatformResult};
pub use json::load_platform;
pub use platform::Platform;
pub use resource_config::{FunctionSpec, InstrumentBinding, Predicate, ResourceConfig};
pub use topology::Topology;
