//! OpenQL scheduling and routing pipeline.
//!
//! This crate turns a platform-agnostic [`openql_ir::Program`] into a
//! platform-executable one: every virtual qubit is mapped to a physical
//! qubit, connectivity-violating two-qubit gates are routed around with
//! swaps or moves, and every gate is assigned a cycle consistent with both
//! its data dependences and the platform's resource constraints.
//!
//! # Pipeline
//!
//! ```text
//! Program (virtual qubits, unscheduled)
//!       │
//!       ▼
//! ┌─────────────────┐
//! │ compile_program  │  per block, in program order
//! └─────────────────┘
//!       │
//!       ├── route_block    (C8: V2R + swap/move insertion, adjacency-aware)
//!       ├── DependenceGraph (C5: per-block RAW/WAW/WAR DAG + criticality)
//!       └── schedule_block  (C6: resource-constrained list scheduling)
//!       │
//!       ▼
//! Program (physical qubits, cycle numbers assigned)
//! ```
//!
//! # Resource model
//!
//! Qubits, instruments, and inter-core channels are each represented as a
//! half-open-interval [`rangemap::RangeMap`]-backed resource
//! ([`resources::QubitResource`], [`resources::InstrumentResource`],
//! [`resources::ChannelResource`]), composed by [`resources::ResourceManager`]
//! into the single reservation surface the scheduler and router query.
//!
//! # Configuration
//!
//! [`config::SchedulerConfig`] controls scheduling direction (ASAP/ALAP),
//! router heuristic, move-vs-swap policy, and alternative-path search
//! breadth; it is the one piece of state a caller threads through the whole
//! pipeline.

pub mod config;
pub mod dependence;
pub mod driver;
pub mod error;
pub mod rangemap;
pub mod resources;
pub mod router;
pub mod scheduler;
pub mod v2r;

pub use config::{MapperKind, PathSelectMode, ScheduleMode, SchedulerConfig};
pub use dependence::{DependenceGraph, Node};
pub use driver::{compile_block, compile_program};
pub use error::{SchedError, SchedResult};
pub use rangemap::RangeMap;
pub use resources::{ChannelResource, InstrumentResource, QubitResource, Resource, ResourceManager};
pub use router::route_block;
pub use scheduler::{schedule_block, ScheduleOutput};
pub use v2r::{Liveness, V2R};
