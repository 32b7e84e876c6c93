//! Errors raised by the dependence graph, scheduler, and router.

use thiserror::Error;

/// Errors raised while scheduling or routing a block.
///
/// Every variant aborts the current compile; there is no local recovery
/// except the router's own fallback name chain (see `openql_platform`'s
/// `Catalogue::resolve_decomposition`), which is not an error at all.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchedError {
    /// A platform description failed validation.
    #[error(transparent)]
    Platform(#[from] openql_platform::PlatformError),

    /// IR-level structural error.
    #[error(transparent)]
    Ir(#[from] openql_ir::IrError),

    /// An instruction name was referenced by a gate but is absent from the
    /// platform catalogue, with no decomposition fallback.
    #[error("kernel '{kernel}': no catalogue entry (or decomposition) for instruction '{name}'")]
    CatalogueMiss {
        /// Kernel (block) name.
        kernel: String,
        /// Missing instruction name.
        name: String,
    },

    /// A gate's condition arity did not match its `ConditionKind`.
    #[error("kernel '{kernel}': gate '{name}' condition arity mismatch")]
    ConditionArityMismatch {
        /// Kernel (block) name.
        kernel: String,
        /// Gate name.
        name: String,
    },

    /// Two virtual qubits were mapped to the same physical qubit.
    #[error("V2R image collision: physical qubit {physical} already holds a virtual qubit")]
    V2RCollision {
        /// The physical qubit with conflicting virtual occupants.
        physical: u32,
    },

    /// No physical qubit was free to satisfy an allocation request.
    #[error("V2R allocation failed: no free physical qubit available")]
    V2RExhausted,

    /// A range-map invariant was violated (overlap survived a `set`).
    #[error("range-map invariant violated for resource '{resource}'")]
    RangeMapInvariant {
        /// Resource instance name.
        resource: String,
    },

    /// The scheduler dequeued a gate whose DAG predecessors were not all
    /// scheduled yet — an internal consistency failure, never caused by
    /// input data.
    #[error("kernel '{kernel}': gate '{name}' scheduled with unready predecessors")]
    UnreadyPredecessor {
        /// Kernel (block) name.
        kernel: String,
        /// Gate name.
        name: String,
    },

    /// No cycle up to the configured ceiling admits the gate; the platform
    /// is over-constrained for this kernel.
    #[error(
        "kernel '{kernel}': gate '{name}' unsatisfiable — no cycle <= {max_cycle} satisfies resource constraints"
    )]
    ResourceUnsatisfiable {
        /// Kernel (block) name.
        kernel: String,
        /// Gate name.
        name: String,
        /// Search ceiling that was exhausted.
        max_cycle: u64,
    },

    /// Routing could not find a path between two physical qubits. Does not
    /// occur on a validated (connected) topology; kept as a defensive
    /// variant should a future topology type relax that guarantee.
    #[error("kernel '{kernel}': no route between physical qubits {q1} and {q2}")]
    RoutingFailed {
        /// Kernel (block) name.
        kernel: String,
        /// First physical qubit.
        q1: u32,
        /// Second physical qubit.
        q2: u32,
    },
}

/// Result type for scheduler/router operations.
pub type SchedResult<T> = Result<T, SchedError>;
