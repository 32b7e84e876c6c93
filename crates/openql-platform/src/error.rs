//! Errors raised while loading or validating a platform description.

use thiserror::Error;

/// Configuration-time errors: malformed platform/resource JSON, out-of-range
/// qubit ids, duplicate edges, and similar structural problems discovered
/// before any gate is ever scheduled.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlatformError {
    /// The JSON document could not be parsed at all.
    #[error("malformed platform JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A mandatory top-level key was missing.
    #[error("platform JSON missing mandatory field '{0}'")]
    MissingField(&'static str),

    /// `qubit_number` or `cycle_time` was not a positive integer.
    #[error("field '{field}' must be positive, got {value}")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The value that failed validation.
        value: i64,
    },

    /// A topology edge referenced a qubit id outside `0..num_qubits`.
    #[error("topology edge ({src}, {dst}) references qubit outside 0..{num_qubits}")]
    QubitOutOfRange {
        /// Edge source.
        src: u32,
        /// Edge destination.
        dst: u32,
        /// Declared qubit count.
        num_qubits: u32,
    },

    /// The same undirected edge was declared more than once.
    #[error("duplicate topology edge ({0}, {1})")]
    DuplicateEdge(u32, u32),

    /// A `topology.qubits[].id` entry referenced a qubit id outside range.
    #[error("topology qubit coordinate entry references qubit id {0} outside 0..{1}")]
    CoordinateOutOfRange(u32, u32),

    /// A resource config had an unrecognized or missing `type` discriminant.
    #[error("unknown resource type '{0}'")]
    UnknownResourceType(String),

    /// An instrument or channel resource referenced a qubit id out of range.
    #[error("resource '{resource}' references qubit {qubit} outside 0..{num_qubits}")]
    ResourceQubitOutOfRange {
        /// Resource name, for diagnostics.
        resource: String,
        /// Offending qubit id.
        qubit: u32,
        /// Declared qubit count.
        num_qubits: u32,
    },

    /// The topology graph is disconnected; routing requires a connected
    /// topology so that a shortest path always exists between any two
    /// qubits (spec: "the router cannot deadlock").
    #[error("topology is not connected: qubit {0} is unreachable from qubit 0")]
    Disconnected(u32),
}

/// Result type for platform loading/validation.
pub type PlatformResult<T> = Result<T, PlatformError>;
