//! Global scheduler/router configuration, passed by the caller to the
//! program driver.

use serde::{Deserialize, Serialize};

/// Scheduling direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleMode {
    /// Schedule forward from `SOURCE`, as-soon-as-possible.
    Asap,
    /// Schedule backward from `SINK`, as-late-as-possible.
    Alap,
}

/// Router heuristic variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapperKind {
    /// Score alternatives by added depth only.
    Base,
    /// Score alternatives by added depth, preferring minimal schedule
    /// extension across the whole remaining block.
    MinExtend,
    /// `Base` plus resource-constrained local pre-scheduling.
    BaseRc,
    /// `MinExtend` plus resource-constrained local pre-scheduling.
    MinExtendRc,
}

/// Which alternative paths the router considers for a non-adjacent 2q gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathSelectMode {
    /// Consider every shortest path and every valid split.
    All,
    /// Consider only splits at the path's end qubits (cheaper, narrower
    /// search).
    Borders,
}

/// Immutable configuration passed to the program driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// ASAP or ALAP.
    pub mode: ScheduleMode,
    /// Whether the router may use 2-gate moves instead of 3-gate swaps.
    pub use_moves: bool,
    /// Whether V2R starts one-to-one (`v == r`) rather than unallocated.
    pub init_one_to_one: bool,
    /// Whether every physical qubit starts `was_inited` rather than
    /// `no_state`.
    pub assume_zero_init_state: bool,
    /// Whether a symmetric swap's operand order may be reversed to shave
    /// one cycle off its earliest start.
    pub reverse_swap: bool,
    /// Alternative-path search breadth.
    pub path_select: PathSelectMode,
    /// Router heuristic.
    pub mapper: MapperKind,
    /// Maximum extra cycles a move's required `prepz` initialization may
    /// add to the schedule before the router falls back to a swap.
    pub move_init_threshold_cycles: u64,
    /// Search ceiling for the list scheduler's resource-aware earliest
    /// start probe; exceeding it is a [`crate::error::SchedError::ResourceUnsatisfiable`].
    pub max_cycle: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            mode: ScheduleMode::Asap,
            use_moves: false,
            init_one_to_one: false,
            assume_zero_init_state: false,
            reverse_swap: false,
            path_select: PathSelectMode::All,
            mapper: MapperKind::BaseRc,
            move_init_threshold_cycles: 4,
            max_cycle: 1 << 20,
        }
    }
}

impl SchedulerConfig {
    /// Start from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scheduling direction.
    #[must_use]
    pub fn with_mode(mut self, mode: ScheduleMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the router heuristic.
    #[must_use]
    pub fn with_mapper(mut self, mapper: MapperKind) -> Self {
        self.mapper = mapper;
        self
    }

    /// Enable or disable move insertion.
    #[must_use]
    pub fn with_use_moves(mut self, use_moves: bool) -> Self {
        self.use_moves = use_moves;
        self
    }

    /// Start V2R one-to-one (`v == r`) rather than unallocated.
    #[must_use]
    pub fn with_init_one_to_one(mut self, init_one_to_one: bool) -> Self {
        self.init_one_to_one = init_one_to_one;
        self
    }

    /// Enable or disable the reverse-swap operand tie-break.
    #[must_use]
    pub fn with_reverse_swap(mut self, reverse_swap: bool) -> Self {
        self.reverse_swap = reverse_swap;
        self
    }
}
