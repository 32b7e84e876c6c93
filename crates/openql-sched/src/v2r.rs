//! Virtual-to-real qubit mapping state, scoped to one block's routing pass.

use openql_ir::QubitId;

use crate::error::{SchedError, SchedResult};

const UNDEFINED: u32 = u32::MAX;

/// Liveness of the quantum state held by a physical qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// No physical qubit has ever been allocated to hold this state; a move
    /// may initialize it from scratch.
    NoState,
    /// The physical qubit was reset (e.g. by `prepz`) but holds no live
    /// superposition; a move is still safe.
    WasInited,
    /// The physical qubit holds live, unmeasured state; only a real swap
    /// may relocate it.
    HasState,
}

/// Virtual -> physical qubit map plus per-physical liveness, for one block's
/// routing pass.
#[derive(Debug, Clone)]
pub struct V2R {
    /// `v2r[v] = r`, `UNDEFINED` until `v` is first used.
    v2r: Vec<u32>,
    /// Inverse map, `r2v[r] = v`, `UNDEFINED` when unallocated.
    r2v: Vec<u32>,
    liveness: Vec<Liveness>,
}

impl V2R {
    /// Build an unallocated V2R over `num_qubits` physical qubits.
    pub fn new(num_qubits: u32, assume_zero_init_state: bool) -> Self {
        let n = num_qubits as usize;
        Self {
            v2r: vec![UNDEFINED; n],
            r2v: vec![UNDEFINED; n],
            liveness: vec![
                if assume_zero_init_state {
                    Liveness::WasInited
                } else {
                    Liveness::NoState
                };
                n
            ],
        }
    }

    /// Build a one-to-one V2R (`v2r[v] == v` for every qubit).
    pub fn one_to_one(num_qubits: u32, assume_zero_init_state: bool) -> Self {
        let mut s = Self::new(num_qubits, assume_zero_init_state);
        for v in 0..num_qubits {
            s.v2r[v as usize] = v;
            s.r2v[v as usize] = v;
        }
        s
    }

    /// Physical qubit currently holding virtual qubit `v`, if allocated.
    pub fn real_of(&self, v: QubitId) -> Option<QubitId> {
        let r = self.v2r[v.0 as usize];
        (r != UNDEFINED).then_some(QubitId(r))
    }

    /// Virtual qubit held by physical qubit `r`, or `None` if unallocated.
    pub fn get_virt(&self, r: QubitId) -> Option<QubitId> {
        let v = self.r2v[r.0 as usize];
        (v != UNDEFINED).then_some(QubitId(v))
    }

    /// Liveness of physical qubit `r`.
    pub fn liveness(&self, r: QubitId) -> Liveness {
        self.liveness[r.0 as usize]
    }

    /// Allocate a free physical qubit for virtual qubit `v`, preferring the
    /// lowest-indexed free physical, and return it. No-op (returns the
    /// existing mapping) if `v` is already allocated.
    pub fn alloc(&mut self, v: QubitId) -> SchedResult<QubitId> {
        if let Some(r) = self.real_of(v) {
            return Ok(r);
        }
        let r = self
            .r2v
            .iter()
            .position(|&occupant| occupant == UNDEFINED)
            .ok_or(SchedError::V2RExhausted)? as u32;
        self.v2r[v.0 as usize] = r;
        self.r2v[r as usize] = v.0;
        Ok(QubitId(r))
    }

    /// Swap the virtual qubits held by physical qubits `r0` and `r1`,
    /// interchanging their liveness markers along with them.
    pub fn swap(&mut self, r0: QubitId, r1: QubitId) {
        self.r2v.swap(r0.0 as usize, r1.0 as usize);
        self.liveness.swap(r0.0 as usize, r1.0 as usize);
        if self.r2v[r0.0 as usize] != UNDEFINED {
            self.v2r[self.r2v[r0.0 as usize] as usize] = r0.0;
        }
        if self.r2v[r1.0 as usize] != UNDEFINED {
            self.v2r[self.r2v[r1.0 as usize] as usize] = r1.0;
        }
    }

    /// Escape hatch for `prepz`-like gates: mark `r` as holding no live
    /// state, regardless of what it held before.
    pub fn set_state(&mut self, r: QubitId, liveness: Liveness) {
        self.liveness[r.0 as usize] = liveness;
    }

    /// Whether every real qubit holds at most one virtual qubit and vice
    /// versa (checked by property tests; always true if only `alloc`/`swap`
    /// are used to mutate state).
    pub fn is_injective(&self) -> bool {
        let mut seen = vec![false; self.r2v.len()];
        for &r in &self.v2r {
            if r == UNDEFINED {
                continue;
            }
            if seen[r as usize] {
                return false;
            }
            seen[r as usize] = true;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_picks_lowest_free() {
        let mut v2r = V2R::new(3, false);
        assert_eq!(v2r.alloc(QubitId(0)).unwrap(), QubitId(0));
        assert_eq!(v2r.alloc(QubitId(1)).unwrap(), QubitId(1));
        assert_eq!(v2r.alloc(QubitId(0)).unwrap(), QubitId(0));
    }

    #[test]
    fn test_alloc_exhausted() {
        let mut v2r = V2R::new(1, false);
        v2r.alloc(QubitId(0)).unwrap();
        assert!(v2r.alloc(QubitId(1)).is_err());
    }

    #[test]
    fn test_swap_updates_both_directions() {
        let mut v2r = V2R::one_to_one(2, false);
        v2r.swap(QubitId(0), QubitId(1));
        assert_eq!(v2r.real_of(QubitId(0)), Some(QubitId(1)));
        assert_eq!(v2r.real_of(QubitId(1)), Some(QubitId(0)));
        assert_eq!(v2r.get_virt(QubitId(0)), Some(QubitId(1)));
        assert_eq!(v2r.get_virt(QubitId(1)), Some(QubitId(0)));
        assert!(v2r.is_injective());
    }

    #[test]
    fn test_one_to_one_zero_init_state() {
        let v2r = V2R::one_to_one(2, true);
        assert_eq!(v2r.liveness(QubitId(0)), Liveness::WasInited);
    }

    #[test]
    fn test_default_init_has_no_state() {
        let v2r = V2R::new(2, false);
        assert_eq!(v2r.liveness(QubitId(0)), Liveness::NoState);
    }
}
