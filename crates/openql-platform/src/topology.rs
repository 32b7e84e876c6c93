//! Qubit topology: neighbour graph, all-pairs distance, core partition, and
//! angle-sorted neighbour lists used to break routing ties.

use openql_ir::QubitId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, PlatformResult};

const UNREACHABLE: u32 = u32::MAX;

/// Physical qubit topology.
///
/// Distances are precomputed via Floyd-Warshall at construction time so
/// that `distance`/`min_hops` are O(1) and `shortest_paths` only has to
/// walk the precomputed matrix, never re-run a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    num_qubits: u32,
    edges: Vec<(u32, u32)>,
    /// `(x, y)` per qubit, used only for angle tie-breaking; absent on
    /// platforms that never specify coordinates.
    coords: Option<Vec<(f64, f64)>>,
    /// Physical qubit -> core id. Uniform: every qubit has exactly one core.
    core_of: Vec<u32>,
    num_cores: u32,

    #[serde(skip)]
    adjacency: FxHashMap<u32, Vec<u32>>,
    #[serde(skip)]
    dist: Vec<Vec<u32>>,
    /// True once any two-qubit gate has been placed; affects `min_hops`
    /// per spec (an all-inter-core hop costs one extra before the first
    /// 2q gate establishes a core-local foothold).
    #[serde(skip)]
    any_2q_placed: bool,
}

impl Topology {
    /// Build a topology from an edge list, optional coordinates, and a core
    /// partition. Validates qubit ids, rejects duplicate edges, and
    /// precomputes distances. Fails if the resulting graph is disconnected.
    pub fn new(
        num_qubits: u32,
        edges: Vec<(u32, u32)>,
        coords: Option<Vec<(f64, f64)>>,
        core_of: Vec<u32>,
    ) -> PlatformResult<Self> {
        let mut seen = std::collections::HashSet::new();
        for &(a, b) in &edges {
            if a >= num_qubits || b >= num_qubits {
                return Err(PlatformError::QubitOutOfRange {
                    src: a,
                    dst: b,
                    num_qubits,
                });
            }
            let key = (a.min(b), a.max(b));
            if !seen.insert(key) {
                return Err(PlatformError::DuplicateEdge(a, b));
            }
        }
        let num_cores = core_of.iter().copied().max().map_or(0, |m| m + 1);

        let mut topo = Self {
            num_qubits,
            edges,
            coords,
            core_of,
            num_cores,
            adjacency: FxHashMap::default(),
            dist: Vec::new(),
            any_2q_placed: false,
        };
        topo.rebuild_caches();

        for q in 1..num_qubits {
            if topo.distance(0, q).is_none() {
                return Err(PlatformError::Disconnected(q));
            }
        }
        Ok(topo)
    }

    /// A fully-connected topology over `num_qubits`, all on one core.
    pub fn full(num_qubits: u32) -> Self {
        let mut edges = Vec::new();
        for i in 0..num_qubits {
            for j in (i + 1)..num_qubits {
                edges.push((i, j));
            }
        }
        Self::new(num_qubits, edges, None, vec![0; num_qubits as usize])
            .expect("fully connected topology is always valid")
    }

    /// Rebuild the adjacency list and distance matrix from the edge list.
    /// Must be called after manual field mutation or deserialization.
    pub fn rebuild_caches(&mut self) {
        self.adjacency.clear();
        for &(a, b) in &self.edges {
            self.adjacency.entry(a).or_default().push(b);
            self.adjacency.entry(b).or_default().push(a);
        }
        for neighbors in self.adjacency.values_mut() {
            neighbors.sort_unstable();
        }
        self.precompute_distances();
    }

    fn precompute_distances(&mut self) {
        let n = self.num_qubits as usize;
        let mut dist = vec![vec![UNREACHABLE; n]; n];
        for i in 0..n {
            dist[i][i] = 0;
        }
        for &(a, b) in &self.edges {
            dist[a as usize][b as usize] = 1;
            dist[b as usize][a as usize] = 1;
        }
        for k in 0..n {
            for i in 0..n {
                if dist[i][k] == UNREACHABLE {
                    continue;
                }
                for j in 0..n {
                    if dist[k][j] == UNREACHABLE {
                        continue;
                    }
                    let via = dist[i][k] + dist[k][j];
                    if via < dist[i][j] {
                        dist[i][j] = via;
                    }
                }
            }
        }
        self.dist = dist;
    }

    /// Number of physical qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of cores.
    pub fn num_cores(&self) -> u32 {
        self.num_cores.max(1)
    }

    /// Core id a physical qubit belongs to.
    pub fn core_of(&self, q: u32) -> u32 {
        self.core_of.get(q as usize).copied().unwrap_or(0)
    }

    /// Whether two physical qubits are topology-adjacent.
    pub fn is_adjacent(&self, a: u32, b: u32) -> bool {
        self.adjacency.get(&a).is_some_and(|n| n.contains(&b))
    }

    /// Direct neighbours of a physical qubit, in ascending id order.
    pub fn neighbors(&self, q: u32) -> &[u32] {
        self.adjacency.get(&q).map_or(&[], |v| v.as_slice())
    }

    /// Shortest-path distance between two physical qubits, or `None` if
    /// disconnected (never happens for a validated `Topology`).
    pub fn distance(&self, a: u32, b: u32) -> Option<u32> {
        let d = self.dist[a as usize][b as usize];
        if d == UNREACHABLE { None } else { Some(d) }
    }

    /// `0` if `a` and `b` are on the same core, `1` otherwise (inter-core
    /// connectivity is assumed fully connected at distance 1).
    pub fn core_distance(&self, a: u32, b: u32) -> u32 {
        if self.core_of(a) == self.core_of(b) { 0 } else { 1 }
    }

    /// `distance(a, b)` plus one extra hop if the path would be entirely
    /// inter-core and no two-qubit gate has been placed in this block yet.
    pub fn min_hops(&self, a: u32, b: u32) -> u32 {
        let base = self.distance(a, b).unwrap_or(0);
        if self.core_of(a) != self.core_of(b) && !self.any_2q_placed {
            base + 1
        } else {
            base
        }
    }

    /// Record that a two-qubit gate has now been placed, affecting future
    /// `min_hops` queries for this block.
    pub fn mark_2q_placed(&mut self) {
        self.any_2q_placed = true;
    }

    /// Enumerate every shortest path from `src` to `dst` of length
    /// `distance(src, dst)`. Each path is a `Vec<u32>` of qubit ids,
    /// `src` first, `dst` last. Returns a single-element `vec![vec![src]]`
    /// when `src == dst`.
    pub fn shortest_paths(&self, src: u32, dst: u32) -> Vec<Vec<u32>> {
        if src == dst {
            return vec![vec![src]];
        }
        let Some(target) = self.distance(src, dst) else {
            return Vec::new();
        };
        let mut paths = Vec::new();
        let mut current = vec![src];
        self.enumerate_paths(src, dst, target, &mut current, &mut paths);
        paths
    }

    fn enumerate_paths(
        &self,
        at: u32,
        dst: u32,
        remaining: u32,
        current: &mut Vec<u32>,
        out: &mut Vec<Vec<u32>>,
    ) {
        if at == dst {
            if remaining == 0 {
                out.push(current.clone());
            }
            return;
        }
        if remaining == 0 {
            return;
        }
        for &next in self.neighbors(at) {
            if self.distance(next, dst) == Some(remaining - 1) {
                current.push(next);
                self.enumerate_paths(next, dst, remaining - 1, current, out);
                current.pop();
            }
        }
    }

    /// Neighbours of `q`, sorted by clockwise angle from the positive
    /// x-axis (coordinates required). Falls back to ascending id order on
    /// platforms without coordinates, matching the deterministic-iteration
    /// requirement even in the absence of geometric data.
    pub fn neighbors_by_angle(&self, q: u32) -> Vec<u32> {
        let mut neighbors: Vec<u32> = self.neighbors(q).to_vec();
        if let Some(coords) = &self.coords {
            let (qx, qy) = coords[q as usize];
            neighbors.sort_by(|&a, &b| {
                let (ax, ay) = coords[a as usize];
                let (bx, by) = coords[b as usize];
                let angle_a = clockwise_angle(qx, qy, ax, ay);
                let angle_b = clockwise_angle(qx, qy, bx, by);
                angle_a
                    .partial_cmp(&angle_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.cmp(&b))
            });
        }
        neighbors
    }

    /// Qubit operand of `QubitId` form, for callers holding IR types.
    pub fn is_adjacent_ids(&self, a: QubitId, b: QubitId) -> bool {
        self.is_adjacent(a.0, b.0)
    }
}

/// Clockwise angle (radians, `[0, 2π)`) from `(cx, cy)` to `(px, py)`,
/// measured from the positive x-axis.
fn clockwise_angle(cx: f64, cy: f64, px: f64, py: f64) -> f64 {
    let dx = px - cx;
    let dy = py - cy;
    let angle = (-dy).atan2(dx);
    if angle < 0.0 {
        angle + std::f64::consts::TAU
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: u32) -> Topology {
        let edges = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        Topology::new(n, edges, None, vec![0; n as usize]).unwrap()
    }

    #[test]
    fn test_line_distance() {
        let t = line(4);
        assert_eq!(t.distance(0, 3), Some(3));
        assert_eq!(t.distance(1, 2), Some(1));
    }

    #[test]
    fn test_shortest_paths_unique_on_line() {
        let t = line(3);
        let paths = t.shortest_paths(0, 2);
        assert_eq!(paths, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_shortest_paths_multiple_in_square() {
        // 0-1, 1-2, 2-3, 3-0: a 4-cycle, two shortest paths 0->2.
        let t = Topology::new(4, vec![(0, 1), (1, 2), (2, 3), (3, 0)], None, vec![0; 4]).unwrap();
        let mut paths = t.shortest_paths(0, 2);
        paths.sort();
        assert_eq!(paths, vec![vec![0, 1, 2], vec![0, 3, 2]]);
    }

    #[test]
    fn test_duplicate_edge_rejected() {
        let err = Topology::new(2, vec![(0, 1), (1, 0)], None, vec![0, 0]);
        assert!(err.is_err());
    }

    #[test]
    fn test_disconnected_rejected() {
        let err = Topology::new(3, vec![(0, 1)], None, vec![0, 0, 0]);
        assert!(err.is_err());
    }

    #[test]
    fn test_core_distance() {
        let t = Topology::new(4, vec![(0, 1), (2, 3), (1, 2)], None, vec![0, 0, 1, 1]).unwrap();
        assert_eq!(t.core_distance(0, 1), 0);
        assert_eq!(t.core_distance(1, 2), 1);
    }

    #[test]
    fn test_min_hops_before_and_after_2q_placed() {
        let mut t = Topology::new(4, vec![(0, 1), (2, 3), (1, 2)], None, vec![0, 0, 1, 1]).unwrap();
        assert_eq!(t.min_hops(0, 3), 4);
        t.mark_2q_placed();
        assert_eq!(t.min_hops(0, 3), 3);
    }
}
