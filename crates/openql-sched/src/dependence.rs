//! Per-block dependence graph: a DAG over a block's gates plus synthetic
//! `SOURCE`/`SINK` nodes, with RAW/WAW/WAR edges over shared qubit/creg/breg
//! resources and a precomputed criticality (longest path to `SINK`).

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::FxHashMap;

use openql_ir::{Block, Gate};

use crate::error::{SchedError, SchedResult};

/// A node in the dependence graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    /// Synthetic root, predecessor of every gate with no real predecessor.
    Source,
    /// Synthetic leaf, successor of every gate with no real successor.
    Sink,
    /// A real gate, by its index in the block's gate list.
    Gate(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ResourceKey {
    Qubit(u32),
    Creg(u32),
    Breg(u32),
}

/// Read/write resource keys touched by a gate.
///
/// Qubit operands are both read and written (a gate's matrix acts on the
/// qubit's full state, so any shared qubit operand orders two gates
/// regardless of which one a human would call the "control"). Creg operands
/// and condition operands are reads. Breg operands (measurement
/// destinations) are writes.
fn operand_roles(gate: &Gate) -> (Vec<ResourceKey>, Vec<ResourceKey>) {
    let mut reads = Vec::new();
    let mut writes = Vec::new();

    for q in &gate.operands {
        reads.push(ResourceKey::Qubit(q.0));
        writes.push(ResourceKey::Qubit(q.0));
    }
    for c in &gate.creg_operands {
        reads.push(ResourceKey::Creg(c.0));
    }
    for b in &gate.cond_operands {
        reads.push(ResourceKey::Breg(b.0));
    }
    for b in &gate.breg_operands {
        writes.push(ResourceKey::Breg(b.0));
    }

    (reads, writes)
}

/// The dependence graph for one block.
pub struct DependenceGraph {
    graph: DiGraph<Node, u64>,
    index_of: FxHashMap<Node, NodeIndex>,
    source: NodeIndex,
    sink: NodeIndex,
    num_gates: usize,
    criticality: Vec<u64>,
}

impl DependenceGraph {
    /// Build the dependence graph for `block`. `kernel` names the block for
    /// diagnostics.
    pub fn build(kernel: &str, block: &Block) -> SchedResult<Self> {
        for gate in &block.gates {
            if gate.cond_operands.len() != gate.condition.operand_count() {
                return Err(SchedError::ConditionArityMismatch {
                    kernel: kernel.to_string(),
                    name: gate.name.clone(),
                });
            }
        }

        let mut graph = DiGraph::new();
        let mut index_of = FxHashMap::default();

        let source = graph.add_node(Node::Source);
        let sink = graph.add_node(Node::Sink);
        index_of.insert(Node::Source, source);
        index_of.insert(Node::Sink, sink);

        let nodes: Vec<NodeIndex> = (0..block.gates.len())
            .map(|i| {
                let n = graph.add_node(Node::Gate(i));
                index_of.insert(Node::Gate(i), n);
                n
            })
            .collect();

        let durations: Vec<u64> = block.gates.iter().map(|g| g.duration_cycles).collect();

        let mut last_writer: FxHashMap<ResourceKey, NodeIndex> = FxHashMap::default();
        let mut readers_since_writer: FxHashMap<ResourceKey, Vec<NodeIndex>> =
            FxHashMap::default();

        for (i, gate) in block.gates.iter().enumerate() {
            let node = nodes[i];
            let (reads, writes) = operand_roles(gate);

            for key in &reads {
                if let Some(&writer) = last_writer.get(key) {
                    add_edge_from_gate(&mut graph, writer, node, &durations);
                }
                readers_since_writer.entry(*key).or_default().push(node);
            }
            for key in &writes {
                if let Some(&writer) = last_writer.get(key) {
                    add_edge_from_gate(&mut graph, writer, node, &durations);
                }
                if let Some(readers) = readers_since_writer.get(key) {
                    for &reader in readers {
                        if reader != node {
                            add_edge_from_gate(&mut graph, reader, node, &durations);
                        }
                    }
                }
                last_writer.insert(*key, node);
                readers_since_writer.insert(*key, Vec::new());
            }
        }

        let sourceless: Vec<NodeIndex> = nodes
            .iter()
            .copied()
            .filter(|&n| graph.edges_directed(n, Direction::Incoming).count() == 0)
            .collect();
        for n in sourceless {
            graph.add_edge(source, n, 0);
        }

        let sinkless: Vec<(NodeIndex, u64)> = nodes
            .iter()
            .copied()
            .filter(|&n| graph.edges_directed(n, Direction::Outgoing).count() == 0)
            .map(|n| (n, duration_of(&graph, n, &durations)))
            .collect();
        for (n, w) in sinkless {
            graph.add_edge(n, sink, w);
        }

        let criticality = compute_criticality(&graph, sink);

        Ok(Self {
            graph,
            index_of,
            source,
            sink,
            num_gates: block.gates.len(),
            criticality,
        })
    }

    /// Number of real gate nodes (excluding `SOURCE`/`SINK`).
    pub fn num_gates(&self) -> usize {
        self.num_gates
    }

    /// Direct successors of `node`, in ascending `NodeIndex` order (stable
    /// across calls, not meaningful beyond determinism).
    pub fn successors(&self, node: Node) -> Vec<Node> {
        self.neighbors(node, Direction::Outgoing)
    }

    /// Direct predecessors of `node`.
    pub fn predecessors(&self, node: Node) -> Vec<Node> {
        self.neighbors(node, Direction::Incoming)
    }

    fn neighbors(&self, node: Node, dir: Direction) -> Vec<Node> {
        let Some(&idx) = self.index_of.get(&node) else {
            return Vec::new();
        };
        let mut out: Vec<Node> = self
            .graph
            .neighbors_directed(idx, dir)
            .map(|n| self.graph[n])
            .collect();
        out.sort_by_key(node_order_key);
        out
    }

    /// Criticality (longest-path distance to `SINK`) for gate `i`.
    pub fn criticality(&self, gate: usize) -> u64 {
        self.criticality[gate]
    }
}

fn node_order_key(n: Node) -> (u8, usize) {
    match n {
        Node::Source => (0, 0),
        Node::Gate(i) => (1, i),
        Node::Sink => (2, 0),
    }
}

fn duration_of(graph: &DiGraph<Node, u64>, node: NodeIndex, durations: &[u64]) -> u64 {
    match graph[node] {
        Node::Gate(i) => durations[i],
        _ => 0,
    }
}

fn add_edge_from_gate(
    graph: &mut DiGraph<Node, u64>,
    from: NodeIndex,
    to: NodeIndex,
    durations: &[u64],
) {
    if graph.find_edge(from, to).is_some() {
        return;
    }
    let weight = duration_of(graph, from, durations);
    graph.add_edge(from, to, weight);
}

fn compute_criticality(graph: &DiGraph<Node, u64>, sink: NodeIndex) -> Vec<u64> {
    let order = toposort(graph, None).expect("dependence graph must be acyclic");
    let mut crit: FxHashMap<NodeIndex, u64> = FxHashMap::default();
    crit.insert(sink, 0);

    for &node in order.iter().rev() {
        if node == sink {
            continue;
        }
        let best = graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| *e.weight() + crit.get(&e.target()).copied().unwrap_or(0))
            .max()
            .unwrap_or(0);
        crit.insert(node, best);
    }

    let num_gates = graph
        .node_weights()
        .filter(|n| matches!(n, Node::Gate(_)))
        .count();
    let mut out = vec![0u64; num_gates];
    for (&idx, &weight) in &crit {
        if let Node::Gate(i) = graph[idx] {
            out[i] = weight;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use openql_ir::{BregId, ConditionKind, QubitId};

    fn chain_block() -> Block {
        let mut b = Block::new("k");
        let mut g0 = Gate::new("h", [QubitId(0)]);
        g0.duration_cycles = 1;
        let mut g1 = Gate::new("cnot", [QubitId(0), QubitId(1)]);
        g1.duration_cycles = 2;
        let mut g2 = Gate::new("x", [QubitId(1)]);
        g2.duration_cycles = 1;
        b.push(g0);
        b.push(g1);
        b.push(g2);
        b
    }

    #[test]
    fn test_raw_chain_through_shared_qubit() {
        let b = chain_block();
        let dag = DependenceGraph::build("k", &b).unwrap();
        assert_eq!(dag.predecessors(Node::Gate(1)), vec![Node::Gate(0)]);
        assert_eq!(dag.predecessors(Node::Gate(2)), vec![Node::Gate(1)]);
        assert_eq!(dag.successors(Node::Source), vec![Node::Gate(0)]);
        assert_eq!(dag.successors(Node::Gate(2)), vec![Node::Sink]);
    }

    #[test]
    fn test_criticality_decreases_toward_sink() {
        let b = chain_block();
        let dag = DependenceGraph::build("k", &b).unwrap();
        assert_eq!(dag.criticality(2), 1);
        assert_eq!(dag.criticality(1), 3);
        assert_eq!(dag.criticality(0), 4);
    }

    #[test]
    fn test_independent_gates_both_from_source() {
        let mut b = Block::new("k");
        b.push(Gate::new("h", [QubitId(0)]));
        b.push(Gate::new("h", [QubitId(1)]));
        let dag = DependenceGraph::build("k", &b).unwrap();
        let mut succ = dag.successors(Node::Source);
        succ.sort_by_key(node_order_key);
        assert_eq!(succ, vec![Node::Gate(0), Node::Gate(1)]);
    }

    #[test]
    fn test_condition_arity_mismatch_rejected() {
        let mut b = Block::new("k");
        let mut g = Gate::new("x", [QubitId(0)]);
        g.condition = ConditionKind::Unary;
        g.cond_operands = vec![BregId(0), BregId(1)];
        b.push(g);
        assert!(DependenceGraph::build("k", &b).is_err());
    }
}
