//! Resource-constrained list scheduler (C6): assigns a cycle to every gate
//! in a block, subject to the dependence graph (C5) and the resource
//! manager (C4).

use openql_ir::Block;
use openql_platform::Platform;

use crate::config::{ScheduleMode, SchedulerConfig};
use crate::dependence::{DependenceGraph, Node};
use crate::error::{SchedError, SchedResult};
use crate::resources::ResourceManager;

/// Result of scheduling one block: absolute forward cycles per gate
/// (program-order-indexed) and the resulting block length.
#[derive(Debug, Clone)]
pub struct ScheduleOutput {
    /// `cycles[i]` is the assigned cycle for `block.gates[i]`.
    pub cycles: Vec<u64>,
    /// Block length in cycles: `max(cycle + duration_cycles)`.
    pub length: u64,
}

/// Schedule `block` against `resources`, mutating `resources` with every
/// gate's committed reservation. Does not write cycles back onto the
/// block's gates; callers (the program driver, or the router's local
/// pre-scheduling) decide what to do with the result.
pub fn schedule_block(
    kernel: &str,
    block: &Block,
    platform: &Platform,
    resources: &mut ResourceManager,
    config: &SchedulerConfig,
) -> SchedResult<ScheduleOutput> {
    let dag = DependenceGraph::build(kernel, block)?;
    let forward = matches!(config.mode, ScheduleMode::Asap);
    run(kernel, block, &dag, platform, resources, config, forward)
}

fn downstream_of(dag: &DependenceGraph, i: usize, forward: bool) -> Vec<usize> {
    let neighbours = if forward {
        dag.successors(Node::Gate(i))
    } else {
        dag.predecessors(Node::Gate(i))
    };
    neighbours
        .into_iter()
        .filter_map(|n| match n {
            Node::Gate(j) => Some(j),
            _ => None,
        })
        .collect()
}

fn upstream_count(dag: &DependenceGraph, i: usize, forward: bool) -> usize {
    let neighbours = if forward {
        dag.predecessors(Node::Gate(i))
    } else {
        dag.successors(Node::Gate(i))
    };
    neighbours
        .into_iter()
        .filter(|n| matches!(n, Node::Gate(_)))
        .count()
}

#[allow(clippy::too_many_arguments)]
fn run(
    kernel: &str,
    block: &Block,
    dag: &DependenceGraph,
    platform: &Platform,
    resources: &mut ResourceManager,
    config: &SchedulerConfig,
    forward: bool,
) -> SchedResult<ScheduleOutput> {
    let n = block.gates.len();
    let mut remaining: Vec<usize> = (0..n).map(|i| upstream_count(dag, i, forward)).collect();
    let mut ready: Vec<usize> = (0..n).filter(|&i| remaining[i] == 0).collect();
    let mut scheduled = vec![false; n];
    let mut t = vec![0u64; n];

    let mut free_cycle_qubit = vec![0u64; platform.num_qubits as usize];
    let mut free_cycle_breg = vec![0u64; platform.breg_count as usize];

    let mut done = 0usize;
    while done < n {
        if ready.is_empty() {
            return Err(SchedError::UnreadyPredecessor {
                kernel: kernel.to_string(),
                name: block.name.clone(),
            });
        }

        let mut candidate_cycle = Vec::with_capacity(ready.len());
        for &i in &ready {
            let gate = &block.gates[i];
            let earliest = earliest_without_resources(gate, &free_cycle_qubit, &free_cycle_breg);
            let mut cycle = earliest;
            loop {
                if cycle > config.max_cycle {
                    return Err(SchedError::ResourceUnsatisfiable {
                        kernel: kernel.to_string(),
                        name: gate.name.clone(),
                        max_cycle: config.max_cycle,
                    });
                }
                if resources.try_reserve(cycle, gate, platform) {
                    break;
                }
                cycle += 1;
            }
            candidate_cycle.push(cycle);
        }

        let (best_pos, &best_i) = ready
            .iter()
            .enumerate()
            .min_by_key(|&(pos, &i)| {
                let cycle = candidate_cycle[pos];
                let criticality = dag.criticality(i);
                (cycle, std::cmp::Reverse(criticality), i)
            })
            .expect("ready is non-empty");

        let chosen_cycle = candidate_cycle[best_pos];
        let gate = &block.gates[best_i];
        resources.commit(chosen_cycle, gate, platform, config.mode);
        t[best_i] = chosen_cycle;
        scheduled[best_i] = true;

        for q in &gate.operands {
            free_cycle_qubit[q.0 as usize] = chosen_cycle + gate.duration_cycles;
        }
        for b in &gate.breg_operands {
            free_cycle_breg[b.0 as usize] = chosen_cycle + gate.duration_cycles;
        }

        ready.swap_remove(best_pos);
        done += 1;

        for j in downstream_of(dag, best_i, forward) {
            remaining[j] -= 1;
            if remaining[j] == 0 && !scheduled[j] {
                ready.push(j);
            }
        }
    }

    let length = (0..n)
        .map(|i| t[i] + block.gates[i].duration_cycles)
        .max()
        .unwrap_or(0);

    let cycles = if forward {
        t
    } else {
        (0..n)
            .map(|i| length - t[i] - block.gates[i].duration_cycles)
            .collect()
    };

    Ok(ScheduleOutput { cycles, length })
}

fn earliest_without_resources(
    gate: &openql_ir::Gate,
    free_cycle_qubit: &[u64],
    free_cycle_breg: &[u64],
) -> u64 {
    let qubit_bound = gate
        .operands
        .iter()
        .map(|q| free_cycle_qubit[q.0 as usize])
        .max()
        .unwrap_or(0);
    let breg_bound = gate
        .breg_operands
        .iter()
        .chain(&gate.cond_operands)
        .map(|b| free_cycle_breg[b.0 as usize])
        .max()
        .unwrap_or(0);
    qubit_bound.max(breg_bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openql_ir::{Gate, QubitId};
    use openql_platform::{Catalogue, InstructionEntry, Topology};
    use rustc_hash::FxHashMap as Map;

    fn platform() -> Platform {
        let mut catalogue = Catalogue::new();
        for name in ["h", "cnot"] {
            catalogue.insert(
                name,
                InstructionEntry {
                    duration_ns: 20,
                    type_tag: "any".to_string(),
                    attributes: Map::default(),
                },
            );
        }
        Platform {
            name: "t".into(),
            num_qubits: 3,
            cycle_time_ns: 20,
            num_cores: 1,
            num_comm_qubits_per_core: 0,
            creg_count: 0,
            breg_count: 0,
            catalogue,
            topology: Topology::full(3),
            resources: Vec::new(),
        }
    }

    fn gate(name: &str, ops: &[u32]) -> Gate {
        let mut g = Gate::new(name, ops.iter().map(|&i| QubitId(i)));
        g.duration_cycles = 1;
        g
    }

    #[test]
    fn test_independent_gates_schedule_in_parallel() {
        let p = platform();
        let mut block = Block::new("k");
        block.push(gate("h", &[0]));
        block.push(gate("h", &[1]));
        let mut mgr = ResourceManager::from_platform(&p);
        let out = schedule_block("k", &block, &p, &mut mgr, &SchedulerConfig::default()).unwrap();
        assert_eq!(out.cycles, vec![0, 0]);
        assert_eq!(out.length, 1);
    }

    #[test]
    fn test_chain_respects_raw_order() {
        let p = platform();
        let mut block = Block::new("k");
        block.push(gate("h", &[0]));
        block.push(gate("cnot", &[0, 1]));
        let mut mgr = ResourceManager::from_platform(&p);
        let out = schedule_block("k", &block, &p, &mut mgr, &SchedulerConfig::default()).unwrap();
        assert!(out.cycles[1] >= out.cycles[0] + block.gates[0].duration_cycles);
    }

    #[test]
    fn test_shared_condition_breg_read_does_not_serialize() {
        let mut p = platform();
        p.breg_count = 1;
        let mut block = Block::new("k");
        let mut g0 = gate("h", &[0]);
        g0.cond_operands = vec![openql_ir::BregId(0)];
        let mut g1 = gate("h", &[1]);
        g1.cond_operands = vec![openql_ir::BregId(0)];
        block.push(g0);
        block.push(g1);
        let mut mgr = ResourceManager::from_platform(&p);
        let out = schedule_block("k", &block, &p, &mut mgr, &SchedulerConfig::default()).unwrap();
        assert_eq!(out.cycles, vec![0, 0]);
    }

    #[test]
    fn test_alap_ends_at_block_length() {
        let p = platform();
        let mut block = Block::new("k");
        block.push(gate("h", &[0]));
        let mut mgr = ResourceManager::from_platform(&p);
        let cfg = SchedulerConfig::default().with_mode(ScheduleMode::Alap);
        let out = schedule_block("k", &block, &p, &mut mgr, &cfg).unwrap();
        assert_eq!(out.cycles[0] + block.gates[0].duration_cycles, out.length);
    }
}
