//! Router / mapper (C8): maps virtual qubits to physical qubits and inserts
//! swap/move hops to satisfy topology adjacency, block-local and in program
//! order.

use openql_ir::{Block, Gate, QubitId, SwapParams};
use openql_platform::{Platform, Topology};

use crate::config::{MapperKind, PathSelectMode, SchedulerConfig};
use crate::dependence::{DependenceGraph, Node};
use crate::error::{SchedError, SchedResult};
use crate::resources::ResourceManager;
use crate::scheduler::schedule_block;
use crate::v2r::{Liveness, V2R};

/// Route `block`, returning a new block with every gate's operands
/// physical and swap/move hops inserted where needed. Virtual allocation
/// (`V2R`) is scoped to this one block.
pub fn route_block(
    kernel: &str,
    block: &Block,
    platform: &Platform,
    config: &SchedulerConfig,
) -> SchedResult<Block> {
    let mut v2r = if config.init_one_to_one {
        V2R::one_to_one(platform.num_qubits, config.assume_zero_init_state)
    } else {
        V2R::new(platform.num_qubits, config.assume_zero_init_state)
    };
    // Local clone: `any_2q_placed` is routing-session state, not part of the
    // platform's immutable description.
    let mut topology = platform.topology.clone();
    let mut past: Vec<Gate> = Vec::new();
    // Router-local, resource-unaware ASAP cycle estimate per physical qubit.
    // Used only to break ties when `config.reverse_swap` picks a swap's
    // operand order; deliberately ignores instrument/channel contention, a
    // short-cut mirrored from the mapper this router is grounded on.
    let mut free_cycle: Vec<u64> = vec![0; platform.num_qubits as usize];

    for gate in &block.gates {
        route_one_gate(
            kernel,
            gate,
            platform,
            &mut topology,
            &mut v2r,
            &mut past,
            &mut free_cycle,
            config,
        )?;
    }

    let mut routed = Block::with_kind(block.name.clone(), block.kind);
    routed.gates = past;
    Ok(routed)
}

#[allow(clippy::too_many_arguments)]
fn route_one_gate(
    kernel: &str,
    gate: &Gate,
    platform: &Platform,
    topology: &mut Topology,
    v2r: &mut V2R,
    past: &mut Vec<Gate>,
    free_cycle: &mut [u64],
    config: &SchedulerConfig,
) -> SchedResult<()> {
    let mapped: Vec<QubitId> = gate
        .operands
        .iter()
        .map(|&v| v2r.alloc(v))
        .collect::<SchedResult<Vec<_>>>()?;

    if mapped.len() <= 1 || (mapped.len() == 2 && topology.is_adjacent_ids(mapped[0], mapped[1])) {
        if mapped.len() == 2 {
            topology.mark_2q_placed();
        }
        let finalized = finalize_gate(kernel, platform, gate, mapped.clone())?;
        advance_liveness(v2r, gate, &mapped);
        bump_free_cycle(free_cycle, &finalized);
        past.push(finalized);
        return Ok(());
    }

    let (rs, rt) = (mapped[0], mapped[1]);
    let alternative = best_alternative(kernel, gate, rs, rt, platform, topology, v2r, past, config)?;

    let mut applied_v2r = v2r.clone();
    let mut chain_gates = Vec::new();
    for &(src, dst) in &alternative.hops {
        let gates = apply_hop(kernel, platform, config, &mut applied_v2r, src, dst, free_cycle)?;
        for g in &gates {
            bump_free_cycle(free_cycle, g);
        }
        chain_gates.extend(gates);
    }
    *v2r = applied_v2r;
    past.extend(chain_gates);

    let mapped_final: Vec<QubitId> = gate
        .operands
        .iter()
        .map(|&v| v2r.alloc(v))
        .collect::<SchedResult<Vec<_>>>()?;
    topology.mark_2q_placed();
    let finalized = finalize_gate(kernel, platform, gate, mapped_final.clone())?;
    advance_liveness(v2r, gate, &mapped_final);
    bump_free_cycle(free_cycle, &finalized);
    past.push(finalized);
    Ok(())
}

/// Advance the router-local free-cycle estimate for every qubit `gate`
/// touches, as if it ran at the earliest cycle its operands allow. Ignores
/// resource contention entirely; only used to seed the `reverse_swap`
/// tie-break, never the committed schedule.
fn bump_free_cycle(free_cycle: &mut [u64], gate: &Gate) {
    let start = gate
        .operands
        .iter()
        .map(|q| free_cycle[q.0 as usize])
        .max()
        .unwrap_or(0);
    for q in &gate.operands {
        free_cycle[q.0 as usize] = start + gate.duration_cycles.max(1);
    }
}

/// Advance each touched physical qubit's liveness by one step of
/// `no_state -> was_inited -> has_state`, or force it straight to
/// `was_inited` for an explicit reset (`prepz`). Checked against the
/// gate's pre-decomposition name, since a decomposed reset should still
/// count as one.
fn advance_liveness(v2r: &mut V2R, gate: &Gate, physical: &[QubitId]) {
    let is_reset = gate.name == "prepz";
    for &r in physical {
        if is_reset {
            v2r.set_state(r, Liveness::WasInited);
            continue;
        }
        let next = match v2r.liveness(r) {
            Liveness::NoState => Liveness::WasInited,
            Liveness::WasInited | Liveness::HasState => Liveness::HasState,
        };
        v2r.set_state(r, next);
    }
}

/// Schedule `past` from scratch with a fresh resource manager, producing a
/// manager whose committed reservations reflect `past`'s real (resource-
/// constrained) cycles. Used as the starting snapshot for an alternative's
/// local pre-schedule under the `*Rc` mapper variants.
fn resources_after(
    kernel: &str,
    platform: &Platform,
    past: &[Gate],
    config: &SchedulerConfig,
) -> SchedResult<ResourceManager> {
    let mut resources = ResourceManager::from_platform(platform);
    if past.is_empty() {
        return Ok(resources);
    }
    let mut block = Block::new(kernel);
    block.gates = past.to_vec();
    schedule_block(kernel, &block, platform, &mut resources, config)?;
    Ok(resources)
}

struct Alternative {
    hops: Vec<(QubitId, QubitId)>,
    score: u64,
    crit_successors: u64,
    angle_rank: usize,
}

#[allow(clippy::too_many_arguments)]
fn best_alternative(
    kernel: &str,
    gate: &Gate,
    rs: QubitId,
    rt: QubitId,
    platform: &Platform,
    topology: &Topology,
    v2r: &V2R,
    past: &[Gate],
    config: &SchedulerConfig,
) -> SchedResult<Alternative> {
    let paths = topology.shortest_paths(rs.0, rt.0);
    let mut candidates = Vec::new();

    for path in &paths {
        let splits = valid_splits(topology, path, config.path_select);
        for split in splits {
            let hops = hops_for_split(path, split);
            candidates.push((path.clone(), split, hops));
        }
    }

    if candidates.is_empty() {
        return Err(SchedError::RoutingFailed {
            kernel: kernel.to_string(),
            q1: rs.0,
            q2: rt.0,
        });
    }

    let resource_constrained_baseline = if matches!(config.mapper, MapperKind::BaseRc) {
        Some(resources_after(kernel, platform, past, config)?)
    } else {
        None
    };

    let mut alternatives = Vec::with_capacity(candidates.len());
    for (path, split, hops) in &candidates {
        let score = score_alternative(
            kernel,
            gate,
            hops,
            platform,
            v2r,
            past,
            resource_constrained_baseline.as_ref(),
            config,
        )?;
        let crit_successors = critical_successor_weight(kernel, gate, hops, platform, v2r)?;
        let angle_rank = angle_rank_of(topology, rs, path, *split);
        alternatives.push(Alternative {
            hops: hops.clone(),
            score,
            crit_successors,
            angle_rank,
        });
    }

    alternatives.sort_by(|a, b| {
        a.score
            .cmp(&b.score)
            .then(b.crit_successors.cmp(&a.crit_successors))
            .then(a.angle_rank.cmp(&b.angle_rank))
    });

    Ok(alternatives.into_iter().next().expect("non-empty"))
}

fn valid_splits(topology: &Topology, path: &[u32], mode: PathSelectMode) -> Vec<usize> {
    let hop_is_intra_core =
        |i: usize| topology.core_of(path[i]) == topology.core_of(path[i + 1]);
    let all: Vec<usize> = (0..path.len().saturating_sub(1))
        .filter(|&i| hop_is_intra_core(i))
        .collect();
    match mode {
        PathSelectMode::All => all,
        PathSelectMode::Borders => {
            let mut borders = Vec::new();
            if let Some(&first) = all.first() {
                borders.push(first);
            }
            if let Some(&last) = all.last() {
                if !borders.contains(&last) {
                    borders.push(last);
                }
            }
            borders
        }
    }
}

/// The ordered sequence of physical-qubit hops (source, destination) that
/// carry `rs` and `rt` toward `split`, `rs`-side first then `rt`-side.
fn hops_for_split(path: &[u32], split: usize) -> Vec<(QubitId, QubitId)> {
    let mut hops = Vec::new();
    for k in 0..split {
        hops.push((QubitId(path[k]), QubitId(path[k + 1])));
    }
    for k in (split + 2..path.len()).rev() {
        hops.push((QubitId(path[k]), QubitId(path[k - 1])));
    }
    hops
}

fn angle_rank_of(topology: &Topology, rs: QubitId, path: &[u32], split: usize) -> usize {
    if path.len() < 2 {
        return 0;
    }
    let first_hop_target = path[1];
    topology
        .neighbors_by_angle(rs.0)
        .iter()
        .position(|&n| n == first_hop_target)
        .unwrap_or(usize::MAX)
        + split
}

/// Score one alternative by locally pre-scheduling it.
///
/// `resource_constrained_baseline` is `Some` only under [`MapperKind::BaseRc`]
/// and already reflects `past`'s true resource reservations, so only the
/// chain and the finalized gate need scheduling on top of it. Every other
/// variant schedules from a fresh resource manager: [`MapperKind::MinExtendRc`]
/// includes the whole of `past` in the gates being scheduled, so rescheduling
/// it from scratch reproduces the same resource-constrained result without
/// needing a separate baseline.
#[allow(clippy::too_many_arguments)]
fn score_alternative(
    kernel: &str,
    gate: &Gate,
    hops: &[(QubitId, QubitId)],
    platform: &Platform,
    v2r: &V2R,
    past: &[Gate],
    resource_constrained_baseline: Option<&ResourceManager>,
    config: &SchedulerConfig,
) -> SchedResult<u64> {
    let mut scratch_v2r = v2r.clone();
    // Operand order never affects the local pre-schedule's length (the
    // scheduler treats a gate's qubit operands symmetrically), so scoring
    // doesn't need the router's live free-cycle estimate here.
    let no_reversal = vec![0u64; platform.num_qubits as usize];
    let mut chain = Vec::new();
    for &(src, dst) in hops {
        chain.extend(apply_hop(kernel, platform, config, &mut scratch_v2r, src, dst, &no_reversal)?);
    }
    let mapped: Vec<QubitId> = gate
        .operands
        .iter()
        .map(|&v| scratch_v2r.alloc(v))
        .collect::<SchedResult<Vec<_>>>()?;
    let finalized = finalize_gate(kernel, platform, gate, mapped)?;

    let use_whole_past = matches!(config.mapper, MapperKind::MinExtend | MapperKind::MinExtendRc);

    let mut gates: Vec<Gate> = if use_whole_past { past.to_vec() } else { Vec::new() };
    gates.extend(chain);
    gates.push(finalized);

    let mut block = Block::new(kernel);
    block.gates = gates;

    let mut scoring_resources = match resource_constrained_baseline {
        Some(baseline) => baseline.clone(),
        None => ResourceManager::from_platform(platform),
    };

    let out = schedule_block(kernel, &block, platform, &mut scoring_resources, config)?;
    Ok(out.length)
}

fn critical_successor_weight(
    kernel: &str,
    gate: &Gate,
    hops: &[(QubitId, QubitId)],
    platform: &Platform,
    v2r: &V2R,
) -> SchedResult<u64> {
    let mut scratch_v2r = v2r.clone();
    let no_reversal = vec![0u64; platform.num_qubits as usize];
    let mut chain = Vec::new();
    for &(src, dst) in hops {
        chain.extend(apply_hop(
            kernel,
            platform,
            &SchedulerConfig::default(),
            &mut scratch_v2r,
            src,
            dst,
            &no_reversal,
        )?);
    }
    let mapped: Vec<QubitId> = gate
        .operands
        .iter()
        .map(|&v| scratch_v2r.alloc(v))
        .collect::<SchedResult<Vec<_>>>()?;
    let finalized = finalize_gate(kernel, platform, gate, mapped)?;

    let mut block = Block::new(kernel);
    let gate_index = chain.len();
    block.gates = chain;
    block.gates.push(finalized);

    let dag = DependenceGraph::build(kernel, &block)?;
    Ok(dag
        .successors(Node::Gate(gate_index))
        .into_iter()
        .filter_map(|n| match n {
            Node::Gate(i) => Some(dag.criticality(i)),
            _ => None,
        })
        .sum())
}

/// Apply one hop (swap or move) to `v2r`, returning the inserted gate(s)
/// (a lone `prepz` plus a `move`, or a single `swap`).
fn apply_hop(
    kernel: &str,
    platform: &Platform,
    config: &SchedulerConfig,
    v2r: &mut V2R,
    src: QubitId,
    dst: QubitId,
    free_cycle: &[u64],
) -> SchedResult<Vec<Gate>> {
    let v0 = v2r.get_virt(src).unwrap_or(src);
    let v1 = v2r.get_virt(dst).unwrap_or(dst);

    let dst_liveness = v2r.liveness(dst);
    let can_move = config.use_moves && !matches!(dst_liveness, Liveness::HasState);

    if can_move {
        let mut gates = Vec::new();
        if matches!(dst_liveness, Liveness::NoState) {
            let prepz = make_single_qubit_gate(kernel, platform, "prepz", dst)?;
            if prepz.duration_cycles <= config.move_init_threshold_cycles {
                gates.push(prepz);
            } else {
                let (r0, r1, w0, w1) = reverse_swap_operands(config, free_cycle, src, dst, v0, v1);
                gates.push(make_hop_gate(kernel, platform, "swap", r0, r1, w0, w1)?);
                v2r.swap(src, dst);
                return Ok(gates);
            }
        }
        gates.push(make_hop_gate(kernel, platform, "move", src, dst, v0, v1)?);
        v2r.swap(src, dst);
        v2r.set_state(src, Liveness::NoState);
        Ok(gates)
    } else {
        let (r0, r1, w0, w1) = reverse_swap_operands(config, free_cycle, src, dst, v0, v1);
        let gate = make_hop_gate(kernel, platform, "swap", r0, r1, w0, w1)?;
        v2r.swap(src, dst);
        Ok(vec![gate])
    }
}

/// A swap is functionally symmetric but its two operand slots are not
/// equally free: reorder so the later-free physical qubit lands in slot 0,
/// where the scheduler's list-scheduling tie-break (earliest-start-first)
/// gives it the best chance of starting a cycle sooner. A `move`'s operands
/// are never reordered since source and destination are not interchangeable.
fn reverse_swap_operands(
    config: &SchedulerConfig,
    free_cycle: &[u64],
    src: QubitId,
    dst: QubitId,
    v0: QubitId,
    v1: QubitId,
) -> (QubitId, QubitId, QubitId, QubitId) {
    if config.reverse_swap && free_cycle[src.0 as usize] < free_cycle[dst.0 as usize] {
        (dst, src, v1, v0)
    } else {
        (src, dst, v0, v1)
    }
}

fn make_hop_gate(
    kernel: &str,
    platform: &Platform,
    catalogue_name: &str,
    r0: QubitId,
    r1: QubitId,
    v0: QubitId,
    v1: QubitId,
) -> SchedResult<Gate> {
    let resolved = platform
        .catalogue
        .resolve_decomposition(catalogue_name)
        .ok_or_else(|| SchedError::CatalogueMiss {
            kernel: kernel.to_string(),
            name: catalogue_name.to_string(),
        })?
        .into_owned();
    let entry = platform.catalogue.get(&resolved).ok_or_else(|| SchedError::CatalogueMiss {
        kernel: kernel.to_string(),
        name: resolved.clone(),
    })?;
    let duration_cycles = entry.duration_cycles(platform.cycle_time_ns);
    let mut gate = Gate::new(resolved, [r0, r1]);
    gate.duration_ns = entry.duration_ns;
    gate.duration_cycles = duration_cycles;
    gate.swap_params = Some(SwapParams { r0, r1, v0, v1 });
    Ok(gate)
}

fn make_single_qubit_gate(
    kernel: &str,
    platform: &Platform,
    catalogue_name: &str,
    q: QubitId,
) -> SchedResult<Gate> {
    let resolved = platform
        .catalogue
        .resolve_decomposition(catalogue_name)
        .ok_or_else(|| SchedError::CatalogueMiss {
            kernel: kernel.to_string(),
            name: catalogue_name.to_string(),
        })?
        .into_owned();
    let entry = platform.catalogue.get(&resolved).ok_or_else(|| SchedError::CatalogueMiss {
        kernel: kernel.to_string(),
        name: resolved.clone(),
    })?;
    let duration_cycles = entry.duration_cycles(platform.cycle_time_ns);
    let mut gate = Gate::new(resolved, [q]);
    gate.duration_ns = entry.duration_ns;
    gate.duration_cycles = duration_cycles;
    Ok(gate)
}

fn finalize_gate(
    kernel: &str,
    platform: &Platform,
    gate: &Gate,
    mapped_operands: Vec<QubitId>,
) -> SchedResult<Gate> {
    let resolved = platform
        .catalogue
        .resolve_decomposition(&gate.name)
        .ok_or_else(|| SchedError::CatalogueMiss {
            kernel: kernel.to_string(),
            name: gate.name.clone(),
        })?
        .into_owned();
    let entry = platform.catalogue.get(&resolved).ok_or_else(|| SchedError::CatalogueMiss {
        kernel: kernel.to_string(),
        name: resolved.clone(),
    })?;
    let mut out = gate.clone();
    out.name = resolved;
    out.operands = mapped_operands;
    out.duration_ns = entry.duration_ns;
    out.duration_cycles = entry.duration_cycles(platform.cycle_time_ns);
    out.cycle = openql_ir::UNDEFINED_CYCLE;
    out.swap_params = None;
    Ok(out)
}
