//! End-to-end seed scenarios exercising the router and scheduler together
//! through the program driver.

use rustc_hash::FxHashMap as Map;
use serde_json::Value;

use openql_ir::{Block, Gate, QubitId};
use openql_platform::{
    Catalogue, FunctionSpec, InstructionEntry, InstrumentBinding, Platform, Predicate,
    ResourceConfig, Topology,
};
use openql_sched::{compile_block, SchedulerConfig};

fn catalogue(entries: &[(&str, u64, &str)]) -> Catalogue {
    let mut cat = Catalogue::new();
    for &(name, duration_ns, type_tag) in entries {
        cat.insert(
            name,
            InstructionEntry {
                duration_ns,
                type_tag: type_tag.to_string(),
                attributes: Map::default(),
            },
        );
    }
    cat
}

fn line_platform(n: u32, catalogue: Catalogue, resources: Vec<ResourceConfig>) -> Platform {
    let edges = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
    Platform {
        name: "seed".into(),
        num_qubits: n,
        cycle_time_ns: 20,
        num_cores: 1,
        num_comm_qubits_per_core: 0,
        creg_count: 0,
        breg_count: 0,
        catalogue,
        topology: Topology::new(n, edges, None, vec![0; n as usize]).unwrap(),
        resources,
    }
}

// 1. Trivial identity route: an already-adjacent 2q gate passes through
// unmodified, scheduled with no swaps.
#[test]
fn test_trivial_identity_route() {
    let p = line_platform(2, catalogue(&[("cnot", 40, "flux")]), Vec::new());
    let mut block = Block::new("k");
    block.push(Gate::new("cnot", [QubitId(0), QubitId(1)]));

    let cfg = SchedulerConfig::default().with_init_one_to_one(true);
    compile_block(&mut block, &p, &cfg).unwrap();

    assert_eq!(block.gates.len(), 1);
    assert_eq!(block.gates[0].operands, vec![QubitId(0), QubitId(1)]);
    assert_eq!(block.gates[0].cycle, 0);
    assert!(!block.gates[0].is_swap_like());
}

// 2. One swap: a distant 2q gate on a 3-qubit line pulls in exactly one
// hop and ends adjacent to its partner.
#[test]
fn test_one_swap_inserted_for_distant_gate() {
    let p = line_platform(
        3,
        catalogue(&[("cnot", 40, "flux"), ("swap", 60, "flux")]),
        Vec::new(),
    );
    let mut block = Block::new("k");
    block.push(Gate::new("cnot", [QubitId(0), QubitId(2)]));

    let cfg = SchedulerConfig::default().with_init_one_to_one(true);
    compile_block(&mut block, &p, &cfg).unwrap();

    let swaps = block.gates.iter().filter(|g| g.is_swap_like()).count();
    assert_eq!(swaps, 1);
    let last = block.gates.last().unwrap();
    assert!(p.topology.is_adjacent_ids(last.operands[0], last.operands[1]));
}

// 3. Move instead of swap: with moves enabled and the destination freshly
// `prepz`-ed, the router prefers a 2-cycle move over a 3-cycle swap.
#[test]
fn test_move_preferred_over_swap_onto_fresh_qubit() {
    let p = line_platform(
        3,
        catalogue(&[
            ("cnot", 40, "flux"),
            ("swap", 60, "flux"),
            ("move", 40, "flux"),
            ("prepz", 20, "mw"),
        ]),
        Vec::new(),
    );
    let mut block = Block::new("k");
    block.push(Gate::new("prepz", [QubitId(2)]));
    block.push(Gate::new("cnot", [QubitId(0), QubitId(2)]));

    let cfg = SchedulerConfig::default()
        .with_use_moves(true)
        .with_init_one_to_one(true);
    compile_block(&mut block, &p, &cfg).unwrap();

    assert!(block.gates.iter().any(|g| g.name == "move"));
    assert!(!block.gates.iter().any(|g| g.name == "swap"));
}

// 4. Instrument contention: two gates sharing an instrument serialize when
// their functions differ, but run in parallel when they share one.
#[test]
fn test_instrument_contention_by_function() {
    let mut cat = catalogue(&[]);
    for (name, func) in [("h", "x90"), ("x", "x180")] {
        let mut attrs = Map::default();
        attrs.insert("fn".to_string(), Value::String(func.to_string()));
        cat.insert(
            name,
            InstructionEntry {
                duration_ns: 20,
                type_tag: "mw".to_string(),
                attributes: attrs,
            },
        );
    }
    let mut type_fields = Map::default();
    type_fields.insert("type".to_string(), vec![Value::String("mw".into())]);
    let qwg = ResourceConfig::Instrument {
        name: "qwg".into(),
        predicate: Predicate { fields: type_fields },
        function: FunctionSpec::Keys(vec!["fn".into()]),
        allow_overlap: false,
        instruments: vec![InstrumentBinding {
            name: "QWG0".into(),
            qubits: vec![0, 1],
            edges: Vec::new(),
        }],
    };

    let p = line_platform(2, cat, vec![qwg]);

    let mut same_function = Block::new("k");
    same_function.push(Gate::new("h", [QubitId(0)]));
    same_function.push(Gate::new("h", [QubitId(1)]));
    compile_block(&mut same_function, &p, &SchedulerConfig::default()).unwrap();
    assert_eq!(same_function.gates[0].cycle, same_function.gates[1].cycle);

    let mut different_function = Block::new("k");
    different_function.push(Gate::new("h", [QubitId(0)]));
    different_function.push(Gate::new("x", [QubitId(1)]));
    compile_block(&mut different_function, &p, &SchedulerConfig::default()).unwrap();
    assert_ne!(different_function.gates[0].cycle, different_function.gates[1].cycle);
}

// 5. Inter-core channel saturation: three back-to-back inter-core gates on
// a single-channel-per-core platform serialize one after another.
#[test]
fn test_inter_core_channel_saturation() {
    let mut cat = catalogue(&[]);
    cat.insert(
        "tcnot",
        InstructionEntry {
            duration_ns: 100,
            type_tag: "inter_core".to_string(),
            attributes: Map::default(),
        },
    );
    let channel = ResourceConfig::InterCoreChannel {
        name: "xbar".into(),
        predicate: Predicate::default(),
        num_channels: 1,
        inter_core_required: true,
        communication_qubit_only: false,
    };
    let topology = Topology::new(4, vec![(0, 1), (1, 2), (2, 3)], None, vec![0, 0, 1, 1]).unwrap();
    let p = Platform {
        name: "seed".into(),
        num_qubits: 4,
        cycle_time_ns: 5,
        num_cores: 2,
        num_comm_qubits_per_core: 1,
        creg_count: 0,
        breg_count: 0,
        catalogue: cat,
        topology,
        resources: vec![channel],
    };

    let mut block = Block::new("k");
    // Three inter-core gates between core 0's qubit 1 and core 1's qubit 2,
    // which are already topology-adjacent: the router never gets involved,
    // only the scheduler's channel contention.
    for _ in 0..3 {
        block.push(Gate::new("tcnot", [QubitId(1), QubitId(2)]));
    }

    let cfg = SchedulerConfig::default().with_init_one_to_one(true);
    compile_block(&mut block, &p, &cfg).unwrap();

    let mut cycles: Vec<u64> = block.gates.iter().map(|g| g.cycle).collect();
    cycles.sort_unstable();
    assert_eq!(cycles, vec![0, 20, 40]);
}

// 6. Criticality tie-break: on a line of 4 qubits, two independent 2q gates
// contend for the same exclusive instrument and become ready at the same
// cycle; the one feeding a longer downstream chain is scheduled first.
#[test]
fn test_criticality_tie_break_prefers_longer_chain() {
    let mut cat = catalogue(&[("cnot", 40, "flux")]);
    let exclusive = ResourceConfig::Instrument {
        name: "shared".into(),
        predicate: Predicate::default(),
        function: FunctionSpec::Exclusive,
        allow_overlap: false,
        instruments: vec![InstrumentBinding {
            name: "SHARED0".into(),
            qubits: vec![0, 1, 2, 3],
            edges: Vec::new(),
        }],
    };
    let p = line_platform(4, cat, vec![exclusive]);

    let mut block = Block::new("k");
    // Independent pair, both ready at cycle 0, but serialized by the shared
    // exclusive instrument.
    block.push(Gate::new("cnot", [QubitId(0), QubitId(1)])); // feeds a long chain
    block.push(Gate::new("cnot", [QubitId(2), QubitId(3)])); // feeds nothing further
    // Long chain hanging off the first gate's qubits.
    block.push(Gate::new("cnot", [QubitId(1), QubitId(0)]));
    block.push(Gate::new("cnot", [QubitId(0), QubitId(1)]));

    let cfg = SchedulerConfig::default().with_init_one_to_one(true);
    compile_block(&mut block, &p, &cfg).unwrap();

    assert!(block.gates[0].cycle < block.gates[1].cycle);
}
