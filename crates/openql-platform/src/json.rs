//! Platform JSON loading: deserializes the external configuration format
//! (spec §6) into a validated [`Platform`].

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::catalogue::{Catalogue, InstructionEntry};
use crate::error::{PlatformError, PlatformResult};
use crate::platform::Platform;
use crate::resource_config::ResourceConfig;
use crate::topology::Topology;

#[derive(Debug, Deserialize)]
struct InstructionJson {
    duration: u64,
    #[serde(rename = "type")]
    type_tag: String,
    #[serde(flatten)]
    attributes: FxHashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct QubitCoordJson {
    id: u32,
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct EdgeJson {
    src: u32,
    dst: u32,
}

#[derive(Debug, Default, Deserialize)]
struct TopologyJson {
    #[serde(default)]
    qubits: Vec<QubitCoordJson>,
    #[serde(default)]
    edges: Vec<EdgeJson>,
    connectivity: Option<String>,
    #[serde(default = "default_one")]
    number_of_cores: u32,
    #[serde(default)]
    comm_qubits_per_core: u32,
}

fn default_one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct PlatformJson {
    #[serde(alias = "name", default = "default_name")]
    name: String,
    qubit_number: i64,
    cycle_time: i64,
    #[serde(default)]
    creg_count: u32,
    #[serde(default)]
    breg_count: u32,
    #[serde(default)]
    instructions: FxHashMap<String, InstructionJson>,
    #[serde(default)]
    topology: TopologyJson,
    #[serde(default)]
    resources: Vec<ResourceConfig>,
}

fn default_name() -> String {
    "platform".to_string()
}

/// Parse and validate a platform description from a JSON string.
///
/// Any top-level key not named above is ignored, per spec ("any
/// unrecognized key is ignored by the core"); any missing mandatory key
/// aborts loading with [`PlatformError::MissingField`] (surfaced by serde's
/// own missing-field error, wrapped as [`PlatformError::Json`]).
#[instrument(skip(json), fields(bytes = json.len()))]
pub fn load_platform(json: &str) -> PlatformResult<Platform> {
    let raw: PlatformJson = serde_json::from_str(json)?;

    if raw.qubit_number <= 0 {
        return Err(PlatformError::NotPositive {
            field: "qubit_number",
            value: raw.qubit_number,
        });
    }
    if raw.cycle_time <= 0 {
        return Err(PlatformError::NotPositive {
            field: "cycle_time",
            value: raw.cycle_time,
        });
    }
    let num_qubits = raw.qubit_number as u32;

    let mut catalogue = Catalogue::new();
    for (name, entry) in raw.instructions {
        catalogue.insert(
            name,
            InstructionEntry {
                duration_ns: entry.duration,
                type_tag: entry.type_tag,
                attributes: entry.attributes,
            },
        );
    }
    debug!(instructions = catalogue.len(), "loaded instruction catalogue");

    let edges = if raw.topology.connectivity.as_deref() == Some("full") {
        let mut e = Vec::new();
        for i in 0..num_qubits {
            for j in (i + 1)..num_qubits {
                e.push((i, j));
            }
        }
        e
    } else {
        raw.topology
            .edges
            .iter()
            .map(|e| (e.src, e.dst))
            .collect()
    };

    let coords = if raw.topology.qubits.is_empty() {
        None
    } else {
        let mut coords = vec![(0.0, 0.0); num_qubits as usize];
        for q in &raw.topology.qubits {
            if q.id >= num_qubits {
                return Err(PlatformError::CoordinateOutOfRange(q.id, num_qubits));
            }
            coords[q.id as usize] = (q.x, q.y);
        }
        Some(coords)
    };

    let num_cores = raw.topology.number_of_cores.max(1);
    let core_of = uniform_core_partition(num_qubits, num_cores);

    let topology = Topology::new(num_qubits, edges, coords, core_of)?;

    for resource in &raw.resources {
        validate_resource_qubits(resource, num_qubits)?;
    }

    Ok(Platform {
        name: raw.name,
        num_qubits,
        cycle_time_ns: raw.cycle_time as u64,
        num_cores,
        num_comm_qubits_per_core: raw.topology.comm_qubits_per_core,
        creg_count: raw.creg_count,
        breg_count: raw.breg_count,
        catalogue,
        topology,
        resources: raw.resources,
    })
}

/// Partition `num_qubits` physical qubits into `num_cores` contiguous,
/// as-equal-as-possible bands. Platforms with a single core put every
/// qubit in core 0.
fn uniform_core_partition(num_qubits: u32, num_cores: u32) -> Vec<u32> {
    if num_cores <= 1 {
        return vec![0; num_qubits as usize];
    }
    let per_core = num_qubits.div_ceil(num_cores);
    (0..num_qubits).map(|q| (q / per_core).min(num_cores - 1)).collect()
}

fn validate_resource_qubits(resource: &ResourceConfig, num_qubits: u32) -> PlatformResult<()> {
    let check = |name: &str, qubit: u32| -> PlatformResult<()> {
        if qubit >= num_qubits {
            return Err(PlatformError::ResourceQubitOutOfRange {
                resource: name.to_string(),
                qubit,
                num_qubits,
            });
        }
        Ok(())
    };
    match resource {
        ResourceConfig::Qubit { .. } => Ok(()),
        ResourceConfig::Instrument {
            name, instruments, ..
        } => {
            for binding in instruments {
                for &q in &binding.qubits {
                    check(name, q)?;
                }
                for &(a, b) in &binding.edges {
                    check(name, a)?;
                    check(name, b)?;
                }
            }
            Ok(())
        }
        ResourceConfig::InterCoreChannel { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_trivial_platform() {
        let json = r#"{
            "qubit_number": 2,
            "cycle_time": 20,
            "instructions": {
                "cnot": {"duration": 40, "type": "flux"}
            },
            "topology": {
                "edges": [{"src": 0, "dst": 1}]
            }
        }"#;
        let platform = load_platform(json).unwrap();
        assert_eq!(platform.num_qubits, 2);
        assert_eq!(platform.cycle_time_ns, 20);
        assert_eq!(platform.duration_cycles("cnot"), Some(2));
        assert!(platform.topology.is_adjacent(0, 1));
    }

    #[test]
    fn test_missing_mandatory_field_aborts() {
        let json = r#"{"cycle_time": 20}"#;
        assert!(load_platform(json).is_err());
    }

    #[test]
    fn test_non_positive_qubit_number_aborts() {
        let json = r#"{"qubit_number": 0, "cycle_time": 20}"#;
        assert!(matches!(
            load_platform(json),
            Err(PlatformError::NotPositive { field: "qubit_number", .. })
        ));
    }

    #[test]
    fn test_full_connectivity_shorthand() {
        let json = r#"{
            "qubit_number": 3,
            "cycle_time": 20,
            "topology": {"connectivity": "full"}
        }"#;
        let platform = load_platform(json).unwrap();
        assert!(platform.topology.is_adjacent(0, 2));
    }

    #[test]
    fn test_unrecognized_key_ignored() {
        let json = r#"{
            "qubit_number": 1,
            "cycle_time": 20,
            "some_future_key": {"whatever": true}
        }"#;
        assert!(load_platform(json).is_ok());
    }
}
