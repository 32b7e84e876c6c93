//! Program driver (C9): iterates a program's blocks in order, routes each
//! one (C8), then schedules it (C5 + C6), and writes `cycle`/`cycles_valid`
//! back onto the block's gates.
//!
//! Kernel structural control-flow (`for`/`if`/`do_while` markers) is treated
//! as opaque: each block's straight-line body is compiled independently, with
//! no cross-block scheduling.

use tracing::{debug, info, instrument};

use openql_ir::{Block, Program};
use openql_platform::Platform;

use crate::config::SchedulerConfig;
use crate::error::SchedResult;
use crate::resources::ResourceManager;
use crate::router::route_block;
use crate::scheduler::schedule_block;

/// Compile every block of `program` against `platform`, in place.
///
/// Each block is routed and scheduled independently with a resource manager
/// freshly seeded from `platform`; reservations do not carry across blocks,
/// matching the program driver's no-cross-block-scheduling contract.
#[instrument(skip(program, platform, config), fields(program = %program.name, blocks = program.blocks.len()))]
pub fn compile_program(
    program: &mut Program,
    platform: &Platform,
    config: &SchedulerConfig,
) -> SchedResult<()> {
    info!("compiling program with {} block(s)", program.blocks.len());
    for block in &mut program.blocks {
        compile_block(block, platform, config)?;
    }
    info!("program compiled, all blocks scheduled");
    Ok(())
}

/// Route and schedule one block, writing `cycle`/`cycles_valid` back onto
/// it. Exposed separately from [`compile_program`] for callers that manage
/// their own block collection (e.g. incremental recompilation).
#[instrument(skip(block, platform, config), fields(kernel = %block.name, gates = block.gates.len()))]
pub fn compile_block(
    block: &mut Block,
    platform: &Platform,
    config: &SchedulerConfig,
) -> SchedResult<()> {
    debug!("routing block");
    let routed = route_block(&block.name, block, platform, config)?;

    debug!("scheduling routed block ({} gates)", routed.gates.len());
    let mut resources = ResourceManager::from_platform(platform);
    let out = schedule_block(&block.name, &routed, platform, &mut resources, config)?;

    let mut scheduled = routed;
    for (gate, &cycle) in scheduled.gates.iter_mut().zip(out.cycles.iter()) {
        gate.cycle = cycle;
    }
    scheduled.cycles_valid = true;

    debug!(reservations = %resources.describe(), "final resource state");
    info!(length_cycles = out.length, "block scheduled");
    *block = scheduled;
    Ok(())
}
