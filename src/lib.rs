use config::Config;
use cpu::{Cpu, ExecResult};
use error::SimResult;
use mem::MainMemory;
use program::Program;

pub mod bus;
pub mod config;
pub mod cpu;
pub mod emulated;
pub mod error;
pub mod execution_unit;
pub mod inst;
pub mod mem;
pub mod out_of_order;
pub mod program;
pub mod queue;
pub mod regs;
pub mod report;
pub mod reservation_station;
pub mod rob;
pub mod store_buffer;

/// Parse `source` and run it to completion on a fresh memory image.
pub fn parse_and_exec<C: Cpu>(source: &str, config: &Config) -> SimResult<ExecResult> {
    let prog = source.parse::<Program>()?;
    let mem = MainMemory::new(config.memory_size, config.initial_mem_value);
    C::new(prog, config, mem).exec_all()
}
