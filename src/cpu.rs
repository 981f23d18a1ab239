use crate::{config::Config, error::SimResult, mem::MainMemory, program::Program, regs::RegSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub cycles_taken: u64,
    pub insts_retired: u64,
    pub cdb_broadcasts: u64,
    pub load_forwards: u64,
    pub load_bypasses: u64,
    pub dispatch_stalls: u64,
}

#[derive(Debug, Clone)]
pub struct ExecResult {
    pub mem: MainMemory,
    pub regs: RegSet,
    pub stats: Stats,
}

pub trait Cpu {
    fn new(prog: Program, config: &Config, in_mem: MainMemory) -> Self;

    fn exec_all(self) -> SimResult<ExecResult>;
}
