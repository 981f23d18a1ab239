use crate::{
    config::Config,
    cpu::{Cpu, ExecResult, Stats},
    error::{SimError, SimResult},
    inst::{Inst, Operand},
    mem::MainMemory,
    program::Program,
    regs::RegSet,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CpuState {
    Running,
    Stopped,
}

/// In-order reference model: one instruction per cycle, no renaming.
#[derive(Debug, Clone)]
pub struct Emulated {
    config: Config,
    regs: RegSet,
    mem: MainMemory,
    prog: Program,
    pc: usize,
    cycles: u64,
    insts_retired: u64,
}

impl Cpu for Emulated {
    fn new(prog: Program, config: &Config, mem: MainMemory) -> Self {
        Self {
            config: config.clone(),
            regs: RegSet::new(config.arf_size, config.initial_reg_value),
            pc: 0,
            cycles: 0,
            insts_retired: 0,
            mem,
            prog,
        }
    }

    fn exec_all(mut self) -> SimResult<ExecResult> {
        self.config.validate()?;
        self.prog.check_regs(self.config.arf_size)?;

        while CpuState::Running == self.exec_one()? {}

        Ok(ExecResult {
            mem: self.mem,
            regs: self.regs,
            stats: Stats {
                cycles_taken: self.cycles,
                insts_retired: self.insts_retired,
                ..Stats::default()
            },
        })
    }
}

impl Emulated {
    fn read(&self, src: Operand) -> i32 {
        match src {
            Operand::Imm(val) => val,
            Operand::Reg(reg) => self.regs.get(reg),
        }
    }

    fn exec_one(&mut self) -> SimResult<CpuState> {
        let inst = match self.prog.insts.get(self.pc) {
            Some(inst) => inst.clone(),
            None => return Ok(CpuState::Stopped),
        };
        let seq = self.pc as u32 + 1;

        match inst {
            Inst::Alu(op, dst, src0, src1) => {
                let val = op
                    .compute(self.read(src0), self.read(src1))
                    .ok_or(SimError::DivideByZero { seq })?;
                self.regs.set(dst, val);
            }
            Inst::Load(dst, addr) => {
                let val = self.mem.readw(self.read(addr))?;
                self.regs.set(dst, val);
            }
            Inst::Store(addr, data) => {
                self.mem.writew(self.read(addr), self.read(data))?;
            }
        }

        self.pc += 1;
        self.cycles += 1;
        self.insts_retired += 1;

        Ok(CpuState::Running)
    }
}
