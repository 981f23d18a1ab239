use log::{debug, trace};

use crate::{
    bus::{Broadcast, CommonDataBus, MemoryBus},
    config::{Config, MEM_UNIT_LATENCY},
    cpu::{Cpu, ExecResult, Stats},
    error::SimResult,
    execution_unit::ExecutionUnit,
    inst::{EuType, Inst, Opcode, Operand, Seq, ValueOrTag},
    mem::MainMemory,
    program::Program,
    regs::{ArchRegFile, RenameRegFile},
    reservation_station::ReservationStation,
    rob::ReorderBuffer,
    store_buffer::StoreBuffer,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Accepted,
    // A structure the instruction needs is full. Retry next cycle.
    Stall,
}

/// Tomasulo core with a reorder buffer and a store buffer. Each call to
/// `step` runs one cycle: dispatch, execute, complete, retire.
#[derive(Debug, Clone)]
pub struct OutOfOrder {
    config: Config,
    prog: Program,
    next_inst: usize,
    arf: ArchRegFile,
    rrf: RenameRegFile,
    rs: ReservationStation,
    rob: ReorderBuffer,
    sb: StoreBuffer,
    execution_units: Vec<ExecutionUnit>,
    cdb: CommonDataBus,
    mem_bus: MemoryBus,
    mem: MainMemory,
    stats: Stats,
    cycles: u64,
}

impl Cpu for OutOfOrder {
    fn new(prog: Program, config: &Config, mem: MainMemory) -> Self {
        let mut execution_units = (0..config.alu_count)
            .map(|_| ExecutionUnit::new(EuType::Alu))
            .collect::<Vec<_>>();
        execution_units.push(ExecutionUnit::new(EuType::Load));
        execution_units.push(ExecutionUnit::new(EuType::Store));

        Self {
            config: config.clone(),
            prog,
            next_inst: 0,
            arf: ArchRegFile::new(config.arf_size, config.initial_reg_value),
            rrf: RenameRegFile::new(config.rrf_capacity),
            rs: ReservationStation::new(config.rs_capacity),
            rob: ReorderBuffer::new(config.rob_capacity),
            sb: StoreBuffer::new(config.sb_capacity),
            execution_units,
            cdb: CommonDataBus::default(),
            mem_bus: MemoryBus::default(),
            mem,
            stats: Stats::default(),
            cycles: 0,
        }
    }

    fn exec_all(self) -> SimResult<ExecResult> {
        self.run_with(|_| ())
    }
}

impl OutOfOrder {
    /// Runs to completion, handing the reset state and then the state after
    /// every cycle to `observer`.
    pub fn run_with<F>(mut self, mut observer: F) -> SimResult<ExecResult>
    where
        F: FnMut(&OutOfOrder),
    {
        self.config.validate()?;
        self.prog.check_regs(self.config.arf_size)?;

        observer(&self);
        loop {
            self.step()?;
            observer(&self);

            if self.is_done() {
                break;
            }
        }

        debug!(
            "finished after {} cycles, {} instructions retired",
            self.cycles, self.stats.insts_retired
        );

        Ok(ExecResult {
            regs: self.arf.values(),
            mem: self.mem,
            stats: self.stats,
        })
    }

    pub fn step(&mut self) -> SimResult<()> {
        self.cycles += 1;
        self.stats.cycles_taken = self.cycles;
        trace!("cycle {}", self.cycles);

        self.stage_dispatch();
        self.stage_execute()?;
        self.stage_complete()?;
        self.stage_retire()
    }

    pub fn is_done(&self) -> bool {
        self.pending() == 0 && self.rob.is_empty() && self.sb.is_empty()
    }

    pub fn cycle(&self) -> u64 {
        self.cycles
    }

    pub fn pending(&self) -> usize {
        self.prog.len() - self.next_inst
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn arf(&self) -> &ArchRegFile {
        &self.arf
    }

    pub fn rrf(&self) -> &RenameRegFile {
        &self.rrf
    }

    pub fn reservation_station(&self) -> &ReservationStation {
        &self.rs
    }

    pub fn rob(&self) -> &ReorderBuffer {
        &self.rob
    }

    pub fn store_buffer(&self) -> &StoreBuffer {
        &self.sb
    }

    pub fn execution_units(&self) -> &[ExecutionUnit] {
        &self.execution_units
    }

    pub fn memory(&self) -> &MainMemory {
        &self.mem
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    // Rename and allocate up to `issue_width` instructions in program order.
    // The first stall ends dispatch for this cycle.
    fn stage_dispatch(&mut self) {
        for _ in 0..self.config.issue_width {
            let inst = match self.prog.insts.get(self.next_inst) {
                Some(inst) => inst.clone(),
                None => break,
            };
            let seq = self.next_inst as Seq + 1;

            match self.try_dispatch(seq, &inst) {
                Dispatch::Accepted => self.next_inst += 1,
                Dispatch::Stall => {
                    debug!("dispatch of #{} '{}' stalled", seq, inst);
                    self.stats.dispatch_stalls += 1;
                    break;
                }
            }
        }
    }

    pub fn try_dispatch(&mut self, seq: Seq, inst: &Inst) -> Dispatch {
        let dst = inst.dst();

        if (dst.is_some() && self.rrf.is_full()) || self.rs.is_full() || self.rob.is_full() {
            return Dispatch::Stall;
        }

        let tag = match dst {
            Some(_) => match self.rrf.allocate() {
                Some(tag) => Some(tag),
                None => return Dispatch::Stall,
            },
            None => None,
        };

        // Sources are read before the destination is renamed.
        let srcs = inst
            .srcs()
            .into_iter()
            .map(|src| match src {
                Operand::Imm(val) => ValueOrTag::Valid(val),
                Operand::Reg(reg) => self.arf.lookup(reg, &self.rrf),
            })
            .collect::<Vec<_>>();

        let slot = self.rs.try_insert(seq, inst.opcode(), srcs, tag);
        debug_assert!(slot.is_some(), "no space in reservation station");

        if let (Some(dst), Some(tag)) = (dst, tag) {
            self.arf.rename(dst, tag);
        }

        let overflow = self.rob.try_push(seq, dst, tag);
        debug_assert_eq!(overflow, None, "no space in reorder buffer");
        trace!("dispatched #{} '{}'", seq, inst);

        Dispatch::Accepted
    }

    // Advance the functional units, deliver this cycle's CDB grant, then
    // issue ready entries oldest first.
    fn stage_execute(&mut self) -> SimResult<()> {
        for eu in &mut self.execution_units {
            eu.tick(&mut self.cdb);
        }

        if let Some(b) = self.cdb.take() {
            debug!("CDB broadcast {} = {}", b.tag, b.data);
            self.stats.cdb_broadcasts += 1;
            self.broadcast(b);
        }

        for idx in self.rs.ready_in_issue_order() {
            let ent = match self.rs.get(idx) {
                Some(ent) => ent,
                None => continue,
            };
            let op = ent.op;

            let eu = match self.execution_units.iter_mut().find(|eu| eu.can_execute(op)) {
                Some(eu) => eu,
                None => continue,
            };

            let latency = match op {
                Opcode::Alu(alu_op) => self.config.latency(alu_op),
                Opcode::Load | Opcode::Store => MEM_UNIT_LATENCY,
            };
            eu.execute(idx, ent, latency)?;
            trace!("issued #{} {} from RS{}", ent.seq, op, idx);

            match op {
                Opcode::Alu(_) => {
                    self.rs.remove(idx);
                }
                Opcode::Load | Opcode::Store => {
                    if let Some(ent) = self.rs.get_mut(idx) {
                        ent.issued = true;
                    }
                }
            }
        }

        Ok(())
    }

    // Resolve the reorder buffer head: move a store into the store buffer,
    // resolve a load against the store buffer or memory, or commit a result.
    fn stage_complete(&mut self) -> SimResult<()> {
        self.mem_bus.release();

        let head = match self.rob.head() {
            Some(head) => head.clone(),
            None => return Ok(()),
        };

        let idx = match self.rs.find_seq(head.seq) {
            Some(idx) => idx,
            None => return self.commit_head(),
        };
        let ent = match self.rs.get(idx) {
            Some(ent) => ent.clone(),
            None => return Ok(()),
        };

        match ent.op {
            Opcode::Store => {
                if self.sb.is_full() {
                    debug!("store #{} waiting for store buffer space", ent.seq);
                    return Ok(());
                }

                let (addr, data) = match ent.srcs[..] {
                    [ValueOrTag::Valid(addr), ValueOrTag::Valid(data)] => (addr, data),
                    _ => unreachable!("store at ROB head with unresolved operands: {:?}", ent),
                };
                let overflow = self.sb.try_push(addr, data);
                debug_assert_eq!(overflow, None, "no space in store buffer");
                self.rob.try_pop();
                self.rs.remove(idx);
                self.stats.insts_retired += 1;
                debug!("store #{} [{}] = {} moved to store buffer", ent.seq, addr, data);
            }
            Opcode::Load => {
                let (addr, tag) = match (ent.src_value(0), ent.dst) {
                    (Some(addr), Some(tag)) => (addr, tag),
                    _ => unreachable!("load at ROB head with unresolved address: {:?}", ent),
                };

                if self.sb.queue_forward(addr, tag) {
                    self.stats.load_forwards += 1;
                    debug!("load #{} [{}] waits for forwarding to {}", ent.seq, addr, tag);
                } else {
                    self.mem_bus.acquire();
                    let data = self.mem.readw(addr)?;
                    self.stats.load_bypasses += 1;
                    debug!("load #{} [{}] bypassed to memory, {} = {}", ent.seq, addr, tag, data);
                    self.broadcast(Broadcast { tag, data });
                }

                // The ROB entry stays at the head and is committed from the
                // rename register on a later cycle.
                self.rs.remove(idx);
            }
            Opcode::Alu(_) => {
                trace!("#{} at ROB head still waiting for an ALU", ent.seq);
            }
        }

        Ok(())
    }

    fn commit_head(&mut self) -> SimResult<()> {
        let head = match self.rob.head() {
            Some(head) => head.clone(),
            None => return Ok(()),
        };
        let (dst, tag) = match (head.dst, head.tag) {
            (Some(dst), Some(tag)) => (dst, tag),
            _ => unreachable!("store left the reservation station before the ROB head"),
        };

        let slot = *self.rrf.get(tag);
        if !slot.valid {
            return Ok(());
        }

        self.arf.commit(dst, tag, slot.data);
        self.rrf.release(tag);
        self.rob.try_pop();
        self.stats.insts_retired += 1;
        debug!("commit #{} {} = {}", head.seq, dst, slot.data);

        Ok(())
    }

    // Drain the store buffer head into memory unless a load bypass holds the
    // memory bus. An entry with queued forwards serves one per cycle and is
    // only removed once none remain.
    fn stage_retire(&mut self) -> SimResult<()> {
        if self.mem_bus.is_busy() {
            return Ok(());
        }

        let (addr, data) = match self.sb.head() {
            Some(head) => (head.addr, head.data),
            None => return Ok(()),
        };
        self.mem.writew(addr, data)?;

        let (fwd, more) = match self.sb.head_mut() {
            Some(head) => (head.forwards.pop_front(), !head.forwards.is_empty()),
            None => (None, false),
        };

        if let Some(tag) = fwd {
            debug!("store [{}] = {} forwarded to {}", addr, data, tag);
            self.broadcast(Broadcast { tag, data });
            if more {
                return Ok(());
            }
        }

        self.sb.try_pop();
        debug!("store [{}] = {} retired", addr, data);

        Ok(())
    }

    fn broadcast(&mut self, b: Broadcast) {
        self.rs.wakeup(b.tag, b.data);
        self.rrf.fill(b.tag, b.data);
    }
}
