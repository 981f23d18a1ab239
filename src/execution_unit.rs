use crate::{
    bus::{Broadcast, CommonDataBus},
    error::{SimError, SimResult},
    inst::{EuType, Opcode, ValueOrTag},
    reservation_station::RsEntry,
};

/// One functional unit. ALUs latch their result at issue and hold it until
/// the CDB is granted; load/store units only occupy themselves for their
/// latency, memory is resolved from the reorder buffer head.
#[derive(Debug, Clone)]
pub struct ExecutionUnit {
    pub eu_type: EuType,
    busy: bool,
    timer: u32,
    rs_index: Option<usize>,
    result: Option<Broadcast>,
}

impl ExecutionUnit {
    pub fn new(eu_type: EuType) -> Self {
        Self {
            eu_type,
            busy: false,
            timer: 0,
            rs_index: None,
            result: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn rs_index(&self) -> Option<usize> {
        self.rs_index
    }

    pub fn can_execute(&self, op: Opcode) -> bool {
        self.eu_type == op.eu_type() && !self.busy
    }

    pub fn execute(&mut self, rs_index: usize, ent: &RsEntry, latency: u32) -> SimResult<()> {
        debug_assert!(self.can_execute(ent.op));

        self.result = match (self.eu_type, ent.op) {
            (EuType::Alu, Opcode::Alu(op)) => {
                let (a, b) = match ent.srcs[..] {
                    [ValueOrTag::Valid(a), ValueOrTag::Valid(b)] => (a, b),
                    _ => unreachable!("ALU issued with unresolved operands: {:?}", ent),
                };
                let tag = ent.dst.expect("ALU operation without destination");
                let data = op
                    .compute(a, b)
                    .ok_or(SimError::DivideByZero { seq: ent.seq })?;

                Some(Broadcast { tag, data })
            }
            _ => None,
        };

        self.rs_index = Some(rs_index);
        self.timer = latency;
        self.busy = true;

        Ok(())
    }

    /// Advance one cycle. A finished ALU frees itself only once it wins the
    /// CDB; otherwise it retries next cycle with its result still latched.
    pub fn tick(&mut self, cdb: &mut CommonDataBus) {
        if !self.busy {
            return;
        }

        self.timer = self.timer.saturating_sub(1);
        if self.timer > 0 {
            return;
        }

        match self.result {
            Some(b) => {
                if cdb.try_grant(b) {
                    self.result = None;
                    self.release();
                }
            }
            None => self.release(),
        }
    }

    fn release(&mut self) {
        self.busy = false;
        self.rs_index = None;
    }
}
