use crate::{
    error::{SimError, SimResult},
    inst::{Inst, Seq},
};
use std::str::FromStr;

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub insts: Vec<Inst>,
    // source line of each instruction, for diagnostics
    lines: Vec<usize>,
}

impl FromStr for Program {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut prog = Program::default();

        for (i, line) in s.lines().enumerate() {
            // Strip comments and empty lines
            let line = &line[..line.find(&[';', '#'][..]).unwrap_or(line.len())];
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Line numbers start at 1
            let i = i + 1;

            let inst = Inst::from_str(line).map_err(|msg| SimError::Parse {
                line: i,
                msg: format!("'{line}': {msg}"),
            })?;
            prog.insts.push(inst);
            prog.lines.push(i);
        }

        Ok(prog)
    }
}

impl Program {
    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    /// Instructions paired with their 1-based sequence numbers.
    pub fn iter(&self) -> impl Iterator<Item = (Seq, &Inst)> {
        (1..).zip(self.insts.iter())
    }

    /// Rejects register operands beyond the configured register file.
    pub fn check_regs(&self, arf_size: usize) -> SimResult<()> {
        for (inst, &line) in self.insts.iter().zip(&self.lines) {
            if let Some(reg) = inst.regs().find(|r| usize::from(r.0) >= arf_size) {
                return Err(SimError::Parse {
                    line,
                    msg: format!("'{inst}': register {reg} does not exist (R1..R{arf_size})"),
                });
            }
        }

        Ok(())
    }
}
