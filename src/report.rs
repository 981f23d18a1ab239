//! Fixed-width tables of the pipeline structures, printed once per cycle.

use std::fmt;

use crate::{
    out_of_order::OutOfOrder,
    regs::{ArchRegFile, RenameRegFile},
    reservation_station::ReservationStation,
    rob::ReorderBuffer,
    store_buffer::StoreBuffer,
};

/// Every table for the current cycle, headed by a cycle banner.
pub struct CycleReport<'a>(pub &'a OutOfOrder);

fn title(f: &mut fmt::Formatter<'_>, name: &str, width: usize) -> fmt::Result {
    writeln!(f, "{}", "=".repeat(width))?;
    writeln!(f, "{name}")?;
    writeln!(f, "{}", "-".repeat(width))
}

fn flag(b: bool) -> u8 {
    u8::from(b)
}

pub fn banner(cycle: u64) -> String {
    let rule = "*".repeat(80);
    format!("{rule}\n{:>43}{cycle}\n{rule}", "CYCLE ")
}

impl fmt::Display for ArchRegFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        title(f, "ARF", 25)?;
        writeln!(f, "{:>5}{:>5}{:>5}{:>10}", "Reg", "Busy", "Tag", "Data")?;
        for (i, ent) in self.iter().enumerate() {
            let tag = if ent.busy { ent.tag.to_string() } else { "-".to_string() };
            writeln!(
                f,
                "{:>5}{:>5}{:>5}{:>10}",
                format!("R{}", i + 1),
                flag(ent.busy),
                tag,
                ent.data
            )?;
        }
        writeln!(f)
    }
}

impl fmt::Display for RenameRegFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        title(f, "RRF", 25)?;
        writeln!(f, "{:>5}{:>5}{:>5}{:>10}", "Reg", "Busy", "Val", "Data")?;
        for (i, ent) in self.iter().enumerate() {
            writeln!(
                f,
                "{:>5}{:>5}{:>5}{:>10}",
                format!("S{}", i + 1),
                flag(ent.busy),
                flag(ent.valid),
                ent.data
            )?;
        }
        writeln!(f)
    }
}

impl fmt::Display for ReservationStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        title(f, "Reservation Station", 75)?;
        writeln!(
            f,
            "{:>5}{:>5}{:>6}{:>20}{:>20}{:>9}{:>10}",
            "Idx", "Busy", "Instn", "Operand 1", "Operand 2", "Dest", "Operation"
        )?;
        writeln!(
            f,
            "{:16}{:>10}{:>10}{:>10}{:>10}",
            "", "Ready", "Field", "Ready", "Field"
        )?;

        for (i, slot) in self.slots().enumerate() {
            let ent = match slot {
                Some(ent) => ent,
                None => {
                    writeln!(f, "{:>5}{:>5}", i, 0)?;
                    continue;
                }
            };

            write!(f, "{:>5}{:>5}{:>6}", i, 1, ent.seq)?;
            for n in 0..2 {
                match ent.srcs.get(n) {
                    Some(src) => write!(f, "{:>10}{:>10}", flag(src.is_valid()), src)?,
                    None => write!(f, "{:>10}{:>10}", "-", "-")?,
                }
            }
            let dest = ent.dst.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string());
            writeln!(f, "{:>9}{:>10}", dest, ent.op)?;
        }
        writeln!(f)
    }
}

impl fmt::Display for ReorderBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        title(f, "Re-order Buffer", 40)?;
        writeln!(
            f,
            "{:>5}{:>5}{:>10}{:>10}{:>10}",
            "Idx", "Busy", "Instn", "ARF reg", "RRF reg"
        )?;

        let mut entries = self.iter();
        for i in 0..self.capacity() {
            match entries.next() {
                Some(ent) => {
                    let dst = ent.dst.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string());
                    let tag = ent.tag.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string());
                    writeln!(f, "{:>5}{:>5}{:>10}{:>10}{:>10}", i, 1, ent.seq, dst, tag)?;
                }
                None => writeln!(f, "{:>5}{:>5}", i, 0)?,
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for StoreBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        title(f, "Store Buffer", 40)?;
        writeln!(f, "{:>5}{:>10}{:>10}  {}", "Idx", "Addr", "Data", "Forward to")?;
        for (i, ent) in self.iter().enumerate() {
            let fwds = ent
                .forwards
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{:>5}{:>10}{:>10}  {}", i, ent.addr, ent.data, fwds)?;
        }
        writeln!(f)
    }
}

impl fmt::Display for CycleReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cpu = self.0;
        writeln!(f, "{}", banner(cpu.cycle()))?;
        write!(f, "{}", cpu.arf())?;
        write!(f, "{}", cpu.rrf())?;
        write!(f, "{}", cpu.reservation_station())?;
        write!(f, "{}", cpu.rob())?;
        write!(f, "{}", cpu.store_buffer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inst::{ArchReg, Tag};

    #[test]
    fn test_banner() {
        let b = banner(7);
        assert!(b.contains("CYCLE 7"));
        assert_eq!(b.lines().count(), 3);
    }

    #[test]
    fn test_arf_shows_tag_when_busy() {
        let mut arf = ArchRegFile::new(2, 1);
        arf.rename(ArchReg(1), Tag(2));
        let table = arf.to_string();

        assert!(table.contains("ARF"));
        assert!(table.lines().any(|l| l.split_whitespace().eq(["R1", "0", "-", "1"])));
        assert!(table.lines().any(|l| l.split_whitespace().eq(["R2", "1", "S3", "1"])));
    }
}
