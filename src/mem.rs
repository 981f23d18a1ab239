use crate::error::{SimError, SimResult};

/// Flat word-addressed data memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainMemory {
    mem: Vec<i32>,
}

impl MainMemory {
    pub fn new(size: usize, initial: i32) -> Self {
        Self {
            mem: vec![initial; size],
        }
    }

    fn index(&self, addr: i32) -> SimResult<usize> {
        usize::try_from(addr)
            .ok()
            .filter(|&a| a < self.mem.len())
            .ok_or(SimError::AddressOutOfBounds {
                addr,
                size: self.mem.len(),
            })
    }

    pub fn readw(&self, addr: i32) -> SimResult<i32> {
        Ok(self.mem[self.index(addr)?])
    }

    pub fn writew(&mut self, addr: i32, val: i32) -> SimResult<()> {
        let a = self.index(addr)?;
        self.mem[a] = val;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.mem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mem.is_empty()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.mem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let mut mem = MainMemory::new(4, 1);
        assert_eq!(mem.readw(3).unwrap(), 1);
        mem.writew(3, 9).unwrap();
        assert_eq!(mem.readw(3).unwrap(), 9);

        assert!(matches!(
            mem.readw(4),
            Err(SimError::AddressOutOfBounds { addr: 4, size: 4 })
        ));
        assert!(mem.writew(-1, 0).is_err());
    }
}
