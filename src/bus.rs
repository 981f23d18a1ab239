use crate::inst::Tag;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Broadcast {
    pub tag: Tag,
    pub data: i32,
}

/// Single-slot result bus. Granted to at most one producer per cycle.
#[derive(Debug, Clone, Default)]
pub struct CommonDataBus {
    slot: Option<Broadcast>,
}

/// Single-access memory port shared by load bypass and store retirement.
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    busy: bool,
}

impl CommonDataBus {
    pub fn is_busy(&self) -> bool {
        self.slot.is_some()
    }

    #[must_use]
    pub fn try_grant(&mut self, b: Broadcast) -> bool {
        if self.is_busy() {
            return false;
        }

        self.slot = Some(b);
        true
    }

    pub fn take(&mut self) -> Option<Broadcast> {
        self.slot.take()
    }
}

impl MemoryBus {
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn acquire(&mut self) {
        self.busy = true;
    }

    pub fn release(&mut self) {
        self.busy = false;
    }
}
