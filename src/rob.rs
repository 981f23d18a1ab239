use crate::{
    inst::{ArchReg, Seq, Tag},
    queue::Queue,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobEntry {
    pub seq: Seq,
    pub dst: Option<ArchReg>,
    pub tag: Option<Tag>,
}

#[derive(Debug, Clone)]
pub struct ReorderBuffer {
    rob: Queue<RobEntry>,
}

impl ReorderBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            rob: Queue::new(capacity),
        }
    }

    pub fn is_full(&self) -> bool {
        self.rob.is_full()
    }

    pub fn is_empty(&self) -> bool {
        self.rob.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rob.len()
    }

    pub fn capacity(&self) -> usize {
        self.rob.capacity()
    }

    #[must_use]
    pub fn try_push(&mut self, seq: Seq, dst: Option<ArchReg>, tag: Option<Tag>) -> Option<RobEntry> {
        self.rob.try_push(RobEntry { seq, dst, tag })
    }

    pub fn head(&self) -> Option<&RobEntry> {
        self.rob.front()
    }

    pub fn try_pop(&mut self) -> Option<RobEntry> {
        self.rob.try_pop()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RobEntry> {
        self.rob.iter()
    }
}
