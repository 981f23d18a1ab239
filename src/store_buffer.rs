use std::collections::VecDeque;

use crate::{inst::Tag, queue::Queue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbEntry {
    pub addr: i32,
    pub data: i32,
    /// Loads waiting for this store's value, oldest first.
    pub forwards: VecDeque<Tag>,
}

/// Stores that have left the reorder buffer but not yet written memory.
#[derive(Debug, Clone)]
pub struct StoreBuffer {
    sb: Queue<SbEntry>,
}

impl StoreBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            sb: Queue::new(capacity),
        }
    }

    pub fn is_full(&self) -> bool {
        self.sb.is_full()
    }

    pub fn is_empty(&self) -> bool {
        self.sb.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sb.len()
    }

    pub fn capacity(&self) -> usize {
        self.sb.capacity()
    }

    #[must_use]
    pub fn try_push(&mut self, addr: i32, data: i32) -> Option<SbEntry> {
        self.sb.try_push(SbEntry {
            addr,
            data,
            forwards: VecDeque::new(),
        })
    }

    /// Queue a load on the youngest entry that writes `addr`. Returns false
    /// if no live entry matches, in which case memory is current for `addr`.
    pub fn queue_forward(&mut self, addr: i32, tag: Tag) -> bool {
        match self.sb.iter_mut().rev().find(|ent| ent.addr == addr) {
            Some(ent) => {
                ent.forwards.push_back(tag);
                true
            }
            None => false,
        }
    }

    pub fn head(&self) -> Option<&SbEntry> {
        self.sb.front()
    }

    pub fn head_mut(&mut self) -> Option<&mut SbEntry> {
        self.sb.front_mut()
    }

    pub fn try_pop(&mut self) -> Option<SbEntry> {
        self.sb.try_pop()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SbEntry> {
        self.sb.iter()
    }
}
