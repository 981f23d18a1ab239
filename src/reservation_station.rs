use crate::inst::{Opcode, Seq, Tag, ValueOrTag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsEntry {
    pub seq: Seq,
    pub op: Opcode,
    pub srcs: Vec<ValueOrTag>,
    pub dst: Option<Tag>,
    /// Set once a load/store unit has accepted the entry.
    pub issued: bool,
    stamp: u64,
}

/// Slot-addressed reservation station. Entries carry an allocation stamp so
/// that ready entries issue oldest first no matter which slot they occupy.
#[derive(Debug, Clone)]
pub struct ReservationStation {
    slots: Vec<Option<RsEntry>>,
    next_stamp: u64,
}

impl RsEntry {
    pub fn all_ready(&self) -> bool {
        self.srcs.iter().all(ValueOrTag::is_valid)
    }

    pub fn src_value(&self, n: usize) -> Option<i32> {
        self.srcs.get(n).and_then(ValueOrTag::value)
    }
}

impl ReservationStation {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            next_stamp: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Places the entry in the lowest free slot and returns that slot.
    pub fn try_insert(
        &mut self,
        seq: Seq,
        op: Opcode,
        srcs: Vec<ValueOrTag>,
        dst: Option<Tag>,
    ) -> Option<usize> {
        let idx = self.slots.iter().position(Option::is_none)?;
        self.slots[idx] = Some(RsEntry {
            seq,
            op,
            srcs,
            dst,
            issued: false,
            stamp: self.next_stamp,
        });
        self.next_stamp += 1;

        Some(idx)
    }

    pub fn get(&self, idx: usize) -> Option<&RsEntry> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut RsEntry> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, idx: usize) -> Option<RsEntry> {
        self.slots.get_mut(idx).and_then(Option::take)
    }

    pub fn find_seq(&self, seq: Seq) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().map(|e| e.seq == seq).unwrap_or(false))
    }

    /// Slots whose operands are all resolved and that no unit holds yet,
    /// oldest allocation first.
    pub fn ready_in_issue_order(&self) -> Vec<usize> {
        let mut ready = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|e| (i, e)))
            .filter(|(_, e)| !e.issued && e.all_ready())
            .map(|(i, e)| (e.stamp, i))
            .collect::<Vec<_>>();
        ready.sort_unstable();

        ready.into_iter().map(|(_, i)| i).collect()
    }

    /// Deliver a broadcast result to every operand waiting on `tag`.
    pub fn wakeup(&mut self, tag: Tag, data: i32) {
        for src in self.slots.iter_mut().flatten().flat_map(|e| e.srcs.iter_mut()) {
            if *src == ValueOrTag::Invalid(tag) {
                *src = ValueOrTag::Valid(data);
            }
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = Option<&RsEntry>> {
        self.slots.iter().map(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inst::AluOp;

    const ADD: Opcode = Opcode::Alu(AluOp::Add);

    #[test]
    fn test_fills_lowest_slot() {
        let mut rs = ReservationStation::new(2);
        assert_eq!(rs.try_insert(1, ADD, vec![], Some(Tag(0))), Some(0));
        assert_eq!(rs.try_insert(2, ADD, vec![], Some(Tag(1))), Some(1));
        assert!(rs.is_full());
        assert_eq!(rs.try_insert(3, ADD, vec![], Some(Tag(2))), None);

        rs.remove(0);
        assert_eq!(rs.try_insert(3, ADD, vec![], Some(Tag(2))), Some(0));
        assert_eq!(rs.find_seq(3), Some(0));
        assert_eq!(rs.find_seq(1), None);
    }

    #[test]
    fn test_issue_order_follows_allocation_not_slot() {
        let mut rs = ReservationStation::new(3);
        let ready = vec![ValueOrTag::Valid(1), ValueOrTag::Valid(2)];

        rs.try_insert(1, ADD, ready.clone(), Some(Tag(0)));
        rs.try_insert(2, ADD, ready.clone(), Some(Tag(1)));
        rs.try_insert(3, ADD, ready.clone(), Some(Tag(2)));
        rs.remove(0);
        // seq 4 lands in slot 0 but is younger than slots 1 and 2.
        rs.try_insert(4, ADD, ready, Some(Tag(3)));

        assert_eq!(rs.ready_in_issue_order(), vec![1, 2, 0]);
    }

    #[test]
    fn test_wakeup() {
        let mut rs = ReservationStation::new(2);
        let idx = rs
            .try_insert(
                1,
                Opcode::Store,
                vec![ValueOrTag::Invalid(Tag(4)), ValueOrTag::Invalid(Tag(5))],
                None,
            )
            .unwrap();
        assert!(rs.ready_in_issue_order().is_empty());

        rs.wakeup(Tag(4), 10);
        assert_eq!(rs.get(idx).unwrap().src_value(0), Some(10));
        assert!(rs.ready_in_issue_order().is_empty());

        rs.wakeup(Tag(5), 20);
        assert_eq!(rs.ready_in_issue_order(), vec![idx]);

        rs.get_mut(idx).unwrap().issued = true;
        assert!(rs.ready_in_issue_order().is_empty());
    }
}
