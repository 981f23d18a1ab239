use crate::inst::{ArchReg, Tag, ValueOrTag};

/// Committed architected register values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegSet {
    regs: Vec<i32>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ArfEntry {
    pub busy: bool,
    pub tag: Tag,
    pub data: i32,
}

#[derive(Debug, Clone)]
pub struct ArchRegFile {
    entries: Vec<ArfEntry>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RrfEntry {
    pub busy: bool,
    pub valid: bool,
    pub data: i32,
}

#[derive(Debug, Clone)]
pub struct RenameRegFile {
    entries: Vec<RrfEntry>,
}

impl RegSet {
    pub fn new(size: usize, initial: i32) -> Self {
        Self {
            regs: vec![initial; size],
        }
    }

    pub fn get(&self, reg: ArchReg) -> i32 {
        self.regs[usize::from(reg.0)]
    }

    pub fn set(&mut self, reg: ArchReg, value: i32) {
        self.regs[usize::from(reg.0)] = value;
    }

    pub fn len(&self) -> usize {
        self.regs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.regs
    }
}

impl ArchRegFile {
    pub fn new(size: usize, initial: i32) -> Self {
        Self {
            entries: vec![
                ArfEntry {
                    busy: false,
                    tag: Tag(0),
                    data: initial,
                };
                size
            ],
        }
    }

    pub fn get(&self, reg: ArchReg) -> &ArfEntry {
        &self.entries[usize::from(reg.0)]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArfEntry> {
        self.entries.iter()
    }

    /// Operand lookup at dispatch: the committed value, the in-flight result
    /// if it has already been produced, or the tag to wait on.
    pub fn lookup(&self, reg: ArchReg, rrf: &RenameRegFile) -> ValueOrTag {
        let ent = self.get(reg);
        if !ent.busy {
            return ValueOrTag::Valid(ent.data);
        }

        let slot = rrf.get(ent.tag);
        if slot.valid {
            ValueOrTag::Valid(slot.data)
        } else {
            ValueOrTag::Invalid(ent.tag)
        }
    }

    /// The newest in-flight writer always takes over the mapping.
    pub fn rename(&mut self, reg: ArchReg, tag: Tag) {
        let ent = &mut self.entries[usize::from(reg.0)];
        ent.busy = true;
        ent.tag = tag;
    }

    /// Write back a retired result. The register only stops being busy if no
    /// later instruction has renamed it since.
    pub fn commit(&mut self, reg: ArchReg, tag: Tag, data: i32) {
        let ent = &mut self.entries[usize::from(reg.0)];
        ent.data = data;
        if ent.tag == tag {
            ent.busy = false;
        }
    }

    pub fn values(&self) -> RegSet {
        RegSet {
            regs: self.entries.iter().map(|e| e.data).collect(),
        }
    }
}

impl RenameRegFile {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![RrfEntry::default(); capacity],
        }
    }

    pub fn get(&self, tag: Tag) -> &RrfEntry {
        &self.entries[tag.0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RrfEntry> {
        self.entries.iter()
    }

    pub fn busy_count(&self) -> usize {
        self.entries.iter().filter(|e| e.busy).count()
    }

    pub fn is_full(&self) -> bool {
        self.entries.iter().all(|e| e.busy)
    }

    /// Takes the lowest free slot.
    pub fn allocate(&mut self) -> Option<Tag> {
        let slot = self.entries.iter().position(|e| !e.busy)?;
        self.entries[slot] = RrfEntry {
            busy: true,
            valid: false,
            data: 0,
        };

        Some(Tag(slot))
    }

    pub fn fill(&mut self, tag: Tag, data: i32) {
        let ent = &mut self.entries[tag.0];
        ent.valid = true;
        ent.data = data;
    }

    pub fn release(&mut self, tag: Tag) {
        self.entries[tag.0] = RrfEntry::default();
    }
}
