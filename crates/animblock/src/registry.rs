//! Live animation records
//!
//! Membership is the only lifecycle signal: a block is live while its record
//! is in the registry and finished once it has been removed.

use slotmap::{new_key_type, SlotMap};

use crate::record::AnimationRecord;

new_key_type! {
    /// Handle to a block created on an [`AnimationScheduler`](crate::AnimationScheduler)
    pub struct BlockId;
}

/// The set of live animation records, keyed by [`BlockId`]
#[derive(Debug, Default)]
pub struct Registry {
    records: SlotMap<BlockId, AnimationRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            records: SlotMap::with_key(),
        }
    }

    pub fn insert(&mut self, record: AnimationRecord) -> BlockId {
        self.records.insert(record)
    }

    pub fn remove(&mut self, id: BlockId) -> Option<AnimationRecord> {
        self.records.remove(id)
    }

    pub fn get(&self, id: BlockId) -> Option<&AnimationRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut AnimationRecord> {
        self.records.get_mut(id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.records.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &AnimationRecord)> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BlockId, &mut AnimationRecord)> {
        self.records.iter_mut()
    }

    /// Drop every record without completing it. Returns how many were live.
    pub fn clear(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }
}
