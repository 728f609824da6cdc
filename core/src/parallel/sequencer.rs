//! parallel/sequencer.rs
//! Index-keyed holding area that releases results strictly in submission order.
use std::collections::BTreeMap;

use crate::types::{CompressionError, Result};

#[derive(Debug)]
pub struct OrderedResults<T> {
    next: u64,
    pending: BTreeMap<u64, T>,
}

impl<T> Default for OrderedResults<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedResults<T> {
    pub fn new() -> Self {
        Self { next: 0, pending: BTreeMap::new() }
    }

    /// Hold `item` until every earlier index has been released.
    pub fn push(&mut self, index: u64, item: T) -> Result<()> {
        if index < self.next || self.pending.contains_key(&index) {
            return Err(CompressionError::Pipeline(format!("duplicate result for block {index}")));
        }
        self.pending.insert(index, item);
        Ok(())
    }

    /// Release the contiguous run starting at the next expected index.
    pub fn drain_ready(&mut self) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(item) = self.pending.remove(&self.next) {
            out.push(item);
            self.next += 1;
        }
        out
    }

    /// Index the next released result must carry.
    pub fn next_index(&self) -> u64 {
        self.next
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// All results released. A held result means an earlier block never
    /// came back.
    pub fn finish(&mut self) -> Result<()> {
        if let Some(&first) = self.pending.keys().next() {
            return Err(CompressionError::Pipeline(format!(
                "missing block {} (holding {} later results from {first})",
                self.next,
                self.pending.len()
            )));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
