//! Structure-of-arrays aggregate storage indexed by slot.

use crate::interner::Slot;

pub const INITIAL_CAPACITY: usize = 32;

/// Running statistics for one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotStats {
    pub min: f32,
    pub max: f32,
    pub sum: f64,
    pub count: u32,
}

impl SlotStats {
    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Counts are `u32` and wrap on overflow in every build profile.
#[derive(Debug, Clone)]
pub struct AggregateStore {
    min: Vec<f32>,
    max: Vec<f32>,
    sum: Vec<f64>,
    count: Vec<u32>,
    initialized: Vec<bool>,
}

impl Default for AggregateStore {
    fn default() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            min: vec![0.0; capacity],
            max: vec![0.0; capacity],
            sum: vec![0.0; capacity],
            count: vec![0; capacity],
            initialized: vec![false; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.initialized.len()
    }

    /// Makes `slot` addressable, doubling every array until it is.
    ///
    /// Growth kicks in one slot early: a store of capacity `C` grows before
    /// slot `C - 1` is written.
    pub fn ensure_capacity(&mut self, slot: Slot) {
        let slot = slot as usize;
        let mut capacity = self.capacity();
        if slot + 1 < capacity {
            return;
        }
        while slot + 1 >= capacity {
            capacity *= 2;
        }
        self.min.resize(capacity, 0.0);
        self.max.resize(capacity, 0.0);
        self.sum.resize(capacity, 0.0);
        self.count.resize(capacity, 0);
        self.initialized.resize(capacity, false);
    }

    /// Folds one measurement into `slot`.
    #[inline]
    pub fn record(&mut self, slot: Slot, value: f32) {
        self.ensure_capacity(slot);
        let i = slot as usize;
        self.sum[i] += value as f64;
        self.count[i] = self.count[i].wrapping_add(1);

        if !self.initialized[i] {
            self.min[i] = value;
            self.max[i] = value;
            self.initialized[i] = true;
            return;
        }
        if value < self.min[i] {
            self.min[i] = value;
        }
        if value > self.max[i] {
            self.max[i] = value;
        }
    }

    /// Folds partial statistics computed elsewhere into `slot`.
    pub fn merge_slot(&mut self, slot: Slot, other: SlotStats) {
        self.ensure_capacity(slot);
        let i = slot as usize;
        self.sum[i] += other.sum;
        self.count[i] = self.count[i].wrapping_add(other.count);

        if !self.initialized[i] {
            self.min[i] = other.min;
            self.max[i] = other.max;
            self.initialized[i] = true;
            return;
        }
        if other.min < self.min[i] {
            self.min[i] = other.min;
        }
        if other.max > self.max[i] {
            self.max[i] = other.max;
        }
    }

    /// Statistics for `slot`, or `None` if nothing was recorded there.
    pub fn get(&self, slot: Slot) -> Option<SlotStats> {
        let i = slot as usize;
        if !*self.initialized.get(i)? {
            return None;
        }
        Some(SlotStats {
            min: self.min[i],
            max: self.max[i],
            sum: self.sum[i],
            count: self.count[i],
        })
    }
}
