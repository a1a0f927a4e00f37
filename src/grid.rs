//! Uniform spatial hash grid (C2).
//!
//! Maps `(cell_x, cell_y) -> set of entity handles`. Single-writer: range
//! queries and mutations never interleave within a tick (see Concurrency
//! & Resource Model).

use std::collections::{HashMap, HashSet};

use crate::aabb::Aabb;
use crate::handle::Handle;

/// Hash grid over 64-bit cell keys. Each cell holds the handles whose
/// AABB currently intersects it; empty cells are dropped immediately.
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<u64, HashSet<Handle>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Integer cell coordinates containing world point `(x, y)`.
    pub fn cell_coords(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Pack integer cell coordinates into a 64-bit key: two's-complement
    /// truncation to 32 bits per axis, `cx` in the high word.
    pub fn cell_key(cx: i32, cy: i32) -> u64 {
        ((cx as u32 as u64) << 32) | (cy as u32 as u64)
    }

    /// All cell keys the given AABB intersects.
    pub fn cells_intersecting(&self, aabb: &Aabb) -> HashSet<u64> {
        let (min_cx, min_cy) = self.cell_coords(aabb.min_x, aabb.min_y);
        let (max_cx, max_cy) = self.cell_coords(aabb.max_x, aabb.max_y);
        let mut keys = HashSet::with_capacity(
            ((max_cx - min_cx + 1).max(1) as usize) * ((max_cy - min_cy + 1).max(1) as usize),
        );
        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                keys.insert(Self::cell_key(cx, cy));
            }
        }
        keys
    }

    /// Insert `handle` into `cell_key`. Idempotent.
    pub fn insert(&mut self, handle: Handle, cell_key: u64) {
        self.cells.entry(cell_key).or_default().insert(handle);
    }

    /// Remove `handle` from `cell_key`. Drops the cell entry if it
    /// becomes empty. Idempotent.
    pub fn remove(&mut self, handle: Handle, cell_key: u64) {
        if let Some(set) = self.cells.get_mut(&cell_key) {
            set.remove(&handle);
            if set.is_empty() {
                self.cells.remove(&cell_key);
            }
        }
    }

    /// Handles currently registered at `cell_key`, if any.
    pub fn iter_cell(&self, cell_key: u64) -> impl Iterator<Item = &Handle> {
        self.cells.get(&cell_key).into_iter().flatten()
    }

    /// Whether a cell is present (non-empty) in the grid.
    pub fn has_cell(&self, cell_key: u64) -> bool {
        self.cells.contains_key(&cell_key)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total number of (cell, handle) pairs. For invariant tests only.
    #[cfg(test)]
    pub fn total_entries(&self) -> usize {
        self.cells.values().map(|s| s.len()).sum()
    }
}
