//! Random-address memory.
//!
//! Callers never choose an address: every load and every store picks a fresh
//! uniformly random cell. Finding a particular value means scanning until it
//! turns up, which is what the tag convention (value / 2 = tag, value mod 2 =
//! data bit) in client programs is for. The memory itself knows nothing about
//! tags.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// A completed memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemOp {
    Load { addr: usize, val: i64 },
    Store { addr: usize, val: i64 },
}

impl MemOp {
    pub fn addr(&self) -> usize {
        match self {
            MemOp::Load { addr, .. } | MemOp::Store { addr, .. } => *addr,
        }
    }

    pub fn val(&self) -> i64 {
        match self {
            MemOp::Load { val, .. } | MemOp::Store { val, .. } => *val,
        }
    }
}

impl fmt::Display for MemOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemOp::Load { addr, val } => write!(f, "load [{addr}] -> {val}"),
            MemOp::Store { addr, val } => write!(f, "store [{addr}] <- {val}"),
        }
    }
}

pub struct Memory<R: Rng = StdRng> {
    cells: Vec<i64>,
    rng: R,
}

impl Memory<StdRng> {
    /// Memory driven by `StdRng`, seeded from `seed` or from OS entropy.
    pub fn with_seed(size: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(size, rng)
    }
}

impl<R: Rng> Memory<R> {
    /// Cell `i` starts as `i * 2`: tag `i`, data bit 0.
    pub fn new(size: usize, rng: R) -> Self {
        let cells = (0..size).map(|i| (i as i64).saturating_mul(2)).collect();
        Self { cells, rng }
    }

    fn pick(&mut self) -> Option<usize> {
        if self.cells.is_empty() {
            return None;
        }
        Some(self.rng.gen_range(0..self.cells.len()))
    }

    /// Reads a random cell. `None` only when the memory has no cells.
    pub fn load(&mut self) -> Option<MemOp> {
        let addr = self.pick()?;
        Some(MemOp::Load {
            addr,
            val: self.cells[addr],
        })
    }

    /// Overwrites a random cell. `None` only when the memory has no cells.
    pub fn store(&mut self, val: i64) -> Option<MemOp> {
        let addr = self.pick()?;
        self.cells[addr] = val;
        Some(MemOp::Store { addr, val })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[i64] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<i64> {
        self.cells
    }
}

impl<R: Rng> fmt::Debug for Memory<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory").field("cells", &self.cells).finish()
    }
}
