//! Address and clock types.
//!
//! This module defines the linear physical address, the simulation clock, and
//! the decomposed per-level coordinate vector. It provides:
//! 1. **Aliases:** `Addr` and `Clk` for linear addresses and cycle counts.
//! 2. **Coordinate Vector:** `AddrVec`, one coordinate per hierarchy level,
//!    filled exactly once by an address mapper at request admission.

use std::fmt;
use std::ops::{Index, IndexMut};

/// A linear physical address as seen by the front end.
pub type Addr = u64;

/// A simulation clock value in cycle-equivalents.
pub type Clk = u64;

/// Sentinel marking a coordinate that has not been assigned yet.
///
/// A mapper must overwrite every slot before its `apply` returns; a sentinel
/// surviving decomposition is a logic error, not a runtime condition.
const UNASSIGNED: u64 = u64::MAX;

/// Decomposed device coordinates, one entry per hierarchy level.
///
/// The ordering matches the [`Organization`](crate::dram::Organization) it was
/// produced for (outermost level first, column last). Coordinate vectors are
/// produced once per request and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct AddrVec(Vec<u64>);

impl AddrVec {
    /// Creates a vector of `num_levels` slots, all marked unassigned.
    ///
    /// Used by the slicing mappers, which assign every level explicitly.
    pub fn unassigned(num_levels: usize) -> Self {
        Self(vec![UNASSIGNED; num_levels])
    }

    /// Creates a vector of `num_levels` zeroed slots.
    ///
    /// Used by the customized mapper, which reconstructs each coordinate
    /// bit-by-bit with shift/OR accumulation.
    pub fn zeroed(num_levels: usize) -> Self {
        Self(vec![0; num_levels])
    }

    /// Creates a vector directly from per-level coordinates.
    pub fn from_coords(coords: Vec<u64>) -> Self {
        Self(coords)
    }

    /// Number of hierarchy levels in this vector.
    pub fn num_levels(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if every level has been assigned a coordinate.
    pub fn is_fully_assigned(&self) -> bool {
        self.0.iter().all(|&c| c != UNASSIGNED)
    }

    /// The coordinates as a slice, outermost level first.
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Iterates over the coordinates, outermost level first.
    pub fn iter(&self) -> std::slice::Iter<'_, u64> {
        self.0.iter()
    }
}

impl Index<usize> for AddrVec {
    type Output = u64;

    fn index(&self, level: usize) -> &u64 {
        &self.0[level]
    }
}

impl IndexMut<usize> for AddrVec {
    fn index_mut(&mut self, level: usize) -> &mut u64 {
        &mut self.0[level]
    }
}

impl fmt::Display for AddrVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coord) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{coord}")?;
        }
        Ok(())
    }
}
