//! The three linear slicing strategies.
//!
//! All three strip the transfer offset and then carve the remaining address
//! into per-level bit groups; they differ only in the order the groups are
//! consumed, which decides which coordinates change fastest as addresses
//! stride upward.

use crate::common::{Addr, AddrVec};

use super::{MapperGeometry, slice_lower_bits};

/// Trivial hierarchical slicing.
///
/// Slices from the innermost level outward, so the column occupies the
/// lowest bits and the channel the highest. This is the canonical page-major
/// layout.
pub(super) fn apply_ch_ra_ba_ro_co(geo: &MapperGeometry, addr: Addr) -> AddrVec {
    let mut addr = addr >> geo.tx_offset;
    let mut vec = AddrVec::unassigned(geo.num_levels());
    for level in (0..geo.num_levels()).rev() {
        vec[level] = slice_lower_bits(&mut addr, geo.addr_bits[level]);
    }
    vec
}

/// Row-major reordering.
///
/// Assigns the outermost level and the column from the lowest bits first,
/// then walks levels `1..=row`. Placing the row late in the slicing order
/// keeps consecutive addresses inside one row for longer, which improves
/// simulated row-buffer locality.
pub(super) fn apply_ro_ba_ra_co_ch(geo: &MapperGeometry, addr: Addr) -> AddrVec {
    let mut addr = addr >> geo.tx_offset;
    let n = geo.num_levels();
    let mut vec = AddrVec::unassigned(n);
    vec[0] = slice_lower_bits(&mut addr, geo.addr_bits[0]);
    vec[n - 1] = slice_lower_bits(&mut addr, geo.addr_bits[n - 1]);
    for level in 1..=geo.row_idx {
        vec[level] = slice_lower_bits(&mut addr, geo.addr_bits[level]);
    }
    vec
}

/// XOR-folded slicing (MOP4CLXOR).
///
/// Consumes a 2-bit column sub-field, slices every level below the row
/// normally, assigns all remaining high bits to the row untruncated, then
/// XORs each nonzero-width low level against a sliding window of the column
/// bit pattern. The window offset advances by each level's width as it is
/// consumed, left to right; this spreads striding access sequences across
/// banks while the row bits are held.
pub(super) fn apply_mop4_cl_xor(geo: &MapperGeometry, addr: Addr) -> AddrVec {
    let mut addr = addr >> geo.tx_offset;
    let mut vec = AddrVec::unassigned(geo.num_levels());

    vec[geo.col_idx] = slice_lower_bits(&mut addr, 2);
    for level in 0..geo.row_idx {
        vec[level] = slice_lower_bits(&mut addr, geo.addr_bits[level]);
    }
    vec[geo.col_idx] += slice_lower_bits(&mut addr, geo.addr_bits[geo.col_idx] - 2) << 2;
    vec[geo.row_idx] = addr;

    let mut xor_offset = 0;
    for level in 0..geo.col_idx {
        let bits = geo.addr_bits[level];
        if bits > 0 {
            let mask = (vec[geo.col_idx] >> xor_offset) & ((1u64 << bits) - 1);
            vec[level] ^= mask;
            xor_offset += bits;
        }
    }
    vec
}
