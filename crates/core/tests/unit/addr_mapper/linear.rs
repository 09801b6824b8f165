//! Linear mapper unit tests.
//!
//! Verifies the shared geometry derivation, the three slicing strategies
//! bit-for-bit against hand-computed decompositions, full-range coverage,
//! and the injectivity of the two order-preserving strategies.

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use dramsim_core::addr_mapper::{AddrMapper, MapperGeometry};
use dramsim_core::common::ConfigError;
use dramsim_core::config::{MapperConfig, MapperKind};

use crate::common::{build_org, org5, small_org};

fn mapper(kind: MapperKind, org: &dramsim_core::Organization) -> AddrMapper {
    AddrMapper::from_config(
        &MapperConfig { kind, layout: None },
        org,
    )
    .unwrap()
}

// ══════════════════════════════════════════════════════════
// 1. Shared geometry
// ══════════════════════════════════════════════════════════

#[test]
fn geometry_reference_scenario() {
    // {2, 2, 8, 65536, 128}, prefetch 1, 64-bit bus.
    let geo = MapperGeometry::new(&org5()).unwrap();
    assert_eq!(geo.addr_bits, vec![1, 1, 3, 16, 7]);
    assert_eq!(geo.tx_offset, 3);
    assert_eq!(geo.row_idx, 3);
    assert_eq!(geo.col_idx, 4);
}

#[test]
fn geometry_prefetch_reduces_column_width() {
    let org = build_org(
        &[("channel", 1), ("rank", 1), ("bank", 4), ("row", 16), ("column", 1024)],
        8,
        64,
    );
    let geo = MapperGeometry::new(&org).unwrap();
    // 10 column bits minus log2(8) prefetch bits.
    assert_eq!(*geo.addr_bits.last().unwrap(), 7);
    // 8 * 64 / 8 = 64 bytes per transfer.
    assert_eq!(geo.tx_offset, 6);
}

#[test]
fn geometry_requires_row_level() {
    let org = build_org(&[("channel", 2), ("bank", 4), ("column", 64)], 1, 64);
    let err = MapperGeometry::new(&org).unwrap_err();
    assert!(matches!(err, ConfigError::MissingLevel { name } if name == "row"));
}

// ══════════════════════════════════════════════════════════
// 2. Trivial hierarchical slicing (ChRaBaRoCo)
// ══════════════════════════════════════════════════════════

#[test]
fn chrabaroco_reference_decomposition() {
    // addr 0x1000 >> 3 = 0x200; column takes the low 7 bits (0), the row the
    // next 16 (4), bank/rank/channel the rest (0).
    let m = mapper(MapperKind::ChRaBaRoCo, &org5());
    assert_eq!(m.apply(0x1000).as_slice(), &[0, 0, 0, 4, 0]);
}

#[test]
fn chrabaroco_column_in_low_bits() {
    let m = mapper(MapperKind::ChRaBaRoCo, &org5());
    // Consecutive transfers differ only in the column coordinate.
    let a = m.apply(0x0);
    let b = m.apply(0x8);
    assert_eq!(a.as_slice(), &[0, 0, 0, 0, 0]);
    assert_eq!(b.as_slice(), &[0, 0, 0, 0, 1]);
}

// ══════════════════════════════════════════════════════════
// 3. Row-major reordering (RoBaRaCoCh)
// ══════════════════════════════════════════════════════════

#[test]
fn robaracoch_reference_decomposition() {
    // addr 0x1000 >> 3 = 0b10_0000_0000: channel takes bit 0 (0), column
    // bits 1..8 (0), rank bit 8 (0), bank bits 9..12 (1), row the rest (0).
    let m = mapper(MapperKind::RoBaRaCoCh, &org5());
    assert_eq!(m.apply(0x1000).as_slice(), &[0, 0, 1, 0, 0]);
}

#[test]
fn robaracoch_channel_interleaves_first() {
    let m = mapper(MapperKind::RoBaRaCoCh, &org5());
    assert_eq!(m.apply(0x0)[0], 0);
    assert_eq!(m.apply(0x8)[0], 1);
}

// ══════════════════════════════════════════════════════════
// 4. XOR-folded slicing (MOP4CLXOR)
// ══════════════════════════════════════════════════════════

#[test]
fn mop4_reference_decomposition() {
    // {1, 1, 4, 8, 16}, prefetch 1, 8-bit bus: bits [0, 0, 2, 3, 4], no
    // transfer offset. For addr 429 = 0b1_1010_1101:
    //   column sub-field = 0b01, bank slice = 0b11, column high = 0b10
    //   (column = 0b1001 = 9), row = 0b110 = 6,
    //   then bank ^= 9 & 0b11 = 1 -> 2, row ^= (9 >> 2) & 0b111 = 2 -> 4.
    let org = build_org(
        &[("channel", 1), ("rank", 1), ("bank", 4), ("row", 8), ("column", 16)],
        1,
        8,
    );
    let m = mapper(MapperKind::Mop4ClXor, &org);
    assert_eq!(m.apply(429).as_slice(), &[0, 0, 2, 4, 9]);
}

#[test]
fn mop4_zero_width_levels_are_untouched() {
    let org = build_org(
        &[("channel", 1), ("rank", 1), ("bank", 4), ("row", 8), ("column", 16)],
        1,
        8,
    );
    let m = mapper(MapperKind::Mop4ClXor, &org);
    for addr in 0..(1u64 << 9) {
        let vec = m.apply(addr);
        assert_eq!(vec[0], 0, "single-entry channel must stay 0");
        assert_eq!(vec[1], 0, "single-entry rank must stay 0");
    }
}

#[test]
fn mop4_requires_two_column_bits() {
    let org = build_org(
        &[("channel", 1), ("rank", 1), ("bank", 4), ("row", 8), ("column", 2)],
        1,
        8,
    );
    let err = AddrMapper::from_config(
        &MapperConfig {
            kind: MapperKind::Mop4ClXor,
            layout: None,
        },
        &org,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Mop4ColumnBits { bits: 1 }));
}

#[test]
fn mop4_spreads_column_strides_across_banks() {
    let org = build_org(
        &[("channel", 1), ("rank", 1), ("bank", 4), ("row", 8), ("column", 16)],
        1,
        8,
    );
    let m = mapper(MapperKind::Mop4ClXor, &org);
    // Walking one full row's worth of addresses must touch every bank.
    let banks: HashSet<u64> = (0..64).map(|addr| m.apply(addr)[2]).collect();
    assert_eq!(banks.len(), 4);
}

// ══════════════════════════════════════════════════════════
// 5. Coverage and injectivity
// ══════════════════════════════════════════════════════════

#[test]
fn order_preserving_strategies_are_injective() {
    // small_org decomposes 10 bits: 1024 distinct addresses must produce
    // 1024 distinct coordinate vectors.
    let org = small_org();
    for kind in [MapperKind::ChRaBaRoCo, MapperKind::RoBaRaCoCh] {
        let m = mapper(kind, &org);
        let vectors: HashSet<Vec<u64>> = (0..1024u64)
            .map(|addr| m.apply(addr).as_slice().to_vec())
            .collect();
        assert_eq!(vectors.len(), 1024, "{kind:?} collided");
    }
}

#[test]
fn every_reachable_vector_is_produced() {
    // Injectivity over a domain the size of the codomain is surjectivity:
    // every coordinate combination of small_org appears exactly once.
    let org = small_org();
    let m = mapper(MapperKind::ChRaBaRoCo, &org);
    let mut seen = HashSet::new();
    for addr in 0..1024u64 {
        assert!(seen.insert(m.apply(addr).as_slice().to_vec()));
    }
    assert!(seen.contains(&vec![1, 1, 3, 7, 7]));
    assert!(seen.contains(&vec![0, 0, 0, 0, 0]));
}

proptest! {
    #[test]
    fn coverage_all_levels_in_range(addr in 0u64..(1 << 31)) {
        // org5 decomposes 28 bits above a 3-bit transfer offset; any address
        // in range must land every coordinate strictly below its count.
        let org = org5();
        for kind in [MapperKind::ChRaBaRoCo, MapperKind::RoBaRaCoCh, MapperKind::Mop4ClXor] {
            let m = mapper(kind, &org);
            let vec = m.apply(addr);
            prop_assert!(vec.is_fully_assigned());
            for (level, &coord) in vec.iter().enumerate() {
                let bound = if level == 4 {
                    org.count(level) / org.prefetch_size()
                } else {
                    org.count(level)
                };
                prop_assert!(
                    coord < bound,
                    "{kind:?} level {level}: {coord} >= {bound}"
                );
            }
        }
    }
}
