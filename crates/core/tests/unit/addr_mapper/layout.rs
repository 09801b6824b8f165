//! Bit-layout DSL unit tests.
//!
//! Verifies grammar acceptance and rejection (with positions), the per-level
//! bit-balance invariant, and MSB-first bit-by-bit reconstruction including
//! split (non-contiguous) level fields.

use pretty_assertions::assert_eq;
use rstest::rstest;

use dramsim_core::addr_mapper::AddrMapper;
use dramsim_core::common::ConfigError;
use dramsim_core::config::{MapperConfig, MapperKind};
use dramsim_core::Organization;

use crate::common::{build_org, org5};

fn custom(layout: &str, org: &Organization) -> Result<AddrMapper, ConfigError> {
    AddrMapper::from_config(
        &MapperConfig {
            kind: MapperKind::Custom,
            layout: Some(layout.to_owned()),
        },
        org,
    )
}

/// Three one-bit levels; the smallest organization the grammar can target.
fn tiny_org() -> Organization {
    build_org(&[("row", 2), ("bank", 2), ("column", 2)], 1, 8)
}

// ══════════════════════════════════════════════════════════
// 1. Compilation and reconstruction
// ══════════════════════════════════════════════════════════

#[test]
fn one_bit_per_level_scenario() {
    // "1R-1B-1C" compiles to the 3-bit table [row, bank, column] MSB-first;
    // 0b101 decodes to row=1, bank=0, column=1.
    let m = custom("1R-1B-1C", &tiny_org()).unwrap();
    assert_eq!(m.apply(0b101).as_slice(), &[1, 0, 1]);
    assert_eq!(m.apply(0b010).as_slice(), &[0, 1, 0]);
}

#[test]
fn full_hierarchy_layout() {
    // org5 derives bits [1, 1, 3, 16, 7]; place them as row|ch|bank|rank|col.
    let org = org5();
    let m = custom("16R-1CH-3B-1RA-7C", &org).unwrap();

    let row = 0xABCD_u64;
    let addr = ((row << 12) | (1 << 11) | (5 << 8) | (1 << 7) | 0x55) << 3;
    assert_eq!(m.apply(addr).as_slice(), &[1, 1, 5, row, 0x55]);
}

#[test]
fn split_level_fields_reconstruct_bit_by_bit() {
    // The column's two bits are split around the row and bank: each level's
    // coordinate accumulates in the order its bits appear, MSB first.
    let org = build_org(&[("row", 2), ("bank", 2), ("column", 4)], 1, 8);
    let m = custom("1C-1R-1B-1C", &org).unwrap();
    // addr 0b1010: col MSB=1, row=0, bank=1, col LSB=0 -> column 0b10.
    assert_eq!(m.apply(0b1010).as_slice(), &[0, 1, 2]);
}

#[test]
fn strips_transfer_offset_before_table_walk() {
    let org = build_org(&[("row", 2), ("bank", 2), ("column", 2)], 1, 64);
    // 8-byte transfers: 3 offset bits below the 3 decomposed bits.
    let m = custom("1R-1B-1C", &org).unwrap();
    assert_eq!(m.apply(0b101_000).as_slice(), &[1, 0, 1]);
    assert_eq!(m.apply(0b101_111).as_slice(), &[1, 0, 1]);
}

// ══════════════════════════════════════════════════════════
// 2. Bit-balance validation
// ══════════════════════════════════════════════════════════

#[test]
fn overassigned_level_is_rejected() {
    let err = custom("2R-1B", &tiny_org()).unwrap_err();
    match err {
        ConfigError::LayoutBitBalance { level, expected, got } => {
            assert_eq!(level, "row");
            assert_eq!(expected, 1);
            assert_eq!(got, 2);
        }
        other => panic!("expected LayoutBitBalance, got {other:?}"),
    }
}

#[test]
fn underassigned_layout_is_rejected() {
    // Only 2 of 3 bits assigned; some level must come up short.
    let err = custom("1R-1B", &tiny_org()).unwrap_err();
    assert!(matches!(err, ConfigError::LayoutBitBalance { .. }));
}

#[test]
fn field_overrunning_the_address_is_rejected() {
    let err = custom("4R-1B-1C", &tiny_org()).unwrap_err();
    assert!(matches!(err, ConfigError::LayoutParse { .. }));
}

// ══════════════════════════════════════════════════════════
// 3. Grammar rejection with positions
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::unknown_token("1X-1B-1C", 1)]
#[case::missing_count("R-1B-1C", 0)]
#[case::trailing_dash("1R-1B-1C-", 8)]
#[case::lowercase_token("1r-1B-1C", 1)]
fn malformed_layouts_name_the_position(#[case] layout: &str, #[case] expected_pos: usize) {
    let err = custom(layout, &tiny_org()).unwrap_err();
    match err {
        ConfigError::LayoutParse { pos, .. } => assert_eq!(pos, expected_pos),
        other => panic!("expected LayoutParse, got {other:?}"),
    }
}

#[test]
fn token_for_absent_level_is_rejected() {
    // tiny_org has no bank-group level; "BG" must fail to resolve.
    let err = custom("1R-1BG-1C", &tiny_org()).unwrap_err();
    match err {
        ConfigError::LayoutParse { pos, reason, .. } => {
            assert_eq!(pos, 4);
            assert!(reason.contains("bankgroup"), "{reason}");
        }
        other => panic!("expected LayoutParse, got {other:?}"),
    }
}

#[test]
fn custom_kind_without_layout_is_rejected() {
    let err = AddrMapper::from_config(
        &MapperConfig {
            kind: MapperKind::Custom,
            layout: None,
        },
        &tiny_org(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::MissingLayout));
}
