//! Controller plugin unit tests.
//!
//! Verifies the command-trace line format and the row-hit breakdown,
//! including the flattened per-bank accounting.

use pretty_assertions::assert_eq;

use dramsim_core::controller::{ControllerPlugin, RowHitCounter, TraceRecorder};
use dramsim_core::dram::MemCommand;

use crate::common::{build_org, org5, read_request, MockModel};

// ══════════════════════════════════════════════════════════
// 1. Trace recorder
// ══════════════════════════════════════════════════════════

#[test]
fn recorder_writes_one_aligned_line_per_command() {
    let org = org5();
    let mut recorder = TraceRecorder::new(&org, Vec::new());
    let model = MockModel::at_clk(5);

    let mut req = read_request(0x1000, &[0, 1, 2, 3, 4], 1);
    req.command = Some(MemCommand::Read);
    recorder.update(5, Some(&req), &model);
    recorder.finalize().unwrap();

    // Widths follow the level sizes: 2/2/2 for the small levels, 5 for the
    // 65536-row level, 3 for the 128-column level.
    let out = String::from_utf8(recorder.into_sink()).unwrap();
    assert_eq!(out, "      5,     RD,  0,  1,  2,     3,   4\n");
}

#[test]
fn recorder_skips_idle_cycles() {
    let org = org5();
    let mut recorder = TraceRecorder::new(&org, Vec::new());
    let model = MockModel::at_clk(1);

    recorder.update(1, None, &model);
    recorder.update(2, None, &model);
    assert!(recorder.into_sink().is_empty());
}

#[test]
fn recorder_emits_preparation_commands_too() {
    let org = org5();
    let mut recorder = TraceRecorder::new(&org, Vec::new());
    let model = MockModel::at_clk(9);

    let mut req = read_request(0, &[0, 0, 0, 0, 0], 1);
    req.command = Some(MemCommand::Activate);
    recorder.update(9, Some(&req), &model);

    let out = String::from_utf8(recorder.into_sink()).unwrap();
    assert!(out.contains("ACT"), "{out}");
}

// ══════════════════════════════════════════════════════════
// 2. Row-hit counter
// ══════════════════════════════════════════════════════════

#[test]
fn counts_only_row_hitting_data_transfers() {
    let org = org5();
    let mut counter = RowHitCounter::new(&org, Vec::new()).unwrap();
    let mut model = MockModel::at_clk(1);
    model.mark_row_hit(&[1, 0, 3, 9, 0]);

    let mut hit = read_request(0, &[1, 0, 3, 9, 0], 0);
    hit.command = Some(MemCommand::Read);
    let mut act = hit.clone();
    act.command = Some(MemCommand::Activate);
    let mut miss = read_request(8, &[0, 0, 0, 0, 0], 0);
    miss.command = Some(MemCommand::Read);

    counter.update(1, Some(&act), &model); // preparation command: ignored
    counter.update(2, Some(&hit), &model);
    counter.update(3, Some(&hit), &model);
    counter.update(4, Some(&miss), &model); // not a row hit
    counter.update(5, None, &model);

    assert_eq!(counter.total(), 2);
}

#[test]
fn summary_breaks_hits_down_per_bank() {
    // Small organization so the whole table is assertable.
    let org = build_org(
        &[("channel", 2), ("rank", 1), ("bank", 2), ("row", 4), ("column", 4)],
        1,
        8,
    );
    let mut counter = RowHitCounter::new(&org, Vec::new()).unwrap();
    let mut model = MockModel::at_clk(1);
    model.mark_row_hit(&[1, 0, 1, 2, 0]);

    let mut req = read_request(0, &[1, 0, 1, 2, 0], 0);
    req.command = Some(MemCommand::Write);
    counter.update(1, Some(&req), &model);
    counter.finalize().unwrap();

    let out = String::from_utf8(counter.into_sink()).unwrap();
    assert!(out.starts_with("Total row hit count: 1\n"), "{out}");
    assert!(out.contains("channel, rank, bank: row hit"), "{out}");
    // Channel 1, rank 0, bank 1 carries the single hit.
    assert!(out.contains(" 1,  0,  1:      1"), "{out}");
    // Channel 0 banks stay at zero.
    assert!(out.contains(" 0,  0,  0:      0"), "{out}");
}

#[test]
fn bankgroup_level_is_included_when_present() {
    let org = build_org(
        &[
            ("channel", 1),
            ("rank", 1),
            ("bankgroup", 2),
            ("bank", 2),
            ("row", 4),
            ("column", 4),
        ],
        1,
        8,
    );
    let mut counter = RowHitCounter::new(&org, Vec::new()).unwrap();
    counter.finalize().unwrap();
    let out = String::from_utf8(counter.into_sink()).unwrap();
    assert!(out.contains("channel, rank, bankgroup, bank: row hit"), "{out}");
}

#[test]
fn counter_requires_channel_rank_and_bank() {
    let org = build_org(&[("row", 4), ("column", 4)], 1, 8);
    assert!(RowHitCounter::new(&org, Vec::new()).is_err());
}
