//! Configuration deserialization tests.

use pretty_assertions::assert_eq;

use dramsim_core::config::{Config, MapperKind};

#[test]
fn empty_document_yields_the_default_device() {
    let cfg: Config = serde_json::from_str("{}").unwrap();

    let names: Vec<&str> = cfg
        .organization
        .levels
        .iter()
        .map(|l| l.name.as_str())
        .collect();
    assert_eq!(
        names,
        ["channel", "rank", "bankgroup", "bank", "row", "column"]
    );
    assert_eq!(cfg.organization.prefetch_size, 8);
    assert_eq!(cfg.organization.channel_width, 64);
    assert_eq!(cfg.mapper.kind, MapperKind::ChRaBaRoCo);
    assert_eq!(cfg.scheduler.starve_threshold, 200);
    assert_eq!(cfg.model.buffer_capacity, 32);
    assert_eq!(cfg.frontend.period, 1);
    assert_eq!(cfg.frontend.retries, None);
    assert_eq!(cfg.frontend.unit_transfer_size, 512);
}

#[test]
fn mapper_kinds_accept_their_legacy_aliases() {
    let cfg: Config =
        serde_json::from_str(r#"{"mapper": {"kind": "MOP4CLXOR"}}"#).unwrap();
    assert_eq!(cfg.mapper.kind, MapperKind::Mop4ClXor);

    let cfg: Config = serde_json::from_str(
        r#"{"mapper": {"kind": "CustomizedMapper", "layout": "16R-2B-7C"}}"#,
    )
    .unwrap();
    assert_eq!(cfg.mapper.kind, MapperKind::Custom);
    assert_eq!(cfg.mapper.layout.as_deref(), Some("16R-2B-7C"));
}

#[test]
fn sections_can_be_overridden_independently() {
    let cfg: Config = serde_json::from_str(
        r#"{
            "organization": {
                "levels": [
                    {"name": "channel", "count": 2},
                    {"name": "rank", "count": 2},
                    {"name": "bank", "count": 8},
                    {"name": "row", "count": 65536},
                    {"name": "column", "count": 128}
                ],
                "prefetch_size": 1
            },
            "scheduler": {"starve_threshold": 64},
            "frontend": {"period": 4, "retries": 2}
        }"#,
    )
    .unwrap();

    assert_eq!(cfg.organization.levels.len(), 5);
    assert_eq!(cfg.organization.prefetch_size, 1);
    // Untouched field inside an overridden section keeps its default.
    assert_eq!(cfg.organization.channel_width, 64);
    assert_eq!(cfg.scheduler.starve_threshold, 64);
    assert_eq!(cfg.frontend.period, 4);
    assert_eq!(cfg.frontend.retries, Some(2));
    assert_eq!(cfg.model.t_act, 14);
}

#[test]
fn unknown_mapper_kind_is_rejected() {
    let result: Result<Config, _> =
        serde_json::from_str(r#"{"mapper": {"kind": "RoundRobin"}}"#);
    assert!(result.is_err());
}
