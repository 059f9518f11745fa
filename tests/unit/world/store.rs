use super::*;

use crate::foundation::core::MAX_SECONDS;
use crate::world::data::{
    CycleSpec, EventInfo, ModeInfo, ModePaletteInfo, OverlayInfo, PaletteInfo,
};

fn sample_world() -> WorldData {
    WorldData {
        name: "Seaside".to_string(),
        width: 2,
        height: 2,
        pixels: vec![0, 1, 2, 1],
        palette_infos: vec![PaletteInfo {
            id: 1,
            name: "dawn".to_string(),
            colors: vec![[0.0, 0.0, 0.0], [128.0, 64.0, 32.0], [255.0, 255.0, 255.0]],
            cycles: vec![CycleSpec {
                low: 1,
                high: 2,
                rate: 560.0,
                reverse: 0,
            }],
        }],
        overlays: vec![OverlayInfo {
            id: 1,
            name: "gull".to_string(),
            width: 1,
            height: 1,
            pixels: vec![2],
        }],
        events: vec![EventInfo {
            id: 1,
            name: "Gull pass".to_string(),
            duration_seconds: 20.0,
            overlay_id: 1,
            start_position: kurbo::Point::new(0.0, 0.0),
            end_position: kurbo::Point::new(2.0, 0.0),
        }],
        modes: vec![ModeInfo {
            id: 1,
            name: "Mode 1".to_string(),
            mode_palette_infos: vec![ModePaletteInfo {
                id: 1,
                palette_id: 1,
                start_seconds: 0.0,
                end_seconds: 86_399.0,
            }],
        }],
    }
}

#[test]
fn serialize_then_ingest_round_trips() {
    let data = sample_world();
    let json = serialize_world(&data).unwrap();

    let (value, version) = parse_stored(&json).unwrap();
    assert_eq!(version, WORLD_DATA_VERSION);

    let restored = ingest_value(value, version).unwrap();
    assert_eq!(restored, data);
}

#[test]
fn envelope_carries_the_format_constants() {
    let json = serialize_world(&sample_world()).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["format"]["type"], WORLD_DATA_TYPE);
    assert_eq!(value["format"]["version"], WORLD_DATA_VERSION);
}

#[test]
fn bare_payloads_load_as_version_zero() {
    let (value, version) = parse_stored(r#"{"name":"old","width":1,"height":1}"#).unwrap();
    assert_eq!(version, 0);
    assert_eq!(value["name"], "old");
}

#[test]
fn import_rejects_wrong_container_types() {
    let err = parse_import(r#"{"format":{"version":2,"type":"something-else"},"data":{}}"#)
        .unwrap_err();
    assert_eq!(err.to_string(), "storage error: Wrong file type.");

    let err = parse_import(r#"{"name":"bare"}"#).unwrap_err();
    assert_eq!(err.to_string(), "storage error: Wrong file type.");
}

#[test]
fn import_rejects_future_versions() {
    let json = format!(
        r#"{{"format":{{"version":99,"type":"{WORLD_DATA_TYPE}"}},"data":{{}}}}"#
    );
    let err = parse_import(&json).unwrap_err();
    assert_eq!(err.to_string(), "storage error: Wrong file version.");
}

#[test]
fn import_rejects_missing_payloads() {
    let json = format!(r#"{{"format":{{"version":2,"type":"{WORLD_DATA_TYPE}"}}}}"#);
    let err = parse_import(&json).unwrap_err();
    assert_eq!(err.to_string(), "storage error: Damaged file.");
}

#[test]
fn legacy_palette_spans_migrate_into_a_synthetic_mode() {
    let legacy = serde_json::json!({
        "name": "old world",
        "width": 1,
        "height": 1,
        "pixels": [0],
        "paletteInfos": [
            {
                "id": 1,
                "name": "day",
                "colors": [[1.0, 2.0, 3.0]],
                "cycles": [],
                "startSeconds": 100.0,
                "endSeconds": 200.0
            },
            {
                "id": 2,
                "name": "night",
                "colors": [[4.0, 5.0, 6.0]],
                "cycles": [],
                "startSeconds": 300.0,
                "endSeconds": null
            },
            {
                "id": 3,
                "name": "untimed",
                "colors": [],
                "cycles": []
            }
        ]
    });

    let data = ingest_value(legacy, 0).unwrap();

    assert_eq!(data.modes.len(), 1);
    let mode = &data.modes[0];
    assert_eq!(mode.id, 1);
    assert_eq!(mode.name, "Mode 1");
    assert_eq!(mode.mode_palette_infos.len(), 2);

    let first = mode.mode_palette_infos[0];
    assert_eq!(first.palette_id, 1);
    assert_eq!(first.start_seconds, 100.0);
    assert_eq!(first.end_seconds, 200.0);

    // A null legacy end runs to the end of the day.
    let second = mode.mode_palette_infos[1];
    assert_eq!(second.palette_id, 2);
    assert_eq!(second.end_seconds, MAX_SECONDS - 1.0);

    // The legacy fields are gone and the palettes themselves survive.
    assert_eq!(data.palette_infos.len(), 3);
}

#[test]
fn ingest_fills_missing_span_ids() {
    let payload = serde_json::json!({
        "modes": [{
            "id": 1,
            "name": "Mode 1",
            "modePaletteInfos": [
                {"paletteId": 1, "startSeconds": 0.0, "endSeconds": 10.0},
                {"paletteId": 2, "startSeconds": 20.0, "endSeconds": 30.0}
            ]
        }]
    });

    let data = ingest_value(payload, 2).unwrap();
    let spans = &data.modes[0].mode_palette_infos;
    assert_eq!(spans[0].id, 1);
    assert_eq!(spans[1].id, 2);
}

#[test]
fn file_store_round_trips_through_disk() {
    let path = std::env::temp_dir().join(format!("dayglow-store-{}.json", std::process::id()));
    let store = JsonFileStore::new(&path);

    assert!(store.load().unwrap().is_none());

    let json = serialize_world(&sample_world()).unwrap();
    store.save(&json).unwrap();
    assert_eq!(store.load().unwrap().as_deref(), Some(json.as_str()));

    std::fs::remove_file(&path).ok();
}
