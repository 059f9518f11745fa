use super::*;

fn doodle_json() -> String {
    r#"{
        "type": "dpaint",
        "palette": [[0, 0, 0], [255, 255, 255]],
        "colorRange": [
            {"low": 0, "high": 1, "fps": 2.0, "active": true, "reverse": false},
            {"low": 0, "high": 1, "fps": 9.0, "active": false, "reverse": false},
            {"low": 1, "high": 1, "fps": 1.0, "active": true, "reverse": true}
        ],
        "indexedPixels": [[0, 1], [1, 0]],
        "image": {
            "name": "doodle",
            "width": 2,
            "height": 2,
            "frames": [{
                "layers": [
                    {"name": "bg", "indexedPixels": [[0, 0], [0, 0]]},
                    {"name": "fg", "indexedPixels": [[0, 1], [1, 0]]}
                ]
            }]
        }
    }"#
    .to_string()
}

#[test]
fn active_ranges_become_cycles_with_rescaled_rates() {
    let data = convert(&doodle_json()).unwrap();

    assert_eq!(data.cycles.len(), 2);
    assert_eq!(data.cycles[0].rate, 2.0 * CYCLE_RATE_DIVISOR);
    assert_eq!(data.cycles[0].reverse, 0);
    assert_eq!(data.cycles[1].reverse, 2);
}

#[test]
fn frame_layers_flatten_row_major() {
    let data = convert(&doodle_json()).unwrap();

    assert_eq!(data.name, "doodle");
    assert_eq!((data.width, data.height), (2, 2));
    assert_eq!(data.layers.len(), 2);
    assert_eq!(data.layers[0].name, "bg");
    assert_eq!(data.layers[1].pixels, vec![0, 1, 1, 0]);
}

#[test]
fn missing_frame_layers_fall_back_to_the_indexed_grid() {
    let json = r#"{
        "type": "dpaint",
        "palette": [[0, 0, 0]],
        "colorRange": [],
        "indexedPixels": [[0, 0], [0, 0]],
        "image": {"name": "flat", "width": 2, "height": 2}
    }"#;

    let data = convert(json).unwrap();
    assert_eq!(data.layers.len(), 1);
    assert_eq!(data.layers[0].name, "flat");
    assert_eq!(data.layers[0].pixels, vec![0, 0, 0, 0]);
}

#[test]
fn non_indexed_exports_are_rejected() {
    let json = r#"{
        "type": "dpaint",
        "palette": [[0, 0, 0]],
        "colorRange": [],
        "image": {"name": "rgb", "width": 1, "height": 1}
    }"#;

    let err = convert(json).unwrap_err();
    assert!(err.to_string().contains("No pixels found"));
}
