use super::*;

#[test]
fn converted_bitmap_json_normalizes_to_one_layer() {
    let json = r#"{
        "width": 2,
        "height": 1,
        "colors": [[0, 0, 0], [255, 128, 0]],
        "pixels": [0, 1],
        "cycles": [{"low": 0, "high": 1, "rate": 560, "reverse": 0}]
    }"#;

    let data = parse_pixel_json("seaside.lbm", json).unwrap();
    assert_eq!(data.name, "seaside.lbm");
    assert_eq!((data.width, data.height), (2, 1));
    assert_eq!(data.layers.len(), 1);
    assert_eq!(data.layers[0].pixels, vec![0, 1]);
    assert_eq!(data.cycles.len(), 1);
    assert_eq!(data.cycles[0].rate, 560.0);
}

#[test]
fn converted_bitmap_cycles_are_optional() {
    let json = r#"{"width": 1, "height": 1, "colors": [[0, 0, 0]], "pixels": [0]}"#;
    let data = parse_pixel_json("bare", json).unwrap();
    assert!(data.cycles.is_empty());
}

#[test]
fn world_envelopes_are_called_out() {
    let json = format!(
        r#"{{"format":{{"version":2,"type":"{WORLD_DATA_TYPE}"}},"data":{{}}}}"#
    );
    let err = parse_pixel_json("world", &json).unwrap_err();
    assert!(err.to_string().contains("This is a world file, not pixels."));
}

#[test]
fn unrecognized_json_is_rejected() {
    let err = parse_pixel_json("mystery", r#"{"hello": 1}"#).unwrap_err();
    assert!(err.to_string().contains("This is not a DPaintJS file."));
}

#[test]
fn dpaint_payloads_dispatch_to_the_converter() {
    let json = r#"{
        "type": "dpaint",
        "palette": [[0, 0, 0]],
        "colorRange": [],
        "indexedPixels": [[0]],
        "image": {"name": "doodle", "width": 1, "height": 1}
    }"#;

    let data = parse_pixel_json("ignored", json).unwrap();
    assert_eq!(data.name, "doodle");
}
