//! Schema tests for raw label payloads

use super::{MaskIndexEntry, PayloadError, RawLabelPayload};

const FRAMES_PAYLOAD: &str = r#"{
    "frames": {
        "2": {
            "frame_number": 2,
            "objects": {"objects": [
                {"label": "car", "index": 4, "confidence": 0.75,
                 "bounding_box": {"top_left": {"x": 0.1, "y": 0.1}, "bottom_right": {"x": 0.5, "y": 0.5}},
                 "attrs": {"attrs": [{"name": "color", "value": "red", "confidence": 0.9}]}}
            ]},
            "attrs": {"attrs": [{"name": "weather", "value": "rain"}]}
        },
        "10": {"attrs": {"attrs": [{"name": "scene", "value": 3}]}}
    },
    "mask_index": {"1": "road", "2": false, "x": true}
}"#;

#[test]
fn test_frames_payload_parses() {
    let payload = RawLabelPayload::from_json(FRAMES_PAYLOAD).unwrap();
    let frames = payload.numbered_frames().unwrap();
    let numbers: Vec<i64> = frames.iter().map(|(n, _)| *n).collect();
    assert_eq!(numbers, vec![2, 10], "frames sorted numerically, not lexically");

    let objects = frames[0].1.objects.as_ref().unwrap().objects();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].label, "car");
    assert_eq!(objects[0].index, Some(4));
    let attrs = objects[0].attrs.as_ref().unwrap().attrs();
    assert_eq!(attrs[0].value_text(), "red");

    let scene = frames[1].1.attrs.as_ref().unwrap().attrs();
    assert_eq!(scene[0].value_text(), "3");
}

#[test]
fn test_mask_index_entries() {
    let payload = RawLabelPayload::from_json(FRAMES_PAYLOAD).unwrap();
    let index = payload.mask_index();
    assert_eq!(index.len(), 2, "non-integer keys are dropped");
    assert!(index.is_visible(1));
    assert_eq!(index.name(1), Some("road"));
    assert!(!index.is_visible(2));
    assert!(index.is_visible(99));
    assert_eq!(index.names(), vec![(1, "road")]);
}

#[test]
fn test_flat_objects_list() {
    let text = r#"{"objects": [
        {"label": "person", "frame_number": 3,
         "bounding_box": {"top_left": {"x": 0, "y": 0}, "bottom_right": {"x": 1, "y": 1}}}
    ]}"#;
    let payload = RawLabelPayload::from_json(text).unwrap();
    let objects = payload.objects.as_ref().unwrap().objects();
    assert_eq!(objects[0].frame_number, Some(3));
    assert_eq!(objects[0].index, None);
    assert!(payload.frames.is_none());
}

#[test]
fn test_invalid_frame_key() {
    let payload = RawLabelPayload::from_json(r#"{"frames": {"abc": {}}}"#).unwrap();
    assert!(matches!(
        payload.numbered_frames(),
        Err(PayloadError::InvalidFrameKey { .. })
    ));
}

#[test]
fn test_mask_index_visible_bool() {
    let entry: MaskIndexEntry = serde_json::from_str("true").unwrap();
    assert_eq!(entry, MaskIndexEntry::Visible(true));
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        RawLabelPayload::from_json("{not json"),
        Err(PayloadError::Json(_))
    ));
}
