use serde_json::{json, Value};

use orion_core::progress::{parse_mapping, ProgressSnapshot};
use orion_core::SnapshotError;

fn full_mapping() -> Value {
    json!({
        "progress": 0.5,
        "downloadSpeed": 1024,
        "totalSize": 2048,
        "completedSize": 1024,
        "status": "downloading"
    })
}

// ---------------------------------------------------------------
// Mapping input
// ---------------------------------------------------------------

#[test]
fn test_full_mapping_copies_every_field() {
    let source = full_mapping();
    let snap = ProgressSnapshot::from_source(Some(&source)).unwrap();

    assert_eq!(snap.progress, Some(0.5));
    assert_eq!(snap.download_speed, Some(1024.0));
    assert_eq!(snap.total_size, Some(2048.0));
    assert_eq!(snap.completed_size, Some(1024.0));
    assert_eq!(snap.status.as_deref(), Some("downloading"));
}

#[test]
fn test_partial_mapping_leaves_missing_fields_absent() {
    let source = json!({ "status": "done" });
    let snap = ProgressSnapshot::from_source(Some(&source)).unwrap();

    assert_eq!(snap.status.as_deref(), Some("done"));
    assert_eq!(snap.progress, None);
    assert_eq!(snap.download_speed, None);
    assert_eq!(snap.total_size, None);
    assert_eq!(snap.completed_size, None);
}

#[test]
fn test_inconsistent_values_are_kept_as_supplied() {
    let source = json!({
        "progress": 1.7,
        "totalSize": 100,
        "completedSize": 250,
        "status": "whatever the producer says"
    });
    let snap = ProgressSnapshot::from_source(Some(&source)).unwrap();

    assert_eq!(snap.progress, Some(1.7));
    assert_eq!(snap.total_size, Some(100.0));
    assert_eq!(snap.completed_size, Some(250.0));
    assert_eq!(snap.status.as_deref(), Some("whatever the producer says"));
}

#[test]
fn test_fractional_and_negative_sizes_pass_through() {
    let source = json!({ "totalSize": 2048.5, "completedSize": -1, "progress": 0.5 });
    let snap = ProgressSnapshot::from_source(Some(&source)).unwrap();

    assert_eq!(snap.total_size, Some(2048.5));
    assert_eq!(snap.completed_size, Some(-1.0));
    assert_eq!(snap.progress, Some(0.5));

    let text = serde_json::to_string(&snap).unwrap();
    assert_eq!(ProgressSnapshot::from_text(&text).unwrap(), snap);
}

#[test]
fn test_wrong_typed_values_read_as_absent() {
    let source = json!({
        "progress": "half",
        "downloadSpeed": [1, 2],
        "totalSize": 2048,
        "completedSize": true,
        "status": 7
    });
    let snap = ProgressSnapshot::from_source(Some(&source)).unwrap();

    assert_eq!(snap.progress, None);
    assert_eq!(snap.download_speed, None);
    assert_eq!(snap.total_size, Some(2048.0));
    assert_eq!(snap.completed_size, None);
    assert_eq!(snap.status, None);
}

#[test]
fn test_unknown_keys_are_ignored() {
    let source = json!({ "status": "active", "eta": 12, "gid": "abc" });
    let snap = ProgressSnapshot::from_source(Some(&source)).unwrap();
    assert_eq!(
        snap,
        ProgressSnapshot {
            status: Some("active".into()),
            ..Default::default()
        }
    );
}

// ---------------------------------------------------------------
// Text input
// ---------------------------------------------------------------

#[test]
fn test_text_matches_equivalent_mapping() {
    let text = r#"{"progress":1,"downloadSpeed":0,"totalSize":100,"completedSize":100,"status":"done"}"#;
    let mapping = json!({
        "progress": 1,
        "downloadSpeed": 0,
        "totalSize": 100,
        "completedSize": 100,
        "status": "done"
    });

    let from_text = ProgressSnapshot::from_source(Some(&Value::String(text.to_string()))).unwrap();
    let from_mapping = ProgressSnapshot::from_source(Some(&mapping)).unwrap();

    assert_eq!(from_text, from_mapping);
    assert_eq!(from_text.progress, Some(1.0));
    assert_eq!(from_text.completed_size, Some(100.0));
}

#[test]
fn test_from_str_and_from_text_agree() {
    let text = full_mapping().to_string();
    let parsed: ProgressSnapshot = text.parse().unwrap();
    assert_eq!(parsed, ProgressSnapshot::from_text(&text).unwrap());
}

#[test]
fn test_two_steps_compose() {
    let text = full_mapping().to_string();
    let mapping = parse_mapping(&text).unwrap();
    assert_eq!(
        ProgressSnapshot::from_mapping(&mapping),
        ProgressSnapshot::from_text(&text).unwrap()
    );
}

#[test]
fn test_malformed_text_fails_to_parse() {
    let source = Value::String("{not valid}".to_string());
    let result = ProgressSnapshot::from_source(Some(&source));
    assert!(matches!(result, Err(SnapshotError::Parse(_))));
}

#[test]
fn test_unterminated_text_fails_to_parse() {
    let result = ProgressSnapshot::from_text(r#"{"progress": 0.5"#);
    assert!(matches!(result, Err(SnapshotError::Parse(_))));
}

#[test]
fn test_text_that_is_not_an_object_is_rejected() {
    let result = ProgressSnapshot::from_text("42");
    assert!(matches!(result, Err(SnapshotError::NotAMapping("number"))));
}

// ---------------------------------------------------------------
// Missing or keyless input
// ---------------------------------------------------------------

#[test]
fn test_no_input_gives_all_absent() {
    let snap = ProgressSnapshot::from_source(None).unwrap();
    assert_eq!(snap, ProgressSnapshot::default());
    assert!(snap.progress.is_none() && snap.status.is_none());
}

#[test]
fn test_null_and_scalars_give_all_absent() {
    for source in [Value::Null, json!(3.5), json!(false), json!([1, 2, 3])] {
        let snap = ProgressSnapshot::from_source(Some(&source)).unwrap();
        assert_eq!(snap, ProgressSnapshot::default(), "source {}", source);
    }
}

// ---------------------------------------------------------------
// serde integration
// ---------------------------------------------------------------

#[test]
fn test_serialize_uses_wire_keys_and_omits_absent() {
    let snap = ProgressSnapshot {
        progress: Some(0.5),
        completed_size: Some(1024.0),
        ..Default::default()
    };
    assert_eq!(
        serde_json::to_value(&snap).unwrap(),
        json!({ "progress": 0.5, "completedSize": 1024.0 })
    );
}

#[test]
fn test_serde_deserialize_is_lenient() {
    let snap: ProgressSnapshot =
        serde_json::from_str(r#"{"status":"paused","totalSize":"big"}"#).unwrap();
    assert_eq!(snap.status.as_deref(), Some("paused"));
    assert_eq!(snap.total_size, None);
}

#[test]
fn test_serialized_snapshot_reads_back_equal() {
    let original = ProgressSnapshot::from_source(Some(&full_mapping())).unwrap();
    let text = serde_json::to_string(&original).unwrap();
    assert_eq!(ProgressSnapshot::from_text(&text).unwrap(), original);
}
