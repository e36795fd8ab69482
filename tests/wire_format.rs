//! Golden Tests for the Wire Format
//!
//! Exercises the documented wire contract against schemas loaded from JSON
//! fixtures: golden byte sequences, varint boundaries, forward compatibility
//! and schema compatibility checking.

use tagwire::{
    check_compatibility, decode, encode, encode_with, from_json, to_json, EncodeOptions,
    Fingerprint, MessageSchema, Record, Value, WireError,
};

fn load_schema(json: &str) -> MessageSchema {
    serde_json::from_str(json).unwrap()
}

fn user_schema() -> MessageSchema {
    load_schema(include_str!("fixtures/user.json"))
}

fn user_v2_schema() -> MessageSchema {
    load_schema(include_str!("fixtures/user_v2.json"))
}

fn telemetry_schema() -> MessageSchema {
    load_schema(include_str!("fixtures/telemetry.json"))
}

// =============================================================================
// Golden Bytes
// =============================================================================

#[test]
fn test_golden_user_record() {
    let mut record = Record::new();
    record.set(1, 123);
    record.set(2, "Alice");

    let bytes = encode(&record, &user_schema()).unwrap();

    // tag 0x08 = field 1 / varint, value 123
    // tag 0x12 = field 2 / length-delimited, length 5, "Alice"
    assert_eq!(
        bytes,
        vec![0x08, 0x7B, 0x12, 0x05, 0x41, 0x6C, 0x69, 0x63, 0x65]
    );

    let decoded = decode(&bytes, &user_schema()).unwrap();
    assert_eq!(decoded, record);
}

// =============================================================================
// Varint Boundaries
// =============================================================================

#[test]
fn test_varint_boundary_values_roundtrip() {
    let schema = user_v2_schema();

    for value in [0u64, 127, 128, 1 << 35, u64::MAX] {
        let mut record = Record::new();
        record.set(3, value);

        let bytes = encode(&record, &schema).unwrap();
        let decoded = decode(&bytes, &schema).unwrap();
        assert_eq!(decoded.get(3), Some(&Value::Uint(value)), "value {}", value);
    }
}

#[test]
fn test_overlong_varint_payload_is_malformed() {
    // Field 3 (uint64) with an eleven-group continuation chain.
    let mut bytes = vec![0x18];
    bytes.extend_from_slice(&[0x80; 10]);
    bytes.push(0x01);

    let result = decode(&bytes, &user_v2_schema());
    assert!(matches!(result, Err(WireError::MalformedVarint { .. })));
}

// =============================================================================
// Forward Compatibility
// =============================================================================

#[test]
fn test_unknown_field_skipped_under_older_schema() {
    let mut record = Record::new();
    record.set(1, 123);
    record.set(2, "Alice");
    record.set(3, u64::MAX); // not declared by the v1 schema

    let bytes = encode(&record, &user_v2_schema()).unwrap();
    let decoded = decode(&bytes, &user_schema()).unwrap();

    assert_eq!(decoded.get(1), Some(&Value::Int(123)));
    assert_eq!(decoded.get(2), Some(&Value::Str("Alice".to_string())));
    assert!(decoded.get(3).is_none());
}

#[test]
fn test_wire_type_mismatch_rejected() {
    // Field 2 is declared string but encoded with VARINT wire type.
    let bytes = vec![0x08, 0x7B, 0x10, 0x05];
    let result = decode(&bytes, &user_schema());
    assert!(matches!(
        result,
        Err(WireError::WireTypeMismatch { number: 2, .. })
    ));
}

// =============================================================================
// Full Schema Roundtrip
// =============================================================================

#[test]
fn test_telemetry_roundtrip_with_all_types() {
    let schema = telemetry_schema();

    let mut origin = Record::new();
    origin.set(1, -3);
    origin.set(2, 14);

    let mut record = Record::new();
    record.set(1, 0x1234_5678_9ABC_DEF0u64);
    record.set(2, true);
    record.set(3, 2i64);
    record.set(4, vec![0x00, 0xFF, 0x42]);
    record.push(5, "boot");
    record.push(5, "retry");
    record.push(5, "halt");
    record.set(6, origin);

    let bytes = encode(&record, &schema).unwrap();
    let decoded = decode(&bytes, &schema).unwrap();
    assert_eq!(decoded, record);

    // Repeated elements keep their order.
    match decoded.get(5) {
        Some(Value::List(items)) => {
            let tags: Vec<_> = items
                .iter()
                .map(|v| match v {
                    Value::Str(s) => s.as_str(),
                    other => panic!("unexpected element {:?}", other),
                })
                .collect();
            assert_eq!(tags, vec!["boot", "retry", "halt"]);
        }
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn test_telemetry_json_interchange() {
    let schema = telemetry_schema();

    let json = serde_json::json!({
        "device_id": 42,
        "active": true,
        "severity": "ERROR",
        "payload": "00ff42",
        "tags": ["boot", "halt"],
        "origin": { "x": -3, "y": 14 },
    });

    let record = from_json(&json, &schema).unwrap();
    let bytes = encode(&record, &schema).unwrap();
    let decoded = decode(&bytes, &schema).unwrap();

    assert_eq!(to_json(&decoded, &schema).unwrap(), json);
}

#[test]
fn test_omit_defaults_option() {
    let schema = user_v2_schema();

    let mut record = Record::new();
    record.set(1, 0);
    record.set(2, "");
    record.set(3, 99u64);

    let options = EncodeOptions {
        omit_defaults: true,
    };
    let bytes = encode_with(&record, &schema, options).unwrap();
    assert_eq!(bytes, vec![0x18, 0x63]); // only the session field survives

    let decoded = decode(&bytes, &schema).unwrap();
    assert_eq!(decoded.get(3), Some(&Value::Uint(99)));
    assert!(decoded.get(1).is_none());
}

// =============================================================================
// Compatibility Checking
// =============================================================================

#[test]
fn test_added_field_is_compatible() {
    let report = check_compatibility(&user_schema(), &user_v2_schema()).unwrap();
    assert!(report.is_compatible());
}

#[test]
fn test_reassigned_number_is_breaking() {
    let v3 = load_schema(include_str!("fixtures/user_v3_breaking.json"));
    let report = check_compatibility(&user_v2_schema(), &v3).unwrap();
    assert!(!report.is_compatible());
    assert_eq!(report.issues.len(), 1);
}

// =============================================================================
// Schema Files
// =============================================================================

#[test]
fn test_schema_file_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.json");

    let schema = user_schema();
    std::fs::write(&path, serde_json::to_string_pretty(&schema).unwrap()).unwrap();

    let reloaded: MessageSchema =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reloaded, schema);

    let original = Fingerprint::of_schema(&schema).unwrap();
    assert!(original.verify(&reloaded).unwrap());
}
