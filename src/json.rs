//! JSON interchange for records
//!
//! A convenience layer over the same record model, not a separate wire
//! format. Field numbers map to field names bidirectionally via the schema,
//! enum values render by their declared symbolic name, and bytes render as
//! lowercase hex strings.

use serde_json::{Map, Value as JsonValue};

use crate::error::{Result, WireError};
use crate::schema::{FieldSchema, FieldType, MessageSchema};
use crate::value::{Record, Value};

/// Render a record as a JSON object keyed by field name
///
/// Enum values with no declared symbol render as the bare integer. Repeated
/// fields render as arrays; a scalar set on a repeated field renders as a
/// one-element array.
pub fn to_json(record: &Record, schema: &MessageSchema) -> Result<JsonValue> {
    let mut map = Map::new();

    for (number, value) in record.iter() {
        let field = schema.get(number).ok_or_else(|| WireError::UnknownField {
            message: schema.name().to_string(),
            number,
        })?;

        let rendered = match value {
            Value::List(items) => {
                if !field.repeated {
                    return Err(mismatch(field, "a single value"));
                }
                let elements: Result<Vec<JsonValue>> =
                    items.iter().map(|item| scalar_to_json(field, item)).collect();
                JsonValue::Array(elements?)
            }
            single if field.repeated => JsonValue::Array(vec![scalar_to_json(field, single)?]),
            single => scalar_to_json(field, single)?,
        };

        map.insert(field.name.clone(), rendered);
    }

    Ok(JsonValue::Object(map))
}

/// Build a record from a JSON object keyed by field name
///
/// Enum fields accept a declared symbol string or a bare integer. Unknown
/// field names and unknown enum symbols are errors; the JSON layer has no
/// number to fall back on, so it cannot mirror the decoder's skip rule.
pub fn from_json(json: &JsonValue, schema: &MessageSchema) -> Result<Record> {
    let object = json.as_object().ok_or_else(|| WireError::JsonTypeMismatch {
        name: schema.name().to_string(),
        expected: "object".to_string(),
    })?;

    let mut record = Record::new();

    for (name, value) in object {
        let field = schema
            .get_by_name(name)
            .ok_or_else(|| WireError::UnknownFieldName {
                message: schema.name().to_string(),
                name: name.clone(),
            })?;

        if field.repeated {
            let items = value.as_array().ok_or_else(|| mismatch(field, "array"))?;
            let elements: Result<Vec<Value>> = items
                .iter()
                .map(|item| scalar_from_json(field, item))
                .collect();
            record.set(field.number, Value::List(elements?));
        } else {
            record.set(field.number, scalar_from_json(field, value)?);
        }
    }

    Ok(record)
}

fn scalar_to_json(field: &FieldSchema, value: &Value) -> Result<JsonValue> {
    match (&field.field_type, value) {
        (FieldType::Int32 | FieldType::Int64, Value::Int(v)) => Ok(JsonValue::from(*v)),
        (FieldType::Uint64, Value::Uint(v)) => Ok(JsonValue::from(*v)),
        (FieldType::Bool, Value::Bool(v)) => Ok(JsonValue::from(*v)),
        (FieldType::Enum(e), Value::Int(v)) => Ok(match e.symbol_for(*v) {
            Some(symbol) => JsonValue::from(symbol),
            None => JsonValue::from(*v),
        }),
        (FieldType::String, Value::Str(s)) => Ok(JsonValue::from(s.as_str())),
        (FieldType::Bytes, Value::Bytes(b)) => Ok(JsonValue::from(hex_encode(b))),
        (FieldType::Message(nested), Value::Message(record)) => to_json(record, nested),
        _ => Err(WireError::ValueTypeMismatch {
            number: field.number,
            name: field.name.clone(),
            expected: field.field_type.type_name(),
        }),
    }
}

fn scalar_from_json(field: &FieldSchema, value: &JsonValue) -> Result<Value> {
    match &field.field_type {
        FieldType::Int32 | FieldType::Int64 => value
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| mismatch(field, "integer")),
        FieldType::Uint64 => value
            .as_u64()
            .map(Value::Uint)
            .ok_or_else(|| mismatch(field, "unsigned integer")),
        FieldType::Bool => value
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| mismatch(field, "boolean")),
        FieldType::Enum(e) => match value {
            JsonValue::String(symbol) => match e.value_for(symbol) {
                Some(v) => Ok(Value::Int(v)),
                None => Err(WireError::UnknownEnumSymbol {
                    name: e.name().to_string(),
                    symbol: symbol.clone(),
                }),
            },
            other => other
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| mismatch(field, "enum symbol or integer")),
        },
        FieldType::String => value
            .as_str()
            .map(|s| Value::Str(s.to_string()))
            .ok_or_else(|| mismatch(field, "string")),
        FieldType::Bytes => value
            .as_str()
            .and_then(hex_decode)
            .map(Value::Bytes)
            .ok_or_else(|| mismatch(field, "hex string")),
        FieldType::Message(nested) => Ok(Value::Message(from_json(value, nested)?)),
    }
}

fn mismatch(field: &FieldSchema, expected: &str) -> WireError {
    WireError::JsonTypeMismatch {
        name: field.name.clone(),
        expected: expected.to_string(),
    }
}

const HEX: &[u8; 16] = b"0123456789abcdef";

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(HEX[usize::from(b >> 4)] as char);
        out.push(HEX[usize::from(b & 0x0f)] as char);
    }
    out
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    for pair in s.as_bytes().chunks(2) {
        let hi = (pair[0] as char).to_digit(16)?;
        let lo = (pair[1] as char).to_digit(16)?;
        out.push((hi << 4 | lo) as u8);
    }
    Some(out)
}
