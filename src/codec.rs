//! Tagged-field wire codec
//!
//! Implements the encode/decode contract over the tag/length/value format:
//!
//! ```text
//! ┌───────────────┬───────────────────────────────┐
//! │ Tag (varint)  │ Payload                       │
//! │ (num << 3)|wt │ varint, or len-prefixed bytes │
//! └───────────────┴───────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Deterministic output**: set fields are emitted in ascending field
//!   number order, so equal records always encode to equal bytes
//! - **Round-trip**: `decode(encode(r, s), s)` equals `r` for every field
//!   the schema declares and the record sets
//! - **Forward compatible**: unknown field numbers are skipped by the wire
//!   type's generic length rule, never rejected

use tracing::trace;

use crate::error::{Result, WireError};
use crate::schema::{FieldSchema, FieldType, MessageSchema, WireType};
use crate::value::{Record, Value};
use crate::varint::{decode_varint, encode_varint};

/// Encode-time options
///
/// `omit_defaults` drops zero-valued scalars, empty strings and bytes, and
/// empty lists instead of emitting them. The default emits every
/// explicitly-set field, zero included; nested messages are always emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    pub omit_defaults: bool,
}

/// Encode a record against its schema with default options
pub fn encode(record: &Record, schema: &MessageSchema) -> Result<Vec<u8>> {
    encode_with(record, schema, EncodeOptions::default())
}

/// Encode a record against its schema
///
/// Fails with `UnknownField` when the record sets a number the schema does
/// not declare, and with `ValueTypeMismatch` when a value's kind disagrees
/// with the field's declared type. Data is never silently dropped.
pub fn encode_with(
    record: &Record,
    schema: &MessageSchema,
    options: EncodeOptions,
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(record, schema, options, &mut out)?;
    Ok(out)
}

fn encode_into(
    record: &Record,
    schema: &MessageSchema,
    options: EncodeOptions,
    out: &mut Vec<u8>,
) -> Result<()> {
    for (number, value) in record.iter() {
        let field = schema.get(number).ok_or_else(|| WireError::UnknownField {
            message: schema.name().to_string(),
            number,
        })?;

        if options.omit_defaults && is_default(value) {
            continue;
        }

        match value {
            Value::List(items) => {
                if !field.repeated {
                    return Err(value_mismatch(field));
                }
                for item in items {
                    encode_field(field, item, options, out)?;
                }
            }
            single => encode_field(field, single, options, out)?,
        }
    }
    Ok(())
}

/// Emit one tag and payload for a single (non-list) value
fn encode_field(
    field: &FieldSchema,
    value: &Value,
    options: EncodeOptions,
    out: &mut Vec<u8>,
) -> Result<()> {
    let tag = (u64::from(field.number) << 3) | u64::from(field.wire_type().discriminant());

    match (&field.field_type, value) {
        (FieldType::Int32, Value::Int(v)) => {
            if i32::try_from(*v).is_err() {
                return Err(value_mismatch(field));
            }
            encode_varint(tag, out);
            // Negative values sign-extend to 64 bits on the wire.
            encode_varint(*v as u64, out);
        }
        (FieldType::Int64, Value::Int(v)) | (FieldType::Enum(_), Value::Int(v)) => {
            encode_varint(tag, out);
            encode_varint(*v as u64, out);
        }
        (FieldType::Uint64, Value::Uint(v)) => {
            encode_varint(tag, out);
            encode_varint(*v, out);
        }
        (FieldType::Bool, Value::Bool(v)) => {
            encode_varint(tag, out);
            encode_varint(u64::from(*v), out);
        }
        (FieldType::String, Value::Str(s)) => {
            encode_varint(tag, out);
            encode_varint(s.len() as u64, out);
            out.extend_from_slice(s.as_bytes());
        }
        (FieldType::Bytes, Value::Bytes(b)) => {
            encode_varint(tag, out);
            encode_varint(b.len() as u64, out);
            out.extend_from_slice(b);
        }
        (FieldType::Message(nested), Value::Message(record)) => {
            let mut body = Vec::new();
            encode_into(record, nested, options, &mut body)?;
            encode_varint(tag, out);
            encode_varint(body.len() as u64, out);
            out.extend_from_slice(&body);
        }
        _ => return Err(value_mismatch(field)),
    }

    Ok(())
}

fn value_mismatch(field: &FieldSchema) -> WireError {
    WireError::ValueTypeMismatch {
        number: field.number,
        name: field.name.clone(),
        expected: field.field_type.type_name(),
    }
}

fn is_default(value: &Value) -> bool {
    match value {
        Value::Int(0) | Value::Uint(0) | Value::Bool(false) => true,
        Value::Str(s) => s.is_empty(),
        Value::Bytes(b) => b.is_empty(),
        Value::List(items) => items.is_empty(),
        _ => false,
    }
}

/// Decode a buffer against a schema
///
/// Scans sequentially from offset 0. Known field numbers are checked against
/// their declared wire type and decoded; unknown field numbers are skipped
/// by the wire type's generic length rule. The buffer must end exactly at a
/// tag boundary.
pub fn decode(buf: &[u8], schema: &MessageSchema) -> Result<Record> {
    let mut record = Record::new();
    let mut offset = 0usize;

    while offset < buf.len() {
        let tag_offset = offset;
        let (tag, next) = decode_varint(buf, offset)?;
        offset = next;

        let number = tag >> 3;
        let discriminant = (tag & 0x7) as u8;
        let actual = WireType::from_discriminant(discriminant).ok_or(
            WireError::UnsupportedWireType {
                discriminant,
                offset: tag_offset,
            },
        )?;

        let field = u32::try_from(number).ok().and_then(|n| schema.get(n));
        match field {
            Some(field) => {
                let expected = field.wire_type();
                if expected != actual {
                    return Err(WireError::WireTypeMismatch {
                        number: field.number,
                        expected,
                        actual,
                    });
                }
                let (value, next) = decode_payload(buf, offset, field)?;
                offset = next;
                if field.repeated {
                    record.push(field.number, value);
                } else {
                    // Last occurrence wins for singular fields.
                    record.set(field.number, value);
                }
            }
            None => {
                trace!(number, %actual, "skipping unknown field");
                offset = skip_payload(buf, offset, actual)?;
            }
        }
    }

    Ok(record)
}

fn decode_payload(buf: &[u8], offset: usize, field: &FieldSchema) -> Result<(Value, usize)> {
    match &field.field_type {
        FieldType::Int32 => {
            let (raw, next) = decode_varint(buf, offset)?;
            Ok((Value::Int(i64::from((raw as u32) as i32)), next))
        }
        FieldType::Int64 | FieldType::Enum(_) => {
            let (raw, next) = decode_varint(buf, offset)?;
            Ok((Value::Int(raw as i64), next))
        }
        FieldType::Uint64 => {
            let (raw, next) = decode_varint(buf, offset)?;
            Ok((Value::Uint(raw), next))
        }
        FieldType::Bool => {
            let (raw, next) = decode_varint(buf, offset)?;
            Ok((Value::Bool(raw != 0), next))
        }
        FieldType::String => {
            let (payload, next) = take_delimited(buf, offset)?;
            let s = std::str::from_utf8(payload)
                .map_err(|_| WireError::InvalidUtf8 {
                    number: field.number,
                })?
                .to_string();
            Ok((Value::Str(s), next))
        }
        FieldType::Bytes => {
            let (payload, next) = take_delimited(buf, offset)?;
            Ok((Value::Bytes(payload.to_vec()), next))
        }
        FieldType::Message(nested) => {
            let (payload, next) = take_delimited(buf, offset)?;
            let record = decode(payload, nested)?;
            Ok((Value::Message(record), next))
        }
    }
}

/// Read a length prefix and return the payload slice it delimits
fn take_delimited(buf: &[u8], offset: usize) -> Result<(&[u8], usize)> {
    let (len, start) = decode_varint(buf, offset)?;
    let len = usize::try_from(len).map_err(|_| WireError::TruncatedBuffer {
        offset: buf.len(),
    })?;
    let end = start.checked_add(len).ok_or(WireError::TruncatedBuffer {
        offset: buf.len(),
    })?;
    if end > buf.len() {
        return Err(WireError::TruncatedBuffer { offset: buf.len() });
    }
    Ok((&buf[start..end], end))
}

/// Consume and discard one payload by the wire type's generic length rule
fn skip_payload(buf: &[u8], offset: usize, wire_type: WireType) -> Result<usize> {
    match wire_type {
        WireType::Varint => {
            let (_, next) = decode_varint(buf, offset)?;
            Ok(next)
        }
        WireType::LengthDelimited => {
            let (_, next) = take_delimited(buf, offset)?;
            Ok(next)
        }
    }
}
