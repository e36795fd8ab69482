//! Tagwire
//!
//! A schema-driven, tagged-field binary codec: given a runtime description
//! of named, typed, numbered fields, it encodes a structured record into a
//! compact buffer and decodes the buffer back into an equivalent record.
//!
//! ## Features
//!
//! - **Deterministic Encoding**: fields emit in ascending number order, so
//!   equal records always produce byte-equal buffers
//! - **Forward Compatibility**: unknown field numbers are skipped by wire
//!   type, never rejected
//! - **Nested Messages & Repeated Fields**: length-delimited recursion and
//!   order-preserving repetition
//! - **JSON Interchange**: field-name keyed rendering with enum symbols,
//!   over the same record model
//! - **Compatibility Checking**: automated detection of field numbers
//!   reassigned to a different type between schema revisions
//!
//! ## Wire format
//!
//! ```text
//! buffer    := field*
//! field     := tag payload
//! tag       := varint( field_number << 3 | wire_type )
//! payload   := varint                  (wire type 0)
//!            | varint(len) byte{len}   (wire type 2)
//! ```
//!
//! Schemas are plain runtime objects, built in code or loaded from JSON.
//! There is no code generation step; generic encode/decode routines consult
//! the schema directly.

pub mod codec;
pub mod compat;
pub mod error;
pub mod fingerprint;
pub mod json;
pub mod schema;
pub mod value;
pub mod varint;

pub use codec::{decode, encode, encode_with, EncodeOptions};
pub use compat::{
    check_compatibility, CompatibilityIssue, CompatibilityLevel, CompatibilityReport,
};
pub use error::{Result, WireError};
pub use fingerprint::Fingerprint;
pub use json::{from_json, to_json};
pub use schema::{EnumSchema, FieldSchema, FieldType, MessageSchema, WireType};
pub use value::{Record, Value};
