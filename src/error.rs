//! Error types for the wire codec

use thiserror::Error;

use crate::schema::WireType;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, WireError>;

/// Wire codec errors
#[derive(Error, Debug)]
pub enum WireError {
    #[error("malformed varint at offset {offset}: continuation chain exceeds 64 bits")]
    MalformedVarint { offset: usize },

    #[error("truncated buffer: input ends at offset {offset} before the field is complete")]
    TruncatedBuffer { offset: usize },

    #[error("wire type mismatch for field {number}: schema declares {expected}, buffer has {actual}")]
    WireTypeMismatch {
        number: u32,
        expected: WireType,
        actual: WireType,
    },

    #[error("unsupported wire type {discriminant} in tag at offset {offset}")]
    UnsupportedWireType { discriminant: u8, offset: usize },

    #[error("duplicate field number {number} in message '{message}'")]
    DuplicateFieldNumber { message: String, number: u32 },

    #[error("invalid field number {number} in message '{message}': field numbers must be positive")]
    InvalidFieldNumber { message: String, number: u32 },

    #[error("record sets field number {number}, which message '{message}' does not declare")]
    UnknownField { message: String, number: u32 },

    #[error("value for field {number} ('{name}') does not match its declared type {expected}")]
    ValueTypeMismatch {
        number: u32,
        name: String,
        expected: String,
    },

    #[error("field {number} payload is not valid UTF-8")]
    InvalidUtf8 { number: u32 },

    #[error("duplicate symbol '{symbol}' in enum '{name}'")]
    DuplicateEnumSymbol { name: String, symbol: String },

    #[error("message '{message}' has no field named '{name}'")]
    UnknownFieldName { message: String, name: String },

    #[error("enum '{name}' has no symbol '{symbol}'")]
    UnknownEnumSymbol { name: String, symbol: String },

    #[error("JSON value for field '{name}' has the wrong shape: expected {expected}")]
    JsonTypeMismatch { name: String, expected: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
