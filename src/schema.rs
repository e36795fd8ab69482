//! Schema types and structures
//!
//! A `MessageSchema` is a runtime description of named, typed, numbered
//! fields. It plays the role a generated accessor class would play in a
//! codegen-based pipeline: generic encode/decode routines consult it instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, WireError};

/// On-the-wire payload shape, independent of the field's semantic type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireType {
    /// Base-128 varint payload
    Varint,
    /// Varint length prefix followed by that many raw bytes
    LengthDelimited,
}

impl WireType {
    /// The 3-bit discriminant stored in a tag
    pub fn discriminant(self) -> u8 {
        match self {
            WireType::Varint => 0,
            WireType::LengthDelimited => 2,
        }
    }

    /// Recover a wire type from a tag's low 3 bits
    pub fn from_discriminant(d: u8) -> Option<Self> {
        match d {
            0 => Some(WireType::Varint),
            2 => Some(WireType::LengthDelimited),
            _ => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Varint => write!(f, "VARINT"),
            WireType::LengthDelimited => write!(f, "LENGTH_DELIMITED"),
        }
    }
}

/// Semantic type of a field
///
/// A closed set: scalar kinds, an enum with declared symbols, and a nested
/// message carrying its own schema. The wire class is derived from the
/// variant, never stored separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Int32,
    Int64,
    Uint64,
    Bool,
    String,
    Bytes,
    Enum(EnumSchema),
    Message(MessageSchema),
}

impl FieldType {
    /// Wire class this semantic type encodes with
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldType::Int32
            | FieldType::Int64
            | FieldType::Uint64
            | FieldType::Bool
            | FieldType::Enum(_) => WireType::Varint,
            FieldType::String | FieldType::Bytes | FieldType::Message(_) => {
                WireType::LengthDelimited
            }
        }
    }

    /// Human-readable name, used in error messages and compatibility reports
    pub fn type_name(&self) -> String {
        match self {
            FieldType::Int32 => "int32".to_string(),
            FieldType::Int64 => "int64".to_string(),
            FieldType::Uint64 => "uint64".to_string(),
            FieldType::Bool => "bool".to_string(),
            FieldType::String => "string".to_string(),
            FieldType::Bytes => "bytes".to_string(),
            FieldType::Enum(e) => format!("enum({})", e.name()),
            FieldType::Message(m) => format!("message({})", m.name()),
        }
    }
}

/// A named set of symbol/value pairs for enum-typed fields
///
/// Symbols are only consulted by the JSON interchange layer; on the wire an
/// enum field is a plain varint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumSchema {
    name: String,
    symbols: BTreeMap<String, i64>,
}

impl EnumSchema {
    /// Create an empty enum schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: BTreeMap::new(),
        }
    }

    /// Add a symbol, rejecting duplicates
    pub fn symbol(mut self, symbol: impl Into<String>, value: i64) -> Result<Self> {
        let symbol = symbol.into();
        if self.symbols.contains_key(&symbol) {
            return Err(WireError::DuplicateEnumSymbol {
                name: self.name.clone(),
                symbol,
            });
        }
        self.symbols.insert(symbol, value);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the declared symbol for a value, if any
    pub fn symbol_for(&self, value: i64) -> Option<&str> {
        self.symbols
            .iter()
            .find(|(_, v)| **v == value)
            .map(|(s, _)| s.as_str())
    }

    /// Look up the value for a declared symbol, if any
    pub fn value_for(&self, symbol: &str) -> Option<i64> {
        self.symbols.get(symbol).copied()
    }
}

/// A single field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field number, the stable wire identifier
    pub number: u32,
    /// Field name, used by the JSON interchange layer
    pub name: String,
    /// Semantic type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field holds zero or more values
    #[serde(default, skip_serializing_if = "is_false")]
    pub repeated: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl FieldSchema {
    /// Create a field definition
    pub fn new(number: u32, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            number,
            name: name.into(),
            field_type,
            repeated: false,
        }
    }

    /// Shorthand for an int32 field
    pub fn int32(number: u32, name: impl Into<String>) -> Self {
        Self::new(number, name, FieldType::Int32)
    }

    /// Shorthand for an int64 field
    pub fn int64(number: u32, name: impl Into<String>) -> Self {
        Self::new(number, name, FieldType::Int64)
    }

    /// Shorthand for a uint64 field
    pub fn uint64(number: u32, name: impl Into<String>) -> Self {
        Self::new(number, name, FieldType::Uint64)
    }

    /// Shorthand for a bool field
    pub fn bool(number: u32, name: impl Into<String>) -> Self {
        Self::new(number, name, FieldType::Bool)
    }

    /// Shorthand for a string field
    pub fn string(number: u32, name: impl Into<String>) -> Self {
        Self::new(number, name, FieldType::String)
    }

    /// Shorthand for a bytes field
    pub fn bytes(number: u32, name: impl Into<String>) -> Self {
        Self::new(number, name, FieldType::Bytes)
    }

    /// Shorthand for an enum field
    pub fn enumeration(number: u32, name: impl Into<String>, schema: EnumSchema) -> Self {
        Self::new(number, name, FieldType::Enum(schema))
    }

    /// Shorthand for a nested message field
    pub fn message(number: u32, name: impl Into<String>, schema: MessageSchema) -> Self {
        Self::new(number, name, FieldType::Message(schema))
    }

    /// Mark the field as repeated
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Wire class this field encodes with
    pub fn wire_type(&self) -> WireType {
        self.field_type.wire_type()
    }
}

/// A message definition: an ordered set of fields keyed by field number
///
/// Field number uniqueness is an invariant enforced at construction, both for
/// schemas built in code and for schemas deserialized from JSON. Iteration is
/// always in ascending field number order, which is what gives encoding its
/// deterministic output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MessageSchemaDef", into = "MessageSchemaDef")]
pub struct MessageSchema {
    name: String,
    fields: BTreeMap<u32, FieldSchema>,
}

/// Serialized form of a message schema: a name and a field list
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageSchemaDef {
    name: String,
    fields: Vec<FieldSchema>,
}

impl TryFrom<MessageSchemaDef> for MessageSchema {
    type Error = WireError;

    fn try_from(def: MessageSchemaDef) -> Result<Self> {
        let mut schema = MessageSchema::new(def.name);
        for field in def.fields {
            schema = schema.field(field)?;
        }
        Ok(schema)
    }
}

impl From<MessageSchema> for MessageSchemaDef {
    fn from(schema: MessageSchema) -> Self {
        Self {
            name: schema.name,
            fields: schema.fields.into_values().collect(),
        }
    }
}

impl MessageSchema {
    /// Create an empty message schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field, rejecting number zero and duplicate numbers
    pub fn field(mut self, field: FieldSchema) -> Result<Self> {
        if field.number == 0 {
            return Err(WireError::InvalidFieldNumber {
                message: self.name.clone(),
                number: field.number,
            });
        }
        if self.fields.contains_key(&field.number) {
            return Err(WireError::DuplicateFieldNumber {
                message: self.name.clone(),
                number: field.number,
            });
        }
        self.fields.insert(field.number, field);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a field by number
    pub fn get(&self, number: u32) -> Option<&FieldSchema> {
        self.fields.get(&number)
    }

    /// Look up a field by name
    pub fn get_by_name(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.values().find(|f| f.name == name)
    }

    /// All fields in ascending field number order
    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
