//! Schema compatibility checking
//!
//! Field numbers, once encoded into any persisted buffer, must never be
//! reassigned to a different semantic type; violating this silently corrupts
//! decoded data rather than raising an error. The codec has no notion of
//! previously used numbers across calls, so this module makes the rule
//! auditable: given two revisions of a schema, it reports every reassigned
//! number as a breaking issue. Encode/decode never consult it.

use tracing::warn;

use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::schema::{FieldType, MessageSchema};

/// Overall verdict of a compatibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityLevel {
    /// Old buffers decode correctly under the new schema
    Compatible,
    /// At least one field number changed meaning
    Breaking,
}

/// A specific breaking change found during checking
#[derive(Debug, Clone, PartialEq)]
pub enum CompatibilityIssue {
    /// A field number was reassigned to a different semantic type
    TypeReassigned {
        number: u32,
        name: String,
        old_type: String,
        new_type: String,
    },
    /// A field changed between singular and repeated
    LabelChanged { number: u32, name: String },
}

/// Result of a compatibility check
#[derive(Debug)]
pub struct CompatibilityReport {
    pub level: CompatibilityLevel,
    pub issues: Vec<CompatibilityIssue>,
    pub warnings: Vec<String>,
}

impl CompatibilityReport {
    fn compatible() -> Self {
        Self {
            level: CompatibilityLevel::Compatible,
            issues: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.level == CompatibilityLevel::Compatible
    }

    fn add_issue(&mut self, issue: CompatibilityIssue) {
        self.level = CompatibilityLevel::Breaking;
        self.issues.push(issue);
    }

    fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    fn merge(&mut self, other: CompatibilityReport) {
        if other.level == CompatibilityLevel::Breaking {
            self.level = CompatibilityLevel::Breaking;
        }
        self.issues.extend(other.issues);
        self.warnings.extend(other.warnings);
    }
}

/// Check whether `new` can safely decode buffers produced under `old`
///
/// - Reassigning a field number to a different semantic type is breaking
/// - Changing a field between singular and repeated is breaking
/// - Removing a field is a warning: old buffers still decode, the decoder
///   skips the orphaned number and its data is dropped
/// - Renaming a field is a warning: wire-compatible, but JSON interchange
///   keyed by name will not line up
/// - Adding a field is compatible by the forward-compatibility policy
pub fn check_compatibility(old: &MessageSchema, new: &MessageSchema) -> Result<CompatibilityReport> {
    // Identical schemas need no field walk.
    if Fingerprint::of_schema(old)? == Fingerprint::of_schema(new)? {
        return Ok(CompatibilityReport::compatible());
    }
    Ok(check_fields(old, new))
}

fn check_fields(old: &MessageSchema, new: &MessageSchema) -> CompatibilityReport {
    let mut report = CompatibilityReport::compatible();

    for old_field in old.fields() {
        let Some(new_field) = new.get(old_field.number) else {
            report.add_warning(format!(
                "field {} ('{}') was removed; its data is dropped on decode",
                old_field.number, old_field.name
            ));
            continue;
        };

        match (&old_field.field_type, &new_field.field_type) {
            // Nested messages compare structurally, not by name.
            (FieldType::Message(old_nested), FieldType::Message(new_nested)) => {
                report.merge(check_fields(old_nested, new_nested));
            }
            (old_type, new_type) => {
                if !same_semantic_type(old_type, new_type) {
                    let issue = CompatibilityIssue::TypeReassigned {
                        number: old_field.number,
                        name: new_field.name.clone(),
                        old_type: old_type.type_name(),
                        new_type: new_type.type_name(),
                    };
                    warn!(
                        number = old_field.number,
                        old = %old_type.type_name(),
                        new = %new_type.type_name(),
                        "field number reassigned to a different type"
                    );
                    report.add_issue(issue);
                }
            }
        }

        if old_field.repeated != new_field.repeated {
            report.add_issue(CompatibilityIssue::LabelChanged {
                number: old_field.number,
                name: new_field.name.clone(),
            });
        }

        if old_field.name != new_field.name {
            report.add_warning(format!(
                "field {} renamed from '{}' to '{}'; JSON interchange will not line up",
                old_field.number, old_field.name, new_field.name
            ));
        }
    }

    for new_field in new.fields() {
        if old.get(new_field.number).is_none() {
            report.add_warning(format!(
                "field {} ('{}') was added",
                new_field.number, new_field.name
            ));
        }
    }

    report
}

/// Enum symbol sets may evolve freely; only the scalar kind is load-bearing
fn same_semantic_type(old: &FieldType, new: &FieldType) -> bool {
    match (old, new) {
        (FieldType::Enum(_), FieldType::Enum(_)) => true,
        (a, b) => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumSchema, FieldSchema};

    fn v1() -> MessageSchema {
        MessageSchema::new("user")
            .field(FieldSchema::int32(1, "id"))
            .unwrap()
            .field(FieldSchema::string(2, "name"))
            .unwrap()
    }

    #[test]
    fn test_identical_schemas_compatible() {
        let report = check_compatibility(&v1(), &v1()).unwrap();
        assert!(report.is_compatible());
        assert!(report.issues.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_added_field_compatible_with_warning() {
        let v2 = v1().field(FieldSchema::uint64(3, "session")).unwrap();
        let report = check_compatibility(&v1(), &v2).unwrap();
        assert!(report.is_compatible());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_type_reassignment_breaking() {
        let v2 = MessageSchema::new("user")
            .field(FieldSchema::string(1, "id"))
            .unwrap()
            .field(FieldSchema::string(2, "name"))
            .unwrap();

        let report = check_compatibility(&v1(), &v2).unwrap();
        assert!(!report.is_compatible());
        assert!(matches!(
            report.issues[0],
            CompatibilityIssue::TypeReassigned { number: 1, .. }
        ));
    }

    #[test]
    fn test_label_change_breaking() {
        let v2 = MessageSchema::new("user")
            .field(FieldSchema::int32(1, "id"))
            .unwrap()
            .field(FieldSchema::string(2, "name").repeated())
            .unwrap();

        let report = check_compatibility(&v1(), &v2).unwrap();
        assert!(!report.is_compatible());
        assert!(matches!(
            report.issues[0],
            CompatibilityIssue::LabelChanged { number: 2, .. }
        ));
    }

    #[test]
    fn test_removed_and_renamed_fields_warn() {
        let v2 = MessageSchema::new("user")
            .field(FieldSchema::int32(1, "user_id"))
            .unwrap();

        let report = check_compatibility(&v1(), &v2).unwrap();
        assert!(report.is_compatible());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_enum_symbol_evolution_compatible() {
        let old_level = EnumSchema::new("level").symbol("INFO", 0).unwrap();
        let new_level = EnumSchema::new("level")
            .symbol("INFO", 0)
            .unwrap()
            .symbol("WARN", 1)
            .unwrap();

        let old = MessageSchema::new("event")
            .field(FieldSchema::enumeration(1, "level", old_level))
            .unwrap();
        let new = MessageSchema::new("event")
            .field(FieldSchema::enumeration(1, "level", new_level))
            .unwrap();

        let report = check_compatibility(&old, &new).unwrap();
        assert!(report.is_compatible());
    }

    #[test]
    fn test_nested_message_checked_structurally() {
        let old_point = MessageSchema::new("point")
            .field(FieldSchema::int32(1, "x"))
            .unwrap();
        let new_point = MessageSchema::new("point")
            .field(FieldSchema::string(1, "x"))
            .unwrap();

        let old = MessageSchema::new("shape")
            .field(FieldSchema::message(1, "origin", old_point))
            .unwrap();
        let new = MessageSchema::new("shape")
            .field(FieldSchema::message(1, "origin", new_point))
            .unwrap();

        let report = check_compatibility(&old, &new).unwrap();
        assert!(!report.is_compatible());
    }
}
