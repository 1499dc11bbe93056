//! Static field tables and the structural validator.
//!
//! Every convertible variant publishes its declared fields as a
//! `&'static [FieldSpec]`. The codec walks this table instead of reflecting
//! over the type at runtime, so the table is also what the validator checks
//! before any conversion touches a value.

use std::fmt;

use crate::error::{CodecError, EligibilityRule};
use crate::field::FieldReader;
use crate::transfer::{TransferValue, NAMESPACE_KEY, TYPE_TAG_KEY};

/// Shape of a declared field, as seen by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A floating point scalar.
    Float,
    /// An integer scalar.
    Int,
    /// A single nested event.
    Event,
    /// An ordered sequence of nested events.
    EventList,
    /// Either one integer or an ordered sequence of integers.
    IntOrIntList,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Float => "float",
            FieldKind::Int => "int",
            FieldKind::Event => "event",
            FieldKind::EventList => "event list",
            FieldKind::IntOrIntList => "int or int list",
        };
        write!(f, "{}", s)
    }
}

/// How a field gets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldInit {
    /// Supplied by the caller at construction.
    Constructor,
    /// Computed after construction; such fields cannot be round-tripped.
    Derived,
}

/// One declared field of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub init: FieldInit,
}

impl FieldSpec {
    /// A field supplied at construction.
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            init: FieldInit::Constructor,
        }
    }

    /// A field computed after construction.
    #[must_use]
    pub const fn derived(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            init: FieldInit::Derived,
        }
    }
}

/// A concrete event type that takes part in transfer conversion.
///
/// Catalog implementations are generated by the crate's `dp_events!` macro.
/// The trait is public so other crates can run the validator over their own
/// types and register them in a custom [`Registry`](crate::Registry).
///
/// [`DpEvent`](crate::DpEvent) is a closed sum type: a variant defined
/// outside the catalog has no arm of its own, so its `Into<DpEvent>`
/// conversion cannot carry it in full. Custom registries are therefore for
/// diagnosing eligibility and for tests, not for extending the catalog.
pub trait EventVariant: Sized {
    /// Logical location of the variant's definition.
    const NAMESPACE: &'static str;

    /// The variant's name, unique within its namespace.
    const TYPE_TAG: &'static str;

    /// Declared fields in declaration order.
    const FIELDS: &'static [FieldSpec];

    /// Encodes each declared field, in `FIELDS` order.
    fn encode_fields(&self) -> Result<Vec<TransferValue>, CodecError>;

    /// Rebuilds the variant from named fields.
    fn decode_fields(fields: &mut FieldReader<'_>) -> Result<Self, CodecError>;
}

/// Certifies that `V` can be converted to and from a transfer record.
pub fn validate<V: EventVariant>() -> Result<(), CodecError> {
    validate_fields(V::TYPE_TAG, V::FIELDS)
}

/// Checks a field table against the eligibility rules.
///
/// Fields are checked in declaration order and the first violation is
/// reported.
pub fn validate_fields(type_name: &'static str, fields: &'static [FieldSpec]) -> Result<(), CodecError> {
    for (idx, spec) in fields.iter().enumerate() {
        let rule = if spec.name.starts_with('_') {
            Some(EligibilityRule::PrivateField)
        } else if spec.init == FieldInit::Derived {
            Some(EligibilityRule::ExcludedFromConstructor)
        } else if spec.name == NAMESPACE_KEY || spec.name == TYPE_TAG_KEY {
            Some(EligibilityRule::ReservedName)
        } else if fields[..idx].iter().any(|earlier| earlier.name == spec.name) {
            Some(EligibilityRule::DuplicateField)
        } else {
            None
        };

        if let Some(rule) = rule {
            tracing::debug!(type_name, field = spec.name, %rule, "type rejected by validator");
            return Err(CodecError::IneligibleType {
                type_name,
                field: spec.name,
                rule,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_of(result: Result<(), CodecError>) -> Option<(&'static str, EligibilityRule)> {
        match result {
            Err(CodecError::IneligibleType { field, rule, .. }) => Some((field, rule)),
            _ => None,
        }
    }

    #[test]
    fn test_public_constructor_fields_are_eligible() {
        static FIELDS: &[FieldSpec] = &[
            FieldSpec::new("noise_multiplier", FieldKind::Float),
            FieldSpec::new("step_counts", FieldKind::IntOrIntList),
        ];
        assert!(validate_fields("TreeDpEvent", FIELDS).is_ok());
        assert!(validate_fields("NoOpDpEvent", &[]).is_ok());
    }

    #[test]
    fn test_private_field_rejected() {
        static FIELDS: &[FieldSpec] = &[
            FieldSpec::new("count", FieldKind::Int),
            FieldSpec::new("_scale", FieldKind::Float),
        ];
        assert_eq!(
            rule_of(validate_fields("ScaledDpEvent", FIELDS)),
            Some(("_scale", EligibilityRule::PrivateField))
        );
    }

    #[test]
    fn test_derived_field_rejected() {
        static FIELDS: &[FieldSpec] = &[
            FieldSpec::new("mean", FieldKind::Float),
            FieldSpec::derived("variance", FieldKind::Float),
        ];
        assert_eq!(
            rule_of(validate_fields("SpreadDpEvent", FIELDS)),
            Some(("variance", EligibilityRule::ExcludedFromConstructor))
        );
    }

    #[test]
    fn test_reserved_and_duplicate_names_rejected() {
        static RESERVED: &[FieldSpec] = &[FieldSpec::new("type_tag", FieldKind::Int)];
        assert_eq!(
            rule_of(validate_fields("TaggedDpEvent", RESERVED)),
            Some(("type_tag", EligibilityRule::ReservedName))
        );

        static DUPLICATE: &[FieldSpec] = &[
            FieldSpec::new("count", FieldKind::Int),
            FieldSpec::new("count", FieldKind::Float),
        ];
        assert_eq!(
            rule_of(validate_fields("TwiceDpEvent", DUPLICATE)),
            Some(("count", EligibilityRule::DuplicateField))
        );
    }

    #[test]
    fn test_first_violation_wins() {
        static FIELDS: &[FieldSpec] = &[
            FieldSpec::derived("_both", FieldKind::Int),
            FieldSpec::derived("later", FieldKind::Int),
        ];
        assert_eq!(
            rule_of(validate_fields("BothDpEvent", FIELDS)),
            Some(("_both", EligibilityRule::PrivateField))
        );
    }
}
