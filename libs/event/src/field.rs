//! Per-field conversion between event field types and transfer values.

use crate::codec::DecodeContext;
use crate::error::{CodecError, ReconstructionError};
use crate::schema::FieldKind;
use crate::transfer::{TransferRecord, TransferValue};
use crate::types::{DpEvent, StepCounts};

/// A type that can appear as a field of an event variant.
pub trait FieldCodec: Sized {
    /// The shape this type takes in a transfer record.
    const KIND: FieldKind;

    fn encode_value(&self) -> Result<TransferValue, CodecError>;

    fn decode_value(value: &TransferValue, slot: &FieldSlot<'_>) -> Result<Self, CodecError>;

    /// Pushes any nested events held by this field, in order.
    fn collect_events<'a>(&'a self, _out: &mut Vec<&'a DpEvent>) {}
}

/// The field currently being decoded, with the context needed to recurse.
pub struct FieldSlot<'a> {
    type_tag: &'static str,
    name: &'static str,
    cx: DecodeContext<'a>,
}

impl FieldSlot<'_> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Builds the mismatch error for this field.
    pub fn mismatch(&self, expected: FieldKind, found: impl Into<String>) -> CodecError {
        CodecError::reconstruction(
            self.type_tag,
            ReconstructionError::TypeMismatch {
                field: self.name.to_string(),
                expected,
                found: found.into(),
            },
        )
    }

    /// Decodes a nested record one level deeper.
    pub fn decode_event(&self, record: &TransferRecord) -> Result<DpEvent, CodecError> {
        self.cx.nested().decode_record(record)
    }

    pub fn strict_numbers(&self) -> bool {
        self.cx.config().strict_numbers
    }
}

/// Named fields of one record, consumed as the variant is rebuilt.
pub struct FieldReader<'a> {
    type_tag: &'static str,
    entries: Vec<(&'a str, &'a TransferValue)>,
    cx: DecodeContext<'a>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(
        type_tag: &'static str,
        fields: &'a [(String, TransferValue)],
        cx: DecodeContext<'a>,
    ) -> Result<Self, CodecError> {
        let mut entries: Vec<(&'a str, &'a TransferValue)> = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            if entries.iter().any(|(seen, _)| *seen == name.as_str()) {
                return Err(CodecError::reconstruction(
                    type_tag,
                    ReconstructionError::DuplicateField(name.clone()),
                ));
            }
            entries.push((name.as_str(), value));
        }
        Ok(Self {
            type_tag,
            entries,
            cx,
        })
    }

    /// Removes the named field and decodes it as `T`.
    pub fn take<T: FieldCodec>(&mut self, name: &'static str) -> Result<T, CodecError> {
        let pos = self
            .entries
            .iter()
            .position(|(key, _)| *key == name)
            .ok_or_else(|| {
                CodecError::reconstruction(
                    self.type_tag,
                    ReconstructionError::MissingField(name.to_string()),
                )
            })?;
        let (_, value) = self.entries.remove(pos);
        let slot = FieldSlot {
            type_tag: self.type_tag,
            name,
            cx: self.cx,
        };
        T::decode_value(value, &slot)
    }

    /// Like [`take`](Self::take), but an absent field yields `default`.
    ///
    /// A field that is present is still type-checked.
    pub fn take_or<T: FieldCodec>(&mut self, name: &'static str, default: T) -> Result<T, CodecError> {
        if self.entries.iter().any(|(key, _)| *key == name) {
            self.take(name)
        } else {
            Ok(default)
        }
    }

    /// Fails if any field was left unconsumed.
    pub fn finish(&self) -> Result<(), CodecError> {
        match self.entries.first() {
            Some((name, _)) => Err(CodecError::reconstruction(
                self.type_tag,
                ReconstructionError::UnexpectedField(name.to_string()),
            )),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Scalars
// =============================================================================

impl FieldCodec for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn encode_value(&self) -> Result<TransferValue, CodecError> {
        Ok(TransferValue::Float(*self))
    }

    fn decode_value(value: &TransferValue, slot: &FieldSlot<'_>) -> Result<Self, CodecError> {
        match value {
            TransferValue::Float(v) => Ok(*v),
            TransferValue::Int(v) if !slot.strict_numbers() => Ok(*v as f64),
            other => Err(slot.mismatch(Self::KIND, other.kind_name())),
        }
    }
}

impl FieldCodec for i64 {
    const KIND: FieldKind = FieldKind::Int;

    fn encode_value(&self) -> Result<TransferValue, CodecError> {
        Ok(TransferValue::Int(*self))
    }

    fn decode_value(value: &TransferValue, slot: &FieldSlot<'_>) -> Result<Self, CodecError> {
        match value {
            TransferValue::Int(v) => Ok(*v),
            other => Err(slot.mismatch(Self::KIND, other.kind_name())),
        }
    }
}

impl FieldCodec for StepCounts {
    const KIND: FieldKind = FieldKind::IntOrIntList;

    fn encode_value(&self) -> Result<TransferValue, CodecError> {
        Ok(match self {
            StepCounts::Single(n) => TransferValue::Int(*n),
            StepCounts::PerTree(counts) => {
                TransferValue::Seq(counts.iter().map(|n| TransferValue::Int(*n)).collect())
            }
        })
    }

    fn decode_value(value: &TransferValue, slot: &FieldSlot<'_>) -> Result<Self, CodecError> {
        match value {
            TransferValue::Int(n) => Ok(StepCounts::Single(*n)),
            TransferValue::Seq(items) => items
                .iter()
                .map(|item| match item {
                    TransferValue::Int(n) => Ok(*n),
                    other => Err(slot.mismatch(Self::KIND, format!("sequence of {}", other.kind_name()))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(StepCounts::PerTree),
            other => Err(slot.mismatch(Self::KIND, other.kind_name())),
        }
    }
}

// =============================================================================
// Nested events
// =============================================================================

impl FieldCodec for Box<DpEvent> {
    const KIND: FieldKind = FieldKind::Event;

    fn encode_value(&self) -> Result<TransferValue, CodecError> {
        self.encode_node().map(TransferValue::Record)
    }

    fn decode_value(value: &TransferValue, slot: &FieldSlot<'_>) -> Result<Self, CodecError> {
        match value {
            TransferValue::Record(record) => slot.decode_event(record).map(Box::new),
            other => Err(slot.mismatch(Self::KIND, other.kind_name())),
        }
    }

    fn collect_events<'a>(&'a self, out: &mut Vec<&'a DpEvent>) {
        out.push(&**self);
    }
}

impl FieldCodec for Vec<DpEvent> {
    const KIND: FieldKind = FieldKind::EventList;

    fn encode_value(&self) -> Result<TransferValue, CodecError> {
        self.iter()
            .map(|event| event.encode_node().map(TransferValue::Record))
            .collect::<Result<Vec<_>, _>>()
            .map(TransferValue::Seq)
    }

    fn decode_value(value: &TransferValue, slot: &FieldSlot<'_>) -> Result<Self, CodecError> {
        match value {
            TransferValue::Seq(items) => items
                .iter()
                .map(|item| match item {
                    TransferValue::Record(record) => slot.decode_event(record),
                    other => Err(slot.mismatch(Self::KIND, format!("sequence of {}", other.kind_name()))),
                })
                .collect(),
            other => Err(slot.mismatch(Self::KIND, other.kind_name())),
        }
    }

    fn collect_events<'a>(&'a self, out: &mut Vec<&'a DpEvent>) {
        out.extend(self.iter());
    }
}
