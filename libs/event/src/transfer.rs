//! The transfer representation - a flat, self-describing record of an event tree.
//!
//! A [`TransferRecord`] holds two identity tags followed by the variant's
//! fields in declaration order. Nested events are stored as nested records,
//! so a consumer can walk the tree without linking against the catalog types.
//!
//! The serde projection writes a record as a map with the keys `namespace`,
//! `type_tag`, then one key per field. Reading preserves document order.

use std::borrow::Cow;
use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CodecError;

/// Key of the namespace tag in a projected record.
pub const NAMESPACE_KEY: &str = "namespace";

/// Key of the type tag in a projected record.
pub const TYPE_TAG_KEY: &str = "type_tag";

/// An identity tag, delivered either as text or as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Text(String),
    Bytes(Vec<u8>),
}

impl Tag {
    /// Decodes the tag to text.
    pub fn to_text(&self) -> Result<&str, std::str::Utf8Error> {
        match self {
            Tag::Text(s) => Ok(s),
            Tag::Bytes(b) => std::str::from_utf8(b),
        }
    }

    /// Text form for diagnostics; invalid bytes are replaced.
    pub fn to_text_lossy(&self) -> Cow<'_, str> {
        match self {
            Tag::Text(s) => Cow::Borrowed(s),
            Tag::Bytes(b) => String::from_utf8_lossy(b),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text_lossy())
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Tag::Text(s.to_string())
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Tag::Text(s)
    }
}

impl From<Vec<u8>> for Tag {
    fn from(b: Vec<u8>) -> Self {
        Tag::Bytes(b)
    }
}

impl From<&[u8]> for Tag {
    fn from(b: &[u8]) -> Self {
        Tag::Bytes(b.to_vec())
    }
}

/// A single field value inside a transfer record.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferValue {
    Int(i64),
    Float(f64),
    Text(String),
    /// Raw bytes. JSON has no byte type, so the JSON projection writes an
    /// array of integers and reads it back as `Seq` of `Int`.
    Bytes(Vec<u8>),
    Record(TransferRecord),
    Seq(Vec<TransferValue>),
}

impl TransferValue {
    /// Short name of the value's shape, used in mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TransferValue::Int(_) => "int",
            TransferValue::Float(_) => "float",
            TransferValue::Text(_) => "text",
            TransferValue::Bytes(_) => "bytes",
            TransferValue::Record(_) => "record",
            TransferValue::Seq(_) => "sequence",
        }
    }

    pub fn as_record(&self) -> Option<&TransferRecord> {
        match self {
            TransferValue::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Path suffix to the first NaN or infinite float inside this value.
    fn non_finite_path(&self) -> Option<String> {
        match self {
            TransferValue::Float(v) if !v.is_finite() => Some(String::new()),
            TransferValue::Record(record) => record.non_finite_path().map(|path| format!(".{}", path)),
            TransferValue::Seq(items) => items.iter().enumerate().find_map(|(i, item)| {
                item.non_finite_path().map(|path| format!("[{}]{}", i, path))
            }),
            _ => None,
        }
    }
}

impl From<i64> for TransferValue {
    fn from(v: i64) -> Self {
        TransferValue::Int(v)
    }
}

impl From<f64> for TransferValue {
    fn from(v: f64) -> Self {
        TransferValue::Float(v)
    }
}

impl From<TransferRecord> for TransferValue {
    fn from(record: TransferRecord) -> Self {
        TransferValue::Record(record)
    }
}

/// Access to the identity tags and fields of a transfer record.
///
/// Decoding is generic over this trait, so the only values it accepts are
/// ones that declare the record shape at compile time.
pub trait TaggedRecord {
    fn namespace_tag(&self) -> &Tag;

    fn type_tag(&self) -> &Tag;

    /// Fields other than the two tags, in record order.
    fn field_entries(&self) -> &[(String, TransferValue)];
}

/// The transfer form of one event node.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    namespace: Tag,
    type_tag: Tag,
    fields: Vec<(String, TransferValue)>,
}

impl TransferRecord {
    /// Creates a record with no fields.
    pub fn new(namespace: impl Into<Tag>, type_tag: impl Into<Tag>) -> Self {
        Self {
            namespace: namespace.into(),
            type_tag: type_tag.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field, keeping insertion order.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<TransferValue>) -> Self {
        self.push_field(name, value);
        self
    }

    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<TransferValue>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn namespace(&self) -> &Tag {
        &self.namespace
    }

    pub fn type_tag(&self) -> &Tag {
        &self.type_tag
    }

    pub fn fields(&self) -> &[(String, TransferValue)] {
        &self.fields
    }

    /// Looks up the first field with the given name.
    pub fn field(&self, name: &str) -> Option<&TransferValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Projects the record to a JSON string.
    ///
    /// Fails with [`CodecError::NonFiniteFloat`] if any float is NaN or
    /// infinite. `Bytes` values come back from JSON as sequences of integers.
    pub fn to_json(&self) -> Result<String, CodecError> {
        self.check_json_floats()?;
        Ok(serde_json::to_string(self)?)
    }

    /// Projects the record to an indented JSON string.
    pub fn to_json_pretty(&self) -> Result<String, CodecError> {
        self.check_json_floats()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn check_json_floats(&self) -> Result<(), CodecError> {
        match self.non_finite_path() {
            Some(field) => Err(CodecError::NonFiniteFloat { field }),
            None => Ok(()),
        }
    }

    /// Dotted path to the first NaN or infinite float, e.g. `events[1].noise_multiplier`.
    fn non_finite_path(&self) -> Option<String> {
        self.fields.iter().find_map(|(name, value)| {
            value
                .non_finite_path()
                .map(|rest| format!("{}{}", name, rest))
        })
    }

    /// Reads a record from its JSON projection.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TaggedRecord for TransferRecord {
    fn namespace_tag(&self) -> &Tag {
        &self.namespace
    }

    fn type_tag(&self) -> &Tag {
        &self.type_tag
    }

    fn field_entries(&self) -> &[(String, TransferValue)] {
        &self.fields
    }
}

// =============================================================================
// Serde projection
// =============================================================================

impl Serialize for Tag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Tag::Text(s) => serializer.serialize_str(s),
            Tag::Bytes(b) => serializer.serialize_bytes(b),
        }
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TagVisitor;

        impl<'de> Visitor<'de> for TagVisitor {
            type Value = Tag;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or a byte sequence")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Tag, E> {
                Ok(Tag::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Tag, E> {
                Ok(Tag::Text(v))
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Tag, E> {
                Ok(Tag::Bytes(v.to_vec()))
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Tag, E> {
                Ok(Tag::Bytes(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Tag, A::Error> {
                let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(byte) = seq.next_element::<u8>()? {
                    bytes.push(byte);
                }
                Ok(Tag::Bytes(bytes))
            }
        }

        deserializer.deserialize_any(TagVisitor)
    }
}

impl Serialize for TransferValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TransferValue::Int(v) => serializer.serialize_i64(*v),
            TransferValue::Float(v) => serializer.serialize_f64(*v),
            TransferValue::Text(v) => serializer.serialize_str(v),
            TransferValue::Bytes(v) => serializer.serialize_bytes(v),
            TransferValue::Record(record) => record.serialize(serializer),
            TransferValue::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl Serialize for TransferRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        map.serialize_entry(NAMESPACE_KEY, &self.namespace)?;
        map.serialize_entry(TYPE_TAG_KEY, &self.type_tag)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn record_from_map<'de, A: MapAccess<'de>>(mut map: A) -> Result<TransferRecord, A::Error> {
    let mut namespace = None;
    let mut type_tag = None;
    let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));

    while let Some(key) = map.next_key::<String>()? {
        match key.as_str() {
            NAMESPACE_KEY => {
                if namespace.is_some() {
                    return Err(de::Error::duplicate_field(NAMESPACE_KEY));
                }
                namespace = Some(map.next_value::<Tag>()?);
            }
            TYPE_TAG_KEY => {
                if type_tag.is_some() {
                    return Err(de::Error::duplicate_field(TYPE_TAG_KEY));
                }
                type_tag = Some(map.next_value::<Tag>()?);
            }
            _ => {
                let value = map.next_value::<TransferValue>()?;
                fields.push((key, value));
            }
        }
    }

    Ok(TransferRecord {
        namespace: namespace.ok_or_else(|| de::Error::missing_field(NAMESPACE_KEY))?,
        type_tag: type_tag.ok_or_else(|| de::Error::missing_field(TYPE_TAG_KEY))?,
        fields,
    })
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = TransferValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, string, byte sequence, sequence, or tagged record")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TransferValue, E> {
        Ok(TransferValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TransferValue, E> {
        i64::try_from(v)
            .map(TransferValue::Int)
            .map_err(|_| E::custom(format!("integer {} does not fit in i64", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<TransferValue, E> {
        Ok(TransferValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TransferValue, E> {
        Ok(TransferValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<TransferValue, E> {
        Ok(TransferValue::Text(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<TransferValue, E> {
        Ok(TransferValue::Bytes(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<TransferValue, E> {
        Ok(TransferValue::Bytes(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TransferValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<TransferValue>()? {
            items.push(item);
        }
        Ok(TransferValue::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<TransferValue, A::Error> {
        record_from_map(map).map(TransferValue::Record)
    }
}

impl<'de> Deserialize<'de> for TransferValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl<'de> Deserialize<'de> for TransferRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = TransferRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with `namespace` and `type_tag` keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<TransferRecord, A::Error> {
                record_from_map(map)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_key_order() {
        let record = TransferRecord::new("ns.events", "PoissonSampledDpEvent")
            .with_field("sampling_probability", 0.25_f64)
            .with_field(
                "event",
                TransferRecord::new("ns.events", "GaussianDpEvent").with_field("noise_multiplier", 1.0_f64),
            );
        let json = record.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"namespace":"ns.events","type_tag":"PoissonSampledDpEvent","sampling_probability":0.25,"event":{"namespace":"ns.events","type_tag":"GaussianDpEvent","noise_multiplier":1.0}}"#
        );
    }

    #[test]
    fn test_record_json_preserves_document_order() {
        let json = r#"{"type_tag":"T","zeta":1,"namespace":"ns","alpha":[1,2]}"#;
        let record = TransferRecord::from_json(json).unwrap();
        assert_eq!(record.namespace(), &Tag::from("ns"));
        assert_eq!(record.type_tag(), &Tag::from("T"));
        let names: Vec<&str> = record.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(
            record.field("alpha"),
            Some(&TransferValue::Seq(vec![TransferValue::Int(1), TransferValue::Int(2)]))
        );
    }

    #[test]
    fn test_int_and_float_stay_distinct() {
        let record = TransferRecord::from_json(r#"{"namespace":"ns","type_tag":"T","a":3,"b":3.0,"c":-4}"#).unwrap();
        assert_eq!(record.field("a"), Some(&TransferValue::Int(3)));
        assert_eq!(record.field("b"), Some(&TransferValue::Float(3.0)));
        assert_eq!(record.field("c"), Some(&TransferValue::Int(-4)));
    }

    #[test]
    fn test_non_finite_float_path() {
        let record = TransferRecord::new("ns", "ComposedDpEvent").with_field(
            "events",
            TransferValue::Seq(vec![
                TransferRecord::new("ns", "GaussianDpEvent").with_field("noise_multiplier", 1.0_f64).into(),
                TransferRecord::new("ns", "GaussianDpEvent").with_field("noise_multiplier", f64::NAN).into(),
            ]),
        );
        assert_eq!(
            record.to_json_pretty().unwrap_err(),
            CodecError::NonFiniteFloat {
                field: "events[1].noise_multiplier".to_string()
            }
        );
    }

    #[test]
    fn test_bytes_read_back_as_int_sequence() {
        let record = TransferRecord::new("ns", "T").with_field("raw", TransferValue::Bytes(vec![7, 255]));
        let json = record.to_json().unwrap();
        assert_eq!(json, r#"{"namespace":"ns","type_tag":"T","raw":[7,255]}"#);

        let back = TransferRecord::from_json(&json).unwrap();
        assert_eq!(
            back.field("raw"),
            Some(&TransferValue::Seq(vec![TransferValue::Int(7), TransferValue::Int(255)]))
        );
    }

    #[test]
    fn test_tags_accept_byte_arrays() {
        let record = TransferRecord::from_json(r#"{"namespace":[110,115],"type_tag":"T"}"#).unwrap();
        assert_eq!(record.namespace(), &Tag::Bytes(b"ns".to_vec()));
        assert_eq!(record.namespace().to_text().unwrap(), "ns");
    }

    #[test]
    fn test_missing_tag_rejected() {
        let err = TransferRecord::from_json(r#"{"namespace":"ns","count":1}"#).unwrap_err();
        assert!(err.to_string().contains("type_tag"));
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let err = TransferRecord::from_json(r#"{"namespace":"ns","type_tag":"A","type_tag":"B"}"#).unwrap_err();
        assert!(matches!(err, CodecError::Serialization(_)));
    }

    #[test]
    fn test_oversized_integer_rejected() {
        let err = TransferRecord::from_json(r#"{"namespace":"ns","type_tag":"T","n":18446744073709551615}"#)
            .unwrap_err();
        assert!(err.to_string().contains("does not fit in i64"));
    }

    #[test]
    fn test_invalid_utf8_tag() {
        let tag = Tag::Bytes(vec![0xff, 0xfe]);
        assert!(tag.to_text().is_err());
        assert_eq!(tag.to_text_lossy(), "\u{fffd}\u{fffd}");
    }
}
