//! Round-trip conversion between event trees and transfer records.

use std::sync::{Arc, LazyLock};

use crate::error::{CodecError, ResolutionReason};
use crate::registry::Registry;
use crate::schema::{validate, EventVariant};
use crate::transfer::{Tag, TaggedRecord, TransferRecord};
use crate::types::DpEvent;

/// Nesting bound suggested for records from untrusted sources.
///
/// The default codec is uncapped; callers opt in with
/// [`CodecConfig::with_max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

static DEFAULT_CODEC: LazyLock<Codec> = LazyLock::new(Codec::default);

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecConfig {
    /// Deepest nesting a record may have; the root is depth 1. `None`
    /// accepts any depth, so every encoded tree decodes.
    pub max_depth: Option<usize>,

    /// Reject integers supplied for float fields.
    pub strict_numbers: bool,
}

impl CodecConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_strict_numbers(mut self, strict: bool) -> Self {
        self.strict_numbers = strict;
        self
    }
}

/// Converts events to transfer records and back.
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<Registry>,
    config: CodecConfig,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(Registry::catalog(), CodecConfig::default())
    }
}

impl Codec {
    pub fn new(registry: Arc<Registry>, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    /// A codec over the catalog registry with the given settings.
    pub fn with_config(config: CodecConfig) -> Self {
        Self::new(Registry::catalog(), config)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encodes an event tree depth-first.
    pub fn encode(&self, event: &DpEvent) -> Result<TransferRecord, CodecError> {
        event.encode_node()
    }

    /// Decodes a record, resolving each node through the registry.
    pub fn decode<R: TaggedRecord + ?Sized>(&self, record: &R) -> Result<DpEvent, CodecError> {
        DecodeContext {
            codec: self,
            depth: 1,
        }
        .decode_record(record)
    }
}

/// Encodes with the shared catalog codec.
pub fn encode(event: &DpEvent) -> Result<TransferRecord, CodecError> {
    DEFAULT_CODEC.encode(event)
}

/// Decodes with the shared catalog codec.
pub fn decode<R: TaggedRecord + ?Sized>(record: &R) -> Result<DpEvent, CodecError> {
    DEFAULT_CODEC.decode(record)
}

/// Encodes one concrete variant value.
///
/// The variant's field table is validated before any field is read.
pub fn encode_variant<V: EventVariant>(variant: &V) -> Result<TransferRecord, CodecError> {
    validate::<V>()?;

    let values = variant.encode_fields()?;
    debug_assert_eq!(values.len(), V::FIELDS.len());

    let mut record = TransferRecord::new(V::NAMESPACE, V::TYPE_TAG);
    for (spec, value) in V::FIELDS.iter().zip(values) {
        record.push_field(spec.name, value);
    }
    tracing::trace!(type_tag = V::TYPE_TAG, fields = V::FIELDS.len(), "encoded event");
    Ok(record)
}

/// Position of the decoder within a record tree.
#[derive(Clone, Copy)]
pub struct DecodeContext<'a> {
    codec: &'a Codec,
    depth: usize,
}

impl<'a> DecodeContext<'a> {
    pub fn config(&self) -> &'a CodecConfig {
        &self.codec.config
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn nested(self) -> Self {
        Self {
            codec: self.codec,
            depth: self.depth + 1,
        }
    }

    pub(crate) fn decode_record<R: TaggedRecord + ?Sized>(self, record: &R) -> Result<DpEvent, CodecError> {
        if let Some(limit) = self.codec.config.max_depth {
            if self.depth > limit {
                tracing::debug!(limit, "record nesting too deep");
                return Err(CodecError::DepthLimitExceeded { limit });
            }
        }

        let (namespace, type_tag) = tag_pair(record.namespace_tag(), record.type_tag())?;
        let entry = self.codec.registry.resolve(namespace, type_tag).inspect_err(|err| {
            tracing::debug!(error = %err, "event type resolution failed");
        })?;

        let event = entry.reconstruct(record.field_entries(), self)?;
        tracing::trace!(type_tag, depth = self.depth, "decoded event");
        Ok(event)
    }
}

fn tag_pair<'r>(namespace: &'r Tag, type_tag: &'r Tag) -> Result<(&'r str, &'r str), CodecError> {
    match (namespace.to_text(), type_tag.to_text()) {
        (Ok(namespace), Ok(type_tag)) => Ok((namespace, type_tag)),
        _ => Err(CodecError::ResolutionFailure {
            namespace: namespace.to_text_lossy().into_owned(),
            type_tag: type_tag.to_text_lossy().into_owned(),
            reason: ResolutionReason::InvalidUtf8,
        }),
    }
}
