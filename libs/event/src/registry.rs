//! Explicit dispatch table from identity tags to reconstruction functions.
//!
//! Decoding never loads anything by name: a `(namespace, type_tag)` pair
//! resolves only if a variant was registered under it, so the set of types a
//! transfer record can produce is closed and known up front.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::codec::DecodeContext;
use crate::error::{CodecError, ResolutionReason};
use crate::field::FieldReader;
use crate::schema::{validate_fields, EventVariant, FieldSpec};
use crate::transfer::TransferValue;
use crate::types::{register_catalog, DpEvent};

type ReconstructFn = fn(&mut FieldReader<'_>) -> Result<DpEvent, CodecError>;

static CATALOG: LazyLock<Arc<Registry>> =
    LazyLock::new(|| Arc::new(Registry::builder().with_catalog().build()));

/// One registered variant.
#[derive(Clone)]
pub struct RegistryEntry {
    namespace: &'static str,
    type_tag: &'static str,
    fields: &'static [FieldSpec],
    rebuild: ReconstructFn,
}

impl RegistryEntry {
    fn of<V: EventVariant + Into<DpEvent>>() -> Self {
        Self {
            namespace: V::NAMESPACE,
            type_tag: V::TYPE_TAG,
            fields: V::FIELDS,
            rebuild: reconstruct_variant::<V>,
        }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn type_tag(&self) -> &'static str {
        self.type_tag
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Rebuilds the variant; on failure, prefers a validator diagnosis.
    pub(crate) fn reconstruct(
        &self,
        fields: &[(String, TransferValue)],
        cx: DecodeContext<'_>,
    ) -> Result<DpEvent, CodecError> {
        FieldReader::new(self.type_tag, fields, cx)
            .and_then(|mut reader| (self.rebuild)(&mut reader))
            .map_err(|err| self.diagnose(err))
    }

    fn diagnose(&self, err: CodecError) -> CodecError {
        match validate_fields(self.type_tag, self.fields) {
            Err(ineligible) => {
                tracing::debug!(
                    type_tag = self.type_tag,
                    original = %err,
                    "reconstruction failed on an ineligible type"
                );
                ineligible
            }
            Ok(()) => {
                tracing::debug!(type_tag = self.type_tag, error = %err, "reconstruction failed");
                err
            }
        }
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("namespace", &self.namespace)
            .field("type_tag", &self.type_tag)
            .field("fields", &self.fields)
            .finish()
    }
}

fn reconstruct_variant<V: EventVariant + Into<DpEvent>>(
    reader: &mut FieldReader<'_>,
) -> Result<DpEvent, CodecError> {
    let variant = V::decode_fields(reader)?;
    reader.finish()?;
    Ok(variant.into())
}

/// The set of variants a decoder is allowed to produce.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    namespaces: HashMap<&'static str, HashMap<&'static str, RegistryEntry>>,
}

impl Registry {
    /// Creates an empty registry builder.
    ///
    /// Decoding can only produce [`DpEvent`] values, so variants registered
    /// from outside the catalog decode to whatever their `Into<DpEvent>`
    /// yields. Use custom registries for eligibility diagnosis and tests.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The shared registry holding every catalog variant.
    pub fn catalog() -> Arc<Registry> {
        Arc::clone(&CATALOG)
    }

    /// Finds the entry for a tag pair.
    pub fn resolve(&self, namespace: &str, type_tag: &str) -> Result<&RegistryEntry, CodecError> {
        let failure = |reason| CodecError::ResolutionFailure {
            namespace: namespace.to_string(),
            type_tag: type_tag.to_string(),
            reason,
        };
        let types = self
            .namespaces
            .get(namespace)
            .ok_or_else(|| failure(ResolutionReason::UnknownNamespace))?;
        types
            .get(type_tag)
            .ok_or_else(|| failure(ResolutionReason::UnknownTypeTag))
    }

    pub fn contains(&self, namespace: &str, type_tag: &str) -> bool {
        self.resolve(namespace, type_tag).is_ok()
    }

    /// All entries, ordered by namespace then type tag.
    pub fn entries(&self) -> Vec<&RegistryEntry> {
        let mut entries: Vec<&RegistryEntry> =
            self.namespaces.values().flat_map(|types| types.values()).collect();
        entries.sort_by_key(|entry| (entry.namespace, entry.type_tag));
        entries
    }

    pub fn len(&self) -> usize {
        self.namespaces.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, entry: RegistryEntry) -> Option<RegistryEntry> {
        self.namespaces
            .entry(entry.namespace)
            .or_default()
            .insert(entry.type_tag, entry)
    }
}

/// Builder for [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Adds every catalog variant.
    pub fn with_catalog(self) -> Self {
        register_catalog(self)
    }

    /// Adds one variant; fails if its tags are already taken.
    pub fn register<V: EventVariant + Into<DpEvent>>(mut self) -> Result<Self, CodecError> {
        if self.registry.contains(V::NAMESPACE, V::TYPE_TAG) {
            return Err(CodecError::DuplicateRegistration {
                namespace: V::NAMESPACE.to_string(),
                type_tag: V::TYPE_TAG.to_string(),
            });
        }
        self.registry.insert(RegistryEntry::of::<V>());
        Ok(self)
    }

    /// Catalog variants have distinct type names, so tags never collide here.
    pub(crate) fn insert_variant<V: EventVariant + Into<DpEvent>>(mut self) -> Self {
        self.registry.insert(RegistryEntry::of::<V>());
        self
    }

    pub fn build(self) -> Registry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GaussianDpEvent, CATALOG_NAMESPACE};

    #[test]
    fn test_catalog_contains_every_variant() {
        let registry = Registry::catalog();
        assert_eq!(registry.len(), 12);
        for tag in [
            "NoOpDpEvent",
            "NonPrivateDpEvent",
            "UnsupportedDpEvent",
            "GaussianDpEvent",
            "LaplaceDpEvent",
            "SelfComposedDpEvent",
            "ComposedDpEvent",
            "PoissonSampledDpEvent",
            "SampledWithReplacementDpEvent",
            "SampledWithoutReplacementDpEvent",
            "SingleEpochTreeAggregationDpEvent",
            "RepeatAndSelectDpEvent",
        ] {
            assert!(registry.contains(CATALOG_NAMESPACE, tag), "missing {}", tag);
        }
    }

    #[test]
    fn test_resolve_distinguishes_namespace_and_type() {
        let registry = Registry::catalog();

        let err = registry.resolve("os.system", "GaussianDpEvent").unwrap_err();
        assert!(matches!(
            err,
            CodecError::ResolutionFailure {
                reason: ResolutionReason::UnknownNamespace,
                ..
            }
        ));

        let err = registry.resolve(CATALOG_NAMESPACE, "LoadLibrary").unwrap_err();
        assert!(matches!(
            err,
            CodecError::ResolutionFailure {
                reason: ResolutionReason::UnknownTypeTag,
                ..
            }
        ));
    }

    #[test]
    fn test_register_rejects_duplicate() {
        let err = Registry::builder()
            .with_catalog()
            .register::<GaussianDpEvent>()
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::DuplicateRegistration {
                namespace: CATALOG_NAMESPACE.to_string(),
                type_tag: "GaussianDpEvent".to_string(),
            }
        );
    }

    #[test]
    fn test_entries_sorted_and_describe_fields() {
        let registry = Registry::builder()
            .register::<GaussianDpEvent>()
            .unwrap()
            .build();
        let entries = registry.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].type_tag(), "GaussianDpEvent");
        assert_eq!(entries[0].fields()[0].name, "noise_multiplier");

        let catalog = Registry::catalog();
        let tags: Vec<&str> = catalog.entries().iter().map(|e| e.type_tag()).collect();
        let mut sorted = tags.clone();
        sorted.sort_unstable();
        assert_eq!(tags, sorted);
    }
}
