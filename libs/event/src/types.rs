//! The event catalog.
//!
//! Each variant records the parameters of one mechanism, sampling step, or
//! composition - exactly what an accountant needs and nothing else. Events
//! fall into three groups:
//! - Mechanisms that release an output and incur a privacy cost (`Gaussian`, `Laplace`, ...)
//! - Sampling steps that select a subset of records and run a nested event on it
//! - Compositions that apply several events to the same (sub)dataset
//!
//! ## Compatibility rules
//!
//! - Variants and their fields are never removed
//! - New fields on an existing variant must be optional: declare them as
//!   `name: Type = default` so records written before the field existed decode
//! - The meaning of a variant never changes; new behavior gets a new variant

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::CodecError;
use crate::transfer::{TaggedRecord, TransferRecord};

/// Namespace tag shared by every catalog variant.
///
/// Matches the module path used by named-tuple producers of the same
/// catalog, so their records resolve here unchanged.
pub const CATALOG_NAMESPACE: &str = "dp_accounting.dp_event";

// =============================================================================
// Field Types
// =============================================================================

/// Steps per aggregation tree: one count for a single tree, or one per tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepCounts {
    Single(i64),
    PerTree(Vec<i64>),
}

impl StepCounts {
    /// Counts as a slice, one entry per tree.
    pub fn as_slice(&self) -> &[i64] {
        match self {
            StepCounts::Single(n) => std::slice::from_ref(n),
            StepCounts::PerTree(counts) => counts,
        }
    }

    pub fn tree_count(&self) -> usize {
        self.as_slice().len()
    }
}

impl From<i64> for StepCounts {
    fn from(n: i64) -> Self {
        StepCounts::Single(n)
    }
}

impl From<Vec<i64>> for StepCounts {
    fn from(counts: Vec<i64>) -> Self {
        StepCounts::PerTree(counts)
    }
}

// =============================================================================
// Catalog
// =============================================================================

dp_events! {
    namespace = CATALOG_NAMESPACE;

    /// An operation with no privacy impact.
    ///
    /// Useful as a placeholder wherever an event is expected.
    NoOp(NoOpDpEvent) {}

    /// An operation that does not satisfy differential privacy.
    ///
    /// Accountants must report infinite epsilon and delta once one is composed.
    NonPrivate(NonPrivateDpEvent) {}

    /// An operation with no known, or currently accessible, privacy description.
    ///
    /// Accountants must report `supports() == false` for it.
    Unsupported(UnsupportedDpEvent) {}

    /// The Gaussian mechanism.
    ///
    /// For values `v_i` and noise `z ~ N(0, s^2 I)` it returns `sum_i v_i + z`.
    /// With `||v_i|| <= C`, the noise multiplier is `s / C`.
    Gaussian(GaussianDpEvent) {
        noise_multiplier: f64,
    }

    /// The Laplace mechanism.
    ///
    /// For values `v_i` and noise drawn coordinate-wise from `L(0, s)` (density
    /// `exp(-|x| / s) / 2s`) it returns `sum_i v_i + z`. With `||v_i||_1 <= C`,
    /// the noise multiplier is `s / C`.
    Laplace(LaplaceDpEvent) {
        noise_multiplier: f64,
    }

    /// `event` applied `count` times, possibly adaptively.
    ///
    /// Equivalent to a `Composed` holding `count` copies of `event`.
    SelfComposed(SelfComposedDpEvent) {
        event: Box<DpEvent>,
        count: i64,
    }

    /// A series of events applied in order, possibly adaptively.
    Composed(ComposedDpEvent) {
        events: Vec<DpEvent>,
    }

    /// Poisson subsampling.
    ///
    /// Each record is included independently with `sampling_probability`, then
    /// `event` runs on the sample.
    PoissonSampled(PoissonSampledDpEvent) {
        sampling_probability: f64,
        event: Box<DpEvent>,
    }

    /// A fixed-size sample drawn with replacement.
    ///
    /// `sample_size` (possibly repeated) records are drawn uniformly from a
    /// dataset of `source_dataset_size`, then `event` runs on the sample.
    SampledWithReplacement(SampledWithReplacementDpEvent) {
        source_dataset_size: i64,
        sample_size: i64,
        event: Box<DpEvent>,
    }

    /// A fixed-size sample drawn without replacement.
    ///
    /// `sample_size` distinct records are drawn uniformly from a dataset of
    /// `source_dataset_size`, then `event` runs on the sample.
    SampledWithoutReplacement(SampledWithoutReplacementDpEvent) {
        source_dataset_size: i64,
        sample_size: i64,
        event: Box<DpEvent>,
    }

    /// Aggregation over one epoch using one or more trees.
    ///
    /// Each record occurs at most once across all trees. When a record may
    /// appear in several trees (once per tree), wrap a single-tree event in
    /// `SelfComposed` or `Composed` instead.
    SingleEpochTreeAggregation(SingleEpochTreeAggregationDpEvent) {
        /// Ratio of per-node noise to sensitivity.
        noise_multiplier: f64,
        /// Steps in each tree.
        step_counts: StepCounts,
    }

    /// `event` run a random number of times, keeping the best output.
    ///
    /// The number of runs has mean `mean` and a distribution picked by
    /// `shape`: Poisson (infinity), geometric (1), logarithmic (0), or
    /// truncated negative binomial (anything in between).
    RepeatAndSelect(RepeatAndSelectDpEvent) {
        event: Box<DpEvent>,
        mean: f64,
        shape: f64,
    }
}

impl DpEvent {
    pub fn no_op() -> Self {
        NoOpDpEvent::new().into()
    }

    pub fn non_private() -> Self {
        NonPrivateDpEvent::new().into()
    }

    pub fn unsupported() -> Self {
        UnsupportedDpEvent::new().into()
    }

    pub fn gaussian(noise_multiplier: f64) -> Self {
        GaussianDpEvent::new(noise_multiplier).into()
    }

    pub fn laplace(noise_multiplier: f64) -> Self {
        LaplaceDpEvent::new(noise_multiplier).into()
    }

    pub fn self_composed(event: impl Into<DpEvent>, count: i64) -> Self {
        SelfComposedDpEvent::new(Box::new(event.into()), count).into()
    }

    pub fn composed(events: impl IntoIterator<Item = DpEvent>) -> Self {
        ComposedDpEvent::new(events.into_iter().collect()).into()
    }

    pub fn poisson_sampled(sampling_probability: f64, event: impl Into<DpEvent>) -> Self {
        PoissonSampledDpEvent::new(sampling_probability, Box::new(event.into())).into()
    }

    pub fn sampled_with_replacement(
        source_dataset_size: i64,
        sample_size: i64,
        event: impl Into<DpEvent>,
    ) -> Self {
        SampledWithReplacementDpEvent::new(source_dataset_size, sample_size, Box::new(event.into()))
            .into()
    }

    pub fn sampled_without_replacement(
        source_dataset_size: i64,
        sample_size: i64,
        event: impl Into<DpEvent>,
    ) -> Self {
        SampledWithoutReplacementDpEvent::new(
            source_dataset_size,
            sample_size,
            Box::new(event.into()),
        )
        .into()
    }

    pub fn single_epoch_tree_aggregation(
        noise_multiplier: f64,
        step_counts: impl Into<StepCounts>,
    ) -> Self {
        SingleEpochTreeAggregationDpEvent::new(noise_multiplier, step_counts.into()).into()
    }

    pub fn repeat_and_select(event: impl Into<DpEvent>, mean: f64, shape: f64) -> Self {
        RepeatAndSelectDpEvent::new(Box::new(event.into()), mean, shape).into()
    }

    /// Converts the tree to its transfer record.
    pub fn to_transfer(&self) -> Result<TransferRecord, CodecError> {
        codec::encode(self)
    }

    /// Rebuilds a tree from a transfer record using the catalog registry.
    pub fn from_transfer<R: TaggedRecord + ?Sized>(record: &R) -> Result<Self, CodecError> {
        codec::decode(record)
    }

    /// Nesting depth; a leaf is depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(DpEvent::depth)
            .max()
            .unwrap_or(0)
    }
}
