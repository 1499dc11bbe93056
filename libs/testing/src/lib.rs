//! # dpacct-testing
//!
//! Fixtures and `proptest` strategies shared by the workspace's test suites.

use dpacct_event::{DpEvent, StepCounts};
use proptest::prelude::*;

/// One instance of every catalog variant, labelled for case tables.
pub fn sample_events() -> Vec<(&'static str, DpEvent)> {
    vec![
        ("no_op", DpEvent::no_op()),
        ("non_private", DpEvent::non_private()),
        ("unsupported", DpEvent::unsupported()),
        ("gaussian", DpEvent::gaussian(1.0)),
        ("laplace", DpEvent::laplace(1.0)),
        ("self_composed", DpEvent::self_composed(DpEvent::gaussian(1.0), 10)),
        (
            "composed",
            DpEvent::composed([DpEvent::gaussian(1.0), DpEvent::laplace(1.0)]),
        ),
        ("poisson", DpEvent::poisson_sampled(0.1, DpEvent::gaussian(1.0))),
        (
            "sampled_with_replacement",
            DpEvent::sampled_with_replacement(1000, 10, DpEvent::gaussian(1.0)),
        ),
        (
            "sampled_without_replacement",
            DpEvent::sampled_without_replacement(1000, 10, DpEvent::gaussian(1.0)),
        ),
        ("tree_int", DpEvent::single_epoch_tree_aggregation(1.0, 5_i64)),
        (
            "tree_list",
            DpEvent::single_epoch_tree_aggregation(1.0, vec![5_i64, 10]),
        ),
        (
            "repeat_and_select",
            DpEvent::repeat_and_select(DpEvent::gaussian(1.0), 30.0, 1.0),
        ),
        ("complex", nested_example()),
    ]
}

/// A composition mixing tree aggregation, Poisson sampling and nested
/// fixed-size sampling.
pub fn nested_example() -> DpEvent {
    DpEvent::composed([
        DpEvent::single_epoch_tree_aggregation(1.0, 5_i64),
        DpEvent::poisson_sampled(0.1, DpEvent::laplace(1.0)),
        DpEvent::self_composed(
            DpEvent::sampled_with_replacement(1000, 10, DpEvent::gaussian(1.0)),
            50,
        ),
    ])
}

/// Finite floats that survive any projection exactly.
pub fn arb_float() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(1.0), 1e-6..1e6_f64, -1e3..0.0_f64]
}

pub fn arb_step_counts() -> impl Strategy<Value = StepCounts> {
    prop_oneof![
        (0..10_000_i64).prop_map(StepCounts::Single),
        prop::collection::vec(0..10_000_i64, 0..6).prop_map(StepCounts::PerTree),
    ]
}

/// Leaf events: no nested descriptors.
pub fn arb_leaf() -> impl Strategy<Value = DpEvent> {
    prop_oneof![
        Just(DpEvent::no_op()),
        Just(DpEvent::non_private()),
        Just(DpEvent::unsupported()),
        arb_float().prop_map(DpEvent::gaussian),
        arb_float().prop_map(DpEvent::laplace),
        (arb_float(), arb_step_counts())
            .prop_map(|(noise, steps)| DpEvent::single_epoch_tree_aggregation(noise, steps)),
    ]
}

/// Arbitrary event trees up to a handful of levels deep.
pub fn arb_event() -> impl Strategy<Value = DpEvent> {
    arb_leaf().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            (inner.clone(), any::<i64>()).prop_map(|(event, count)| DpEvent::self_composed(event, count)),
            prop::collection::vec(inner.clone(), 0..4).prop_map(|events| DpEvent::composed(events)),
            (0.0..=1.0_f64, inner.clone())
                .prop_map(|(p, event)| DpEvent::poisson_sampled(p, event)),
            (1..1_000_000_i64, 0..1_000_i64, inner.clone()).prop_map(|(n, m, event)| {
                DpEvent::sampled_with_replacement(n, m, event)
            }),
            (1..1_000_000_i64, 0..1_000_i64, inner.clone()).prop_map(|(n, m, event)| {
                DpEvent::sampled_without_replacement(n, m, event)
            }),
            (inner, arb_float(), prop_oneof![Just(0.0), Just(1.0), 0.1..10.0_f64])
                .prop_map(|(event, mean, shape)| DpEvent::repeat_and_select(event, mean, shape)),
        ]
    })
}
