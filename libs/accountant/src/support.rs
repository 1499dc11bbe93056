//! Walking event trees to decide what an accountant can handle.
//!
//! Every accountant handles `NoOp`, `NonPrivate`, `Composed` and
//! `SelfComposed` the same way, and never supports `Unsupported`. These
//! helpers cover that shared part so an accountant only decides about the
//! remaining leaves.

use dpacct_event::DpEvent;

use crate::error::CompositionErrorDetails;

/// Finds the first subevent the accountant cannot handle.
///
/// `leaf_check` is asked about every event that is not a composition,
/// `NoOp`, `NonPrivate` or `Unsupported`. Unknown variants must be rejected
/// by the check's fallback arm.
pub fn find_unsupported<F>(event: &DpEvent, mut leaf_check: F) -> Option<CompositionErrorDetails>
where
    F: FnMut(&DpEvent) -> Result<(), String>,
{
    walk(event, &mut leaf_check)
}

fn walk(
    event: &DpEvent,
    leaf_check: &mut dyn FnMut(&DpEvent) -> Result<(), String>,
) -> Option<CompositionErrorDetails> {
    match event {
        DpEvent::NoOp(_) | DpEvent::NonPrivate(_) => None,
        DpEvent::Unsupported(_) => Some(CompositionErrorDetails::new(
            event,
            "unsupported event has no privacy description",
        )),
        DpEvent::Composed(composed) => composed
            .events
            .iter()
            .find_map(|child| walk(child, leaf_check)),
        DpEvent::SelfComposed(self_composed) => walk(&self_composed.event, leaf_check),
        leaf => leaf_check(leaf)
            .err()
            .map(|message| CompositionErrorDetails::new(leaf, message)),
    }
}

/// Reports whether composing the tree releases a non-private result.
///
/// Only compositions are looked through; a `NonPrivate` nested under a
/// sampling event is left to the accountant's own leaf handling.
pub fn is_non_private(event: &DpEvent) -> bool {
    match event {
        DpEvent::NonPrivate(_) => true,
        DpEvent::Composed(composed) => composed.events.iter().any(is_non_private),
        DpEvent::SelfComposed(self_composed) => {
            self_composed.count > 0 && is_non_private(&self_composed.event)
        }
        _ => false,
    }
}
