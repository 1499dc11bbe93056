//! The capability contract every privacy accountant satisfies.

use dpacct_event::DpEvent;
use tracing::debug;

use crate::error::{AccountantError, CompositionErrorDetails, UnsupportedEventError};
use crate::relation::NeighboringRelation;

/// Tracks the privacy loss of a sequence of composed events.
///
/// Implementors provide the four required methods. `apply` is only ever
/// called with events that `composition_error` accepted, so it does not need
/// to re-check support.
pub trait PrivacyAccountant {
    /// The neighboring relation the accountant's guarantees refer to.
    fn neighboring_relation(&self) -> NeighboringRelation;

    /// Returns `None` if the whole tree can be composed, otherwise the first
    /// offending subevent and why.
    fn composition_error(&self, event: &DpEvent) -> Option<CompositionErrorDetails>;

    /// Adds `count` repetitions of a supported event to the ledger.
    fn apply(&mut self, event: &DpEvent, count: u64);

    /// The smallest epsilon such that the composed events are
    /// `(epsilon, target_delta)`-DP.
    fn epsilon(&self, target_delta: f64) -> f64;

    /// The smallest delta such that the composed events are
    /// `(target_epsilon, delta)`-DP.
    fn delta(&self, target_epsilon: f64) -> Result<f64, AccountantError> {
        let _ = target_epsilon;
        Err(AccountantError::NotImplemented("delta"))
    }

    fn supports(&self, event: &DpEvent) -> bool {
        self.composition_error(event).is_none()
    }

    /// Checks the whole tree first and composes nothing if any part of it is
    /// unsupported.
    fn compose(&mut self, event: &DpEvent, count: u64) -> Result<(), UnsupportedEventError> {
        if let Some(details) = self.composition_error(event) {
            debug!(
                event = event.type_tag(),
                subevent = details.invalid_event.type_tag(),
                reason = %details.error_message,
                "rejected composition"
            );
            return Err(UnsupportedEventError {
                event: event.clone(),
                details,
            });
        }
        self.apply(event, count);
        Ok(())
    }
}
