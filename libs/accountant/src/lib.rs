//! The contract privacy accountants implement over [`DpEvent`] trees.
//!
//! An accountant answers two questions about an event: can it be composed,
//! and what privacy guarantee holds after composing it. This crate fixes the
//! shape of those answers so every accountant rejects unsupported events the
//! same way, before touching its ledger.
//!
//! ```
//! use dpacct_accountant::find_unsupported;
//! use dpacct_event::DpEvent;
//!
//! let event = DpEvent::composed([DpEvent::no_op(), DpEvent::unsupported()]);
//! let details = find_unsupported(&event, |_| Ok(())).unwrap();
//! assert_eq!(details.invalid_event, DpEvent::unsupported());
//! ```
//!
//! [`DpEvent`]: dpacct_event::DpEvent

mod accountant;
mod error;
mod relation;
mod support;

pub use accountant::PrivacyAccountant;
pub use error::{AccountantError, CompositionErrorDetails, UnsupportedEventError};
pub use relation::NeighboringRelation;
pub use support::{find_unsupported, is_non_private};
