//! # dpacct-event
//!
//! Privacy event descriptors and their transfer representation.
//!
//! ## Design Principles
//!
//! - Events are immutable value objects compared field by field
//! - Events describe the shape of an operation; they never compute privacy bounds
//! - Every field is public and supplied at construction
//! - The catalog only grows: variants and fields are never removed
//!
//! ## Transfer Records
//!
//! Any event tree converts to a [`TransferRecord`] and back:
//! - `namespace` and `type_tag` identify the variant
//! - The variant's fields follow in declaration order
//! - Nested events become nested records; event lists become sequences
//!
//! Decoding resolves tags through an explicit [`Registry`], never by loading
//! code by name, and checks the variant's field table with the structural
//! validator whenever reconstruction fails.
//!
//! ```
//! use dpacct_event::DpEvent;
//!
//! let event = DpEvent::composed([DpEvent::gaussian(1.0), DpEvent::laplace(1.0)]);
//! let record = event.to_transfer().unwrap();
//! assert_eq!(DpEvent::from_transfer(&record).unwrap(), event);
//! ```

#[macro_use]
mod macros;

mod codec;
mod error;
mod field;
mod registry;
mod schema;
mod transfer;
mod types;

pub use codec::{decode, encode, encode_variant, Codec, CodecConfig, DecodeContext, DEFAULT_MAX_DEPTH};
pub use error::{CodecError, EligibilityRule, ReconstructionError, ResolutionReason};
pub use field::{FieldCodec, FieldReader, FieldSlot};
pub use registry::{Registry, RegistryBuilder, RegistryEntry};
pub use schema::{validate, validate_fields, EventVariant, FieldInit, FieldKind, FieldSpec};
pub use transfer::{Tag, TaggedRecord, TransferRecord, TransferValue, NAMESPACE_KEY, TYPE_TAG_KEY};
pub use types::*;
