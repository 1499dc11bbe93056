//! Macro for declaring the event catalog.

/// Declares every event variant and the [`DpEvent`](crate::DpEvent) sum type.
///
/// Each entry generates:
/// - A public struct with `pub` fields and a `new()` taking all of them
/// - `Debug`, `Clone`, `PartialEq`, `Serialize` and `Deserialize`
/// - An [`EventVariant`](crate::EventVariant) impl with the static field table
/// - `From<Variant> for DpEvent`
/// - Registration in the catalog registry
///
/// Adding a variant is one more entry here; the codec and validator only see
/// the generated field tables.
///
/// A field declared as `name: Type = default` may be absent from a transfer
/// record and decodes to `default`. Fields added to an existing variant must
/// take this form so records written before the addition still decode.
///
/// # Example
///
/// ```ignore
/// dp_events! {
///     namespace = "example.events";
///
///     /// Gaussian noise.
///     Gaussian(GaussianDpEvent) {
///         noise_multiplier: f64,
///         sensitivity: f64 = 1.0,
///     }
/// }
/// ```
macro_rules! dp_events {
    (@take $fields:ident, $field:ident) => {
        $fields.take(stringify!($field))?
    };

    (@take $fields:ident, $field:ident, $default:expr) => {
        $fields.take_or(stringify!($field), $default)?
    };

    // One variant struct with its field table, without the sum-type glue.
    (
        @variant namespace = $namespace:expr;
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty $(= $default:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        impl $name {
            /// Creates the event from all of its fields.
            #[must_use]
            #[allow(clippy::new_without_default)]
            pub fn new($($field: $ty),*) -> Self {
                Self { $($field),* }
            }
        }

        impl $crate::schema::EventVariant for $name {
            const NAMESPACE: &'static str = $namespace;
            const TYPE_TAG: &'static str = stringify!($name);
            const FIELDS: &'static [$crate::schema::FieldSpec] = &[
                $(
                    $crate::schema::FieldSpec::new(
                        stringify!($field),
                        <$ty as $crate::field::FieldCodec>::KIND,
                    ),
                )*
            ];

            fn encode_fields(
                &self,
            ) -> Result<Vec<$crate::transfer::TransferValue>, $crate::error::CodecError> {
                Ok(vec![
                    $( $crate::field::FieldCodec::encode_value(&self.$field)?, )*
                ])
            }

            #[allow(unused_variables)]
            fn decode_fields(
                fields: &mut $crate::field::FieldReader<'_>,
            ) -> Result<Self, $crate::error::CodecError> {
                Ok(Self {
                    $( $field: dp_events!(@take fields, $field $(, $default)?), )*
                })
            }
        }
    };

    (
        namespace = $namespace:expr;
        $(
            $(#[$meta:meta])*
            $variant:ident($name:ident) {
                $(
                    $(#[$field_meta:meta])*
                    $field:ident : $ty:ty $(= $default:expr)?
                ),* $(,)?
            }
        )*
    ) => {
        $(
            dp_events! {
                @variant namespace = $namespace;
                $(#[$meta])*
                $name {
                    $(
                        $(#[$field_meta])*
                        $field : $ty $(= $default)?
                    ),*
                }
            }

            impl From<$name> for DpEvent {
                fn from(event: $name) -> Self {
                    DpEvent::$variant(event)
                }
            }
        )*

        /// One node of a privacy event tree.
        ///
        /// Consumers must keep a fallback arm when matching: variants may be
        /// added, and an unknown variant is reported as not supported.
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        #[non_exhaustive]
        pub enum DpEvent {
            $(
                $(#[$meta])*
                $variant($name),
            )*
        }

        impl DpEvent {
            /// The variant's type tag.
            pub fn type_tag(&self) -> &'static str {
                match self {
                    $( DpEvent::$variant(_) => <$name as $crate::schema::EventVariant>::TYPE_TAG, )*
                }
            }

            /// The namespace the variant is defined in.
            pub fn namespace(&self) -> &'static str {
                match self {
                    $( DpEvent::$variant(_) => <$name as $crate::schema::EventVariant>::NAMESPACE, )*
                }
            }

            /// The variant's declared fields.
            pub fn fields(&self) -> &'static [$crate::schema::FieldSpec] {
                match self {
                    $( DpEvent::$variant(_) => <$name as $crate::schema::EventVariant>::FIELDS, )*
                }
            }

            /// Events nested directly in this one, in field order.
            pub fn children(&self) -> Vec<&DpEvent> {
                let mut out = Vec::new();
                match self {
                    $(
                        DpEvent::$variant(event) => {
                            let _ = &event;
                            $( $crate::field::FieldCodec::collect_events(&event.$field, &mut out); )*
                        }
                    )*
                }
                out
            }

            pub(crate) fn encode_node(
                &self,
            ) -> Result<$crate::transfer::TransferRecord, $crate::error::CodecError> {
                match self {
                    $( DpEvent::$variant(event) => $crate::codec::encode_variant(event), )*
                }
            }
        }

        pub(crate) fn register_catalog(
            builder: $crate::registry::RegistryBuilder,
        ) -> $crate::registry::RegistryBuilder {
            builder
                $( .insert_variant::<$name>() )*
        }
    };
}
