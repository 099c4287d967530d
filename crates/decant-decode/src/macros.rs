//! The `directive!` record declaration macro.

/// Declare a record decodable from a directive.
///
/// Every field is written `TAG name: Type`, where `TAG` is a tag literal
/// from the grammar in [`field`](crate::field), or `_` for the default role
/// (a named block entry under the field's own name):
///
/// ```
/// use std::collections::HashMap;
///
/// decant_decode::directive! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Proxy {
///         "$1" from: String,
///         "$2,optional" to: String,
///         "lb_policy" policy: String,
///         _ headers: HashMap<String, String>,
///         _ insecure: bool,
///     }
/// }
/// ```
///
/// The macro generates the struct with all fields public, a
/// [`Directive`](crate::Directive) impl producing the field table the
/// schema extractor consumes, and a [`FieldValue`](crate::FieldValue) impl
/// so the record can itself be a field of another record or the value type
/// of a map. Every field type must implement
/// [`FieldValue`](crate::FieldValue), including fields tagged `-`.
#[macro_export]
macro_rules! directive {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($tag:tt $field:ident : $ty:ty),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(pub $field: $ty,)+
        }

        impl $crate::Directive for $name {
            fn fields() -> ::std::vec::Vec<$crate::FieldDef<Self>> {
                ::std::vec![
                    $($crate::FieldDef {
                        name: ::std::stringify!($field),
                        tag: $crate::__directive_tag!($tag),
                        arg: |record, drv, raw| {
                            $crate::FieldValue::decode_arg(&mut record.$field, drv, raw)
                        },
                        body: |record, drv| {
                            $crate::FieldValue::decode_body(&mut record.$field, drv)
                        },
                        rest: |record, drv| {
                            $crate::FieldValue::decode_rest(&mut record.$field, drv)
                        },
                        flag: |record| $crate::FieldValue::flag(&mut record.$field),
                        matcher: |record, matcher| {
                            $crate::FieldValue::set_matcher(&mut record.$field, matcher)
                        },
                    },)+
                ]
            }
        }

        impl $crate::FieldValue for $name {
            fn decode_body(
                &mut self,
                drv: &mut $crate::Driver<'_>,
            ) -> $crate::DecodeResult<()> {
                $crate::decode_body(drv, self)
            }

            fn decode_rest(
                &mut self,
                drv: &mut $crate::Driver<'_>,
            ) -> $crate::DecodeResult<()> {
                $crate::decode_segment(drv, self)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __directive_tag {
    (_) => {
        ""
    };
    ($tag:literal) => {
        $tag
    };
}
