//! Token-to-value coercion.
//!
//! [`FieldValue`] is both the coercion entry point and the custom-decoder
//! capability: every implementation receives the live [`Driver`] and may
//! consume further tokens and blocks, so a domain type with its own literal
//! grammar implements this trait and the engine never special-cases it.
//! The default method bodies reject whatever a type does not support,
//! naming the concrete type.
//!
//! Shipped implementations cover the primitives, `String`, the hash/btree
//! map containers, and the literal types from `decant-core`.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use decant_core::{Duration, ModuleMap, NetworkAddress, SiteAddress};

use crate::decode::Driver;
use crate::error::{DecodeError, DecodeResult};

/// A value that directive tokens can be decoded into.
pub trait FieldValue {
    /// Coerce one argument token into this value.
    fn decode_arg(&mut self, drv: &mut Driver<'_>, raw: &str) -> DecodeResult<()> {
        let _ = (drv, raw);
        Err(DecodeError::unsupported::<Self>("an argument"))
    }

    /// Decode an entered block body into this value. The cursor sits on the
    /// first token inside the block.
    fn decode_body(&mut self, drv: &mut Driver<'_>) -> DecodeResult<()> {
        let _ = drv;
        Err(DecodeError::unsupported::<Self>("a block"))
    }

    /// Decode the remainder of a block line into this value.
    ///
    /// The default takes exactly one argument token: scalar entries read as
    /// `name value`, and anything further on the line is an error.
    fn decode_rest(&mut self, drv: &mut Driver<'_>) -> DecodeResult<()> {
        if !drv.cursor.next_arg() {
            return Err(drv.wrap(DecodeError::MissingField { index: 0 }));
        }
        let raw = drv.cursor.val().to_owned();
        self.decode_arg(drv, &raw)?;
        if drv.cursor.next_arg() {
            let token = drv.cursor.val().to_owned();
            return Err(drv.wrap(DecodeError::UnexpectedArgument { position: 1, token }));
        }
        let nesting = drv.cursor.nesting();
        if drv.cursor.next_block(nesting) {
            return Err(drv.wrap(DecodeError::unsupported::<Self>("a block")));
        }
        Ok(())
    }

    /// Presence-flag storage, for types set by a bare block line.
    fn flag(&mut self) -> Option<&mut bool> {
        None
    }

    /// Accept a resolved matcher value. Only module-map storage does.
    fn set_matcher(&mut self, matcher: ModuleMap) -> bool {
        let _ = matcher;
        false
    }
}

impl FieldValue for String {
    fn decode_arg(&mut self, _drv: &mut Driver<'_>, raw: &str) -> DecodeResult<()> {
        raw.clone_into(self);
        Ok(())
    }
}

impl FieldValue for bool {
    fn decode_arg(&mut self, drv: &mut Driver<'_>, raw: &str) -> DecodeResult<()> {
        *self = raw.parse().map_err(|source| {
            drv.wrap(DecodeError::InvalidBool {
                token: raw.to_owned(),
                source,
            })
        })?;
        Ok(())
    }

    fn flag(&mut self) -> Option<&mut bool> {
        Some(self)
    }
}

macro_rules! int_field_value {
    ($($ty:ty),*) => {$(
        impl FieldValue for $ty {
            fn decode_arg(&mut self, drv: &mut Driver<'_>, raw: &str) -> DecodeResult<()> {
                *self = raw.parse().map_err(|source| {
                    drv.wrap(DecodeError::InvalidInt {
                        token: raw.to_owned(),
                        source,
                    })
                })?;
                Ok(())
            }
        }
    )*};
}

int_field_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_field_value {
    ($($ty:ty),*) => {$(
        impl FieldValue for $ty {
            fn decode_arg(&mut self, drv: &mut Driver<'_>, raw: &str) -> DecodeResult<()> {
                *self = raw.parse().map_err(|source| {
                    drv.wrap(DecodeError::InvalidFloat {
                        token: raw.to_owned(),
                        source,
                    })
                })?;
                Ok(())
            }
        }
    )*};
}

float_field_value!(f32, f64);

macro_rules! literal_field_value {
    ($($ty:ty),*) => {$(
        impl FieldValue for $ty {
            fn decode_arg(&mut self, drv: &mut Driver<'_>, raw: &str) -> DecodeResult<()> {
                *self = raw
                    .parse()
                    .map_err(|e: decant_core::Error| drv.wrap(e.into()))?;
                Ok(())
            }
        }
    )*};
}

literal_field_value!(Duration, NetworkAddress, SiteAddress);

impl FieldValue for std::time::Duration {
    fn decode_arg(&mut self, drv: &mut Driver<'_>, raw: &str) -> DecodeResult<()> {
        *self = decant_core::duration::parse_std(raw).map_err(|e| drv.wrap(e.into()))?;
        Ok(())
    }
}

impl FieldValue for ModuleMap {
    fn set_matcher(&mut self, matcher: ModuleMap) -> bool {
        *self = matcher;
        true
    }
}

/// Decode the lines of an entered block as key/value pairs.
///
/// Each line materializes a fresh default key from its first token and a
/// fresh default value from the remainder, then commits the pair. Failures
/// propagate before the pair is committed.
fn decode_pairs<K, V>(
    drv: &mut Driver<'_>,
    mut commit: impl FnMut(K, V),
) -> DecodeResult<()>
where
    K: FieldValue + Default,
    V: FieldValue + Default,
{
    let initial = drv.cursor.nesting().saturating_sub(1);
    loop {
        let raw = drv.cursor.val().to_owned();
        let mut key = K::default();
        key.decode_arg(drv, &raw)
            .map_err(|e| e.in_entry(raw.clone()))?;
        let mut value = V::default();
        value.decode_rest(drv).map_err(|e| e.in_entry(raw))?;
        commit(key, value);
        if !drv.cursor.next_block(initial) {
            break;
        }
    }
    Ok(())
}

/// A map takes no positional arguments; its content is the block opening on
/// the line, if any.
fn decode_map_rest<M: FieldValue + ?Sized>(
    map: &mut M,
    drv: &mut Driver<'_>,
) -> DecodeResult<()> {
    if drv.cursor.next_arg() {
        let token = drv.cursor.val().to_owned();
        return Err(drv.wrap(DecodeError::UnexpectedArgument { position: 0, token }));
    }
    let nesting = drv.cursor.nesting();
    if drv.cursor.next_block(nesting) {
        map.decode_body(drv)
    } else {
        Ok(())
    }
}

impl<K, V, S> FieldValue for HashMap<K, V, S>
where
    K: FieldValue + Default + Eq + Hash,
    V: FieldValue + Default,
    S: BuildHasher,
{
    fn decode_body(&mut self, drv: &mut Driver<'_>) -> DecodeResult<()> {
        decode_pairs(drv, |key, value| {
            self.insert(key, value);
        })
    }

    fn decode_rest(&mut self, drv: &mut Driver<'_>) -> DecodeResult<()> {
        decode_map_rest(self, drv)
    }
}

impl<K, V> FieldValue for BTreeMap<K, V>
where
    K: FieldValue + Default + Ord,
    V: FieldValue + Default,
{
    fn decode_body(&mut self, drv: &mut Driver<'_>) -> DecodeResult<()> {
        decode_pairs(drv, |key, value| {
            self.insert(key, value);
        })
    }

    fn decode_rest(&mut self, drv: &mut Driver<'_>) -> DecodeResult<()> {
        decode_map_rest(self, drv)
    }
}
