//! Field roles and the per-record field table.
//!
//! Each record field carries a tag describing its role in the directive.
//! The tag's primary component selects the role; a trailing `,optional`
//! modifier applies to the indexed roles:
//!
//! | Tag | Role |
//! |---|---|
//! | absent | named block entry, under the field's own name |
//! | `-` | excluded from decoding |
//! | `$matcher` | leading matcher slot (implicitly optional) |
//! | `$N` | positional argument N |
//! | `{N}` | indexed block group N |
//! | anything else | named block entry under that literal |

use std::sync::LazyLock;

use regex::Regex;

use decant_core::ModuleMap;

use crate::decode::Driver;
use crate::error::{DecodeError, DecodeResult};

/// A record type decodable from a directive.
///
/// Implemented by the [`directive!`](crate::directive) macro; the field
/// table it returns is turned into a validated [`Schema`](crate::Schema)
/// fresh on every decode call.
pub trait Directive: Sized {
    fn fields() -> Vec<FieldDef<Self>>;
}

/// The role a field plays in the directive's token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Bound to the argument or block at merged index `index`.
    Positional { index: usize, optional: bool },
    /// An indexed block group sharing the positional index space.
    Block { index: usize, optional: bool },
    /// Bound to a named line within a block body.
    Entry { name: &'static str },
    /// The optional leading matcher slot.
    Matcher,
    /// Excluded from decoding entirely.
    Skip,
}

static BLOCK_INDEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\{(\d+)\}$").unwrap());

impl FieldRole {
    /// Interpret a field's tag. `field` is the field's own name, used both
    /// as the default entry name and in malformed-tag diagnostics.
    pub fn parse(field: &'static str, tag: &'static str) -> DecodeResult<Self> {
        if tag.is_empty() {
            return Ok(Self::Entry { name: field });
        }

        let (name, modifiers) = tag.split_once(',').map_or((tag, ""), |(n, m)| (n, m));
        let optional = modifiers.split(',').any(|m| m == "optional");

        if name == "-" {
            return Ok(Self::Skip);
        }
        if name == "$matcher" {
            return Ok(Self::Matcher);
        }
        if let Some(caps) = BLOCK_INDEX.captures(name) {
            let index = caps[1]
                .parse()
                .map_err(|_| DecodeError::InvalidTag { field, tag })?;
            return Ok(Self::Block { index, optional });
        }
        if let Some(digits) = name.strip_prefix('$') {
            let index = digits
                .parse()
                .map_err(|_| DecodeError::InvalidTag { field, tag })?;
            return Ok(Self::Positional { index, optional });
        }

        Ok(Self::Entry { name })
    }
}

/// One field's static descriptor: its name, its tag, and typed accessors
/// generated by the [`directive!`](crate::directive) macro.
///
/// The function pointers route the walk into the field without any runtime
/// type inspection: `arg` coerces one token, `body` decodes an entered
/// block, `rest` decodes a line remainder, `flag` exposes boolean presence
/// storage, and `matcher` accepts a resolved matcher value.
pub struct FieldDef<T> {
    pub name: &'static str,
    pub tag: &'static str,
    pub arg: fn(&mut T, &mut Driver<'_>, &str) -> DecodeResult<()>,
    pub body: fn(&mut T, &mut Driver<'_>) -> DecodeResult<()>,
    pub rest: fn(&mut T, &mut Driver<'_>) -> DecodeResult<()>,
    pub flag: fn(&mut T) -> Option<&mut bool>,
    pub matcher: fn(&mut T, ModuleMap) -> bool,
}

impl<T> FieldDef<T> {
    pub fn role(&self) -> DecodeResult<FieldRole> {
        FieldRole::parse(self.name, self.tag)
    }
}

impl<T> Clone for FieldDef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldDef<T> {}

impl<T> std::fmt::Debug for FieldDef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .finish()
    }
}
