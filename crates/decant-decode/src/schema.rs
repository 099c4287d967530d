//! Schema extraction and validation.
//!
//! A [`Schema`] is derived from a record's field table fresh on every decode
//! call and discarded afterwards; nothing is cached across calls. Positional
//! and indexed-block fields share one index space and are consumed in merged
//! sorted order by the walk.

use crate::error::{DecodeError, DecodeResult};
use crate::field::{Directive, FieldDef, FieldRole};

/// One merged positional/indexed-block position.
#[derive(Debug)]
pub struct Slot<T> {
    pub index: usize,
    pub optional: bool,
    pub field: FieldDef<T>,
}

/// One named block-entry binding.
#[derive(Debug)]
pub struct Entry<T> {
    pub name: &'static str,
    pub field: FieldDef<T>,
}

/// The validated decode plan for one record type.
#[derive(Debug)]
pub struct Schema<T> {
    slots: Vec<Slot<T>>,
    entries: Vec<Entry<T>>,
    matcher: Option<FieldDef<T>>,
}

impl<T: Directive> Schema<T> {
    pub fn extract() -> DecodeResult<Self> {
        Self::build(T::fields())
    }
}

impl<T> Schema<T> {
    /// Classify every field, then validate the merged slot ordering.
    ///
    /// All fields are accumulated before any ordering check runs, so the
    /// diagnostics do not depend on declaration order beyond the tie-break
    /// of the stable sort.
    pub fn build(fields: Vec<FieldDef<T>>) -> DecodeResult<Self> {
        let mut slots = Vec::new();
        let mut entries = Vec::new();
        let mut matcher = None;

        for field in fields {
            match field.role()? {
                FieldRole::Skip => {}
                FieldRole::Matcher => matcher = Some(field),
                FieldRole::Positional { index, optional } | FieldRole::Block { index, optional } => {
                    slots.push(Slot {
                        index,
                        optional,
                        field,
                    });
                }
                FieldRole::Entry { name } => entries.push(Entry { name, field }),
            }
        }

        slots.sort_by_key(|slot| slot.index);

        let mut seen_optional = false;
        for slot in &slots {
            if seen_optional && !slot.optional {
                return Err(DecodeError::RequiredAfterOptional { index: slot.index });
            }
            seen_optional |= slot.optional;
        }

        for pair in slots.windows(2) {
            if pair[0].index == pair[1].index {
                return Err(DecodeError::DuplicateIndex { index: pair[1].index });
            }
        }

        Ok(Self {
            slots,
            entries,
            matcher,
        })
    }

    /// The slot at merged walk position `position` (not declared index).
    pub fn slot(&self, position: usize) -> Option<&Slot<T>> {
        self.slots.get(position)
    }

    /// All slots at merged walk positions `position` and beyond.
    pub fn slots_from(&self, position: usize) -> &[Slot<T>] {
        self.slots.get(position..).unwrap_or(&[])
    }

    /// The entry bound to `name`, if any.
    pub fn entry(&self, name: &str) -> Option<&Entry<T>> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn matcher(&self) -> Option<&FieldDef<T>> {
        self.matcher.as_ref()
    }
}
