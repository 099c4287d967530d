//! Matcher token support.
//!
//! Records that declare a `$matcher` field can only be decoded through
//! [`decode_with`](crate::decode_with), supplying a [`MatcherSource`] that
//! knows how to resolve an optional leading matcher token.

use decant_core::{Dispenser, ModuleMap};
use serde_json::json;
use std::collections::HashMap;

use crate::error::{DecodeError, DecodeResult};

/// Resolves an optional leading matcher token.
///
/// Implementations peek at the next argument and consume it only when it is
/// a matcher; anything else is left for the positional walk. `Ok(None)`
/// means no matcher token was present.
pub trait MatcherSource {
    fn matcher_token(&mut self, cursor: &mut Dispenser) -> DecodeResult<Option<ModuleMap>>;
}

/// A table of named matchers.
///
/// Recognizes three leading-token shapes: `@name` looks up a defined
/// matcher (unknown names are an error), `*` matches everything, and a
/// `/path` token is shorthand for a path matcher.
#[derive(Debug, Clone, Default)]
pub struct NamedMatchers {
    matchers: HashMap<String, ModuleMap>,
}

impl NamedMatchers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>, matcher: ModuleMap) {
        self.matchers.insert(name.into(), matcher);
    }
}

impl MatcherSource for NamedMatchers {
    fn matcher_token(&mut self, cursor: &mut Dispenser) -> DecodeResult<Option<ModuleMap>> {
        let Some(token) = cursor.peek_arg().map(str::to_owned) else {
            return Ok(None);
        };

        if token == "*" {
            cursor.next_arg();
            return Ok(Some(ModuleMap::new()));
        }
        if let Some(name) = token.strip_prefix('@') {
            let matcher = self
                .matchers
                .get(name)
                .cloned()
                .ok_or_else(|| DecodeError::UnknownMatcher {
                    name: name.to_owned(),
                })?;
            cursor.next_arg();
            return Ok(Some(matcher));
        }
        if token.starts_with('/') {
            let mut matcher = ModuleMap::new();
            matcher.insert("path", json!([token]));
            cursor.next_arg();
            return Ok(Some(matcher));
        }

        Ok(None)
    }
}
