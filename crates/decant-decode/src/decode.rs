//! The recursive argument/block walk.
//!
//! [`decode`] drives a [`Dispenser`] positioned on a directive name into a
//! target record: positional arguments and indexed blocks are routed through
//! the record's [`Schema`](crate::Schema) in merged index order, and at most
//! one unrouted block per level is taken as the record's own body. Nested
//! records and maps recurse through the same walk with their own schemas.
//!
//! The walk is depth-first and strictly single-pass: the cursor is threaded
//! by `&mut` through every level, and the first error aborts the whole
//! decode with position breadcrumbs attached on the way out.

use decant_core::Dispenser;
use tracing::{debug, trace};

use crate::error::{DecodeError, DecodeResult};
use crate::field::Directive;
use crate::matcher::MatcherSource;
use crate::schema::Schema;

/// The cursor plus optional matcher capability, threaded through the walk.
pub struct Driver<'a> {
    pub cursor: &'a mut Dispenser,
    pub(crate) matchers: Option<&'a mut dyn MatcherSource>,
}

impl<'a> Driver<'a> {
    pub(crate) fn new(cursor: &'a mut Dispenser) -> Self {
        Self {
            cursor,
            matchers: None,
        }
    }

    pub(crate) fn with_matchers(
        cursor: &'a mut Dispenser,
        matchers: &'a mut dyn MatcherSource,
    ) -> Self {
        Self {
            cursor,
            matchers: Some(matchers),
        }
    }

    /// Attach the cursor's current position to an error.
    pub fn wrap(&self, err: DecodeError) -> DecodeError {
        err.at_line(self.cursor.line())
    }
}

/// Decode a directive's argument/block sequence into `target`.
///
/// The directive name is the caller's to consume; the cursor must sit on it.
pub fn decode<T: Directive>(cursor: &mut Dispenser, target: &mut T) -> DecodeResult<()> {
    decode_segment(&mut Driver::new(cursor), target)
}

/// Like [`decode`], with matcher support for records that declare a
/// `$matcher` field.
pub fn decode_with<T: Directive>(
    cursor: &mut Dispenser,
    matchers: &mut impl MatcherSource,
    target: &mut T,
) -> DecodeResult<()> {
    decode_segment(&mut Driver::with_matchers(cursor, matchers), target)
}

/// Decode one argument/block sequence into `target` under an existing
/// driver. This is the recursion point macro-generated records route their
/// line remainders through.
pub fn decode_segment<T: Directive>(drv: &mut Driver<'_>, target: &mut T) -> DecodeResult<()> {
    let schema = Schema::<T>::extract().map_err(|e| DecodeError::Schema {
        source: Box::new(e),
    })?;
    trace!(ty = std::any::type_name::<T>(), "decoding segment");
    walk(drv, target, &schema)
}

/// Decode an entered block's lines against `target`'s named entries. The
/// cursor must sit on the first token inside the block.
pub fn decode_body<T: Directive>(drv: &mut Driver<'_>, target: &mut T) -> DecodeResult<()> {
    let schema = Schema::<T>::extract().map_err(|e| DecodeError::Schema {
        source: Box::new(e),
    })?;
    body(drv, target, &schema)
}

fn walk<T>(drv: &mut Driver<'_>, target: &mut T, schema: &Schema<T>) -> DecodeResult<()> {
    if let Some(field) = schema.matcher() {
        if drv.matchers.is_none() {
            return Err(drv.wrap(DecodeError::NoMatcherSupport));
        }
        let token = match drv.matchers.as_deref_mut() {
            Some(src) => src.matcher_token(drv.cursor)?,
            None => None,
        };
        if let Some(map) = token {
            trace!("matcher token consumed");
            if !(field.matcher)(target, map) {
                return Err(drv.wrap(DecodeError::InvalidMatcherField));
            }
        }
    }

    let mut had_block = false;
    let mut position = 0usize;
    loop {
        let nesting = drv.cursor.nesting();
        if drv.cursor.next_arg() {
            let raw = drv.cursor.val().to_owned();
            let Some(slot) = schema.slot(position) else {
                return Err(drv.wrap(DecodeError::UnexpectedArgument {
                    position,
                    token: raw,
                }));
            };
            (slot.field.arg)(target, drv, &raw).map_err(|e| e.at_position(position))?;
        } else if drv.cursor.next_block(nesting) {
            match schema.slot(position) {
                Some(slot) => {
                    (slot.field.body)(target, drv).map_err(|e| e.at_position(position))?;
                }
                None if had_block => {
                    return Err(drv.wrap(DecodeError::UnexpectedBlock { position }));
                }
                None => {
                    // The one unrouted block is the record's own body.
                    body(drv, target, schema).map_err(|e| e.at_position(position))?;
                    had_block = true;
                }
            }
        } else {
            break;
        }
        position += 1;
    }

    for slot in schema.slots_from(position) {
        if !slot.optional {
            return Err(drv.wrap(DecodeError::MissingField { index: slot.index }));
        }
    }
    Ok(())
}

fn body<T>(drv: &mut Driver<'_>, target: &mut T, schema: &Schema<T>) -> DecodeResult<()> {
    let initial = drv.cursor.nesting().saturating_sub(1);
    loop {
        let name = drv.cursor.val().to_owned();
        match schema.entry(&name) {
            None => {
                // Unrecognized entries are skipped, not rejected, so records
                // tolerate options they do not model.
                debug!(entry = %name, "skipping unrecognized block entry");
                drv.cursor.skip_segment();
            }
            Some(entry) => {
                if let Some(present) = (entry.field.flag)(target) {
                    if drv.cursor.count_remaining_args() > 0 {
                        return Err(drv.wrap(DecodeError::TrailingArgument { entry: name }));
                    }
                    *present = true;
                } else {
                    (entry.field.rest)(target, drv).map_err(|e| e.in_entry(name))?;
                }
            }
        }
        if !drv.cursor.next_block(initial) {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use decant_core::{Dispenser, Duration, ModuleMap, NetworkAddress};
    use serde_json::json;

    use super::*;
    use crate::NamedMatchers;
    use crate::directive;

    fn cursor(input: &str) -> Dispenser {
        let mut d: Dispenser = input.parse().unwrap();
        assert!(d.next(), "input has no tokens");
        d
    }

    directive! {
        #[derive(Debug, Default, PartialEq)]
        struct Thing1 {
            "$1" arg1: String,
            "$3,optional" arg2: String,
            "{2}" junk1: HashMap<String, String>,
            "{4},optional" junk2: HashMap<String, String>,
        }
    }

    directive! {
        #[derive(Debug, Default, PartialEq)]
        struct Thing2 {
            "$1" arg1: String,
            "$2,optional" arg2: String,
            "parameter" param: String,
            _ number: i32,
            _ flag: bool,
        }
    }

    directive! {
        #[derive(Debug, Default, PartialEq)]
        struct Thing3 {
            "$matcher" matcher: ModuleMap,
            "$1" arg1: String,
            "$2,optional" arg2: String,
        }
    }

    #[test]
    fn test_positionals_interleaved_with_indexed_blocks() {
        let mut d = cursor("thing1 arg1 {\n  foo bar\n} arg2 {\n  baz qux\n}");
        let mut thing = Thing1::default();
        decode(&mut d, &mut thing).unwrap();

        assert_eq!(thing.arg1, "arg1");
        assert_eq!(thing.arg2, "arg2");
        assert_eq!(thing.junk1, HashMap::from([("foo".into(), "bar".into())]));
        assert_eq!(thing.junk2, HashMap::from([("baz".into(), "qux".into())]));
    }

    #[test]
    fn test_trailing_optionals_may_be_absent() {
        let mut d = cursor("thing1 arg1 {\n  foo bar\n}");
        let mut thing = Thing1::default();
        decode(&mut d, &mut thing).unwrap();
        assert_eq!(thing.arg1, "arg1");
        assert_eq!(thing.arg2, "");
        assert!(thing.junk2.is_empty());
    }

    #[test]
    fn test_implicit_body_block() {
        let mut d = cursor("thing2 a b {\n  parameter value\n  number 100\n  flag\n}");
        let mut thing = Thing2::default();
        decode(&mut d, &mut thing).unwrap();

        assert_eq!(thing.arg1, "a");
        assert_eq!(thing.arg2, "b");
        assert_eq!(thing.param, "value");
        assert_eq!(thing.number, 100);
        assert!(thing.flag);
    }

    #[test]
    fn test_missing_required_field_cites_declared_index() {
        // arg1 fills $1, but the required block at index 2 never arrives.
        let mut d = cursor("thing1 arg1");
        let err = decode(&mut d, &mut Thing1::default()).unwrap_err();
        assert!(matches!(err.root(), DecodeError::MissingField { index: 2 }));
    }

    #[test]
    fn test_unexpected_argument_cites_walk_position() {
        let mut d = cursor("thing2 a b c");
        let err = decode(&mut d, &mut Thing2::default()).unwrap_err();
        assert!(matches!(
            err.root(),
            DecodeError::UnexpectedArgument { position: 2, token } if token == "c"
        ));
    }

    #[test]
    fn test_matcher_requires_support() {
        let mut d = cursor("thing3 @auth arg1");
        let err = decode(&mut d, &mut Thing3::default()).unwrap_err();
        assert!(matches!(err.root(), DecodeError::NoMatcherSupport));
        // Nothing was consumed: the next argument is still the matcher token.
        assert_eq!(d.peek_arg(), Some("@auth"));
    }

    #[test]
    fn test_matcher_token_assigned() {
        let mut matchers = NamedMatchers::new();
        matchers.define(
            "auth",
            ModuleMap::from_iter([("header".to_string(), json!({"Authorization": ["*"]}))]),
        );

        let mut d = cursor("thing3 @auth arg1");
        let mut thing = Thing3::default();
        decode_with(&mut d, &mut matchers, &mut thing).unwrap();
        assert_eq!(thing.arg1, "arg1");
        assert!(thing.matcher.get("header").is_some());
    }

    #[test]
    fn test_matcher_absent_is_fine() {
        let mut matchers = NamedMatchers::new();
        let mut d = cursor("thing3 arg1 arg2");
        let mut thing = Thing3::default();
        decode_with(&mut d, &mut matchers, &mut thing).unwrap();
        assert!(thing.matcher.is_empty());
        assert_eq!(thing.arg1, "arg1");
        assert_eq!(thing.arg2, "arg2");
    }

    directive! {
        #[derive(Debug, Default, PartialEq)]
        struct BadMatcher {
            "$matcher" matcher: String,
            "$1" arg1: String,
        }
    }

    #[test]
    fn test_matcher_must_target_a_module_map() {
        let mut matchers = NamedMatchers::new();
        let mut d = cursor("bad * arg1");
        let err = decode_with(&mut d, &mut matchers, &mut BadMatcher::default()).unwrap_err();
        assert!(matches!(err.root(), DecodeError::InvalidMatcherField));
    }

    #[test]
    fn test_flag_line_rejects_trailing_argument() {
        let mut d = cursor("thing2 a b {\n  flag extra\n}");
        let err = decode(&mut d, &mut Thing2::default()).unwrap_err();
        assert!(matches!(
            err.root(),
            DecodeError::TrailingArgument { entry } if entry == "flag"
        ));
    }

    #[test]
    fn test_unrecognized_entries_are_skipped() {
        let mut d = cursor(
            "thing2 a b {\n  future_option x 12abc {\n    deeper stuff\n  }\n  parameter kept\n}",
        );
        let mut thing = Thing2::default();
        decode(&mut d, &mut thing).unwrap();
        assert_eq!(thing.param, "kept");
    }

    directive! {
        #[derive(Debug, Default, PartialEq)]
        struct EntriesOnly {
            _ level: String,
        }
    }

    #[test]
    fn test_second_unrouted_block_is_rejected() {
        let mut d = cursor("log {\n  level debug\n} {\n  level info\n}");
        let err = decode(&mut d, &mut EntriesOnly::default()).unwrap_err();
        assert!(matches!(err.root(), DecodeError::UnexpectedBlock { position: 1 }));
    }

    #[test]
    fn test_block_routed_to_scalar_slot_is_unsupported() {
        // One argument, then a block: the block lands on optional slot $2,
        // which is a string and cannot absorb it.
        let mut d = cursor("thing2 a {\n  parameter x\n}");
        let err = decode(&mut d, &mut Thing2::default()).unwrap_err();
        assert!(matches!(err.root(), DecodeError::Unsupported { .. }));
    }

    directive! {
        #[derive(Debug, Default, PartialEq)]
        struct Upstream {
            "$1" host: NetworkAddress,
            "weight" weight: u32,
            "timeout" timeout: Duration,
        }
    }

    directive! {
        #[derive(Debug, Default, PartialEq)]
        struct Service {
            "$1" name: String,
            "upstream" upstream: Upstream,
            _ env: HashMap<String, String>,
        }
    }

    #[test]
    fn test_nested_record_entry() {
        let mut d = cursor(
            "service api {\n  upstream udp/backend:443 {\n    weight 5\n    timeout 30s\n  }\n  env {\n    MODE fast\n  }\n}",
        );
        let mut service = Service::default();
        decode(&mut d, &mut service).unwrap();

        assert_eq!(service.name, "api");
        assert_eq!(service.upstream.host.host, "backend");
        assert_eq!(service.upstream.weight, 5);
        assert_eq!(service.upstream.timeout, Duration::from_secs(30));
        assert_eq!(service.env["MODE"], "fast");
    }

    #[test]
    fn test_error_breadcrumbs_name_the_path() {
        let mut d = cursor("service api {\n  upstream backend:443 {\n    weight heavy\n  }\n}");
        let err = decode(&mut d, &mut Service::default()).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("\"upstream\""), "missing context in {text:?}");
        assert!(text.contains("\"weight\""), "missing context in {text:?}");
        assert!(matches!(err.root(), DecodeError::InvalidInt { token, .. } if token == "heavy"));
    }

    directive! {
        #[derive(Debug, Default, PartialEq)]
        struct Doubled {
            "$1" a: String,
            "$1" b: String,
        }
    }

    #[test]
    fn test_schema_errors_surface_before_any_token() {
        let mut d = cursor("doubled x y");
        let err = decode(&mut d, &mut Doubled::default()).unwrap_err();
        assert!(matches!(err, DecodeError::Schema { .. }));
        assert!(matches!(err.root(), DecodeError::DuplicateIndex { index: 1 }));
        assert_eq!(d.peek_arg(), Some("x"));
    }

    directive! {
        #[derive(Debug, Default, PartialEq)]
        struct Primitives {
            "$1" text: String,
            "$2" count: u32,
            "$3" ratio: f64,
            "$4" enabled: bool,
            "$5" window: Duration,
            "$6" bind: NetworkAddress,
        }
    }

    #[test]
    fn test_positional_round_trip() {
        let original = Primitives {
            text: "hello".into(),
            count: 42,
            ratio: 0.75,
            enabled: true,
            window: Duration::from_secs(5400),
            bind: "udp/localhost:9005-9008".parse().unwrap(),
        };
        let line = format!(
            "primitives {} {} {} {} {} {}",
            original.text, original.count, original.ratio, original.enabled, original.window,
            original.bind,
        );

        let mut d = cursor(&line);
        let mut decoded = Primitives::default();
        decode(&mut d, &mut decoded).unwrap();
        assert_eq!(decoded, original);
    }
}
