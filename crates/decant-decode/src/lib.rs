//! Schema-driven decoding of block directives into typed records.
//!
//! This crate handles:
//! - Field roles declared per record field (positional, named entry,
//!   indexed block, matcher)
//! - Schema extraction and validation from a record's field table
//! - Coercion of raw tokens into typed values
//! - The recursive argument/block walk over a token stream
//!
//! Records are declared with the [`directive!`] macro and decoded with
//! [`decode`] or [`decode_with`]:
//!
//! ```
//! use decant_core::Dispenser;
//! use decant_decode::{decode, directive};
//!
//! directive! {
//!     /// `limit <zone> [<burst>] { window <duration>, log }`
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Limit {
//!         "$1" zone: String,
//!         "$2,optional" burst: u32,
//!         "window" window: decant_core::Duration,
//!         _ log: bool,
//!     }
//! }
//!
//! let mut cursor: Dispenser = "limit per_ip 20 {\n  window 30s\n  log\n}"
//!     .parse()
//!     .unwrap();
//! cursor.next(); // the directive name is the caller's to consume
//!
//! let mut limit = Limit::default();
//! decode(&mut cursor, &mut limit).unwrap();
//! assert_eq!(limit.zone, "per_ip");
//! assert_eq!(limit.burst, 20);
//! assert!(limit.log);
//! ```

pub mod decode;
pub mod error;
pub mod field;
pub mod matcher;
pub mod schema;
pub mod value;

mod macros;

pub use decode::{Driver, decode, decode_body, decode_segment, decode_with};
pub use error::{DecodeError, DecodeResult};
pub use field::{Directive, FieldDef, FieldRole};
pub use matcher::{MatcherSource, NamedMatchers};
pub use schema::Schema;
pub use value::FieldValue;
