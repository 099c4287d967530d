//! Decode errors.
//!
//! Schema errors surface before any token is consumed; structural and
//! coercion errors abort the walk at the first failure. As an error unwinds
//! through nested blocks it is wrapped with the position it crossed, so the
//! final message reads as a breadcrumb trail from the outermost directive
//! down to the offending token.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    // Schema errors: the record declaration itself is wrong.
    #[error("invalid tag {tag:?} on field {field:?}")]
    InvalidTag {
        field: &'static str,
        tag: &'static str,
    },

    #[error("duplicate field index {index}")]
    DuplicateIndex { index: usize },

    #[error("required field at index {index} follows an optional field")]
    RequiredAfterOptional { index: usize },

    #[error("cannot extract fields: {source}")]
    Schema { source: Box<DecodeError> },

    // Structural errors: the token stream does not fit the schema.
    #[error("unexpected argument at [{position}]: {token}")]
    UnexpectedArgument { position: usize, token: String },

    #[error("unexpected block at [{position}]")]
    UnexpectedBlock { position: usize },

    #[error("missing required field at index {index}")]
    MissingField { index: usize },

    #[error("unexpected argument after {entry:?}")]
    TrailingArgument { entry: String },

    #[error("matcher field declared but the cursor has no matcher support")]
    NoMatcherSupport,

    #[error("matcher must target a module map field")]
    InvalidMatcherField,

    #[error("unrecognized matcher @{name}")]
    UnknownMatcher { name: String },

    // Coercion errors: a token does not parse as the field's type.
    #[error("cannot parse integer {token:?}")]
    InvalidInt {
        token: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("cannot parse float {token:?}")]
    InvalidFloat {
        token: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("cannot parse boolean {token:?}")]
    InvalidBool {
        token: String,
        #[source]
        source: std::str::ParseBoolError,
    },

    #[error(transparent)]
    Literal(#[from] decant_core::Error),

    #[error("type {ty} does not support {operation}")]
    Unsupported {
        ty: &'static str,
        operation: &'static str,
    },

    // Breadcrumb wrappers added as an error unwinds.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        source: Box<DecodeError>,
    },

    #[error("at [{position}]: {source}")]
    AtPosition {
        position: usize,
        source: Box<DecodeError>,
    },

    #[error("in {name:?}: {source}")]
    InEntry {
        name: String,
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    pub fn unsupported<T: ?Sized>(operation: &'static str) -> Self {
        Self::Unsupported {
            ty: std::any::type_name::<T>(),
            operation,
        }
    }

    pub fn at_line(self, line: usize) -> Self {
        Self::AtLine {
            line,
            source: Box::new(self),
        }
    }

    pub fn at_position(self, position: usize) -> Self {
        Self::AtPosition {
            position,
            source: Box::new(self),
        }
    }

    pub fn in_entry(self, name: impl Into<String>) -> Self {
        Self::InEntry {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error under any breadcrumb wrappers.
    pub fn root(&self) -> &DecodeError {
        match self {
            Self::AtLine { source, .. }
            | Self::AtPosition { source, .. }
            | Self::InEntry { source, .. }
            | Self::Schema { source } => source.root(),
            other => other,
        }
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadcrumb_display() {
        let err = DecodeError::MissingField { index: 2 }
            .in_entry("upstream")
            .at_line(4);
        assert_eq!(
            err.to_string(),
            "line 4: in \"upstream\": missing required field at index 2"
        );
    }

    #[test]
    fn test_root_unwraps_wrappers() {
        let err = DecodeError::UnexpectedBlock { position: 1 }
            .at_position(1)
            .in_entry("x")
            .at_line(9);
        assert!(matches!(
            err.root(),
            DecodeError::UnexpectedBlock { position: 1 }
        ));
    }
}
