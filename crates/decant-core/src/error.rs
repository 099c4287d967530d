//! Lexical and literal parsing errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("line {line}: unterminated quoted token")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: unexpected closing brace")]
    UnexpectedCloseBrace { line: usize },

    #[error("line {line}: block is never closed")]
    UnclosedBlock { line: usize },

    #[error("invalid duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: String },

    #[error("invalid network address {input:?}: {reason}")]
    InvalidNetworkAddress { input: String, reason: String },

    #[error("invalid site address {input:?}: {reason}")]
    InvalidSiteAddress { input: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
