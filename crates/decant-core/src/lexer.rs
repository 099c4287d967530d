//! Lexing of directive text into line-tracked tokens.
//!
//! Tokens are whitespace-delimited. Double-quoted tokens may contain
//! whitespace and braces; `\"` and `\\` are the recognized escapes. A `#` at
//! the start of a token comments out the rest of the line. Braces are plain
//! tokens; the [`Dispenser`](crate::Dispenser) gives them block meaning.

use crate::error::{Error, Result};

/// One lexical unit of a directive, with its source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub line: usize,
    pub text: String,
    /// Quoted tokens never act as block braces.
    pub quoted: bool,
}

impl Token {
    pub fn bare(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
            quoted: false,
        }
    }

    pub fn quoted(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
            quoted: true,
        }
    }

    pub(crate) fn is_open_brace(&self) -> bool {
        !self.quoted && self.text == "{"
    }

    pub(crate) fn is_close_brace(&self) -> bool {
        !self.quoted && self.text == "}"
    }

    pub(crate) fn is_brace(&self) -> bool {
        self.is_open_brace() || self.is_close_brace()
    }
}

/// Split directive text into tokens.
///
/// Newlines separate directive lines; quoted tokens must close on the line
/// they open on.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut line = 1usize;
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\n' => break,
                        '\\' => match chars.peek() {
                            Some(&escaped @ ('"' | '\\')) => {
                                text.push(escaped);
                                chars.next();
                            }
                            _ => text.push('\\'),
                        },
                        c => text.push(c),
                    }
                }
                if !closed {
                    return Err(Error::UnterminatedQuote { line });
                }
                tokens.push(Token::quoted(line, text));
            }
            _ => {
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    text.push(c);
                    chars.next();
                }
                tokens.push(Token::bare(line, text));
            }
        }
    }

    Ok(tokens)
}
