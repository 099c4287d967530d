//! Cursor over a directive token stream.
//!
//! A [`Dispenser`] hands out tokens one at a time and understands the
//! line/block structure of a directive: arguments are further tokens on the
//! current line, blocks are brace-delimited runs opened at the end of a line.
//! Decoders advance it with [`next_arg`](Dispenser::next_arg) and
//! [`next_block`](Dispenser::next_block) and never touch tokens directly.

use std::str::FromStr;

use crate::error::{Error, Result};
use crate::lexer::{Token, tokenize};

/// A positioned cursor over a token stream.
///
/// The cursor starts before the first token; call [`next`](Dispenser::next)
/// to load it. Block nesting is tracked as blocks are entered and closed via
/// [`next_block`](Dispenser::next_block).
#[derive(Debug, Clone)]
pub struct Dispenser {
    tokens: Vec<Token>,
    pos: Option<usize>,
    nesting: usize,
}

impl FromStr for Dispenser {
    type Err = Error;

    /// Tokenize directive text and validate brace balance up front.
    fn from_str(input: &str) -> Result<Self> {
        let tokens = tokenize(input)?;

        let mut opens = Vec::new();
        for token in &tokens {
            if token.is_open_brace() {
                opens.push(token.line);
            } else if token.is_close_brace() && opens.pop().is_none() {
                return Err(Error::UnexpectedCloseBrace { line: token.line });
            }
        }
        if let Some(line) = opens.pop() {
            return Err(Error::UnclosedBlock { line });
        }

        Ok(Self::new(tokens))
    }
}

impl Dispenser {
    /// Build a dispenser over an already-lexed token list.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: None,
            nesting: 0,
        }
    }

    fn token(&self) -> Option<&Token> {
        self.pos.and_then(|p| self.tokens.get(p))
    }

    /// Text of the current token, or `""` before the first token.
    pub fn val(&self) -> &str {
        self.token().map_or("", |t| t.text.as_str())
    }

    /// Source line of the current token, or 0 before the first token.
    pub fn line(&self) -> usize {
        self.token().map_or(0, |t| t.line)
    }

    /// Current block nesting depth.
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    /// Advance to the next token regardless of line or block structure.
    pub fn next(&mut self) -> bool {
        let next = self.pos.map_or(0, |p| p + 1);
        if next < self.tokens.len() {
            self.pos = Some(next);
            true
        } else {
            false
        }
    }

    fn back(&mut self) {
        self.pos = match self.pos {
            Some(p) if p > 0 => Some(p - 1),
            _ => None,
        };
    }

    fn at_open_brace(&self) -> bool {
        self.token().is_some_and(Token::is_open_brace)
    }

    fn at_close_brace(&self) -> bool {
        self.token().is_some_and(Token::is_close_brace)
    }

    /// Advance if the next token is on the current line, braces included.
    fn next_on_same_line(&mut self) -> bool {
        let Some(p) = self.pos else { return false };
        match self.tokens.get(p + 1) {
            Some(t) if t.line == self.tokens[p].line => {
                self.pos = Some(p + 1);
                true
            }
            _ => false,
        }
    }

    /// Advance to the next argument: a token on the current line that is not
    /// an unquoted brace.
    pub fn next_arg(&mut self) -> bool {
        if self.peek_arg().is_none() {
            return false;
        }
        self.pos = Some(self.pos.unwrap() + 1);
        true
    }

    /// Text of the argument `next_arg` would move to, without moving.
    pub fn peek_arg(&self) -> Option<&str> {
        let p = self.pos?;
        let t = self.tokens.get(p + 1)?;
        (t.line == self.tokens[p].line && !t.is_brace()).then_some(t.text.as_str())
    }

    /// Enter a block opening on the current line, or step through a block
    /// already entered at a depth greater than `initial`.
    ///
    /// On entry the cursor lands on the first token inside the block and the
    /// nesting depth increases; an empty `{}` is consumed whole and reported
    /// as no block. While inside, each call advances one token, and the call
    /// that reaches the closing brace restores the depth and returns false.
    /// Used as a loop condition this visits the first token of every line of
    /// a block whose lines are otherwise fully consumed.
    pub fn next_block(&mut self, initial: usize) -> bool {
        if self.nesting > initial {
            if !self.next() {
                return false;
            }
            if self.at_open_brace() {
                self.nesting += 1;
            } else if self.at_close_brace() {
                self.nesting -= 1;
            }
            return self.nesting > initial;
        }

        if !self.next_on_same_line() {
            return false;
        }
        if !self.at_open_brace() {
            self.back();
            return false;
        }
        if !self.next() {
            return false;
        }
        if self.at_close_brace() {
            return false;
        }
        self.nesting += 1;
        true
    }

    /// Number of arguments left on the current line, without moving.
    pub fn count_remaining_args(&self) -> usize {
        let Some(p) = self.pos else { return 0 };
        let line = self.tokens[p].line;
        self.tokens[p + 1..]
            .iter()
            .take_while(|t| t.line == line && !t.is_brace())
            .count()
    }

    /// Skip the rest of the current segment: all remaining arguments on the
    /// line plus a trailing block, if the line opens one.
    pub fn skip_segment(&mut self) {
        while self.next_arg() {}
        let initial = self.nesting;
        if self.next_block(initial) {
            while self.next_block(initial) {}
        }
    }
}
