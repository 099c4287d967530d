//! Duration literals.
//!
//! Directive text spells durations as unit-suffixed segments: `250ms`,
//! `1.5h`, `1h30m`, `2d`. [`Duration`] accepts the extended grammar with the
//! `d` (day) unit; [`parse_std`] accepts the base grammar only and yields a
//! plain [`std::time::Duration`].

use std::fmt;
use std::str::FromStr;

use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A duration parsed from the extended literal grammar.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, From,
)]
pub struct Duration(pub std::time::Duration);

impl Duration {
    pub fn from_secs(secs: u64) -> Self {
        Self(std::time::Duration::from_secs(secs))
    }

    pub fn as_std(&self) -> std::time::Duration {
        self.0
    }
}

impl FromStr for Duration {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        parse_nanos(input, true).map(|ns| Self(std::time::Duration::from_nanos(ns)))
    }
}

/// Parse the base grammar (no `d` unit) into a [`std::time::Duration`].
pub fn parse_std(input: &str) -> Result<std::time::Duration> {
    parse_nanos(input, false).map(std::time::Duration::from_nanos)
}

fn invalid(input: &str, reason: &str) -> Error {
    Error::InvalidDuration {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_nanos(input: &str, allow_days: bool) -> Result<u64> {
    if input.is_empty() {
        return Err(invalid(input, "empty string"));
    }
    if input == "0" {
        return Ok(0);
    }

    let mut total = 0f64;
    let mut rest = input;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(|| invalid(input, "missing unit"))?;
        let value: f64 = rest[..num_end]
            .parse()
            .map_err(|_| invalid(input, "invalid numeric value"))?;

        let unit = &rest[num_end..];
        let (nanos_per_unit, unit_len) = if unit.starts_with("ns") {
            (1f64, 2)
        } else if unit.starts_with("us") {
            (1e3, 2)
        } else if unit.starts_with("µs") {
            (1e3, "µs".len())
        } else if unit.starts_with("ms") {
            (1e6, 2)
        } else if unit.starts_with('s') {
            (1e9, 1)
        } else if unit.starts_with('m') {
            (60e9, 1)
        } else if unit.starts_with('h') {
            (3600e9, 1)
        } else if unit.starts_with('d') && allow_days {
            (86400e9, 1)
        } else {
            return Err(invalid(input, "unknown unit"));
        };

        total += value * nanos_per_unit;
        rest = &unit[unit_len..];
    }

    if total > u64::MAX as f64 {
        return Err(invalid(input, "value overflows"));
    }
    Ok(total as u64)
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ns = self.0.as_nanos();
        if ns == 0 {
            return write!(f, "0s");
        }
        for (nanos_per_unit, name) in [
            (3_600_000_000_000, "h"),
            (60_000_000_000, "m"),
            (1_000_000_000, "s"),
            (1_000_000, "ms"),
            (1_000, "us"),
            (1, "ns"),
        ] {
            let count = ns / nanos_per_unit;
            if count > 0 {
                write!(f, "{count}{name}")?;
                ns %= nanos_per_unit;
            }
        }
        Ok(())
    }
}
