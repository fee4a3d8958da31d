//! Retention timeframe tokens.
//!
//! A token is a base-10 count followed by a single unit character, e.g.
//! `7d` or `12h`. Borg's `--keep-within` grammar spells hours with an
//! uppercase `H` while days, weeks, months and years stay lowercase, so
//! only the hour unit changes case when rendered.

use crate::error::ValidationError;
use std::fmt;
use std::str::FromStr;

/// Unit of a retention window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'h' => Some(TimeUnit::Hour),
            'd' => Some(TimeUnit::Day),
            'w' => Some(TimeUnit::Week),
            'm' => Some(TimeUnit::Month),
            'y' => Some(TimeUnit::Year),
            _ => None,
        }
    }

    /// The character borg expects for this unit.
    pub fn engine_char(self) -> char {
        match self {
            TimeUnit::Hour => 'H',
            TimeUnit::Day => 'd',
            TimeUnit::Week => 'w',
            TimeUnit::Month => 'm',
            TimeUnit::Year => 'y',
        }
    }
}

/// A validated retention window, rendered in borg's format by [`fmt::Display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedTimeframe {
    pub count: u64,
    pub unit: TimeUnit,
}

impl fmt::Display for NormalizedTimeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.engine_char())
    }
}

impl FromStr for NormalizedTimeframe {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

/// Parses a retention token such as `7d` into a [`NormalizedTimeframe`].
///
/// # Errors
/// - [`ValidationError::InvalidUnit`] if the last character is not one of
///   `h`, `d`, `w`, `m`, `y` (this includes the empty token).
/// - [`ValidationError::InvalidNumber`] if the characters before the unit
///   are not a base-10 integer.
pub fn normalize(token: &str) -> Result<NormalizedTimeframe, ValidationError> {
    let Some(last) = token.chars().next_back() else {
        return Err(invalid_unit(token, ""));
    };
    let Some(unit) = TimeUnit::from_char(last) else {
        return Err(invalid_unit(token, &last.to_string()));
    };

    let digits = &token[..token.len() - last.len_utf8()];
    // `u64::from_str` also takes a leading `+`, which borg does not.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_number(token, digits));
    }
    let count = digits
        .parse::<u64>()
        .map_err(|_| invalid_number(token, digits))?;

    Ok(NormalizedTimeframe { count, unit })
}

fn invalid_unit(token: &str, found: &str) -> ValidationError {
    ValidationError::InvalidUnit {
        token: token.to_string(),
        found: found.to_string(),
    }
}

fn invalid_number(token: &str, count: &str) -> ValidationError {
    ValidationError::InvalidNumber {
        token: token.to_string(),
        count: count.to_string(),
    }
}
