//! Generation time of a provenance activity
//!
//! The wire format is fixed to `YYYY-MM-DDTHH:MM:SS.sssZ`: exactly three
//! fractional digits and a literal `Z`. The caller's text is kept verbatim
//! because that text, not a re-rendering, is what goes into the document.

use crate::DomainError;
use chrono::NaiveDateTime;
use std::fmt;

/// Layout accepted by [`GenerationTime::parse`], without the trailing `Z`
const LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Length of a well-formed timestamp, e.g. `2018-11-10T12:15:55.028Z`
const TIMESTAMP_LEN: usize = 24;

/// A validated generation timestamp
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationTime {
    text: String,
}

impl GenerationTime {
    /// Parse and validate a timestamp
    ///
    /// # Errors
    /// Returns [`DomainError::TimestampFormat`] if the text does not match the
    /// fixed layout or names an impossible calendar instant.
    ///
    /// # Examples
    ///
    /// ```
    /// use provledger_domain::GenerationTime;
    ///
    /// let time = GenerationTime::parse("2018-11-10T12:15:55.028Z").unwrap();
    /// assert_eq!(time.as_str(), "2018-11-10T12:15:55.028Z");
    /// assert!(GenerationTime::parse("2006-01-02T15:04:05").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        check_shape(value).map_err(|reason| DomainError::TimestampFormat {
            value: value.to_string(),
            reason: reason.to_string(),
        })?;

        NaiveDateTime::parse_from_str(&value[..TIMESTAMP_LEN - 1], LAYOUT).map_err(|e| {
            DomainError::TimestampFormat {
                value: value.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            text: value.to_string(),
        })
    }

    /// The timestamp exactly as supplied by the caller
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for GenerationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Positional check of `YYYY-MM-DDTHH:MM:SS.sssZ`
///
/// chrono alone accepts any number of fractional digits, so the layout is
/// pinned here before calendar validation.
fn check_shape(value: &str) -> Result<(), &'static str> {
    let bytes = value.as_bytes();
    if bytes.len() != TIMESTAMP_LEN {
        return Err("expected YYYY-MM-DDTHH:MM:SS.sssZ");
    }

    for (i, b) in bytes.iter().enumerate() {
        let ok = match i {
            4 | 7 => *b == b'-',
            10 => *b == b'T',
            13 | 16 => *b == b':',
            19 => *b == b'.',
            23 => *b == b'Z',
            _ => b.is_ascii_digit(),
        };
        if !ok {
            return Err("expected YYYY-MM-DDTHH:MM:SS.sssZ");
        }
    }

    Ok(())
}
