// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-width string handling, matching the definition store's on-disk
//! representation: 63 payload bytes plus a terminator byte in the
//! fixed-width array it's stored as.

use std::fmt;

/// Payload byte budget before truncation (the 64th byte is the
/// terminator byte in the fixed-width array representation).
pub const MAX_PAYLOAD_BYTES: usize = 63;

/// A string truncated to [`MAX_PAYLOAD_BYTES`] on construction, so callers
/// never have to remember to truncate it themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TruncatedString(String);

impl TruncatedString {
    pub fn new(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.len() <= MAX_PAYLOAD_BYTES {
            return Self(s);
        }
        let mut end = MAX_PAYLOAD_BYTES;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        Self(s[..end].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TruncatedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TruncatedString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for TruncatedString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[yare::parameterized(
        empty              = { "", 0 },
        short              = { "red", 3 },
        exactly_at_budget  = { "a", MAX_PAYLOAD_BYTES },
        one_over_budget    = { "a", MAX_PAYLOAD_BYTES + 1 },
        far_over_budget    = { "x", 200 },
    )]
    fn truncates_to_at_most_the_payload_budget(unit: &str, repeat: usize) {
        let input = unit.repeat(repeat);
        let truncated = TruncatedString::new(input.clone());
        assert_eq!(truncated.as_str().len(), input.len().min(MAX_PAYLOAD_BYTES));
    }

    #[test]
    fn truncation_does_not_split_a_utf8_boundary() {
        let long = "é".repeat(40); // 2 bytes each, 80 bytes total
        let truncated = TruncatedString::new(long);
        assert!(truncated.as_str().len() <= MAX_PAYLOAD_BYTES);
        assert!(std::str::from_utf8(truncated.as_str().as_bytes()).is_ok());
    }
}
