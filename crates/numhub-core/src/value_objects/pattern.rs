//! Premium digit-pattern classification
//!
//! A number is "premium" when its digits match one of five recognizable
//! shapes. Classification order doubles as the tie-break: palindrome wins
//! over mirror (a full palindrome always has matching ends), and symmetry
//! wins over runs and sequences.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Digit-pattern classes that mark a number as premium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumPattern {
    /// Three or more identical consecutive digits (e.g. "0007")
    Repeating,
    /// Every digit one greater than the previous (e.g. "12345")
    Ascending,
    /// Every digit one less than the previous (e.g. "54321")
    Descending,
    /// Reads the same forwards and backwards (e.g. "12321")
    Palindrome,
    /// First and last digit match without full symmetry (e.g. "51235")
    Mirror,
}

impl PremiumPattern {
    /// Classify a raw number string, ignoring any non-digit characters.
    ///
    /// Returns `None` for fewer than three digits or when no class matches.
    /// Check order is the documented tie-break: palindrome, mirror,
    /// repeating, ascending, descending.
    pub fn classify(number: &str) -> Option<Self> {
        let digits: Vec<u8> = number
            .chars()
            .filter(char::is_ascii_digit)
            .map(|c| c as u8 - b'0')
            .collect();

        if digits.len() < 3 {
            return None;
        }

        if digits.iter().eq(digits.iter().rev()) {
            return Some(Self::Palindrome);
        }
        if digits.first() == digits.last() {
            return Some(Self::Mirror);
        }
        if digits.windows(3).any(|w| w[0] == w[1] && w[1] == w[2]) {
            return Some(Self::Repeating);
        }
        if digits.windows(2).all(|w| w[0] + 1 == w[1]) {
            return Some(Self::Ascending);
        }
        if digits.windows(2).all(|w| w[0] == w[1] + 1) {
            return Some(Self::Descending);
        }

        None
    }

    /// Stable string tag used for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repeating => "repeating",
            Self::Ascending => "ascending",
            Self::Descending => "descending",
            Self::Palindrome => "palindrome",
            Self::Mirror => "mirror",
        }
    }
}

impl fmt::Display for PremiumPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PremiumPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "repeating" => Ok(Self::Repeating),
            "ascending" => Ok(Self::Ascending),
            "descending" => Ok(Self::Descending),
            "palindrome" => Ok(Self::Palindrome),
            "mirror" => Ok(Self::Mirror),
            other => Err(format!("unknown premium pattern: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeating() {
        assert_eq!(
            PremiumPattern::classify("0000555"),
            Some(PremiumPattern::Repeating)
        );
        assert_eq!(
            PremiumPattern::classify("+49 111 82"),
            Some(PremiumPattern::Repeating)
        );
    }

    #[test]
    fn test_sequences() {
        assert_eq!(
            PremiumPattern::classify("12345"),
            Some(PremiumPattern::Ascending)
        );
        assert_eq!(
            PremiumPattern::classify("54321"),
            Some(PremiumPattern::Descending)
        );
    }

    #[test]
    fn test_palindrome_beats_mirror() {
        assert_eq!(
            PremiumPattern::classify("12321"),
            Some(PremiumPattern::Palindrome)
        );
        // Symmetric, so palindrome even though it contains a run and
        // matching ends
        assert_eq!(
            PremiumPattern::classify("50005"),
            Some(PremiumPattern::Palindrome)
        );
    }

    #[test]
    fn test_mirror() {
        assert_eq!(
            PremiumPattern::classify("51235"),
            Some(PremiumPattern::Mirror)
        );
    }

    #[test]
    fn test_none() {
        assert_eq!(PremiumPattern::classify("13579"), None);
        assert_eq!(PremiumPattern::classify("12"), None);
        assert_eq!(PremiumPattern::classify("no digits"), None);
    }

    #[test]
    fn test_tag_roundtrip() {
        for p in [
            PremiumPattern::Repeating,
            PremiumPattern::Ascending,
            PremiumPattern::Descending,
            PremiumPattern::Palindrome,
            PremiumPattern::Mirror,
        ] {
            assert_eq!(p.as_str().parse::<PremiumPattern>().unwrap(), p);
        }
    }
}
