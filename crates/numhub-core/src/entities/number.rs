//! Number entity - a disposable identifier belonging to one country

use chrono::{DateTime, Utc};

use crate::value_objects::{CountryId, NumberId, PremiumPattern, UserId};

/// A distributable number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number {
    pub id: NumberId,
    pub country_id: CountryId,
    pub digits: String,
    pub platform: Option<String>,
    pub added_by: Option<UserId>,
    pub added_at: DateTime<Utc>,
    pub is_premium: bool,
    pub premium_pattern: Option<PremiumPattern>,
    pub times_used: i32,
    pub last_used: Option<DateTime<Utc>>,
}

impl Number {
    /// Render with a leading plus sign
    pub fn display(&self) -> String {
        if self.digits.starts_with('+') {
            self.digits.clone()
        } else {
            format!("+{}", self.digits)
        }
    }
}

/// Fields for inserting a number; premium classification happens here so
/// every insert path agrees on the pattern tag
#[derive(Debug, Clone)]
pub struct NewNumber {
    pub digits: String,
    pub platform: Option<String>,
    pub added_by: Option<UserId>,
    pub is_premium: bool,
    pub premium_pattern: Option<PremiumPattern>,
}

impl NewNumber {
    /// Build an insert record, deriving the premium flag from the digits
    pub fn classified(
        digits: impl Into<String>,
        platform: Option<String>,
        added_by: Option<UserId>,
    ) -> Self {
        let digits = digits.into();
        let premium_pattern = PremiumPattern::classify(&digits);
        Self {
            digits,
            platform,
            added_by,
            is_premium: premium_pattern.is_some(),
            premium_pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_adds_plus() {
        let number = Number {
            id: NumberId::new(1),
            country_id: CountryId::new(1),
            digits: "4912345".to_string(),
            platform: None,
            added_by: None,
            added_at: Utc::now(),
            is_premium: false,
            premium_pattern: None,
            times_used: 0,
            last_used: None,
        };
        assert_eq!(number.display(), "+4912345");
    }

    #[test]
    fn test_classified_sets_premium() {
        let plain = NewNumber::classified("13579", None, None);
        assert!(!plain.is_premium);
        assert_eq!(plain.premium_pattern, None);

        let premium = NewNumber::classified("5550123", None, Some(UserId::new(1)));
        assert!(premium.is_premium);
        assert_eq!(premium.premium_pattern, Some(PremiumPattern::Repeating));
    }
}
