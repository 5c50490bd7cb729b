//! Activation proof entity and code validation

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// An activation proof submitted by a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub id: i64,
    pub user_id: UserId,
    pub number: String,
    pub platform: Option<String>,
    pub code: String,
    pub country_name: String,
    pub posted_at: DateTime<Utc>,
    pub verified: bool,
    pub verified_by: Option<UserId>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Fields for recording a submission
#[derive(Debug, Clone)]
pub struct NewProof {
    pub user_id: UserId,
    pub number: String,
    pub platform: Option<String>,
    pub code: String,
    pub country_name: String,
}

/// Validate and canonicalize a submitted activation code.
///
/// Whitespace and punctuation are stripped; the remainder must be 4-12
/// alphanumeric characters. Returns the uppercased code, or `None` when the
/// submission is unusable.
pub fn normalize_proof_code(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if !(4..=12).contains(&cleaned.len()) {
        return None;
    }

    Some(cleaned.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_and_uppercases() {
        assert_eq!(normalize_proof_code(" ab-12 34 "), Some("AB1234".to_string()));
        assert_eq!(normalize_proof_code("98765"), Some("98765".to_string()));
    }

    #[test]
    fn test_normalize_length_bounds() {
        assert_eq!(normalize_proof_code("abc"), None);
        assert_eq!(normalize_proof_code("a".repeat(13).as_str()), None);
        assert_eq!(
            normalize_proof_code("a".repeat(12).as_str()),
            Some("A".repeat(12))
        );
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert_eq!(normalize_proof_code(""), None);
        assert_eq!(normalize_proof_code("----"), None);
    }
}
