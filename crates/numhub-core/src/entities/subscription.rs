//! PRO subscription lifecycle types

use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::value_objects::UserId;

/// How a subscription was acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProMethod {
    /// Granted by an administrator
    Admin,
    /// Purchased with points
    Points,
}

impl ProMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Points => "points",
        }
    }
}

impl fmt::Display for ProMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "points" => Ok(Self::Points),
            other => Err(format!("unknown pro method: {other}")),
        }
    }
}

/// One subscription record. Deactivated on expiry or revocation, never
/// deleted; a user has at most one active row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProSubscription {
    pub id: i64,
    pub user_id: UserId,
    pub method: ProMethod,
    pub points_paid: i64,
    pub days: i32,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

impl ProSubscription {
    /// Whether the subscription has lapsed at `now`
    pub fn expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A grant command. The expiry timestamp is computed exactly once here and
/// reused for both the subscription row and the user row, so the two can
/// never disagree.
#[derive(Debug, Clone, Copy)]
pub struct ProGrant {
    pub user_id: UserId,
    pub days: i32,
    pub method: ProMethod,
    /// Points to debit; zero for admin grants
    pub points_cost: i64,
    pub expires_at: DateTime<Utc>,
}

impl ProGrant {
    pub fn new(
        user_id: UserId,
        days: i32,
        method: ProMethod,
        points_cost: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            days,
            method,
            points_cost,
            expires_at: now + Duration::days(i64::from(days)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_expiry_computed_once() {
        let now = Utc::now();
        let grant = ProGrant::new(UserId::new(1), 30, ProMethod::Points, 100, now);
        assert_eq!(grant.expires_at, now + Duration::days(30));
    }

    #[test]
    fn test_method_roundtrip() {
        assert_eq!("admin".parse::<ProMethod>().unwrap(), ProMethod::Admin);
        assert_eq!("points".parse::<ProMethod>().unwrap(), ProMethod::Points);
        assert!("gift".parse::<ProMethod>().is_err());
    }

    #[test]
    fn test_expired_at() {
        let now = Utc::now();
        let sub = ProSubscription {
            id: 1,
            user_id: UserId::new(1),
            method: ProMethod::Admin,
            points_paid: 0,
            days: 30,
            started_at: now - Duration::days(31),
            expires_at: now - Duration::days(1),
            is_active: true,
        };
        assert!(sub.expired_at(now));
        assert!(!sub.expired_at(now - Duration::days(2)));
    }
}
