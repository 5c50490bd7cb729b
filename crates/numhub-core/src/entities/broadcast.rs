//! Broadcast run descriptor
//!
//! The persisted progress row is the single source of truth for whether a
//! run is still going and how far it got, surviving process restarts.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::value_objects::{AdId, UserId};

/// Run lifecycle. Transitions only move forward:
/// `Running -> Stopped` (cancellation) or `Running -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastStatus {
    Running,
    Stopped,
    Completed,
}

impl BroadcastStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
        }
    }

    /// Terminal states never transition again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for BroadcastStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BroadcastStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown broadcast status: {other}")),
        }
    }
}

/// Durable progress descriptor for one fan-out run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastRun {
    /// Unique run identifier (uuid)
    pub run_id: String,
    pub ad_id: AdId,
    /// Last processed target; the worker resumes above this id
    pub cursor: Option<UserId>,
    /// Size of the audience snapshot resolved at start
    pub total_users: i64,
    pub sent_count: i64,
    pub failed_count: i64,
    pub status: BroadcastStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Bounded, newline-separated delivery error summaries
    pub errors: String,
}

impl BroadcastRun {
    /// Fresh descriptor in the running state
    pub fn new(run_id: impl Into<String>, ad_id: AdId, total_users: i64) -> Self {
        Self {
            run_id: run_id.into(),
            ad_id,
            cursor: None,
            total_users,
            sent_count: 0,
            failed_count: 0,
            status: BroadcastStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            errors: String::new(),
        }
    }

    /// Targets processed so far; never exceeds `total_users`
    pub fn attempted(&self) -> i64 {
        self.sent_count + self.failed_count
    }
}

/// Progress snapshot joined with the advertisement content, for status
/// reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub run: BroadcastRun,
    pub ad_title: String,
    pub ad_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for s in [
            BroadcastStatus::Running,
            BroadcastStatus::Stopped,
            BroadcastStatus::Completed,
        ] {
            assert_eq!(s.as_str().parse::<BroadcastStatus>().unwrap(), s);
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!BroadcastStatus::Running.is_terminal());
        assert!(BroadcastStatus::Stopped.is_terminal());
        assert!(BroadcastStatus::Completed.is_terminal());
    }

    #[test]
    fn test_new_run() {
        let run = BroadcastRun::new("run-1", AdId::new(3), 250);
        assert_eq!(run.status, BroadcastStatus::Running);
        assert_eq!(run.attempted(), 0);
        assert_eq!(run.cursor, None);
        assert!(run.ended_at.is_none());
    }
}
