//! Broadcast audience filters

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which users a broadcast targets. Banned users are always excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudienceFilter {
    /// Every non-banned user
    #[default]
    All,
    /// Users with an active PRO flag
    Pro,
    /// Users with a positive points balance
    WithPoints,
}

impl AudienceFilter {
    /// Stable string tag used for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pro => "pro",
            Self::WithPoints => "points",
        }
    }

    /// Parse a stored tag, falling back to `All` for unknown values
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for AudienceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AudienceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "pro" => Ok(Self::Pro),
            "points" => Ok(Self::WithPoints),
            other => Err(format!("unknown audience filter: {other}")),
        }
    }
}
