//! Scheduling tokens accepted after a post is approved for publishing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Delay applied when a post is approved without choosing a token
/// (edited drafts and management approvals).
pub const DEFAULT_PUBLISH_DELAY_MINUTES: i64 = 5;

/// One of the fixed scheduling choices offered in the scheduling menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchedulingToken {
    Now,
    OneHour,
    FourHours,
    TwelveHours,
    OneDay,
    TwoDays,
    OneWeek,
}

impl SchedulingToken {
    pub const ALL: [SchedulingToken; 7] = [
        SchedulingToken::Now,
        SchedulingToken::OneHour,
        SchedulingToken::FourHours,
        SchedulingToken::TwelveHours,
        SchedulingToken::OneDay,
        SchedulingToken::TwoDays,
        SchedulingToken::OneWeek,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulingToken::Now => "now",
            SchedulingToken::OneHour => "1h",
            SchedulingToken::FourHours => "4h",
            SchedulingToken::TwelveHours => "12h",
            SchedulingToken::OneDay => "1d",
            SchedulingToken::TwoDays => "2d",
            SchedulingToken::OneWeek => "1w",
        }
    }

    /// Delay from the moment the token is received. `now` maps to one
    /// minute so the publish time is always in the future.
    pub fn offset(&self) -> TimeDelta {
        match self {
            SchedulingToken::Now => TimeDelta::minutes(1),
            SchedulingToken::OneHour => TimeDelta::hours(1),
            SchedulingToken::FourHours => TimeDelta::hours(4),
            SchedulingToken::TwelveHours => TimeDelta::hours(12),
            SchedulingToken::OneDay => TimeDelta::days(1),
            SchedulingToken::TwoDays => TimeDelta::days(2),
            SchedulingToken::OneWeek => TimeDelta::days(7),
        }
    }

    pub fn publish_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.offset()
    }
}

impl fmt::Display for SchedulingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedulingToken {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SchedulingToken::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::Validation(format!("unknown scheduling option '{}'", s)))
    }
}

/// Publish time used when no token was chosen.
pub fn default_publish_time(now: DateTime<Utc>) -> DateTime<Utc> {
    now + TimeDelta::minutes(DEFAULT_PUBLISH_DELAY_MINUTES)
}
