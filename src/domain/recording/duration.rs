//! Human-friendly duration value object ("30s", "2m30s", "1h")

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default one-shot recording length (10 seconds)
pub const DEFAULT_DURATION_SECS: u64 = 10;

/// Default safety limit for a daemon recording (60 seconds)
pub const DEFAULT_MAX_DURATION_SECS: u64 = 60;

/// Value object representing a positive, whole-second-or-better duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    pub const fn default_duration() -> Self {
        Self::from_secs(DEFAULT_DURATION_SECS)
    }

    pub const fn default_max_duration() -> Self {
        Self::from_secs(DEFAULT_MAX_DURATION_SECS)
    }

    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl From<Duration> for StdDuration {
    fn from(d: Duration) -> Self {
        d.as_std()
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Accepts a sequence of `<number><unit>` groups with units `h`, `m`, `s`,
    /// each unit at most once and in descending order ("1h30m", "2m30s", "45s").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DurationParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_lowercase();

        let mut total_secs: u64 = 0;
        let mut digits = String::new();
        // Rank of the last unit seen: h=3, m=2, s=1. Units must strictly descend.
        let mut last_rank = u8::MAX;

        for ch in input.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }

            let (rank, factor) = match ch {
                'h' => (3, 3600),
                'm' => (2, 60),
                's' => (1, 1),
                _ => return Err(err()),
            };
            if digits.is_empty() || rank >= last_rank {
                return Err(err());
            }

            let value: u64 = digits.parse().map_err(|_| err())?;
            total_secs = value
                .checked_mul(factor)
                .and_then(|v| total_secs.checked_add(v))
                .ok_or_else(err)?;
            digits.clear();
            last_rank = rank;
        }

        // Trailing bare number, or nothing parsed at all
        if !digits.is_empty() || last_rank == u8::MAX || total_secs == 0 {
            return Err(err());
        }

        Ok(Self::from_secs(total_secs))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.as_secs();
        let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

        if hours > 0 {
            write!(f, "{}h", hours)?;
        }
        if minutes > 0 {
            write!(f, "{}m", minutes)?;
        }
        if seconds > 0 || total == 0 {
            write!(f, "{}s", seconds)?;
        }
        Ok(())
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_duration()
    }
}
