//! Reporting-period tokens and window resolution.
//!
//! The dashboard selects its reporting window with a short period token
//! (`7d`, `30d`, `90d`, `1y`). Resolution turns a token into a concrete
//! [`PeriodWindow`]: an inclusive date range ending "today" plus the
//! aggregation granularity charts should use for that span.
//!
//! "Today" is always an explicit parameter rather than being read from the
//! wall clock inside this module, so callers control it and tests can pin
//! it to a fixed date.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while resolving a reporting period.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    /// The period token is not one of the supported values.
    #[error("Unknown period token: '{0}' (expected 7d, 30d, 90d or 1y)")]
    InvalidPeriod(String),
}

/// Bucket size used within a resolved period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per calendar day.
    Daily,
    /// Monday-aligned calendar weeks.
    Weekly,
    /// Calendar months.
    Monthly,
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

/// A supported reporting period token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// The trailing 7 days, charted daily.
    #[serde(rename = "7d")]
    SevenDays,
    /// The trailing 30 days, charted daily. The default.
    #[serde(rename = "30d")]
    ThirtyDays,
    /// The trailing 90 days, charted weekly.
    #[serde(rename = "90d")]
    NinetyDays,
    /// The trailing 365 days, charted monthly.
    #[serde(rename = "1y")]
    OneYear,
}

impl Default for Period {
    fn default() -> Self {
        Self::ThirtyDays
    }
}

impl Period {
    /// Parses a period token.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::InvalidPeriod`] for anything other than the
    /// four supported tokens.
    pub fn parse(token: &str) -> Result<Self, PeriodError> {
        match token {
            "7d" => Ok(Self::SevenDays),
            "30d" => Ok(Self::ThirtyDays),
            "90d" => Ok(Self::NinetyDays),
            "1y" => Ok(Self::OneYear),
            other => Err(PeriodError::InvalidPeriod(other.to_string())),
        }
    }

    /// The token as it appears in request query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SevenDays => "7d",
            Self::ThirtyDays => "30d",
            Self::NinetyDays => "90d",
            Self::OneYear => "1y",
        }
    }

    /// Window length in days.
    #[must_use]
    pub const fn days(self) -> u64 {
        match self {
            Self::SevenDays => 7,
            Self::ThirtyDays => 30,
            Self::NinetyDays => 90,
            Self::OneYear => 365,
        }
    }

    /// Chart granularity for this period.
    #[must_use]
    pub const fn granularity(self) -> Granularity {
        match self {
            Self::SevenDays | Self::ThirtyDays => Granularity::Daily,
            Self::NinetyDays => Granularity::Weekly,
            Self::OneYear => Granularity::Monthly,
        }
    }

    /// Resolves this period against the given "today".
    ///
    /// The window covers `today - (days - 1)` through `today`, inclusive.
    #[must_use]
    pub fn window(self, today: NaiveDate) -> PeriodWindow {
        let start = today
            .checked_sub_days(Days::new(self.days() - 1))
            .unwrap_or(NaiveDate::MIN);
        PeriodWindow {
            period: self,
            start,
            end: today,
            granularity: self.granularity(),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved reporting window: inclusive date range plus granularity.
///
/// Constructed per request, consumed once, discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodWindow {
    /// The token this window was resolved from.
    pub period: Period,
    /// First day of the window, inclusive.
    pub start: NaiveDate,
    /// Last day of the window, inclusive ("today" at resolution time).
    pub end: NaiveDate,
    /// Bucket size charts should use within the window.
    pub granularity: Granularity,
}

impl PeriodWindow {
    /// Resolves an optional period token, substituting the default window
    /// for a missing or unrecognized token.
    ///
    /// An unrecognized token is recovered locally (availability over
    /// strictness) and logged; it is never surfaced to the caller.
    #[must_use]
    pub fn resolve_or_default(token: Option<&str>, today: NaiveDate) -> Self {
        let period = match token {
            None => Period::default(),
            Some(raw) => Period::parse(raw).unwrap_or_else(|err| {
                tracing::warn!(%err, "falling back to default period");
                Period::default()
            }),
        };
        period.window(today)
    }

    /// Window length in days.
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The immediately preceding window of equal length.
    ///
    /// Used for period-over-period deltas: a `30d` window ending today is
    /// compared against the 30 days before its start.
    #[must_use]
    pub fn preceding(&self) -> Self {
        let len = Days::new(self.days_u64());
        Self {
            period: self.period,
            start: self
                .start
                .checked_sub_days(len)
                .unwrap_or(NaiveDate::MIN),
            end: self
                .end
                .checked_sub_days(len)
                .unwrap_or(NaiveDate::MIN),
            granularity: self.granularity,
        }
    }

    fn days_u64(&self) -> u64 {
        u64::try_from(self.len_days()).unwrap_or(0)
    }
}
