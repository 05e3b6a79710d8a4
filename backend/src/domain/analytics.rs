//! Analytics snapshots returned by the analytics collaborator.
//!
//! Every windowed aggregate is reported over a half-open UTC [`TimeRange`]
//! and broken down per calendar day. Totals are derived from the daily series
//! so the two can never disagree.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Bounds applied to analytics time windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindowLimits {
    default_days: u32,
    max_days: u32,
}

impl Default for TimeWindowLimits {
    fn default() -> Self {
        Self {
            default_days: 7,
            max_days: 90,
        }
    }
}

impl TimeWindowLimits {
    /// Build limits, rejecting a zero maximum or a default above it.
    pub const fn new(default_days: u32, max_days: u32) -> Option<Self> {
        if max_days == 0 || default_days == 0 || default_days > max_days {
            return None;
        }
        Some(Self {
            default_days,
            max_days,
        })
    }

    /// Window applied when the client omits `from`.
    pub const fn default_days(&self) -> u32 {
        self.default_days
    }

    /// Longest window a client may request.
    pub const fn max_days(&self) -> u32 {
        self.max_days
    }
}

/// Errors raised while validating a time range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeRangeError {
    InvalidTimestamp { field: &'static str, value: String },
    EmptyRange { from: String, to: String },
    RangeTooLarge { max_days: u32 },
}

impl TimeRangeError {
    /// Query parameter the failure refers to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidTimestamp { field, .. } => *field,
            Self::EmptyRange { .. } | Self::RangeTooLarge { .. } => "from",
        }
    }

    /// Stable machine-readable code for the failure.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidTimestamp { .. } => "invalid_timestamp",
            Self::EmptyRange { .. } => "invalid_range",
            Self::RangeTooLarge { .. } => "range_too_large",
        }
    }

    /// Offending raw value, when there is one.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::InvalidTimestamp { value, .. } => Some(value.as_str()),
            Self::EmptyRange { from, .. } => Some(from.as_str()),
            Self::RangeTooLarge { .. } => None,
        }
    }
}

impl fmt::Display for TimeRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimestamp { field, .. } => {
                write!(f, "{field} must be an RFC 3339 timestamp")
            }
            Self::EmptyRange { .. } => write!(f, "from must be earlier than to"),
            Self::RangeTooLarge { max_days } => {
                write!(f, "time range must not exceed {max_days} days")
            }
        }
    }
}

impl std::error::Error for TimeRangeError {}

/// Half-open `[from, to)` interval in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TimeRange {
    /// Validate an interval against `limits`.
    pub fn new(
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limits: &TimeWindowLimits,
    ) -> Result<Self, TimeRangeError> {
        if from >= to {
            return Err(TimeRangeError::EmptyRange {
                from: from.to_rfc3339_opts(SecondsFormat::Secs, true),
                to: to.to_rfc3339_opts(SecondsFormat::Secs, true),
            });
        }
        if to - from > Duration::days(i64::from(limits.max_days())) {
            return Err(TimeRangeError::RangeTooLarge {
                max_days: limits.max_days(),
            });
        }
        Ok(Self { from, to })
    }

    /// Parse optional RFC 3339 bounds, defaulting `to` to `now` and `from` to
    /// the default window before `to`.
    ///
    /// # Examples
    /// ```
    /// use admin_gateway::domain::{TimeRange, TimeWindowLimits};
    /// use chrono::Utc;
    ///
    /// let range = TimeRange::parse(None, None, &TimeWindowLimits::default(), Utc::now())
    ///     .expect("default window");
    /// assert_eq!((range.to() - range.from()).num_days(), 7);
    /// ```
    pub fn parse(
        from: Option<&str>,
        to: Option<&str>,
        limits: &TimeWindowLimits,
        now: DateTime<Utc>,
    ) -> Result<Self, TimeRangeError> {
        let to = to.map(|raw| parse_timestamp("to", raw)).transpose()?.unwrap_or(now);
        let from = match from {
            Some(raw) => parse_timestamp("from", raw)?,
            None => to - Duration::days(i64::from(limits.default_days())),
        };
        Self::new(from, to, limits)
    }

    /// Inclusive lower bound.
    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    /// Exclusive upper bound.
    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// Whether `instant` falls inside the interval.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }

    /// UTC calendar days overlapping the interval, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        let last = (self.to - Duration::nanoseconds(1)).date_naive();
        self.from
            .date_naive()
            .iter_days()
            .take_while(|day| *day <= last)
            .collect()
    }
}

fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, TimeRangeError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| TimeRangeError::InvalidTimestamp {
            field,
            value: raw.to_owned(),
        })
}

/// One value of a per-day series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint<T> {
    pub date: NaiveDate,
    pub value: T,
}

impl<T> DailyPoint<T> {
    pub const fn new(date: NaiveDate, value: T) -> Self {
        Self { date, value }
    }
}

/// Point-in-time service snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub version: String,
    pub uptime_seconds: u64,
    pub billing_today: f64,
    pub billing_month: f64,
    pub requests_today: u64,
}

/// Usage of a single model over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsage {
    model: String,
    requests: u64,
    tokens: u64,
    daily: Vec<DailyPoint<u64>>,
}

impl ModelUsage {
    /// Build usage from a per-day request series and a token total.
    pub fn new(model: impl Into<String>, tokens: u64, daily: Vec<DailyPoint<u64>>) -> Self {
        Self {
            model: model.into(),
            requests: daily.iter().map(|point| point.value).sum(),
            tokens,
            daily,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn tokens(&self) -> u64 {
        self.tokens
    }

    pub fn daily(&self) -> &[DailyPoint<u64>] {
        &self.daily
    }
}

/// Per-model usage over a window, busiest model first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAnalysis {
    range: TimeRange,
    models: Vec<ModelUsage>,
}

impl ModelAnalysis {
    pub fn new(range: TimeRange, mut models: Vec<ModelUsage>) -> Self {
        models.sort_by(|a, b| b.requests.cmp(&a.requests).then_with(|| a.model.cmp(&b.model)));
        Self { range, models }
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn models(&self) -> &[ModelUsage] {
        &self.models
    }
}

/// Request volume per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAnalysis {
    range: TimeRange,
    daily: Vec<DailyPoint<u64>>,
    total: u64,
}

impl RequestAnalysis {
    pub fn new(range: TimeRange, daily: Vec<DailyPoint<u64>>) -> Self {
        Self {
            range,
            total: daily.iter().map(|point| point.value).sum(),
            daily,
        }
    }

    pub fn daily(&self) -> &[DailyPoint<u64>] {
        &self.daily
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Billed amount per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAnalysis {
    range: TimeRange,
    daily: Vec<DailyPoint<f64>>,
    total: f64,
}

impl BillingAnalysis {
    pub fn new(range: TimeRange, daily: Vec<DailyPoint<f64>>) -> Self {
        Self {
            range,
            total: daily.iter().map(|point| point.value).sum(),
            daily,
        }
    }

    pub fn daily(&self) -> &[DailyPoint<f64>] {
        &self.daily
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

/// Failed request counts per day together with the overall error rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorAnalysis {
    range: TimeRange,
    daily: Vec<DailyPoint<u64>>,
    total_requests: u64,
    total_errors: u64,
    error_rate: f64,
}

impl ErrorAnalysis {
    /// `error_rate` is `errors / requests`, or zero when there were no
    /// requests.
    pub fn new(range: TimeRange, daily: Vec<DailyPoint<u64>>, total_requests: u64) -> Self {
        let total_errors: u64 = daily.iter().map(|point| point.value).sum();
        let error_rate = if total_requests == 0 {
            0.0
        } else {
            total_errors as f64 / total_requests as f64
        };
        Self {
            range,
            daily,
            total_requests,
            total_errors,
            error_rate,
        }
    }

    pub fn daily(&self) -> &[DailyPoint<u64>] {
        &self.daily
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub fn total_errors(&self) -> u64 {
        self.total_errors
    }

    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }
}

/// First day of the month containing `date`.
pub(crate) fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
