//! In-memory usage ledger answering analytics queries.
//!
//! Usage events are appended via [`InMemoryAnalytics::record`] and aggregated
//! per UTC day on demand. Every series covers each day of the requested
//! window, with zeros for idle days.

use std::collections::{BTreeMap, HashMap};
use std::ops::AddAssign;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use tokio::sync::RwLock;

use crate::domain::analytics::month_start;
use crate::domain::ports::{AnalyticsService, AnalyticsServiceError};
use crate::domain::{
    BillingAnalysis, DailyPoint, ErrorAnalysis, ModelAnalysis, ModelUsage, RequestAnalysis,
    ServiceInfo, TimeRange,
};

/// One served (or failed) upstream request.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageEvent {
    pub at: DateTime<Utc>,
    pub model: String,
    pub tokens: u64,
    pub cost: f64,
    pub failed: bool,
}

impl UsageEvent {
    /// A successful request with no tokens or cost.
    pub fn new(at: DateTime<Utc>, model: impl Into<String>) -> Self {
        Self {
            at,
            model: model.into(),
            tokens: 0,
            cost: 0.0,
            failed: false,
        }
    }

    #[must_use]
    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.tokens = tokens;
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn failed(mut self) -> Self {
        self.failed = true;
        self
    }

    fn day(&self) -> NaiveDate {
        self.at.date_naive()
    }
}

/// Process-local [`AnalyticsService`].
pub struct InMemoryAnalytics {
    events: RwLock<Vec<UsageEvent>>,
    clock: Arc<dyn Clock>,
    started_at: DateTime<Utc>,
    version: String,
}

impl InMemoryAnalytics {
    /// Start an empty ledger; uptime is measured from now.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.utc();
        Self {
            events: RwLock::new(Vec::new()),
            clock,
            started_at,
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }

    /// Append one usage event.
    ///
    /// This is the ingestion hook: the process serving upstream traffic feeds
    /// each completed request here, and the admin queries read it back.
    pub async fn record(&self, event: UsageEvent) {
        self.events.write().await.push(event);
    }
}

/// Sum `value` of each event per day of `range`, zero-filled.
fn daily_series<'a, T, I, F>(range: &TimeRange, events: I, value: F) -> Vec<DailyPoint<T>>
where
    T: Copy + Default + AddAssign,
    I: IntoIterator<Item = &'a UsageEvent>,
    F: Fn(&UsageEvent) -> T,
{
    let mut totals: BTreeMap<NaiveDate, T> =
        range.days().into_iter().map(|day| (day, T::default())).collect();
    for event in events {
        if let Some(total) = totals.get_mut(&event.day()) {
            *total += value(event);
        }
    }
    totals
        .into_iter()
        .map(|(date, value)| DailyPoint::new(date, value))
        .collect()
}

fn in_range<'a>(
    events: &'a [UsageEvent],
    range: &'a TimeRange,
) -> impl Iterator<Item = &'a UsageEvent> + 'a {
    events.iter().filter(move |event| range.contains(event.at))
}

#[async_trait]
impl AnalyticsService for InMemoryAnalytics {
    async fn info(&self) -> Result<ServiceInfo, AnalyticsServiceError> {
        let now = self.clock.utc();
        let today = now.date_naive();
        let first_of_month = month_start(today);
        let events = self.events.read().await;

        let todays: Vec<&UsageEvent> = events
            .iter()
            .filter(|event| event.day() == today)
            .collect();
        let billing_month = events
            .iter()
            .filter(|event| (first_of_month..=today).contains(&event.day()))
            .map(|event| event.cost)
            .sum();

        Ok(ServiceInfo {
            version: self.version.clone(),
            uptime_seconds: u64::try_from((now - self.started_at).num_seconds()).unwrap_or(0),
            billing_today: todays.iter().map(|event| event.cost).sum(),
            billing_month,
            requests_today: todays.len() as u64,
        })
    }

    async fn model_usage(&self, range: &TimeRange) -> Result<ModelAnalysis, AnalyticsServiceError> {
        let events = self.events.read().await;
        let mut by_model: HashMap<&str, Vec<&UsageEvent>> = HashMap::new();
        for event in in_range(&events, range) {
            by_model.entry(event.model.as_str()).or_default().push(event);
        }
        let models = by_model
            .into_iter()
            .map(|(model, events)| {
                let tokens = events.iter().map(|event| event.tokens).sum();
                let daily = daily_series(range, events.iter().copied(), |_| 1_u64);
                ModelUsage::new(model, tokens, daily)
            })
            .collect();
        Ok(ModelAnalysis::new(*range, models))
    }

    async fn request_volume(
        &self,
        range: &TimeRange,
    ) -> Result<RequestAnalysis, AnalyticsServiceError> {
        let events = self.events.read().await;
        let daily = daily_series(range, in_range(&events, range), |_| 1_u64);
        Ok(RequestAnalysis::new(*range, daily))
    }

    async fn billing(&self, range: &TimeRange) -> Result<BillingAnalysis, AnalyticsServiceError> {
        let events = self.events.read().await;
        let daily = daily_series(range, in_range(&events, range), |event| event.cost);
        Ok(BillingAnalysis::new(*range, daily))
    }

    async fn errors(&self, range: &TimeRange) -> Result<ErrorAnalysis, AnalyticsServiceError> {
        let events = self.events.read().await;
        let total_requests = in_range(&events, range).count() as u64;
        let daily = daily_series(range, in_range(&events, range), |event| {
            u64::from(event.failed)
        });
        Ok(ErrorAnalysis::new(*range, daily, total_requests))
    }
}
