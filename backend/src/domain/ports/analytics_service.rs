//! Driven port for the analytics aggregation engine.
//!
//! The admin layer never computes analytics itself; it validates the time
//! window and forwards it here.

use async_trait::async_trait;

use crate::domain::{
    BillingAnalysis, ErrorAnalysis, ModelAnalysis, RequestAnalysis, ServiceInfo, TimeRange,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by analytics collaborators.
    pub enum AnalyticsServiceError {
        /// The engine could not be reached.
        Unavailable { message: String } => "analytics engine unavailable: {message}",
        /// The engine refused the filter.
        Rejected { message: String } => "analytics query rejected: {message}",
        /// The engine failed while evaluating the query.
        Query { message: String } => "analytics query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    /// Point-in-time service snapshot.
    async fn info(&self) -> Result<ServiceInfo, AnalyticsServiceError>;

    /// Requests and tokens per model over `range`.
    async fn model_usage(&self, range: &TimeRange) -> Result<ModelAnalysis, AnalyticsServiceError>;

    /// Requests per day over `range`.
    async fn request_volume(
        &self,
        range: &TimeRange,
    ) -> Result<RequestAnalysis, AnalyticsServiceError>;

    /// Billed amount per day over `range`.
    async fn billing(&self, range: &TimeRange) -> Result<BillingAnalysis, AnalyticsServiceError>;

    /// Failed requests per day over `range`.
    async fn errors(&self, range: &TimeRange) -> Result<ErrorAnalysis, AnalyticsServiceError>;
}

/// Fixture implementation reporting an idle service.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAnalyticsService;

#[async_trait]
impl AnalyticsService for FixtureAnalyticsService {
    async fn info(&self) -> Result<ServiceInfo, AnalyticsServiceError> {
        Ok(ServiceInfo {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            uptime_seconds: 0,
            billing_today: 0.0,
            billing_month: 0.0,
            requests_today: 0,
        })
    }

    async fn model_usage(&self, range: &TimeRange) -> Result<ModelAnalysis, AnalyticsServiceError> {
        Ok(ModelAnalysis::new(*range, Vec::new()))
    }

    async fn request_volume(
        &self,
        range: &TimeRange,
    ) -> Result<RequestAnalysis, AnalyticsServiceError> {
        Ok(RequestAnalysis::new(*range, Vec::new()))
    }

    async fn billing(&self, range: &TimeRange) -> Result<BillingAnalysis, AnalyticsServiceError> {
        Ok(BillingAnalysis::new(*range, Vec::new()))
    }

    async fn errors(&self, range: &TimeRange) -> Result<ErrorAnalysis, AnalyticsServiceError> {
        Ok(ErrorAnalysis::new(*range, Vec::new(), 0))
    }
}
