//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the custody engine.
//!
//! # Metrics
//!
//! - `custody_campaigns_created_total` - Campaigns created
//! - `custody_contributions_total` - Contributions recorded
//! - `custody_refunds_total` - Contributions cancelled and refunded
//! - `custody_withdrawals_total` - Successful withdrawals
//! - `custody_transfer_failures_total` - Rolled-back external transfers
//! - `custody_campaigns_active` - Campaigns currently accepting contributions

use prometheus::{IntCounter, IntGauge, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Campaigns created
    pub campaigns_created_total: IntCounter,

    /// Contributions recorded
    pub contributions_total: IntCounter,

    /// Contributions cancelled and refunded
    pub refunds_total: IntCounter,

    /// Successful withdrawals
    pub withdrawals_total: IntCounter,

    /// Rolled-back external transfers
    pub transfer_failures_total: IntCounter,

    /// Campaigns currently accepting contributions
    pub campaigns_active: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let campaigns_created_total = IntCounter::with_opts(Opts::new(
            "custody_campaigns_created_total",
            "Campaigns created",
        ))?;
        registry.register(Box::new(campaigns_created_total.clone()))?;

        let contributions_total = IntCounter::with_opts(Opts::new(
            "custody_contributions_total",
            "Contributions recorded",
        ))?;
        registry.register(Box::new(contributions_total.clone()))?;

        let refunds_total = IntCounter::with_opts(Opts::new(
            "custody_refunds_total",
            "Contributions cancelled and refunded",
        ))?;
        registry.register(Box::new(refunds_total.clone()))?;

        let withdrawals_total = IntCounter::with_opts(Opts::new(
            "custody_withdrawals_total",
            "Successful withdrawals",
        ))?;
        registry.register(Box::new(withdrawals_total.clone()))?;

        let transfer_failures_total = IntCounter::with_opts(Opts::new(
            "custody_transfer_failures_total",
            "Rolled-back external transfers",
        ))?;
        registry.register(Box::new(transfer_failures_total.clone()))?;

        let campaigns_active = IntGauge::with_opts(Opts::new(
            "custody_campaigns_active",
            "Campaigns currently accepting contributions",
        ))?;
        registry.register(Box::new(campaigns_active.clone()))?;

        Ok(Self {
            campaigns_created_total,
            contributions_total,
            refunds_total,
            withdrawals_total,
            transfer_failures_total,
            campaigns_active,
            registry,
        })
    }

    /// Record campaign creation
    pub fn record_campaign_created(&self) {
        self.campaigns_created_total.inc();
        self.campaigns_active.inc();
    }

    /// Record a contribution
    pub fn record_contribution(&self) {
        self.contributions_total.inc();
    }

    /// Record a refund
    pub fn record_refund(&self) {
        self.refunds_total.inc();
    }

    /// Record a withdrawal
    pub fn record_withdrawal(&self) {
        self.withdrawals_total.inc();
        self.campaigns_active.dec();
    }

    /// Record a rolled-back transfer
    pub fn record_transfer_failure(&self) {
        self.transfer_failures_total.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.campaigns_created_total.get(), 0);
        assert_eq!(metrics.withdrawals_total.get(), 0);
    }

    #[test]
    fn test_active_gauge_tracks_lifecycle() {
        let metrics = Metrics::new().unwrap();

        metrics.record_campaign_created();
        metrics.record_campaign_created();
        assert_eq!(metrics.campaigns_active.get(), 2);

        metrics.record_withdrawal();
        assert_eq!(metrics.campaigns_active.get(), 1);
        assert_eq!(metrics.withdrawals_total.get(), 1);
    }

    #[test]
    fn test_record_contribution_and_refund() {
        let metrics = Metrics::new().unwrap();

        metrics.record_contribution();
        metrics.record_contribution();
        metrics.record_refund();

        assert_eq!(metrics.contributions_total.get(), 2);
        assert_eq!(metrics.refunds_total.get(), 1);
    }
}
