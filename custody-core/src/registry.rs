//! Campaign registry: owns all campaigns and routes operations
//!
//! The registry is the single entry point of the engine. It assigns dense
//! sequential ids, locates the target campaign for each call, consults the
//! time source, and drives the campaign state machine under a per-campaign
//! lock.
//!
//! # Concurrency
//!
//! Each campaign sits behind its own `parking_lot::Mutex` inside a `DashMap`,
//! so operations on different campaigns proceed independently while
//! operations on the same campaign serialize. The withdrawal check-and-set
//! happens under the campaign lock, which makes withdrawal exactly-once under
//! concurrent attempts.
//!
//! # Transfer staging
//!
//! Outgoing value (withdrawal, refund) is staged under the campaign lock:
//! the transition is committed tentatively, the external executor is invoked,
//! and on executor failure the transition is rolled back before the error is
//! returned. Persistence happens after the transfer has settled, so the
//! durable state never claims funds that did not move.

use crate::{
    amount::Amount,
    campaign::Campaign,
    clock::{SystemClock, TimeSource},
    config::Config,
    error::{Error, Result},
    metrics::Metrics,
    storage::Storage,
    transfer::{InstantTransfers, TransferExecutor},
    types::{AccountId, CampaignId, CampaignStatus, CampaignView, CustodyEvent, EventKind},
};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Campaign custody registry
pub struct Registry {
    /// All campaigns, each behind its own lock
    campaigns: DashMap<CampaignId, Mutex<Campaign>>,

    /// Next sequential id; held across create so ids stay dense
    next_id: Mutex<u64>,

    /// Durable storage
    storage: Arc<Storage>,

    /// External value-transfer collaborator
    transfers: Arc<dyn TransferExecutor>,

    /// Time source for deadline assignment and remaining-time reads
    clock: Arc<dyn TimeSource>,

    /// Prometheus metrics
    metrics: Metrics,
}

impl Registry {
    /// Open the registry, rebuilding all campaign state from storage
    pub fn open(config: Config) -> Result<Self> {
        let storage = Arc::new(Storage::open(&config)?);

        let campaigns = DashMap::new();
        let metrics = Metrics::new()
            .map_err(|e| Error::Config(format!("Failed to create metrics: {}", e)))?;

        let mut active = 0i64;
        for campaign in storage.load_campaigns()? {
            if campaign.status() == CampaignStatus::Active {
                active += 1;
            }
            campaigns.insert(campaign.id(), Mutex::new(campaign));
        }
        metrics.campaigns_active.set(active);

        let next_id = storage.next_campaign_id()?;

        tracing::info!(
            campaigns = campaigns.len(),
            next_id,
            "Registry opened"
        );

        Ok(Self {
            campaigns,
            next_id: Mutex::new(next_id),
            storage,
            transfers: Arc::new(InstantTransfers),
            clock: Arc::new(SystemClock),
            metrics,
        })
    }

    /// Set the value-transfer executor
    pub fn with_transfers(mut self, transfers: Arc<dyn TransferExecutor>) -> Self {
        self.transfers = transfers;
        self
    }

    /// Set the time source
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Create a new campaign and return its id
    ///
    /// Validates `goal > 0` and `deadline_seconds > 0` before any state is
    /// touched. The deadline is absolute: `now + deadline_seconds`.
    pub fn create_campaign(
        &self,
        creator: AccountId,
        goal: Amount,
        deadline_seconds: u64,
    ) -> Result<CampaignId> {
        if goal.is_zero() {
            return Err(Error::InvalidGoal("goal must be positive".to_string()));
        }
        if deadline_seconds == 0 {
            return Err(Error::InvalidDeadline(
                "deadline must be in the future".to_string(),
            ));
        }

        let deadline = self
            .clock
            .now_unix()
            .checked_add(deadline_seconds)
            .ok_or_else(|| Error::InvalidDeadline("deadline out of range".to_string()))?;

        // Id assignment, persistence, and insertion stay under one lock so
        // ids remain dense even across concurrent creates.
        let mut next_id = self.next_id.lock();
        let id = CampaignId::new(*next_id);

        let campaign = Campaign::new(id, creator.clone(), goal, deadline);
        let event = CustodyEvent::new(
            id,
            EventKind::CampaignCreated {
                creator,
                goal,
                deadline,
            },
        );

        self.storage
            .put_campaign_atomic(&campaign, &event, Some(id.get() + 1))?;

        self.campaigns.insert(id, Mutex::new(campaign));
        *next_id = id.get() + 1;

        self.metrics.record_campaign_created();
        tracing::info!(campaign_id = %id, goal = %goal, deadline, "Campaign created");

        Ok(id)
    }

    /// Record a contribution; returns the new campaign total
    pub fn contribute(
        &self,
        id: CampaignId,
        contributor: &AccountId,
        amount: Amount,
    ) -> Result<Amount> {
        let entry = self
            .campaigns
            .get(&id)
            .ok_or(Error::CampaignNotFound(id.get()))?;
        let mut campaign = entry.lock();

        // Apply on a scratch copy and commit only once the write is durable,
        // so a storage failure leaves the in-memory state untouched.
        let mut updated = campaign.clone();
        let new_total = updated.contribute(contributor, amount)?;

        let event = CustodyEvent::new(
            id,
            EventKind::ContributionRecorded {
                contributor: contributor.clone(),
                amount,
                new_total,
            },
        );
        self.storage.put_campaign_atomic(&updated, &event, None)?;

        *campaign = updated;

        self.metrics.record_contribution();
        tracing::debug!(
            campaign_id = %id,
            contributor = %contributor,
            amount = %amount,
            new_total = %new_total,
            "Contribution recorded"
        );

        Ok(new_total)
    }

    /// Cancel the caller's contribution; returns the exact refund
    pub fn cancel_contribution(&self, id: CampaignId, caller: &AccountId) -> Result<Amount> {
        let entry = self
            .campaigns
            .get(&id)
            .ok_or(Error::CampaignNotFound(id.get()))?;
        let mut campaign = entry.lock();

        // Tentative commit
        let refund = campaign.cancel_contribution(caller)?;

        // Move the value out of custody; on failure restore the entry under
        // the same lock before surfacing the error.
        if let Err(transfer_err) = self.transfers.transfer(caller, refund) {
            if let Err(rollback_err) = campaign.rollback_cancellation(caller, refund) {
                tracing::error!(
                    campaign_id = %id,
                    error = %rollback_err,
                    "Refund rollback failed; ledger may be inconsistent"
                );
            }
            self.metrics.record_transfer_failure();
            tracing::warn!(
                campaign_id = %id,
                contributor = %caller,
                error = %transfer_err,
                "Refund transfer failed, cancellation rolled back"
            );
            return Err(Error::TransferFailed {
                campaign_id: id.get(),
                reason: transfer_err.to_string(),
            });
        }

        let event = CustodyEvent::new(
            id,
            EventKind::ContributionCancelled {
                contributor: caller.clone(),
                refund,
                new_total: campaign.total_raised(),
            },
        );
        // Funds have left custody; the durable state must reflect it even if
        // this write fails, so the in-memory commit stands either way.
        self.persist_after_transfer(&campaign, &event)?;

        self.metrics.record_refund();
        tracing::debug!(
            campaign_id = %id,
            contributor = %caller,
            refund = %refund,
            "Contribution cancelled"
        );

        Ok(refund)
    }

    /// Withdraw the full raised amount to the creator; returns it
    pub fn withdraw_funds(&self, id: CampaignId, caller: &AccountId) -> Result<Amount> {
        let entry = self
            .campaigns
            .get(&id)
            .ok_or(Error::CampaignNotFound(id.get()))?;
        let mut campaign = entry.lock();

        // Check-and-set under the campaign lock: concurrent attempts see
        // Withdrawn and fail with AlreadyWithdrawn.
        let transferred = campaign.withdraw(caller)?;

        if let Err(transfer_err) = self.transfers.transfer(caller, transferred) {
            campaign.rollback_withdrawal();
            self.metrics.record_transfer_failure();
            tracing::warn!(
                campaign_id = %id,
                error = %transfer_err,
                "Withdrawal transfer failed, state rolled back"
            );
            return Err(Error::TransferFailed {
                campaign_id: id.get(),
                reason: transfer_err.to_string(),
            });
        }

        let event = CustodyEvent::new(
            id,
            EventKind::FundsWithdrawn {
                amount: transferred,
            },
        );
        self.persist_after_transfer(&campaign, &event)?;

        self.metrics.record_withdrawal();
        tracing::info!(campaign_id = %id, amount = %transferred, "Funds withdrawn");

        Ok(transferred)
    }

    /// Read-side snapshot of a campaign
    pub fn get_campaign(&self, id: CampaignId) -> Result<CampaignView> {
        let entry = self
            .campaigns
            .get(&id)
            .ok_or(Error::CampaignNotFound(id.get()))?;
        let campaign = entry.lock();

        Ok(campaign.view(self.clock.now_unix()))
    }

    /// Number of campaigns ever created
    pub fn campaign_count(&self) -> u64 {
        *self.next_id.lock() - 1
    }

    /// Chronological audit history of a campaign
    pub fn history(&self, id: CampaignId) -> Result<Vec<CustodyEvent>> {
        if !self.campaigns.contains_key(&id) {
            return Err(Error::CampaignNotFound(id.get()));
        }
        self.storage.events_for_campaign(id)
    }

    /// Recompute the ledger sum and compare it to the running total
    ///
    /// Conservation audit: true means the campaign holds exactly what its
    /// per-contributor record says it holds.
    pub fn verify_conservation(&self, id: CampaignId) -> Result<bool> {
        let entry = self
            .campaigns
            .get(&id)
            .ok_or(Error::CampaignNotFound(id.get()))?;
        let campaign = entry.lock();

        Ok(campaign.ledger().checked_total()? == campaign.total_raised())
    }

    fn persist_after_transfer(&self, campaign: &Campaign, event: &CustodyEvent) -> Result<()> {
        if let Err(e) = self.storage.put_campaign_atomic(campaign, event, None) {
            tracing::error!(
                campaign_id = %campaign.id(),
                error = %e,
                "Durable write failed after a completed transfer"
            );
            return Err(e);
        }
        Ok(())
    }
}
