//! Campaign state machine
//!
//! A campaign is created `Active` and ends `Withdrawn` at most once. All
//! transitions validate their preconditions before mutating, so a failed call
//! leaves the campaign untouched. Faithful to the reference behavior, no
//! transition is gated on the deadline or on the goal already being met: the
//! clock only feeds the read-side `remaining_time`, contributions are accepted
//! past both, and the creator may withdraw the instant the goal is reached.

use crate::access;
use crate::amount::Amount;
use crate::error::{Error, Result};
use crate::ledger::ContributionLedger;
use crate::types::{AccountId, CampaignId, CampaignStatus, CampaignView};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A funding goal with a deadline, a creator, and a pool of contributions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    /// Sequential id assigned by the registry
    id: CampaignId,

    /// Creator account, the only identity allowed to withdraw
    creator: AccountId,

    /// Positive funding goal
    goal: Amount,

    /// Absolute deadline (unix seconds)
    deadline: u64,

    /// Current status
    status: CampaignStatus,

    /// Contribution record, exclusively owned
    ledger: ContributionLedger,

    /// Creation timestamp (audit)
    created_at: DateTime<Utc>,
}

impl Campaign {
    /// Create a new active campaign
    ///
    /// Goal and deadline validation happen in the registry before ids are
    /// assigned; by the time a `Campaign` exists both are known valid.
    pub fn new(id: CampaignId, creator: AccountId, goal: Amount, deadline: u64) -> Self {
        Self {
            id,
            creator,
            goal,
            deadline,
            status: CampaignStatus::Active,
            ledger: ContributionLedger::new(),
            created_at: Utc::now(),
        }
    }

    /// Campaign id
    pub fn id(&self) -> CampaignId {
        self.id
    }

    /// Creator account
    pub fn creator(&self) -> &AccountId {
        &self.creator
    }

    /// Funding goal
    pub fn goal(&self) -> Amount {
        self.goal
    }

    /// Absolute deadline (unix seconds)
    pub fn deadline(&self) -> u64 {
        self.deadline
    }

    /// Current status
    pub fn status(&self) -> CampaignStatus {
        self.status
    }

    /// Contribution record
    pub fn ledger(&self) -> &ContributionLedger {
        &self.ledger
    }

    /// Total currently in custody for this campaign
    pub fn total_raised(&self) -> Amount {
        self.ledger.total()
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Seconds until the deadline, clamped at zero
    pub fn remaining_time(&self, now: u64) -> u64 {
        self.deadline.saturating_sub(now)
    }

    /// Read-side snapshot at time `now`
    pub fn view(&self, now: u64) -> CampaignView {
        CampaignView {
            id: self.id,
            creator: self.creator.clone(),
            remaining_time: self.remaining_time(now),
            goal: self.goal,
            total_raised: self.total_raised(),
            status: self.status,
        }
    }

    /// Record a contribution and return the new campaign total
    pub fn contribute(&mut self, contributor: &AccountId, amount: Amount) -> Result<Amount> {
        self.require_active()?;

        if amount.is_zero() {
            return Err(Error::InvalidAmount(
                "contribution must be positive".to_string(),
            ));
        }

        self.ledger.record(contributor, amount)?;
        Ok(self.ledger.total())
    }

    /// Clear the caller's contribution and return the exact refund
    ///
    /// Permitted at any time before withdrawal; the deadline is irrelevant.
    pub fn cancel_contribution(&mut self, contributor: &AccountId) -> Result<Amount> {
        self.require_active()?;

        if !access::has_contribution(self, contributor) {
            return Err(Error::NothingToCancel {
                campaign_id: self.id.get(),
                contributor: contributor.to_string(),
            });
        }

        self.ledger.clear(contributor)
    }

    /// Transition to `Withdrawn` and return the amount to transfer
    ///
    /// The ledger is left intact for historical query; withdrawal empties the
    /// custody, not the per-contributor record.
    pub fn withdraw(&mut self, caller: &AccountId) -> Result<Amount> {
        if !access::is_creator(self, caller) {
            return Err(Error::Unauthorized {
                campaign_id: self.id.get(),
            });
        }

        self.require_active()?;

        let raised = self.total_raised();
        if raised < self.goal {
            return Err(Error::GoalNotMet {
                campaign_id: self.id.get(),
                raised: raised.to_decimal_string(),
                goal: self.goal.to_decimal_string(),
            });
        }

        self.status = CampaignStatus::Withdrawn;
        Ok(raised)
    }

    /// Undo a tentative withdrawal after the external transfer failed
    pub(crate) fn rollback_withdrawal(&mut self) {
        self.status = CampaignStatus::Active;
    }

    /// Restore a cleared contribution after the external refund failed
    pub(crate) fn rollback_cancellation(
        &mut self,
        contributor: &AccountId,
        refund: Amount,
    ) -> Result<()> {
        self.ledger.record(contributor, refund)?;
        Ok(())
    }

    fn require_active(&self) -> Result<()> {
        match self.status {
            CampaignStatus::Active => Ok(()),
            CampaignStatus::Withdrawn => Err(Error::AlreadyWithdrawn(self.id.get())),
        }
    }
}
