//! Core types for the custody engine
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Memory safety (no unsafe code)
//! - Exact arithmetic (fixed-point [`Amount`] for value)

use crate::amount::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account identity (address supplied by the identity provider)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Campaign identifier
///
/// Ids are dense and assigned sequentially starting at 1; id 0 is never valid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CampaignId(u64);

impl CampaignId {
    /// Create from a raw id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id value
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CampaignId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Campaign status
///
/// There is no failed/cancelled campaign state: a campaign that never reaches
/// its goal simply stays `Active` unless every contributor cancels
/// individually. `Withdrawn` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CampaignStatus {
    /// Accepting contributions and cancellations
    Active = 1,
    /// Funds transferred to the creator (terminal)
    Withdrawn = 2,
}

impl CampaignStatus {
    /// Check if the status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Withdrawn)
    }
}

/// Read-side snapshot of a campaign
///
/// `remaining_time` is the display-only countdown to the deadline, clamped at
/// zero and never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignView {
    /// Campaign id
    pub id: CampaignId,

    /// Creator account
    pub creator: AccountId,

    /// Seconds until the deadline (0 once passed)
    pub remaining_time: u64,

    /// Funding goal
    pub goal: Amount,

    /// Total currently in custody for this campaign
    pub total_raised: Amount,

    /// Current status
    pub status: CampaignStatus,
}

/// Audit event recording a successful custody mutation
///
/// Events are append-only: never modified, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodyEvent {
    /// Unique event ID (UUIDv7 for time-ordering)
    pub event_id: Uuid,

    /// Campaign this event belongs to
    pub campaign_id: CampaignId,

    /// What happened
    pub kind: EventKind,

    /// Event timestamp
    pub recorded_at: DateTime<Utc>,
}

impl CustodyEvent {
    /// Create a new event stamped with the current time
    pub fn new(campaign_id: CampaignId, kind: EventKind) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            campaign_id,
            kind,
            recorded_at: Utc::now(),
        }
    }
}

/// Kind of custody mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Campaign created
    CampaignCreated {
        /// Creator account
        creator: AccountId,
        /// Funding goal
        goal: Amount,
        /// Absolute deadline (unix seconds)
        deadline: u64,
    },

    /// Contribution recorded
    ContributionRecorded {
        /// Contributing account
        contributor: AccountId,
        /// Amount contributed in this operation
        amount: Amount,
        /// Campaign total after the contribution
        new_total: Amount,
    },

    /// Contribution cancelled and refunded
    ContributionCancelled {
        /// Refunded account
        contributor: AccountId,
        /// Exact amount refunded
        refund: Amount,
        /// Campaign total after the refund
        new_total: Amount,
    },

    /// Full raised amount transferred to the creator
    FundsWithdrawn {
        /// Amount transferred
        amount: Amount,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_campaign_status_terminal() {
        assert!(!CampaignStatus::Active.is_terminal());
        assert!(CampaignStatus::Withdrawn.is_terminal());
    }

    #[test]
    fn test_campaign_id_display() {
        assert_eq!(CampaignId::new(7).to_string(), "7");
        assert_eq!(CampaignId::from(3).get(), 3);
    }

    #[test]
    fn test_event_ids_are_time_ordered() {
        let a = CustodyEvent::new(CampaignId::new(1), EventKind::FundsWithdrawn {
            amount: Amount::ZERO,
        });
        let b = CustodyEvent::new(CampaignId::new(1), EventKind::FundsWithdrawn {
            amount: Amount::ZERO,
        });

        // UUIDv7 sorts by creation time
        assert!(a.event_id <= b.event_id);
    }
}
