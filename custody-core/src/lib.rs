//! Campaign Custody Core
//!
//! State machine that holds fundraising campaign funds in custody: creation,
//! contribution, one-time withdrawal by the creator, and per-contributor
//! cancellation/refund.
//!
//! # Architecture
//!
//! - **Exact value**: fixed-point [`Amount`], overflow-checked, no floats
//! - **Per-campaign locking**: operations on different campaigns run in
//!   parallel; same-campaign operations serialize
//! - **Staged transfers**: external value movement commits tentatively and
//!   rolls back if the transfer executor reports failure
//! - **Durable**: every mutation lands in RocksDB atomically with its audit
//!   event
//!
//! # Invariants
//!
//! - Conservation: campaign total == Σ(ledger entries) at all times
//! - Exactly-once withdrawal: `Withdrawn` is set at most once per campaign
//! - Dense ids: the nth created campaign has id n
//! - Append-only audit: events never modified or deleted

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod access;
pub mod amount;
pub mod campaign;
pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod registry;
pub mod storage;
pub mod transfer;
pub mod types;

// Re-exports
pub use amount::Amount;
pub use campaign::Campaign;
pub use clock::{ManualClock, SystemClock, TimeSource};
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::ContributionLedger;
pub use registry::Registry;
pub use transfer::{InstantTransfers, TransferError, TransferExecutor};
pub use types::{
    AccountId, CampaignId, CampaignStatus, CampaignView, CustodyEvent, EventKind,
};
