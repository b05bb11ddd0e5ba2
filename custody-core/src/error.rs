//! Error types for the custody engine

use thiserror::Error;

/// Result type for custody operations
pub type Result<T> = std::result::Result<T, Error>;

/// Custody errors
///
/// Validation errors are detected before any mutation; [`Error::TransferFailed`]
/// is the one failure that follows a tentative state change and signals that
/// the change was rolled back. Nothing here is fatal to the process.
#[derive(Error, Debug)]
pub enum Error {
    /// Campaign goal must be positive
    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    /// Campaign deadline must lie in the future
    #[error("Invalid deadline: {0}")]
    InvalidDeadline(String),

    /// Malformed or non-positive amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// No campaign with this id
    #[error("Campaign not found: {0}")]
    CampaignNotFound(u64),

    /// Caller is not the campaign creator
    #[error("Unauthorized: campaign {campaign_id} can only be withdrawn by its creator")]
    Unauthorized {
        /// Campaign being operated on
        campaign_id: u64,
    },

    /// Campaign funds were already withdrawn
    #[error("Campaign {0} already withdrawn")]
    AlreadyWithdrawn(u64),

    /// Raised total is below the campaign goal
    #[error("Campaign {campaign_id} goal not met: raised {raised}, goal {goal}")]
    GoalNotMet {
        /// Campaign being operated on
        campaign_id: u64,
        /// Total raised at the time of the attempt
        raised: String,
        /// Campaign goal
        goal: String,
    },

    /// Caller has no contribution to cancel
    #[error("Nothing to cancel: no contribution from {contributor} to campaign {campaign_id}")]
    NothingToCancel {
        /// Campaign being operated on
        campaign_id: u64,
        /// Caller identity
        contributor: String,
    },

    /// Arithmetic overflow
    #[error("Amount overflow")]
    Overflow,

    /// Arithmetic underflow
    #[error("Amount underflow")]
    Underflow,

    /// External value transfer reported failure; the state change was rolled back
    #[error("Transfer failed for campaign {campaign_id}: {reason}")]
    TransferFailed {
        /// Campaign being operated on
        campaign_id: u64,
        /// Reason reported by the transfer executor
        reason: String,
    },

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
