//! External value-transfer collaborator
//!
//! Outgoing value (withdrawal to the creator, refund to a contributor) leaves
//! custody through a [`TransferExecutor`]. The executor reports success or
//! failure synchronously; on failure the registry rolls back the tentative
//! state transition before returning, so funds never leave custody without the
//! ledger reflecting it, or vice versa. Incoming contributions do not pass
//! through the executor.

use crate::amount::Amount;
use crate::types::AccountId;
use std::fmt;

/// Failure reported by a transfer executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferError(pub String);

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TransferError {}

/// Moves value out of custody to an external account
pub trait TransferExecutor: Send + Sync {
    /// Transfer `amount` to `to`, reporting the outcome synchronously
    fn transfer(&self, to: &AccountId, amount: Amount) -> Result<(), TransferError>;
}

/// Executor that accepts every transfer
///
/// Default for deployments where settlement happens out of band and for
/// tests that do not observe outgoing value.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantTransfers;

impl TransferExecutor for InstantTransfers {
    fn transfer(&self, _to: &AccountId, _amount: Amount) -> Result<(), TransferError> {
        Ok(())
    }
}
