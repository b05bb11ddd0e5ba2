//! Per-campaign contribution ledger
//!
//! Maps contributor identity to contributed amount and maintains the running
//! total alongside the map. The module's core correctness obligation is that
//! map mutation and total update are applied as one indivisible step: overflow
//! is checked before either side is touched, so no state is observable where
//! the map and the total disagree.

use crate::amount::Amount;
use crate::error::Result;
use crate::types::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Contributor → contributed-amount record for one campaign
///
/// Owned exclusively by its campaign. An entry of zero is equivalent to
/// absence; `record` never creates one and `clear` removes whole entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContributionLedger {
    /// Contributor entries (all positive)
    entries: HashMap<AccountId, Amount>,

    /// Running total, never recomputed by summation on the hot path
    total: Amount,
}

impl ContributionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the contributor's entry, creating it if absent
    ///
    /// Returns the contributor's new entry total. On overflow of either the
    /// entry or the running total, nothing is mutated.
    pub fn record(&mut self, contributor: &AccountId, amount: Amount) -> Result<Amount> {
        let current = self
            .entries
            .get(contributor)
            .copied()
            .unwrap_or(Amount::ZERO);

        // Validate both sides before touching either
        let new_entry = current.add(amount)?;
        let new_total = self.total.add(amount)?;

        self.entries.insert(contributor.clone(), new_entry);
        self.total = new_total;

        Ok(new_entry)
    }

    /// Remove the contributor's entry and return the amount that was present
    ///
    /// Returns [`Amount::ZERO`] if no entry exists. The running total is
    /// reduced in the same step.
    pub fn clear(&mut self, contributor: &AccountId) -> Result<Amount> {
        match self.entries.remove(contributor) {
            Some(refund) => {
                // Entries only ever enter the total via record, so this cannot
                // underflow unless the ledger is corrupt.
                match self.total.sub(refund) {
                    Ok(new_total) => {
                        self.total = new_total;
                        Ok(refund)
                    }
                    Err(e) => {
                        // Restore the entry before surfacing the corruption
                        self.entries.insert(contributor.clone(), refund);
                        Err(e)
                    }
                }
            }
            None => Ok(Amount::ZERO),
        }
    }

    /// Running total of all entries, O(1)
    pub fn total(&self) -> Amount {
        self.total
    }

    /// Contribution currently recorded for an account
    pub fn contribution_of(&self, contributor: &AccountId) -> Amount {
        self.entries
            .get(contributor)
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Number of accounts with a positive entry
    pub fn contributor_count(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over entries (audit/history reads)
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.entries.iter()
    }

    /// Recompute the total by summation (conservation audits only)
    pub fn checked_total(&self) -> Result<Amount> {
        let mut sum = Amount::ZERO;
        for amount in self.entries.values() {
            sum = sum.add(*amount)?;
        }
        Ok(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::new("0xalice")
    }

    fn bob() -> AccountId {
        AccountId::new("0xbob")
    }

    #[test]
    fn test_record_accumulates_per_contributor() {
        let mut ledger = ContributionLedger::new();

        let entry = ledger.record(&alice(), Amount::from_base_units(100)).unwrap();
        assert_eq!(entry, Amount::from_base_units(100));

        let entry = ledger.record(&alice(), Amount::from_base_units(50)).unwrap();
        assert_eq!(entry, Amount::from_base_units(150));

        assert_eq!(ledger.total(), Amount::from_base_units(150));
        assert_eq!(ledger.contributor_count(), 1);
    }

    #[test]
    fn test_clear_returns_exact_entry() {
        let mut ledger = ContributionLedger::new();
        ledger.record(&alice(), Amount::from_base_units(600)).unwrap();
        ledger.record(&bob(), Amount::from_base_units(400)).unwrap();

        let refund = ledger.clear(&bob()).unwrap();
        assert_eq!(refund, Amount::from_base_units(400));
        assert_eq!(ledger.total(), Amount::from_base_units(600));
        assert_eq!(ledger.contribution_of(&bob()), Amount::ZERO);

        // Second clear finds nothing
        assert_eq!(ledger.clear(&bob()).unwrap(), Amount::ZERO);
        assert_eq!(ledger.total(), Amount::from_base_units(600));
    }

    #[test]
    fn test_clear_absent_is_zero() {
        let mut ledger = ContributionLedger::new();
        assert_eq!(ledger.clear(&alice()).unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_record_overflow_leaves_ledger_untouched() {
        let mut ledger = ContributionLedger::new();
        ledger
            .record(&alice(), Amount::from_base_units(u128::MAX - 10))
            .unwrap();

        let result = ledger.record(&bob(), Amount::from_base_units(100));
        assert!(result.is_err());

        // Neither the map nor the total moved
        assert_eq!(ledger.contribution_of(&bob()), Amount::ZERO);
        assert_eq!(ledger.total(), Amount::from_base_units(u128::MAX - 10));
        assert_eq!(ledger.checked_total().unwrap(), ledger.total());
    }

    #[test]
    fn test_running_total_matches_summation() {
        let mut ledger = ContributionLedger::new();
        ledger.record(&alice(), Amount::from_base_units(123)).unwrap();
        ledger.record(&bob(), Amount::from_base_units(456)).unwrap();
        ledger.record(&alice(), Amount::from_base_units(1)).unwrap();
        ledger.clear(&bob()).unwrap();

        assert_eq!(ledger.checked_total().unwrap(), ledger.total());
        assert_eq!(ledger.total(), Amount::from_base_units(124));
    }
}
