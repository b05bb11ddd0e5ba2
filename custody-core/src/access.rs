//! Authorization predicates
//!
//! Stateless checks consulted by campaign transitions before any mutation.
//! Nothing here mutates state; the transitions decide what to do with the
//! answer.

use crate::campaign::Campaign;
use crate::types::AccountId;

/// Check whether `caller` created the campaign
pub fn is_creator(campaign: &Campaign, caller: &AccountId) -> bool {
    campaign.creator() == caller
}

/// Check whether `caller` has a positive contribution recorded
pub fn has_contribution(campaign: &Campaign, caller: &AccountId) -> bool {
    !campaign.ledger().contribution_of(caller).is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::types::CampaignId;

    fn test_campaign() -> Campaign {
        Campaign::new(
            CampaignId::new(1),
            AccountId::new("0xcreator"),
            Amount::from_base_units(1_000),
            100,
        )
    }

    #[test]
    fn test_is_creator() {
        let campaign = test_campaign();
        assert!(is_creator(&campaign, &AccountId::new("0xcreator")));
        assert!(!is_creator(&campaign, &AccountId::new("0xmallory")));
    }

    #[test]
    fn test_has_contribution() {
        let mut campaign = test_campaign();
        let alice = AccountId::new("0xalice");

        assert!(!has_contribution(&campaign, &alice));

        campaign
            .contribute(&alice, Amount::from_base_units(10))
            .unwrap();
        assert!(has_contribution(&campaign, &alice));
    }
}
