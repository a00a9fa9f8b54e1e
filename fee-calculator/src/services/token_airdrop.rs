use {
    crate::{
        calculator::{FeeAccumulator, FeeContext, ServiceFeeCalculator},
        error::Result,
        extras::count_transfers,
        services::charge_transfer_tier,
        state::CalculatorState,
    },
    simplefees_schedule::{Extra, FeeEntry},
    simplefees_types::{Functionality, TransactionData},
};

/// An airdrop costs what the equivalent token transfer costs, plus one
/// `AIRDROPS` unit for every credit that has to wait as a pending airdrop.
pub struct TokenAirdropFeeCalculator;

impl ServiceFeeCalculator for TokenAirdropFeeCalculator {
    fn functionality(&self) -> Functionality {
        Functionality::TokenAirdrop
    }

    fn accumulate(
        &self,
        ctx: &FeeContext<'_>,
        state: &dyn CalculatorState,
        fees: &mut FeeAccumulator<'_>,
    ) -> Result<()> {
        let TransactionData::TokenAirdrop(body) = &ctx.body.data else {
            return Ok(());
        };
        let counts = count_transfers(&[], &body.token_transfers, state);
        charge_transfer_tier(&counts, fees)?;
        fees.charge(
            FeeEntry::TokenAirdrop,
            &[(Extra::Airdrops, counts.unassociable_credits)],
        )
    }
}
