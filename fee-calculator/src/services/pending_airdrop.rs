use {
    crate::{
        calculator::{FeeAccumulator, FeeContext, ServiceFeeCalculator},
        error::Result,
        state::CalculatorState,
    },
    simplefees_schedule::FeeEntry,
    simplefees_types::Functionality,
};

/// Claiming a pending airdrop pays the base fee only.
pub struct TokenClaimAirdropFeeCalculator;

impl ServiceFeeCalculator for TokenClaimAirdropFeeCalculator {
    fn functionality(&self) -> Functionality {
        Functionality::TokenClaimAirdrop
    }

    fn accumulate(
        &self,
        _ctx: &FeeContext<'_>,
        _state: &dyn CalculatorState,
        fees: &mut FeeAccumulator<'_>,
    ) -> Result<()> {
        fees.charge(FeeEntry::TokenClaimAirdrop, &[])
    }
}

/// Cancelling a pending airdrop pays the base fee only.
pub struct TokenCancelAirdropFeeCalculator;

impl ServiceFeeCalculator for TokenCancelAirdropFeeCalculator {
    fn functionality(&self) -> Functionality {
        Functionality::TokenCancelAirdrop
    }

    fn accumulate(
        &self,
        _ctx: &FeeContext<'_>,
        _state: &dyn CalculatorState,
        fees: &mut FeeAccumulator<'_>,
    ) -> Result<()> {
        fees.charge(FeeEntry::TokenCancelAirdrop, &[])
    }
}
