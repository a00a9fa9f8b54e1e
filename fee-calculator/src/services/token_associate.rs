use {
    crate::{
        calculator::{FeeAccumulator, FeeContext, ServiceFeeCalculator},
        error::Result,
        state::CalculatorState,
    },
    simplefees_schedule::{Extra, FeeEntry},
    simplefees_types::{Functionality, TransactionData},
};

pub struct TokenAssociateFeeCalculator;

impl ServiceFeeCalculator for TokenAssociateFeeCalculator {
    fn functionality(&self) -> Functionality {
        Functionality::TokenAssociateToAccount
    }

    fn accumulate(
        &self,
        ctx: &FeeContext<'_>,
        _state: &dyn CalculatorState,
        fees: &mut FeeAccumulator<'_>,
    ) -> Result<()> {
        let TransactionData::TokenAssociate(body) = &ctx.body.data else {
            return Ok(());
        };
        fees.charge(
            FeeEntry::TokenAssociateToAccount,
            &[(Extra::TokenTypes, body.tokens.len() as u64)],
        )
    }
}
