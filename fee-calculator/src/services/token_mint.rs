use {
    crate::{
        calculator::{FeeAccumulator, FeeContext, ServiceFeeCalculator},
        error::Result,
        state::CalculatorState,
    },
    simplefees_schedule::{Extra, FeeEntry},
    simplefees_types::{Functionality, TransactionData},
};

/// Fungible mints pay `TokenMint`; NFT mints add `TokenMintNft` with one
/// `NFT_SERIALS` unit per metadata entry.
pub struct TokenMintFeeCalculator;

impl ServiceFeeCalculator for TokenMintFeeCalculator {
    fn functionality(&self) -> Functionality {
        Functionality::TokenMint
    }

    fn accumulate(
        &self,
        ctx: &FeeContext<'_>,
        _state: &dyn CalculatorState,
        fees: &mut FeeAccumulator<'_>,
    ) -> Result<()> {
        let TransactionData::TokenMint(body) = &ctx.body.data else {
            return Ok(());
        };
        fees.charge(FeeEntry::TokenMint, &[])?;
        if !body.metadata.is_empty() {
            fees.charge(
                FeeEntry::TokenMintNft,
                &[(Extra::NftSerials, body.metadata.len() as u64)],
            )?;
        }
        Ok(())
    }
}
