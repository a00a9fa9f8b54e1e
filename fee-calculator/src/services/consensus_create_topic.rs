use {
    crate::{
        calculator::{FeeAccumulator, FeeContext, ServiceFeeCalculator},
        error::Result,
        state::CalculatorState,
    },
    simplefees_schedule::{Extra, FeeEntry},
    simplefees_types::{Functionality, Key, TransactionData},
};

pub struct ConsensusCreateTopicFeeCalculator;

impl ServiceFeeCalculator for ConsensusCreateTopicFeeCalculator {
    fn functionality(&self) -> Functionality {
        Functionality::ConsensusCreateTopic
    }

    fn accumulate(
        &self,
        ctx: &FeeContext<'_>,
        _state: &dyn CalculatorState,
        fees: &mut FeeAccumulator<'_>,
    ) -> Result<()> {
        let TransactionData::ConsensusCreateTopic(body) = &ctx.body.data else {
            return Ok(());
        };
        let keys = [&body.admin_key, &body.submit_key]
            .into_iter()
            .flatten()
            .map(Key::primitive_count)
            .fold(0u64, u64::saturating_add);
        fees.charge(FeeEntry::ConsensusCreateTopic, &[(Extra::Keys, keys)])?;
        if !body.custom_fees.is_empty() {
            fees.charge(FeeEntry::ConsensusCreateTopicWithCustomFees, &[])?;
        }
        Ok(())
    }
}
