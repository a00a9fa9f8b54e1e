use {
    crate::{
        calculator::{FeeAccumulator, FeeContext, ServiceFeeCalculator},
        error::Result,
        extras::{count_transfers, TransferCounts},
        state::CalculatorState,
    },
    simplefees_schedule::{Extra, FeeEntry},
    simplefees_types::{Functionality, TransactionData},
};

/// Prices HBAR and token transfers.
///
/// The tier depends on what moves:
///
/// ```text
/// HBAR only                       → CryptoTransfer
/// any token                       → TokenTransfer
/// any token with custom fees      → TokenTransferWithCustomFees
/// ```
pub struct CryptoTransferFeeCalculator;

impl ServiceFeeCalculator for CryptoTransferFeeCalculator {
    fn functionality(&self) -> Functionality {
        Functionality::CryptoTransfer
    }

    fn accumulate(
        &self,
        ctx: &FeeContext<'_>,
        state: &dyn CalculatorState,
        fees: &mut FeeAccumulator<'_>,
    ) -> Result<()> {
        let TransactionData::CryptoTransfer(body) = &ctx.body.data else {
            return Ok(());
        };
        let counts = count_transfers(&body.hbar_transfers, &body.token_transfers, state);
        charge_transfer_tier(&counts, fees)
    }
}

/// Charges the transfer tier for already counted transfers. Shared with
/// airdrops, whose immediate part is priced like a transfer.
pub fn charge_transfer_tier(counts: &TransferCounts, fees: &mut FeeAccumulator<'_>) -> Result<()> {
    let tier = if counts.has_custom_fees {
        FeeEntry::TokenTransferWithCustomFees
    } else if counts.token_types > 0 {
        FeeEntry::TokenTransfer
    } else {
        FeeEntry::CryptoTransfer
    };
    let mut extras = vec![
        (Extra::Accounts, counts.accounts),
        (Extra::HookExecutions, counts.hook_executions),
        (Extra::Gas, counts.gas),
        (Extra::CreatedAccounts, counts.created_accounts),
        (Extra::CreatedAutoAssociations, counts.auto_associations),
    ];
    if counts.token_types > 0 {
        extras.push((Extra::TokenTypes, counts.token_types));
    }
    fees.charge(tier, &extras)
}
