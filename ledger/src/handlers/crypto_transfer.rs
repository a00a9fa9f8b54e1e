use {
    super::{mismatched, TransactionHandler},
    crate::{
        config::LedgerConfig,
        context::HandleContext,
        state::{LedgerState, Result},
        transfer::{check_transfer_lists, debit_keys, execute_transfers, has_hook_calls},
    },
    simplefees_types::{Functionality, Key, ResponseCode, TransactionBody, TransactionData},
};

pub struct CryptoTransferHandler;

impl TransactionHandler for CryptoTransferHandler {
    fn functionality(&self) -> Functionality {
        Functionality::CryptoTransfer
    }

    fn pure_checks(&self, body: &TransactionBody, config: &LedgerConfig) -> Result<()> {
        let TransactionData::CryptoTransfer(op) = &body.data else {
            return mismatched(&body.data);
        };
        check_transfer_lists(&op.hbar_transfers, &op.token_transfers)?;
        if !config.hooks.hooks_enabled && has_hook_calls(&op.hbar_transfers, &op.token_transfers) {
            return Err(ResponseCode::HooksNotEnabled);
        }
        Ok(())
    }

    fn required_keys(&self, body: &TransactionBody, state: &LedgerState) -> Vec<Key> {
        match &body.data {
            TransactionData::CryptoTransfer(op) => {
                debit_keys(state, &op.hbar_transfers, &op.token_transfers)
            }
            _ => Vec::new(),
        }
    }

    fn handle(&self, body: &TransactionBody, ctx: &mut HandleContext<'_>) -> Result<()> {
        let TransactionData::CryptoTransfer(op) = &body.data else {
            return mismatched(&body.data);
        };
        execute_transfers(ctx, &op.hbar_transfers, &op.token_transfers)
    }
}
