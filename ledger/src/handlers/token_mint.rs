use {
    super::{mismatched, TransactionHandler},
    crate::{
        config::LedgerConfig,
        context::HandleContext,
        state::{LedgerState, Result},
    },
    log::*,
    simplefees_types::{Functionality, Key, ResponseCode, TransactionBody, TransactionData},
};

pub struct TokenMintHandler;

impl TransactionHandler for TokenMintHandler {
    fn functionality(&self) -> Functionality {
        Functionality::TokenMint
    }

    fn pure_checks(&self, body: &TransactionBody, _config: &LedgerConfig) -> Result<()> {
        let TransactionData::TokenMint(op) = &body.data else {
            return mismatched(&body.data);
        };
        if op.amount > 0 && !op.metadata.is_empty() {
            return Err(ResponseCode::InvalidTransactionBody);
        }
        Ok(())
    }

    fn required_keys(&self, body: &TransactionBody, state: &LedgerState) -> Vec<Key> {
        let TransactionData::TokenMint(op) = &body.data else {
            return Vec::new();
        };
        state
            .token(op.token)
            .and_then(|token| token.supply_key.clone())
            .into_iter()
            .collect()
    }

    fn handle(&self, body: &TransactionBody, ctx: &mut HandleContext<'_>) -> Result<()> {
        let TransactionData::TokenMint(op) = &body.data else {
            return mismatched(&body.data);
        };
        let limits = &ctx.config.limits;
        let token = ctx
            .state
            .token(op.token)
            .ok_or(ResponseCode::InvalidTokenId)?;
        let supply_key = token
            .supply_key
            .as_ref()
            .ok_or(ResponseCode::TokenHasNoSupplyKey)?;
        ctx.require_key(supply_key)?;
        if token.paused {
            return Err(ResponseCode::TokenIsPaused);
        }

        if token.is_fungible() {
            if op.amount == 0 || !op.metadata.is_empty() {
                return Err(ResponseCode::InvalidTokenMintAmount);
            }
        } else {
            if op.amount != 0 || op.metadata.is_empty() {
                return Err(ResponseCode::InvalidTokenMintMetadata);
            }
            if op.metadata.len() > limits.max_nft_mint_batch {
                return Err(ResponseCode::BatchSizeLimitExceeded);
            }
            if op.metadata.iter().any(|data| data.len() > limits.max_nft_metadata_bytes) {
                return Err(ResponseCode::MetadataTooLong);
            }
        }

        let serials = ctx.state.mint(op.token, op.amount, op.metadata.clone())?;
        let new_supply = ctx
            .state
            .token(op.token)
            .map(|token| token.total_supply)
            .ok_or(ResponseCode::InvalidTokenId)?;
        debug!("minted into {}, supply now {new_supply}", op.token);
        ctx.effects.serial_numbers = serials;
        ctx.effects.new_total_supply = Some(new_supply);
        Ok(())
    }
}
