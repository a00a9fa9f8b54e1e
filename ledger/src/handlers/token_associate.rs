use {
    super::{mismatched, TransactionHandler},
    crate::{
        config::LedgerConfig,
        context::HandleContext,
        state::{LedgerState, Result},
    },
    simplefees_types::{Functionality, Key, ResponseCode, TransactionBody, TransactionData},
    std::collections::BTreeSet,
};

pub struct TokenAssociateHandler;

impl TransactionHandler for TokenAssociateHandler {
    fn functionality(&self) -> Functionality {
        Functionality::TokenAssociateToAccount
    }

    fn pure_checks(&self, body: &TransactionBody, _config: &LedgerConfig) -> Result<()> {
        let TransactionData::TokenAssociate(op) = &body.data else {
            return mismatched(&body.data);
        };
        let mut seen = BTreeSet::new();
        if !op.tokens.iter().all(|token| seen.insert(*token)) {
            return Err(ResponseCode::TokenIdRepeatedInTokenList);
        }
        Ok(())
    }

    fn required_keys(&self, body: &TransactionBody, state: &LedgerState) -> Vec<Key> {
        let TransactionData::TokenAssociate(op) = &body.data else {
            return Vec::new();
        };
        state
            .account(op.account)
            .and_then(|account| account.key.clone())
            .into_iter()
            .collect()
    }

    fn handle(&self, body: &TransactionBody, ctx: &mut HandleContext<'_>) -> Result<()> {
        let TransactionData::TokenAssociate(op) = &body.data else {
            return mismatched(&body.data);
        };
        ctx.require_account_signature(op.account)?;
        for token in &op.tokens {
            ctx.state.associate(op.account, *token)?;
        }
        Ok(())
    }
}
