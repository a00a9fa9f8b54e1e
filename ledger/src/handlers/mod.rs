//! One handler per supported transaction kind.

mod consensus_create_topic;
mod crypto_transfer;
mod token_airdrop;
mod token_associate;
mod token_mint;
mod token_pending_airdrop;

pub use {
    consensus_create_topic::ConsensusCreateTopicHandler,
    crypto_transfer::CryptoTransferHandler,
    token_airdrop::TokenAirdropHandler,
    token_associate::TokenAssociateHandler,
    token_mint::TokenMintHandler,
    token_pending_airdrop::{TokenCancelAirdropHandler, TokenClaimAirdropHandler},
};

use {
    crate::{
        config::LedgerConfig,
        context::HandleContext,
        state::{LedgerState, Result},
    },
    simplefees_types::{Functionality, Key, ResponseCode, TransactionBody, TransactionData},
    std::collections::BTreeMap,
};

pub trait TransactionHandler: Send + Sync {
    fn functionality(&self) -> Functionality;

    /// Checks that need no ledger state. Run at ingest and again at
    /// pre-handle.
    fn pure_checks(&self, body: &TransactionBody, config: &LedgerConfig) -> Result<()>;

    /// Non-payer keys that must have signed, as far as they are known
    /// before handling. Unresolvable references are left to `handle`.
    fn required_keys(&self, body: &TransactionBody, state: &LedgerState) -> Vec<Key>;

    /// Applies the transaction to the scratch state in `ctx`.
    fn handle(&self, body: &TransactionBody, ctx: &mut HandleContext<'_>) -> Result<()>;
}

/// Handlers keyed by functionality.
pub struct HandlerRegistry {
    handlers: BTreeMap<Functionality, Box<dyn TransactionHandler>>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// Registry with every built-in handler.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: BTreeMap::new(),
        };
        registry.register(Box::new(CryptoTransferHandler));
        registry.register(Box::new(TokenAirdropHandler));
        registry.register(Box::new(TokenMintHandler));
        registry.register(Box::new(ConsensusCreateTopicHandler));
        registry.register(Box::new(TokenAssociateHandler));
        registry.register(Box::new(TokenClaimAirdropHandler));
        registry.register(Box::new(TokenCancelAirdropHandler));
        registry
    }

    pub fn register(&mut self, handler: Box<dyn TransactionHandler>) {
        self.handlers.insert(handler.functionality(), handler);
    }

    pub fn get(&self, functionality: Functionality) -> Result<&dyn TransactionHandler> {
        self.handlers
            .get(&functionality)
            .map(Box::as_ref)
            .ok_or(ResponseCode::NotSupported)
    }

    pub fn supports(&self, functionality: Functionality) -> bool {
        self.handlers.contains_key(&functionality)
    }
}

/// Rejects a body whose data does not belong to the handler.
pub(crate) fn mismatched<T>(data: &TransactionData) -> Result<T> {
    log::warn!("handler received {} body", data.functionality());
    Err(ResponseCode::InvalidTransactionBody)
}
