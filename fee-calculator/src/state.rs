use simplefees_types::{AccountId, AccountRef, TokenId};

/// Read-only view of the ledger the calculator needs to count extras that
/// depend on state (custom fee tiers, auto-associations, account creation).
pub trait CalculatorState {
    fn token_has_custom_fees(&self, token: TokenId) -> bool;

    /// Resolves an id or alias to an existing account.
    fn resolve(&self, account: &AccountRef) -> Option<AccountId>;

    fn is_associated(&self, account: AccountId, token: TokenId) -> bool;

    /// Free automatic association slots; `None` means unlimited.
    fn free_auto_association_slots(&self, account: AccountId) -> Option<u64>;

    /// Tokens denominating the fixed fees `payer` owes for sending `token`.
    fn fixed_fee_denominations(&self, token: TokenId, payer: AccountId) -> Vec<TokenId>;
}

/// Estimation without a ledger: accounts named by id exist and are
/// associated, aliases are new accounts, and no token has custom fees.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoState;

impl CalculatorState for NoState {
    fn token_has_custom_fees(&self, _token: TokenId) -> bool {
        false
    }

    fn resolve(&self, account: &AccountRef) -> Option<AccountId> {
        account.id()
    }

    fn is_associated(&self, _account: AccountId, _token: TokenId) -> bool {
        true
    }

    fn free_auto_association_slots(&self, _account: AccountId) -> Option<u64> {
        None
    }

    fn fixed_fee_denominations(&self, _token: TokenId, _payer: AccountId) -> Vec<TokenId> {
        Vec::new()
    }
}
