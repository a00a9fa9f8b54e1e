//! Pre-handle: due diligence repeated at consensus, whether or not the
//! transaction went through ingest. Failures here are the submitting
//! node's fault.

use {
    crate::checks::{Result, StageContext},
    simplefees_types::{AccountId, Key, ResponseCode, Transaction, VerifiedKeys},
};

/// Signatures and keys gathered for the handle stage.
#[derive(Debug, Clone)]
pub struct PreHandled {
    pub verified: VerifiedKeys,
    /// Non-payer keys known to be required before handling.
    pub required_keys: Vec<Key>,
}

pub(crate) fn run(ctx: &StageContext<'_>, txn: &Transaction, node: AccountId) -> Result<PreHandled> {
    ctx.check_envelope(txn, node, 0)?;
    let verified = ctx.verify_signatures(txn)?;
    ctx.check_payer(txn, &verified, ResponseCode::InvalidPayerSignature)?;

    let handler = ctx.handler(txn)?;
    handler.pure_checks(&txn.body, &ctx.config.ledger)?;
    let required_keys = handler.required_keys(&txn.body, ctx.state);

    Ok(PreHandled {
        verified,
        required_keys,
    })
}
