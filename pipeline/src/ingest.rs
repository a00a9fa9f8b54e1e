//! Ingest: checks a node runs before gossiping a transaction. A rejected
//! transaction is never charged.

use {
    crate::{
        checks::{Result, StageContext},
        dedup::DedupCache,
        record::FeeQuote,
    },
    log::*,
    simplefees_types::{AccountId, ResponseCode, Transaction},
};

pub(crate) fn run(
    ctx: &StageContext<'_>,
    dedup: &DedupCache,
    txn: &Transaction,
    node: AccountId,
) -> Result<FeeQuote> {
    let body = &txn.body;
    ctx.check_envelope(txn, node, ctx.config.transactions.min_validity_buffer_secs)?;
    if dedup.contains(&body.transaction_id) {
        return Err(ResponseCode::DuplicateTransaction);
    }

    let verified = ctx.verify_signatures(txn)?;
    ctx.check_payer(txn, &verified, ResponseCode::InvalidSignature)?;

    let handler = ctx.handler(txn)?;
    handler.pure_checks(body, &ctx.config.ledger)?;

    let quote = ctx.quote(txn)?;
    let fee = quote.total_tinybars();
    if body.max_transaction_fee < fee {
        debug!(
            "{}: fee {fee} exceeds limit {}",
            body.transaction_id, body.max_transaction_fee
        );
        return Err(ResponseCode::InsufficientTxFee);
    }
    if ctx.state.balance(body.payer()) < fee {
        return Err(ResponseCode::InsufficientPayerBalance);
    }
    Ok(quote)
}
