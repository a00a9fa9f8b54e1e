//! Due-diligence checks shared by ingest and pre-handle.

use {
    crate::{config::PipelineConfig, record::FeeQuote},
    log::*,
    simplefees_calculator::{FeeCalculationError, FeeContext, SimpleFeeCalculator},
    simplefees_ledger::{HandlerRegistry, LedgerState, TransactionHandler},
    simplefees_schedule::ExchangeRateSet,
    simplefees_types::{AccountId, ResponseCode, Timestamp, Transaction, VerifiedKeys},
    std::collections::BTreeSet,
};

pub type Result<T> = std::result::Result<T, ResponseCode>;

/// Read-only view of the pipeline that the checking stages run against.
pub(crate) struct StageContext<'a> {
    pub config: &'a PipelineConfig,
    pub nodes: &'a BTreeSet<AccountId>,
    pub calculator: &'a SimpleFeeCalculator,
    pub handlers: &'a HandlerRegistry,
    pub state: &'a LedgerState,
    pub rates: &'a ExchangeRateSet,
    pub now: Timestamp,
}

impl<'a> StageContext<'a> {
    /// Size, node, memo and validity window. `buffer_secs` is how long the
    /// transaction must remain valid after `now`.
    pub fn check_envelope(&self, txn: &Transaction, node: AccountId, buffer_secs: u64) -> Result<()> {
        let tx_config = &self.config.transactions;
        let body = &txn.body;

        let size = txn
            .serialized_size()
            .map_err(|_| ResponseCode::InvalidTransaction)?;
        if size > tx_config.max_transaction_bytes {
            return Err(ResponseCode::TransactionOversize);
        }
        if body.node_account != node || !self.nodes.contains(&node) {
            return Err(ResponseCode::InvalidNodeAccount);
        }
        if body.memo.len() > self.config.ledger.limits.max_memo_bytes {
            return Err(ResponseCode::MemoTooLong);
        }
        if body.memo.contains('\0') {
            return Err(ResponseCode::InvalidZeroByteInString);
        }

        let duration = body.valid_duration_secs;
        if duration < tx_config.min_valid_duration_secs || duration > tx_config.max_valid_duration_secs {
            return Err(ResponseCode::InvalidTransactionDuration);
        }
        let valid_start = body.transaction_id.valid_start;
        if valid_start > self.now.plus_secs(secs(tx_config.max_future_start_secs)) {
            return Err(ResponseCode::InvalidTransactionStart);
        }
        let expiry = valid_start.plus_secs(secs(duration));
        if expiry.minus_secs(secs(buffer_secs)) < self.now {
            return Err(ResponseCode::TransactionExpired);
        }
        Ok(())
    }

    /// Verifies every signature pair against the body bytes.
    pub fn verify_signatures(&self, txn: &Transaction) -> Result<VerifiedKeys> {
        let message = txn
            .body
            .signed_bytes()
            .map_err(|_| ResponseCode::InvalidTransaction)?;
        Ok(txn.signatures.verify(&message))
    }

    /// The payer must exist and its key must be active. Hollow payers
    /// cannot sign.
    pub fn check_payer(
        &self,
        txn: &Transaction,
        verified: &VerifiedKeys,
        bad_signature: ResponseCode,
    ) -> Result<()> {
        let payer = self
            .state
            .account(txn.body.payer())
            .ok_or(ResponseCode::PayerAccountNotFound)?;
        match &payer.key {
            Some(key) if key.is_satisfied_by(verified) => Ok(()),
            _ => Err(bad_signature),
        }
    }

    pub fn handler(&self, txn: &Transaction) -> Result<&'a dyn TransactionHandler> {
        let functionality = txn.functionality();
        if !self.calculator.supports(functionality) {
            return Err(ResponseCode::NotSupported);
        }
        self.handlers.get(functionality)
    }

    /// Prices the transaction against the current ledger.
    pub fn quote(&self, txn: &Transaction) -> Result<FeeQuote> {
        let ctx = FeeContext::from_transaction(txn).map_err(fee_error_code)?;
        let assessment = self
            .calculator
            .calculate_tx_fee(&ctx, self.state)
            .map_err(fee_error_code)?;
        let exchange_rate = *self.rates.active(self.now);
        Ok(FeeQuote {
            tinybars: assessment.fees.to_tinybars(&exchange_rate),
            fees: assessment.fees,
            extras: assessment.extras,
            exchange_rate,
        })
    }
}

fn secs(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn fee_error_code(err: FeeCalculationError) -> ResponseCode {
    match err {
        FeeCalculationError::UnsupportedFunctionality { .. } => ResponseCode::NotSupported,
        FeeCalculationError::Encoding { .. } => ResponseCode::InvalidTransaction,
        FeeCalculationError::MissingEntry { .. } => {
            warn!("cannot price transaction: {err}");
            ResponseCode::FailInvalid
        }
    }
}
