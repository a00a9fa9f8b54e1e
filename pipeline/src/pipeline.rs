use {
    crate::{
        charging::{ChargingPolicy, FeeCharger},
        checks::StageContext,
        config::PipelineConfig,
        dedup::DedupCache,
        error::{PipelineError, Result},
        handle, ingest,
        pre_handle::{self, PreHandled},
        record::{FeeQuote, TransactionRecord},
    },
    log::*,
    simplefees_calculator::{FeeResult, SimpleFeeCalculator},
    simplefees_ledger::{HandlerRegistry, LedgerState, PendingAirdrop, Token, TokenRelation, Topic, TransactionEffects},
    simplefees_monitoring::PipelineMetrics,
    simplefees_schedule::{ExchangeRateSet, FeeSchedule},
    simplefees_types::{
        AccountId, PendingAirdropId, ResponseCode, Timestamp, TokenId, TopicId, Transaction,
        TransactionId,
    },
    std::{
        collections::{BTreeMap, BTreeSet},
        sync::Arc,
    },
};

/// What the handle stage decided before anything was charged.
enum Verdict {
    /// Charge per `policy` and stop with `status`.
    Charge {
        status: ResponseCode,
        policy: ChargingPolicy,
        fees: FeeResult,
    },
    /// Charge the full fee, then run the handler.
    Execute { pre: PreHandled, fees: FeeResult },
}

/// The charging pipeline of one node set over one ledger.
///
/// Transactions enter through [`submit`](Self::submit) (ingest) and reach
/// consensus through [`handle`](Self::handle), which runs pre-handle, charges
/// the fee the stage outcome calls for and, when everything checks out,
/// executes the transaction.
pub struct FeePipeline {
    config: PipelineConfig,
    calculator: SimpleFeeCalculator,
    handlers: HandlerRegistry,
    state: LedgerState,
    rates: ExchangeRateSet,
    nodes: BTreeSet<AccountId>,
    dedup: DedupCache,
    records: BTreeMap<TransactionId, Vec<TransactionRecord>>,
    metrics: Arc<PipelineMetrics>,
    now: Timestamp,
}

impl FeePipeline {
    /// Loads the schedule named by the configuration, or the canonical one.
    /// The fee collection account must already exist in `state`.
    pub fn new(config: PipelineConfig, state: LedgerState) -> Result<Self> {
        config.validate()?;
        let schedule = match &config.fees.schedule_path {
            Some(path) => FeeSchedule::from_file(path)?,
            None => FeeSchedule::canonical(),
        };
        Self::with_schedule(config, schedule, state)
    }

    pub fn with_schedule(config: PipelineConfig, schedule: FeeSchedule, state: LedgerState) -> Result<Self> {
        config.validate()?;
        schedule.validate()?;
        let collector = config.fees.fee_collection_account;
        if state.account(collector).is_none() {
            return Err(PipelineError::MissingAccount { account: collector });
        }
        info!(
            "fee pipeline ready: collector {collector}, {} accounts",
            state.accounts().count()
        );
        Ok(Self {
            dedup: DedupCache::new(config.transactions.dedup_window_secs),
            config,
            calculator: SimpleFeeCalculator::new(schedule),
            handlers: HandlerRegistry::new(),
            state,
            rates: ExchangeRateSet::default(),
            nodes: BTreeSet::new(),
            records: BTreeMap::new(),
            metrics: Arc::new(PipelineMetrics::new()),
            now: Timestamp::default(),
        })
    }

    pub fn with_exchange_rates(mut self, rates: ExchangeRateSet) -> Result<Self> {
        rates.validate()?;
        self.rates = rates;
        Ok(self)
    }

    /// Accepts transactions submitted through `node`.
    pub fn add_node(&mut self, node: AccountId) -> Result<()> {
        if self.state.account(node).is_none() {
            return Err(PipelineError::MissingAccount { account: node });
        }
        self.nodes.insert(node);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Clock
    // ---------------------------------------------------------------------

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn set_time(&mut self, now: Timestamp) {
        self.now = now;
    }

    pub fn advance_time(&mut self, secs: i64) {
        self.now = self.now.plus_secs(secs);
    }

    // ---------------------------------------------------------------------
    // Stages
    // ---------------------------------------------------------------------

    fn stage_context(&self) -> StageContext<'_> {
        StageContext {
            config: &self.config,
            nodes: &self.nodes,
            calculator: &self.calculator,
            handlers: &self.handlers,
            state: &self.state,
            rates: &self.rates,
            now: self.now,
        }
    }

    /// Prices `txn` against the current ledger without charging anything.
    pub fn estimate_fee(&self, txn: &Transaction) -> std::result::Result<FeeQuote, ResponseCode> {
        self.stage_context().quote(txn)
    }

    /// Ingest. Nothing is charged whether the transaction is accepted or
    /// not; accepted ids are remembered for duplicate detection.
    pub fn submit(&mut self, txn: &Transaction, node: AccountId) -> std::result::Result<FeeQuote, ResponseCode> {
        self.metrics.transactions_submitted.inc();
        self.dedup.purge(self.now);
        let id = txn.body.transaction_id;
        match ingest::run(&self.stage_context(), &self.dedup, txn, node) {
            Ok(quote) => {
                self.dedup.record_submitted(id);
                debug!("{id}: accepted at ingest, fee {} tinybars", quote.total_tinybars());
                Ok(quote)
            }
            Err(code) => {
                self.metrics.ingest_rejected.inc();
                info!("{id}: rejected at ingest with {code}");
                Err(code)
            }
        }
    }

    /// Pre-handle and handle at the current consensus time. Always
    /// produces a record, since every outcome here settles who pays.
    pub fn handle(&mut self, txn: &Transaction, node: AccountId) -> TransactionRecord {
        let consensus_time = self.now;
        self.dedup.purge(consensus_time);
        let body = &txn.body;
        let id = body.transaction_id;
        let payer = body.payer();
        let exchange_rate = *self.rates.active(consensus_time);
        let charger = FeeCharger::new(node, self.config.fees.fee_collection_account);

        let (mut status, policy, fees, pre) = match self.verdict(txn, node) {
            Verdict::Charge {
                status,
                policy,
                fees,
            } => (status, policy, fees, None),
            Verdict::Execute { pre, fees } => (ResponseCode::Success, ChargingPolicy::Full, fees, Some(pre)),
        };

        let mut distribution =
            charger.distribution(policy, payer, &fees.to_tinybars(&exchange_rate), &self.state);
        let mut transfer_list = match charger.charge(&mut self.state, &distribution) {
            Ok(adjustments) => adjustments,
            Err(code) => {
                error!("{id}: failed to charge fee: {code}");
                status = ResponseCode::FailInvalid;
                distribution.to_node = 0;
                distribution.to_collector = 0;
                BTreeMap::new()
            }
        };

        let mut effects = TransactionEffects::default();
        if let (Some(pre), true) = (pre, status.is_success()) {
            let outcome = self.handlers.get(txn.functionality()).and_then(|handler| {
                handle::dispatch(
                    handler,
                    body,
                    &mut self.state,
                    &self.config.ledger,
                    &pre,
                    consensus_time,
                )
            });
            match outcome {
                Ok(handled) => effects = handled,
                Err(code) => status = code,
            }
        }
        for (account, delta) in &effects.hbar_transfers {
            let entry = transfer_list.entry(*account).or_insert(0i64);
            *entry = entry.saturating_add(*delta);
        }
        transfer_list.retain(|_, delta| *delta != 0);

        let record = TransactionRecord {
            transaction_id: id,
            node,
            consensus_time,
            status,
            charging: policy,
            transaction_fee: distribution.total(),
            distribution,
            fees,
            exchange_rate,
            transfer_list,
            effects,
            memo: body.memo.clone(),
        };
        self.dedup.record_handled(id, node);
        self.observe(&record);
        info!(
            "{id}: {status} via {node}, charged {} tinybars to {} ({policy:?})",
            record.transaction_fee,
            record.fee_payer()
        );
        self.records.entry(id).or_default().push(record.clone());
        record
    }

    /// Ingest followed by handle. Ingest rejections produce no record.
    pub fn submit_and_handle(
        &mut self,
        txn: &Transaction,
        node: AccountId,
    ) -> std::result::Result<TransactionRecord, ResponseCode> {
        self.submit(txn, node)?;
        Ok(self.handle(txn, node))
    }

    fn verdict(&self, txn: &Transaction, node: AccountId) -> Verdict {
        let ctx = self.stage_context();
        let body = &txn.body;
        let signatures = txn.signatures.len() as u64;
        let bytes = txn.serialized_size().unwrap_or_default();
        let base = self.calculator.node_and_network(signatures, bytes);

        let pre = match pre_handle::run(&ctx, txn, node) {
            Ok(pre) => pre,
            Err(code) => {
                return Verdict::Charge {
                    status: code,
                    policy: ChargingPolicy::NodeDueDiligence,
                    fees: base,
                }
            }
        };

        if let Some(first) = self.dedup.handled_by(&body.transaction_id) {
            let policy = if first == node {
                ChargingPolicy::NodeDueDiligence
            } else {
                ChargingPolicy::NodeAndNetworkOnly
            };
            return Verdict::Charge {
                status: ResponseCode::DuplicateTransaction,
                policy,
                fees: base,
            };
        }

        let quote = match ctx.quote(txn) {
            Ok(quote) => quote,
            Err(code) => {
                return Verdict::Charge {
                    status: code,
                    policy: ChargingPolicy::NoCharge,
                    fees: FeeResult::default(),
                }
            }
        };

        let fee_limit = body.max_transaction_fee;
        if fee_limit < quote.tinybars.node_and_network() {
            return Verdict::Charge {
                status: ResponseCode::InsufficientTxFee,
                policy: ChargingPolicy::NodeDueDiligence,
                fees: quote.fees,
            };
        }
        if fee_limit < quote.total_tinybars() {
            return Verdict::Charge {
                status: ResponseCode::InsufficientTxFee,
                policy: ChargingPolicy::NodeAndNetworkOnly,
                fees: quote.fees,
            };
        }
        if self.state.balance(body.payer()) < quote.total_tinybars() {
            return Verdict::Charge {
                status: ResponseCode::InsufficientPayerBalance,
                policy: ChargingPolicy::Full,
                fees: quote.fees,
            };
        }
        Verdict::Execute {
            pre,
            fees: quote.fees,
        }
    }

    fn observe(&self, record: &TransactionRecord) {
        let metrics = &self.metrics;
        if record.is_success() {
            metrics.handled_ok.inc();
        } else if record.charging == ChargingPolicy::NodeDueDiligence {
            metrics.prehandle_failed.inc();
        } else {
            metrics.handle_failed.inc();
        }
        if record.status == ResponseCode::DuplicateTransaction {
            metrics.duplicates_handled.inc();
        }
        metrics.fees_charged_tinybars.add(record.transaction_fee);
        metrics.node_fees_tinybars.add(record.distribution.to_node);
        metrics.network_fees_tinybars.add(record.distribution.to_collector);
        metrics.fee_usd.observe(record.charged_usd());

        let effects = &record.effects;
        metrics
            .custom_fees_assessed
            .add(effects.assessed_custom_fees.len() as u64);
        metrics
            .pending_airdrops_created
            .add(effects.new_pending_airdrops.len() as u64);
        metrics.child_records.add(effects.child_records.len() as u64);
        metrics
            .pending_airdrops
            .set(i64::try_from(self.state.pending_airdrop_count()).unwrap_or(i64::MAX));
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn calculator(&self) -> &SimpleFeeCalculator {
        &self.calculator
    }

    pub fn exchange_rates(&self) -> &ExchangeRateSet {
        &self.rates
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Direct ledger access for genesis-style setup.
    pub fn state_mut(&mut self) -> &mut LedgerState {
        &mut self.state
    }

    pub fn balance(&self, account: AccountId) -> u64 {
        self.state.balance(account)
    }

    pub fn token(&self, token: TokenId) -> Option<&Token> {
        self.state.token(token)
    }

    pub fn token_balance(&self, account: AccountId, token: TokenId) -> u64 {
        self.state.token_balance(account, token)
    }

    pub fn relation(&self, account: AccountId, token: TokenId) -> Option<&TokenRelation> {
        self.state.relation(account, token)
    }

    pub fn pending_airdrop(&self, id: &PendingAirdropId) -> Option<&PendingAirdrop> {
        self.state.pending_airdrop(id)
    }

    pub fn topic(&self, topic: TopicId) -> Option<&Topic> {
        self.state.topic(topic)
    }

    /// The first record handled under `id`.
    pub fn record(&self, id: &TransactionId) -> Option<&TransactionRecord> {
        self.records.get(id).and_then(|records| records.first())
    }

    /// Every record handled under `id`, duplicates included.
    pub fn records(&self, id: &TransactionId) -> &[TransactionRecord] {
        self.records.get(id).map(Vec::as_slice).unwrap_or_default()
    }
}
