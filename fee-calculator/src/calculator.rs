use {
    crate::{
        error::{FeeCalculationError, Result},
        extras::ExtraCounts,
        result::FeeResult,
        services,
        state::CalculatorState,
    },
    log::debug,
    simplefees_schedule::{Extra, FeeEntry, FeeSchedule},
    simplefees_types::{Functionality, Transaction, TransactionBody},
    std::collections::BTreeMap,
};

/// What the calculator needs to know about a submitted transaction.
#[derive(Debug, Clone, Copy)]
pub struct FeeContext<'a> {
    pub body: &'a TransactionBody,
    /// Signature pairs attached, valid or not.
    pub signatures: u64,
    /// Serialized size of the signed transaction.
    pub bytes: u64,
}

impl<'a> FeeContext<'a> {
    pub fn from_transaction(txn: &'a Transaction) -> Result<Self> {
        let bytes = txn
            .serialized_size()
            .map_err(|err| FeeCalculationError::Encoding {
                reason: err.to_string(),
            })?;
        Ok(Self {
            body: &txn.body,
            signatures: txn.signatures.len() as u64,
            bytes,
        })
    }
}

/// Result of pricing one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeAssessment {
    pub fees: FeeResult,
    /// Every extra counted, node extras included.
    pub extras: ExtraCounts,
    /// Service entries charged, in order.
    pub entries: Vec<FeeEntry>,
}

/// Adds service entries to the running service fee.
pub struct FeeAccumulator<'a> {
    schedule: &'a FeeSchedule,
    service: u64,
    extras: ExtraCounts,
    entries: Vec<FeeEntry>,
}

impl<'a> FeeAccumulator<'a> {
    pub fn new(schedule: &'a FeeSchedule) -> Self {
        Self {
            schedule,
            service: 0,
            extras: ExtraCounts::new(),
            entries: Vec::new(),
        }
    }

    /// Charges `entry`'s base fee plus every extra beyond its free
    /// allotment.
    ///
    /// ```text
    /// service += entry.base + Σ price(e) · max(0, count(e) − entry.included(e))
    /// ```
    pub fn charge(&mut self, entry: FeeEntry, extras: &[(Extra, u64)]) -> Result<()> {
        let fee = self
            .schedule
            .service(entry)
            .ok_or(FeeCalculationError::MissingEntry { entry })?;
        let mut total = fee.base_fee;
        for (extra, count) in extras {
            let billable = count.saturating_sub(fee.included(*extra));
            total = total.saturating_add(self.schedule.price(*extra).saturating_mul(billable));
            self.extras.add(*extra, *count);
        }
        self.service = self.service.saturating_add(total);
        self.entries.push(entry);
        Ok(())
    }

    pub fn service_fee(&self) -> u64 {
        self.service
    }
}

/// Prices the service portion of one transaction kind.
pub trait ServiceFeeCalculator: Send + Sync {
    fn functionality(&self) -> Functionality;

    fn accumulate(
        &self,
        ctx: &FeeContext<'_>,
        state: &dyn CalculatorState,
        fees: &mut FeeAccumulator<'_>,
    ) -> Result<()>;
}

/// Node, network and service fees under one schedule.
pub struct SimpleFeeCalculator {
    schedule: FeeSchedule,
    services: BTreeMap<Functionality, Box<dyn ServiceFeeCalculator>>,
}

impl SimpleFeeCalculator {
    /// A calculator with every built-in service registered.
    pub fn new(schedule: FeeSchedule) -> Self {
        let mut calculator = Self {
            schedule,
            services: BTreeMap::new(),
        };
        for service in services::all() {
            calculator.register(service);
        }
        calculator
    }

    /// Registers (or replaces) the calculator for one transaction kind.
    pub fn register(&mut self, service: Box<dyn ServiceFeeCalculator>) {
        self.services.insert(service.functionality(), service);
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    pub fn supports(&self, functionality: Functionality) -> bool {
        self.services.contains_key(&functionality)
    }

    /// ```text
    /// node = node.base + Σ price(e) · max(0, count(e) − node.included(e))
    ///        for e ∈ {SIGNATURES, PROCESSING_BYTES}
    /// ```
    pub fn node_fee(&self, signatures: u64, bytes: u64) -> u64 {
        [(Extra::Signatures, signatures), (Extra::ProcessingBytes, bytes)]
            .into_iter()
            .fold(self.schedule.node.base_fee, |fee, (extra, count)| {
                let billable = count.saturating_sub(self.schedule.node_included(extra));
                fee.saturating_add(self.schedule.price(extra).saturating_mul(billable))
            })
    }

    /// Node and network fees with no service portion.
    pub fn node_and_network(&self, signatures: u64, bytes: u64) -> FeeResult {
        let node = self.node_fee(signatures, bytes);
        FeeResult {
            node,
            network: node.saturating_mul(self.schedule.network.multiplier),
            service: 0,
        }
    }

    pub fn calculate_tx_fee(
        &self,
        ctx: &FeeContext<'_>,
        state: &dyn CalculatorState,
    ) -> Result<FeeAssessment> {
        let functionality = ctx.body.data.functionality();
        let service = self
            .services
            .get(&functionality)
            .ok_or(FeeCalculationError::UnsupportedFunctionality { functionality })?;

        let mut accumulator = FeeAccumulator::new(&self.schedule);
        service.accumulate(ctx, state, &mut accumulator)?;

        let mut fees = self.node_and_network(ctx.signatures, ctx.bytes);
        fees.service = accumulator.service;

        let mut extras = accumulator.extras;
        extras.set(Extra::Signatures, ctx.signatures);
        extras.set(Extra::ProcessingBytes, ctx.bytes);

        debug!(
            "{functionality} fee: node={} network={} service={} entries={:?}",
            fees.node, fees.network, fees.service, accumulator.entries
        );

        Ok(FeeAssessment {
            fees,
            extras,
            entries: accumulator.entries,
        })
    }

    /// Prices explicit extra counts against a list of entries. Every
    /// non-node extra is charged against each entry.
    pub fn calculate_for_entries(
        &self,
        entries: &[FeeEntry],
        extras: &ExtraCounts,
    ) -> Result<FeeResult> {
        let mut accumulator = FeeAccumulator::new(&self.schedule);
        let service_extras: Vec<(Extra, u64)> =
            extras.iter().filter(|(e, _)| !e.is_node_extra()).collect();
        for entry in entries {
            accumulator.charge(*entry, &service_extras)?;
        }
        let mut fees = self.node_and_network(
            extras.get(Extra::Signatures),
            extras.get(Extra::ProcessingBytes),
        );
        fees.service = accumulator.service_fee();
        Ok(fees)
    }
}
