//! # Pipeline monitoring
//!
//! Counters, gauges and histograms describing what the charging pipeline
//! did: how many transactions were accepted or rejected at each stage, how
//! much was charged, and how many secondary effects (custom fees, pending
//! airdrops, child records) handling produced.
//!
//! ## Usage
//!
//! ```rust
//! use simplefees_monitoring::PipelineMetrics;
//!
//! let metrics = PipelineMetrics::new();
//! metrics.transactions_submitted.inc();
//! metrics.fees_charged_tinybars.add(84_000_000);
//! metrics.fee_usd.observe(0.1);
//!
//! let text = simplefees_monitoring::prometheus::encode(&metrics.snapshot());
//! assert!(text.contains("simplefees_transactions_submitted_total 1"));
//! ```

pub mod prometheus;

use {
    parking_lot::Mutex,
    std::sync::atomic::{AtomicI64, AtomicU64, Ordering},
};

// ---------------------------------------------------------------------------
// Metric primitives
// ---------------------------------------------------------------------------

/// A monotonically increasing counter.
pub struct Counter {
    value: AtomicU64,
    name: &'static str,
    help: &'static str,
}

impl Counter {
    pub const fn new(name: &'static str, help: &'static str) -> Self {
        Self {
            value: AtomicU64::new(0),
            name,
            help,
        }
    }

    pub fn inc(&self) {
        self.add(1);
    }

    pub fn add(&self, v: u64) {
        self.value.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    fn family(&self) -> MetricFamily {
        MetricFamily {
            name: self.name,
            help: self.help,
            value: MetricValue::Counter(self.get()),
        }
    }
}

/// A value that can go up or down.
pub struct Gauge {
    value: AtomicI64,
    name: &'static str,
    help: &'static str,
}

impl Gauge {
    pub const fn new(name: &'static str, help: &'static str) -> Self {
        Self {
            value: AtomicI64::new(0),
            name,
            help,
        }
    }

    pub fn set(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    pub fn add(&self, v: i64) {
        self.value.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    fn family(&self) -> MetricFamily {
        MetricFamily {
            name: self.name,
            help: self.help,
            value: MetricValue::Gauge(self.get()),
        }
    }
}

/// Observations counted into cumulative buckets.
pub struct Histogram {
    buckets: Vec<f64>,
    counts: Vec<AtomicU64>,
    sum: Mutex<f64>,
    count: AtomicU64,
    name: &'static str,
    help: &'static str,
}

impl Histogram {
    /// `buckets` are upper bounds in increasing order.
    pub fn new(name: &'static str, help: &'static str, buckets: Vec<f64>) -> Self {
        let counts = buckets.iter().map(|_| AtomicU64::new(0)).collect();
        Self {
            buckets,
            counts,
            sum: Mutex::new(0.0),
            count: AtomicU64::new(0),
            name,
            help,
        }
    }

    pub fn observe(&self, v: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        *self.sum.lock() += v;
        for (bound, count) in self.buckets.iter().zip(&self.counts) {
            if v <= *bound {
                count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn get_sum(&self) -> f64 {
        *self.sum.lock()
    }

    /// `(upper bound, cumulative count)` pairs.
    pub fn get_buckets(&self) -> Vec<(f64, u64)> {
        self.buckets
            .iter()
            .zip(&self.counts)
            .map(|(bound, count)| (*bound, count.load(Ordering::Relaxed)))
            .collect()
    }

    fn family(&self) -> MetricFamily {
        MetricFamily {
            name: self.name,
            help: self.help,
            value: MetricValue::Histogram {
                buckets: self.get_buckets(),
                sum: self.get_sum(),
                count: self.get_count(),
            },
        }
    }
}

/// Buckets for charged fees in USD.
pub fn default_fee_usd_buckets() -> Vec<f64> {
    vec![0.0001, 0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]
}

// ---------------------------------------------------------------------------
// Pipeline metrics
// ---------------------------------------------------------------------------

pub struct PipelineMetrics {
    // -- Stages --
    pub transactions_submitted: Counter,
    pub ingest_rejected: Counter,
    pub prehandle_failed: Counter,
    pub handled_ok: Counter,
    pub handle_failed: Counter,
    pub duplicates_handled: Counter,

    // -- Fees --
    pub fees_charged_tinybars: Counter,
    pub node_fees_tinybars: Counter,
    pub network_fees_tinybars: Counter,
    pub fee_usd: Histogram,

    // -- Handling effects --
    pub custom_fees_assessed: Counter,
    pub pending_airdrops_created: Counter,
    pub child_records: Counter,
    pub pending_airdrops: Gauge,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            transactions_submitted: Counter::new(
                "simplefees_transactions_submitted_total",
                "Transactions submitted for ingest",
            ),
            ingest_rejected: Counter::new(
                "simplefees_ingest_rejected_total",
                "Transactions rejected at ingest without charge",
            ),
            prehandle_failed: Counter::new(
                "simplefees_prehandle_failed_total",
                "Transactions failing due diligence at pre-handle",
            ),
            handled_ok: Counter::new(
                "simplefees_handled_success_total",
                "Transactions handled successfully",
            ),
            handle_failed: Counter::new(
                "simplefees_handle_failed_total",
                "Transactions charged but failed at handle",
            ),
            duplicates_handled: Counter::new(
                "simplefees_duplicates_handled_total",
                "Duplicate transactions reaching handle",
            ),
            fees_charged_tinybars: Counter::new(
                "simplefees_fees_charged_tinybars_total",
                "Fees charged to payers and nodes (tinybars)",
            ),
            node_fees_tinybars: Counter::new(
                "simplefees_node_fees_tinybars_total",
                "Fees paid to submitting nodes (tinybars)",
            ),
            network_fees_tinybars: Counter::new(
                "simplefees_network_fees_tinybars_total",
                "Fees paid to the fee collection account (tinybars)",
            ),
            fee_usd: Histogram::new(
                "simplefees_fee_usd",
                "Fee charged per handled transaction in USD",
                default_fee_usd_buckets(),
            ),
            custom_fees_assessed: Counter::new(
                "simplefees_custom_fees_assessed_total",
                "Custom fees assessed while handling transfers",
            ),
            pending_airdrops_created: Counter::new(
                "simplefees_pending_airdrops_created_total",
                "Pending airdrops created or topped up",
            ),
            child_records: Counter::new(
                "simplefees_child_records_total",
                "Automatic account creations and hook executions",
            ),
            pending_airdrops: Gauge::new(
                "simplefees_pending_airdrops",
                "Pending airdrops currently outstanding",
            ),
        }
    }

    /// Point-in-time copy of every metric, in export order.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            families: vec![
                self.transactions_submitted.family(),
                self.ingest_rejected.family(),
                self.prehandle_failed.family(),
                self.handled_ok.family(),
                self.handle_failed.family(),
                self.duplicates_handled.family(),
                self.fees_charged_tinybars.family(),
                self.node_fees_tinybars.family(),
                self.network_fees_tinybars.family(),
                self.fee_usd.family(),
                self.custom_fees_assessed.family(),
                self.pending_airdrops_created.family(),
                self.child_records.family(),
                self.pending_airdrops.family(),
            ],
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Counter(u64),
    Gauge(i64),
    Histogram {
        buckets: Vec<(f64, u64)>,
        sum: f64,
        count: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: &'static str,
    pub help: &'static str,
    pub value: MetricValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub families: Vec<MetricFamily>,
}

impl MetricsSnapshot {
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.families
            .iter()
            .find(|family| family.name == name)
            .map(|family| &family.value)
    }

    pub fn counter(&self, name: &str) -> Option<u64> {
        match self.get(name)? {
            MetricValue::Counter(v) => Some(*v),
            _ => None,
        }
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            MetricValue::Gauge(v) => Some(*v),
            _ => None,
        }
    }
}
