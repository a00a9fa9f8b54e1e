//! Prometheus text exposition format (text/plain; version=0.0.4).

use crate::{MetricValue, MetricsSnapshot};

/// Encodes every metric family of the snapshot.
pub fn encode(snap: &MetricsSnapshot) -> String {
    let mut out = String::with_capacity(2048);
    for family in &snap.families {
        match &family.value {
            MetricValue::Counter(value) => {
                write_header(&mut out, family.name, family.help, "counter");
                out.push_str(&format!("{} {value}\n\n", family.name));
            }
            MetricValue::Gauge(value) => {
                write_header(&mut out, family.name, family.help, "gauge");
                out.push_str(&format!("{} {value}\n\n", family.name));
            }
            MetricValue::Histogram {
                buckets,
                sum,
                count,
            } => write_histogram(&mut out, family.name, family.help, buckets, *sum, *count),
        }
    }
    out
}

fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    out.push_str(&format!("# HELP {name} {help}\n"));
    out.push_str(&format!("# TYPE {name} {kind}\n"));
}

fn write_histogram(
    out: &mut String,
    name: &str,
    help: &str,
    buckets: &[(f64, u64)],
    sum: f64,
    count: u64,
) {
    write_header(out, name, help, "histogram");
    for (bound, cumulative) in buckets.iter().filter(|(bound, _)| bound.is_finite()) {
        out.push_str(&format!("{name}_bucket{{le=\"{bound}\"}} {cumulative}\n"));
    }
    out.push_str(&format!("{name}_bucket{{le=\"+Inf\"}} {count}\n"));
    out.push_str(&format!("{name}_sum {sum}\n"));
    out.push_str(&format!("{name}_count {count}\n\n"));
}
