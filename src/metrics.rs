//! Prometheus-compatible operation metrics.
//!
//! Counts calls, errors and cumulative latency per store operation in
//! `AtomicU64` counters inside a `DashMap`. `GET /metrics` renders them
//! with [`OperationMetrics::to_prometheus`].

use dashmap::DashMap;
use serde::Serialize;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Default)]
struct OpCounters {
    calls: AtomicU64,
    errors: AtomicU64,
    latency_us: AtomicU64,
}

/// Point-in-time view of one operation's counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationSnapshot {
    pub operation: &'static str,
    pub calls: u64,
    pub errors: u64,
    pub latency_us: u64,
}

/// Lock-free per-operation counters
pub struct OperationMetrics {
    ops: DashMap<&'static str, OpCounters>,
    start_time: Instant,
}

impl Default for OperationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationMetrics {
    pub fn new() -> Self {
        Self {
            ops: DashMap::new(),
            start_time: Instant::now(),
        }
    }

    /// Record one call of `operation`
    pub fn record(&self, operation: &'static str, elapsed: Duration, failed: bool) {
        let counters = self.ops.entry(operation).or_default();
        counters.calls.fetch_add(1, Ordering::Relaxed);
        counters
            .latency_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        if failed {
            counters.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Counters of every operation seen so far, sorted by name
    pub fn snapshot(&self) -> Vec<OperationSnapshot> {
        let mut out: Vec<OperationSnapshot> = self
            .ops
            .iter()
            .map(|entry| OperationSnapshot {
                operation: *entry.key(),
                calls: entry.calls.load(Ordering::Relaxed),
                errors: entry.errors.load(Ordering::Relaxed),
                latency_us: entry.latency_us.load(Ordering::Relaxed),
            })
            .collect();
        out.sort_by_key(|s| s.operation);
        out
    }

    /// Format all metrics as Prometheus text exposition.
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = String::new();

        let _ = writeln!(out, "# HELP soiree_uptime_seconds Seconds since server start");
        let _ = writeln!(out, "# TYPE soiree_uptime_seconds gauge");
        let _ = writeln!(
            out,
            "soiree_uptime_seconds {}",
            self.start_time.elapsed().as_secs()
        );

        let families: [(&str, &str, fn(&OperationSnapshot) -> u64); 3] = [
            (
                "soiree_store_calls_total",
                "Store operation calls",
                |s: &OperationSnapshot| s.calls,
            ),
            (
                "soiree_store_errors_total",
                "Store operation failures",
                |s: &OperationSnapshot| s.errors,
            ),
            (
                "soiree_store_latency_microseconds_total",
                "Cumulative store operation latency",
                |s: &OperationSnapshot| s.latency_us,
            ),
        ];

        for (name, help, value) in families {
            let _ = writeln!(out, "# HELP {} {}", name, help);
            let _ = writeln!(out, "# TYPE {} counter", name);
            for s in &snapshot {
                let _ = writeln!(out, "{}{{operation=\"{}\"}} {}", name, s.operation, value(s));
            }
        }

        out
    }
}
