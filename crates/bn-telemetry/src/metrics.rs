//! Prometheus metrics for the BLS aggregation node.
//!
//! All metrics follow the naming convention: `bn_<subsystem>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., gossip_messages_received_total)
//! - **Gauge**: Value that can go up or down (e.g., gossip_peers)
//! - **Histogram**: Distribution of values (e.g., bls_aggregation_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, GaugeVec, Histogram, HistogramOpts,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // GOSSIP MEMBERSHIP METRICS
    // =========================================================================

    /// Distinct gossip messages received
    pub static ref GOSSIP_MESSAGES_RECEIVED: Counter = Counter::new(
        "bn_gossip_messages_received_total",
        "Total distinct gossip messages received"
    ).expect("metric creation failed");

    /// Messages dropped by the dedup cache
    pub static ref GOSSIP_DUPLICATES_DROPPED: Counter = Counter::new(
        "bn_gossip_duplicates_dropped_total",
        "Total gossip messages dropped as duplicates"
    ).expect("metric creation failed");

    /// Relayed copies sent
    pub static ref GOSSIP_MESSAGES_FORWARDED: Counter = Counter::new(
        "bn_gossip_messages_forwarded_total",
        "Total gossip messages forwarded to peers"
    ).expect("metric creation failed");

    /// Sends that failed (peer skipped for the round)
    pub static ref GOSSIP_SEND_FAILURES: Counter = Counter::new(
        "bn_gossip_send_failures_total",
        "Total gossip sends that failed"
    ).expect("metric creation failed");

    /// Undecodable datagrams
    pub static ref GOSSIP_DECODE_FAILURES: Counter = Counter::new(
        "bn_gossip_decode_failures_total",
        "Total inbound datagrams that failed to decode"
    ).expect("metric creation failed");

    /// Known peers by state
    pub static ref GOSSIP_PEERS: GaugeVec = GaugeVec::new(
        Opts::new("bn_gossip_peers", "Known peers by membership state"),
        &["state"]  // state: alive/suspect/dead
    ).expect("metric creation failed");

    /// Local incarnation number
    pub static ref GOSSIP_LOCAL_INCARNATION: Gauge = Gauge::new(
        "bn_gossip_local_incarnation",
        "Incarnation number of the local node"
    ).expect("metric creation failed");

    // =========================================================================
    // BLS METRICS
    // =========================================================================

    /// Signatures produced by this node
    pub static ref SIGNATURES_PRODUCED: Counter = Counter::new(
        "bn_bls_signatures_produced_total",
        "Total BLS signatures produced"
    ).expect("metric creation failed");

    /// Aggregation attempts by outcome
    pub static ref AGGREGATIONS: CounterVec = CounterVec::new(
        Opts::new("bn_bls_aggregations_total", "Total aggregation requests"),
        &["outcome"]  // outcome: ok/failed
    ).expect("metric creation failed");

    /// Points rejected by decoding or subgroup checks
    pub static ref INVALID_POINTS_REJECTED: Counter = Counter::new(
        "bn_bls_invalid_points_total",
        "Total curve points rejected during aggregation"
    ).expect("metric creation failed");

    /// Signers per aggregation
    pub static ref AGGREGATION_SIZE: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "bn_bls_aggregation_signers",
            "Number of shares per aggregation"
        ).buckets(vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0, 256.0])
    ).expect("metric creation failed");

    /// Aggregation duration
    pub static ref AGGREGATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "bn_bls_aggregation_duration_seconds",
            "Time spent aggregating shares"
        ).buckets(exponential_buckets(0.0001, 2.0, 15).expect("valid bucket layout"))
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Subsystem errors by type
    pub static ref SUBSYSTEM_ERRORS: CounterVec = CounterVec::new(
        Opts::new("bn_subsystem_errors_total", "Errors by subsystem and type"),
        &["subsystem", "error_type"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already-registered collectors are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Gossip
        Box::new(GOSSIP_MESSAGES_RECEIVED.clone()),
        Box::new(GOSSIP_DUPLICATES_DROPPED.clone()),
        Box::new(GOSSIP_MESSAGES_FORWARDED.clone()),
        Box::new(GOSSIP_SEND_FAILURES.clone()),
        Box::new(GOSSIP_DECODE_FAILURES.clone()),
        Box::new(GOSSIP_PEERS.clone()),
        Box::new(GOSSIP_LOCAL_INCARNATION.clone()),
        // BLS
        Box::new(SIGNATURES_PRODUCED.clone()),
        Box::new(AGGREGATIONS.clone()),
        Box::new(INVALID_POINTS_REJECTED.clone()),
        Box::new(AGGREGATION_SIZE.clone()),
        Box::new(AGGREGATION_DURATION.clone()),
        // Errors
        Box::new(SUBSYSTEM_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all registered metrics in the Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Set the per-state peer gauges in one call.
pub fn set_peer_counts(alive: usize, suspect: usize, dead: usize) {
    GOSSIP_PEERS.with_label_values(&["alive"]).set(alive as f64);
    GOSSIP_PEERS.with_label_values(&["suspect"]).set(suspect as f64);
    GOSSIP_PEERS.with_label_values(&["dead"]).set(dead as f64);
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
