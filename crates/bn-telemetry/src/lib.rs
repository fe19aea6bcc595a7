//! # BN Telemetry
//!
//! Structured logging and Prometheus metrics for the BLS aggregation node.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bn_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // Logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BN_SERVICE_NAME` | `bls-node` | Service name in log lines |
//! | `BN_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `BN_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `BN_JSON_LOGS` | `false` (`true` in containers) | JSON log format |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};
pub use metrics::{
    gather_metrics, register_metrics, set_peer_counts, HistogramTimer, AGGREGATIONS,
    AGGREGATION_DURATION, AGGREGATION_SIZE, GOSSIP_DECODE_FAILURES, GOSSIP_DUPLICATES_DROPPED,
    GOSSIP_LOCAL_INCARNATION, GOSSIP_MESSAGES_FORWARDED, GOSSIP_MESSAGES_RECEIVED, GOSSIP_PEERS,
    GOSSIP_SEND_FAILURES, INVALID_POINTS_REJECTED, SIGNATURES_PRODUCED, SUBSYSTEM_ERRORS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install the log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Convenience macro for recording a metric with a value.
#[macro_export]
macro_rules! metric_observe {
    ($metric:expr, $value:expr) => {
        $metric.observe($value)
    };
    ($metric:expr, $labels:expr, $value:expr) => {
        $metric.with_label_values($labels).observe($value)
    };
}
