use std::sync::Arc;

use bn_01_bls_engine::{
    AggregateRequest, AggregateResponse, BlsSigningApi, SignRequest, SignResponse, SigningError,
};
use bn_telemetry::{
    log_signing_event, metric_inc, metric_observe, time_histogram, AGGREGATIONS,
    AGGREGATION_DURATION, AGGREGATION_SIZE, INVALID_POINTS_REJECTED, SIGNATURES_PRODUCED,
    SUBSYSTEM_ERRORS,
};
use tracing::debug;

/// Entry point for the transport layer's `sign`, `aggregate` and `verify` calls.
///
/// Wraps any [`BlsSigningApi`] and records signing metrics; the cryptography
/// stays in the service.
pub struct SigningHandler<A: BlsSigningApi> {
    api: Arc<A>,
}

impl<A: BlsSigningApi> SigningHandler<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn sign(&self, request: &SignRequest) -> SignResponse {
        let response = self.api.handle_sign(request);
        metric_inc!(SIGNATURES_PRODUCED);
        response
    }

    pub fn aggregate(&self, request: &AggregateRequest) -> Result<AggregateResponse, SigningError> {
        let signers = request.shares.len();
        let result = {
            let _timer = time_histogram!(AGGREGATION_DURATION);
            self.api.handle_aggregate(request)
        };

        match &result {
            Ok(_) => {
                metric_inc!(AGGREGATIONS, &["ok"]);
                metric_observe!(AGGREGATION_SIZE, signers as f64);
                log_signing_event!(debug, "bls", "Aggregated signature shares", signers);
            }
            Err(e) => {
                metric_inc!(AGGREGATIONS, &["failed"]);
                record_error(e);
                log_signing_event!(debug, "bls", "Aggregation rejected", signers, error = %e);
            }
        }
        result
    }

    pub fn verify(
        &self,
        message: &[u8],
        aggregate_signature: &[u8],
        aggregate_public_key: &[u8],
    ) -> Result<bool, SigningError> {
        let result = self
            .api
            .verify(message, aggregate_signature, aggregate_public_key);
        if let Err(e) = &result {
            record_error(e);
            debug!(subsystem = "bls", error = %e, "Verification input rejected");
        }
        result
    }
}

fn record_error(error: &SigningError) {
    metric_inc!(SUBSYSTEM_ERRORS, &["bls", error_kind(error)]);
    if matches!(error, SigningError::InvalidPoint { .. }) {
        metric_inc!(INVALID_POINTS_REJECTED);
    }
}

fn error_kind(error: &SigningError) -> &'static str {
    match error {
        SigningError::Validation(_) => "validation",
        SigningError::InvalidPoint { .. } => "invalid_point",
        SigningError::EmptyInput => "empty_input",
        SigningError::MalformedPoint(_) => "malformed_point",
        SigningError::InvalidSecretKey => "invalid_secret_key",
        SigningError::VerificationFailed => "verification_failed",
    }
}
