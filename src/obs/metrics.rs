// self
use crate::obs::{CallKind, CallOutcome, Endpoint};

/// Records a call outcome via the global metrics recorder (when enabled).
///
/// `endpoint` is the API family the call targets, so dashboards can tell a failing billing
/// upload apart from a failing analytics export without per-path cardinality.
pub fn record_call_outcome(kind: CallKind, endpoint: Endpoint, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"erp_gateway_call_total",
			"call" => kind.as_str(),
			"endpoint" => endpoint.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, endpoint, outcome);
	}
}

/// Counts a terminal session teardown (when enabled).
pub fn record_session_teardown(endpoint: Endpoint) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("erp_gateway_session_teardown_total", "endpoint" => endpoint.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = endpoint;
	}
}
