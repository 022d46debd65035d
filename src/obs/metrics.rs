//! Operation counters and latency histograms, emitted only with the `metrics` feature.

// self
use crate::{
	error::ErrorKind,
	obs::{OpOutcome, Operation},
};

const OP_TOTAL: &str = "account_tokens_op_total";
const OP_DURATION: &str = "account_tokens_op_duration_seconds";

/// Increments the per-operation counter for `outcome`.
pub fn record_op_outcome(op: Operation, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(OP_TOTAL, "op" => op.as_str(), "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (OP_TOTAL, op, outcome);
	}
}

/// Records the final outcome of `op` and how long it ran.
///
/// Failures are additionally counted under `account_tokens_op_failures_total` with their
/// error kind, so authorization rejections can be told apart from internal faults.
pub fn record_op_finished(
	op: Operation,
	outcome: Result<(), ErrorKind>,
	elapsed: std::time::Duration,
) {
	let label = match outcome {
		Ok(()) => OpOutcome::Success,
		Err(_) => OpOutcome::Failure,
	};

	record_op_outcome(op, label);

	#[cfg(feature = "metrics")]
	{
		if let Err(kind) = outcome {
			metrics::counter!(
				"account_tokens_op_failures_total",
				"op" => op.as_str(),
				"kind" => kind.as_str()
			)
			.increment(1);
		}

		metrics::histogram!(OP_DURATION, "op" => op.as_str(), "outcome" => label.as_str())
			.record(elapsed.as_secs_f64());
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (OP_DURATION, elapsed);
	}
}
