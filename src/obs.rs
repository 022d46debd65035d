//! Observability helpers shared by token operations and the request middleware.
//!
//! # Feature Flags
//!
//! - Spans named `account_tokens.op` carry the `op` and `stage` fields and are always emitted
//!   through `tracing`.
//! - Enable `metrics` to increment the `account_tokens_op_total` counter for every
//!   attempt/success/failure (labeled by `op` + `outcome`), count failures by error kind in
//!   `account_tokens_op_failures_total`, and record `account_tokens_op_duration_seconds`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// std
use std::time::Instant;
// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Token-pair issuance (fresh or rotating).
	IssuePair,
	/// Identity-token validation.
	ValidateIdToken,
	/// Refresh-token validation.
	ValidateRefreshToken,
	/// Bulk sign-out of every session for a user.
	Signout,
	/// Sign-out of a single session.
	SignoutOne,
	/// A request supervised by the timeout middleware.
	Request,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::IssuePair => "issue_pair",
			Operation::ValidateIdToken => "validate_id_token",
			Operation::ValidateRefreshToken => "validate_refresh_token",
			Operation::Signout => "signout",
			Operation::SignoutOne => "signout_one",
			Operation::Request => "request",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Request abandoned at its deadline.
	Timeout,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
			OpOutcome::Timeout => "timeout",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records attempt plus success/failure.
pub(crate) async fn observe<T, Fut>(op: Operation, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	record_op_outcome(op, OpOutcome::Attempt);

	let started = Instant::now();
	let result = OpSpan::new(op, stage).instrument(fut).await;

	finish(op, started, result)
}

/// Synchronous counterpart of [`observe`] for CPU-only operations.
pub(crate) fn observe_sync<T>(
	op: Operation,
	stage: &'static str,
	f: impl FnOnce() -> Result<T>,
) -> Result<T> {
	record_op_outcome(op, OpOutcome::Attempt);

	let started = Instant::now();
	let result = {
		let _span = OpSpan::new(op, stage).entered();

		f()
	};

	finish(op, started, result)
}

fn finish<T>(op: Operation, started: Instant, result: Result<T>) -> Result<T> {
	let outcome = result.as_ref().map(|_| ()).map_err(|e| {
		::tracing::debug!(
			op = op.as_str(),
			kind = e.kind().as_str(),
			error = %e,
			"Operation failed."
		);

		e.kind()
	});

	record_op_finished(op, outcome, started.elapsed());

	result
}
