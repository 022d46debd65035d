//! Bounded-execution request middleware.
//!
//! [`Timeout::run`] runs a handler on its own task against a [`TimeoutWriter`] and races it
//! against a deadline. Exactly one response reaches the sink: the handler's buffered response,
//! an internal error if the handler panicked, or the timeout error. A timed-out handler keeps
//! running detached; its later writes are discarded.

mod writer;

pub use writer::*;

// std
use std::time::Instant;
// crates.io
use http::StatusCode;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ErrorBody},
	obs::{self, OpOutcome, OpSpan, Operation},
};

/// Request handler supervised by [`Timeout`].
///
/// Implemented for every `Fn(Req, TimeoutWriter) -> impl Future<Output = ()>` closure.
pub trait Handler<Req>
where
	Self: 'static + Send + Sync,
{
	/// Future driving the request to completion.
	type Future: 'static + Send + Future<Output = ()>;

	/// Handles `req`, writing the response through `writer`.
	fn call(&self, req: Req, writer: TimeoutWriter) -> Self::Future;
}
impl<Req, F, Fut> Handler<Req> for F
where
	F: 'static + Send + Sync + Fn(Req, TimeoutWriter) -> Fut,
	Fut: 'static + Send + Future<Output = ()>,
{
	type Future = Fut;

	fn call(&self, req: Req, writer: TimeoutWriter) -> Self::Future {
		self(req, writer)
	}
}

/// How a supervised request ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
	/// The handler finished in time; its response was forwarded.
	Completed {
		/// Status forwarded to the sink.
		status: StatusCode,
	},
	/// The deadline fired first; the timeout error was written.
	TimedOut,
	/// The handler panicked or was cancelled; an internal error was written.
	Failed,
}

/// Deadline middleware.
#[derive(Clone, Debug)]
pub struct Timeout {
	duration: std::time::Duration,
	timeout_error: ErrorBody,
}
impl Timeout {
	/// Creates a middleware answering with `SERVICE_UNAVAILABLE` after `duration`.
	pub fn new(duration: std::time::Duration) -> Result<Self, ConfigError> {
		if duration.is_zero() {
			return Err(ConfigError::ZeroTimeout);
		}

		Ok(Self { duration, timeout_error: Error::ServiceUnavailable.body() })
	}

	/// Replaces the error written when the deadline fires.
	pub fn with_error(mut self, error: &Error) -> Self {
		self.timeout_error = error.body();

		self
	}

	/// Configured deadline.
	pub fn duration(&self) -> std::time::Duration {
		self.duration
	}

	/// Runs `handler` for `req`, writing exactly one response into `sink`.
	pub async fn run<Req, H, W>(&self, req: Req, handler: Arc<H>, sink: &mut W) -> RequestOutcome
	where
		Req: 'static + Send,
		H: Handler<Req>,
		W: ?Sized + ResponseWriter,
	{
		obs::record_op_outcome(Operation::Request, OpOutcome::Attempt);

		let started = Instant::now();
		let span = OpSpan::new(Operation::Request, "timeout");
		let writer = TimeoutWriter::default();
		let task_writer = writer.clone();
		let mut task =
			tokio::spawn(span.instrument(async move { handler.call(req, task_writer).await }));

		match tokio::time::timeout(self.duration, &mut task).await {
			Ok(Ok(())) => {
				let status = writer.flush_into(sink);

				obs::record_op_finished(Operation::Request, Ok(()), started.elapsed());

				RequestOutcome::Completed { status }
			},
			Ok(Err(e)) => {
				writer.time_out();

				if e.is_panic() {
					tracing::error!(error = %e, "Request handler panicked.");
				} else {
					tracing::warn!(error = %e, "Request handler was cancelled.");
				}

				let failure = Error::internal("request handler did not complete");

				write_error_body(sink, &failure.body());
				obs::record_op_finished(
					Operation::Request,
					Err(failure.kind()),
					started.elapsed(),
				);

				RequestOutcome::Failed
			},
			Err(_) => {
				writer.time_out();
				tracing::warn!(
					timeout_ms = self.duration.as_millis() as u64,
					"Request exceeded its deadline."
				);
				write_error_body(sink, &self.timeout_error);
				obs::record_op_outcome(Operation::Request, OpOutcome::Timeout);

				RequestOutcome::TimedOut
			},
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use http::Response;
	// self
	use super::*;

	#[test]
	fn zero_timeout_is_rejected() {
		assert!(matches!(Timeout::new(std::time::Duration::ZERO), Err(ConfigError::ZeroTimeout)));
		assert_eq!(
			Timeout::new(std::time::Duration::from_secs(5))
				.expect("Timeout should be valid.")
				.duration(),
			std::time::Duration::from_secs(5)
		);
	}

	#[tokio::test]
	async fn custom_timeout_error_is_written() {
		let timeout = Timeout::new(std::time::Duration::from_millis(10))
			.expect("Timeout should be valid.")
			.with_error(&Error::internal("deadline"));
		let handler = Arc::new(|_: (), _: TimeoutWriter| async {
			tokio::time::sleep(std::time::Duration::from_millis(200)).await;
		});
		let mut response = Response::new(Vec::new());

		assert_eq!(timeout.run((), handler, &mut response).await, RequestOutcome::TimedOut);
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
