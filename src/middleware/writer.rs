//! Response sinks and the buffering proxy handed to supervised handlers.

// crates.io
use http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode, header::CONTENT_TYPE};
// self
use crate::{_prelude::*, error::ErrorBody};

/// Minimal response surface the middleware writes into.
///
/// Transports adapt their own response type; [`http::Response<Vec<u8>>`] works out of the box.
pub trait ResponseWriter
where
	Self: Send,
{
	/// Mutable access to the outgoing headers.
	fn headers_mut(&mut self) -> &mut HeaderMap;

	/// Sets the response status.
	fn write_status(&mut self, status: StatusCode);

	/// Appends bytes to the response body.
	fn write_body(&mut self, body: &[u8]);
}
impl ResponseWriter for Response<Vec<u8>> {
	fn headers_mut(&mut self) -> &mut HeaderMap {
		Response::headers_mut(self)
	}

	fn write_status(&mut self, status: StatusCode) {
		*self.status_mut() = status;
	}

	fn write_body(&mut self, body: &[u8]) {
		self.body_mut().extend_from_slice(body);
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum WriterState {
	#[default]
	Open,
	Flushed,
	TimedOut,
}

#[derive(Debug, Default)]
struct Buffered {
	headers: HeaderMap,
	status: Option<StatusCode>,
	body: Vec<u8>,
	state: WriterState,
}
impl Buffered {
	fn accepts_headers(&self) -> bool {
		self.state == WriterState::Open && self.status.is_none()
	}
}

/// Buffering proxy writer shared between a handler task and the middleware.
///
/// Nothing reaches the real response until the middleware flushes it. The status can be set
/// once; header changes after it are ignored. Once the request has timed out (or the buffer was
/// flushed) every write is a no-op.
#[derive(Clone, Debug, Default)]
pub struct TimeoutWriter(Arc<Mutex<Buffered>>);
impl TimeoutWriter {
	/// Sets a header, replacing previous values. Returns `false` if the write was ignored.
	pub fn insert_header(&self, name: HeaderName, value: HeaderValue) -> bool {
		let mut buffered = self.0.lock();

		if !buffered.accepts_headers() {
			return false;
		}

		buffered.headers.insert(name, value);

		true
	}

	/// Adds a header value without replacing existing ones.
	pub fn append_header(&self, name: HeaderName, value: HeaderValue) -> bool {
		let mut buffered = self.0.lock();

		if !buffered.accepts_headers() {
			return false;
		}

		buffered.headers.append(name, value);

		true
	}

	/// Records the response status; only the first call wins.
	pub fn write_header(&self, status: StatusCode) -> bool {
		let mut buffered = self.0.lock();

		if buffered.state != WriterState::Open || buffered.status.is_some() {
			return false;
		}

		buffered.status = Some(status);

		true
	}

	/// Buffers body bytes, returning how many were accepted.
	pub fn write(&self, bytes: &[u8]) -> usize {
		let mut buffered = self.0.lock();

		if buffered.state != WriterState::Open {
			return 0;
		}

		buffered.body.extend_from_slice(bytes);

		bytes.len()
	}

	/// Writes `value` as a JSON response with `status`.
	///
	/// Returns `Ok(false)` when the response can no longer be written.
	pub fn json<T>(&self, status: StatusCode, value: &T) -> Result<bool>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(value)
			.map_err(|e| Error::internal(format!("failed to encode response body: {e}")))?;

		self.insert_header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

		if !self.write_header(status) {
			return Ok(false);
		}

		Ok(self.write(&body) == body.len())
	}

	/// Writes a failure as the `{"error": {...}}` envelope.
	pub fn error(&self, error: &Error) -> bool {
		let body = error.body();

		self.insert_header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

		self.write_header(body.kind.status()) && self.write(&body.to_json()) > 0
	}

	/// Returns `true` once the middleware has answered the request with its timeout response.
	pub fn is_timed_out(&self) -> bool {
		self.0.lock().state == WriterState::TimedOut
	}

	pub(crate) fn time_out(&self) {
		self.0.lock().state = WriterState::TimedOut;
	}

	/// Copies the buffered response into `sink` and closes the proxy.
	pub(crate) fn flush_into<W>(&self, sink: &mut W) -> StatusCode
	where
		W: ?Sized + ResponseWriter,
	{
		let (headers, status, body) = {
			let mut buffered = self.0.lock();

			buffered.state = WriterState::Flushed;

			(
				std::mem::take(&mut buffered.headers),
				buffered.status.unwrap_or(StatusCode::OK),
				std::mem::take(&mut buffered.body),
			)
		};

		sink.headers_mut().extend(headers);
		sink.write_status(status);
		sink.write_body(&body);

		status
	}
}

const JSON_CONTENT_TYPE: &str = "application/json";

/// Writes an error envelope straight into `sink`.
pub(crate) fn write_error_body<W>(sink: &mut W, body: &ErrorBody)
where
	W: ?Sized + ResponseWriter,
{
	sink.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
	sink.write_status(body.kind.status());
	sink.write_body(&body.to_json());
}
