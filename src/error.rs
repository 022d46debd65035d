//! Crate-level error types and the stable, transport-facing error taxonomy.

// crates.io
use http::StatusCode;
// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

const INTERNAL_MESSAGE: &str = "Internal server error.";
const UNAVAILABLE_MESSAGE: &str = "Service unavailable or timed out.";

/// Canonical error exposed by public APIs.
///
/// Variants carry enough context for logs; [`Error::body`] is the only representation that
/// should cross the transport boundary.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session-store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// User directory failure that does not map onto a domain outcome.
	#[error("{0}")]
	Directory(#[source] crate::directory::DirectoryError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Password hashing backend failure.
	#[error(transparent)]
	Password(#[from] crate::password::PasswordError),
	/// Token signing failed.
	#[error("Token could not be signed.")]
	Signing {
		/// Underlying signer failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},

	/// Credential is invalid, expired, revoked, or does not match.
	#[error("Authorization failed: {reason}.")]
	Authorization {
		/// Caller-facing reason.
		reason: String,
	},
	/// Input failed validation.
	#[error("Bad request: {reason}.")]
	BadRequest {
		/// Caller-facing reason.
		reason: String,
	},
	/// Resource already exists.
	#[error("Resource {resource} with value {value} already exists.")]
	Conflict {
		/// Resource label.
		resource: &'static str,
		/// Conflicting value.
		value: String,
	},
	/// Resource does not exist.
	#[error("Resource {resource} with value {value} not found.")]
	NotFound {
		/// Resource label.
		resource: &'static str,
		/// Missing value.
		value: String,
	},
	/// Unexpected state; details are for logs only.
	#[error("Internal error: {message}.")]
	Internal {
		/// Log-only description.
		message: String,
	},
	/// Request did not finish before its deadline.
	#[error("Service unavailable or timed out.")]
	ServiceUnavailable,
}
impl Error {
	/// Builds an [`Error::Authorization`] with the provided reason.
	pub fn authorization(reason: impl Into<String>) -> Self {
		Self::Authorization { reason: reason.into() }
	}

	/// Builds an [`Error::BadRequest`] with the provided reason.
	pub fn bad_request(reason: impl Into<String>) -> Self {
		Self::BadRequest { reason: reason.into() }
	}

	/// Builds an [`Error::Internal`] with a log-only message.
	pub fn internal(message: impl Into<String>) -> Self {
		Self::Internal { message: message.into() }
	}

	/// Collapses the error into its stable kind.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Authorization { .. } => ErrorKind::Authorization,
			Self::BadRequest { .. } => ErrorKind::BadRequest,
			Self::Conflict { .. } => ErrorKind::Conflict,
			Self::NotFound { .. } => ErrorKind::NotFound,
			Self::ServiceUnavailable => ErrorKind::ServiceUnavailable,
			Self::Storage(_)
			| Self::Directory(_)
			| Self::Config(_)
			| Self::Password(_)
			| Self::Signing { .. }
			| Self::Internal { .. } => ErrorKind::Internal,
		}
	}

	/// Returns the HTTP status matching [`Error::kind`].
	pub fn status(&self) -> StatusCode {
		self.kind().status()
	}

	/// Renders the caller-facing body. Internal details never leave the process.
	pub fn body(&self) -> ErrorBody {
		let message = match self.kind() {
			ErrorKind::Internal => INTERNAL_MESSAGE.to_owned(),
			ErrorKind::ServiceUnavailable => UNAVAILABLE_MESSAGE.to_owned(),
			_ => self.to_string(),
		};

		ErrorBody { kind: self.kind(), message }
	}
}

/// Stable error classification shared by every public failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
	/// Bad, expired, or revoked credential; bad signin credentials.
	#[serde(rename = "AUTHORIZATION")]
	Authorization,
	/// Malformed input.
	#[serde(rename = "BADREQUEST")]
	BadRequest,
	/// Duplicate resource.
	#[serde(rename = "CONFLICT")]
	Conflict,
	/// Unknown resource.
	#[serde(rename = "NOTFOUND")]
	NotFound,
	/// Signing, store, or unexpected failure.
	#[serde(rename = "INTERNAL")]
	Internal,
	/// Deadline exceeded.
	#[serde(rename = "SERVICE_UNAVAILABLE")]
	ServiceUnavailable,
}
impl ErrorKind {
	/// Maps the kind onto its HTTP status.
	pub const fn status(self) -> StatusCode {
		match self {
			Self::Authorization => StatusCode::UNAUTHORIZED,
			Self::BadRequest => StatusCode::BAD_REQUEST,
			Self::Conflict => StatusCode::CONFLICT,
			Self::NotFound => StatusCode::NOT_FOUND,
			Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
			Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Authorization => "AUTHORIZATION",
			Self::BadRequest => "BADREQUEST",
			Self::Conflict => "CONFLICT",
			Self::NotFound => "NOTFOUND",
			Self::Internal => "INTERNAL",
			Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Caller-facing error payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
	/// Stable error kind.
	#[serde(rename = "type")]
	pub kind: ErrorKind,
	/// Public message.
	pub message: String,
}
impl ErrorBody {
	/// Serializes the body wrapped as `{"error": {...}}`.
	pub fn to_json(&self) -> Vec<u8> {
		#[derive(Serialize)]
		struct Envelope<'a> {
			error: &'a ErrorBody,
		}

		// Infallible for string fields and unit variants.
		serde_json::to_vec(&Envelope { error: self }).unwrap_or_default()
	}
}

/// Configuration and key-material failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A token lifetime is shorter than one second.
	#[error("The {token} token TTL must be at least one second.")]
	TtlTooShort {
		/// Token label.
		token: &'static str,
	},
	/// The refresh secret is empty.
	#[error("Refresh token secret cannot be empty.")]
	EmptyRefreshSecret,
	/// A PEM key could not be parsed.
	#[error("The {key} key is not a valid RSA PEM.")]
	InvalidKey {
		/// Key label.
		key: &'static str,
		/// Underlying parser failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// A key file could not be read.
	#[error("Failed to read {path}.")]
	KeyFile {
		/// File path that failed.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Request timeout is zero.
	#[error("Request timeout must be positive.")]
	ZeroTimeout,
}
