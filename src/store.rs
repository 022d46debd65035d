//! Session-store contract for refresh-token liveness records, plus built-in backends.
//!
//! A liveness record is a TTL-bound key `"<userID>:<tokenID>"`. Its presence is what makes a
//! refresh token usable; deleting it revokes the token immediately. Backends only need three
//! operations: write-with-expiry, delete-with-count, and best-effort prefix deletion.

pub mod memory;
#[cfg(feature = "redis")] pub mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "redis")] pub use self::redis::RedisStore;

// self
use crate::{
	_prelude::*,
	auth::{TokenId, UserId},
};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for refresh-token liveness records.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Writes (or overwrites) `key` so that it expires after `ttl`.
	fn set<'a>(&'a self, key: &'a SessionKey, ttl: Duration) -> StoreFuture<'a, ()>;

	/// Deletes `key`, returning how many records were removed (`0` when it did not exist).
	fn delete<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, u64>;

	/// Deletes every key starting with `prefix`, attempting each one even after a failure.
	fn scan_delete<'a>(&'a self, prefix: &'a str) -> StoreFuture<'a, ScanDeleteReport>;
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// The requested TTL was zero or negative.
	#[error("Record TTL must be positive.")]
	InvalidTtl,
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
impl StoreError {
	/// Wraps a backend failure message.
	pub fn backend(message: impl Into<String>) -> Self {
		Self::Backend { message: message.into() }
	}
}

/// Key of a single liveness record: `"<userID>:<tokenID>"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionKey(String);
impl SessionKey {
	/// Builds the key for the provided user/session pair.
	pub fn new(user: &UserId, token: &TokenId) -> Self {
		Self(format!("{user}:{token}"))
	}

	/// Prefix shared by every record of `user`.
	///
	/// The trailing separator keeps `u1` from matching the records of `u10`.
	pub fn user_prefix(user: &UserId) -> String {
		format!("{user}:")
	}

	/// Returns the raw key string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for SessionKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Display for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Tally of a [`SessionStore::scan_delete`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanDeleteReport {
	/// Keys that matched the prefix.
	pub matched: u64,
	/// Records actually removed.
	pub deleted: u64,
	/// Per-key deletions that failed.
	pub failed: u64,
}
impl ScanDeleteReport {
	/// Folds one per-key deletion outcome into the report.
	pub fn record(mut self, outcome: Result<u64, StoreError>) -> Self {
		self.matched += 1;

		match outcome {
			Ok(removed) => self.deleted += removed,
			Err(_) => self.failed += 1,
		}

		self
	}

	/// Returns `true` when at least one deletion failed.
	pub fn has_failures(&self) -> bool {
		self.failed > 0
	}
}

/// Converts a positive [`Duration`] into a std duration, rejecting zero and negative values.
pub(crate) fn positive_ttl(ttl: Duration) -> Result<std::time::Duration, StoreError> {
	if !ttl.is_positive() {
		return Err(StoreError::InvalidTtl);
	}

	std::time::Duration::try_from(ttl).map_err(|_| StoreError::InvalidTtl)
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::{Error, ErrorKind};

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::backend("connection reset");
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert_eq!(error.kind(), ErrorKind::Internal);

		let source = StdError::source(&error)
			.expect("Crate error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn session_keys_follow_layout() {
		let user = UserId::new("u1").expect("User fixture should be valid.");
		let token = TokenId::parse("6f1c2d1e-8c43-4a5e-9a67-0d4b7e1f2a3b")
			.expect("Token fixture should be valid.");

		assert_eq!(
			SessionKey::new(&user, &token).as_str(),
			"u1:6f1c2d1e-8c43-4a5e-9a67-0d4b7e1f2a3b"
		);
		assert_eq!(SessionKey::user_prefix(&user), "u1:");
	}

	#[test]
	fn report_folds_partial_failures() {
		let report = [Ok(1), Err(StoreError::backend("timeout")), Ok(0), Ok(1)]
			.into_iter()
			.fold(ScanDeleteReport::default(), ScanDeleteReport::record);

		assert_eq!(report, ScanDeleteReport { matched: 4, deleted: 2, failed: 1 });
		assert!(report.has_failures());
	}

	#[test]
	fn positive_ttl_rejects_non_positive() {
		assert_eq!(positive_ttl(Duration::ZERO), Err(StoreError::InvalidTtl));
		assert_eq!(positive_ttl(Duration::seconds(-1)), Err(StoreError::InvalidTtl));
		assert_eq!(
			positive_ttl(Duration::milliseconds(1_500)),
			Ok(std::time::Duration::from_millis(1_500))
		);
	}
}
