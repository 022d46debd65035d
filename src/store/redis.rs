//! Redis-backed [`SessionStore`] over a multiplexed, auto-reconnecting connection.

// crates.io
use redis::{Client, RedisError, aio::ConnectionManager};
// self
use crate::{
	_prelude::*,
	store::{ScanDeleteReport, SessionKey, SessionStore, StoreError, StoreFuture, positive_ttl},
};

const SCAN_BATCH: usize = 100;

/// Session store that keeps liveness records as Redis keys with a `PX` expiry.
#[derive(Clone)]
pub struct RedisStore {
	connection: ConnectionManager,
}
impl RedisStore {
	/// Connects to the Redis server at `url` (for example `redis://127.0.0.1:6379/0`).
	pub async fn connect(url: &str) -> Result<Self, StoreError> {
		let client = Client::open(url).map_err(backend_error)?;
		let connection = ConnectionManager::new(client).await.map_err(backend_error)?;

		Ok(Self { connection })
	}

	async fn set_now(&self, key: &SessionKey, ttl: Duration) -> Result<(), StoreError> {
		let millis = u64::try_from(positive_ttl(ttl)?.as_millis())
			.map_err(|_| StoreError::backend("TTL exceeds the Redis expiry range"))?;
		let mut connection = self.connection.clone();
		let _: () = redis::cmd("SET")
			.arg(key.as_str())
			.arg(1)
			.arg("PX")
			.arg(millis.max(1))
			.query_async(&mut connection)
			.await
			.map_err(backend_error)?;

		Ok(())
	}

	async fn delete_now(&self, key: &str) -> Result<u64, StoreError> {
		let mut connection = self.connection.clone();
		let removed: u64 =
			redis::cmd("DEL").arg(key).query_async(&mut connection).await.map_err(backend_error)?;

		Ok(removed)
	}

	async fn scan_now(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
		let mut connection = self.connection.clone();
		let pattern = format!("{prefix}*");
		let mut cursor = 0_u64;
		let mut keys = Vec::new();

		loop {
			let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
				.arg(cursor)
				.arg("MATCH")
				.arg(&pattern)
				.arg("COUNT")
				.arg(SCAN_BATCH)
				.query_async(&mut connection)
				.await
				.map_err(backend_error)?;

			keys.extend(batch);

			if next == 0 {
				break;
			}

			cursor = next;
		}

		// SCAN may return a key more than once across iterations.
		keys.sort_unstable();
		keys.dedup();

		Ok(keys)
	}

	async fn scan_delete_now(&self, prefix: &str) -> Result<ScanDeleteReport, StoreError> {
		let keys = self.scan_now(prefix).await?;
		let mut report = ScanDeleteReport::default();

		for key in keys {
			let outcome = self.delete_now(&key).await;

			if let Err(e) = &outcome {
				tracing::warn!(key = %key, error = %e, "Failed to delete session record during scan.");
			}

			report = report.record(outcome);
		}

		Ok(report)
	}
}
impl SessionStore for RedisStore {
	fn set<'a>(&'a self, key: &'a SessionKey, ttl: Duration) -> StoreFuture<'a, ()> {
		Box::pin(self.set_now(key, ttl))
	}

	fn delete<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, u64> {
		Box::pin(self.delete_now(key.as_str()))
	}

	fn scan_delete<'a>(&'a self, prefix: &'a str) -> StoreFuture<'a, ScanDeleteReport> {
		Box::pin(self.scan_delete_now(prefix))
	}
}
impl Debug for RedisStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RedisStore(..)")
	}
}

fn backend_error(e: RedisError) -> StoreError {
	StoreError::backend(e.to_string())
}
