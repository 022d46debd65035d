//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// std
use std::time::Instant;
// self
use crate::{
	_prelude::*,
	store::{ScanDeleteReport, SessionKey, SessionStore, StoreError, StoreFuture, positive_ttl},
};

type StoreMap = Arc<RwLock<HashMap<String, Instant>>>;

/// Process-local store keeping each key's expiry instant.
///
/// Expired keys behave as absent. Every write and prefix deletion sweeps them out, so the map
/// stays bounded by the number of live sessions plus whatever expired since the last write.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns `true` if `key` exists and has not expired.
	pub fn contains(&self, key: &str) -> bool {
		self.ttl(key).is_some()
	}

	/// Remaining lifetime of `key`, if it is live.
	pub fn ttl(&self, key: &str) -> Option<std::time::Duration> {
		let now = Instant::now();

		self.0.read().get(key).and_then(|expires_at| expires_at.checked_duration_since(now))
	}

	/// Number of live keys.
	pub fn len(&self) -> usize {
		let now = Instant::now();

		self.0.read().values().filter(|expires_at| **expires_at > now).count()
	}

	/// Returns `true` when no live keys remain.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn set_now(map: &StoreMap, key: String, ttl: Duration) -> Result<(), StoreError> {
		let ttl = positive_ttl(ttl)?;
		let now = Instant::now();
		let expires_at = now
			.checked_add(ttl)
			.ok_or_else(|| StoreError::backend("TTL overflows the monotonic clock"))?;
		let mut guard = map.write();

		guard.retain(|_, expiry| *expiry > now);
		guard.insert(key, expires_at);

		Ok(())
	}

	fn delete_now(map: &StoreMap, key: &str) -> u64 {
		let now = Instant::now();

		match map.write().remove(key) {
			Some(expires_at) if expires_at > now => 1,
			_ => 0,
		}
	}

	fn scan_delete_now(map: &StoreMap, prefix: &str) -> ScanDeleteReport {
		let now = Instant::now();
		let mut guard = map.write();

		guard.retain(|_, expires_at| *expires_at > now);

		let matched =
			guard.keys().filter(|key| key.starts_with(prefix)).cloned().collect::<Vec<_>>();

		matched.into_iter().fold(ScanDeleteReport::default(), |report, key| {
			report.record(Ok(guard.remove(&key).map_or(0, |_| 1)))
		})
	}
}
impl SessionStore for MemoryStore {
	fn set<'a>(&'a self, key: &'a SessionKey, ttl: Duration) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = key.as_str().to_owned();

		Box::pin(async move { Self::set_now(&map, key, ttl) })
	}

	fn delete<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, u64> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::delete_now(&map, key.as_str())) })
	}

	fn scan_delete<'a>(&'a self, prefix: &'a str) -> StoreFuture<'a, ScanDeleteReport> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::scan_delete_now(&map, prefix)) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::{TokenId, UserId};

	#[tokio::test]
	async fn writes_sweep_expired_entries() {
		let store = MemoryStore::default();
		let user = UserId::new("u1").expect("User fixture should be valid.");

		for _ in 0..3 {
			store
				.set(&SessionKey::new(&user, &TokenId::generate()), Duration::milliseconds(10))
				.await
				.expect("Setting a record should succeed.");
		}

		assert_eq!(store.0.read().len(), 3);

		tokio::time::sleep(std::time::Duration::from_millis(30)).await;
		store
			.set(&SessionKey::new(&user, &TokenId::generate()), Duration::minutes(5))
			.await
			.expect("Setting a record should succeed.");

		assert_eq!(store.0.read().len(), 1, "Expired entries must not accumulate.");
	}
}
