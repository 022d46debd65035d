//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};
// self
use account_tokens::{
	auth::{User, UserId},
	config::TokenConfig,
	signer::TokenKeys,
	store::{MemoryStore, ScanDeleteReport, SessionKey, SessionStore, StoreError, StoreFuture},
	tokens::TokenService,
};

pub const PRIVATE_PEM: &[u8] = include_bytes!("../fixtures/id_rsa.pem");
pub const PUBLIC_PEM: &[u8] = include_bytes!("../fixtures/id_rsa.pub.pem");
pub const REFRESH_SECRET: &[u8] = b"integration-refresh-secret";

pub fn keys() -> TokenKeys {
	TokenKeys::from_pem(PRIVATE_PEM, PUBLIC_PEM, REFRESH_SECRET)
		.expect("Fixture key material should load.")
}

pub fn config() -> TokenConfig {
	TokenConfig::builder()
		.id_ttl_secs(900)
		.refresh_ttl_secs(259_200)
		.build()
		.expect("Fixture token config should be valid.")
}

pub fn user(id: &str, email: &str) -> User {
	User::new(UserId::new(id).expect("Fixture user id should be valid."), email)
}

pub fn memory_service() -> (TokenService<MemoryStore>, Arc<MemoryStore>) {
	let store = Arc::new(MemoryStore::default());

	(TokenService::new(store.clone(), keys(), config()), store)
}

/// Flips one character in the middle of the signature segment.
pub fn tamper_signature(token: &str) -> String {
	let (head, signature) = token.rsplit_once('.').expect("Token should have three segments.");
	let mut chars = signature.chars().collect::<Vec<_>>();
	let mid = chars.len() / 2;

	chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };

	format!("{head}.{}", chars.into_iter().collect::<String>())
}

/// Memory store with switchable failure injection.
#[derive(Debug, Default)]
pub struct FlakyStore {
	pub inner: MemoryStore,
	pub fail_set: AtomicBool,
	pub fail_delete: AtomicBool,
	pub fail_one_scanned_key: AtomicBool,
}
impl FlakyStore {
	fn injected() -> StoreError {
		StoreError::backend("injected failure")
	}
}
impl SessionStore for FlakyStore {
	fn set<'a>(&'a self, key: &'a SessionKey, ttl: time::Duration) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			if self.fail_set.load(Ordering::SeqCst) {
				return Err(Self::injected());
			}

			self.inner.set(key, ttl).await
		})
	}

	fn delete<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, u64> {
		Box::pin(async move {
			if self.fail_delete.load(Ordering::SeqCst) {
				return Err(Self::injected());
			}

			self.inner.delete(key).await
		})
	}

	fn scan_delete<'a>(&'a self, prefix: &'a str) -> StoreFuture<'a, ScanDeleteReport> {
		Box::pin(async move {
			let report = self.inner.scan_delete(prefix).await?;

			if self.fail_one_scanned_key.load(Ordering::SeqCst) {
				return Ok(report.record(Err(Self::injected())));
			}

			Ok(report)
		})
	}
}

/// Memory store that yields to the scheduler around every call so concurrent callers interleave.
#[derive(Debug, Default)]
pub struct YieldingStore {
	pub inner: MemoryStore,
}
impl SessionStore for YieldingStore {
	fn set<'a>(&'a self, key: &'a SessionKey, ttl: time::Duration) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			tokio::task::yield_now().await;

			let result = self.inner.set(key, ttl).await;

			tokio::task::yield_now().await;

			result
		})
	}

	fn delete<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, u64> {
		Box::pin(async move {
			tokio::task::yield_now().await;

			let result = self.inner.delete(key).await;

			tokio::task::yield_now().await;

			result
		})
	}

	fn scan_delete<'a>(&'a self, prefix: &'a str) -> StoreFuture<'a, ScanDeleteReport> {
		Box::pin(async move {
			tokio::task::yield_now().await;

			self.inner.scan_delete(prefix).await
		})
	}
}
