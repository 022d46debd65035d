// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for issuance and rotation.
#[derive(Debug, Default)]
pub struct RotationMetrics {
	issued: AtomicU64,
	rotated: AtomicU64,
	rejected: AtomicU64,
	stale_delete_failures: AtomicU64,
}
impl RotationMetrics {
	/// Returns the number of token pairs handed out.
	pub fn issued(&self) -> u64 {
		self.issued.load(Ordering::Relaxed)
	}

	/// Returns the number of issuances that retired a previous refresh token.
	pub fn rotated(&self) -> u64 {
		self.rotated.load(Ordering::Relaxed)
	}

	/// Returns the number of rotations refused because the previous record was already gone.
	pub fn rejected(&self) -> u64 {
		self.rejected.load(Ordering::Relaxed)
	}

	/// Returns the number of rotations whose previous record could not be deleted.
	pub fn stale_delete_failures(&self) -> u64 {
		self.stale_delete_failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_issued(&self) {
		self.issued.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rotated(&self) {
		self.rotated.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rejected(&self) {
		self.rejected.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_stale_delete_failure(&self) {
		self.stale_delete_failures.fetch_add(1, Ordering::Relaxed);
	}
}
