// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-gateway counters for the 401 recovery path.
///
/// Unlike the process-wide `metrics` counters these belong to one [`SessionGateway`] and are
/// always on, so tests and health pages can read them without installing a recorder.
///
/// [`SessionGateway`]: crate::gateway::SessionGateway
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	queued: AtomicU64,
	replays: AtomicU64,
	teardowns: AtomicU64,
}
impl RefreshMetrics {
	/// Refresh calls sent to `users/token/refresh/`.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Refresh calls that stored a new access token.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Refresh calls that failed and ended the session.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Requests parked behind an in-flight refresh.
	pub fn queued(&self) -> u64 {
		self.queued.load(Ordering::Relaxed)
	}

	/// Requests re-sent once with a refreshed bearer.
	pub fn replays(&self) -> u64 {
		self.replays.load(Ordering::Relaxed)
	}

	/// Sessions torn down: storage cleared and the listener told. At most one per generation.
	pub fn teardowns(&self) -> u64 {
		self.teardowns.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_queued(&self) {
		self.queued.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_replay(&self) {
		self.replays.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_teardown(&self) {
		self.teardowns.fetch_add(1, Ordering::Relaxed);
	}
}
