//! Thread-safe in-memory [`CredentialStore`] for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret},
	store::{self, CredentialStore, StoreFuture},
};

/// Keeps the credential pair in-process; cloning shares the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Credentials>>);
impl MemoryStore {
	/// Creates a store pre-seeded with `credentials`.
	pub fn with_credentials(credentials: Credentials) -> Self {
		Self(Arc::new(RwLock::new(credentials)))
	}

	/// Returns a copy of the current pair without going through the async contract.
	pub fn snapshot(&self) -> Credentials {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Credentials> {
		let credentials = self.snapshot();

		Box::pin(async move { Ok(credentials) })
	}

	fn save(&self, credentials: Credentials) -> StoreFuture<'_, ()> {
		*self.0.write() = credentials;

		Box::pin(async { Ok(()) })
	}

	fn replace_access(
		&self,
		access_token: Secret,
		refresh_token: Option<Secret>,
	) -> StoreFuture<'_, ()> {
		store::apply_refresh(&mut self.0.write(), access_token, refresh_token);

		Box::pin(async { Ok(()) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		*self.0.write() = Credentials::default();

		Box::pin(async { Ok(()) })
	}
}
