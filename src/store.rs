//! Storage contracts and built-in backends for the session credential pair.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the access/refresh token pair.
///
/// The gateway reads the pair before every session request, so `load` should be cheap.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the stored pair; an empty [`Credentials`] when nothing is stored.
	fn load(&self) -> StoreFuture<'_, Credentials>;

	/// Replaces both tokens (login).
	fn save(&self, credentials: Credentials) -> StoreFuture<'_, ()>;

	/// Stores a refreshed access token, rotating the refresh token only when one is supplied.
	fn replace_access(
		&self,
		access_token: Secret,
		refresh_token: Option<Secret>,
	) -> StoreFuture<'_, ()>;

	/// Removes both tokens (logout or session end).
	///
	/// Later `load`s must return an empty pair even when this reports an error persisting
	/// the removal.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Applies a refresh result to a stored pair.
pub(crate) fn apply_refresh(
	credentials: &mut Credentials,
	access_token: Secret,
	refresh_token: Option<Secret>,
) {
	credentials.access_token = Some(access_token);

	if let Some(refresh) = refresh_token {
		credentials.refresh_token = Some(refresh);
	}
}
