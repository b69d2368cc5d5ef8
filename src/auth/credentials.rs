//! The stored credential pair and the session state derived from it.

// self
use crate::{_prelude::*, auth::Secret};

/// Access and refresh tokens persisted between runs.
///
/// The access token is created at login and replaced by every successful refresh; the refresh
/// token is created at login and only rotates when the backend returns a new one. Both are
/// removed on logout or when a refresh fails.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	/// Short-lived bearer credential, stored under the `token` key.
	#[serde(rename = "token", default, skip_serializing_if = "Option::is_none")]
	pub access_token: Option<Secret>,
	/// Longer-lived credential exchanged for new access tokens.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<Secret>,
}
impl Credentials {
	/// Creates a pair as issued by the login endpoint.
	pub fn new(access_token: impl Into<Secret>, refresh_token: Option<Secret>) -> Self {
		Self { access_token: Some(access_token.into()), refresh_token }
	}

	/// Returns `true` when neither token is stored.
	pub fn is_empty(&self) -> bool {
		self.access_token.is_none() && self.refresh_token.is_none()
	}

	/// Derives the session state from the stored access token.
	pub fn state(&self) -> SessionState {
		if self.access_token.is_some() {
			SessionState::Authenticated
		} else {
			SessionState::Unauthenticated
		}
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("access_token_set", &self.access_token.is_some())
			.field("refresh_token_set", &self.refresh_token.is_some())
			.finish()
	}
}

/// Whether the application should show authenticated screens or the login route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
	/// An access token is stored.
	Authenticated,
	/// No access token is stored; the login route applies.
	Unauthenticated,
}
