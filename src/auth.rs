//! Session credentials, login/signup payloads, and the auth endpoints.

pub mod credentials;
pub mod forms;
pub mod secret;

pub use credentials::*;
pub use forms::*;
pub use secret::*;

// self
use crate::{
	_prelude::*,
	gateway::SessionGateway,
	http::{ApiRequest, ApiTransport},
	obs::{self, CallKind, CallOutcome, CallSpan, Endpoint},
};

/// Credential issuance endpoint.
pub const LOGIN_PATH: &str = "users/login/";
/// Account registration endpoint.
pub const REGISTER_PATH: &str = "users/register/";
/// Access-token refresh endpoint.
pub const REFRESH_PATH: &str = "users/token/refresh/";

#[derive(Deserialize)]
struct LoginResponse {
	#[serde(default)]
	token: Option<Secret>,
	#[serde(default)]
	access: Option<Secret>,
	#[serde(default)]
	refresh: Option<Secret>,
}
impl LoginResponse {
	fn into_credentials(self) -> Result<Credentials> {
		let access = self
			.token
			.into_iter()
			.chain(self.access)
			.find(|secret| !secret.is_blank())
			.ok_or(Error::NoTokenReceived)?;
		let refresh = self.refresh.filter(|secret| !secret.is_blank());

		Ok(Credentials::new(access, refresh))
	}
}

impl<T> SessionGateway<T>
where
	T: ?Sized + ApiTransport,
{
	/// Exchanges username/password for a token pair and stores it.
	///
	/// The access token is read from `token` or `access`; the refresh token from `refresh`.
	pub async fn login(&self, form: &LoginForm) -> Result<Credentials> {
		const KIND: CallKind = CallKind::Login;

		form.validate()?;

		let span = CallSpan::new(KIND, "login");

		obs::record_call_outcome(KIND, Endpoint::Users, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = ApiRequest::post_json(LOGIN_PATH, form)?.anonymous();
				let credentials = self
					.send_json::<LoginResponse>(request)
					.await?
					.into_credentials()?;

				self.store.save(credentials.clone()).await?;
				self.begin_session();

				Ok(credentials)
			})
			.await;

		obs::record_call_outcome(KIND, Endpoint::Users, CallOutcome::of(&result));

		result
	}

	/// Registers a new account. The session is left untouched; callers log in afterwards.
	pub async fn register(&self, form: &SignupForm) -> Result<serde_json::Value> {
		const KIND: CallKind = CallKind::Register;

		form.validate()?;

		let span = CallSpan::new(KIND, "register");

		obs::record_call_outcome(KIND, Endpoint::Users, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = ApiRequest::post_json(REGISTER_PATH, form)?.anonymous();
				let response = self.send(request).await?.error_for_status()?;

				if response.body.is_empty() {
					Ok(serde_json::Value::Null)
				} else {
					response.decode()
				}
			})
			.await;

		obs::record_call_outcome(KIND, Endpoint::Users, CallOutcome::of(&result));

		result
	}

	/// Returns `true` while an access token is stored.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.session_state().await? == SessionState::Authenticated)
	}

	/// Removes both stored tokens. The session listener is not notified.
	pub async fn logout(&self) -> Result<()> {
		Ok(self.store.clear().await?)
	}
}
