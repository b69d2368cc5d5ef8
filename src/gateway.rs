//! The session gateway: every backend call flows through [`SessionGateway::send`].
//!
//! The gateway reads the stored access token before each session request and sends it as a
//! bearer credential. A 401 on a first attempt hands the request to the refresh coordinator
//! (see [`refresh`](self::refresh)), which guarantees at most one refresh call in flight and
//! replays each parked request exactly once with the new token. A 401 on a replayed request,
//! or a failed refresh, ends the session: both tokens are cleared and the registered
//! [`SessionListener`] is told to route the user back to login. Teardown runs once per refresh
//! generation no matter how many concurrent callers hit the terminal 401.

mod metrics;
mod refresh;

pub use metrics::RefreshMetrics;

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;
use crate::{
	_prelude::*,
	auth::{Credentials, Secret, SessionState},
	config::GatewayConfig,
	error::SessionError,
	http::{ApiRequest, ApiResponse, ApiTransport, PreparedRequest},
	obs::{self, CallKind, CallOutcome, CallSpan, Endpoint},
	store::CredentialStore,
};
use refresh::RefreshState;

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = SessionGateway<ReqwestTransport>;

/// Hook invoked once per ended session.
///
/// Front-ends implement this to force navigation to the login route. It runs after both
/// tokens have been cleared, so [`SessionGateway::session_state`] already reports
/// [`SessionState::Unauthenticated`] when it fires.
pub trait SessionListener
where
	Self: Send + Sync,
{
	/// Called with the reason the session ended.
	fn session_expired(&self, reason: &SessionError);
}

/// Authenticated entry point to the backend API.
///
/// Construct one per signed-in application and share it by reference or `Arc`; the
/// refresh flag and queue live inside the instance, so two gateways over the same store
/// would coordinate refreshes independently.
pub struct SessionGateway<T>
where
	T: ?Sized + ApiTransport,
{
	/// HTTP transport used for every outbound request.
	pub transport: Arc<T>,
	/// Persistent home of the access/refresh token pair.
	pub store: Arc<dyn CredentialStore>,
	/// Base URL and transport settings.
	pub config: GatewayConfig,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	listener: Option<Arc<dyn SessionListener>>,
	refresh: Mutex<RefreshState>,
}
impl<T> SessionGateway<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a gateway over a caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn CredentialStore>,
		config: GatewayConfig,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			config,
			refresh_metrics: Default::default(),
			listener: None,
			refresh: Default::default(),
		}
	}

	/// Registers the hook that routes the user to login when the session ends.
	pub fn with_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
		self.listener = Some(listener);

		self
	}

	/// Returns the stored credential pair.
	pub async fn credentials(&self) -> Result<Credentials> {
		Ok(self.store.load().await?)
	}

	/// Reports whether an access token is currently stored.
	pub async fn session_state(&self) -> Result<SessionState> {
		Ok(self.credentials().await?.state())
	}

	/// Returns `true` while a refresh call is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.refresh.lock().is_refreshing()
	}

	/// Sends a request, attaching the session bearer and recovering from expired tokens.
	///
	/// Every HTTP status other than a terminal 401 is returned as an [`ApiResponse`]; callers
	/// decide how to treat non-2xx statuses (see [`ApiResponse::error_for_status`]).
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "send");
		let endpoint = Endpoint::of_path(&request.path);

		obs::record_call_outcome(KIND, endpoint, CallOutcome::Attempt);

		let result = span.instrument(self.session_send(request)).await;

		obs::record_call_outcome(KIND, endpoint, CallOutcome::of(&result));

		result
	}

	pub(crate) async fn send_json<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send(request).await?.error_for_status()?.decode()
	}

	/// Like [`send_json`](Self::send_json) for free-form replies; an empty body reads as `null`.
	pub(crate) async fn send_value(&self, request: ApiRequest) -> Result<serde_json::Value> {
		let response = self.send(request).await?.error_for_status()?;

		if response.body.iter().all(u8::is_ascii_whitespace) {
			return Ok(serde_json::Value::Null);
		}

		response.decode()
	}

	pub(crate) async fn send_bytes(&self, request: ApiRequest) -> Result<Vec<u8>> {
		Ok(self.send(request).await?.error_for_status()?.body)
	}

	async fn session_send(&self, mut request: ApiRequest) -> Result<ApiResponse> {
		if !request.session {
			return self.dispatch(&request, None).await;
		}

		let seen_generation = self.refresh.lock().generation();
		let bearer = self.store.load().await?.access_token;
		let response = self.dispatch(&request, bearer).await?;

		if !response.is_unauthorized() {
			return Ok(response);
		}
		if request.retried {
			let reason = SessionError::RetryRejected;

			return Err(self.end_session(reason, seen_generation, &request).await);
		}

		let token = self.refreshed_access_token(seen_generation).await?;
		let replay_generation = self.refresh.lock().generation();

		request.retried = true;
		self.refresh_metrics.record_replay();

		let replay = self.dispatch(&request, Some(token)).await?;

		if replay.is_unauthorized() {
			let reason = SessionError::RetryRejected;

			return Err(self.end_session(reason, replay_generation, &request).await);
		}

		Ok(replay)
	}

	pub(crate) async fn dispatch(
		&self,
		request: &ApiRequest,
		bearer: Option<Secret>,
	) -> Result<ApiResponse> {
		let url = self.config.endpoint(&request.path, &request.query)?;
		let prepared =
			PreparedRequest { method: request.method, url, bearer, body: request.body.clone() };

		Ok(self.transport.execute(prepared).await?)
	}

	/// Ends the session whose tokens belong to `generation` and returns the caller's error.
	///
	/// Only the first caller per generation clears storage and notifies the listener.
	async fn end_session(
		&self,
		reason: SessionError,
		generation: u64,
		request: &ApiRequest,
	) -> Error {
		if self.refresh.lock().claim_teardown(generation) {
			self.clear_credentials().await;
			self.notify_session_end(&reason, Endpoint::of_path(&request.path));
		}

		reason.into()
	}

	/// Reopens teardown for a freshly stored credential pair.
	pub(crate) fn begin_session(&self) {
		self.refresh.lock().reopen();
	}

	/// Forgets both tokens. A store that fails to persist the removal is reported, not fatal.
	async fn clear_credentials(&self) {
		if let Err(e) = self.store.clear().await {
			obs::record_clear_failure(&e);
		}
	}

	fn notify_session_end(&self, reason: &SessionError, endpoint: Endpoint) {
		self.refresh_metrics.record_teardown();
		obs::record_session_teardown(endpoint);
		obs::record_session_end(reason);

		if let Some(listener) = &self.listener {
			listener.session_expired(reason);
		}
	}
}
#[cfg(feature = "reqwest")]
impl SessionGateway<ReqwestTransport> {
	/// Creates a gateway with a reqwest transport built from `config`.
	pub fn new(store: Arc<dyn CredentialStore>, config: GatewayConfig) -> Result<Self> {
		let transport = ReqwestTransport::from_config(&config)?;

		Ok(Self::with_transport(store, config, transport))
	}
}
impl<T> Debug for SessionGateway<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionGateway")
			.field("base_url", &self.config.base_url.as_str())
			.field("listener_set", &self.listener.is_some())
			.field("refreshing", &self.is_refreshing())
			.finish()
	}
}
