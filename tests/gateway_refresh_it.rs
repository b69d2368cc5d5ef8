// std
use std::{
	env, fs,
	path::PathBuf,
	process,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::{SystemTime, UNIX_EPOCH},
};
// crates.io
use futures::future;
use parking_lot::Mutex;
// self
use erp_gateway::{
	auth::{Credentials, LoginForm, Secret, SessionState},
	config::GatewayConfig,
	error::{Error, SessionError},
	gateway::{SessionGateway, SessionListener},
	http::{ApiRequest, ApiResponse, ApiTransport, PreparedRequest, TransportFuture},
	store::{CredentialStore, FileStore, MemoryStore},
};

const CONCURRENT_REQUESTS: usize = 5;
const REFRESHED_ACCESS: &str = "A2";

/// Scripted backend: accepts only the current access token and serves the refresh endpoint.
struct FakeBackend {
	valid_access: Mutex<String>,
	refresh_succeeds: bool,
	refresh_calls: AtomicUsize,
	seen_bearers: Mutex<Vec<(String, Option<String>)>>,
}
impl FakeBackend {
	fn new(valid_access: &str, refresh_succeeds: bool) -> Arc<Self> {
		Arc::new(Self {
			valid_access: Mutex::new(valid_access.into()),
			refresh_succeeds,
			refresh_calls: AtomicUsize::new(0),
			seen_bearers: Mutex::new(Vec::new()),
		})
	}

	fn refresh_calls(&self) -> usize {
		self.refresh_calls.load(Ordering::SeqCst)
	}

	fn bearers_for(&self, path: &str) -> Vec<Option<String>> {
		self.seen_bearers
			.lock()
			.iter()
			.filter(|(seen, _)| seen == path)
			.map(|(_, bearer)| bearer.clone())
			.collect()
	}

	async fn respond(&self, request: PreparedRequest) -> ApiResponse {
		let path = request.url.path().to_owned();
		let bearer = request.bearer.as_ref().map(|secret| secret.expose().to_owned());

		self.seen_bearers.lock().push((path.clone(), bearer.clone()));

		if path.ends_with("/users/token/refresh/") {
			self.refresh_calls.fetch_add(1, Ordering::SeqCst);

			// Keep the refresh in flight long enough for every concurrent caller to queue.
			for _ in 0..3 {
				tokio::task::yield_now().await;
			}

			if !self.refresh_succeeds {
				let body = serde_json::json!({ "detail": "Token is invalid" });

				return ApiResponse::json(401, &body);
			}

			*self.valid_access.lock() = REFRESHED_ACCESS.into();

			return ApiResponse::json(200, &serde_json::json!({ "access": REFRESHED_ACCESS }));
		}
		if path.ends_with("/users/login/") {
			return ApiResponse::json(200, &serde_json::json!({ "token": "A0", "refresh": "R1" }));
		}
		if path.ends_with("/slow/") {
			// Outlive the refresh so the 401 below lands after it settled.
			for _ in 0..10 {
				tokio::task::yield_now().await;
			}

			let accepted = bearer.as_deref() == Some(self.valid_access.lock().as_str());
			let status = if accepted { 200 } else { 401 };

			return ApiResponse::json(status, &serde_json::json!({ "bearer": bearer }));
		}
		if path.ends_with("/broken/") {
			return ApiResponse::json(500, &serde_json::json!({ "detail": "boom" }));
		}
		if path.ends_with("/always-401/") {
			return ApiResponse::json(401, &serde_json::json!({ "detail": "nope" }));
		}
		if bearer.as_deref() == Some(self.valid_access.lock().as_str()) {
			return ApiResponse::json(200, &serde_json::json!({ "bearer": bearer }));
		}

		ApiResponse::json(401, &serde_json::json!({ "detail": "Token is expired" }))
	}
}
impl ApiTransport for FakeBackend {
	fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
		Box::pin(async move { Ok(self.respond(request).await) })
	}
}

#[derive(Default)]
struct CountingListener(AtomicUsize);
impl CountingListener {
	fn calls(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}
}
impl SessionListener for CountingListener {
	fn session_expired(&self, _: &SessionError) {
		self.0.fetch_add(1, Ordering::SeqCst);
	}
}

struct Harness {
	gateway: SessionGateway<FakeBackend>,
	backend: Arc<FakeBackend>,
	store: MemoryStore,
	listener: Arc<CountingListener>,
}

fn harness(credentials: Credentials, refresh_succeeds: bool) -> Harness {
	let store = MemoryStore::with_credentials(credentials);
	let (gateway, backend, listener) = gateway_over(Arc::new(store.clone()), refresh_succeeds);

	Harness { gateway, backend, store, listener }
}

fn gateway_over(
	store: Arc<dyn CredentialStore>,
	refresh_succeeds: bool,
) -> (SessionGateway<FakeBackend>, Arc<FakeBackend>, Arc<CountingListener>) {
	let backend = FakeBackend::new("A1", refresh_succeeds);
	let listener = Arc::new(CountingListener::default());
	let config = GatewayConfig::new("http://erp.test/api")
		.expect("Test base URL should be accepted.");
	let gateway = SessionGateway::with_transport(store, config, backend.clone())
		.with_listener(listener.clone());

	(gateway, backend, listener)
}

fn temp_dir(label: &str) -> PathBuf {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System clock should be after the epoch.")
		.as_nanos();

	env::temp_dir().join(format!("erp_gateway_it_{label}_{}_{nanos}", process::id()))
}

fn expired_pair() -> Credentials {
	Credentials::new("A0", Some(Secret::new("R1")))
}

fn assert_session_error(result: Result<ApiResponse, Error>, expected: SessionError) {
	match result {
		Err(Error::Session(actual)) => assert_eq!(actual, expected),
		other => panic!("Expected session error {expected:?}, got {other:?}."),
	}
}

#[tokio::test]
async fn concurrent_401s_share_one_refresh() {
	let h = harness(expired_pair(), true);
	let responses = future::join_all(
		(0..CONCURRENT_REQUESTS)
			.map(|_| h.gateway.send(ApiRequest::get("billing/purchase-bills/"))),
	)
	.await;

	assert_eq!(h.backend.refresh_calls(), 1);

	for response in responses {
		let response = response.expect("Every queued request should resume after the refresh.");

		assert_eq!(response.status, 200);
	}

	let bearers = h.backend.bearers_for("/api/billing/purchase-bills/");

	assert_eq!(bearers.len(), CONCURRENT_REQUESTS * 2);
	assert_eq!(
		bearers.iter().filter(|bearer| bearer.as_deref() == Some(REFRESHED_ACCESS)).count(),
		CONCURRENT_REQUESTS,
	);

	let stored = h.store.snapshot();

	assert_eq!(stored.access_token.as_ref().map(Secret::expose), Some(REFRESHED_ACCESS));
	assert_eq!(stored.refresh_token.as_ref().map(Secret::expose), Some("R1"));
	assert_eq!(h.gateway.refresh_metrics.attempts(), 1);
	assert_eq!(h.gateway.refresh_metrics.successes(), 1);
	assert_eq!(h.gateway.refresh_metrics.queued(), (CONCURRENT_REQUESTS - 1) as u64);
	assert_eq!(h.listener.calls(), 0);
	assert!(!h.gateway.is_refreshing());
}

#[tokio::test]
async fn failed_refresh_rejects_every_caller_and_signs_out() {
	let h = harness(expired_pair(), false);
	let responses = future::join_all(
		(0..CONCURRENT_REQUESTS)
			.map(|_| h.gateway.send(ApiRequest::get("billing/purchase-bills/"))),
	)
	.await;

	assert_eq!(h.backend.refresh_calls(), 1);

	for response in responses {
		assert_session_error(response, SessionError::RefreshRejected { status: 401 });
	}

	assert!(h.store.snapshot().is_empty());
	assert_eq!(
		h.gateway.session_state().await.expect("Memory store should load."),
		SessionState::Unauthenticated,
	);
	assert_eq!(h.listener.calls(), 1);
	assert_eq!(h.gateway.refresh_metrics.failures(), 1);
	assert!(!h.gateway.is_refreshing());
}

#[tokio::test]
async fn replayed_401_is_terminal_without_second_refresh() {
	let h = harness(expired_pair(), true);
	let result = h.gateway.send(ApiRequest::get("always-401/")).await;

	assert_session_error(result, SessionError::RetryRejected);
	assert_eq!(h.backend.refresh_calls(), 1);
	assert_eq!(h.backend.bearers_for("/api/always-401/").len(), 2);
	assert!(h.store.snapshot().is_empty());
	assert_eq!(h.listener.calls(), 1);
}

#[tokio::test]
async fn requests_after_refresh_use_new_token_directly() {
	let h = harness(expired_pair(), true);

	h.gateway
		.send(ApiRequest::get("inventory/products/"))
		.await
		.expect("First request should recover through a refresh.");

	let response = h
		.gateway
		.send(ApiRequest::get("inventory/products/"))
		.await
		.expect("Follow-up request should succeed.");

	assert_eq!(response.status, 200);
	assert_eq!(h.backend.refresh_calls(), 1);
	assert_eq!(h.gateway.refresh_metrics.queued(), 0);
	assert_eq!(
		h.backend.bearers_for("/api/inventory/products/"),
		vec![Some("A0".into()), Some(REFRESHED_ACCESS.into()), Some(REFRESHED_ACCESS.into())],
	);
}

#[tokio::test]
async fn missing_refresh_token_ends_session_without_network_call() {
	let h = harness(Credentials::new("A0", None), true);
	let result = h.gateway.send(ApiRequest::get("billing/purchase-bills/")).await;

	assert_session_error(result, SessionError::MissingRefreshToken);
	assert_eq!(h.backend.refresh_calls(), 0);
	assert!(h.store.snapshot().is_empty());
	assert_eq!(h.listener.calls(), 1);
}

#[tokio::test]
async fn non_auth_errors_propagate_unchanged() {
	let h = harness(Credentials::new("A1", Some(Secret::new("R1"))), true);
	let err = h
		.gateway
		.send(ApiRequest::get("broken/"))
		.await
		.expect("A 500 is still a response.")
		.error_for_status()
		.expect_err("A 500 should surface as a status error.");

	assert!(matches!(err, Error::Status { status: 500, .. }));
	assert_eq!(h.backend.refresh_calls(), 0);
	assert!(!h.store.snapshot().is_empty());
	assert_eq!(h.listener.calls(), 0);
}

#[tokio::test]
async fn anonymous_requests_skip_bearer_and_refresh() {
	let h = harness(expired_pair(), true);
	let response = h
		.gateway
		.send(ApiRequest::get("always-401/").anonymous())
		.await
		.expect("Anonymous 401 is returned as a response.");

	assert_eq!(response.status, 401);
	assert_eq!(h.backend.bearers_for("/api/always-401/"), vec![None]);
	assert_eq!(h.backend.refresh_calls(), 0);
	assert_eq!(h.listener.calls(), 0);
}

#[tokio::test]
async fn signed_out_session_is_sent_without_bearer() {
	let h = harness(Credentials::default(), true);
	let result = h.gateway.send(ApiRequest::get("billing/purchase-bills/")).await;

	assert_session_error(result, SessionError::MissingRefreshToken);
	assert_eq!(h.backend.bearers_for("/api/billing/purchase-bills/"), vec![None]);
}

#[tokio::test]
async fn concurrent_replay_401s_tear_down_once() {
	let h = harness(expired_pair(), true);
	let responses = future::join_all(
		(0..CONCURRENT_REQUESTS).map(|_| h.gateway.send(ApiRequest::get("always-401/"))),
	)
	.await;

	assert_eq!(responses.len(), CONCURRENT_REQUESTS);

	for response in responses {
		assert_session_error(response, SessionError::RetryRejected);
	}

	assert_eq!(h.backend.refresh_calls(), 1);
	assert_eq!(h.backend.bearers_for("/api/always-401/").len(), CONCURRENT_REQUESTS * 2);
	assert!(h.store.snapshot().is_empty());
	assert_eq!(h.listener.calls(), 1);
	assert_eq!(h.gateway.refresh_metrics.replays(), CONCURRENT_REQUESTS as u64);
	assert_eq!(h.gateway.refresh_metrics.teardowns(), 1);
}

#[tokio::test]
async fn login_rearms_teardown_for_the_next_session() {
	let h = harness(expired_pair(), false);
	let first = h.gateway.send(ApiRequest::get("billing/purchase-bills/")).await;

	assert_session_error(first, SessionError::RefreshRejected { status: 401 });
	assert_eq!(h.listener.calls(), 1);

	h.gateway
		.login(&LoginForm::new("alice", "secret1"))
		.await
		.expect("Login should store a fresh pair.");

	let second = h.gateway.send(ApiRequest::get("billing/purchase-bills/")).await;

	assert_session_error(second, SessionError::RefreshRejected { status: 401 });
	assert_eq!(h.backend.refresh_calls(), 2);
	assert!(h.store.snapshot().is_empty());
	assert_eq!(h.listener.calls(), 2);
	assert_eq!(h.gateway.refresh_metrics.teardowns(), 2);
}

#[tokio::test]
async fn stale_401_after_refresh_replays_without_second_refresh() {
	let h = harness(expired_pair(), true);
	// The slow request leaves with A0 before the refresh starts and hears its 401 after it ended.
	let (slow, fast) = tokio::join!(
		h.gateway.send(ApiRequest::get("slow/")),
		h.gateway.send(ApiRequest::get("inventory/products/")),
	);

	assert_eq!(fast.expect("Fast request should recover through the refresh.").status, 200);
	assert_eq!(slow.expect("Stale request should replay with the new token.").status, 200);
	assert_eq!(h.backend.refresh_calls(), 1);
	assert_eq!(
		h.backend.bearers_for("/api/slow/"),
		vec![Some("A0".into()), Some(REFRESHED_ACCESS.into())],
	);
	assert_eq!(h.gateway.refresh_metrics.attempts(), 1);
	assert_eq!(h.gateway.refresh_metrics.queued(), 0);
	assert_eq!(h.listener.calls(), 0);
}

#[tokio::test]
async fn failed_clear_still_signs_out() {
	let dir = temp_dir("failed_clear");
	let store = FileStore::open(dir.join("credentials.json")).expect("Failed to open file store.");

	store.save(expired_pair()).await.expect("Failed to seed file store.");

	// A plain file where the directory was makes every later write fail.
	fs::remove_dir_all(&dir).expect("Failed to remove store directory.");
	fs::write(&dir, b"").expect("Failed to block store directory.");

	let (gateway, backend, listener) = gateway_over(Arc::new(store.clone()), false);
	let result = gateway.send(ApiRequest::get("billing/purchase-bills/")).await;

	assert_session_error(result, SessionError::RefreshRejected { status: 401 });
	assert_eq!(backend.refresh_calls(), 1);
	assert_eq!(listener.calls(), 1);
	assert_eq!(
		gateway.session_state().await.expect("File store should load from memory."),
		SessionState::Unauthenticated,
	);
	assert!(store.load().await.expect("File store should load from memory.").is_empty());

	fs::remove_file(&dir)
		.unwrap_or_else(|e| panic!("Failed to remove blocking file {}: {e}", dir.display()));
}
