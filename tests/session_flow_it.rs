#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use erp_gateway::{
	auth::{Credentials, LoginForm, Secret, SignupForm},
	billing::BillQuery,
	config::GatewayConfig,
	error::{Error, SessionError},
	gateway::ReqwestGateway,
	store::MemoryStore,
};

fn build_gateway(server: &MockServer, store: &MemoryStore) -> ReqwestGateway {
	let config = GatewayConfig::new(server.url("/api"))
		.expect("Mock server base URL should be accepted.");

	ReqwestGateway::new(Arc::new(store.clone()), config)
		.expect("Reqwest gateway should build for tests.")
}

#[tokio::test]
async fn login_then_expired_access_is_refreshed_and_replayed() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let store = MemoryStore::default();
	let gateway = build_gateway(&server, &store);
	let login = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/users/login/")
				.json_body(json!({ "username": "alice", "password": "secret1" }));
			then.status(200).json_body(json!({ "access": "A1", "refresh": "R1" }));
		})
		.await;
	let expired = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/billing/purchase-bills/")
				.header("authorization", "Bearer A1");
			then.status(401).json_body(json!({ "detail": "Token is expired" }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/users/token/refresh/")
				.json_body(json!({ "refresh": "R1" }));
			then.status(200).json_body(json!({ "access": "A2" }));
		})
		.await;
	let replay = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/billing/purchase-bills/")
				.query_param("ordering", "-bill_date")
				.header("authorization", "Bearer A2");
			then.status(200).json_body(json!({ "count": 0, "next": null, "results": [] }));
		})
		.await;
	let credentials = gateway.login(&LoginForm::new("alice", "secret1")).await?;

	assert_eq!(credentials.access_token.as_ref().map(Secret::expose), Some("A1"));

	let page = gateway.list_purchase_bills(&BillQuery::default()).await?;

	assert!(page.is_empty());
	assert_eq!(page.count, Some(0));

	login.assert_calls_async(1).await;
	expired.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
	replay.assert_calls_async(1).await;

	let stored = store.snapshot();

	assert_eq!(stored.access_token.as_ref().map(Secret::expose), Some("A2"));
	assert_eq!(stored.refresh_token.as_ref().map(Secret::expose), Some("R1"));
	assert!(gateway.is_authenticated().await?);

	Ok(())
}

#[tokio::test]
async fn rejected_refresh_clears_both_tokens() {
	let server = MockServer::start_async().await;
	let store = MemoryStore::with_credentials(Credentials::new("A1", Some(Secret::new("R1"))));
	let gateway = build_gateway(&server, &store);
	let expired = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/inventory/products/");
			then.status(401).json_body(json!({ "detail": "Token is expired" }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/users/token/refresh/");
			then.status(401).json_body(json!({ "detail": "Token is blacklisted" }));
		})
		.await;
	let err = gateway.products().await.expect_err("Rejected refresh should end the session.");

	assert!(matches!(err, Error::Session(SessionError::RefreshRejected { status: 401 })));

	expired.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;

	assert!(store.snapshot().is_empty());
	assert!(!gateway.is_authenticated().await.expect("Memory store should load."));
}

#[tokio::test]
async fn login_without_token_is_rejected_and_nothing_is_stored() {
	let server = MockServer::start_async().await;
	let store = MemoryStore::default();
	let gateway = build_gateway(&server, &store);
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/users/login/");
			then.status(200).json_body(json!({ "detail": "ok" }));
		})
		.await;
	let err = gateway
		.login(&LoginForm::new("alice", "secret1"))
		.await
		.expect_err("Login reply without a token must fail.");

	assert!(matches!(err, Error::NoTokenReceived));

	login.assert_calls_async(1).await;

	assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn invalid_forms_never_reach_the_backend() {
	let server = MockServer::start_async().await;
	let store = MemoryStore::default();
	let gateway = build_gateway(&server, &store);
	let any = server
		.mock_async(|when, then| {
			when.method(POST);
			then.status(200).json_body(json!({}));
		})
		.await;
	let err = gateway
		.login(&LoginForm::new("alice", "123"))
		.await
		.expect_err("Short password must be rejected locally.");

	match err {
		Error::Validation(err) => assert_eq!(err.message_for("password"), Some("Too short!")),
		other => panic!("Expected a validation error, got {other:?}."),
	}

	let signup = SignupForm {
		username: "alice".into(),
		email: "alice@".into(),
		phone: "9999999999".into(),
		gstin: "29ABCDE1234F1Z5".into(),
		password: Secret::new("secret1"),
	};
	let err = gateway.register(&signup).await.expect_err("Malformed email must be rejected.");

	assert!(matches!(err, Error::Validation(_)));

	any.assert_calls_async(0).await;
}

#[tokio::test]
async fn register_posts_signup_and_keeps_session() {
	let server = MockServer::start_async().await;
	let store = MemoryStore::default();
	let gateway = build_gateway(&server, &store);
	let register = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/users/register/").json_body(json!({
				"username": "alice",
				"email": "alice@example.com",
				"phone": "9999999999",
				"gstin": "29ABCDE1234F1Z5",
				"password": "secret1"
			}));
			then.status(201).json_body(json!({ "id": 3, "username": "alice" }));
		})
		.await;
	let signup = SignupForm {
		username: "alice".into(),
		email: "alice@example.com".into(),
		phone: "9999999999".into(),
		gstin: "29ABCDE1234F1Z5".into(),
		password: Secret::new("secret1"),
	};
	let created = gateway.register(&signup).await.expect("Valid signup should be accepted.");

	register.assert_calls_async(1).await;

	assert_eq!(created["username"], "alice");
	assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn logout_clears_stored_pair() {
	let server = MockServer::start_async().await;
	let store = MemoryStore::with_credentials(Credentials::new("A1", Some(Secret::new("R1"))));
	let gateway = build_gateway(&server, &store);

	assert!(gateway.is_authenticated().await.expect("Memory store should load."));

	gateway.logout().await.expect("Logout should clear the memory store.");

	assert!(store.snapshot().is_empty());
	assert!(!gateway.is_authenticated().await.expect("Memory store should load."));
}
