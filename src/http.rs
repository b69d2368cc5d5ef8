//! Transport primitives for backend API calls.
//!
//! The module exposes [`ApiTransport`] alongside [`ApiRequest`], [`PreparedRequest`], and
//! [`ApiResponse`] so downstream crates can plug in a custom HTTP stack (or a scripted fake)
//! without touching the session logic. The gateway owns URL resolution and bearer selection;
//! transports only move bytes.

// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::{_prelude::*, auth::Secret, error::TransportError};

/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing prepared backend requests.
///
/// The trait is the gateway's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so a single gateway can be shared across tasks, and must return
/// every HTTP status (including 401) as an [`ApiResponse`]; only failures that produced no
/// response at all are [`TransportError`]s.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends the request and buffers the whole response body.
	fn execute(&self, request: PreparedRequest) -> TransportFuture<'_>;
}

/// HTTP verbs used by the backend API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// File attached to a multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
	/// Form field name carrying the file.
	pub field: String,
	/// File name reported to the backend.
	pub file_name: String,
	/// MIME type of the file contents.
	pub content_type: String,
	/// Raw file contents.
	pub bytes: Vec<u8>,
}
impl Debug for Upload {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Upload")
			.field("field", &self.field)
			.field("file_name", &self.file_name)
			.field("content_type", &self.content_type)
			.field("len", &self.bytes.len())
			.finish()
	}
}

/// Request payload. Bodies are owned bytes so a request can be replayed after a refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestBody {
	/// No body.
	Empty,
	/// Pre-encoded JSON document.
	Json(Vec<u8>),
	/// Single-file `multipart/form-data` upload.
	Multipart(Upload),
}

/// Backend request described relative to the configured base URL.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Endpoint path relative to the base URL (leading `/` optional).
	pub path: String,
	/// Query string pairs appended in order.
	pub query: Vec<(String, String)>,
	/// Request payload.
	pub body: RequestBody,
	/// Whether the request carries the session bearer and participates in refresh.
	pub session: bool,
	pub(crate) retried: bool,
}
impl ApiRequest {
	/// Creates a body-less session request.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			body: RequestBody::Empty,
			session: true,
			retried: false,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Creates a `POST` request with a JSON body.
	pub fn post_json<B>(path: impl Into<String>, body: &B) -> Result<Self>
	where
		B: ?Sized + Serialize,
	{
		Self::new(Method::Post, path).with_json(body)
	}

	/// Creates a `PUT` request with a JSON body.
	pub fn put_json<B>(path: impl Into<String>, body: &B) -> Result<Self>
	where
		B: ?Sized + Serialize,
	{
		Self::new(Method::Put, path).with_json(body)
	}

	/// Creates a `POST` request that uploads one file as `multipart/form-data`.
	pub fn upload(path: impl Into<String>, upload: Upload) -> Self {
		let mut request = Self::new(Method::Post, path);

		request.body = RequestBody::Multipart(upload);

		request
	}

	/// Replaces the body with the JSON encoding of `body`.
	pub fn with_json<B>(mut self, body: &B) -> Result<Self>
	where
		B: ?Sized + Serialize,
	{
		self.body = RequestBody::Json(serde_json::to_vec(body).map_err(Error::Encode)?);

		Ok(self)
	}

	/// Appends a query pair.
	pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Appends a query pair when `value` is present.
	pub fn with_query_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
		match value {
			Some(value) => self.with_query(key, value),
			None => self,
		}
	}

	/// Detaches the request from the session: no bearer header and no refresh on 401.
	pub fn anonymous(mut self) -> Self {
		self.session = false;

		self
	}

	/// Returns `true` once the request has been replayed after a refresh.
	pub fn is_retry(&self) -> bool {
		self.retried
	}
}

/// Fully resolved request handed to an [`ApiTransport`].
#[derive(Clone, Debug)]
pub struct PreparedRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute URL including the query string.
	pub url: Url,
	/// Bearer credential to send as `Authorization: Bearer <token>`, if any.
	pub bearer: Option<Secret>,
	/// Request payload.
	pub body: RequestBody,
}

/// Buffered backend response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header, when present.
	pub content_type: Option<String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// HTTP status the backend uses for missing or expired credentials.
	pub const UNAUTHORIZED: u16 = 401;

	/// Creates a response with a status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, content_type: None, body: body.into() }
	}

	/// Creates a JSON response; mainly useful for scripted transports.
	pub fn json(status: u16, value: &serde_json::Value) -> Self {
		Self {
			status,
			content_type: Some("application/json".into()),
			body: value.to_string().into_bytes(),
		}
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` for HTTP 401.
	pub fn is_unauthorized(&self) -> bool {
		self.status == Self::UNAUTHORIZED
	}

	/// Converts non-2xx responses into [`Error::Status`].
	pub fn error_for_status(self) -> Result<Self> {
		if self.is_success() {
			Ok(self)
		} else {
			Err(Error::Status { status: self.status, body: self.text() })
		}
	}

	/// Returns the body decoded lossily as UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the failing path on mismatch.
	pub fn decode<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { source, status: self.status })
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the configured timeout and user agent.
	pub fn from_config(config: &crate::config::GatewayConfig) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder().user_agent(config.user_agent.clone());

		if let Some(timeout) = config.timeout {
			let timeout = std::time::Duration::try_from(timeout).map_err(|_| {
				ConfigError::InvalidTimeout { value: timeout.whole_seconds().to_string() }
			})?;

			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}

	async fn send(&self, request: PreparedRequest) -> Result<ApiResponse, TransportError> {
		// crates.io
		use reqwest::{
			header::CONTENT_TYPE,
			multipart::{Form, Part},
		};

		let method = match request.method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Delete => reqwest::Method::DELETE,
		};
		let mut builder = self.0.request(method, request.url);

		if let Some(token) = &request.bearer {
			builder = builder.bearer_auth(token.expose());
		}

		builder = match request.body {
			RequestBody::Empty => builder,
			RequestBody::Json(bytes) =>
				builder.header(CONTENT_TYPE, "application/json").body(bytes),
			RequestBody::Multipart(upload) => {
				let part = Part::bytes(upload.bytes)
					.file_name(upload.file_name)
					.mime_str(&upload.content_type)?;

				builder.multipart(Form::new().part(upload.field, part))
			},
		};

		let response = builder.send().await?;
		let status = response.status().as_u16();
		let content_type = response
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.map(ToOwned::to_owned);
		let body = response.bytes().await?.to_vec();

		Ok(ApiResponse { status, content_type, body })
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
		Box::pin(self.send(request))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn builders_accumulate_query_and_body() {
		let body = serde_json::json!({ "username": "ops" });
		let request = ApiRequest::post_json("users/login/", &body)
			.expect("JSON body should encode.")
			.with_query("a", "1")
			.with_query_opt("b", None::<String>)
			.with_query_opt("c", Some("3"))
			.anonymous();

		assert_eq!(request.method, Method::Post);
		assert_eq!(request.query, vec![("a".into(), "1".into()), ("c".into(), "3".into())]);
		assert_eq!(request.body, RequestBody::Json(br#"{"username":"ops"}"#.to_vec()));
		assert!(!request.session);
		assert!(!request.is_retry());
	}

	#[test]
	fn status_helpers_classify_responses() {
		let ok = ApiResponse::json(200, &serde_json::json!({ "id": 1 }));

		assert!(ok.is_success());
		assert_eq!(ok.clone().error_for_status().expect("2xx should pass through."), ok);

		let denied = ApiResponse::new(401, "expired");

		assert!(denied.is_unauthorized());

		let err = ApiResponse::new(500, "boom").error_for_status().expect_err("5xx should fail.");

		assert!(matches!(err, Error::Status { status: 500, ref body } if body == "boom"));
	}

	#[test]
	fn decode_reports_failing_path() {
		#[derive(Debug, Deserialize)]
		struct Body {
			#[allow(dead_code)]
			access: String,
		}

		let err = ApiResponse::json(200, &serde_json::json!({ "access": 5 }))
			.decode::<Body>()
			.expect_err("Numeric access token should not decode into a string.");

		match err {
			Error::Decode { source, status } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "access");
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn upload_debug_hides_contents() {
		let upload = Upload {
			field: "file".into(),
			file_name: "bills.csv".into(),
			content_type: "text/csv".into(),
			bytes: b"bill_number,vendor_name".to_vec(),
		};

		assert!(!format!("{upload:?}").contains("vendor_name"));
	}
}
