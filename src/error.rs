//! Gateway-level error types shared across sessions, endpoints, and stores.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The session ended and the user must sign in again.
	#[error(transparent)]
	Session(#[from] SessionError),
	/// Input rejected before any request was sent.
	#[error(transparent)]
	Validation(#[from] crate::validate::ValidationError),

	/// Backend answered with a non-success status that carries no session meaning.
	#[error("Backend returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body decoded lossily as UTF-8.
		body: String,
	},
	/// Backend answered with a body that does not match the expected shape.
	#[error("Backend returned a malformed JSON body (HTTP {status}).")]
	Decode {
		/// Structured parsing failure including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Request payload could not be serialized.
	#[error("Request payload could not be encoded.")]
	Encode(#[source] serde_json::Error),
	/// Login succeeded at the HTTP level but no access token was returned.
	#[error("Login response did not contain an access token.")]
	NoTokenReceived,
}

/// Configuration and validation failures raised while building a gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed or cannot carry paths.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Raw value supplied by the caller or environment.
		value: String,
		/// Underlying parsing failure, when one exists.
		#[source]
		source: Option<url::ParseError>,
	},
	/// Endpoint path cannot be joined onto the base URL.
	#[error("Endpoint path `{path}` is invalid.")]
	InvalidEndpoint {
		/// Offending relative path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Timeout setting cannot be parsed or is out of range.
	#[error("Timeout `{value}` is invalid; expected a positive number of seconds.")]
	InvalidTimeout {
		/// Raw value supplied by the caller or environment.
		value: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Terminal session failures; every variant clears stored credentials.
///
/// The type is `Clone` because one refresh outcome is fanned out to every queued caller.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SessionError {
	/// A 401 arrived but no refresh token is stored.
	#[error("No refresh token is stored for this session.")]
	MissingRefreshToken,
	/// No access token is stored; the session was signed out.
	#[error("The session is signed out.")]
	SignedOut,
	/// The refresh endpoint rejected the refresh token.
	#[error("Refresh endpoint rejected the refresh token with HTTP {status}.")]
	RefreshRejected {
		/// HTTP status code returned by the refresh endpoint.
		status: u16,
	},
	/// The refresh call could not be completed (network, storage, or decode failure).
	#[error("Refresh call failed: {message}.")]
	RefreshFailed {
		/// Human-readable failure summary.
		message: String,
	},
	/// A request replayed with a refreshed token was rejected again.
	#[error("Request was rejected again after the session was refreshed.")]
	RetryRejected,
	/// The task driving the refresh was dropped before it settled.
	#[error("Refresh was abandoned before it settled.")]
	Abandoned,
}
impl SessionError {
	pub(crate) fn refresh_failed(err: impl Display) -> Self {
		Self::RefreshFailed { message: err.to_string() }
	}
}
