//! Gateway configuration: backend base URL, request timeout, and user agent.

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError};

/// Settings shared by every request the gateway sends.
///
/// The base URL is normalized to end with `/` so relative endpoint paths such as
/// `billing/purchase-bills/` append to it instead of replacing its last segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
	/// Root of the backend REST API (for example `http://127.0.0.1:8000/api/`).
	pub base_url: Url,
	/// Per-request timeout applied by the transport, if any.
	pub timeout: Option<Duration>,
	/// User agent sent by the reqwest transport.
	pub user_agent: String,
}
impl GatewayConfig {
	/// Backend root used when nothing else is configured.
	pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:8000/api";
	/// Environment variable overriding the backend root.
	pub const ENV_BASE_URL: &'static str = "ERP_API_URL";
	/// Environment variable holding the request timeout in whole seconds.
	pub const ENV_TIMEOUT_SECS: &'static str = "ERP_API_TIMEOUT_SECS";

	/// Creates a configuration for the provided backend root.
	pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
		Ok(Self {
			base_url: normalize_base_url(base_url.as_ref())?,
			timeout: None,
			user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
		})
	}

	/// Reads [`Self::ENV_BASE_URL`] and [`Self::ENV_TIMEOUT_SECS`], falling back to defaults.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Builds a configuration from an arbitrary key lookup (environment, dotenv map, etc.).
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let base_url = lookup(Self::ENV_BASE_URL)
			.filter(|value| !value.trim().is_empty())
			.unwrap_or_else(|| Self::DEFAULT_BASE_URL.into());
		let mut config = Self::new(base_url.trim())?;

		if let Some(raw) = lookup(Self::ENV_TIMEOUT_SECS).filter(|value| !value.trim().is_empty()) {
			config.timeout = Some(parse_timeout(&raw)?);
		}

		Ok(config)
	}

	/// Overrides the per-request timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = if timeout.is_positive() { Some(timeout) } else { None };

		self
	}

	/// Overrides the user agent.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Resolves an endpoint path (leading `/` optional) plus query pairs against the base URL.
	pub fn endpoint(&self, path: &str, query: &[(String, String)]) -> Result<Url, ConfigError> {
		let relative = path.trim_start_matches('/');
		let mut url = self
			.base_url
			.join(relative)
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.into(), source })?;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query);
		}

		Ok(url)
	}
}

fn normalize_base_url(raw: &str) -> Result<Url, ConfigError> {
	let mut url = Url::parse(raw)
		.map_err(|source| ConfigError::InvalidBaseUrl { value: raw.into(), source: Some(source) })?;

	if url.cannot_be_a_base() {
		return Err(ConfigError::InvalidBaseUrl { value: raw.into(), source: None });
	}
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url.set_query(None);
	url.set_fragment(None);

	Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
	let invalid = || ConfigError::InvalidTimeout { value: raw.into() };
	let secs = raw.trim().parse::<u32>().map_err(|_| invalid())?;

	if secs == 0 {
		return Err(invalid());
	}

	Ok(Duration::seconds(i64::from(secs)))
}
