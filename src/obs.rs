//! Optional observability helpers for gateway calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named `erp_gateway.call` with the
//!   `call` (operation) and `stage` (call site) fields, plus events on session transitions.
//! - Enable `metrics` to increment the `erp_gateway_call_total` counter for every
//!   attempt/success/failure, labeled by `call`, `endpoint` (API family) and `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Gateway operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Any request routed through the session.
	Request,
	/// Credential refresh exchange.
	Refresh,
	/// Login exchange.
	Login,
	/// Account registration.
	Register,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::Refresh => "refresh",
			CallKind::Login => "login",
			CallKind::Register => "register",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Backend API family a request path belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// `users/...`: login, registration and token refresh.
	Users,
	/// `billing/...`: bills, CSV upload and the recent-bills widget.
	Billing,
	/// `inventory/...`: products and stock.
	Inventory,
	/// `analytics/...`: dashboards and CSV export.
	Analytics,
	/// Anything outside the known families.
	Other,
}
impl Endpoint {
	/// Classifies a path relative to the base URL by its first segment.
	pub fn of_path(path: &str) -> Self {
		match path.trim_start_matches('/').split('/').next().unwrap_or_default() {
			"users" => Endpoint::Users,
			"billing" => Endpoint::Billing,
			"inventory" => Endpoint::Inventory,
			"analytics" => Endpoint::Analytics,
			_ => Endpoint::Other,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Endpoint::Users => "users",
			Endpoint::Billing => "billing",
			Endpoint::Inventory => "inventory",
			Endpoint::Analytics => "analytics",
			Endpoint::Other => "other",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a gateway operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto its terminal outcome label.
	pub fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
		if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure }
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoint_family_follows_first_segment() {
		assert_eq!(Endpoint::of_path("billing/bills/7/"), Endpoint::Billing);
		assert_eq!(Endpoint::of_path("/inventory/products/"), Endpoint::Inventory);
		assert_eq!(Endpoint::of_path("analytics/export/"), Endpoint::Analytics);
		assert_eq!(Endpoint::of_path("users/token/refresh/"), Endpoint::Users);
		assert_eq!(Endpoint::of_path("billingx/"), Endpoint::Other);
		assert_eq!(Endpoint::of_path(""), Endpoint::Other);
	}
}
