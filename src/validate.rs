//! Field-level validation shared by the login, signup, and purchase-bill forms.

// self
use crate::_prelude::*;

/// Minimum accepted password length for login and signup.
pub const PASSWORD_MIN_LEN: usize = 6;

/// One rejected field, addressed by its form path (`items.0.unit`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
	/// Dotted path of the field inside the submitted form.
	pub path: String,
	/// Message shown next to the field.
	pub message: &'static str,
}

/// Aggregated validation failure; never empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
#[error("Validation failed: {}.", summarize(.fields))]
pub struct ValidationError {
	/// Every rejected field in form order.
	pub fields: Vec<FieldError>,
}
impl ValidationError {
	/// Returns the message recorded for `path`, if that field was rejected.
	pub fn message_for(&self, path: &str) -> Option<&'static str> {
		self.fields.iter().find(|field| field.path == path).map(|field| field.message)
	}
}

/// Collects field errors while a form is walked.
#[derive(Debug, Default)]
pub(crate) struct Validator {
	fields: Vec<FieldError>,
}
impl Validator {
	pub(crate) const INVALID_EMAIL: &'static str = "Invalid email";
	pub(crate) const REQUIRED: &'static str = "Required";
	pub(crate) const TOO_SHORT: &'static str = "Too short!";

	pub(crate) fn reject(&mut self, path: impl Into<String>, message: &'static str) {
		self.fields.push(FieldError { path: path.into(), message });
	}

	pub(crate) fn required(&mut self, path: impl Into<String>, value: &str) -> bool {
		if value.trim().is_empty() {
			self.reject(path, Self::REQUIRED);

			return false;
		}

		true
	}

	pub(crate) fn required_some<T>(&mut self, path: impl Into<String>, value: Option<&T>) {
		if value.is_none() {
			self.reject(path, Self::REQUIRED);
		}
	}

	pub(crate) fn password(&mut self, path: impl Into<String>, value: &str) {
		let path = path.into();

		if self.required(path.clone(), value) && value.chars().count() < PASSWORD_MIN_LEN {
			self.reject(path, Self::TOO_SHORT);
		}
	}

	pub(crate) fn email(&mut self, path: impl Into<String>, value: &str) {
		let path = path.into();

		if self.required(path.clone(), value) && !looks_like_email(value.trim()) {
			self.reject(path, Self::INVALID_EMAIL);
		}
	}

	pub(crate) fn finish(self) -> Result<(), ValidationError> {
		if self.fields.is_empty() { Ok(()) } else { Err(ValidationError { fields: self.fields }) }
	}
}

fn looks_like_email(value: &str) -> bool {
	if value.chars().any(char::is_whitespace) {
		return false;
	}

	let Some((local, domain)) = value.split_once('@') else {
		return false;
	};

	!local.is_empty()
		&& !domain.contains('@')
		&& domain.split('.').count() >= 2
		&& domain.split('.').all(|label| !label.is_empty())
}

fn summarize(fields: &[FieldError]) -> String {
	fields
		.iter()
		.map(|field| format!("{}: {}", field.path, field.message))
		.collect::<Vec<_>>()
		.join(", ")
}
