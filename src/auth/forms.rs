//! Login and signup payloads with the same checks the front-end forms apply.

// self
use crate::{
	_prelude::*,
	auth::Secret,
	validate::{ValidationError, Validator},
};

/// Credentials submitted to `POST /users/login/`.
#[derive(Clone, Debug, Serialize)]
pub struct LoginForm {
	/// Account name.
	pub username: String,
	/// Account password; at least six characters.
	pub password: Secret,
}
impl LoginForm {
	/// Creates a login form.
	pub fn new(username: impl Into<String>, password: impl Into<Secret>) -> Self {
		Self { username: username.into(), password: password.into() }
	}

	/// Checks required fields and the password length.
	pub fn validate(&self) -> Result<(), ValidationError> {
		let mut validator = Validator::default();

		validator.required("username", &self.username);
		validator.password("password", self.password.expose());

		validator.finish()
	}
}

/// Account details submitted to `POST /users/register/`.
#[derive(Clone, Debug, Serialize)]
pub struct SignupForm {
	/// Account name.
	pub username: String,
	/// Contact email.
	pub email: String,
	/// Contact phone number.
	pub phone: String,
	/// GST identification number of the business.
	pub gstin: String,
	/// Account password; at least six characters.
	pub password: Secret,
}
impl SignupForm {
	/// Checks required fields, the email shape, and the password length.
	pub fn validate(&self) -> Result<(), ValidationError> {
		let mut validator = Validator::default();

		validator.required("username", &self.username);
		validator.email("email", &self.email);
		validator.required("phone", &self.phone);
		validator.required("gstin", &self.gstin);
		validator.password("password", self.password.expose());

		validator.finish()
	}
}
