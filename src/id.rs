//! Strongly typed backend record identifiers.

// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "u64", into = "u64")]
		pub struct $name(u64);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: u64) -> Result<Self, IdentifierError> {
				validate_value($kind, value)?;

				Ok(Self(value))
			}

			/// Returns the raw numeric identifier.
			pub const fn get(self) -> u64 {
				self.0
			}
		}
		impl From<$name> for u64 {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<u64> for $name {
			type Error = IdentifierError;

			fn try_from(value: u64) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				Display::fmt(&self.0, f)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				let value =
					s.parse::<u64>().map_err(|_| IdentifierError::NotNumeric { kind: $kind })?;

				Self::new(value)
			}
		}
	};
}

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The backend never issues zero as a primary key.
	#[error("{kind} identifier cannot be zero.")]
	Zero {
		/// Kind of identifier (bill, product).
		kind: &'static str,
	},
	/// The textual form is not an unsigned integer.
	#[error("{kind} identifier must be an unsigned integer.")]
	NotNumeric {
		/// Kind of identifier (bill, product).
		kind: &'static str,
	},
}

def_id! { BillId, "Primary key of a purchase bill.", "Bill" }
def_id! { ProductId, "Primary key of an inventory product.", "Product" }

fn validate_value(kind: &'static str, value: u64) -> Result<(), IdentifierError> {
	if value == 0 {
		return Err(IdentifierError::Zero { kind });
	}

	Ok(())
}
