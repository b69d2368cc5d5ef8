//! Serde helpers for backend fields that arrive as either JSON numbers or strings.
//!
//! Decimal columns are rendered as strings (`"50.00"`) while computed fields come back as
//! plain numbers, so amounts are decoded through these helpers.

// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
use time::{format_description::BorrowedFormatItem, macros::format_description};
// self
use crate::_prelude::*;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
	Number(f64),
	Text(String),
}
impl NumberOrText {
	fn into_f64<E>(self) -> Result<f64, E>
	where
		E: DeError,
	{
		match self {
			Self::Number(value) => Ok(value),
			Self::Text(text) if text.trim().is_empty() => Ok(0.),
			Self::Text(text) => text
				.trim()
				.parse::<f64>()
				.map_err(|_| E::custom(format!("`{text}` is not a decimal number"))),
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeyRepr {
	Number(u64),
	Text(String),
}
impl KeyRepr {
	fn into_string(self) -> String {
		match self {
			Self::Number(value) => value.to_string(),
			Self::Text(text) => text,
		}
	}
}

/// Decodes a decimal that may be encoded as a string; blank strings read as zero.
pub(crate) fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
	D: Deserializer<'de>,
{
	NumberOrText::deserialize(deserializer)?.into_f64()
}

/// Optional variant of [`decimal`]; `null` stays `None`.
pub(crate) fn decimal_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: Deserializer<'de>,
{
	Option::<NumberOrText>::deserialize(deserializer)?.map(NumberOrText::into_f64).transpose()
}

/// Decodes a reference that may be a numeric primary key or a free-form string.
pub(crate) fn key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	KeyRepr::deserialize(deserializer).map(KeyRepr::into_string)
}

/// Optional variant of [`key`]; `null` stays `None`.
pub(crate) fn key_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<KeyRepr>::deserialize(deserializer)?.map(KeyRepr::into_string))
}

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Decodes an ISO `YYYY-MM-DD` calendar date.
pub(crate) fn date<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
	D: Deserializer<'de>,
{
	let text = String::deserialize(deserializer)?;

	parse_date(&text).map_err(D::Error::custom)
}

/// Optional variant of [`date`]; `null` and blank strings read as `None`.
pub(crate) fn date_opt<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<String>::deserialize(deserializer)? {
		Some(text) if !text.trim().is_empty() =>
			parse_date(&text).map(Some).map_err(D::Error::custom),
		_ => Ok(None),
	}
}

/// Encodes an optional date as `YYYY-MM-DD` or `null`.
pub(crate) fn serialize_date_opt<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match value {
		Some(date) => serializer.serialize_str(&format_date(*date)),
		None => serializer.serialize_none(),
	}
}

/// Renders a date the way the backend expects it in bodies and query strings.
pub(crate) fn format_date(date: Date) -> String {
	// The static format only holds components every `Date` has.
	date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

fn parse_date(text: &str) -> Result<Date, String> {
	Date::parse(text.trim(), DATE_FORMAT)
		.map_err(|e| format!("`{text}` is not a YYYY-MM-DD date: {e}"))
}
