//! List responses in every shape the backend emits.

// self
use crate::_prelude::*;

/// One page of a list endpoint.
///
/// List endpoints answer with a bare array, a `{"data": ..}` envelope, or a paginated
/// `{"results": [..], "next": .., "previous": .., "count": ..}` object; all decode here.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
	/// Records on this page.
	pub items: Vec<T>,
	/// Total record count across pages, when reported.
	pub count: Option<u64>,
	/// URL of the next page, when one exists.
	pub next: Option<String>,
	/// URL of the previous page, when one exists.
	pub previous: Option<String>,
}
impl<T> Page<T> {
	/// Returns `true` when the backend reported a next page.
	pub fn has_next(&self) -> bool {
		self.next.is_some()
	}

	/// Returns `true` when the page holds no records.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}
impl<T> Default for Page<T> {
	fn default() -> Self {
		Self { items: Vec::new(), count: None, next: None, previous: None }
	}
}
impl<T> IntoIterator for Page<T> {
	type IntoIter = std::vec::IntoIter<T>;
	type Item = T;

	fn into_iter(self) -> Self::IntoIter {
		self.items.into_iter()
	}
}
impl<'de, T> Deserialize<'de> for Page<T>
where
	T: Deserialize<'de>,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		PageRepr::deserialize(deserializer).map(PageRepr::into_page)
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
	Bare(Vec<T>),
	Paginated {
		results: Vec<T>,
		#[serde(default)]
		count: Option<u64>,
		#[serde(default)]
		next: Option<String>,
		#[serde(default)]
		previous: Option<String>,
	},
	Wrapped {
		data: Box<PageRepr<T>>,
	},
}
impl<T> PageRepr<T> {
	fn into_page(self) -> Page<T> {
		match self {
			Self::Bare(items) => Page { items, ..Page::default() },
			Self::Paginated { results, count, next, previous } =>
				Page { items: results, count, next, previous },
			Self::Wrapped { data } => data.into_page(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn decode(value: serde_json::Value) -> Page<u32> {
		serde_json::from_value(value).expect("Page fixture should decode.")
	}

	#[test]
	fn all_list_shapes_decode() {
		let bare = decode(serde_json::json!([1, 2]));

		assert_eq!(bare.items, vec![1, 2]);
		assert!(!bare.has_next());

		let paginated = decode(serde_json::json!({
			"count": 12,
			"next": "http://127.0.0.1:8000/api/billing/purchase-bills/?page=2",
			"previous": null,
			"results": [3]
		}));

		assert_eq!(paginated.items, vec![3]);
		assert_eq!(paginated.count, Some(12));
		assert!(paginated.has_next());

		let wrapped = decode(serde_json::json!({ "data": [4, 5] }));

		assert_eq!(wrapped.items, vec![4, 5]);

		let wrapped_paginated = decode(serde_json::json!({
			"data": { "results": [], "next": "page-2" }
		}));

		assert!(wrapped_paginated.is_empty());
		assert!(wrapped_paginated.has_next());
	}

	#[test]
	fn unknown_shape_is_rejected() {
		assert!(serde_json::from_value::<Page<u32>>(serde_json::json!({ "items": [1] })).is_err());
	}
}
