//! Inventory product endpoints.

// self
use crate::{
	_prelude::*,
	gateway::SessionGateway,
	http::{ApiRequest, ApiTransport},
	id::ProductId,
	lenient,
	page::Page,
	validate::{ValidationError, Validator},
};

/// Product collection endpoint.
pub const PRODUCTS_PATH: &str = "inventory/products/";
/// Product creation endpoint.
pub const ADD_PRODUCT_PATH: &str = "inventory/add-product/";

/// Unit assumed when a new product names none.
pub const DEFAULT_UNIT: &str = "pcs";
/// Stock level below which a new product raises the low-stock alert.
pub const DEFAULT_LOW_STOCK_ALERT: u32 = 10;

/// Stored inventory product.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Product {
	/// Primary key.
	pub id: ProductId,
	/// Display name.
	pub name: String,
	/// Unit of measure.
	#[serde(default)]
	pub unit: Option<String>,
	/// Default purchase price.
	#[serde(default, deserialize_with = "lenient::decimal_opt")]
	pub purchase_price: Option<f64>,
	/// Default selling price.
	#[serde(default, deserialize_with = "lenient::decimal_opt")]
	pub selling_price: Option<f64>,
	/// Tax rate in percent.
	#[serde(default, deserialize_with = "lenient::decimal_opt")]
	pub tax_rate: Option<f64>,
	/// Remaining fields (stock, HSN code, ...), passed through untouched.
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}
impl Product {
	/// Case-insensitive substring match on the name, as the product picker filters.
	pub fn name_matches(&self, needle: &str) -> bool {
		self.name.to_lowercase().contains(&needle.trim().to_lowercase())
	}
}

/// Product fields sent on create and update.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductDraft {
	/// Display name.
	pub name: String,
	/// Unit of measure.
	pub unit: String,
	/// Default purchase price.
	pub purchase_price: f64,
	/// Default selling price.
	pub selling_price: f64,
	/// HSN classification code.
	pub hsn_code: String,
	/// Tax rate in percent.
	pub tax_rate: f64,
	/// Low-stock alert threshold.
	pub low_stock_alert: u32,
}
impl ProductDraft {
	/// New product bought and sold at `price`.
	pub fn new(name: impl Into<String>, price: f64) -> Self {
		Self {
			name: name.into(),
			unit: DEFAULT_UNIT.into(),
			purchase_price: price,
			selling_price: price,
			hsn_code: String::new(),
			tax_rate: 0.,
			low_stock_alert: DEFAULT_LOW_STOCK_ALERT,
		}
	}

	/// Sets the unit of measure.
	pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
		self.unit = unit.into();

		self
	}

	/// Sets the selling price.
	pub fn with_selling_price(mut self, price: f64) -> Self {
		self.selling_price = price;

		self
	}

	/// Rejects a blank name.
	pub fn validate(&self) -> Result<(), ValidationError> {
		let mut validator = Validator::default();

		validator.required("name", &self.name);

		validator.finish()
	}

	fn prepared(&self) -> Result<Self, ValidationError> {
		self.validate()?;

		let mut draft = self.clone();

		draft.name = draft.name.trim().to_owned();

		if draft.unit.trim().is_empty() {
			draft.unit = DEFAULT_UNIT.into();
		}

		Ok(draft)
	}
}

fn product_path(id: ProductId) -> String {
	format!("inventory/product/{id}/")
}

impl<T> SessionGateway<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists inventory products.
	pub async fn products(&self) -> Result<Page<Product>> {
		self.send_json(ApiRequest::get(PRODUCTS_PATH)).await
	}

	/// Creates a product.
	pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
		let payload = draft.prepared()?;

		self.send_json(ApiRequest::post_json(ADD_PRODUCT_PATH, &payload)?).await
	}

	/// Replaces a product.
	pub async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<Product> {
		let payload = draft.prepared()?;

		self.send_json(ApiRequest::put_json(product_path(id), &payload)?).await
	}
}
