//! Editable purchase bills: totals derivation and field validation before submission.

// self
use crate::{
	_prelude::*,
	billing::totals,
	lenient,
	validate::{ValidationError, Validator},
};

/// Journal a new bill is posted to unless the user picks another.
pub const DEFAULT_JOURNAL: &str = "Purchases";

/// Purchase bill as entered in the create/edit form.
///
/// `total_amount` and each line's `amount` are derived; [`recompute_totals`] refreshes them
/// and the gateway always recomputes before sending.
///
/// [`recompute_totals`]: Self::recompute_totals
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PurchaseBillDraft {
	/// Vendor-issued bill number.
	pub bill_number: String,
	/// Date printed on the bill.
	#[serde(serialize_with = "lenient::serialize_date_opt")]
	pub bill_date: Option<Date>,
	/// Payment due date.
	#[serde(serialize_with = "lenient::serialize_date_opt")]
	pub due_date: Option<Date>,
	/// Vendor display name.
	pub vendor_name: String,
	/// Vendor postal address.
	pub vendor_address: Option<String>,
	/// Vendor GST identification number.
	pub vendor_gstin: Option<String>,
	/// GST treatment label.
	pub gst_treatment: Option<String>,
	/// Ledger journal.
	pub journal: String,
	/// Bill total with two decimals.
	pub total_amount: String,
	/// Identifier of the submitting user.
	pub created_by: String,
	/// Bill lines.
	pub items: Vec<PurchaseItemDraft>,
}
impl PurchaseBillDraft {
	/// Starts an empty bill entered by `created_by`.
	pub fn new(created_by: impl Into<String>) -> Self {
		Self { created_by: created_by.into(), ..Default::default() }
	}

	/// Rewrites every line amount and the bill total from the line inputs.
	pub fn recompute_totals(&mut self) {
		for item in &mut self.items {
			item.amount = item.line_amount();
		}

		self.total_amount =
			totals::format_amount(totals::bill_total(self.items.iter().map(|item| item.amount)));
	}

	/// Checks required fields; paths follow the form layout (`items.0.unit`).
	pub fn validate(&self) -> Result<(), ValidationError> {
		let mut validator = Validator::default();

		validator.required("bill_number", &self.bill_number);
		validator.required_some("bill_date", self.bill_date.as_ref());
		validator.required("vendor_name", &self.vendor_name);
		validator.required("journal", &self.journal);
		validator.required("total_amount", &self.total_amount);
		validator.required("created_by", &self.created_by);

		for (index, item) in self.items.iter().enumerate() {
			validator.required(format!("items.{index}.product"), &item.product);
			validator.required(format!("items.{index}.unit"), &item.unit);
		}

		validator.finish()
	}

	/// Returns the payload to submit: totals recomputed, then validated.
	pub fn prepared(&self) -> Result<Self, ValidationError> {
		let mut draft = self.clone();

		draft.recompute_totals();
		draft.validate()?;

		Ok(draft)
	}
}
impl Default for PurchaseBillDraft {
	fn default() -> Self {
		Self {
			bill_number: String::new(),
			bill_date: None,
			due_date: None,
			vendor_name: String::new(),
			vendor_address: None,
			vendor_gstin: None,
			gst_treatment: None,
			journal: DEFAULT_JOURNAL.into(),
			total_amount: totals::format_amount(0.),
			created_by: String::new(),
			items: vec![PurchaseItemDraft::default()],
		}
	}
}

/// One editable bill line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PurchaseItemDraft {
	/// Product reference: a product key or a free-form name.
	pub product: String,
	/// Quantity purchased.
	pub quantity: f64,
	/// Unit of measure.
	pub unit: String,
	/// Unit price.
	pub price: f64,
	/// Absolute discount on the line.
	pub discount: f64,
	/// Absolute tax on the line.
	pub tax: f64,
	/// Derived line amount.
	pub amount: f64,
}
impl PurchaseItemDraft {
	/// Creates a line with no discount or tax.
	pub fn new(
		product: impl Into<String>,
		quantity: f64,
		unit: impl Into<String>,
		price: f64,
	) -> Self {
		Self { product: product.into(), quantity, unit: unit.into(), price, ..Default::default() }
	}

	/// Sets the absolute discount.
	pub fn with_discount(mut self, discount: f64) -> Self {
		self.discount = discount;

		self
	}

	/// Sets the absolute tax.
	pub fn with_tax(mut self, tax: f64) -> Self {
		self.tax = tax;

		self
	}

	/// `quantity × price − discount + tax`.
	pub fn line_amount(&self) -> f64 {
		totals::line_amount(self.quantity, self.price, self.discount, self.tax)
	}
}
impl Default for PurchaseItemDraft {
	fn default() -> Self {
		Self {
			product: String::new(),
			quantity: 1.,
			unit: String::new(),
			price: 0.,
			discount: 0.,
			tax: 0.,
			amount: 0.,
		}
	}
}
