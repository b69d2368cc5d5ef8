//! Purchase bills and sales invoices as the backend returns them.

// self
use crate::{
	_prelude::*,
	billing::{
		draft::{DEFAULT_JOURNAL, PurchaseBillDraft, PurchaseItemDraft},
		totals,
	},
	id::BillId,
	lenient,
};

/// Stored purchase bill.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PurchaseBill {
	/// Primary key.
	pub id: BillId,
	/// Vendor-issued bill number.
	pub bill_number: String,
	/// Date printed on the bill.
	#[serde(deserialize_with = "lenient::date")]
	pub bill_date: Date,
	/// Payment due date, if any.
	#[serde(default, deserialize_with = "lenient::date_opt")]
	pub due_date: Option<Date>,
	/// Vendor display name.
	pub vendor_name: String,
	/// Vendor postal address.
	#[serde(default)]
	pub vendor_address: Option<String>,
	/// Vendor GST identification number.
	#[serde(default)]
	pub vendor_gstin: Option<String>,
	/// GST treatment label.
	#[serde(default)]
	pub gst_treatment: Option<String>,
	/// Ledger journal the bill is posted to.
	#[serde(default = "default_journal")]
	pub journal: String,
	/// Bill total.
	#[serde(deserialize_with = "lenient::decimal")]
	pub total_amount: f64,
	/// Identifier of the user who entered the bill.
	#[serde(default, deserialize_with = "lenient::key_opt")]
	pub created_by: Option<String>,
	/// Bill lines.
	#[serde(default)]
	pub items: Vec<PurchaseItem>,
}
impl PurchaseBill {
	/// Returns an editable copy, as the edit form starts from.
	pub fn to_draft(&self) -> PurchaseBillDraft {
		PurchaseBillDraft {
			bill_number: self.bill_number.clone(),
			bill_date: Some(self.bill_date),
			due_date: self.due_date,
			vendor_name: self.vendor_name.clone(),
			vendor_address: self.vendor_address.clone(),
			vendor_gstin: self.vendor_gstin.clone(),
			gst_treatment: self.gst_treatment.clone(),
			journal: self.journal.clone(),
			total_amount: totals::format_amount(self.total_amount),
			created_by: self.created_by.clone().unwrap_or_default(),
			items: self.items.iter().map(PurchaseItem::to_draft).collect(),
		}
	}
}

/// One stored bill line.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PurchaseItem {
	/// Line primary key.
	#[serde(default)]
	pub id: Option<u64>,
	/// Product reference: a product key or a free-form name.
	#[serde(deserialize_with = "lenient::key")]
	pub product: String,
	/// Expanded product record, when the backend nests it.
	#[serde(default)]
	pub product_detail: Option<ProductDetail>,
	/// Quantity purchased.
	#[serde(deserialize_with = "lenient::decimal")]
	pub quantity: f64,
	/// Unit of measure.
	#[serde(default)]
	pub unit: String,
	/// Unit price.
	#[serde(deserialize_with = "lenient::decimal")]
	pub price: f64,
	/// Absolute discount on the line.
	#[serde(default, deserialize_with = "lenient::decimal")]
	pub discount: f64,
	/// Absolute tax on the line.
	#[serde(default, deserialize_with = "lenient::decimal")]
	pub tax: f64,
	/// Line amount.
	#[serde(default, deserialize_with = "lenient::decimal")]
	pub amount: f64,
}
impl PurchaseItem {
	/// Name to show for the line: the nested product name, else the raw reference.
	pub fn display_name(&self) -> &str {
		self.product_detail
			.as_ref()
			.map(|detail| detail.name.as_str())
			.filter(|name| !name.is_empty())
			.unwrap_or(&self.product)
	}

	fn to_draft(&self) -> PurchaseItemDraft {
		PurchaseItemDraft {
			product: self.product.clone(),
			quantity: self.quantity,
			unit: self.unit.clone(),
			price: self.price,
			discount: self.discount,
			tax: self.tax,
			amount: self.amount,
		}
	}
}

/// Product fields nested into a bill line.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ProductDetail {
	/// Product name.
	#[serde(default)]
	pub name: String,
}

/// Sales invoice summary shown on the dashboard.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SalesInvoice {
	/// Primary key.
	pub id: u64,
	/// Invoice number, when assigned.
	#[serde(default)]
	pub invoice_number: Option<String>,
	/// Invoice date.
	#[serde(default, deserialize_with = "lenient::date_opt")]
	pub invoice_date: Option<Date>,
	/// Remaining fields, passed through untouched.
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_journal() -> String {
	DEFAULT_JOURNAL.into()
}
