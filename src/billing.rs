//! Purchase bill endpoints and the dashboard's recent-activity lists.

pub mod bill;
pub mod draft;
pub mod totals;

pub use bill::*;
pub use draft::*;

// self
use crate::{
	_prelude::*,
	gateway::SessionGateway,
	http::{ApiRequest, ApiTransport, Upload},
	id::BillId,
	page::Page,
};

/// Purchase bill collection endpoint.
pub const PURCHASE_BILLS_PATH: &str = "billing/purchase-bills/";
/// Sales invoice collection endpoint.
pub const SALES_INVOICES_PATH: &str = "billing/sales-invoices/";
/// Bulk CSV import endpoint for purchase bills.
pub const UPLOAD_PURCHASE_BILLS_CSV_PATH: &str = "billing/upload-purchase-bills-csv/";

const RECENT_LIMIT: u32 = 5;

/// Sort order accepted by the purchase bill list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BillOrdering {
	/// `-bill_date`
	#[default]
	NewestFirst,
	/// `bill_date`
	OldestFirst,
	/// `-total_amount`
	LargestFirst,
	/// `total_amount`
	SmallestFirst,
}
impl BillOrdering {
	/// Returns the `ordering` query value.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::NewestFirst => "-bill_date",
			Self::OldestFirst => "bill_date",
			Self::LargestFirst => "-total_amount",
			Self::SmallestFirst => "total_amount",
		}
	}
}
impl Display for BillOrdering {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Filters for [`SessionGateway::list_purchase_bills`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BillQuery {
	/// Free-text search; blank searches are not sent.
	pub search: Option<String>,
	/// Sort order.
	pub ordering: BillOrdering,
	/// 1-based page number.
	pub page: Option<u32>,
	/// Page size.
	pub limit: Option<u32>,
}
impl BillQuery {
	/// Sets the free-text search.
	pub fn with_search(mut self, search: impl Into<String>) -> Self {
		self.search = Some(search.into());

		self
	}

	/// Sets the sort order.
	pub fn with_ordering(mut self, ordering: BillOrdering) -> Self {
		self.ordering = ordering;

		self
	}

	/// Selects a page.
	pub fn with_page(mut self, page: u32) -> Self {
		self.page = Some(page);

		self
	}

	/// Caps the page size.
	pub fn with_limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);

		self
	}

	fn apply(&self, request: ApiRequest) -> ApiRequest {
		let search = self.search.as_deref().map(str::trim).filter(|search| !search.is_empty());

		request
			.with_query_opt("search", search)
			.with_query("ordering", self.ordering.as_str())
			.with_query_opt("page", self.page.map(|page| page.to_string()))
			.with_query_opt("limit", self.limit.map(|limit| limit.to_string()))
	}
}

fn bill_path(id: BillId) -> String {
	format!("{PURCHASE_BILLS_PATH}{id}/")
}

fn bill_edit_path(id: BillId) -> String {
	format!("{PURCHASE_BILLS_PATH}{id}/edit/")
}

impl<T> SessionGateway<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists purchase bills.
	pub async fn list_purchase_bills(&self, query: &BillQuery) -> Result<Page<PurchaseBill>> {
		self.send_json(query.apply(ApiRequest::get(PURCHASE_BILLS_PATH))).await
	}

	/// The five most recent purchase bills.
	pub async fn recent_purchase_bills(&self) -> Result<Page<PurchaseBill>> {
		self.list_purchase_bills(&BillQuery::default().with_limit(RECENT_LIMIT)).await
	}

	/// The five most recent sales invoices.
	pub async fn recent_sales_invoices(&self) -> Result<Page<SalesInvoice>> {
		let request = ApiRequest::get(SALES_INVOICES_PATH)
			.with_query("ordering", "-invoice_date")
			.with_query("limit", RECENT_LIMIT.to_string());

		self.send_json(request).await
	}

	/// Fetches one purchase bill.
	pub async fn purchase_bill(&self, id: BillId) -> Result<PurchaseBill> {
		self.send_json(ApiRequest::get(bill_path(id))).await
	}

	/// Recomputes totals, validates, and creates a purchase bill.
	pub async fn create_purchase_bill(&self, draft: &PurchaseBillDraft) -> Result<PurchaseBill> {
		let payload = draft.prepared()?;

		self.send_json(ApiRequest::post_json(PURCHASE_BILLS_PATH, &payload)?).await
	}

	/// Recomputes totals, validates, and replaces a purchase bill.
	pub async fn update_purchase_bill(
		&self,
		id: BillId,
		draft: &PurchaseBillDraft,
	) -> Result<PurchaseBill> {
		let payload = draft.prepared()?;

		self.send_json(ApiRequest::put_json(bill_edit_path(id), &payload)?).await
	}

	/// Deletes a purchase bill.
	pub async fn delete_purchase_bill(&self, id: BillId) -> Result<()> {
		self.send(ApiRequest::delete(bill_edit_path(id))).await?.error_for_status()?;

		Ok(())
	}

	/// Uploads a CSV of purchase bills as the multipart field `file`.
	///
	/// Returns the backend's import report verbatim.
	pub async fn upload_purchase_bills_csv(
		&self,
		file_name: impl Into<String>,
		bytes: impl Into<Vec<u8>>,
	) -> Result<serde_json::Value> {
		let upload = Upload {
			field: "file".into(),
			file_name: file_name.into(),
			content_type: "text/csv".into(),
			bytes: bytes.into(),
		};

		self.send_value(ApiRequest::upload(UPLOAD_PURCHASE_BILLS_CSV_PATH, upload)).await
	}
}
