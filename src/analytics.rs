//! Dashboard metrics, summary reports, CSV exports, and the sales-vs-purchases series.

// self
use crate::{
	_prelude::*,
	gateway::SessionGateway,
	http::{ApiRequest, ApiTransport},
	lenient,
};

/// Headline dashboard endpoint.
pub const DASHBOARD_PATH: &str = "analytics/dashboard/";

type Extra = serde_json::Map<String, serde_json::Value>;

/// Headline figures shown on the dashboard cards.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DashboardMetrics {
	/// Sales total.
	#[serde(default, deserialize_with = "lenient::decimal_opt")]
	pub total_sales: Option<f64>,
	/// Purchases total.
	#[serde(default, deserialize_with = "lenient::decimal_opt")]
	pub total_purchases: Option<f64>,
	/// Stock valuation.
	#[serde(default, deserialize_with = "lenient::decimal_opt")]
	pub total_inventory_value: Option<f64>,
	/// Products under their low-stock threshold.
	#[serde(default)]
	pub low_stock_count: Option<u64>,
	/// GST collected minus GST paid.
	#[serde(default, deserialize_with = "lenient::decimal_opt")]
	pub gst_payable: Option<f64>,
	/// Chart series and other fields, passed through untouched.
	#[serde(flatten)]
	pub extra: Extra,
}

/// GST collected and paid over a period.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GstSummary {
	/// GST collected on sales.
	#[serde(default, deserialize_with = "lenient::decimal_opt")]
	pub gst_collected: Option<f64>,
	/// GST paid on purchases.
	#[serde(default, deserialize_with = "lenient::decimal_opt")]
	pub gst_paid: Option<f64>,
	/// Net GST payable.
	#[serde(default, deserialize_with = "lenient::decimal_opt")]
	pub gst_payable: Option<f64>,
	/// Per-product breakdown rows.
	#[serde(default)]
	pub gst_by_product: Vec<serde_json::Value>,
	/// Per-month breakdown rows.
	#[serde(default)]
	pub gst_by_month: Vec<serde_json::Value>,
	/// Remaining fields.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Purchases over a period.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PurchaseSummary {
	/// Purchases total.
	#[serde(default, deserialize_with = "lenient::decimal_opt")]
	pub total_purchases: Option<f64>,
	/// Per-vendor breakdown rows.
	#[serde(default)]
	pub purchases_by_vendor: Vec<serde_json::Value>,
	/// Daily purchase totals.
	#[serde(default)]
	pub purchases_by_date: Vec<PurchasesOnDate>,
	/// Remaining fields.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Sales over a period.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SalesSummary {
	/// Sales total.
	#[serde(default, deserialize_with = "lenient::decimal_opt")]
	pub total_sales: Option<f64>,
	/// Per-product breakdown rows.
	#[serde(default)]
	pub sales_by_product: Vec<serde_json::Value>,
	/// Per-customer breakdown rows.
	#[serde(default)]
	pub sales_by_customer: Vec<serde_json::Value>,
	/// Daily sales totals.
	#[serde(default)]
	pub sales_by_date: Vec<SalesOnDate>,
	/// Remaining fields.
	#[serde(flatten)]
	pub extra: Extra,
}

/// One day of sales.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SalesOnDate {
	/// ISO date (`YYYY-MM-DD`).
	pub date: String,
	/// Sales on that day.
	#[serde(default, deserialize_with = "lenient::decimal")]
	pub total_sales: f64,
}

/// One day of purchases.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PurchasesOnDate {
	/// ISO date (`YYYY-MM-DD`).
	pub date: String,
	/// Purchases on that day.
	#[serde(default, deserialize_with = "lenient::decimal")]
	pub total_purchases: f64,
}

/// Sales and purchases on one day, as charted side by side.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyComparison {
	/// ISO date (`YYYY-MM-DD`).
	pub date: String,
	/// Sales on that day, zero when none were reported.
	pub sales: f64,
	/// Purchases on that day, zero when none were reported.
	pub purchases: f64,
}

/// Joins the two daily series on date.
///
/// The result covers every date present in either series in ascending order. A date missing
/// from one side reads as zero there; a date repeated within one series keeps its last value.
pub fn merge_daily_series(
	sales: &[SalesOnDate],
	purchases: &[PurchasesOnDate],
) -> Vec<DailyComparison> {
	let mut days = BTreeMap::<&str, (f64, f64)>::new();

	for day in sales {
		days.entry(day.date.as_str()).or_default().0 = day.total_sales;
	}
	for day in purchases {
		days.entry(day.date.as_str()).or_default().1 = day.total_purchases;
	}

	days.into_iter()
		.map(|(date, (sales, purchases))| DailyComparison {
			date: date.to_owned(),
			sales,
			purchases,
		})
		.collect()
}

/// Optional `date_from`/`date_to` bounds for a summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
	/// First day included.
	pub from: Option<Date>,
	/// Last day included.
	pub to: Option<Date>,
}
impl DateRange {
	/// Range with both bounds set.
	pub fn between(from: Date, to: Date) -> Self {
		Self { from: Some(from), to: Some(to) }
	}

	fn apply(&self, request: ApiRequest) -> ApiRequest {
		request
			.with_query_opt("date_from", self.from.map(lenient::format_date))
			.with_query_opt("date_to", self.to.map(lenient::format_date))
	}
}

/// Summary reports offered by the analytics endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SummaryKind {
	/// Stock levels and valuation.
	Inventory,
	/// GST collected and paid.
	Gst,
	/// Purchases by vendor and day.
	Purchase,
	/// Sales by product, customer, and day.
	Sales,
}
impl SummaryKind {
	/// Endpoint path of the report.
	pub const fn path(self) -> &'static str {
		match self {
			Self::Inventory => "analytics/inventory-summary/",
			Self::Gst => "analytics/gst-summary/",
			Self::Purchase => "analytics/purchase-summary/",
			Self::Sales => "analytics/sales-summary/",
		}
	}

	/// File name a CSV export is saved under.
	pub const fn file_name(self) -> &'static str {
		match self {
			Self::Inventory => "inventory-summary.csv",
			Self::Gst => "gst-summary.csv",
			Self::Purchase => "purchase-summary.csv",
			Self::Sales => "sales-summary.csv",
		}
	}

	/// Whether the report honors a date range; the inventory report is a snapshot.
	pub const fn accepts_range(self) -> bool {
		!matches!(self, Self::Inventory)
	}

	fn request(self, range: &DateRange) -> ApiRequest {
		let request = ApiRequest::get(self.path());

		if self.accepts_range() { range.apply(request) } else { request }
	}
}

/// Downloaded CSV report.
#[derive(Clone, PartialEq, Eq)]
pub struct CsvExport {
	/// Suggested file name.
	pub file_name: &'static str,
	/// Raw CSV bytes.
	pub bytes: Vec<u8>,
}
impl Debug for CsvExport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CsvExport")
			.field("file_name", &self.file_name)
			.field("len", &self.bytes.len())
			.finish()
	}
}

impl<T> SessionGateway<T>
where
	T: ?Sized + ApiTransport,
{
	/// Fetches the dashboard headline figures.
	pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics> {
		self.send_json(ApiRequest::get(DASHBOARD_PATH)).await
	}

	/// Fetches the inventory report.
	pub async fn inventory_summary(&self) -> Result<serde_json::Value> {
		self.send_value(SummaryKind::Inventory.request(&DateRange::default())).await
	}

	/// Fetches the GST report.
	pub async fn gst_summary(&self, range: &DateRange) -> Result<GstSummary> {
		self.send_json(SummaryKind::Gst.request(range)).await
	}

	/// Fetches the purchase report.
	pub async fn purchase_summary(&self, range: &DateRange) -> Result<PurchaseSummary> {
		self.send_json(SummaryKind::Purchase.request(range)).await
	}

	/// Fetches the sales report.
	pub async fn sales_summary(&self, range: &DateRange) -> Result<SalesSummary> {
		self.send_json(SummaryKind::Sales.request(range)).await
	}

	/// Downloads a report as CSV (`export=csv`). The range is ignored for the inventory report.
	pub async fn export_summary_csv(
		&self,
		kind: SummaryKind,
		range: &DateRange,
	) -> Result<CsvExport> {
		let bytes = self.send_bytes(kind.request(range).with_query("export", "csv")).await?;

		Ok(CsvExport { file_name: kind.file_name(), bytes })
	}

	/// Fetches both summaries and merges their daily series.
	pub async fn sales_vs_purchases(&self, range: &DateRange) -> Result<Vec<DailyComparison>> {
		let sales = self.sales_summary(range).await?;
		let purchases = self.purchase_summary(range).await?;

		Ok(merge_daily_series(&sales.sales_by_date, &purchases.purchases_by_date))
	}
}
