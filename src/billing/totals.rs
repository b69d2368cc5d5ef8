//! Line and bill totals for purchase drafts.

/// Amount of one line: `quantity × price − discount + tax`.
///
/// Non-finite inputs (what a blank or non-numeric field parses to) count as zero.
pub fn line_amount(quantity: f64, price: f64, discount: f64, tax: f64) -> f64 {
	finite(quantity) * finite(price) - finite(discount) + finite(tax)
}

/// Sum of line amounts.
pub fn bill_total<I>(amounts: I) -> f64
where
	I: IntoIterator<Item = f64>,
{
	amounts.into_iter().map(finite).sum()
}

/// Renders an amount with exactly two decimals, the way the backend stores it.
pub fn format_amount(amount: f64) -> String {
	format!("{:.2}", finite(amount))
}

/// Parses a form input, treating blank or malformed text as zero.
pub fn parse_amount(input: &str) -> f64 {
	input.trim().parse::<f64>().map(finite).unwrap_or(0.)
}

fn finite(value: f64) -> f64 {
	if value.is_finite() { value } else { 0. }
}
