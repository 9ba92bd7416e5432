//! String formatting utilities.

use rust_decimal::Decimal;

/// Formats a package price. Zero-priced packages read as "Free".
pub fn format_price(price: Decimal) -> String {
	if price.is_zero() {
		"Free".to_string()
	} else {
		format!("${:.2}", price.round_dp(2))
	}
}

/// Formats a delivery time given in days.
pub fn format_delivery_time(days: u32) -> String {
	match days {
		1 => "1 day".to_string(),
		n => format!("{} days", n),
	}
}

/// Shortens text to at most `max_chars` characters for list previews,
/// collapsing newlines and appending an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
	let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
	if single_line.chars().count() <= max_chars {
		return single_line;
	}

	let cut: String = single_line.chars().take(max_chars.saturating_sub(1)).collect();
	format!("{}…", cut.trim_end())
}
