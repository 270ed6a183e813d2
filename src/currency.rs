//! Currency display prefixes used in front of every monetary value.

/// Known currency codes and the prefix printed before their amounts.
const CURRENCY_PREFIXES: &[(&str, &str)] = &[
    ("USD", "USD $"),
    ("EUR", "EUR €"),
    ("GBP", "GBP £"),
    ("JPY", "JPY ¥"),
    ("CNY", "CNY ¥"),
    ("INR", "INR ₹"),
    ("KRW", "KRW ₩"),
    ("BRL", "BRL R$"),
    ("SGD", "SGD$"),
    ("CZK", "CZK Kč"),
];

/// Returns the display prefix for `code`, or an empty string for unknown codes.
///
/// Lookups are exact: `"usd"` is not the same code as `"USD"`.
pub fn currency_prefix(code: &str) -> &'static str {
    CURRENCY_PREFIXES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, prefix)| *prefix)
        .unwrap_or("")
}

/// Formats `value` with exactly two fraction digits behind the currency prefix.
pub fn format_money(code: &str, value: f64) -> String {
    format!("{}{:.2}", currency_prefix(code), value)
}
