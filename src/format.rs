//! Display formatting for amounts and dates.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::billing::round_currency;
use crate::config::DeskConfig;

/// `symbol` + amount with thousands separators and two decimals,
/// e.g. `$15,000.00` or `-$5.50`.
pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    let mut rounded = round_currency(amount);
    rounded.rescale(2);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().to_string();
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{symbol}{grouped}.{cents}")
}

/// [`format_currency`] with the configured currency symbol.
pub fn format_money(amount: Decimal, config: &DeskConfig) -> String {
    format_currency(amount, &config.currency_symbol)
}

/// `Jun 15, 2023`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `2023-06-15`.
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
