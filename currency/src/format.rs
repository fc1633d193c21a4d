//! Amount formatting with thousands grouping.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Display precision is capped here; no currency convention needs more.
const MAX_DECIMALS: u32 = 9;

/// Render an amount as `symbol` + grouped number with the given number of
/// decimal places, e.g. `format_amount(dec!(13000), "KSh", 0)` → `KSh13,000`.
/// Requests for more than [`MAX_DECIMALS`] places are clamped.
pub fn format_amount(amount: Decimal, symbol: &str, decimals: u32) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let rounded =
        amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();
    let integer = abs.trunc();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(symbol);
    out.push_str(&group_thousands(&integer.to_i128().unwrap_or(0).to_string()));

    if decimals > 0 {
        let scale = Decimal::from(10u64.pow(decimals));
        let fraction = ((abs - integer) * scale).round().to_u64().unwrap_or(0);
        out.push('.');
        out.push_str(&format!("{fraction:0width$}", width = decimals as usize));
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
