//! Display formatting for prices and market caps.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Format a USD price the way the dashboard renders it: sub-cent prices
/// keep eight decimal places, anything larger is rounded to two places
/// (trailing zeros dropped) with thousands separators.
pub fn format_price(price: Decimal) -> String {
    let cent = Decimal::new(1, 2);
    if price < cent {
        format!("{:.8}", price)
    } else {
        group_thousands(price.round_dp(2).normalize())
    }
}

fn group_thousands(value: Decimal) -> String {
    let rendered = value.to_string();
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (rendered, None),
    };

    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && *c != '-' && digits[i - 1] != '-' && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}
