//! Display formatting for prices, market caps and percent changes

/// Format a USD price
///
/// - below $1: 6 decimals (`$0.000003`)
/// - below $1000: 2 decimals (`$850.00`)
/// - otherwise: thousands-grouped, 2 decimals (`$45,230.70`)
pub fn format_price(price: f64) -> String {
    if price < 1.0 {
        format!("${:.6}", price)
    } else if price < 1000.0 {
        format!("${:.2}", price)
    } else {
        format!("${}", group_thousands(&format!("{:.2}", price)))
    }
}

/// Format a large USD magnitude with a T/B/M suffix
pub fn format_market_cap(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else {
        format!("${:.2}M", value / 1e6)
    }
}

/// Format a signed percent change (`+1.23%`, `-4.20%`)
pub fn format_change(change_pct: f64) -> String {
    format!("{:+.2}%", change_pct)
}

/// Insert commas into the integer part of a formatted decimal
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
