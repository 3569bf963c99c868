// src/services/format.rs

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}

/// `$1,234.50`, `$-87.10`
pub fn format_money(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("${}.{}", group_thousands(int_part), frac_part)
}

/// Shortest decimal form with grouped thousands and at least one fractional
/// digit: `12.5%`, `1,250.0%`.
pub fn format_percent(value: f64) -> String {
    let plain = format!("{}", value);
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), frac_part.to_string()),
        None => (plain.clone(), "0".to_string()),
    };
    format!("{}.{}%", group_thousands(&int_part), frac_part)
}
