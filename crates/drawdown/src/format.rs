/// Insert thousands separators into a whole-dollar amount
fn group_thousands(dollars: u64) -> String {
    let digits = dollars.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn sign(value: f64) -> &'static str {
    if value < 0.0 { "-" } else { "" }
}

/// Format a currency value
pub fn format_currency(value: f64) -> String {
    let cents_total = (value.abs() * 100.0).round() as u64;
    format!(
        "{}${}.{:02}",
        sign(value),
        group_thousands(cents_total / 100),
        cents_total % 100
    )
}

/// Format a currency value without cents (for table columns)
pub fn format_currency_short(value: f64) -> String {
    format!(
        "{}${}",
        sign(value),
        group_thousands(value.abs().round() as u64)
    )
}

/// Format a fraction as a percentage
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Format a currency value in compact form (e.g., $2.1M, $450K, $50)
pub fn format_compact_currency(value: f64) -> String {
    let abs_value = value.abs();
    let sign = sign(value);

    if abs_value >= 1_000_000.0 {
        format!("{}${:.1}M", sign, abs_value / 1_000_000.0)
    } else if abs_value >= 1_000.0 {
        format!("{}${:.0}K", sign, abs_value / 1_000.0)
    } else {
        format!("{}${:.0}", sign, abs_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(-2_500_000.0), "-$2,500,000.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
    }

    #[test]
    fn test_format_currency_short() {
        assert_eq!(format_currency_short(123.4), "$123");
        assert_eq!(format_currency_short(1_000_000.0), "$1,000,000");
        assert_eq!(format_currency_short(-45_678.9), "-$45,679");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.125), "12.50%");
        assert_eq!(format_percentage(1.0), "100.00%");
    }

    #[test]
    fn test_format_compact_currency() {
        assert_eq!(format_compact_currency(2_100_000.0), "$2.1M");
        assert_eq!(format_compact_currency(450_000.0), "$450K");
        assert_eq!(format_compact_currency(50.0), "$50");
        assert_eq!(format_compact_currency(-1_500.0), "-$2K");
    }
}
