use serde::{Deserialize, Serialize};

const MAX_DECIMALS: u32 = 6;

/// How credit amounts are displayed. Amounts are stored as integer minor
/// units, `decimals` says how many of those digits sit after the separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditFormat {
    pub decimals: u32,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub unit: Option<String>,
}

impl Default for CreditFormat {
    fn default() -> Self {
        Self {
            decimals: 2,
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            unit: Some("credits".to_string()),
        }
    }
}

/// Format an amount of credits given in minor units.
pub fn format_credits(amount_minor: i64, format: &CreditFormat) -> String {
    let decimals = format.decimals.min(MAX_DECIMALS);
    let scale = 10u64.pow(decimals);
    let magnitude = amount_minor.unsigned_abs();

    let whole = group_digits(magnitude / scale, &format.thousands_separator);
    let mut out = String::new();
    if amount_minor < 0 {
        out.push('-');
    }
    out.push_str(&whole);
    if decimals > 0 {
        out.push_str(&format.decimal_separator);
        out.push_str(&format!(
            "{:0width$}",
            magnitude % scale,
            width = decimals as usize
        ));
    }
    if let Some(unit) = format.unit.as_deref().filter(|u| !u.is_empty()) {
        out.push(' ');
        out.push_str(unit);
    }
    out
}

pub fn format_percentage(value: u8) -> String {
    format!("{}%", value)
}

fn group_digits(value: u64, separator: &str) -> String {
    let digits = value.to_string();
    if separator.is_empty() {
        return digits;
    }

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format() {
        let format = CreditFormat::default();
        assert_eq!(format_credits(123456, &format), "1,234.56 credits");
        assert_eq!(format_credits(5, &format), "0.05 credits");
        assert_eq!(format_credits(0, &format), "0.00 credits");
    }

    #[test]
    fn test_negative_and_large_amounts() {
        let format = CreditFormat::default();
        assert_eq!(format_credits(-250, &format), "-2.50 credits");
        assert_eq!(
            format_credits(i64::MIN, &format),
            "-92,233,720,368,547,758.08 credits"
        );
    }

    #[test]
    fn test_custom_separators() {
        let format = CreditFormat {
            decimals: 0,
            thousands_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
            unit: None,
        };
        assert_eq!(format_credits(1_000_000, &format), "1.000.000");

        let format = CreditFormat {
            decimals: 3,
            thousands_separator: String::new(),
            decimal_separator: ",".to_string(),
            unit: Some("cr".to_string()),
        };
        assert_eq!(format_credits(1_234_567, &format), "1234,567 cr");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(format_percentage(0), "0%");
        assert_eq!(format_percentage(50), "50%");
    }
}
