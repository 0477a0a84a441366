//! Numeric token normalization shared by every extractor.

re!(re_neg_tail, r"-(\d+)$");
re!(re_digit_run, r"\d+");

/// Parse a currency-like token into a signed won amount.
///
/// Handles comma and period thousands separators, a trailing tax-marker
/// letter, `#`/`W`/backslash currency noise and the `원` suffix. A negative
/// amount is recognized only as a trailing `-digits` run that is not itself
/// preceded by a digit, so phone-number-shaped text ("02-201-0700") never
/// parses as negative.
///
/// Returns `None` when the token carries no digits at all.
pub fn parse_price(text: &str) -> Option<i64> {
    let mut s: String = text.replace(' ', "");
    if s.ends_with(['T', 't', 'A', 'a']) {
        s.pop();
    }
    s = s.replace(['#', 'W', '\\'], "");
    s = collapse_thousands_dots(&s);
    s = s.replace(',', "").replace('원', "");

    if let Some(m) = re_neg_tail().find(&s) {
        let preceded_by_digit = s[..m.start()]
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_digit());
        if !preceded_by_digit {
            return s[m.start() + 1..m.end()].parse::<i64>().ok().map(|v| -v);
        }
    }

    let m = re_digit_run().find(&s)?;
    m.as_str().parse::<i64>().ok()
}

/// Collapse periods used as thousands separators: "15.800" → "15800".
/// A period directly followed by exactly three digits (and no fourth) joins
/// the groups; won amounts have no fractional part, so a true decimal point
/// never occurs here.
fn collapse_thousands_dots(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for i in 0..chars.len() {
        let is_separator = chars[i] == '.'
            && chars.len() - i > 3
            && chars[i + 1].is_ascii_digit()
            && chars[i + 2].is_ascii_digit()
            && chars[i + 3].is_ascii_digit()
            && !chars.get(i + 4).is_some_and(|c| c.is_ascii_digit());
        if !is_separator {
            out.push(chars[i]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_won(v: i64) -> String {
        let digits = v.abs().to_string();
        let mut grouped = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        let sign = if v < 0 { "-" } else { "" };
        format!("{sign}{grouped}원")
    }

    #[test]
    fn plain_and_comma_amounts() {
        assert_eq!(parse_price("3600"), Some(3600));
        assert_eq!(parse_price("3,600"), Some(3600));
        assert_eq!(parse_price("1,234,567"), Some(1234567));
    }

    #[test]
    fn period_as_thousands_separator() {
        assert_eq!(parse_price("15.800"), Some(15800));
        assert_eq!(parse_price("1.234.567"), Some(1234567));
    }

    #[test]
    fn currency_noise_is_stripped() {
        assert_eq!(parse_price("#1,200"), Some(1200));
        assert_eq!(parse_price("W5,000"), Some(5000));
        assert_eq!(parse_price("12,000원"), Some(12000));
        assert_eq!(parse_price("5,000 원"), Some(5000));
    }

    #[test]
    fn trailing_tax_marker_is_dropped() {
        assert_eq!(parse_price("3,600T"), Some(3600));
        assert_eq!(parse_price("1,500t"), Some(1500));
    }

    #[test]
    fn negative_suffix_amount() {
        assert_eq!(parse_price("-40,500"), Some(-40500));
        assert_eq!(parse_price("할인-3,100"), Some(-3100));
    }

    #[test]
    fn phone_number_is_not_negative() {
        // "02-201-0700" must not be read as a negative price.
        assert_eq!(parse_price("02-201-0700"), Some(2));
    }

    #[test]
    fn no_digits_is_none() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("합계"), None);
    }

    #[test]
    fn round_trip_with_separators_and_suffix() {
        for v in [0i64, 1, 99, 100, 999, 1_000, 12_000, 94_500, 1_234_567, 9_999_999] {
            assert_eq!(parse_price(&format_won(v)), Some(v), "value {v}");
        }
    }

    #[test]
    fn round_trip_leading_minus() {
        assert_eq!(parse_price("-40500"), Some(-40500));
    }
}
