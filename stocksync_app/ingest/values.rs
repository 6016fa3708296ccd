//! Lenient numeric parsing for spreadsheet exports.

/// Quantity cell: thousands separators stripped, rounded to the nearest
/// integer. Blank or non numeric cells count as 0.
pub fn parse_quantity(raw: &str) -> i64 {
    leading_number(&strip_separators(raw)).round() as i64
}

/// Price cell: like quantities, but a decimal comma is accepted.
pub fn parse_price(raw: &str) -> f64 {
    leading_number(&strip_separators(raw).replace(',', "."))
}

/// Two decimal rendering used for every stored price. Never prints `-0.00`.
pub fn format_price(value: f64) -> String {
    let cents = (value * 100.0).round() / 100.0;
    if cents == 0.0 {
        return "0.00".to_string();
    }
    format!("{cents:.2}")
}

fn strip_separators(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'')
        .collect()
}

/// Parses the longest numeric prefix of `s` (`12abc` is 12, `abc` is 0).
fn leading_number(s: &str) -> f64 {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > end + 1 || has_digits {
            has_digits |= frac_end > end + 1;
            end = frac_end;
        }
    }
    if !has_digits {
        return 0.0;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("4"), 4);
        assert_eq!(parse_quantity(" 1'200 "), 1200);
        assert_eq!(parse_quantity("1 200"), 1200);
        assert_eq!(parse_quantity("2.5"), 3);
        assert_eq!(parse_quantity("2.4"), 2);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("n/a"), 0);
        assert_eq!(parse_quantity("7pcs"), 7);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("199.90"), 199.9);
        assert_eq!(parse_price("59,00"), 59.0);
        assert_eq!(parse_price("1'299,5"), 1299.5);
        assert_eq!(parse_price(".5"), 0.5);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("-"), 0.0);
        assert_eq!(parse_price("1e2"), 100.0);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(199.9), "199.90");
        assert_eq!(format_price(0.0), "0.00");
        assert_eq!(format_price(-0.001), "0.00");
        assert_eq!(format_price(10.006), "10.01");
        assert_eq!(format_price(-3.5), "-3.50");
    }
}
