use chrono::NaiveDate;

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    // -0.004 rounds to zero and must not print as "-$0.00"
    let negative = val < 0.0 && cents != "0.00";
    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// An amount that was never entered reads as zero.
pub fn money_opt(val: Option<f64>) -> String {
    match val {
        Some(v) if v.is_finite() => money(v),
        _ => money(0.0),
    }
}

/// Income gets an explicit plus sign, expenses keep their minus.
pub fn signed_money(val: f64) -> String {
    let s = money(val);
    if s.starts_with('-') || s == "$0.00" {
        s
    } else {
        format!("+{s}")
    }
}

pub fn display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.10), "$42.10");
    }

    #[test]
    fn test_money_never_negative_zero() {
        assert_eq!(money(-0.0), "$0.00");
        assert_eq!(money(-0.004), "$0.00");
        assert_eq!(money(-0.005_1), "-$0.01");
    }

    #[test]
    fn test_money_opt_undefined_is_zero() {
        assert_eq!(money_opt(None), "$0.00");
        assert_eq!(money_opt(Some(f64::NAN)), "$0.00");
        assert_eq!(money_opt(Some(-12.5)), "-$12.50");
    }

    #[test]
    fn test_signed_money() {
        assert_eq!(signed_money(2500.0), "+$2,500.00");
        assert_eq!(signed_money(-3.99), "-$3.99");
        assert_eq!(signed_money(0.0), "$0.00");
    }

    #[test]
    fn test_display_date() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 9).unwrap();
        assert_eq!(display_date(d), "Oct 9, 2026");
    }
}
