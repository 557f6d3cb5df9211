//! Numeric formatting for VCF fields.

/// Number of significant digits used for BAF, LRR and GC values
pub const METRIC_DIGITS: usize = 4;

/// Format a float with a fixed number of significant digits, `%g` style.
///
/// Uses plain notation when the decimal exponent lies in `[-4, digits)` and
/// scientific notation (`1.234e+05`) otherwise. Trailing zeros in the
/// fraction are removed.
///
/// # Examples
///
/// ```
/// use array_vcf::utils::format::format_significant;
///
/// assert_eq!(format_significant(0.5, 4), "0.5");
/// assert_eq!(format_significant(-0.01234567, 4), "-0.01235");
/// assert_eq!(format_significant(123456.0, 4), "1.235e+05");
/// ```
#[must_use]
pub fn format_significant(value: f64, digits: usize) -> String {
    let digits = digits.max(1);

    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    // Scientific rendering fixes the rounded exponent
    let scientific = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    let precision = i32::try_from(digits).unwrap_or(i32::MAX);
    if exponent < -4 || exponent >= precision {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = usize::try_from(precision - 1 - exponent).unwrap_or(0);
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

/// Format a per-sample metric or GC value
#[must_use]
pub fn format_metric(value: f64) -> String {
    format_significant(value, METRIC_DIGITS)
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
