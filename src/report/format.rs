use chrono::NaiveDate;

/// Render a seconds value reported by GA4 as `M:SS`.
///
/// Minutes are not padded and may exceed 59. Anything that does not parse as a
/// finite number, or whose magnitude does not fit in an `i128`, renders as
/// `0:00`; this never fails.
pub fn format_duration(raw: &str) -> String {
    let Ok(value) = raw.trim().parse::<f64>() else {
        return "0:00".to_string();
    };
    #[allow(clippy::cast_precision_loss)]
    let in_range = (i128::MIN as f64..i128::MAX as f64).contains(&value);
    if !in_range {
        return "0:00".to_string();
    }
    #[allow(clippy::cast_possible_truncation)]
    let total = value.trunc() as i128;
    format!("{}:{:02}", total.div_euclid(60), total.rem_euclid(60))
}

/// Render a GA4 `date` dimension (`YYYYMMDD`) as an axis label like `Mar 05`.
///
/// Returns the input unchanged when it is not a valid date.
pub fn format_date_label(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .map_or_else(|_| raw.to_string(), |date| date.format("%b %d").to_string())
}
