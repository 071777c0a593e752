use chrono::{Days, NaiveDate};

/// Smallest accepted look-back.
pub const MIN_DAYS: i64 = 1;
/// Largest accepted look-back.
pub const MAX_DAYS: i64 = 365;

/// Inclusive reporting window of `days` calendar days ending on `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
}

impl DateWindow {
    /// Build the window ending on `today`.
    ///
    /// Returns `None` when `days` is outside `[MIN_DAYS, MAX_DAYS]`.
    pub fn ending(today: NaiveDate, days: i64) -> Option<Self> {
        if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
            return None;
        }
        let days = u32::try_from(days).ok()?;
        let start = today.checked_sub_days(Days::new(u64::from(days - 1)))?;
        Some(Self {
            start,
            end: today,
            days,
        })
    }

    /// `YYYY-MM-DD`, the format GA4 date ranges and the response both use.
    pub fn start_date(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_date(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}
