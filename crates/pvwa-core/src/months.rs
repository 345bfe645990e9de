//! Calendar month ranges and month selection parsing

use crate::error::{ExportError, ExportResult};
use crate::listing::{RecordingQuery, query_all};
use chrono::{Datelike, Month, NaiveDate};

/// Closed `[from, to]` interval covering one calendar month, in epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub year: i32,
    pub month: Month,
    /// First second of the month, UTC
    pub from: i64,
    /// Last second of the month, UTC
    pub to: i64,
}

impl MonthRange {
    /// Compute the bounds of `month` in `year`
    pub fn new(year: i32, month: Month) -> ExportResult<Self> {
        let start = first_day(year, month.number_from_month())?;
        let next = match month {
            Month::December => first_day(year.saturating_add(1), 1)?,
            _ => first_day(year, month.succ().number_from_month())?,
        };

        let from = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let to = next.and_time(chrono::NaiveTime::MIN).and_utc().timestamp() - 1;

        Ok(Self {
            year,
            month,
            from,
            to,
        })
    }

    /// Listing query restricted to this month, sorted by name
    pub fn query(&self) -> RecordingQuery {
        query_all().between(self.from, self.to)
    }

    /// Month number, 1 for January
    pub fn number(&self) -> u32 {
        self.month.number_from_month()
    }
}

fn first_day(year: i32, month: u32) -> ExportResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .filter(|d| d.year() == year)
        .ok_or_else(|| ExportError::config(format!("year {} is out of range", year)))
}

/// Convert a month number into a [`Month`], rejecting anything outside 1..=12
pub fn month_from_number(number: u32) -> ExportResult<Month> {
    u8::try_from(number)
        .ok()
        .and_then(|n| Month::try_from(n).ok())
        .ok_or_else(|| ExportError::config("months must be between 1 and 12"))
}

/// Parse a month selection such as `"5,6,7"` or `"1-12"`
///
/// The range form is inclusive. Order is preserved for the list form.
pub fn parse_months(selection: &str) -> ExportResult<Vec<Month>> {
    let selection = selection.trim();
    if selection.is_empty() {
        return Err(ExportError::config("no months given"));
    }

    if selection.contains('-') {
        let parts: Vec<&str> = selection.split('-').collect();
        let [start, end] = parts.as_slice() else {
            return Err(ExportError::config(
                "invalid month range format. Use 'start-end' (e.g. '1-12')",
            ));
        };
        let start = parse_number(start, "start month")?;
        let end = parse_number(end, "end month")?;
        if start > end {
            return Err(ExportError::config(format!(
                "invalid month range {}-{}: start is after end",
                start, end
            )));
        }
        (start..=end).map(month_from_number).collect()
    } else {
        selection.split(',')
            .map(|part| parse_number(part, "month").and_then(month_from_number))
            .collect()
    }
}

fn parse_number(value: &str, what: &str) -> ExportResult<u32> {
    value
        .trim()
        .parse()
        .map_err(|e| ExportError::config(format!("invalid {} '{}': {}", what, value.trim(), e)))
}
