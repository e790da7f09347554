//! Date parsing for the explicit formats used by statement patterns.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ValueError;

/// Date layouts a pattern can declare for its `date` capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `MM-DD-YYYY`
    MonthDayYearDash,
    /// `MM/DD/YYYY`
    MonthDayYearSlash,
    /// `DD.MM.YYYY`
    DayMonthYearDot,
    /// `YYYY-MM-DD`
    Iso,
}

impl DateFormat {
    fn pattern(self) -> &'static str {
        match self {
            DateFormat::MonthDayYearDash => "%m-%d-%Y",
            DateFormat::MonthDayYearSlash => "%m/%d/%Y",
            DateFormat::DayMonthYearDot => "%d.%m.%Y",
            DateFormat::Iso => "%Y-%m-%d",
        }
    }
}

/// Parse a date at local midnight.
pub fn parse_date(text: &str, format: DateFormat) -> Result<NaiveDateTime, ValueError> {
    let date = NaiveDate::parse_from_str(text.trim(), format.pattern())
        .map_err(|_| ValueError::MalformedDate(text.to_string()))?;

    Ok(date.and_time(NaiveTime::MIN))
}

/// Parse a date with an `HH:MM` or `HH:MM:SS` time component.
pub fn parse_date_time(
    date: &str,
    time: &str,
    format: DateFormat,
) -> Result<NaiveDateTime, ValueError> {
    let day = parse_date(date, format)?;
    let time = time.trim();

    let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .map_err(|_| ValueError::MalformedDate(format!("{} {}", date, time)))?;

    Ok(day.date().and_time(time))
}
