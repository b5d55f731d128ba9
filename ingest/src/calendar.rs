//! Lenient parsing of the date and time strings found in scraped metadata.
//!
//! Accepts the shapes that show up in practice: RFC 3339 and RFC 2822
//! timestamps, ISO-like date times with `T` or a space, bare dates
//! (`2023-01-01`, `2023/1/1`, `20230101`, `01/02/2023` month first,
//! `Jan 1, 2023`, `1 January 2023`) and bare clock times in 24 or 12 hour
//! notation.

use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    macros::format_description,
    Date, OffsetDateTime, PrimitiveDateTime, Time,
};

/// What a calendar string turned out to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarValue {
    DateTime(PrimitiveDateTime),
    Date(Date),
    Time(Time),
}

impl CalendarValue {
    /// Time of day; a bare date is midnight.
    pub fn time(self) -> Time {
        match self {
            Self::DateTime(date_time) => date_time.time(),
            Self::Date(_) => Time::MIDNIGHT,
            Self::Time(time) => time,
        }
    }

    pub fn date(self) -> Option<Date> {
        match self {
            Self::DateTime(date_time) => Some(date_time.date()),
            Self::Date(date) => Some(date),
            Self::Time(_) => None,
        }
    }
}

pub fn parse(text: &str) -> Option<CalendarValue> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    parse_offset_date_time(text)
        .or_else(|| parse_date_time(text))
        .map(CalendarValue::DateTime)
        .or_else(|| parse_date(text).map(CalendarValue::Date))
        .or_else(|| parse_time(text).map(CalendarValue::Time))
}

/// Keeps the wall clock time as written, the offset is dropped.
fn parse_offset_date_time(text: &str) -> Option<PrimitiveDateTime> {
    OffsetDateTime::parse(text, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(text, &Rfc2822))
        .ok()
        .map(|date_time| PrimitiveDateTime::new(date_time.date(), date_time.time()))
}

fn parse_date_time(text: &str) -> Option<PrimitiveDateTime> {
    let formats = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
        format_description!("[year]/[month]/[day] [hour]:[minute]:[second]"),
        format_description!("[year]/[month]/[day] [hour]:[minute]"),
    ];

    formats
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(text, format).ok())
}

fn parse_date(text: &str) -> Option<Date> {
    let formats = [
        format_description!("[year]-[month padding:none]-[day padding:none]"),
        format_description!("[year]/[month padding:none]/[day padding:none]"),
        format_description!("[year].[month padding:none].[day padding:none]"),
        format_description!("[year][month][day]"),
        format_description!("[month padding:none]/[day padding:none]/[year]"),
        format_description!(
            "[month repr:short case_sensitive:false] [day padding:none], [year]"
        ),
        format_description!("[month repr:short case_sensitive:false] [day padding:none] [year]"),
        format_description!(
            "[month repr:long case_sensitive:false] [day padding:none], [year]"
        ),
        format_description!("[month repr:long case_sensitive:false] [day padding:none] [year]"),
        format_description!("[day padding:none] [month repr:short case_sensitive:false] [year]"),
        format_description!("[day padding:none] [month repr:long case_sensitive:false] [year]"),
    ];

    formats
        .iter()
        .find_map(|format| Date::parse(text, format).ok())
}

fn parse_time(text: &str) -> Option<Time> {
    let formats = [
        format_description!("[hour padding:none]:[minute padding:none]:[second].[subsecond]"),
        format_description!("[hour padding:none]:[minute padding:none]:[second]"),
        format_description!("[hour padding:none]:[minute padding:none]"),
        format_description!(
            "[hour repr:12 padding:none]:[minute]:[second] [period case_sensitive:false]"
        ),
        format_description!("[hour repr:12 padding:none]:[minute] [period case_sensitive:false]"),
        format_description!("[hour repr:12 padding:none][period case_sensitive:false]"),
    ];

    formats
        .iter()
        .find_map(|format| Time::parse(text, format).ok())
}
