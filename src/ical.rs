//! iCalendar holiday feeds.
//! 
//! MIT License
//! 
//! Copyright (c) 2026 66f94eae
//! 
//! Permission is hereby granted, free of charge, to any person obtaining a copy
//! of this software and associated documentation files (the "Software"), to deal
//! in the Software without restriction, including without limitation the rights
//! to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//! copies of the Software, and to permit persons to whom the Software is
//! furnished to do so, subject to the following conditions:
//! 
//! The above copyright notice and this permission notice shall be included in all
//! copies or substantial portions of the Software.
//! 
//! THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//! IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//! FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//! AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//! LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//! OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//! SOFTWARE.

use std::{fs::File, io::{BufRead, BufReader, Cursor}};

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use ical::property::Property;

use crate::{
    calendar::HolidaySet,
    error::{Error, Result},
};

/// iCalendar property key for event start time
const KEY_DTSTART: &str = "DTSTART";
/// iCalendar property key for event end time
const KEY_DTEND: &str = "DTEND";
/// iCalendar property key for event summary
const KEY_SUMMARY: &str = "SUMMARY";

/// iCalendar date format: YYYYMMDD
const DATE_FMT: &str = "%Y%m%d";
/// iCalendar datetime format: YYYYMMDDTHHMMSS
const DT_FMT: &str = "%Y%m%dT%H%M%S";

/// Longest span a single event may mark as holidays
const MAX_EVENT_DAYS: u64 = 366;

/// Start or end of an event reduced to a calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventDate {
    /// `VALUE=DATE`, all-day
    AllDay(NaiveDate),
    /// Timed value, converted to the date it falls on
    Timed(NaiveDate),
}

impl EventDate {
    fn date(self) -> NaiveDate {
        match self {
            EventDate::AllDay(d) | EventDate::Timed(d) => d,
        }
    }
}

/// A VEVENT reduced to the dates it covers
#[derive(Debug, Default)]
struct Event {
    summary: Option<String>,
    start: Option<EventDate>,
    end: Option<EventDate>,
}

impl Event {
    /// Dates covered by the event
    ///
    /// All-day events cover `[DTSTART, DTEND)` (a single day without DTEND),
    /// timed events cover the date they start on.
    fn dates(&self) -> Vec<NaiveDate> {
        match (self.start, self.end) {
            (Some(EventDate::AllDay(start)), Some(EventDate::AllDay(end))) if end > start => {
                let mut dates = Vec::new();
                let mut current = start;
                while current < end && (dates.len() as u64) < MAX_EVENT_DAYS {
                    dates.push(current);
                    match current.checked_add_days(Days::new(1)) {
                        Some(next) => current = next,
                        None => break,
                    }
                }
                dates
            }
            (Some(start), _) => vec![start.date()],
            (None, _) => Vec::new(),
        }
    }
}

/// Reads every event date of an iCalendar feed as a holiday
///
/// `uri` is fetched over HTTP when it starts with `http`, and read from the
/// local file system otherwise.
pub async fn read_holidays(client: &reqwest::Client, uri: &str) -> Result<HolidaySet> {
    let events = if uri.starts_with("http") {
        let bytes = client.get(uri).send().await?.error_for_status()?.bytes().await?;
        parse_calendar(Cursor::new(bytes))?
    } else {
        parse_calendar(BufReader::new(File::open(uri)?))?
    };

    let mut holidays = HolidaySet::new();
    for event in &events {
        let dates = event.dates();
        tracing::debug!(
            summary = event.summary.as_deref().unwrap_or("NO_SUMMARY"),
            days = dates.len(),
            "calendar event"
        );
        holidays.extend(dates);
    }
    Ok(holidays)
}

/// Parses iCalendar data from a reader
fn parse_calendar<T: BufRead>(reader: T) -> Result<Vec<Event>> {
    let mut events = Vec::new();

    for calendar in ical::IcalParser::new(reader) {
        let cal = calendar.map_err(|e| Error::Calendar { message: format!("{e:?}") })?;
        for event in cal.events {
            let mut parsed = Event::default();

            for prop in &event.properties {
                match prop.name.as_str() {
                    KEY_SUMMARY => parsed.summary = prop.value.clone(),
                    KEY_DTSTART => match parse_date(prop, true) {
                        Ok(date) => parsed.start = Some(date),
                        Err(e) => tracing::warn!(value = ?prop.value, "ignoring DTSTART: {e}"),
                    },
                    KEY_DTEND => match parse_date(prop, false) {
                        Ok(date) => parsed.end = Some(date),
                        Err(e) => tracing::warn!(value = ?prop.value, "ignoring DTEND: {e}"),
                    },
                    _ => {}
                }
            }

            events.push(parsed);
        }
    }

    Ok(events)
}

/// Parses an iCalendar date or datetime into the calendar date it denotes
///
/// # Supported Formats
/// * YYYYMMDD (all-day events)
/// * YYYYMMDDTHHMMSS (floating local time)
/// * YYYYMMDDTHHMMSSZ (UTC, converted to the host's local date)
/// * YYYYMMDDTHHMMSS with TZID parameter (converted to the host's local date)
fn parse_date(prop: &Property, is_dt_start: bool) -> std::result::Result<EventDate, &'static str> {
    let Some(value) = &prop.value else {
        return Err("Missing datetime value");
    };
    let value = value.trim().to_uppercase();

    if value.len() == 8 {
        return NaiveDate::parse_from_str(&value, DATE_FMT)
            .map(EventDate::AllDay)
            .map_err(|_| "Invalid date format");
    }

    if let Some(utc) = value.strip_suffix('Z') {
        let dt = NaiveDateTime::parse_from_str(utc, DT_FMT).map_err(|_| "Invalid datetime format")?;
        let local = Utc.from_utc_datetime(&dt).with_timezone(&chrono::Local);
        return Ok(EventDate::Timed(local.date_naive()));
    }

    let dt = NaiveDateTime::parse_from_str(&value, DT_FMT).map_err(|_| "Invalid datetime format")?;

    let tzid = prop.params.as_ref().and_then(|params| {
        params
            .iter()
            .find(|(name, field)| name.eq_ignore_ascii_case("TZID") && !field.is_empty())
            .map(|(_, field)| field[0].clone())
    });
    let Some(tzid) = tzid else {
        return Ok(EventDate::Timed(dt.date()));
    };

    let tz = tzid.parse::<Tz>().map_err(|_| "Invalid timezone identifier")?;
    let zoned: DateTime<Tz> = match tz.from_local_datetime(&dt) {
        chrono::offset::LocalResult::Single(zoned) => zoned,
        chrono::offset::LocalResult::Ambiguous(early, later) => {
            if is_dt_start { early } else { later }
        }
        chrono::offset::LocalResult::None => return Err("Invalid datetime for timezone"),
    };
    Ok(EventDate::Timed(zoned.with_timezone(&chrono::Local).date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//qtrack//test//EN\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Christmas\r\n\
DTSTART;VALUE=DATE:20241225\r\n\
DTEND;VALUE=DATE:20241227\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Labour Day\r\n\
DTSTART;VALUE=DATE:20240501\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Company offsite\r\n\
DTSTART:20240612T090000\r\n\
DTEND:20240612T170000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Broken\r\n\
DTSTART:not-a-date\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn all_day_events_cover_their_span() {
        let events = parse_calendar(Cursor::new(FEED)).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].dates(), vec![ymd(2024, 12, 25), ymd(2024, 12, 26)]);
        assert_eq!(events[1].dates(), vec![ymd(2024, 5, 1)]);
    }

    #[test]
    fn timed_events_mark_their_start_date() {
        let events = parse_calendar(Cursor::new(FEED)).unwrap();
        assert_eq!(events[2].dates(), vec![ymd(2024, 6, 12)]);
        assert!(events[3].dates().is_empty());
    }

    #[tokio::test]
    async fn reads_holidays_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holidays.ics");
        std::fs::write(&path, FEED).unwrap();

        let holidays = read_holidays(&reqwest::Client::new(), path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(holidays.len(), 4);
        assert!(holidays.contains(ymd(2024, 12, 26)));
        assert!(!holidays.contains(ymd(2024, 12, 27)));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let result = read_holidays(&reqwest::Client::new(), "/nonexistent/holidays.ics").await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
