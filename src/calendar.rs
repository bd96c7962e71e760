//! Weekday codes, workday sets and holiday sets.
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

use std::collections::{BTreeSet, HashSet};

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{
    de::{Error, SeqAccess, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

/// Day of the week with a fixed, host-independent numbering (Sunday = 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum WeekdayCode {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl WeekdayCode {
    /// All seven codes in numeric order
    pub const ALL: [WeekdayCode; 7] = [
        WeekdayCode::Sunday,
        WeekdayCode::Monday,
        WeekdayCode::Tuesday,
        WeekdayCode::Wednesday,
        WeekdayCode::Thursday,
        WeekdayCode::Friday,
        WeekdayCode::Saturday,
    ];

    /// Builds a code from its number, `None` outside 0-6
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Weekday of a calendar date
    pub fn of(date: impl Datelike) -> Self {
        date.weekday().into()
    }

    /// Short label used in reports
    pub fn label(self) -> &'static str {
        match self {
            WeekdayCode::Sunday => "Sun",
            WeekdayCode::Monday => "Mon",
            WeekdayCode::Tuesday => "Tue",
            WeekdayCode::Wednesday => "Wed",
            WeekdayCode::Thursday => "Thu",
            WeekdayCode::Friday => "Fri",
            WeekdayCode::Saturday => "Sat",
        }
    }
}

impl From<chrono::Weekday> for WeekdayCode {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Sun => WeekdayCode::Sunday,
            chrono::Weekday::Mon => WeekdayCode::Monday,
            chrono::Weekday::Tue => WeekdayCode::Tuesday,
            chrono::Weekday::Wed => WeekdayCode::Wednesday,
            chrono::Weekday::Thu => WeekdayCode::Thursday,
            chrono::Weekday::Fri => WeekdayCode::Friday,
            chrono::Weekday::Sat => WeekdayCode::Saturday,
        }
    }
}

/// Weekdays designated as work days
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkdaySet(BTreeSet<WeekdayCode>);

impl WorkdaySet {
    /// Empty set, no day counts as a work day
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, day: WeekdayCode) -> bool {
        self.0.contains(&day)
    }

    /// Whether the date of `date` falls on a selected weekday
    pub fn contains_date(&self, date: impl Datelike) -> bool {
        self.contains(WeekdayCode::of(date))
    }

    pub fn insert(&mut self, day: WeekdayCode) {
        self.0.insert(day);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = WeekdayCode> + '_ {
        self.0.iter().copied()
    }

    /// Space separated short labels, e.g. "Mon Tue Wed"
    pub fn labels(&self) -> String {
        self.iter().map(WeekdayCode::label).collect::<Vec<_>>().join(" ")
    }
}

impl Default for WorkdaySet {
    /// Monday to Friday
    fn default() -> Self {
        Self::from_iter([
            WeekdayCode::Monday,
            WeekdayCode::Tuesday,
            WeekdayCode::Wednesday,
            WeekdayCode::Thursday,
            WeekdayCode::Friday,
        ])
    }
}

impl FromIterator<WeekdayCode> for WorkdaySet {
    fn from_iter<T: IntoIterator<Item = WeekdayCode>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::str::FromStr for WorkdaySet {
    type Err = String;

    /// Parses "1-5", "1,3,5" or "0,2-4" (codes 0-6, Sunday = 0)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_workdays(s).map_err(|e: serde::de::value::Error| e.to_string())
    }
}

impl Serialize for WorkdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(WeekdayCode::code))
    }
}

impl<'de> Deserialize<'de> for WorkdaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WorkdayVisitor)
    }
}

/// Error message format for workday deserialization errors.
const ERR_FMT: &str = "a list of weekday codes or a string like '1-5' or '1,3,5' or '0,2-4' (numbers 0-6 only)";

/// Visitor accepting either a sequence of codes or a range string
struct WorkdayVisitor;

impl<'de> Visitor<'de> for WorkdayVisitor {
    type Value = WorkdaySet;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "{}", &ERR_FMT)
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: Error,
    {
        parse_workdays(v)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut set = WorkdaySet::empty();
        while let Some(code) = seq.next_element::<i64>()? {
            set.insert(weekday_check::<A::Error>(code)?);
        }
        Ok(set)
    }
}

/// Parses a comma separated list of codes and inclusive code ranges
fn parse_workdays<E: Error>(v: &str) -> Result<WorkdaySet, E> {
    if v.trim().is_empty() {
        return Err(Error::invalid_length(0, &ERR_FMT));
    }

    let mut set = WorkdaySet::empty();
    for day_spec in v.split(',').map(str::trim) {
        if let Ok(day) = day_spec.parse::<i64>() {
            set.insert(weekday_check::<E>(day)?);
            continue;
        }

        let unexpected = || -> E { Error::invalid_type(serde::de::Unexpected::Str(day_spec), &ERR_FMT) };
        let Some((start, end)) = day_spec.split_once('-') else {
            return Err(unexpected());
        };
        let (Ok(start), Ok(end)) = (start.trim().parse::<i64>(), end.trim().parse::<i64>()) else {
            return Err(unexpected());
        };
        let start = weekday_check::<E>(start)?.code();
        let end = weekday_check::<E>(end)?.code();
        set.0
            .extend((start.min(end)..=start.max(end)).filter_map(WeekdayCode::from_code));
    }
    Ok(set)
}

/// Validates that a day code is within 0-6 (Sunday = 0)
fn weekday_check<E: Error>(x: i64) -> Result<WeekdayCode, E> {
    u8::try_from(x)
        .ok()
        .and_then(WeekdayCode::from_code)
        .ok_or_else(|| Error::invalid_value(serde::de::Unexpected::Signed(x), &"numbers 0-6 only"))
}

/// Calendar dates excluded from work-day counts, independent of weekday
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet(HashSet<NaiveDate>);

impl HolidaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.0.insert(date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of holidays whose midnight lies in `[start, end)` and whose
    /// weekday is a selected work day
    pub fn count_work_days_in(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        workdays: &WorkdaySet,
    ) -> usize {
        self.0
            .iter()
            .filter(|date| {
                let midnight = date.and_time(chrono::NaiveTime::MIN);
                start <= midnight && midnight < end && workdays.contains_date(**date)
            })
            .count()
    }
}

impl FromIterator<NaiveDate> for HolidaySet {
    fn from_iter<T: IntoIterator<Item = NaiveDate>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<NaiveDate> for HolidaySet {
    fn extend<T: IntoIterator<Item = NaiveDate>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

/// The same wall-clock time on the following calendar day
///
/// Saturates at the end of chrono's representable range.
pub fn next_day(instant: NaiveDateTime) -> NaiveDateTime {
    instant.checked_add_days(Days::new(1)).unwrap_or(NaiveDateTime::MAX)
}
