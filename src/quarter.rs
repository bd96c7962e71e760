//! Calendar quarter resolution.
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

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;

/// One of the four fixed three-month partitions of a calendar year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quarter {
    /// Calendar year the quarter belongs to
    pub year: i32,
    /// Quarter number, 1-4
    pub number: u32,
    /// Local midnight of the first day (inclusive)
    pub start: NaiveDateTime,
    /// Start of the next quarter (exclusive) for Q1-Q3,
    /// Dec 31 23:59:59.999 (inclusive) for Q4
    pub end: NaiveDateTime,
}

impl Quarter {
    /// Whether the end boundary belongs to the quarter (Q4 only)
    pub fn end_is_inclusive(&self) -> bool {
        self.number == 4
    }

    /// Whether `instant` falls inside the quarter
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        if self.end_is_inclusive() {
            self.start <= instant && instant <= self.end
        } else {
            self.start <= instant && instant < self.end
        }
    }

    /// Latest instant still inside the quarter
    pub fn last_instant(&self) -> NaiveDateTime {
        if self.end_is_inclusive() {
            self.end
        } else {
            self.end - TimeDelta::milliseconds(1)
        }
    }

    /// "Q2 2024"
    pub fn label(&self) -> String {
        format!("Q{} {}", self.number, self.year)
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Resolves the quarter enclosing `instant`
///
/// The start boundary is inclusive. Q1-Q3 end at the exclusive start of the
/// following quarter while Q4 ends inclusively at the last millisecond of
/// Dec 31, so every instant of a year maps to exactly one of its quarters.
pub fn resolve_quarter(instant: NaiveDateTime) -> Quarter {
    let year = instant.year();
    let month0 = instant.month0();
    let number = month0 / 3 + 1;

    let start = first_of_month(year, month0 - month0 % 3);
    let end = match number {
        4 => NaiveDate::from_ymd_opt(year, 12, 31)
            .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
            .unwrap_or(NaiveDateTime::MAX),
        _ => first_of_month(year, month0 - month0 % 3 + 3),
    };

    Quarter { year, number, start, end }
}

/// Local midnight on the first of a zero-indexed month of `year`
fn first_of_month(year: i32, month0: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or(NaiveDateTime::MIN)
}
