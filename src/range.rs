//! Day counting and remaining-time arithmetic over date ranges.
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

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use crate::calendar::{next_day, HolidaySet, WorkdaySet};

/// Result of walking a date range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayCount {
    /// Days whose weekday is in the workday set
    pub work_days: u32,
    /// All calendar days visited
    pub total_days: u32,
}

/// Counts calendar days and work days in a range
///
/// Walks from `range_start` (keeping its time of day) one calendar day at a
/// time while the walked instant is not after `range_end`. A start after the
/// end yields `{0, 0}`.
pub fn count_days(
    range_start: NaiveDateTime,
    range_end: NaiveDateTime,
    workdays: &WorkdaySet,
) -> DayCount {
    let mut count = DayCount::default();
    let mut current = range_start;

    while current <= range_end {
        if workdays.contains_date(current) {
            count.work_days += 1;
        }
        count.total_days += 1;

        let next = next_day(current);
        if next == current {
            break;
        }
        current = next;
    }

    count
}

/// Hours (or work hours) left from `now` until `range_end`
///
/// Every calendar day from `now`'s date up to the last day whose midnight is
/// before `range_end` contributes one unit: 24 hours, or `hours_per_day` when
/// `filter_by_workday_and_holiday` is set. With filtering, days off the
/// workday set or in `holidays` contribute nothing. The day holding `now`
/// only contributes the part of its unit left after `now`'s hour and minute.
pub fn remaining_fraction(
    now: NaiveDateTime,
    range_end: NaiveDateTime,
    hours_per_day: u8,
    workdays: &WorkdaySet,
    holidays: Option<&HolidaySet>,
    filter_by_workday_and_holiday: bool,
) -> f64 {
    let counts = |date: NaiveDate| {
        !filter_by_workday_and_holiday
            || (workdays.contains_date(date) && !holidays.is_some_and(|h| h.contains(date)))
    };
    let unit = if filter_by_workday_and_holiday {
        f64::from(hours_per_day)
    } else {
        24.0
    };

    let today = now.date().and_time(NaiveTime::MIN);
    if now > range_end || today >= range_end {
        return 0.0;
    }

    let mut remaining = 0.0;
    if counts(today.date()) {
        let elapsed = f64::from(now.hour()) + f64::from(now.minute()) / 60.0;
        remaining += unit * (24.0 - elapsed) / 24.0;
    }

    let mut current = next_day(today);
    while current < range_end {
        if counts(current.date()) {
            remaining += unit;
        }

        let next = next_day(current);
        if next == current {
            break;
        }
        current = next;
    }

    remaining
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::calendar::WeekdayCode;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn counts_second_quarter_of_2024() {
        let count = count_days(at(2024, 4, 1, 0, 0), at(2024, 6, 30, 0, 0), &WorkdaySet::default());
        assert_eq!(count, DayCount { work_days: 65, total_days: 91 });
    }

    #[test]
    fn single_day_on_its_own_weekday() {
        // 2024-02-29 is a Thursday
        let day = at(2024, 2, 29, 0, 0);
        let workdays: WorkdaySet = [WeekdayCode::Thursday].into_iter().collect();
        assert_eq!(count_days(day, day, &workdays), DayCount { work_days: 1, total_days: 1 });
    }

    #[test]
    fn start_time_is_kept_while_walking() {
        // 10:00 on Jun 30 is after the midnight end, so Jun 30 is not visited
        let count = count_days(at(2024, 6, 28, 10, 0), at(2024, 6, 30, 0, 0), &WorkdaySet::default());
        assert_eq!(count.total_days, 2);
        assert_eq!(count.work_days, 1);
    }

    #[test]
    fn reversed_range_is_empty() {
        let count = count_days(at(2024, 5, 2, 0, 0), at(2024, 5, 1, 0, 0), &WorkdaySet::default());
        assert_eq!(count, DayCount::default());
    }

    #[test]
    fn work_days_never_exceed_total_days() {
        let workdays: WorkdaySet = "0-6".parse().unwrap();
        let start = at(2023, 12, 20, 0, 0);
        for offset in 0..40 {
            let end = start + chrono::TimeDelta::days(offset);
            let all = count_days(start, end, &workdays);
            assert_eq!(all.work_days, all.total_days);
            let weekdays = count_days(start, end, &WorkdaySet::default());
            assert!(weekdays.work_days <= weekdays.total_days);
        }
    }

    #[test]
    fn partial_first_day_in_hours() {
        let remaining = remaining_fraction(
            at(2024, 4, 1, 6, 0),
            at(2024, 4, 2, 0, 0),
            24,
            &WorkdaySet::default(),
            None,
            false,
        );
        assert_abs_diff_eq!(remaining, 18.0, epsilon = 1e-9);
    }

    #[test]
    fn minutes_are_fractional_hours() {
        let remaining = remaining_fraction(
            at(2024, 4, 1, 6, 30),
            at(2024, 4, 3, 0, 0),
            8,
            &WorkdaySet::default(),
            None,
            false,
        );
        assert_abs_diff_eq!(remaining, 17.5 + 24.0, epsilon = 1e-9);
    }

    #[test]
    fn work_hours_scale_partial_day() {
        // Mon 12:00 to Wed 00:00 with 8h days: half of Monday plus Tuesday
        let remaining = remaining_fraction(
            at(2024, 4, 1, 12, 0),
            at(2024, 4, 3, 0, 0),
            8,
            &WorkdaySet::default(),
            None,
            true,
        );
        assert_abs_diff_eq!(remaining, 4.0 + 8.0, epsilon = 1e-9);
    }

    #[test]
    fn filtered_first_day_contributes_nothing() {
        // 2024-04-06 is a Saturday, Monday Apr 8 is a holiday
        let holidays: HolidaySet = [NaiveDate::from_ymd_opt(2024, 4, 8).unwrap()]
            .into_iter()
            .collect();
        let work = remaining_fraction(
            at(2024, 4, 6, 9, 0),
            at(2024, 4, 10, 0, 0),
            8,
            &WorkdaySet::default(),
            Some(&holidays),
            true,
        );
        assert_abs_diff_eq!(work, 8.0, epsilon = 1e-9);

        // the plain hour variant ignores both weekday and holiday
        let hours = remaining_fraction(
            at(2024, 4, 6, 9, 0),
            at(2024, 4, 10, 0, 0),
            8,
            &WorkdaySet::default(),
            Some(&holidays),
            false,
        );
        assert_abs_diff_eq!(hours, 15.0 + 3.0 * 24.0, epsilon = 1e-9);
    }

    #[test]
    fn inclusive_end_counts_its_last_day() {
        let end = NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_milli_opt(23, 59, 59, 999)
            .unwrap();
        let remaining = remaining_fraction(at(2024, 12, 30, 0, 0), end, 8, &WorkdaySet::default(), None, false);
        assert_abs_diff_eq!(remaining, 48.0, epsilon = 1e-9);
    }

    #[test]
    fn nothing_remains_after_the_end() {
        let end = at(2024, 7, 1, 0, 0);
        for now in [end, at(2024, 7, 1, 8, 0), at(2024, 8, 1, 0, 0)] {
            let remaining = remaining_fraction(now, end, 8, &WorkdaySet::default(), None, false);
            assert_eq!(remaining, 0.0);
        }
    }
}
