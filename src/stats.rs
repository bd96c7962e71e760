//! Quarter work-time statistics.
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

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    calendar::{HolidaySet, WorkdaySet},
    conf::{clamp_hours_per_day, Settings},
    quarter::{resolve_quarter, Quarter},
    range::{count_days, remaining_fraction},
};

/// Work pattern the statistics are computed against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkCalendar {
    /// Weekdays counted as work days
    workdays: WorkdaySet,
    /// Length of a work day in hours, 1-24
    hours_per_day: u8,
}

impl WorkCalendar {
    /// Creates a work pattern, clamping `hours_per_day` into 1-24
    pub fn new(workdays: WorkdaySet, hours_per_day: i64) -> Self {
        Self {
            workdays,
            hours_per_day: clamp_hours_per_day(hours_per_day),
        }
    }

    pub fn workdays(&self) -> &WorkdaySet {
        &self.workdays
    }

    pub fn hours_per_day(&self) -> u8 {
        self.hours_per_day
    }
}

impl From<&Settings> for WorkCalendar {
    fn from(settings: &Settings) -> Self {
        Self::new(
            settings.selected_workdays.clone(),
            i64::from(settings.hours_per_day),
        )
    }
}

/// Statistics for the quarter enclosing a reference instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterStats {
    pub quarter: Quarter,
    /// Reference instant the remaining figures are measured from
    pub now: NaiveDateTime,
    pub total_days: u32,
    /// Work days after removing holidays on selected weekdays
    pub work_days: u32,
    pub total_hours: f64,
    pub total_work_hours: f64,
    pub remaining_hours: f64,
    pub remaining_work_hours: f64,
    pub remaining_days: f64,
    pub remaining_work_days: f64,
    /// `None` when the quarter has no hours at all
    pub remaining_percent: Option<u32>,
    pub elapsed_percent: Option<u32>,
    /// `None` when no work hours are left to count against
    pub remaining_work_percent: Option<u32>,
    pub elapsed_work_percent: Option<u32>,
    /// Holidays removed from the work day count
    pub holidays_excluded: u32,
}

impl QuarterStats {
    /// Computes all figures for the quarter enclosing `now`
    ///
    /// Totals cover every day of the quarter from its start through its last
    /// instant. Holidays are only applied when `holidays` is supplied, and
    /// never to the plain hour figures.
    pub fn compute(
        now: NaiveDateTime,
        calendar: &WorkCalendar,
        holidays: Option<&HolidaySet>,
    ) -> Self {
        let quarter = resolve_quarter(now);
        let workdays = calendar.workdays();
        let hours_per_day = calendar.hours_per_day();

        let count = count_days(quarter.start, quarter.last_instant(), workdays);
        let holidays_excluded = holidays
            .map(|h| h.count_work_days_in(quarter.start, quarter.end, workdays))
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(0);
        let work_days = count.work_days.saturating_sub(holidays_excluded);

        let total_hours = f64::from(count.total_days) * 24.0;
        let total_work_hours = f64::from(work_days) * f64::from(hours_per_day);

        let remaining_hours =
            remaining_fraction(now, quarter.end, hours_per_day, workdays, holidays, false);
        let remaining_work_hours =
            remaining_fraction(now, quarter.end, hours_per_day, workdays, holidays, true);

        let remaining_percent = percent(remaining_hours, total_hours);
        let remaining_work_percent = percent(remaining_work_hours, total_work_hours);

        tracing::debug!(
            quarter = %quarter,
            total_days = count.total_days,
            work_days,
            holidays_excluded,
            "quarter counted"
        );

        Self {
            quarter,
            now,
            total_days: count.total_days,
            work_days,
            total_hours,
            total_work_hours,
            remaining_hours,
            remaining_work_hours,
            remaining_days: remaining_hours / 24.0,
            remaining_work_days: remaining_work_hours / f64::from(hours_per_day),
            remaining_percent,
            elapsed_percent: remaining_percent.map(elapsed),
            remaining_work_percent,
            elapsed_work_percent: remaining_work_percent.map(elapsed),
            holidays_excluded,
        }
    }
}

/// `part / total` as a whole percentage, `None` for an empty total
pub fn percent(part: f64, total: f64) -> Option<u32> {
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    let ratio = (part / total * 100.0).round();
    Some(ratio.max(0.0) as u32)
}

fn elapsed(remaining: u32) -> u32 {
    100u32.saturating_sub(remaining)
}

impl std::fmt::Display for QuarterStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pct = |p: Option<u32>| p.map_or_else(|| "n/a".to_string(), |p| format!("{p}%"));

        writeln!(
            f,
            "{} ({} .. {})",
            self.quarter,
            self.quarter.start.date(),
            self.quarter.last_instant().date()
        )?;
        writeln!(f, "Reference:            {}", self.now.format("%Y-%m-%d %H:%M"))?;
        writeln!(f, "Total days:           {}", self.total_days)?;
        writeln!(f, "Work days:            {}", self.work_days)?;
        if self.holidays_excluded > 0 {
            writeln!(f, "Holidays excluded:    {}", self.holidays_excluded)?;
        }
        writeln!(f, "Total hours:          {:.0}", self.total_hours)?;
        writeln!(f, "Total work hours:     {:.0}", self.total_work_hours)?;
        writeln!(f, "Remaining hours:      {:.2} ({:.2} days)", self.remaining_hours, self.remaining_days)?;
        writeln!(
            f,
            "Remaining work hours: {:.2} ({:.2} work days)",
            self.remaining_work_hours, self.remaining_work_days
        )?;
        writeln!(
            f,
            "Time remaining:       {} (elapsed {})",
            pct(self.remaining_percent),
            pct(self.elapsed_percent)
        )?;
        write!(
            f,
            "Work time remaining:  {} (elapsed {})",
            pct(self.remaining_work_percent),
            pct(self.elapsed_work_percent)
        )
    }
}
