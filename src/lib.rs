//! Calendar quarter work-time statistics.
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
//!
//! The arithmetic lives in [`quarter`], [`range`] and [`stats`] and never
//! performs I/O. Settings persistence and holiday sources feed it immutable
//! snapshots.

pub mod calendar;
pub mod cli;
pub mod conf;
pub mod error;
pub mod holiday;
pub mod ical;
pub mod logger;
pub mod quarter;
pub mod range;
pub mod stats;

pub use calendar::{HolidaySet, WeekdayCode, WorkdaySet};
pub use error::{Error, Result};
pub use quarter::{resolve_quarter, Quarter};
pub use range::{count_days, remaining_fraction, DayCount};
pub use stats::{QuarterStats, WorkCalendar};
