//! Command-line interface parser for the quarter report.
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

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{builder::TypedValueParser, Parser};

use crate::{
    calendar::WorkdaySet,
    conf::{HolidayConf, Settings, SettingsStore, TomlFileStore},
};

/// Help message for date format specification
const HELP_MSG: &str = "Date format must be one of: \"YYYYmmDD\", \"YYYYmmDDHHMM\", \"YYYY-mm-dd\", \"YYYY-mm-ddTHH:MM\" or UNIX timestamp(millisecond)\nLeave empty to use the current time";
/// Date formats without a time of day, read as local midnight
const DATE_FORMATS: [&str; 2] = ["%Y%m%d", "%Y-%m-%d"];
/// Date and time formats
const DATETIME_FORMATS: [&str; 5] = [
    "%Y%m%d%H%M",
    "%Y%m%d%H%M%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DEFAULT_DATE_VALUE: &str = "now";

/// Command-line interface structure
#[derive(Parser)]
#[command(
    version(env!("CARGO_PKG_VERSION")),
    author(env!("CARGO_PKG_AUTHORS")),
    about(env!("CARGO_PKG_DESCRIPTION")),
    long_about = "Reports how many days and work hours the current calendar quarter \
                 has, how many are left, and the share of the quarter already gone."
)]
pub struct Cli {
    /// Reference moment of the report
    ///
    /// Supports multiple formats:
    /// - "now": the current local time
    /// - "YYYYmmDD" / "YYYY-mm-dd": local midnight of that day
    /// - "YYYYmmDDHHMM" / "YYYY-mm-ddTHH:MM": a specific local time
    /// - UNIX timestamp in millisecond
    #[arg(
        long,
        short,
        required = false,
        value_parser = DateParser,
        default_value = DEFAULT_DATE_VALUE,
        help = HELP_MSG
    )]
    date: NaiveDateTime,

    /// Settings file path
    ///
    /// TOML file holding the selected country, workdays, hours per day and
    /// whether holidays are factored in. A missing file means defaults.
    #[arg(long, short, value_parser = ConfParser, help = "Path to TOML settings file")]
    conf: Option<SettingsFile>,

    /// Workdays as codes 0-6 with Sunday = 0, e.g. "1-5" or "1,2,4"
    #[arg(long, short)]
    workdays: Option<WorkdaySet>,

    /// Hours per work day, clamped into 1-24
    #[arg(long = "hours", short = 'H', allow_negative_numbers = true)]
    hours_per_day: Option<i64>,

    /// Country whose public holidays are used (ISO 3166-1 alpha-2)
    #[arg(long)]
    country: Option<String>,

    /// Remove public holidays from work day counts
    #[arg(long, conflicts_with = "no_holidays")]
    holidays: bool,

    /// Ignore public holidays even when the settings enable them
    #[arg(long)]
    no_holidays: bool,

    /// Holiday API base URL, JSON file or iCalendar file/URL
    #[arg(long)]
    holiday_source: Option<String>,

    /// Print the countries the holiday API covers and exit
    #[arg(long)]
    list_countries: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Write the effective settings back to the settings file
    #[arg(long, requires = "conf")]
    save: bool,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    /// Returns the reference moment of the report
    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    /// Returns the settings file store, if one was given
    pub fn store(&self) -> Option<&TomlFileStore> {
        self.conf.as_ref().map(|c| &c.store)
    }

    /// Saved settings with command-line overrides applied
    pub fn settings(&self) -> Settings {
        let mut settings = self
            .conf
            .as_ref()
            .and_then(|c| c.settings.clone())
            .unwrap_or_default();

        if let Some(workdays) = &self.workdays {
            settings.selected_workdays = workdays.clone();
        }
        if let Some(hours) = self.hours_per_day {
            settings.set_hours_per_day(hours);
        }
        if let Some(country) = &self.country {
            settings.selected_country = country.to_uppercase();
        }
        if self.holidays {
            settings.include_holidays = true;
        }
        if self.no_holidays {
            settings.include_holidays = false;
        }
        if let Some(source) = &self.holiday_source {
            settings.holiday = Some(HolidayConf { source: source.clone() });
        }
        settings
    }

    pub fn list_countries(&self) -> bool {
        self.list_countries
    }

    pub fn json(&self) -> bool {
        self.json
    }

    pub fn save(&self) -> bool {
        self.save
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Parses a reference moment in any of the accepted formats
///
/// # Supported Formats
/// * "now": the current local time
/// * "YYYYmmDD", "YYYY-mm-dd": local midnight
/// * "YYYYmmDDHHMM[SS]", "YYYY-mm-ddTHH:MM[:SS]", "YYYY-mm-dd HH:MM"
/// * UNIX timestamp in millisecond, converted to local time
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value == DEFAULT_DATE_VALUE {
        return Some(Local::now().naive_local());
    }

    // Try parsing as date only first
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    {
        return Some(date.and_time(NaiveTime::MIN));
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(dt);
    }

    // Try parsing as unix timestamp
    value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.with_timezone(&Local).naive_local())
}

/// Custom parser for reference moments
#[derive(Clone)]
struct DateParser;

impl TypedValueParser for DateParser {
    type Value = NaiveDateTime;

    fn parse_ref(
        &self,
        _cmd: &clap::Command,
        _arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let Some(value_str) = value.to_str() else {
            return Err(clap::Error::new(clap::error::ErrorKind::InvalidUtf8));
        };

        parse_date(value_str).ok_or_else(|| {
            clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!("Invalid date '{value_str}'. {HELP_MSG}\n"),
            )
        })
    }
}

/// Settings file location together with what it held at startup
#[derive(Clone)]
struct SettingsFile {
    store: TomlFileStore,
    settings: Option<Settings>,
}

/// Custom parser for settings file loading
#[derive(Clone)]
struct ConfParser;

impl TypedValueParser for ConfParser {
    type Value = SettingsFile;

    /// Loads the settings file, a missing file yields no settings
    ///
    /// # Errors
    /// * Permission denied or other read failures
    /// * Invalid TOML format or out of range workday codes
    fn parse_ref(
        &self,
        _cmd: &clap::Command,
        _arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let store = TomlFileStore::new(PathBuf::from(value));
        let settings = store.load().map_err(|e| {
            clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!("Cannot load settings '{}': {}\n", store.path().display(), e),
            )
        })?;

        Ok(SettingsFile { store, settings })
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;
    use crate::calendar::WeekdayCode;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn parses_date_formats() {
        assert_eq!(parse_date("20241225"), Some(at(2024, 12, 25, 0, 0)));
        assert_eq!(parse_date("2024-12-25"), Some(at(2024, 12, 25, 0, 0)));
        assert_eq!(parse_date("202412251430"), Some(at(2024, 12, 25, 14, 30)));
        assert_eq!(parse_date("2024-12-25T14:30"), Some(at(2024, 12, 25, 14, 30)));
        assert_eq!(parse_date("2024-12-25 08:05"), Some(at(2024, 12, 25, 8, 5)));
        assert_eq!(parse_date("christmas"), None);
    }

    #[test]
    fn parses_unix_milliseconds() {
        let expected = DateTime::from_timestamp_millis(1_718_000_000_000)
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(parse_date("1718000000000"), Some(expected));
    }

    #[test]
    fn now_is_the_current_time() {
        let before = Local::now().naive_local();
        let now = parse_date("now").unwrap();
        assert!(now >= before);
    }

    #[test]
    fn overrides_replace_saved_settings() {
        let cli = Cli::try_parse_from([
            "qtrack", "-d", "20240515", "-w", "1-4", "-H", "30", "--country", "de", "--holidays",
        ])
        .unwrap();
        assert_eq!(cli.date(), at(2024, 5, 15, 0, 0));

        let settings = cli.settings();
        assert_eq!(settings.hours_per_day, 24);
        assert_eq!(settings.selected_country, "DE");
        assert!(settings.include_holidays);
        assert!(!settings.selected_workdays.contains(WeekdayCode::Friday));
        assert!(cli.store().is_none());
    }

    #[test]
    fn settings_file_is_loaded_and_overridden() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "selected_country = \"FR\"\ninclude_holidays = true\nhours_per_day = 7\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            OsString::from("qtrack"),
            OsString::from("-c"),
            path.into_os_string(),
            OsString::from("--no-holidays"),
        ])
        .unwrap();
        let settings = cli.settings();
        assert_eq!(settings.selected_country, "FR");
        assert_eq!(settings.hours_per_day, 7);
        assert!(!settings.include_holidays);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Cli::try_parse_from(["qtrack", "-d", "tomorrow"]).is_err());
        assert!(Cli::try_parse_from(["qtrack", "-w", "1-9"]).is_err());
        assert!(Cli::try_parse_from(["qtrack", "--save"]).is_err());
        assert!(Cli::try_parse_from(["qtrack", "--holidays", "--no-holidays"]).is_err());
    }
}
