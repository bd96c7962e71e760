//! Settings and their persistence.
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

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{calendar::WorkdaySet, error::Result};

/// Shortest accepted work day in hours
pub const MIN_HOURS_PER_DAY: u8 = 1;
/// Longest accepted work day in hours
pub const MAX_HOURS_PER_DAY: u8 = 24;
/// Work day length used when nothing is configured
pub const DEFAULT_HOURS_PER_DAY: u8 = 8;

/// Public holiday API queried when no other source is configured
pub const DEFAULT_HOLIDAY_SOURCE: &str = "https://date.nager.at";

/// Clamps a work day length into 1-24 hours
pub fn clamp_hours_per_day(hours: i64) -> u8 {
    hours.clamp(i64::from(MIN_HOURS_PER_DAY), i64::from(MAX_HOURS_PER_DAY)) as u8
}

/// User settings for the quarter report.
///
/// Every field may be omitted from the settings file; missing fields take
/// their defaults (no country, holidays off, Monday to Friday, 8 hours).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// ISO 3166-1 alpha-2 code of the country whose holidays are used
    pub selected_country: String,
    /// Whether holidays are removed from work day counts
    pub include_holidays: bool,
    /// Weekdays counted as work days (Sunday = 0)
    pub selected_workdays: WorkdaySet,
    /// Length of a work day, clamped into 1-24
    #[serde(deserialize_with = "deserialize_hours")]
    pub hours_per_day: u8,
    /// Where holiday lists come from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holiday: Option<HolidayConf>,
}

/// Holiday source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayConf {
    /// Base URL of a public holiday API, a `.json` file, or a `.ics` file/URL
    pub source: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_country: String::new(),
            include_holidays: false,
            selected_workdays: WorkdaySet::default(),
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            holiday: None,
        }
    }
}

impl Settings {
    /// Returns the configured holiday source, or the public API
    pub fn holiday_source(&self) -> &str {
        self.holiday
            .as_ref()
            .map(|h| h.source.as_str())
            .unwrap_or(DEFAULT_HOLIDAY_SOURCE)
    }

    /// Sets the work day length, clamping it into 1-24
    pub fn set_hours_per_day(&mut self, hours: i64) {
        self.hours_per_day = clamp_hours_per_day(hours);
    }
}

/// Reads the work day length as any integer and clamps it
fn deserialize_hours<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_hours_per_day)
}

/// Persistence for [`Settings`].
pub trait SettingsStore {
    /// Returns `None` when nothing has been saved yet
    fn load(&self) -> Result<Option<Settings>>;

    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Settings kept in a TOML file
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlFileStore {
    fn load(&self) -> Result<Option<Settings>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no saved settings");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let settings = toml::from_str(&content)?;
        tracing::debug!(path = %self.path.display(), "settings loaded");
        Ok(Some(settings))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(settings)?)?;
        tracing::info!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekdayCode;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = toml::from_str("selected_country = \"DE\"").unwrap();
        assert_eq!(settings.selected_country, "DE");
        assert!(!settings.include_holidays);
        assert_eq!(settings.selected_workdays, WorkdaySet::default());
        assert_eq!(settings.hours_per_day, 8);
        assert_eq!(settings.holiday_source(), DEFAULT_HOLIDAY_SOURCE);
    }

    #[test]
    fn hours_are_clamped_when_loaded() {
        let low: Settings = toml::from_str("hours_per_day = 0").unwrap();
        let high: Settings = toml::from_str("hours_per_day = 40").unwrap();
        assert_eq!(low.hours_per_day, 1);
        assert_eq!(high.hours_per_day, 24);

        let mut settings = Settings::default();
        settings.set_hours_per_day(-3);
        assert_eq!(settings.hours_per_day, 1);
    }

    #[test]
    fn workdays_accept_lists_and_ranges() {
        let list: Settings = toml::from_str("selected_workdays = [0, 6]").unwrap();
        assert!(list.selected_workdays.contains(WeekdayCode::Sunday));
        assert!(list.selected_workdays.contains(WeekdayCode::Saturday));
        assert!(!list.selected_workdays.contains(WeekdayCode::Monday));

        let range: Settings = toml::from_str("selected_workdays = \"1-4\"").unwrap();
        assert!(range.selected_workdays.contains(WeekdayCode::Thursday));
        assert!(!range.selected_workdays.contains(WeekdayCode::Friday));

        assert!(toml::from_str::<Settings>("selected_workdays = [7]").is_err());
    }

    #[test]
    fn store_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlFileStore::new(dir.path().join("nested").join("settings.toml"));
        assert_eq!(store.load().unwrap(), None);

        let settings = Settings {
            selected_country: "NL".to_string(),
            include_holidays: true,
            selected_workdays: "1-4".parse().unwrap(),
            hours_per_day: 9,
            holiday: Some(HolidayConf {
                source: "holidays.ics".to_string(),
            }),
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), Some(settings));
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "hours_per_day = \"eight\"").unwrap();
        assert!(TomlFileStore::new(path).load().is_err());
    }
}
