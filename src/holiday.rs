//! Holiday list sources.
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

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    calendar::HolidaySet,
    error::{Error, Result},
    ical,
};

/// Date format of holiday records (YYYY-MM-DD)
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One entry of a public holiday list
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayRecord {
    /// Calendar date, no time component
    pub date: String,
    #[serde(default)]
    pub local_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A country the holiday API has data for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub country_code: String,
    pub name: String,
}

/// Where holiday dates are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolidaySource {
    /// Public holiday web API rooted at a base URL
    Api { base_url: String },
    /// Local file in the API's JSON shape
    JsonFile(PathBuf),
    /// iCalendar file path or URL
    Ical(String),
}

impl HolidaySource {
    /// Picks the source kind from a configured location
    ///
    /// `.ics` locations are iCalendar feeds, other http(s) locations are API
    /// base URLs and anything else is a JSON file.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.to_ascii_lowercase().ends_with(".ics") {
            HolidaySource::Ical(location.to_string())
        } else if location.starts_with("http") {
            HolidaySource::Api {
                base_url: location.trim_end_matches('/').to_string(),
            }
        } else {
            HolidaySource::JsonFile(PathBuf::from(location))
        }
    }

    /// Loads the holidays of `year` for `country`
    ///
    /// File based sources ignore `year` and `country` and return every date
    /// they hold.
    pub async fn load(&self, client: &reqwest::Client, year: i32, country: &str) -> Result<HolidaySet> {
        let holidays = match self {
            HolidaySource::Api { base_url } => {
                if country.is_empty() {
                    return Err(Error::Config {
                        message: "a country code is required to fetch holidays".to_string(),
                    });
                }
                let url = format!("{base_url}/api/v3/PublicHolidays/{year}/{country}");
                tracing::debug!(%url, "fetching holidays");
                let bytes = client.get(&url).send().await?.error_for_status()?.bytes().await?;
                holidays_from_records(serde_json::from_slice(&bytes)?)
            }
            HolidaySource::JsonFile(path) => {
                let content = std::fs::read(path)?;
                holidays_from_records(serde_json::from_slice(&content)?)
            }
            HolidaySource::Ical(uri) => ical::read_holidays(client, uri).await?,
        };

        tracing::info!(count = holidays.len(), year, country, "holidays loaded");
        Ok(holidays)
    }
}

/// Lists the countries the holiday API covers
pub async fn fetch_countries(client: &reqwest::Client, base_url: &str) -> Result<Vec<Country>> {
    let url = format!("{}/api/v3/AvailableCountries", base_url.trim_end_matches('/'));
    tracing::debug!(%url, "fetching countries");
    let bytes = client.get(&url).send().await?.error_for_status()?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Builds a holiday set, skipping records whose date does not parse
pub fn holidays_from_records(records: Vec<HolidayRecord>) -> HolidaySet {
    records
        .into_iter()
        .filter_map(|record| match NaiveDate::parse_from_str(&record.date, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!(
                    date = %record.date,
                    name = record.name.as_deref().or(record.local_name.as_deref()).unwrap_or(""),
                    "skipping holiday with invalid date: {e}"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn source_kind_follows_location() {
        assert_eq!(
            HolidaySource::parse("https://date.nager.at/"),
            HolidaySource::Api {
                base_url: "https://date.nager.at".to_string()
            }
        );
        assert_eq!(
            HolidaySource::parse("https://example.com/Holidays.ICS"),
            HolidaySource::Ical("https://example.com/Holidays.ICS".to_string())
        );
        assert_eq!(
            HolidaySource::parse("data/holidays.json"),
            HolidaySource::JsonFile(PathBuf::from("data/holidays.json"))
        );
    }

    #[test]
    fn malformed_dates_are_skipped() {
        let records: Vec<HolidayRecord> = serde_json::from_value(json!([
            {"date": "2024-12-25", "name": "Christmas Day"},
            {"date": "2024-13-01", "name": "Nonsense"},
            {"date": "25.12.2024"}
        ]))
        .unwrap();
        let holidays = holidays_from_records(records);
        assert_eq!(holidays.len(), 1);
        assert!(holidays.contains(ymd(2024, 12, 25)));
    }

    #[tokio::test]
    async fn fetches_public_holidays_for_year_and_country() {
        let server = MockServer::start_async().await;
        let api = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v3/PublicHolidays/2024/DE");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!([
                        {"date": "2024-05-01", "localName": "Tag der Arbeit", "name": "Labour Day", "countryCode": "DE"},
                        {"date": "2024-10-03", "localName": "Tag der Deutschen Einheit", "name": "German Unity Day", "countryCode": "DE"}
                    ]));
            })
            .await;

        let source = HolidaySource::parse(&server.base_url());
        let holidays = source.load(&reqwest::Client::new(), 2024, "DE").await.unwrap();

        api.assert_async().await;
        assert_eq!(holidays.len(), 2);
        assert!(holidays.contains(ymd(2024, 5, 1)));
        assert!(holidays.contains(ymd(2024, 10, 3)));
    }

    #[tokio::test]
    async fn api_errors_are_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v3/PublicHolidays/2024/XX");
                then.status(404);
            })
            .await;

        let source = HolidaySource::parse(&server.base_url());
        let result = source.load(&reqwest::Client::new(), 2024, "XX").await;
        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[tokio::test]
    async fn api_requires_a_country() {
        let source = HolidaySource::parse("https://date.nager.at");
        let result = source.load(&reqwest::Client::new(), 2024, "").await;
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn lists_available_countries() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v3/AvailableCountries");
                then.status(200).json_body(json!([
                    {"countryCode": "AD", "name": "Andorra"},
                    {"countryCode": "AL", "name": "Albania"}
                ]));
            })
            .await;

        let countries = fetch_countries(&reqwest::Client::new(), &server.base_url()).await.unwrap();
        assert_eq!(countries.len(), 2);
        assert_eq!(countries[1].country_code, "AL");
    }

    #[tokio::test]
    async fn reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holidays.json");
        std::fs::write(&path, r#"[{"date": "2025-01-01"}, {"date": "2025-04-18"}]"#).unwrap();

        let source = HolidaySource::parse(path.to_str().unwrap());
        let holidays = source.load(&reqwest::Client::new(), 2025, "").await.unwrap();
        assert_eq!(holidays.len(), 2);
        assert!(holidays.contains(ymd(2025, 4, 18)));
    }
}
