//! Calendar quarter work-time report.
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

use clap::Parser;
use qtrack::{
    cli::Cli,
    conf::SettingsStore,
    holiday::{self, HolidaySource},
    logger, resolve_quarter, Error, QuarterStats, WorkCalendar,
};

/// Main entry point for the quarter report
///
/// # Usage Examples
/// ```bash
/// # Report on the current quarter with Monday to Friday, 8 hour days
/// qtrack
///
/// # Report on a specific moment with 6 hour days, Monday to Thursday
/// qtrack -d 2024-05-15T14:30 -H 6 -w 1-4
///
/// # Factor in German public holidays and remember the choice
/// qtrack -c ~/.config/qtrack.toml --country DE --holidays --save
/// ```
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::init(cli.verbose());

    let settings = cli.settings();
    let client = reqwest::Client::new();

    if cli.list_countries() {
        let HolidaySource::Api { base_url } = HolidaySource::parse(settings.holiday_source()) else {
            return Err(Error::Config {
                message: "countries can only be listed from a holiday API".to_string(),
            }
            .into());
        };
        for country in holiday::fetch_countries(&client, &base_url).await? {
            println!("{}\t{}", country.country_code, country.name);
        }
        return Ok(());
    }

    let now = cli.date();
    let holidays = if settings.include_holidays {
        let year = resolve_quarter(now).year;
        let source = HolidaySource::parse(settings.holiday_source());
        Some(source.load(&client, year, &settings.selected_country).await?)
    } else {
        None
    };

    tracing::debug!(
        %now,
        workdays = %settings.selected_workdays.labels(),
        hours_per_day = settings.hours_per_day,
        include_holidays = settings.include_holidays,
        "computing quarter statistics"
    );
    let stats = QuarterStats::compute(now, &WorkCalendar::from(&settings), holidays.as_ref());

    if cli.json() {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{stats}");
    }

    if cli.save() {
        if let Some(store) = cli.store() {
            store.save(&settings)?;
        }
    }

    Ok(())
}
