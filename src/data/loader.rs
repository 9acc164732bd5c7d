use crate::data::bar::Bar;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRecord {
    datetime: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    #[serde(default)]
    open_interest: Option<f64>,
    symbol: String,
}

//parses a timestamp in rfc3339, date-time, or plain date form
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ts));
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
    }
    None
}

//loads bars from a csv file
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut bars = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        let timestamp = parse_timestamp(&record.datetime).context(format!(
            "Failed to parse timestamp '{}' at line {}",
            record.datetime,
            index + 2
        ))?;

        bars.push(Bar::new_unchecked(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
            record.open_interest,
            record.symbol,
        ));
    }

    Ok(bars)
}

//cleans a raw series: drops rows with missing or non-positive prices,
//sorts chronologically, and drops duplicate timestamps keeping the first
pub fn clean(bars: Vec<Bar>) -> Vec<Bar> {
    let mut bars: Vec<Bar> = bars.into_iter().filter(Bar::has_valid_prices).collect();
    bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    bars.dedup_by(|b, a| a.timestamp == b.timestamp);
    bars
}

//restricts a series to an inclusive date range
pub fn filter_by_date(bars: &[Bar], start: Option<NaiveDate>, end: Option<NaiveDate>) -> Vec<Bar> {
    bars.iter()
        .filter(|bar| {
            let date = bar.timestamp.date_naive();
            start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
        })
        .cloned()
        .collect()
}
