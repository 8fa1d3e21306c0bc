/// Delimited input/output for the pipeline
///
/// Output 1 is the canonical daily table in schema order; Output 2 is the
/// minute series (`datetime,estimated_temp,location`). Missing values are
/// always written as empty fields.
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::models::{CanonicalTable, DailyTemperature, MinuteRecord};

pub const MINUTE_HEADER: [&str; 3] = ["datetime", "estimated_temp", "location"];

#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}

const TEMPERATURE_COLUMNS: [&str; 3] = ["date", "temp_min", "temp_max"];

/// Write the canonical daily table
pub fn write_daily_table<W: Write>(table: &CanonicalTable, writer: W) -> Result<(), CsvError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.schema().names())?;
    for row in table.rows() {
        csv_writer.write_record(row.iter().map(|value| value.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the minute series
pub fn write_minute_series<W: Write>(records: &[MinuteRecord], writer: W) -> Result<(), CsvError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(MINUTE_HEADER)?;
    for record in records {
        let estimate = record
            .estimated_temperature
            .map(|t| t.to_string())
            .unwrap_or_default();
        csv_writer.write_record([
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            estimate,
            record.location.clone().unwrap_or_default(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the daily table to `path`, creating parent directories
pub fn write_daily_table_to_path(table: &CanonicalTable, path: &Path) -> Result<(), CsvError> {
    let file = create_output(path)?;
    write_daily_table(table, file)?;
    info!("Wrote {} daily rows to {}", table.len(), path.display());
    Ok(())
}

/// Write the minute series to `path`, creating parent directories
pub fn write_minute_series_to_path(records: &[MinuteRecord], path: &Path) -> Result<(), CsvError> {
    let file = create_output(path)?;
    write_minute_series(records, file)?;
    info!("Wrote {} minute rows to {}", records.len(), path.display());
    Ok(())
}

fn create_output(path: &Path) -> Result<File, CsvError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Read daily temperatures from a CSV with `date,temp_min,temp_max[,location]`
///
/// Empty or non-numeric temperature fields read as missing. Rows whose date
/// does not parse are dropped. Extra columns are ignored.
pub fn read_daily_temperatures<R: Read>(reader: R) -> Result<Vec<DailyTemperature>, CsvError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?;
    if let Some(missing) = TEMPERATURE_COLUMNS
        .iter()
        .find(|name| !headers.iter().any(|h| h == **name))
    {
        return Err(CsvError::MissingColumn(*missing));
    }

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for result in csv_reader.deserialize::<DailyTemperature>() {
        match result {
            Ok(record) => records.push(record),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Deserialize { .. }) => {
                dropped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if dropped > 0 {
        debug!("Dropped {} daily temperature rows without a valid date", dropped);
    }
    Ok(records)
}

pub fn read_daily_temperatures_from_path(path: &Path) -> Result<Vec<DailyTemperature>, CsvError> {
    let records = read_daily_temperatures(File::open(path)?)?;
    info!(
        "Read {} daily temperature records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    #[test]
    fn test_read_daily_temperatures() {
        let input = "date,temp_min,temp_max,location\n\
                     2012-01-01,1.5,7.25,Strathspey\n\
                     2012-01-02,,6,\n";
        let records = read_daily_temperatures(input.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2012, 1, 1).unwrap());
        assert_eq!(records[0].temp_max, Some(7.25));
        assert_eq!(records[0].location.as_deref(), Some("Strathspey"));
        assert_eq!(records[1].temp_min, None);
        assert_eq!(records[1].location, None);
    }

    #[test]
    fn test_read_daily_temperatures_without_location_column() {
        let input = "date,temp_min,temp_max\n2012-01-01,1,2\n";
        let records = read_daily_temperatures(input.as_bytes()).unwrap();
        assert_eq!(records[0].location, None);
    }

    #[test]
    fn test_read_daily_temperatures_bad_cells_are_missing() {
        let input = "date,temp_min,temp_max\n\
                     2012-01-01,1,2\n\
                     2012-01-02,n/a,7\n\
                     yesterday,1,2\n\
                     2012-01-03,3,4\n";
        let records = read_daily_temperatures(input.as_bytes()).unwrap();

        let dates: Vec<u32> = records.iter().map(|r| r.date.day()).collect();
        assert_eq!(dates, vec![1, 2, 3]);
        assert_eq!(records[1].temp_min, None);
        assert_eq!(records[1].temp_max, Some(7.0));
        assert_eq!(records[2].temp_min, Some(3.0));
    }

    #[test]
    fn test_read_daily_temperatures_requires_columns() {
        let input = "date,low,high\n2012-01-01,1,2\n";
        assert!(matches!(
            read_daily_temperatures(input.as_bytes()),
            Err(CsvError::MissingColumn("temp_min"))
        ));
    }

    #[test]
    fn test_read_daily_temperatures_ragged_rows_fail() {
        let input = "date,temp_min,temp_max\n2012-01-01,1\n";
        assert!(matches!(
            read_daily_temperatures(input.as_bytes()),
            Err(CsvError::Csv(_))
        ));
    }
}
