// Tests for failure paths of the import and resampling pipeline

mod common;

use common::*;
use daylight_ingest::config::{ImportOptions, ResampleOptions};
use daylight_ingest::csv_io::{read_daily_temperatures_from_path, CsvError};
use daylight_ingest::importers::{assemble_table, ImportError, WorkbookImporter};
use daylight_ingest::models::{DailyTemperature, TableError};
use daylight_ingest::resampler::{MinuteResampler, ResampleError};

#[test]
fn test_missing_workbook() {
    let importer = WorkbookImporter::new("/nonexistent/edinburgh-2012.xlsx", ImportOptions::default());
    let result = importer.import();
    assert!(matches!(result, Err(ImportError::WorkbookOpen(_))));
}

#[test]
fn test_corrupt_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let result = WorkbookImporter::new(&path, ImportOptions::default()).import();
    match result {
        Err(ImportError::WorkbookOpen(msg)) => assert!(!msg.is_empty()),
        other => panic!("Expected WorkbookOpen, got {other:?}"),
    }
}

#[test]
fn test_daylight_table_has_no_temperatures() {
    let table = assemble_table(&mut daylight_workbook(), &ImportOptions::default()).unwrap();
    let err = DailyTemperature::from_table(&table, None).unwrap_err();
    assert!(matches!(err, TableError::MissingColumn("temp_min")));
}

#[test]
fn test_inverted_resample_interval() {
    let defaults = ResampleOptions::default();
    let options = ResampleOptions {
        start: defaults.end,
        end: defaults.start,
        ..defaults
    };
    let err = MinuteResampler::new(options).err().unwrap();
    assert!(matches!(err, ResampleError::InvalidInterval { .. }));
    assert!(err.to_string().contains("is after end"));
}

#[test]
fn test_negative_peak_hour() {
    let options = ResampleOptions {
        peak_hour: -1.0,
        ..ResampleOptions::default()
    };
    assert!(matches!(
        MinuteResampler::new(options),
        Err(ResampleError::InvalidPeakHour(_))
    ));
}

#[test]
fn test_missing_temperature_csv() {
    let dir = tempfile::tempdir().unwrap();
    let result = read_daily_temperatures_from_path(&dir.path().join("absent.csv"));
    assert!(matches!(result, Err(CsvError::Io(_))));
}

#[test]
fn test_bad_temperature_rows_do_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daily.csv");
    std::fs::write(
        &path,
        "date,temp_min,temp_max\n2012-01-01,1,2\n2012-01-02,n/a,7\n2012-13-45,1,2\n2012-01-03,3,4\n",
    )
    .unwrap();

    let records = read_daily_temperatures_from_path(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].temp_min, None);
    assert_eq!(records[1].temp_max, Some(7.0));
}

#[test]
fn test_temperature_csv_without_required_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daily.csv");
    std::fs::write(&path, "date,temp_min\n2012-01-01,1\n").unwrap();

    let result = read_daily_temperatures_from_path(&path);
    assert!(matches!(result, Err(CsvError::MissingColumn("temp_max"))));
}
