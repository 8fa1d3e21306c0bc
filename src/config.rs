use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;

use crate::schema::Schema;

/// Where the column names sit in each monthly sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    /// One header row at this 0-based row index; rows above it are ignored
    Single { row: usize },
    /// Two stacked header rows starting at `top`, flattened to `"{top} {sub}"`
    TwoRow { top: usize },
}

impl HeaderLayout {
    /// First row holding data
    pub fn data_start(&self) -> usize {
        match self {
            HeaderLayout::Single { row } => row + 1,
            HeaderLayout::TwoRow { top } => top + 2,
        }
    }
}

impl Default for HeaderLayout {
    fn default() -> Self {
        // Row 1 is a sheet title, names are on row 2
        HeaderLayout::Single { row: 1 }
    }
}

/// Representation used for every signed-duration column of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DurationFormat {
    /// Whole signed minutes, e.g. `-42`
    #[default]
    Minutes,
    /// Signed `±H:MM:SS`, keeps seconds
    Hms,
}

/// What to do when a sheet does not have exactly one column per schema entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColumnPolicy {
    /// Abort the import with `ColumnMismatch`
    #[default]
    Strict,
    /// Rename the matching prefix, drop extras, leave absent columns missing
    Lenient,
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub schema: Schema,
    pub header: HeaderLayout,
    pub duration_format: DurationFormat,
    pub column_policy: ColumnPolicy,
}

impl ImportOptions {
    pub fn for_schema(schema: Schema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }
}

/// Interval and model parameters for the minute series
#[derive(Debug, Clone)]
pub struct ResampleOptions {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub peak_hour: f64,
    /// Used for days whose record carries no location of its own
    pub location: Option<String>,
}

pub const DEFAULT_PEAK_HOUR: f64 = 15.0;

impl Default for ResampleOptions {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2011, 12, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2012, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        Self {
            start,
            end,
            peak_hour: DEFAULT_PEAK_HOUR,
            location: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_data_start() {
        assert_eq!(HeaderLayout::default().data_start(), 2);
        assert_eq!(HeaderLayout::Single { row: 0 }.data_start(), 1);
        assert_eq!(HeaderLayout::TwoRow { top: 0 }.data_start(), 2);
    }

    #[test]
    fn test_import_defaults() {
        let options = ImportOptions::default();
        assert_eq!(options.schema, Schema::daylight());
        assert_eq!(options.duration_format, DurationFormat::Minutes);
        assert_eq!(options.column_policy, ColumnPolicy::Strict);

        let options = ImportOptions::for_schema(Schema::strathspey());
        assert_eq!(options.schema.name, "strathspey");
    }

    #[test]
    fn test_resample_defaults_cover_leap_year() {
        let options = ResampleOptions::default();
        let minutes = (options.end - options.start).num_minutes() + 1;
        // 31 Dec 2011 plus the 366 days of 2012
        assert_eq!(minutes, 367 * 1440);
        assert_eq!(options.peak_hour, 15.0);
    }
}
