use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Deserialize;
use std::fmt;

use crate::normalize::format_signed_hms;
use crate::schema::Schema;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}

/// A signed elapsed time in whichever representation the run was configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedDuration {
    Minutes(i64),
    Exact(TimeDelta),
}

impl SignedDuration {
    pub fn total_minutes(&self) -> i64 {
        match self {
            SignedDuration::Minutes(m) => *m,
            SignedDuration::Exact(d) => d.num_seconds().div_euclid(60),
        }
    }
}

impl fmt::Display for SignedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignedDuration::Minutes(m) => write!(f, "{m}"),
            SignedDuration::Exact(d) => f.write_str(&format_signed_hms(d)),
        }
    }
}

/// A typed cell of the canonical table; `Missing` is the only spelling of "no value"
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(SignedDuration),
    Float(f64),
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<SignedDuration> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Value::Duration(d) => write!(f, "{d}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

static MISSING: Value = Value::Missing;

/// The assembled, schema-ordered daily table
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTable {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl CanonicalTable {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Append a row in schema order
    ///
    /// Short rows are padded with `Missing` and long rows truncated, so every
    /// row always has exactly one value per schema column.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.schema.len(), Value::Missing);
        self.rows.push(row);
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.schema.position(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let idx = self.schema.position(name)?;
        Some(self.rows.iter().map(move |r| r.get(idx).unwrap_or(&MISSING)))
    }

    /// Stable chronological sort; rows keep tab order within a date
    pub fn sort_by_date(&mut self) {
        self.rows
            .sort_by_key(|row| row.first().and_then(Value::as_date).unwrap_or(NaiveDate::MAX));
    }

    /// Typed view over a daylight table; columns absent from the schema read as missing
    pub fn daily_records(&self) -> Vec<DailyRecord> {
        let get = |row: &[Value], name: &str| -> Value {
            self.schema
                .position(name)
                .and_then(|idx| row.get(idx).cloned())
                .unwrap_or(Value::Missing)
        };

        self.rows
            .iter()
            .filter_map(|row| {
                let date = get(row, "date").as_date()?;
                Some(DailyRecord {
                    date,
                    sunrise: get(row, "sunrise").as_time(),
                    sunset: get(row, "sunset").as_time(),
                    daylength: get(row, "daylength").as_duration(),
                    daylength_difference: get(row, "daylength_difference").as_duration(),
                    at_start: get(row, "at_start").as_time(),
                    at_end: get(row, "at_end").as_time(),
                    nt_start: get(row, "nt_start").as_time(),
                    nt_end: get(row, "nt_end").as_time(),
                    ct_start: get(row, "ct_start").as_time(),
                    ct_end: get(row, "ct_end").as_time(),
                    sn_time: get(row, "sn_time").as_time(),
                    sn_mil_km: get(row, "sn_mil_km").as_float(),
                })
            })
            .collect()
    }
}

/// One day of daylight timings
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub sunrise: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
    pub daylength: Option<SignedDuration>,
    pub daylength_difference: Option<SignedDuration>,
    // Astronomical, nautical and civil twilight
    pub at_start: Option<NaiveTime>,
    pub at_end: Option<NaiveTime>,
    pub nt_start: Option<NaiveTime>,
    pub nt_end: Option<NaiveTime>,
    pub ct_start: Option<NaiveTime>,
    pub ct_end: Option<NaiveTime>,
    // Solar noon and Earth-Sun distance (million km)
    pub sn_time: Option<NaiveTime>,
    pub sn_mil_km: Option<f64>,
}

/// Daily min/max feeding the minute resampler
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyTemperature {
    pub date: NaiveDate,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub temp_min: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
}

impl DailyTemperature {
    /// Pull date/temp_min/temp_max (and `location` when present) out of a table
    pub fn from_table(
        table: &CanonicalTable,
        default_location: Option<&str>,
    ) -> Result<Vec<DailyTemperature>, TableError> {
        let schema = table.schema();
        let date_idx = schema
            .position("date")
            .ok_or(TableError::MissingColumn("date"))?;
        let min_idx = schema
            .position("temp_min")
            .ok_or(TableError::MissingColumn("temp_min"))?;
        let max_idx = schema
            .position("temp_max")
            .ok_or(TableError::MissingColumn("temp_max"))?;
        let location_idx = schema.position("location");

        Ok(table
            .rows()
            .iter()
            .filter_map(|row| {
                let date = row.get(date_idx)?.as_date()?;
                let location = location_idx
                    .and_then(|idx| row.get(idx))
                    .and_then(Value::as_text)
                    .map(str::to_string)
                    .or_else(|| default_location.map(str::to_string));
                Some(DailyTemperature {
                    date,
                    temp_min: row.get(min_idx).and_then(Value::as_float),
                    temp_max: row.get(max_idx).and_then(Value::as_float),
                    location,
                })
            })
            .collect())
    }
}

/// One synthetic minute of the resampled series
#[derive(Debug, Clone, PartialEq)]
pub struct MinuteRecord {
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub estimated_temperature: Option<f64>,
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 1, d).unwrap()
    }

    fn strathspey_row(day: u32, min: Value, max: Value) -> Vec<Value> {
        let mut row = vec![Value::Missing; Schema::strathspey().len()];
        row[0] = Value::Date(date(day));
        row[2] = min;
        row[3] = max;
        row
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Missing.to_string(), "");
        assert_eq!(Value::Date(date(5)).to_string(), "2012-01-05");
        assert_eq!(
            Value::Time(NaiveTime::from_hms_opt(8, 4, 0).unwrap()).to_string(),
            "08:04:00"
        );
        assert_eq!(
            Value::Duration(SignedDuration::Minutes(-42)).to_string(),
            "-42"
        );
        assert_eq!(
            Value::Duration(SignedDuration::Exact(TimeDelta::seconds(-135))).to_string(),
            "-0:02:15"
        );
        assert_eq!(Value::Float(147.098).to_string(), "147.098");
    }

    #[test]
    fn test_signed_duration_total_minutes() {
        assert_eq!(SignedDuration::Minutes(85).total_minutes(), 85);
        assert_eq!(
            SignedDuration::Exact(TimeDelta::seconds(-61)).total_minutes(),
            -2
        );
    }

    #[test]
    fn test_sort_by_date_is_stable() {
        let mut table = CanonicalTable::new(Schema::strathspey());
        table.push_row(strathspey_row(3, Value::Float(1.0), Value::Missing));
        table.push_row(strathspey_row(1, Value::Float(2.0), Value::Missing));
        table.push_row(strathspey_row(3, Value::Float(3.0), Value::Missing));
        table.sort_by_date();

        let mins: Vec<_> = table
            .column("temp_min")
            .unwrap()
            .map(|v| v.as_float().unwrap())
            .collect();
        assert_eq!(mins, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_daily_temperature_from_table() {
        let mut table = CanonicalTable::new(Schema::strathspey());
        table.push_row(strathspey_row(1, Value::Float(-1.5), Value::Float(6.0)));
        table.push_row(strathspey_row(2, Value::Missing, Value::Integer(7)));

        let temps = DailyTemperature::from_table(&table, Some("Strathspey")).unwrap();
        assert_eq!(temps.len(), 2);
        assert_eq!(temps[0].temp_min, Some(-1.5));
        assert_eq!(temps[1].temp_min, None);
        assert_eq!(temps[1].temp_max, Some(7.0));
        assert_eq!(temps[0].location.as_deref(), Some("Strathspey"));
    }

    #[test]
    fn test_daily_temperature_requires_columns() {
        let table = CanonicalTable::new(Schema::daylight());
        let err = DailyTemperature::from_table(&table, None).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn("temp_min")));
    }

    #[test]
    fn test_push_row_keeps_schema_width() {
        let mut table = CanonicalTable::new(Schema::strathspey());
        table.push_row(vec![Value::Date(date(1)), Value::Float(4.5)]);
        let mut long = strathspey_row(2, Value::Float(1.0), Value::Float(2.0));
        long.push(Value::Text("extra".to_string()));
        table.push_row(long);

        assert!(table.rows().iter().all(|r| r.len() == Schema::strathspey().len()));
        assert_eq!(table.value(0, "sun_hours"), Some(&Value::Missing));
        assert_eq!(table.column("temp_max").unwrap().count(), 2);

        let daily = DailyTemperature::from_table(&table, None).unwrap();
        assert_eq!(daily[0].temp_min, None);
        assert_eq!(daily[1].temp_max, Some(2.0));
    }
}
