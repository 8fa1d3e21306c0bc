/// Untyped spreadsheet cells
///
/// Every worksheet is converted into a grid of `RawCell`s before any
/// normalization happens, so the rest of the pipeline never touches calamine
/// types directly.
use calamine::{Data, Range};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

/// A single scalar as it was found in the workbook
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Duration(TimeDelta),
}

impl RawCell {
    pub fn text(value: impl Into<String>) -> Self {
        RawCell::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawCell::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawCell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&Data> for RawCell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::Float(f) => RawCell::Number(*f),
            Data::String(s) => RawCell::Text(s.clone()),
            Data::Bool(b) => RawCell::Text(b.to_string()),
            Data::DateTime(excel_dt) => {
                if excel_dt.is_duration() {
                    return excel_dt
                        .as_duration()
                        .map(RawCell::Duration)
                        .unwrap_or(RawCell::Empty);
                }
                // Serials below one day carry no calendar date (time-formatted cells)
                let time_only = excel_dt.as_f64() < 1.0;
                match excel_dt.as_datetime() {
                    Some(dt) if time_only => RawCell::Time(dt.time()),
                    Some(dt) => RawCell::DateTime(dt),
                    None => RawCell::Empty,
                }
            }
            Data::DateTimeIso(s) => parse_iso(s),
            Data::DurationIso(s) => RawCell::Text(s.clone()),
            Data::Error(_) | Data::Empty => RawCell::Empty,
        }
    }
}

/// ODS files report dates as ISO strings; keep the text if none of the shapes fit
fn parse_iso(value: &str) -> RawCell {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return RawCell::DateTime(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return RawCell::DateTime(date.and_time(NaiveTime::MIN));
    }
    if let Ok(time) = NaiveTime::parse_from_str(value, "%H:%M:%S%.f") {
        return RawCell::Time(time);
    }
    RawCell::Text(value.to_string())
}

/// Convert a worksheet range into a row-major grid anchored at cell A1
///
/// calamine trims leading empty rows and columns from a range; they are padded
/// back so that row indices match the row numbers a person sees in the sheet.
pub fn grid_from_range(range: &Range<Data>) -> Vec<Vec<RawCell>> {
    let Some((first_row, first_col)) = range.start() else {
        return Vec::new();
    };

    let mut grid: Vec<Vec<RawCell>> = vec![Vec::new(); first_row as usize];
    for row in range.rows() {
        let mut cells = vec![RawCell::Empty; first_col as usize];
        cells.extend(row.iter().map(RawCell::from));
        grid.push(cells);
    }
    grid
}
