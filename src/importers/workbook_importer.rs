use calamine::{open_workbook_auto, Reader, Sheets};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cells::{grid_from_range, RawCell};
use crate::config::{ColumnPolicy, DurationFormat, ImportOptions};
use crate::importers::sheet_loader::{SheetLoader, SheetTable};
use crate::importers::sheet_locator::month_sheets;
use crate::models::{CanonicalTable, SignedDuration, Value};
use crate::normalize::{
    signed_duration_to_hms, signed_duration_to_minutes, to_clock_time, to_date, to_float,
    to_integer,
};
use crate::schema::ColumnClass;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Failed to read sheet {sheet}: {msg}")]
    SheetRead { sheet: String, msg: String },

    #[error("No YYMM month sheets found in workbook")]
    NoMonthSheets,

    #[error("Sheet {sheet} has {found} columns, schema expects {expected}")]
    ColumnMismatch {
        sheet: String,
        expected: usize,
        found: usize,
    },
}

/// Anything that can hand out named sheets as raw grids
pub trait SheetSource {
    fn sheet_names(&self) -> Vec<String>;

    fn read_sheet(&mut self, name: &str) -> Result<Vec<Vec<RawCell>>, ImportError>;
}

impl<RS: Read + Seek> SheetSource for Sheets<RS> {
    fn sheet_names(&self) -> Vec<String> {
        <Self as Reader<RS>>::sheet_names(self)
    }

    fn read_sheet(&mut self, name: &str) -> Result<Vec<Vec<RawCell>>, ImportError> {
        let range = self
            .worksheet_range(name)
            .map_err(|e| ImportError::SheetRead {
                sheet: name.to_string(),
                msg: e.to_string(),
            })?;
        Ok(grid_from_range(&range))
    }
}

/// Workbook held in memory, sheets in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<(String, Vec<Vec<RawCell>>)>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, grid: Vec<Vec<RawCell>>) -> Self {
        self.sheets.push((name.into(), grid));
        self
    }
}

impl SheetSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Vec<Vec<RawCell>>, ImportError> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, grid)| grid.clone())
            .ok_or_else(|| ImportError::SheetRead {
                sheet: name.to_string(),
                msg: "sheet not found".to_string(),
            })
    }
}

/// Importer for monthly daylight/weather workbooks (xlsx, xls, ods)
pub struct WorkbookImporter {
    workbook_path: PathBuf,
    options: ImportOptions,
}

impl WorkbookImporter {
    pub fn new(workbook_path: impl AsRef<Path>, options: ImportOptions) -> Self {
        Self {
            workbook_path: workbook_path.as_ref().to_path_buf(),
            options,
        }
    }

    /// Load every month sheet and assemble the canonical table
    pub fn import(&self) -> Result<CanonicalTable, ImportError> {
        info!("Importing workbook: {}", self.workbook_path.display());

        let mut workbook = match open_workbook_auto(&self.workbook_path) {
            Ok(wb) => wb,
            Err(e) => return Err(ImportError::WorkbookOpen(e.to_string())),
        };

        assemble_table(&mut workbook, &self.options)
    }
}

/// Read all `YYMM` tabs of `source` and build one schema-ordered table
///
/// Ranges are read in workbook order; normalizing the tabs has no cross-tab
/// dependency and runs in parallel, results are concatenated in tab order.
pub fn assemble_table<S: SheetSource>(
    source: &mut S,
    options: &ImportOptions,
) -> Result<CanonicalTable, ImportError> {
    let sheet_names = source.sheet_names();
    debug!("Found {} total sheets", sheet_names.len());

    let targets = month_sheets(&sheet_names);
    for name in sheet_names
        .iter()
        .filter(|name| !targets.iter().any(|(t, _, _)| t == *name))
    {
        debug!("Skipping non-month sheet: {}", name);
    }
    if targets.is_empty() {
        return Err(ImportError::NoMonthSheets);
    }

    let mut grids = Vec::with_capacity(targets.len());
    for (name, year, month) in targets {
        let grid = source.read_sheet(&name)?;
        grids.push((name, year, month, grid));
    }

    let loader = SheetLoader::new(options);
    let sheets: Vec<SheetTable> = grids
        .par_iter()
        .map(|(name, year, month, grid)| loader.load(name, *year, *month, grid))
        .collect();

    let mut table = CanonicalTable::new(options.schema);
    for sheet in &sheets {
        check_column_count(sheet, options)?;
        for row in &sheet.rows {
            table.push_row(canonical_row(row.date, &row.cells, options));
        }
    }

    info!(
        "Assembled {} daily rows from {} month sheets",
        table.len(),
        sheets.len()
    );
    Ok(table)
}

fn check_column_count(sheet: &SheetTable, options: &ImportOptions) -> Result<(), ImportError> {
    let expected = options.schema.len();
    let found = sheet.column_count();
    // A tab without rows has nothing to mislabel
    if found == expected || sheet.rows.is_empty() {
        return Ok(());
    }

    match options.column_policy {
        ColumnPolicy::Strict => Err(ImportError::ColumnMismatch {
            sheet: sheet.sheet_name.clone(),
            expected,
            found,
        }),
        ColumnPolicy::Lenient => {
            warn!(
                "Sheet {} has {} columns, schema expects {}; renaming by position",
                sheet.sheet_name, found, expected
            );
            Ok(())
        }
    }
}

/// Rename by position and coerce each cell to its schema column's type
fn canonical_row(
    date: NaiveDate,
    cells: &[RawCell],
    options: &ImportOptions,
) -> Vec<Value> {
    let schema = options.schema;
    let mut row = Vec::with_capacity(schema.len());
    row.push(Value::Date(date));

    for (idx, spec) in schema.columns.iter().enumerate().skip(1) {
        let value = match cells.get(idx - 1) {
            Some(cell) => coerce(cell, spec.class, options.duration_format),
            None => Value::Missing,
        };
        row.push(value);
    }
    row
}

/// Typed coercion for one cell; failures become `Value::Missing`
pub fn coerce(cell: &RawCell, class: ColumnClass, duration_format: DurationFormat) -> Value {
    let value = match class {
        ColumnClass::Date => to_date(cell).map(Value::Date),
        ColumnClass::ClockTime => to_clock_time(cell).map(Value::Time),
        ColumnClass::SignedDuration => match duration_format {
            DurationFormat::Minutes => signed_duration_to_minutes(cell)
                .map(|m| Value::Duration(SignedDuration::Minutes(m))),
            DurationFormat::Hms => {
                signed_duration_to_hms(cell).map(|d| Value::Duration(SignedDuration::Exact(d)))
            }
        },
        ColumnClass::Float => to_float(cell).map(Value::Float),
        ColumnClass::Integer => to_integer(cell).map(Value::Integer),
        ColumnClass::Text => match cell {
            RawCell::Text(s) => Some(Value::Text(s.clone())),
            RawCell::Number(f) => Some(Value::Text(f.to_string())),
            _ => None,
        },
    };
    value.unwrap_or(Value::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeDelta};

    #[test]
    fn test_importer_creation() {
        let importer = WorkbookImporter::new("daytime.xlsx", ImportOptions::default());
        assert_eq!(importer.workbook_path, PathBuf::from("daytime.xlsx"));
    }

    #[test]
    fn test_coerce_by_class() {
        assert_eq!(
            coerce(&RawCell::text("08:44"), ColumnClass::ClockTime, DurationFormat::Minutes),
            Value::Time(NaiveTime::from_hms_opt(8, 44, 0).unwrap())
        );
        assert_eq!(
            coerce(&RawCell::text("-0:42"), ColumnClass::SignedDuration, DurationFormat::Minutes),
            Value::Duration(SignedDuration::Minutes(-42))
        );
        assert_eq!(
            coerce(&RawCell::text("-0:42"), ColumnClass::SignedDuration, DurationFormat::Hms),
            Value::Duration(SignedDuration::Exact(TimeDelta::seconds(-42 * 60)))
        );
        assert_eq!(
            coerce(&RawCell::text("abc"), ColumnClass::Float, DurationFormat::Minutes),
            Value::Missing
        );
        assert_eq!(
            coerce(&RawCell::Number(1012.0), ColumnClass::Integer, DurationFormat::Minutes),
            Value::Integer(1012)
        );
        assert_eq!(
            coerce(&RawCell::text("SW"), ColumnClass::Text, DurationFormat::Minutes),
            Value::Text("SW".to_string())
        );
        assert_eq!(
            coerce(&RawCell::Empty, ColumnClass::Text, DurationFormat::Minutes),
            Value::Missing
        );
    }

    #[test]
    fn test_memory_workbook_missing_sheet() {
        let mut workbook = MemoryWorkbook::new();
        let err = workbook.read_sheet("1201").unwrap_err();
        assert!(matches!(err, ImportError::SheetRead { .. }));
    }
}
