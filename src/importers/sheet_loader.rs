/// Monthly sheet loader
///
/// Turns the raw grid of one `YYMM` tab into dated rows of cleaned cells.
///
/// # Expected Sheet Structure (default header layout):
/// ```text
/// Row 1: Title ("Edinburgh, January 2012")
/// Row 2: Column names (Day | Sunrise | Sunset | Length | Diff. | ...)
/// Row 3+: One row per day, day-of-month in the first named column
/// Trailer: blank rows, footnotes (dropped: no day-of-month)
/// ```
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::cells::RawCell;
use crate::config::{HeaderLayout, ImportOptions};
use crate::normalize::{clean_cell, extract_time, parse_day_of_month};
use crate::schema::{ColumnClass, Schema};

/// One tab after loading, before renaming to the canonical schema
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub year: i32,
    pub month: u32,
    /// Headers of the data columns (the day-of-month column is consumed)
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
    /// Non-blank rows without a usable day-of-month or calendar date
    pub dropped_rows: usize,
}

impl SheetTable {
    /// Column count including the reconstructed date
    pub fn column_count(&self) -> usize {
        self.headers.len() + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub date: NaiveDate,
    pub cells: Vec<RawCell>,
}

pub struct SheetLoader {
    header: HeaderLayout,
    schema: Schema,
}

impl SheetLoader {
    pub fn new(options: &ImportOptions) -> Self {
        Self {
            header: options.header,
            schema: options.schema,
        }
    }

    /// Load one tab whose name already decoded to `(year, month)`
    pub fn load(
        &self,
        sheet_name: &str,
        year: i32,
        month: u32,
        grid: &[Vec<RawCell>],
    ) -> SheetTable {
        let names = self.column_names(grid);

        // Blank headers are layout columns (spacers, merged-cell leftovers)
        let named: Vec<usize> = names
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| name.as_ref().map(|_| idx))
            .collect();

        let mut table = SheetTable {
            sheet_name: sheet_name.to_string(),
            year,
            month,
            headers: Vec::new(),
            rows: Vec::new(),
            dropped_rows: 0,
        };

        let Some((&day_col, data_cols)) = named.split_first() else {
            debug!("Sheet {} has no named columns, nothing to load", sheet_name);
            return table;
        };

        table.headers = data_cols
            .iter()
            .filter_map(|&idx| names[idx].clone())
            .collect();

        for row in grid.iter().skip(self.header.data_start()) {
            if row.iter().all(RawCell::is_empty) {
                continue;
            }

            let day_cell = row.get(day_col).unwrap_or(&RawCell::Empty);
            let date = match parse_day_of_month(day_cell)
                .and_then(|day| NaiveDate::from_ymd_opt(year, month, day))
            {
                Some(d) => d,
                None => {
                    table.dropped_rows += 1;
                    continue;
                }
            };

            let cells = data_cols
                .iter()
                .enumerate()
                .map(|(pos, &col)| {
                    let cell = row.get(col).cloned().unwrap_or(RawCell::Empty);
                    self.normalize_cell(pos, cell)
                })
                .collect();

            table.rows.push(SheetRow { date, cells });
        }

        if table.dropped_rows > 0 {
            debug!(
                "Dropped {} rows without a valid day in sheet {}",
                table.dropped_rows, sheet_name
            );
        }
        info!(
            "Parsed {} days from sheet {} ({}-{:02})",
            table.rows.len(),
            sheet_name,
            year,
            month
        );
        table
    }

    /// Header name per column; `None` marks a column with no name provided
    fn column_names(&self, grid: &[Vec<RawCell>]) -> Vec<Option<String>> {
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let cell_at = |row: usize, col: usize| -> Option<String> {
            grid.get(row).and_then(|r| r.get(col)).and_then(header_text)
        };

        match self.header {
            HeaderLayout::Single { row } => (0..width).map(|col| cell_at(row, col)).collect(),
            HeaderLayout::TwoRow { top } => {
                let mut current_top: Option<String> = None;
                (0..width)
                    .map(|col| {
                        let top_name = cell_at(top, col);
                        let sub_name = cell_at(top + 1, col);
                        // Merged group headers only fill their first cell
                        if top_name.is_some() {
                            current_top = top_name;
                        } else if sub_name.is_none() {
                            return None;
                        }
                        let joined = format!(
                            "{} {}",
                            current_top.as_deref().unwrap_or(""),
                            sub_name.as_deref().unwrap_or("")
                        );
                        Some(joined.trim().to_string())
                    })
                    .collect()
            }
        }
    }

    fn normalize_cell(&self, data_col: usize, cell: RawCell) -> RawCell {
        let cell = clean_cell(cell);
        match self.schema.data_column_class(data_col) {
            Some(ColumnClass::ClockTime) => extract_time(&cell),
            _ => cell,
        }
    }
}

fn header_text(cell: &RawCell) -> Option<String> {
    let text = match cell {
        RawCell::Text(s) => s.trim().to_string(),
        RawCell::Number(f) => f.to_string(),
        RawCell::DateTime(dt) => dt.format("%Y-%m-%d").to_string(),
        RawCell::Time(t) => t.format("%H:%M").to_string(),
        RawCell::Duration(_) | RawCell::Empty => return None,
    };
    (!text.is_empty()).then_some(text)
}
