//! Canonical column catalogs
//!
//! A schema is the fixed, ordered list of output columns. The first column is
//! always the reconstructed `date`; the rest line up positionally with the
//! data columns of each monthly sheet.

/// How a column's cells are coerced once the sheets are assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnClass {
    Date,
    ClockTime,
    SignedDuration,
    Float,
    Integer,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub class: ColumnClass,
}

const fn col(name: &'static str, class: ColumnClass) -> ColumnSpec {
    ColumnSpec { name, class }
}

/// Daylight timing workbook (sunrise/sunset, twilight and solar noon tables)
pub const DAYLIGHT_COLUMNS: &[ColumnSpec] = &[
    col("date", ColumnClass::Date),
    col("sunrise", ColumnClass::ClockTime),
    col("sunset", ColumnClass::ClockTime),
    col("daylength", ColumnClass::SignedDuration),
    col("daylength_difference", ColumnClass::SignedDuration),
    col("at_start", ColumnClass::ClockTime),
    col("at_end", ColumnClass::ClockTime),
    col("nt_start", ColumnClass::ClockTime),
    col("nt_end", ColumnClass::ClockTime),
    col("ct_start", ColumnClass::ClockTime),
    col("ct_end", ColumnClass::ClockTime),
    col("sn_time", ColumnClass::ClockTime),
    col("sn_mil_km", ColumnClass::Float),
];

/// Strathspey weather station daily summaries
pub const STRATHSPEY_COLUMNS: &[ColumnSpec] = &[
    col("date", ColumnClass::Date),
    col("temp_mean", ColumnClass::Float),
    col("temp_min", ColumnClass::Float),
    col("temp_max", ColumnClass::Float),
    col("rain_mm", ColumnClass::Text),
    col("pressure_early", ColumnClass::Integer),
    col("pressure_late", ColumnClass::Integer),
    col("wind_mean", ColumnClass::Float),
    col("wind_max", ColumnClass::Float),
    col("wind_dir", ColumnClass::Text),
    col("sun_hours", ColumnClass::Float),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl Schema {
    pub const fn daylight() -> Self {
        Self {
            name: "daylight",
            columns: DAYLIGHT_COLUMNS,
        }
    }

    pub const fn strathspey() -> Self {
        Self {
            name: "strathspey",
            columns: STRATHSPEY_COLUMNS,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "daylight" => Some(Self::daylight()),
            "strathspey" => Some(Self::strathspey()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Class of the schema column that sheet data column `index` maps onto
    ///
    /// Data columns exclude the day-of-month column, so they are offset by
    /// one from the schema (which starts with `date`).
    pub fn data_column_class(&self, index: usize) -> Option<ColumnClass> {
        self.columns.get(index + 1).map(|c| c.class)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::daylight()
    }
}
