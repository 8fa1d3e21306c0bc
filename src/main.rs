use chrono::NaiveDateTime;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use daylight_ingest::config::{
    ColumnPolicy, DurationFormat, HeaderLayout, ImportOptions, ResampleOptions, DEFAULT_PEAK_HOUR,
};
use daylight_ingest::csv_io::{
    read_daily_temperatures_from_path, write_daily_table_to_path, write_minute_series_to_path,
};
use daylight_ingest::importers::WorkbookImporter;
use daylight_ingest::models::DailyTemperature;
use daylight_ingest::resampler::{MinuteResampler, TemperatureSummary};
use daylight_ingest::schema::Schema;

#[derive(Parser)]
#[command(name = "daylight-ingest")]
#[command(about = "Clean monthly daylight workbooks and build minute temperature series", long_about = None)]
struct Cli {
    /// Pipeline mode: 'daily' (clean the daylight workbook), 'minutes' (minute temperature series), 'all' (both)
    #[arg(long, default_value = "all")]
    mode: String,

    /// Workbook with YYMM month tabs to clean
    #[arg(long, env = "DAYLIGHT_WORKBOOK")]
    workbook: Option<PathBuf>,

    /// Cleaned daily table output
    #[arg(long, env = "DAYLIGHT_OUTPUT", default_value = "data/edinburgh-daytime-cleaned.csv")]
    output: PathBuf,

    /// Weather station workbook (Strathspey layout) with daily min/max temperatures
    #[arg(long, env = "TEMPERATURE_WORKBOOK")]
    temperature_workbook: Option<PathBuf>,

    /// CSV with date,temp_min,temp_max[,location] (alternative to --temperature-workbook)
    #[arg(long, env = "TEMPERATURE_CSV")]
    temperature_csv: Option<PathBuf>,

    /// Minute series output
    #[arg(long, env = "MINUTE_OUTPUT", default_value = "data/resampled_minute_data.csv")]
    minute_output: PathBuf,

    /// Column catalog of --workbook: 'daylight' or 'strathspey'
    #[arg(long, default_value = "daylight")]
    schema: String,

    /// 0-based row holding the column names (rows above are ignored)
    #[arg(long, default_value = "1")]
    header_row: usize,

    /// Column names span two rows starting at --header-row
    #[arg(long)]
    two_row_header: bool,

    /// Representation of signed duration columns
    #[arg(long, value_enum, default_value_t = DurationFormat::Minutes)]
    duration_format: DurationFormat,

    /// Behaviour when a sheet's column count differs from the schema
    #[arg(long, value_enum, default_value_t = ColumnPolicy::Strict)]
    column_policy: ColumnPolicy,

    /// Sort the daily table by date instead of keeping tab order
    #[arg(long)]
    sort: bool,

    /// First minute of the series (YYYY-MM-DDTHH:MM)
    #[arg(long, default_value = "2011-12-31T00:00", value_parser = parse_minute)]
    start: NaiveDateTime,

    /// Last minute of the series, included (YYYY-MM-DDTHH:MM)
    #[arg(long, default_value = "2012-12-31T23:59", value_parser = parse_minute)]
    end: NaiveDateTime,

    /// Hour of the daily temperature maximum
    #[arg(long, default_value_t = DEFAULT_PEAK_HOUR)]
    peak_hour: f64,

    /// Location label for temperature records that carry none
    #[arg(long)]
    location: Option<String>,
}

impl Cli {
    fn import_options(&self, schema: Schema) -> ImportOptions {
        let header = if self.two_row_header {
            HeaderLayout::TwoRow {
                top: self.header_row,
            }
        } else {
            HeaderLayout::Single {
                row: self.header_row,
            }
        };
        ImportOptions {
            schema,
            header,
            duration_format: self.duration_format,
            column_policy: self.column_policy,
        }
    }

    fn resample_options(&self) -> ResampleOptions {
        ResampleOptions {
            start: self.start,
            end: self.end,
            peak_hour: self.peak_hour,
            location: self.location.clone(),
        }
    }
}

fn parse_minute(value: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| format!("Invalid timestamp '{value}', expected YYYY-MM-DDTHH:MM"))
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,daylight_ingest=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();

    match cli.mode.as_str() {
        "daily" => run_daily(&cli)?,
        "minutes" => run_minutes(&cli)?,
        "all" => {
            run_daily(&cli)?;
            run_minutes(&cli)?;
        }
        _ => {
            return Err(format!(
                "Invalid mode '{}'. Valid modes: daily, minutes, all",
                cli.mode
            )
            .into());
        }
    }

    info!("Pipeline completed successfully!");
    Ok(())
}

fn run_daily(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let workbook = cli
        .workbook
        .as_ref()
        .ok_or("--workbook is required for daily mode")?;
    if !workbook.exists() {
        error!("File not found: {workbook:?}");
        return Err(format!("File not found: {workbook:?}").into());
    }

    let schema = Schema::by_name(&cli.schema)
        .ok_or_else(|| format!("Unknown schema '{}'. Valid: daylight, strathspey", cli.schema))?;

    let pb = spinner(format!("Cleaning workbook {}...", workbook.display()));
    let mut table = WorkbookImporter::new(workbook, cli.import_options(schema)).import()?;
    if cli.sort {
        table.sort_by_date();
    }
    pb.finish_with_message(format!("✓ Cleaned {} daily rows", table.len()));

    if schema == Schema::daylight() {
        let records = table.daily_records();
        if let (Some(first), Some(last)) = (records.first(), records.last()) {
            info!(
                "Daylight records: {} rows, {} to {}",
                records.len(),
                first.date,
                last.date
            );
        }
    }

    write_daily_table_to_path(&table, &cli.output)?;
    info!(
        "Daily table written to {} in {:.2?}",
        cli.output.display(),
        start_time.elapsed()
    );
    Ok(())
}

fn run_minutes(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let daily = load_daily_temperatures(cli)?;

    let resampler = MinuteResampler::new(cli.resample_options())?;
    let pb = spinner(format!(
        "Resampling {} to {} at one-minute resolution...",
        cli.start, cli.end
    ));
    let records = resampler.resample(&daily);
    pb.finish_with_message(format!("✓ Estimated {} minutes", records.len()));

    let summary = TemperatureSummary::from_records(&records);
    info!(
        "Temperature summary: count={}, missing={}, min={:?}, max={:?}, mean={:?}",
        summary.count, summary.missing, summary.min, summary.max, summary.mean
    );

    write_minute_series_to_path(&records, &cli.minute_output)?;
    info!(
        "Minute series written to {} in {:.2?}",
        cli.minute_output.display(),
        start_time.elapsed()
    );
    Ok(())
}

fn load_daily_temperatures(cli: &Cli) -> Result<Vec<DailyTemperature>, Box<dyn std::error::Error>> {
    if let Some(csv_path) = &cli.temperature_csv {
        return Ok(read_daily_temperatures_from_path(csv_path)?);
    }

    let workbook = cli
        .temperature_workbook
        .as_ref()
        .ok_or("--temperature-workbook or --temperature-csv is required for minutes mode")?;
    let table =
        WorkbookImporter::new(workbook, cli.import_options(Schema::strathspey())).import()?;
    Ok(DailyTemperature::from_table(
        &table,
        cli.location.as_deref(),
    )?)
}
