/// Minute-resolution temperature series
///
/// Expands daily min/max records into one estimate per minute using a single
/// diurnal sinusoid: maximum at the peak hour, minimum twelve hours earlier,
/// the daily mean six hours either side of the peak.
use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use rayon::prelude::*;
use std::collections::HashMap;
use std::f64::consts::PI;
use tracing::{debug, info};

use crate::config::ResampleOptions;
use crate::models::{DailyTemperature, MinuteRecord};

#[derive(Debug, thiserror::Error)]
pub enum ResampleError {
    #[error("Invalid interval: start {start} is after end {end}")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Peak hour {0} outside 0-24")]
    InvalidPeakHour(f64),
}

/// One minute joined to its day's record
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedMinute<'a> {
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub location: Option<&'a str>,
    /// A daily record exists for `date`
    pub joined: bool,
}

/// Every whole minute from `start` to `end`, both included
///
/// Seconds are truncated from both endpoints. An inverted interval yields
/// no minutes.
pub fn build_minute_index(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    let start = truncate_to_minute(start);
    let end = truncate_to_minute(end);
    if start > end {
        return Vec::new();
    }

    let minutes = (end - start).num_minutes();
    (0..=minutes)
        .map(|offset| start + TimeDelta::minutes(offset))
        .collect()
}

fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date()
        .and_hms_opt(ts.hour(), ts.minute(), 0)
        .unwrap_or(ts)
}

/// Left join of minutes onto daily records by calendar date
///
/// When a date appears more than once the first record wins.
pub fn join_daily<'a>(
    minute_index: &[NaiveDateTime],
    daily: &'a [DailyTemperature],
) -> Vec<JoinedMinute<'a>> {
    let mut by_date: HashMap<NaiveDate, &DailyTemperature> = HashMap::new();
    for record in daily {
        by_date.entry(record.date).or_insert(record);
    }

    minute_index
        .iter()
        .map(|&timestamp| {
            let date = timestamp.date();
            let record = by_date.get(&date);
            JoinedMinute {
                timestamp,
                date,
                temp_min: record.and_then(|r| r.temp_min),
                temp_max: record.and_then(|r| r.temp_max),
                location: record.and_then(|r| r.location.as_deref()),
                joined: record.is_some(),
            }
        })
        .collect()
}

/// Diurnal sinusoid evaluated at `hour:minute`
///
/// ```
/// use daylight_ingest::resampler::estimate_temperature;
///
/// assert_eq!(estimate_temperature(5.0, 15.0, 15, 0, 15.0), 15.0);
/// assert_eq!(estimate_temperature(5.0, 15.0, 3, 0, 15.0), 5.0);
/// ```
pub fn estimate_temperature(
    temp_min: f64,
    temp_max: f64,
    hour: u32,
    minute: u32,
    peak_hour: f64,
) -> f64 {
    let t = f64::from(hour) + f64::from(minute) / 60.0;
    let avg = (temp_min + temp_max) / 2.0;
    let amplitude = (temp_max - temp_min) / 2.0;
    avg + amplitude * (PI * (t - peak_hour) / 12.0).cos()
}

/// Estimate for a joined minute; missing when either bound is missing
pub fn estimate_joined(minute: &JoinedMinute<'_>, peak_hour: f64) -> Option<f64> {
    let (temp_min, temp_max) = (minute.temp_min?, minute.temp_max?);
    Some(estimate_temperature(
        temp_min,
        temp_max,
        minute.timestamp.hour(),
        minute.timestamp.minute(),
        peak_hour,
    ))
}

pub struct MinuteResampler {
    options: ResampleOptions,
}

impl MinuteResampler {
    pub fn new(options: ResampleOptions) -> Result<Self, ResampleError> {
        if options.start > options.end {
            return Err(ResampleError::InvalidInterval {
                start: options.start,
                end: options.end,
            });
        }
        if !(0.0..24.0).contains(&options.peak_hour) {
            return Err(ResampleError::InvalidPeakHour(options.peak_hour));
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &ResampleOptions {
        &self.options
    }

    /// Build the minute series for the configured interval
    pub fn resample(&self, daily: &[DailyTemperature]) -> Vec<MinuteRecord> {
        let index = build_minute_index(self.options.start, self.options.end);
        debug!(
            "Resampling {} minutes from {} to {}",
            index.len(),
            self.options.start,
            self.options.end
        );

        let joined = join_daily(&index, daily);
        let peak_hour = self.options.peak_hour;
        let fallback = self.options.location.as_deref();

        let records: Vec<MinuteRecord> = joined
            .par_iter()
            .map(|minute| MinuteRecord {
                timestamp: minute.timestamp,
                date: minute.date,
                estimated_temperature: estimate_joined(minute, peak_hour),
                // Unjoined minutes carry no location
                location: if minute.joined {
                    minute.location.or(fallback).map(str::to_string)
                } else {
                    None
                },
            })
            .collect();

        info!("Resampled {} minutes", records.len());
        records
    }
}

/// Descriptive statistics of an estimated series
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSummary {
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl TemperatureSummary {
    pub fn from_records(records: &[MinuteRecord]) -> Self {
        let values: Vec<f64> = records
            .iter()
            .filter_map(|r| r.estimated_temperature)
            .collect();

        let count = values.len();
        let (min, max, mean) = if values.is_empty() {
            (None, None, None)
        } else {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = values.iter().sum::<f64>() / count as f64;
            (Some(min), Some(max), Some(mean))
        };

        Self {
            count,
            missing: records.len() - count,
            min,
            max,
            mean,
        }
    }
}
