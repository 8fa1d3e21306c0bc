// Shared fixtures: in-memory workbooks shaped like the daylight and station exports
#![allow(dead_code)]

use daylight_ingest::cells::RawCell;
use daylight_ingest::importers::MemoryWorkbook;

pub fn t(s: &str) -> RawCell {
    RawCell::text(s)
}

pub fn n(f: f64) -> RawCell {
    RawCell::Number(f)
}

pub fn daylight_header() -> Vec<RawCell> {
    [
        "Day", "Sunrise", "Sunset", "Length", "Diff.", "Start", "End", "Start", "End", "Start",
        "End", "Time", "Mil. km",
    ]
    .iter()
    .map(|s| t(s))
    .collect()
}

/// One day of a timeanddate-style export, decorations included
pub fn daylight_row(day: u32, diff: &str) -> Vec<RawCell> {
    vec![
        n(day as f64),
        t("08:44 ↑ (134°)"),
        t("15:49 ↑ (226°)"),
        t("7:05:10"),
        t(diff),
        t("06:42"),
        t("17:51"),
        t("07:20"),
        t("17:13"),
        t("08:00"),
        t("16:33"),
        t("12:16 (11.2°)"),
        t("147.098"),
    ]
}

pub fn daylight_sheet(title: &str, rows: Vec<Vec<RawCell>>) -> Vec<Vec<RawCell>> {
    let mut grid = vec![vec![t(title)], daylight_header()];
    grid.extend(rows);
    grid
}

/// Two month tabs plus a notes tab, in non-chronological workbook order
pub fn daylight_workbook() -> MemoryWorkbook {
    MemoryWorkbook::new()
        .with_sheet(
            "1202",
            daylight_sheet(
                "February 2012",
                vec![daylight_row(1, "+2:37"), daylight_row(30, "+2:40")],
            ),
        )
        .with_sheet("Notes", vec![vec![t("Source: timeanddate.com")]])
        .with_sheet(
            "1201",
            daylight_sheet(
                "January 2012",
                vec![
                    daylight_row(1, "+0:15"),
                    daylight_row(2, "--"),
                    vec![t("* All times are local time for Edinburgh")],
                ],
            ),
        )
}

pub fn strathspey_header() -> Vec<RawCell> {
    [
        "Day", "Mean", "Min", "Max", "Rain", "Press am", "Press pm", "Wind", "Gust", "Dir",
        "Sun",
    ]
    .iter()
    .map(|s| t(s))
    .collect()
}

pub fn strathspey_row(day: u32, min: RawCell, max: RawCell) -> Vec<RawCell> {
    vec![
        n(day as f64),
        t("4.5°"),
        min,
        max,
        t("tr"),
        n(1012.0),
        t("1009"),
        n(8.5),
        n(21.0),
        t("SW"),
        n(1.2),
    ]
}

pub fn strathspey_workbook() -> MemoryWorkbook {
    let mut grid = vec![vec![t("Strathspey daily summary")], strathspey_header()];
    grid.push(strathspey_row(1, t("1.5°"), t("7.5°")));
    grid.push(strathspey_row(2, t("-"), n(6.0)));
    MemoryWorkbook::new().with_sheet("1201", grid)
}
