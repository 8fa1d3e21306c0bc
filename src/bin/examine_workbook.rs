use calamine::{open_workbook_auto, Reader};
use daylight_ingest::cells::{grid_from_range, RawCell};
use daylight_ingest::importers::decode_tab_name;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let file_path = args
        .get(1)
        .map(String::as_str)
        .unwrap_or("data/Edinburgh-daytime.xlsx");

    println!("Opening workbook: {file_path}");
    let mut workbook = open_workbook_auto(file_path)?;
    let sheet_names = workbook.sheet_names();

    println!("\nSheets:");
    for (i, name) in sheet_names.iter().enumerate() {
        match decode_tab_name(name) {
            Some((year, month)) => println!("  {i}: {name} -> {year}-{month:02}"),
            None => println!("  {i}: {name} (skipped)"),
        }
    }

    // Allow specifying which sheet to examine, default to the first month tab
    let sheet_name = match args.get(2) {
        Some(name) => name.clone(),
        None => match sheet_names.iter().find(|n| decode_tab_name(n).is_some()) {
            Some(name) => name.clone(),
            None => {
                println!("\nNo YYMM month sheets in workbook");
                return Ok(());
            }
        },
    };

    println!("\n\nExamining sheet: {sheet_name}");
    println!("{}", "=".repeat(100));

    let range = workbook.worksheet_range(&sheet_name)?;
    let grid = grid_from_range(&range);

    println!("Dimensions: {:?}", range.get_size());
    println!("\nFirst 40 rows (showing first 14 columns):");
    println!("{}", "=".repeat(100));

    for (row_idx, row) in grid.iter().enumerate().take(40) {
        if row.iter().all(RawCell::is_empty) {
            continue;
        }
        print!("Row {:3}: ", row_idx + 1);
        for cell in row.iter().take(14) {
            match cell {
                RawCell::Empty => print!("[empty] "),
                other => print!("[{other:?}] "),
            }
        }
        println!();
    }

    Ok(())
}
