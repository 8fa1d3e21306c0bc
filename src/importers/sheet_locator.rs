//! Monthly tab name decoding
//!
//! Data tabs are named `YYMM` ("1201" = January 2012). Anything else in the
//! workbook (notes, summaries, charts) is not a data table and is skipped.

/// Decode a `YYMM` tab name into `(year, month)`
///
/// Two-digit years below 50 are 2000s, the rest 1900s.
///
/// # Examples
///
/// ```
/// use daylight_ingest::importers::sheet_locator::decode_tab_name;
///
/// assert_eq!(decode_tab_name("1201"), Some((2012, 1)));
/// assert_eq!(decode_tab_name("9912"), Some((1999, 12)));
/// assert_eq!(decode_tab_name("Notes"), None);
/// assert_eq!(decode_tab_name("Summary2021"), None);
/// ```
pub fn decode_tab_name(name: &str) -> Option<(i32, u32)> {
    if name.len() != 4 || !name.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let yy: i32 = name[..2].parse().ok()?;
    let month: u32 = name[2..].parse().ok()?;
    // "1213" passes the pattern but has no calendar month
    if !(1..=12).contains(&month) {
        return None;
    }

    let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
    Some((year, month))
}

/// Tabs worth loading, in workbook order, with their decoded year and month
pub fn month_sheets<S: AsRef<str>>(sheet_names: &[S]) -> Vec<(String, i32, u32)> {
    sheet_names
        .iter()
        .filter_map(|name| {
            let name = name.as_ref();
            decode_tab_name(name).map(|(year, month)| (name.to_string(), year, month))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_y2k_pivot() {
        assert_eq!(decode_tab_name("0001"), Some((2000, 1)));
        assert_eq!(decode_tab_name("4906"), Some((2049, 6)));
        assert_eq!(decode_tab_name("5006"), Some((1950, 6)));
        assert_eq!(decode_tab_name("1112"), Some((2011, 12)));
    }

    #[test]
    fn test_decode_rejects_non_pattern_names() {
        for name in ["Notes", "Summary2021", "120", "12010", " 1201", "12a1", "", "１２０１"] {
            assert_eq!(decode_tab_name(name), None, "{name:?}");
        }
    }

    #[test]
    fn test_decode_rejects_impossible_month() {
        assert_eq!(decode_tab_name("1200"), None);
        assert_eq!(decode_tab_name("1213"), None);
    }

    #[test]
    fn test_month_sheets_preserves_workbook_order() {
        let names = ["Notes", "1203", "1201", "Chart", "1112"];
        let sheets = month_sheets(&names);
        assert_eq!(
            sheets,
            vec![
                ("1203".to_string(), 2012, 3),
                ("1201".to_string(), 2012, 1),
                ("1112".to_string(), 2011, 12),
            ]
        );
    }
}
