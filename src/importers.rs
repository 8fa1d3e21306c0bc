// Workbook importers: tab selection, per-sheet loading and table assembly

pub mod sheet_loader;
pub mod sheet_locator;
pub mod workbook_importer;

// Re-export commonly used items
pub use sheet_loader::{SheetLoader, SheetRow, SheetTable};
pub use sheet_locator::decode_tab_name;
pub use workbook_importer::{
    assemble_table, ImportError, MemoryWorkbook, SheetSource, WorkbookImporter,
};
