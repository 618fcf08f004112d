// ABOUTME: Spreadsheet import pipeline for LeadHub
// ABOUTME: Column normalization, duplicate-aware merge engine, and XLSX export

pub mod engine;
pub mod export;
pub mod normalize;
pub mod sheet;

// Re-export main types
pub use engine::{import_rows, merge_rows, ImportReport, MergeReport, RowError};
pub use export::leads_to_xlsx;
pub use normalize::{normalize_row, normalize_rows, NormalizedRow};
pub use sheet::{parse_sheet, Row, SheetError};
