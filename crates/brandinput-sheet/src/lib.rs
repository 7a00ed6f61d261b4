//! Spreadsheet record store: personnel assignments kept in an Excel workbook.

pub mod error;
pub mod locate;
pub mod sheet;

pub use error::SheetError;
pub use locate::locate_workbook;
pub use sheet::{lookup_in_dir, AssignmentSheet};
