use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("no .xlsx workbook found in {}", dir.display())]
    NoWorkbook { dir: PathBuf },

    #[error("invalid workbook search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("workbook read failed: {0}")]
    Calamine(#[from] calamine::Error),
}
