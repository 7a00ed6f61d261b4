use std::path::{Path, PathBuf};

use crate::error::SheetError;

/// Finds the assignment workbook in `dir`.
///
/// The directory is expected to hold exactly one `.xlsx` file; when several
/// are present the last in lexical order wins. Excel lock files (`~$name.xlsx`)
/// are ignored.
///
/// # Errors
///
/// Returns [`SheetError::NoWorkbook`] when no workbook is present, or
/// [`SheetError::Pattern`] if `dir` cannot be turned into a glob pattern.
pub fn locate_workbook(dir: &Path) -> Result<PathBuf, SheetError> {
    let pattern = format!(
        "{}/*.xlsx",
        glob::Pattern::escape(dir.to_string_lossy().trim_end_matches('/'))
    );

    let mut matches: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(Result::ok)
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.starts_with("~$"))
        })
        .collect();
    matches.sort();

    if matches.len() > 1 {
        tracing::warn!(
            dir = %dir.display(),
            count = matches.len(),
            "several workbooks found, using the last"
        );
    }

    matches.pop().ok_or_else(|| SheetError::NoWorkbook {
        dir: dir.to_path_buf(),
    })
}
