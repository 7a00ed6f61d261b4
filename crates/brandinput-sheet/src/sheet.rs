//! Row matching over the assignment worksheet.
//!
//! Layout (row 0 is the header):
//!
//! | col | content                        |
//! |-----|--------------------------------|
//! | A   | advertiser name                |
//! | B   | account id (parent company)    |
//! | C   | account type                   |
//! | D   | media partner (blank = none)   |
//! | F   | solutions manager (primary)    |
//! | G   | solutions manager (secondary)  |
//! | J   | client analytics               |
//!
//! Columns F through J are the watcher candidates.

use std::path::Path;

use brandinput_core::record::non_empty;
use brandinput_core::{LookupKey, PersonnelRecord};
use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::SheetError;
use crate::locate::locate_workbook;

const COL_ADVERTISER: usize = 0;
const COL_ACCOUNT: usize = 1;
const COL_ACCOUNT_TYPE: usize = 2;
const COL_MEDIA_PARTNER: usize = 3;
const COL_PRIMARY: usize = 5;
const COL_SECONDARY: usize = 6;
const COL_CLIENT_ANALYTICS: usize = 9;
const WATCHER_COLS: std::ops::RangeInclusive<usize> = 5..=9;

/// One worksheet loaded into memory.
pub struct AssignmentSheet {
    range: Range<Data>,
}

impl AssignmentSheet {
    /// Opens `sheet` from the workbook at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Calamine`] if the file cannot be read or has no
    /// such sheet.
    pub fn open(path: &Path, sheet: &str) -> Result<Self, SheetError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range(sheet)?;
        Ok(Self { range })
    }

    #[must_use]
    pub fn from_range(range: Range<Data>) -> Self {
        Self { range }
    }

    /// Index (within the range) of the first data row matching `key` and
    /// `media_partner`. A `None` partner only matches a blank partner cell.
    #[must_use]
    pub fn find_row(&self, key: &LookupKey, media_partner: Option<&str>) -> Option<usize> {
        self.range
            .rows()
            .enumerate()
            .skip(1)
            .find(|(_, row)| {
                key_matches(row, key)
                    && partner_matches(cell(row, COL_MEDIA_PARTNER), media_partner)
            })
            .map(|(index, _)| index)
    }

    /// Builds a record from row `index`; `None` if the row is out of range.
    #[must_use]
    pub fn read_record(&self, index: usize) -> Option<PersonnelRecord> {
        let row = self.range.rows().nth(index)?;
        let text = |col| cell(row, col).and_then(cell_text);
        Some(PersonnelRecord {
            account_type: text(COL_ACCOUNT_TYPE),
            media_partner: text(COL_MEDIA_PARTNER),
            primary_manager: text(COL_PRIMARY),
            secondary_manager: text(COL_SECONDARY),
            client_analytics: text(COL_CLIENT_ANALYTICS),
            watchers: PersonnelRecord::collect_watchers(WATCHER_COLS.map(text)),
        })
    }

    #[must_use]
    pub fn lookup(&self, key: &LookupKey, media_partner: Option<&str>) -> Option<PersonnelRecord> {
        self.find_row(key, media_partner)
            .and_then(|index| self.read_record(index))
    }
}

/// Locates the workbook in `dir`, opens `sheet`, and looks up one record.
///
/// # Errors
///
/// Propagates [`SheetError`] from locating or reading the workbook. A missing
/// row is `Ok(None)`.
pub fn lookup_in_dir(
    dir: &Path,
    sheet: &str,
    key: &LookupKey,
    media_partner: Option<&str>,
) -> Result<Option<PersonnelRecord>, SheetError> {
    let path = locate_workbook(dir)?;
    tracing::debug!(workbook = %path.display(), %key, "reading assignment sheet");
    Ok(AssignmentSheet::open(&path, sheet)?.lookup(key, media_partner))
}

fn cell(row: &[Data], col: usize) -> Option<&Data> {
    row.get(col)
}

fn key_matches(row: &[Data], key: &LookupKey) -> bool {
    match key {
        LookupKey::Account(account) => cell(row, COL_ACCOUNT).is_some_and(|c| match c {
            Data::Int(n) => *n == account.0,
            #[allow(clippy::cast_precision_loss)]
            Data::Float(f) => *f == account.0 as f64,
            Data::String(s) => s.trim().parse::<i64>().is_ok_and(|n| n == account.0),
            _ => false,
        }),
        LookupKey::Advertiser(name) => cell(row, COL_ADVERTISER)
            .and_then(cell_text)
            .is_some_and(|text| text == name.trim()),
    }
}

fn partner_matches(cell: Option<&Data>, wanted: Option<&str>) -> bool {
    let actual = cell.and_then(cell_text);
    match wanted {
        None => actual.is_none(),
        Some(partner) => actual.as_deref() == Some(partner.trim()),
    }
}

/// Trimmed text of a cell; whole floats render without the `.0`.
fn cell_text(data: &Data) -> Option<String> {
    match data {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => non_empty(s),
        Data::Int(n) => Some(n.to_string()),
        #[allow(clippy::cast_possible_truncation)]
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => Some((*f as i64).to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.to_string()),
        Data::Empty | Data::Error(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use brandinput_core::{AccountKey, AccountTier};

    use super::*;

    fn s(value: &str) -> Data {
        Data::String(value.to_string())
    }

    /// Header plus `rows`, each padded to ten columns.
    fn sheet(rows: &[Vec<Data>]) -> AssignmentSheet {
        let height = u32::try_from(rows.len()).unwrap();
        let mut range = Range::new((0, 0), (height, 9));
        let header = [
            "Advertiser",
            "PID",
            "Account Type",
            "Media Partner",
            "Notes",
            "Solutions Mgr",
            "Solutions Manager",
            "Leader",
            "Consultant",
            "Client Analytics",
        ];
        for (col, title) in header.iter().enumerate() {
            range.set_value((0, u32::try_from(col).unwrap()), s(title));
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                range.set_value(
                    (u32::try_from(r + 1).unwrap(), u32::try_from(c).unwrap()),
                    value.clone(),
                );
            }
        }
        AssignmentSheet::from_range(range)
    }

    fn acme_rows() -> Vec<Vec<Data>> {
        vec![
            vec![
                s("Acme Foods"),
                Data::Float(501.0),
                s("Enterprise"),
                Data::Empty,
                Data::Empty,
                s("pat.lee"),
                s("sam.ortiz"),
                s("lee.park"),
                Data::Empty,
                s("dana.li"),
            ],
            vec![
                s("Acme Foods"),
                Data::Int(501),
                s("Core Brands"),
                s("YouTube"),
                Data::Empty,
                s("kim.ng"),
                Data::Empty,
                Data::Empty,
                Data::Empty,
                Data::Empty,
            ],
        ]
    }

    #[test]
    fn matches_account_with_blank_partner() {
        let sheet = sheet(&acme_rows());
        let record = sheet
            .lookup(&LookupKey::Account(AccountKey(501)), None)
            .expect("row should match");

        assert_eq!(record.primary_manager.as_deref(), Some("pat.lee"));
        assert_eq!(record.secondary_manager.as_deref(), Some("sam.ortiz"));
        assert_eq!(record.client_analytics.as_deref(), Some("dana.li"));
        assert_eq!(record.watchers, ["pat.lee", "sam.ortiz", "lee.park", "dana.li"]);
        assert_eq!(record.tier(), AccountTier::Open);
    }

    #[test]
    fn partner_selects_its_own_row() {
        let sheet = sheet(&acme_rows());
        let record = sheet
            .lookup(&LookupKey::Account(AccountKey(501)), Some("YouTube"))
            .expect("partner row should match");

        assert_eq!(record.tier(), AccountTier::Restricted);
        assert_eq!(record.primary_manager.as_deref(), Some("kim.ng"));
        assert_eq!(record.watchers, ["kim.ng"]);
    }

    #[test]
    fn advertiser_key_matches_column_a() {
        let sheet = sheet(&acme_rows());
        let row = sheet.find_row(&LookupKey::Advertiser("Acme Foods".to_string()), None);
        assert_eq!(row, Some(1));
    }

    #[test]
    fn string_account_cells_are_parsed() {
        let sheet = sheet(&[vec![s("Zeta"), s(" 77 "), s("Enterprise")]]);
        assert_eq!(sheet.find_row(&LookupKey::Account(AccountKey(77)), None), Some(1));
    }

    #[test]
    fn unknown_partner_or_account_is_none() {
        let sheet = sheet(&acme_rows());
        assert!(sheet
            .lookup(&LookupKey::Account(AccountKey(501)), Some("Spotify"))
            .is_none());
        assert!(sheet.lookup(&LookupKey::Account(AccountKey(9)), None).is_none());
    }

    #[test]
    fn header_row_never_matches() {
        let sheet = sheet(&[]);
        assert!(sheet
            .find_row(&LookupKey::Advertiser("Advertiser".to_string()), None)
            .is_none());
    }

    #[test]
    fn non_workbook_file_is_calamine_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.xlsx"), b"not a zip").unwrap();

        let err = lookup_in_dir(
            dir.path(),
            "CPG",
            &LookupKey::Account(AccountKey(1)),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SheetError::Calamine(_)), "{err:?}");
    }
}
