//! Record store selection: one backend per process, chosen from configuration.

use std::path::PathBuf;

use brandinput_core::{
    AppConfig, DataSource, LookupKey, PersonnelRecord, RecordSource, SourceContext,
};
use brandinput_db::{DbError, PoolConfig, TableRef};
use brandinput_sheet::SheetError;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum SourceError {
    #[error(transparent)]
    Sheet(#[from] SheetError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("spreadsheet read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub(crate) enum RecordStore {
    Spreadsheet { dir: PathBuf, sheet: String },
    Database { pool: PgPool, table: TableRef },
}

impl RecordStore {
    /// Builds the configured backend.
    ///
    /// The database pool connects lazily, so an unreachable server fails each
    /// lookup (and notifies) instead of aborting the run.
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match config.data_source {
            DataSource::Spreadsheet => Ok(Self::Spreadsheet {
                dir: config.spreadsheet_dir.clone(),
                sheet: config.spreadsheet_sheet.clone(),
            }),
            DataSource::Database => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| {
                        anyhow::anyhow!("DATABASE_URL is required for the database source")
                    })?;
                Ok(Self::Database {
                    pool: brandinput_db::connect_lazy(url, PoolConfig::default())?,
                    table: TableRef::new(&config.db_schema, &config.db_table)?,
                })
            }
        }
    }

    /// Logs whether the backend is reachable; never fails the run.
    pub(crate) async fn probe(&self) {
        match self {
            Self::Spreadsheet { dir, .. } => match brandinput_sheet::locate_workbook(dir) {
                Ok(path) => tracing::info!(workbook = %path.display(), "using spreadsheet source"),
                Err(e) => tracing::warn!(error = %e, "spreadsheet source not ready"),
            },
            Self::Database { pool, table } => match brandinput_db::ping(pool).await {
                Ok(()) => tracing::info!(table = %table.qualified(), "using database source"),
                Err(e) => tracing::warn!(error = %e, "database source not reachable"),
            },
        }
    }

    /// Closes the database pool; the spreadsheet holds nothing open.
    pub(crate) async fn close(&self) {
        if let Self::Database { pool, .. } = self {
            pool.close().await;
        }
    }
}

impl RecordSource for RecordStore {
    type Error = SourceError;

    async fn lookup(
        &self,
        key: &LookupKey,
        media_partner: Option<&str>,
    ) -> Result<Option<PersonnelRecord>, SourceError> {
        match self {
            Self::Spreadsheet { dir, sheet } => {
                let dir = dir.clone();
                let sheet = sheet.clone();
                let key = key.clone();
                let partner = media_partner.map(str::to_string);
                let record = tokio::task::spawn_blocking(move || {
                    brandinput_sheet::lookup_in_dir(&dir, &sheet, &key, partner.as_deref())
                })
                .await??;
                Ok(record)
            }
            Self::Database { pool, table } => {
                let row =
                    brandinput_db::find_assignment(pool, table, &key.as_text(), media_partner)
                        .await?;
                Ok(row.map(PersonnelRecord::from))
            }
        }
    }

    fn source_context(&self) -> SourceContext {
        match self {
            Self::Spreadsheet { dir, .. } => SourceContext::Spreadsheet {
                directory: dir.display().to_string(),
                file_name: brandinput_sheet::locate_workbook(dir)
                    .ok()
                    .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned())),
            },
            Self::Database { table, .. } => table.source_context(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    fn spreadsheet(dir: &std::path::Path) -> RecordStore {
        RecordStore::Spreadsheet {
            dir: dir.to_path_buf(),
            sheet: "CPG".to_string(),
        }
    }

    #[test]
    fn spreadsheet_context_names_the_workbook() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("assignments.xlsx")).unwrap();

        match spreadsheet(dir.path()).source_context() {
            SourceContext::Spreadsheet { file_name, .. } => {
                assert_eq!(file_name.as_deref(), Some("assignments.xlsx"));
            }
            other => panic!("unexpected context {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_workbook_is_a_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = spreadsheet(dir.path())
            .lookup(&LookupKey::Advertiser("Acme".to_string()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Sheet(SheetError::NoWorkbook { .. })));
    }
}
