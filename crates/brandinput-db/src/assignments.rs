//! Lookups against the personnel `assignments` table.

use brandinput_core::{PersonnelRecord, SourceContext};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Table reference
// ---------------------------------------------------------------------------

/// Schema-qualified table name, validated so it can be interpolated into SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    schema: String,
    table: String,
}

impl TableRef {
    /// # Errors
    ///
    /// Returns [`DbError::InvalidIdentifier`] unless both parts are plain
    /// identifiers (ASCII letters, digits, underscores; no leading digit).
    pub fn new(schema: &str, table: &str) -> Result<Self, DbError> {
        Ok(Self {
            schema: identifier(schema)?,
            table: identifier(table)?,
        })
    }

    #[must_use]
    pub fn qualified(&self) -> String {
        format!("\"{}\".\"{}\"", self.schema, self.table)
    }

    #[must_use]
    pub fn source_context(&self) -> SourceContext {
        SourceContext::Database {
            schema: self.schema.clone(),
            table: self.table.clone(),
        }
    }
}

fn identifier(raw: &str) -> Result<String, DbError> {
    let valid = raw
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(raw.to_string())
    } else {
        Err(DbError::InvalidIdentifier(raw.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the assignments table.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct AssignmentRow {
    pub account: String,
    pub account_type: Option<String>,
    pub media_partner: Option<String>,
    pub solutions_mgr: Option<String>,
    pub solutions_leader: Option<String>,
    pub solutions_manager: Option<String>,
    pub client_solutions_consultant: Option<String>,
    pub solutions_ops_owner1: Option<String>,
    pub solutions_ops_owner2: Option<String>,
    pub client_analytics: Option<String>,
}

impl From<AssignmentRow> for PersonnelRecord {
    fn from(row: AssignmentRow) -> Self {
        let watchers = PersonnelRecord::collect_watchers([
            row.solutions_leader.as_deref(),
            row.solutions_manager.as_deref(),
            row.client_solutions_consultant.as_deref(),
            row.solutions_ops_owner1.as_deref(),
            row.solutions_ops_owner2.as_deref(),
        ]);
        let clean =
            |value: Option<String>| value.and_then(|v| brandinput_core::record::non_empty(&v));
        PersonnelRecord {
            account_type: clean(row.account_type),
            media_partner: clean(row.media_partner),
            primary_manager: clean(row.solutions_mgr),
            secondary_manager: clean(row.solutions_manager),
            client_analytics: clean(row.client_analytics),
            watchers,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the first assignment for `account` and `media_partner`.
///
/// `None` for `media_partner` matches rows whose partner is NULL or blank.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_assignment(
    pool: &PgPool,
    table: &TableRef,
    account: &str,
    media_partner: Option<&str>,
) -> Result<Option<AssignmentRow>, DbError> {
    let sql = format!(
        "SELECT account, account_type, media_partner, solutions_mgr, solutions_leader, \
                solutions_manager, client_solutions_consultant, solutions_ops_owner1, \
                solutions_ops_owner2, client_analytics \
         FROM {} \
         WHERE TRIM(account) = $1 \
           AND (($2::text IS NULL AND NULLIF(TRIM(media_partner), '') IS NULL) \
                OR TRIM(media_partner) = $2) \
         ORDER BY id \
         LIMIT 1",
        table.qualified()
    );

    let row = sqlx::query_as::<_, AssignmentRow>(&sql)
        .bind(account.trim())
        .bind(media_partner.map(str::trim))
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_ref_quotes_both_parts() {
        let table = TableRef::new("cpg_assignments", "assignments").unwrap();
        assert_eq!(table.qualified(), "\"cpg_assignments\".\"assignments\"");
    }

    #[test]
    fn table_ref_rejects_injection() {
        assert!(TableRef::new("cpg", "assignments; DROP TABLE x").is_err());
        assert!(TableRef::new("", "assignments").is_err());
        assert!(TableRef::new("cpg", "1table").is_err());
    }
}
