//! Storage for layer tables
//!
//! Layer tables are created and edited elsewhere; translation only adds the
//! `translations` column, reads rows that still need it, and writes records
//! back.

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

use async_trait::async_trait;
use petropolis_i18n::{Row, RowId, TranslationRecord};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("valid identifier regex"));

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid table name '{0}'")]
    InvalidTable(String),

    #[error("table '{0}' does not exist")]
    UnknownTable(String),

    #[error("row '{id}' not found in '{table}'")]
    NotFound { table: String, id: RowId },

    #[error("store rejected the operation: {0}")]
    Rejected(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A layer table name that is safe to splice into SQL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    pub fn parse(name: &str) -> Result<Self, RepositoryError> {
        if IDENTIFIER.is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(RepositoryError::InvalidTable(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted SQL identifier
    ///
    /// Unquoted identifiers fold to lower case in Postgres, so the folded form
    /// is quoted to address the same table an unquoted name would.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.to_lowercase())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait FeatureRepository: Send + Sync {
    /// Add a nullable JSON `translations` column if it is missing
    async fn ensure_translations_column(&self, table: &TableName) -> Result<(), RepositoryError>;

    /// Rows whose `translations` is null or `{}`, in id order
    async fn fetch_untranslated(&self, table: &TableName) -> Result<Vec<Row>, RepositoryError>;

    /// Merge `record` into the row's `translations`, keeping languages it
    /// already has that `record` does not mention
    async fn merge_translations(
        &self,
        table: &TableName,
        id: &RowId,
        record: &TranslationRecord,
    ) -> Result<(), RepositoryError>;
}
