use super::{FeatureRepository, RepositoryError, TableName};
use async_trait::async_trait;
use petropolis_i18n::{Row, RowId, TRANSLATIONS_COLUMN, TranslationRecord, is_eligible};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-process layer tables
///
/// Behaves like [`super::PostgresRepository`] for the translation workflow,
/// keeps rows in insertion order, and can be told to fail. Used by tests and
/// dry runs of the CLI.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    failing_ids: Mutex<HashSet<RowId>>,
    schema_failure: Mutex<Option<String>>,
    updates: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: &str, rows: Vec<Row>) -> Self {
        self.insert_table(name, rows);
        self
    }

    pub fn insert_table(&self, name: &str, rows: Vec<Row>) {
        lock(&self.tables).insert(name.to_lowercase(), rows);
    }

    /// Current contents of a table
    pub fn rows(&self, name: &str) -> Vec<Row> {
        lock(&self.tables)
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Make every update of this row fail
    pub fn fail_updates_for(&self, id: impl Into<RowId>) {
        lock(&self.failing_ids).insert(id.into());
    }

    /// Make the next schema change fail
    pub fn fail_schema(&self, message: &str) {
        *lock(&self.schema_failure) = Some(message.to_string());
    }

    /// Number of successful updates
    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeatureRepository for MemoryRepository {
    async fn ensure_translations_column(&self, table: &TableName) -> Result<(), RepositoryError> {
        if let Some(message) = lock(&self.schema_failure).take() {
            return Err(RepositoryError::Rejected(message));
        }

        let mut tables = lock(&self.tables);
        let rows = tables
            .get_mut(&table.as_str().to_lowercase())
            .ok_or_else(|| RepositoryError::UnknownTable(table.to_string()))?;

        for row in rows.iter_mut() {
            if !row.contains_key(TRANSLATIONS_COLUMN) {
                row.insert(TRANSLATIONS_COLUMN.to_string(), Value::Null);
            }
        }
        Ok(())
    }

    async fn fetch_untranslated(&self, table: &TableName) -> Result<Vec<Row>, RepositoryError> {
        let tables = lock(&self.tables);
        let rows = tables
            .get(&table.as_str().to_lowercase())
            .ok_or_else(|| RepositoryError::UnknownTable(table.to_string()))?;

        Ok(rows.iter().filter(|row| is_eligible(row)).cloned().collect())
    }

    async fn merge_translations(
        &self,
        table: &TableName,
        id: &RowId,
        record: &TranslationRecord,
    ) -> Result<(), RepositoryError> {
        if lock(&self.failing_ids).contains(id) {
            return Err(RepositoryError::Rejected(format!("update of row {id} refused")));
        }

        let mut tables = lock(&self.tables);
        let rows = tables
            .get_mut(&table.as_str().to_lowercase())
            .ok_or_else(|| RepositoryError::UnknownTable(table.to_string()))?;

        let row = rows
            .iter_mut()
            .find(|row| RowId::from_row(row).as_ref() == Some(id))
            .ok_or_else(|| RepositoryError::NotFound {
                table: table.to_string(),
                id: id.clone(),
            })?;

        let additions = record
            .iter()
            .map(|(language, translation)| Ok((language.clone(), serde_json::to_value(translation)?)))
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        let slot = row
            .entry(TRANSLATIONS_COLUMN)
            .or_insert(Value::Null);
        let mut merged = match std::mem::take(slot) {
            Value::Object(existing) => existing,
            _ => serde_json::Map::new(),
        };
        merged.extend(additions);
        *slot = Value::Object(merged);

        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
