use super::{FeatureRepository, RepositoryError, TableName};
use async_trait::async_trait;
use petropolis_i18n::{Row, RowId, TranslationRecord};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row as _};
use tracing::debug;

/// Layer tables in Postgres
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FeatureRepository for PostgresRepository {
    async fn ensure_translations_column(&self, table: &TableName) -> Result<(), RepositoryError> {
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN IF NOT EXISTS translations JSON NULL",
            table.quoted()
        );
        debug!(%table, "ensuring translations column");
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn fetch_untranslated(&self, table: &TableName) -> Result<Vec<Row>, RepositoryError> {
        // row_to_json keeps column order; jsonb would not
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM {} t \
             WHERE t.translations IS NULL OR t.translations::text = '{{}}' \
             ORDER BY t.id",
            table.quoted()
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| -> Result<Row, RepositoryError> {
                let Json(fields): Json<Row> = row.try_get("row")?;
                Ok(fields)
            })
            .collect()
    }

    async fn merge_translations(
        &self,
        table: &TableName,
        id: &RowId,
        record: &TranslationRecord,
    ) -> Result<(), RepositoryError> {
        let sql = format!(
            "UPDATE {} SET translations = ( \
                 CASE WHEN jsonb_typeof(translations::jsonb) = 'object' \
                      THEN translations::jsonb ELSE '{{}}'::jsonb END \
                 || $1::jsonb \
             )::json \
             WHERE id::text = $2",
            table.quoted()
        );

        let result = sqlx::query(&sql)
            .bind(Json(record))
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                table: table.to_string(),
                id: id.clone(),
            });
        }
        Ok(())
    }
}
