use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use petropolis_i18n_mt::{
    BulkTranslator, FeatureRepository, MockMode, MockTranslator, PostgresRepository, TableName,
};
use serde_json::{Value, json};
use sqlx::Row as _;

const TABLE: &str = "mt_test_refineries";

async fn setup(repository: &PostgresRepository) -> Result<()> {
    let pool = repository.pool();
    sqlx::query(&format!("DROP TABLE IF EXISTS {TABLE}"))
        .execute(pool)
        .await?;
    sqlx::query(&format!(
        "CREATE TABLE {TABLE} (id SERIAL PRIMARY KEY, name TEXT, owner TEXT, year INTEGER)"
    ))
    .execute(pool)
    .await?;
    sqlx::query(&format!(
        "INSERT INTO {TABLE} (name, owner, year) VALUES ($1, $2, 1950), ($3, NULL, 1972)"
    ))
    .bind("Refinery & Terminal")
    .bind("Petro <Co>")
    .bind("Tank farm")
    .execute(pool)
    .await?;
    Ok(())
}

async fn translations(repository: &PostgresRepository, id: i32) -> Result<Value> {
    let row = sqlx::query(&format!(
        "SELECT translations::jsonb AS translations FROM {TABLE} WHERE id = $1"
    ))
    .bind(id)
    .fetch_one(repository.pool())
    .await?;
    let value: Option<Value> = row.try_get("translations")?;
    value.context("translations column is empty")
}

#[tokio::test]
async fn bulk_translation_roundtrip() -> Result<()> {
    let database_url = match env::var("PETROPOLIS_TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping Postgres integration test because PETROPOLIS_TEST_DATABASE_URL is not set"
            );
            return Ok(());
        }
    };

    let repository = Arc::new(PostgresRepository::connect(&database_url, 2).await?);
    setup(&repository).await?;

    let mock = Arc::new(MockTranslator::new(MockMode::Suffix));
    let bulk = BulkTranslator::new(mock.clone(), repository.clone());

    let report = bulk.translate_layer(TABLE, Some("en")).await?;
    assert_eq!(report.rows, 2);
    assert_eq!(report.updated, 2);
    assert!(report.is_complete());
    assert_eq!(report.languages, vec!["es", "pt"]);

    let first = translations(&repository, 1).await?;
    assert_eq!(first["es"]["name"], json!("Refinery & Terminal_es"));
    assert_eq!(first["es"]["owner"], json!("Petro <Co>_es"));
    assert_eq!(first["es"]["keys"]["name"], json!("name_es"));
    assert_eq!(first["pt"]["name"], json!("Refinery & Terminal_pt-BR"));
    assert!(first["es"].get("year").is_none());

    let second = translations(&repository, 2).await?;
    assert_eq!(second["es"]["owner"], json!(""));

    // Nothing left to do on a second run
    let calls = mock.calls();
    let again = bulk.translate_layer(TABLE, Some("en")).await?;
    assert_eq!(again.rows, 0);
    assert_eq!(mock.calls(), calls);

    // Merging keeps languages already stored
    let table = TableName::parse(TABLE)?;
    let mut extra = petropolis_i18n::TranslationRecord::new();
    extra.insert("fr".to_string(), Default::default());
    repository
        .merge_translations(&table, &petropolis_i18n::RowId::new("1"), &extra)
        .await?;
    let merged = translations(&repository, 1).await?;
    assert!(merged.get("es").is_some());
    assert!(merged.get("fr").is_some());

    sqlx::query(&format!("DROP TABLE {TABLE}"))
        .execute(repository.pool())
        .await?;
    Ok(())
}
