//! Bulk translation of a layer table
//!
//! One run reads every row that has no translations yet, sends its
//! translatable columns through the provider once per target language, and
//! writes a single merged record back per row.
//!
//! ```text
//! ensure column → fetch eligible rows → extract markup
//!     → for each language: translate labels + markup → assemble
//!     → persist one update per row
//! ```
//!
//! A provider failure aborts the run before anything is written. A failed row
//! update does not; it is listed in the [`TranslationReport`].

use crate::error::MtError;
use crate::repository::{FeatureRepository, RepositoryError, TableName};
use crate::translator::{TagHandling, Translator};
use petropolis_i18n::{
    AssemblyError, ExtractError, ExtractedRows, LanguageError, RecordSet, RowId, RowSchema,
    TranslatedBatch, assemble_language, extract_rows, provider_variant, target_languages,
    validate_language,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum BulkError {
    #[error("layer '{0}' is not open for translation")]
    UnknownLayer(String),

    #[error(transparent)]
    InvalidLanguage(#[from] LanguageError),

    #[error("could not prepare translations column: {0}")]
    Schema(#[source] RepositoryError),

    #[error("could not read rows: {0}")]
    Fetch(#[source] RepositoryError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("translation into '{language}' failed: {source}")]
    Provider {
        language: String,
        #[source]
        source: MtError,
    },

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// Layers a bulk run may touch
///
/// An empty list allows any table with a valid name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerAllowList(Vec<String>);

impl LayerAllowList {
    pub fn new<I, S>(layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            layers
                .into_iter()
                .map(|l| l.as_ref().trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect(),
        )
    }

    /// No layers listed, so any valid table name is allowed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn allows(&self, layer: &str) -> bool {
        self.0.is_empty() || self.0.iter().any(|l| *l == layer.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistFailure {
    pub id: RowId,
    pub error: String,
}

/// Outcome of one bulk run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationReport {
    /// Rows that were eligible
    pub rows: usize,
    /// Short codes translated into
    pub languages: Vec<String>,
    /// Rows written back
    pub updated: usize,
    /// Rows whose update failed
    pub failed: Vec<PersistFailure>,
    /// Rows whose columns differed from the first row's
    pub drifted: Vec<RowId>,
    /// Rows where the provider's elements did not line up with the fields
    pub misaligned: Vec<RowId>,
}

impl TranslationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs bulk translations against one provider and one store
#[derive(Clone)]
pub struct BulkTranslator {
    translator: Arc<dyn Translator>,
    repository: Arc<dyn FeatureRepository>,
    schema: RowSchema,
    allow_list: LayerAllowList,
}

impl BulkTranslator {
    pub fn new(translator: Arc<dyn Translator>, repository: Arc<dyn FeatureRepository>) -> Self {
        Self {
            translator,
            repository,
            schema: RowSchema::default(),
            allow_list: LayerAllowList::default(),
        }
    }

    pub fn with_schema(mut self, schema: RowSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_allow_list(mut self, allow_list: LayerAllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    /// Translate every untranslated row of `layer`
    ///
    /// `source` is the language the rows are written in. Target languages
    /// containing it are skipped, and it is passed to the provider; `None`
    /// lets the provider detect it.
    pub async fn translate_layer(
        &self,
        layer: &str,
        source: Option<&str>,
    ) -> Result<TranslationReport, BulkError> {
        let source = source.filter(|s| !s.trim().is_empty());
        self.translate_layer_into(layer, source, &target_languages(source))
            .await
    }

    /// Translate every untranslated row of `layer` into `languages`
    #[instrument(skip(self), fields(provider = self.translator.provider_name()))]
    pub async fn translate_layer_into(
        &self,
        layer: &str,
        source: Option<&str>,
        languages: &[&str],
    ) -> Result<TranslationReport, BulkError> {
        if !self.allow_list.allows(layer) {
            return Err(BulkError::UnknownLayer(layer.to_string()));
        }
        let table =
            TableName::parse(layer).map_err(|_| BulkError::UnknownLayer(layer.to_string()))?;

        let source = source.filter(|s| !s.trim().is_empty());
        if let Some(source) = source {
            validate_language(source)?;
        }

        self.repository
            .ensure_translations_column(&table)
            .await
            .map_err(BulkError::Schema)?;

        let rows = self
            .repository
            .fetch_untranslated(&table)
            .await
            .map_err(BulkError::Fetch)?;

        if rows.is_empty() {
            info!(%table, "no rows need translation");
            return Ok(TranslationReport::default());
        }

        let extracted = extract_rows(&rows, &self.schema)?;
        if !extracted.drifted.is_empty() {
            warn!(
                %table,
                rows = ?extracted.drifted,
                fields = ?extracted.field_names,
                "rows differ from the first row's columns"
            );
        }

        let mut report = TranslationReport {
            rows: extracted.len(),
            languages: languages.iter().map(|l| l.to_string()).collect(),
            drifted: extracted.drifted.clone(),
            ..Default::default()
        };

        let labels = extracted.humanized_field_names();
        let mut records = RecordSet::new();

        for &language in languages {
            info!(%table, language, rows = extracted.len(), "translating");
            let (translated_labels, translated_markups) = self
                .translate_language(&extracted, &labels, source, language)
                .await?;

            let misaligned = assemble_language(
                TranslatedBatch {
                    language,
                    labels: &translated_labels,
                    markups: &translated_markups,
                },
                &extracted.field_names,
                &extracted.ids,
                &mut records,
            )?;

            if !misaligned.is_empty() {
                warn!(%table, language, rows = ?misaligned, "translated elements did not match fields");
                for id in misaligned {
                    if !report.misaligned.contains(&id) {
                        report.misaligned.push(id);
                    }
                }
            }
        }

        for (id, record) in records.iter() {
            match self.repository.merge_translations(&table, id, record).await {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    warn!(%table, %id, error = %e, "failed to store translations");
                    report.failed.push(PersistFailure {
                        id: id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            %table,
            updated = report.updated,
            failed = report.failed.len(),
            "layer translation finished"
        );
        Ok(report)
    }

    /// Translate the field labels and the row markup into one language
    async fn translate_language(
        &self,
        extracted: &ExtractedRows,
        labels: &[String],
        source: Option<&str>,
        language: &str,
    ) -> Result<(Vec<String>, Vec<String>), BulkError> {
        let target = provider_variant(language);
        let provider_error = |source: MtError| BulkError::Provider {
            language: language.to_string(),
            source,
        };

        let translated_labels = self
            .translator
            .translate_batch(labels, source, target, TagHandling::None)
            .await
            .map_err(provider_error)?;

        let translated_markups = self
            .translator
            .translate_batch(&extracted.markups, source, target, TagHandling::Xml)
            .await
            .map_err(provider_error)?;

        Ok((translated_labels, translated_markups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_empty_allows_all() {
        let list = LayerAllowList::default();
        assert!(list.is_empty());
        assert!(list.allows("anything"));
        assert!(LayerAllowList::new([" ", ""]).is_empty());
        assert!(!LayerAllowList::new(["oil_plants"]).is_empty());
    }

    #[test]
    fn test_allow_list_case_insensitive() {
        let list = LayerAllowList::new(["oil_plants", " Coal_Mines ", ""]);
        assert!(list.allows("OIL_PLANTS"));
        assert!(list.allows("coal_mines"));
        assert!(!list.allows("users"));
    }

    #[test]
    fn test_report_completeness() {
        let mut report = TranslationReport::default();
        assert!(report.is_complete());
        report.failed.push(PersistFailure {
            id: RowId::new("1"),
            error: "boom".to_string(),
        });
        assert!(!report.is_complete());
    }
}
