//! Translation records and their assembly from provider output
//!
//! A record is stored per row in the `translations` column:
//!
//! ```json
//! {
//!   "es": { "name": "Refinería", "keys": { "name": "nombre" } },
//!   "pt": { "name": "Refinaria", "keys": { "name": "nome" } }
//! }
//! ```

use crate::markup::{MarkupError, parse_markup};
use crate::row::RowId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Translated values of one row in one language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageTranslation {
    /// Original field name → translated value
    #[serde(flatten)]
    pub values: BTreeMap<String, String>,
    /// Original field name → translated field label
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

/// Language code → translation, as persisted in `translations`
pub type TranslationRecord = BTreeMap<String, LanguageTranslation>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("provider returned {translated} markups for {rows} rows")]
    RowCountMismatch { rows: usize, translated: usize },
    #[error("row {id}: {source}")]
    Markup {
        id: RowId,
        #[source]
        source: MarkupError,
    },
}

/// Records accumulated over one bulk run, in first-seen row order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    order: Vec<RowId>,
    records: BTreeMap<RowId, TranslationRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one language to a row, creating its record on first sight
    pub fn merge(&mut self, id: &RowId, language: &str, translation: LanguageTranslation) {
        let record = self.records.entry(id.clone()).or_insert_with(|| {
            self.order.push(id.clone());
            TranslationRecord::new()
        });
        record.insert(language.to_string(), translation);
    }

    pub fn get(&self, id: &RowId) -> Option<&TranslationRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowId, &TranslationRecord)> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).map(|record| (id, record)))
    }
}

/// Provider output for one target language
#[derive(Debug, Clone, Copy)]
pub struct TranslatedBatch<'a> {
    pub language: &'a str,
    /// Translated labels, positionally matching `field_names`
    pub labels: &'a [String],
    /// Translated markup, one per row, positionally matching `ids`
    pub markups: &'a [String],
}

/// Fold one language's output into `records`
///
/// Elements are matched to fields by their `k` attribute. Elements without a
/// known key fall back to the first field at or after their position that no
/// other element filled, and anything left over is dropped. Rows where the element set did not line up
/// with `field_names` are returned so the caller can report them.
pub fn assemble_language(
    batch: TranslatedBatch<'_>,
    field_names: &[String],
    ids: &[RowId],
    records: &mut RecordSet,
) -> Result<Vec<RowId>, AssemblyError> {
    if batch.markups.len() != ids.len() {
        return Err(AssemblyError::RowCountMismatch {
            rows: ids.len(),
            translated: batch.markups.len(),
        });
    }

    let keys: BTreeMap<String, String> = field_names
        .iter()
        .cloned()
        .zip(batch.labels.iter().cloned())
        .collect();

    let mut misaligned = Vec::new();

    for (id, markup) in ids.iter().zip(batch.markups) {
        let elements = parse_markup(markup).map_err(|source| AssemblyError::Markup {
            id: id.clone(),
            source,
        })?;

        let element_count = elements.len();
        let mut values = BTreeMap::new();
        let mut unkeyed = Vec::new();
        for (position, element) in elements.into_iter().enumerate() {
            match element
                .key
                .as_deref()
                .filter(|key| field_names.iter().any(|f| f == key))
            {
                Some(key) => {
                    values.entry(key.to_string()).or_insert(element.text);
                }
                None => unkeyed.push((position, element.text)),
            }
        }

        // Keyed values are never replaced; an unkeyed element takes the first
        // unfilled field at or after its position
        for (position, text) in unkeyed {
            let field = field_names
                .iter()
                .skip(position)
                .find(|f| !values.contains_key(f.as_str()));
            if let Some(field) = field {
                values.insert(field.clone(), text);
            }
        }

        if element_count != field_names.len() || values.len() != field_names.len() {
            misaligned.push(id.clone());
        }

        records.merge(
            id,
            batch.language,
            LanguageTranslation {
                values,
                keys: keys.clone(),
            },
        );
    }

    Ok(misaligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    // ========== Serialization ==========

    #[test]
    fn test_language_translation_serializes_flat() {
        let mut translation = LanguageTranslation::default();
        translation
            .values
            .insert("name".to_string(), "Refinería".to_string());
        translation
            .keys
            .insert("name".to_string(), "nombre".to_string());

        let value = serde_json::to_value(&translation).unwrap();
        assert_eq!(
            value,
            json!({"name": "Refinería", "keys": {"name": "nombre"}})
        );

        let back: LanguageTranslation = serde_json::from_value(value).unwrap();
        assert_eq!(back, translation);
    }

    // ========== Assembly ==========

    #[test]
    fn test_assemble_by_key() {
        let fields = names(&["name", "country"]);
        let ids = vec![RowId::new("1")];
        let labels = strings(&["nombre", "país"]);
        // Provider swapped element order; keys keep the mapping intact
        let markups = strings(&[r#"<e k="country">Brasil</e><e k="name">Refinería</e>"#]);

        let mut records = RecordSet::new();
        let misaligned = assemble_language(
            TranslatedBatch {
                language: "es",
                labels: &labels,
                markups: &markups,
            },
            &fields,
            &ids,
            &mut records,
        )
        .unwrap();

        assert!(misaligned.is_empty());
        let es = &records.get(&RowId::new("1")).unwrap()["es"];
        assert_eq!(es.values["name"], "Refinería");
        assert_eq!(es.values["country"], "Brasil");
        assert_eq!(es.keys["country"], "país");
    }

    #[test]
    fn test_assemble_positional_fallback() {
        let fields = names(&["name", "country"]);
        let ids = vec![RowId::new("1")];
        let labels = strings(&["nome", "país"]);
        let markups = strings(&["<e>Refinaria</e><e>Brasil</e>"]);

        let mut records = RecordSet::new();
        assemble_language(
            TranslatedBatch {
                language: "pt",
                labels: &labels,
                markups: &markups,
            },
            &fields,
            &ids,
            &mut records,
        )
        .unwrap();

        let pt = &records.get(&RowId::new("1")).unwrap()["pt"];
        assert_eq!(pt.values["name"], "Refinaria");
        assert_eq!(pt.values["country"], "Brasil");
    }

    #[test]
    fn test_assemble_unkeyed_never_replaces_keyed() {
        let fields = names(&["name", "status"]);
        let ids = vec![RowId::new("1"), RowId::new("2")];
        let labels = strings(&["nombre", "estado"]);
        let markups = strings(&[
            r#"<e k="status">Activo</e><e>Norte</e>"#,
            r#"<e>Cerrado</e><e k="name">Refinería</e>"#,
        ]);

        let mut records = RecordSet::new();
        let misaligned = assemble_language(
            TranslatedBatch {
                language: "es",
                labels: &labels,
                markups: &markups,
            },
            &fields,
            &ids,
            &mut records,
        )
        .unwrap();

        // Row 1: the keyed status stays, the stray element has no free field left
        let first = &records.get(&RowId::new("1")).unwrap()["es"];
        assert_eq!(first.values["status"], "Activo");
        assert!(!first.values.contains_key("name"));

        // Row 2: the unkeyed element skips the field claimed by key
        let second = &records.get(&RowId::new("2")).unwrap()["es"];
        assert_eq!(second.values["name"], "Refinería");
        assert_eq!(second.values["status"], "Cerrado");

        assert_eq!(misaligned, vec![RowId::new("1")]);
    }

    #[test]
    fn test_assemble_reports_short_and_long_rows() {
        let fields = names(&["name", "country"]);
        let ids = vec![RowId::new("1"), RowId::new("2")];
        let labels = strings(&["nombre", "país"]);
        let markups = strings(&["<e>solo</e>", "<e>a</e><e>b</e><e>c</e>"]);

        let mut records = RecordSet::new();
        let misaligned = assemble_language(
            TranslatedBatch {
                language: "es",
                labels: &labels,
                markups: &markups,
            },
            &fields,
            &ids,
            &mut records,
        )
        .unwrap();

        assert_eq!(misaligned, vec![RowId::new("1"), RowId::new("2")]);
        let short = &records.get(&RowId::new("1")).unwrap()["es"];
        assert_eq!(short.values.len(), 1);
        let long = &records.get(&RowId::new("2")).unwrap()["es"];
        assert_eq!(long.values.len(), 2);
        assert_eq!(long.values["country"], "b");
    }

    #[test]
    fn test_assemble_row_count_mismatch() {
        let fields = names(&["name"]);
        let ids = vec![RowId::new("1"), RowId::new("2")];
        let labels = strings(&["nombre"]);
        let markups = strings(&["<e>x</e>"]);

        let result = assemble_language(
            TranslatedBatch {
                language: "es",
                labels: &labels,
                markups: &markups,
            },
            &fields,
            &ids,
            &mut RecordSet::new(),
        );
        assert_eq!(
            result,
            Err(AssemblyError::RowCountMismatch {
                rows: 2,
                translated: 1
            })
        );
    }

    #[test]
    fn test_assemble_malformed_markup() {
        let fields = names(&["name"]);
        let ids = vec![RowId::new("9")];
        let labels = strings(&["nombre"]);
        let markups = strings(&["<e>x</f>"]);

        let result = assemble_language(
            TranslatedBatch {
                language: "es",
                labels: &labels,
                markups: &markups,
            },
            &fields,
            &ids,
            &mut RecordSet::new(),
        );
        assert!(matches!(result, Err(AssemblyError::Markup { id, .. }) if id == RowId::new("9")));
    }

    // ========== Record merging ==========

    #[test]
    fn test_merge_accumulates_languages() {
        let id = RowId::new("5");
        let mut records = RecordSet::new();
        records.merge(&id, "es", LanguageTranslation::default());
        records.merge(&id, "pt", LanguageTranslation::default());
        records.merge(&RowId::new("3"), "es", LanguageTranslation::default());

        assert_eq!(records.len(), 2);
        let record = records.get(&id).unwrap();
        assert!(record.contains_key("es"));
        assert!(record.contains_key("pt"));

        let order: Vec<&str> = records.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["5", "3"]);
    }
}
