//! Data model for translating Petropolis map layers
//!
//! A layer table holds one row per map feature. Translating a layer means
//! turning each row's human-readable columns into markup ([`extract`]),
//! sending that markup through a translation provider, and folding the
//! provider's output back into a per-row, per-language record ([`record`]).
//!
//! The provider side lives in `petropolis-i18n-mt`; this crate has no I/O.

pub mod extract;
pub mod language;
pub mod markup;
pub mod record;
pub mod row;

pub use extract::{ExtractError, ExtractedRows, extract_rows, humanize, value_text};
pub use language::{
    LANGUAGE_VARIANTS, LanguageError, base_language, provider_variant, target_languages,
    validate_language,
};
pub use markup::{MarkupElement, MarkupError, parse_markup, to_markup};
pub use record::{
    AssemblyError, LanguageTranslation, RecordSet, TranslatedBatch, TranslationRecord,
    assemble_language,
};
pub use row::{NON_TRANSLATABLE_FIELDS, Row, RowId, RowSchema, TRANSLATIONS_COLUMN, is_eligible};
