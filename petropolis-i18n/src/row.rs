//! Feature rows read from a layer table

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Column holding the per-language translation record
pub const TRANSLATIONS_COLUMN: &str = "translations";

/// Primary key column of every layer table
pub const ID_COLUMN: &str = "id";

/// Name of the label map inside a language translation
pub const KEYS_ENTRY: &str = "keys";

/// Columns that are never sent to the translation provider
///
/// Identifiers, numeric measures, geometry and media links.
pub const NON_TRANSLATABLE_FIELDS: &[&str] = &[
    "id",
    "year",
    "amount",
    "funder",
    "start",
    "end",
    "variable1",
    "variable2",
    "geom",
    "link1",
    "link2",
    "sidebarMediaTop",
    "sidebarMediaBottom",
    "translations",
];

/// A row as returned by the store, columns in table order
pub type Row = Map<String, Value>;

/// Textual form of a row's `id`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read the `id` column of a row
    ///
    /// Strings are taken verbatim and numbers through their decimal form.
    /// Null, missing, or structured ids yield `None`.
    pub fn from_row(row: &Row) -> Option<Self> {
        match row.get(ID_COLUMN)? {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Which columns of a layer are translatable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    excluded: Vec<String>,
}

impl RowSchema {
    /// Build a schema excluding the given columns
    ///
    /// `translations` and the reserved `keys` entry are always excluded.
    pub fn with_excluded<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut excluded: Vec<String> = fields.into_iter().map(Into::into).collect();
        for reserved in [TRANSLATIONS_COLUMN, KEYS_ENTRY] {
            if !excluded.iter().any(|f| f == reserved) {
                excluded.push(reserved.to_string());
            }
        }
        Self { excluded }
    }

    pub fn is_translatable(&self, field: &str) -> bool {
        !self.excluded.iter().any(|f| f == field)
    }

    /// Translatable column names of a row, in row order
    pub fn translatable_fields<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = &'a str> + 'a {
        row.keys()
            .map(String::as_str)
            .filter(|field| self.is_translatable(field))
    }
}

impl Default for RowSchema {
    fn default() -> Self {
        Self::with_excluded(NON_TRANSLATABLE_FIELDS.iter().copied())
    }
}

/// A row is eligible while its `translations` column is absent, null or `{}`
pub fn is_eligible(row: &Row) -> bool {
    match row.get(TRANSLATIONS_COLUMN) {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}
