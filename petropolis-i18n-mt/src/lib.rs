//! Machine translation for Petropolis map layers
//!
//! This crate connects the row/markup model of `petropolis-i18n` to a
//! translation provider and to the database holding the layer tables.
//!
//! # Workflow Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use petropolis_i18n_mt::{BulkTranslator, DeeplProvider, PostgresRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Arc::new(DeeplProvider::from_env()?);
//!     let repository = Arc::new(PostgresRepository::connect("postgres://localhost/petropolis", 5).await?);
//!
//!     let report = BulkTranslator::new(provider, repository)
//!         .translate_layer("oil_refineries", Some("en"))
//!         .await?;
//!
//!     println!("updated {} rows into {:?}", report.updated, report.languages);
//!     Ok(())
//! }
//! ```

pub mod bulk;
pub mod content;
pub mod deepl;
pub mod error;
pub mod mock;
pub mod repository;
pub mod translator;


pub use bulk::{BulkError, BulkTranslator, LayerAllowList, PersistFailure, TranslationReport};
pub use content::{Content, ContentRequest, translate_content};
pub use deepl::DeeplProvider;
pub use error::{MtError, MtResult};
pub use mock::{MockMode, MockTranslator};
pub use repository::{
    FeatureRepository, MemoryRepository, PostgresRepository, RepositoryError, TableName,
};
pub use translator::{TagHandling, Translator};
