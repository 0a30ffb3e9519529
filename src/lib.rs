//! rust-entitygen: entity model extraction from MySQL-like catalogs
//!
//! This library reads catalog rows (tables, columns, indexes, foreign keys), maps
//! every column to a portable logical type, and infers the relations between tables,
//! including many-to-many relations behind junction tables.

pub mod catalog;
pub mod error;
pub mod model;
pub mod output;
pub mod util;

use std::path::PathBuf;

use anyhow::Result;

pub use error::EntityGenError;

use catalog::CatalogScope;
use model::{ExtractedModel, GenerationOptions};

/// Options for one extraction run
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Catalog snapshot to read
    pub snapshot_path: PathBuf,
    /// Where to write the model XML; nothing is written when unset
    pub output_path: Option<PathBuf>,
    /// Schemas and databases to include
    pub scope: CatalogScope,
    pub generation: GenerationOptions,
}

/// Extract an entity model from a catalog snapshot
pub fn extract_model(options: &ExtractOptions) -> Result<ExtractedModel> {
    tracing::info!(snapshot = %options.snapshot_path.display(), "reading catalog snapshot");

    // Step 1: Load the snapshot as an in-memory catalog
    let catalog = catalog::load_snapshot(&options.snapshot_path)?;

    // Step 2: Fetch, build and verify the model
    let extracted = model::assemble_model(&catalog, &options.scope, &options.generation)?;

    for diagnostic in &extracted.diagnostics {
        tracing::warn!(kind = diagnostic.kind(), "{}", diagnostic);
    }

    // Step 3: Write the model, if requested
    if let Some(output_path) = &options.output_path {
        output::write_model_file(output_path, &extracted)?;
        tracing::info!(output = %output_path.display(), "wrote entity model");
    }

    Ok(extracted)
}
