//! Build an entity model from catalog rows
//!
//! Stages run strictly in order: entities (columns and type mapping), indexes,
//! relation planning, relation attachment. Each stage only reads what the earlier
//! ones produced.

use crate::catalog::{fetch_all, CatalogReader, CatalogRows, CatalogScope};
use crate::error::EntityGenError;

use super::diagnostics::Diagnostics;
use super::entity_builder::{attach_indexes, build_entities};
use super::relations::{attach_relations, plan_relations};
use super::types::GenerationOptions;
use super::ExtractedModel;

/// Build a model from rows that have already been fetched
pub fn build_model(rows: &CatalogRows, options: &GenerationOptions) -> ExtractedModel {
    let mut diagnostics = Diagnostics::new();

    let mut entities = build_entities(
        &rows.tables,
        &rows.columns,
        &rows.foreign_keys,
        options,
        &mut diagnostics,
    );
    attach_indexes(&mut entities, &rows.indexes);

    let plan = plan_relations(&entities, &rows.foreign_keys, &mut diagnostics);
    let model = attach_relations(entities, plan);

    ExtractedModel {
        model,
        diagnostics: diagnostics.into_vec(),
    }
}

/// Fetch every catalog row in `scope` and build the model.
///
/// Any failed fetch aborts the run before a model is built. The finished relation
/// graph is checked for symmetry before it is returned.
pub fn assemble_model<R>(
    reader: &R,
    scope: &CatalogScope,
    options: &GenerationOptions,
) -> Result<ExtractedModel, EntityGenError>
where
    R: CatalogReader + Sync + ?Sized,
{
    let rows = fetch_all(reader, scope)?;
    let extracted = build_model(&rows, options);
    extracted.model.verify_relation_symmetry()?;

    tracing::info!(
        entities = extracted.model.entities().len(),
        relations = extracted.model.relation_count(),
        diagnostics = extracted.diagnostics.len(),
        "assembled entity model"
    );
    Ok(extracted)
}
