//! Entity model building

mod builder;
mod diagnostics;
mod elements;
mod entity_builder;
mod relations;
mod schema_model;
mod types;

pub use builder::{assemble_model, build_model};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use elements::*;
pub use entity_builder::{attach_indexes, build_entities};
pub use relations::{attach_relations, plan_relations, PlannedRelation, RelationPlan};
pub use schema_model::{ExtractedModel, SchemaModel};
pub use types::{
    map_column_type, normalize_default, parse_enum_values, DefaultValue, GenerationOptions,
    LogicalType, MappedType, NativeType, StorageOptions, Transformer, ValidationConstraint,
};
