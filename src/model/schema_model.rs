//! The assembled entity model

use std::collections::{BTreeMap, HashMap};

use crate::error::EntityGenError;

use super::diagnostics::Diagnostic;
use super::relations::{unique_field_name, PlannedRelation};
use super::{Entity, EntityKey, Relation, RelationId, RelationSide, RelationView};

/// Entities plus the relations between them.
///
/// Every relation is stored once here and referenced from each endpoint by a
/// [`RelationView`]; [`SchemaModel::detach_relation`] removes all three together.
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    entities: Vec<Entity>,
    relations: BTreeMap<RelationId, Relation>,
    positions: HashMap<EntityKey, usize>,
    next_relation: u32,
}

impl SchemaModel {
    pub fn new(entities: Vec<Entity>) -> Self {
        let positions = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.key(), i))
            .collect();
        Self {
            entities,
            relations: BTreeMap::new(),
            positions,
            next_relation: 0,
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, key: &EntityKey) -> Option<&Entity> {
        self.positions.get(key).map(|&i| &self.entities[i])
    }

    /// First entity with this table name, in any scope
    pub fn find_entity(&self, sql_name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.sql_name == sql_name)
    }

    /// Relations in creation order
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    pub fn relation(&self, id: RelationId) -> Option<&Relation> {
        self.relations.get(&id)
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Attach a planned relation: owning view first, so the inverse name is chosen
    /// against the owning entity's final field set when both ends are the same table.
    pub(crate) fn attach(&mut self, planned: PlannedRelation) -> Option<RelationId> {
        let (Some(&owning), Some(&referenced)) = (
            self.positions.get(&planned.owning),
            self.positions.get(&planned.referenced),
        ) else {
            tracing::debug!(
                constraint = %planned.constraint_name,
                "relation endpoint not in model, not attached"
            );
            return None;
        };

        let id = RelationId(self.next_relation);
        self.next_relation += 1;

        let owning_field = unique_field_name(&self.entities[owning], &planned.referenced.name);
        self.entities[owning].relations.push(RelationView {
            relation: id,
            side: RelationSide::Owning,
            field_name: owning_field.clone(),
            cardinality: planned.cardinality,
            related: planned.referenced.clone(),
        });

        let inverse_field = unique_field_name(&self.entities[referenced], &planned.owning.name);
        self.entities[referenced].relations.push(RelationView {
            relation: id,
            side: RelationSide::Inverse,
            field_name: inverse_field.clone(),
            cardinality: planned.cardinality.inverse(),
            related: planned.owning.clone(),
        });

        self.relations.insert(
            id,
            Relation {
                id,
                constraint_name: planned.constraint_name,
                cardinality: planned.cardinality,
                owning: planned.owning,
                referenced: planned.referenced,
                column_pairs: planned.column_pairs,
                on_delete: planned.on_delete,
                on_update: planned.on_update,
                join_table: planned.join_table,
                owning_field,
                inverse_field,
            },
        );
        Some(id)
    }

    /// Remove a relation and both of its views
    pub fn detach_relation(&mut self, id: RelationId) -> Option<Relation> {
        let relation = self.relations.remove(&id)?;
        for key in [&relation.owning, &relation.referenced] {
            if let Some(&i) = self.positions.get(key) {
                self.entities[i].relations.retain(|v| v.relation != id);
            }
        }
        Some(relation)
    }

    /// Check that every relation has exactly one matching view on each endpoint and
    /// that every view points at a stored relation.
    pub fn verify_relation_symmetry(&self) -> Result<(), EntityGenError> {
        for relation in self.relations.values() {
            let ends = [
                (
                    RelationSide::Owning,
                    &relation.owning,
                    &relation.referenced,
                    &relation.owning_field,
                ),
                (
                    RelationSide::Inverse,
                    &relation.referenced,
                    &relation.owning,
                    &relation.inverse_field,
                ),
            ];
            for (side, holder, related, field) in ends {
                let entity = self.entity(holder).ok_or_else(|| {
                    asymmetry(format!(
                        "relation {} ({}) points at {} which is not in the model",
                        relation.id, relation.constraint_name, holder
                    ))
                })?;

                let views: Vec<&RelationView> = entity
                    .relations
                    .iter()
                    .filter(|v| v.relation == relation.id && v.side == side)
                    .collect();
                let view = match views.as_slice() {
                    [view] => *view,
                    [] => {
                        return Err(asymmetry(format!(
                            "{} has no {} view of relation {} ({})",
                            holder,
                            side.as_str(),
                            relation.id,
                            relation.constraint_name
                        )))
                    }
                    _ => {
                        return Err(asymmetry(format!(
                            "{} has {} {} views of relation {} ({})",
                            holder,
                            views.len(),
                            side.as_str(),
                            relation.id,
                            relation.constraint_name
                        )))
                    }
                };

                if view.cardinality != relation.cardinality_for(side)
                    || &view.related != related
                    || &view.field_name != field
                {
                    return Err(asymmetry(format!(
                        "{} view of relation {} ({}) on {} disagrees with the relation",
                        side.as_str(),
                        relation.id,
                        relation.constraint_name,
                        holder
                    )));
                }
            }
        }

        for entity in &self.entities {
            for view in &entity.relations {
                let Some(relation) = self.relations.get(&view.relation) else {
                    return Err(asymmetry(format!(
                        "{} holds a view of unknown relation {}",
                        entity.key(),
                        view.relation
                    )));
                };
                let expected_holder = match view.side {
                    RelationSide::Owning => &relation.owning,
                    RelationSide::Inverse => &relation.referenced,
                };
                if *expected_holder != entity.key() {
                    return Err(asymmetry(format!(
                        "{} holds a {} view of relation {} that belongs to {}",
                        entity.key(),
                        view.side.as_str(),
                        view.relation,
                        expected_holder
                    )));
                }
            }
        }

        Ok(())
    }
}

fn asymmetry(message: String) -> EntityGenError {
    EntityGenError::RelationSymmetryError { message }
}

/// Result of one extraction run
#[derive(Debug, Clone, Default)]
pub struct ExtractedModel {
    pub model: SchemaModel,
    /// In the order they were found
    pub diagnostics: Vec<Diagnostic>,
}
