//! Generate the entity model XML document
//!
//! Layout:
//!
//! ```text
//! EntityModel
//!   Entities/Entity        columns, indexes and relation views of one table
//!   Relations/Relation     each relation once, with its column pairs or join table
//!   Diagnostics/Diagnostic
//! ```

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

use crate::model::{
    Column, ColumnPair, DefaultValue, Diagnostic, Entity, ExtractedModel, Index, Relation,
    RelationView, StorageOptions, ValidationConstraint,
};

/// Write `extracted` as an indented XML document
pub fn generate_model_xml<W: Write>(writer: W, extracted: &ExtractedModel) -> anyhow::Result<()> {
    let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);
    xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let model = &extracted.model;
    let entity_count = model.entities().len().to_string();
    let relation_count = model.relation_count().to_string();
    let root = BytesStart::new("EntityModel").with_attributes([
        ("Entities", entity_count.as_str()),
        ("Relations", relation_count.as_str()),
    ]);
    xml_writer.write_event(Event::Start(root))?;

    xml_writer.write_event(Event::Start(BytesStart::new("Entities")))?;
    for entity in model.entities() {
        write_entity(&mut xml_writer, entity)?;
    }
    xml_writer.write_event(Event::End(BytesEnd::new("Entities")))?;

    xml_writer.write_event(Event::Start(BytesStart::new("Relations")))?;
    for relation in model.relations() {
        write_relation(&mut xml_writer, relation)?;
    }
    xml_writer.write_event(Event::End(BytesEnd::new("Relations")))?;

    xml_writer.write_event(Event::Start(BytesStart::new("Diagnostics")))?;
    for diagnostic in &extracted.diagnostics {
        write_diagnostic(&mut xml_writer, diagnostic)?;
    }
    xml_writer.write_event(Event::End(BytesEnd::new("Diagnostics")))?;

    xml_writer.write_event(Event::End(BytesEnd::new("EntityModel")))?;
    Ok(())
}

fn write_entity<W: Write>(writer: &mut Writer<W>, entity: &Entity) -> anyhow::Result<()> {
    let elem = BytesStart::new("Entity").with_attributes([
        ("Name", entity.sql_name.as_str()),
        ("Schema", entity.schema.as_str()),
        ("Database", entity.database.as_str()),
    ]);
    writer.write_event(Event::Start(elem))?;

    for column in &entity.columns {
        write_column(writer, column)?;
    }
    for index in &entity.indexes {
        write_index(writer, index)?;
    }
    for view in &entity.relations {
        write_relation_view(writer, view)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Entity")))?;
    Ok(())
}

fn write_column<W: Write>(writer: &mut Writer<W>, column: &Column) -> anyhow::Result<()> {
    let mut elem = BytesStart::new("Column").with_attributes([
        ("Name", column.name.as_str()),
        ("NativeType", column.native_type.as_str()),
        ("Signature", column.native_signature.as_str()),
        ("LogicalType", column.logical_type.as_str()),
        ("Nullable", bool_str(column.nullable)),
    ]);
    for (name, set) in [
        ("Generated", column.generated),
        ("Unique", column.unique),
        ("Unsigned", column.unsigned),
        ("Primary", column.primary),
        ("ForeignKey", column.is_foreign_key),
        ("Required", column.is_required()),
    ] {
        if set {
            elem.push_attribute((name, "True"));
        }
    }
    push_storage_attributes(&mut elem, &column.storage);
    if let Some(transformer) = column.transformer {
        elem.push_attribute(("Transformer", transformer.as_str()));
    }
    if let Some(comment) = &column.comment {
        elem.push_attribute(("Comment", comment.as_str()));
    }

    let has_children = column.default.is_some()
        || !column.enum_values.is_empty()
        || !column.constraints.is_empty();
    if !has_children {
        writer.write_event(Event::Empty(elem))?;
        return Ok(());
    }
    writer.write_event(Event::Start(elem))?;

    if let Some(default) = &column.default {
        write_default(writer, default)?;
    }
    for value in &column.enum_values {
        write_empty(writer, "EnumValue", &[("Value", value.as_str())])?;
    }
    for constraint in &column.constraints {
        write_constraint(writer, constraint)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Column")))?;
    Ok(())
}

fn push_storage_attributes(elem: &mut BytesStart, storage: &StorageOptions) {
    let fields = [
        ("Precision", storage.precision.map(u64::from)),
        ("Scale", storage.scale.map(u64::from)),
        ("Length", storage.length),
        ("Width", storage.width.map(u64::from)),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            elem.push_attribute((name, value.to_string().as_str()));
        }
    }
}

fn write_default<W: Write>(writer: &mut Writer<W>, default: &DefaultValue) -> anyhow::Result<()> {
    match default {
        DefaultValue::CurrentTimestamp => {
            write_empty(writer, "Default", &[("Kind", "CurrentTimestamp")])?;
        }
        DefaultValue::Literal(value) => {
            write_empty(writer, "Default", &[("Kind", "Literal"), ("Value", value.as_str())])?;
        }
        DefaultValue::Array(values) => {
            let elem = BytesStart::new("Default").with_attributes([("Kind", "Array")]);
            writer.write_event(Event::Start(elem))?;
            for value in values {
                write_text_element(writer, "Value", value)?;
            }
            writer.write_event(Event::End(BytesEnd::new("Default")))?;
        }
    }
    Ok(())
}

fn write_constraint<W: Write>(
    writer: &mut Writer<W>,
    constraint: &ValidationConstraint,
) -> anyhow::Result<()> {
    match constraint {
        ValidationConstraint::MaxLength(len) => {
            let len = len.to_string();
            write_empty(
                writer,
                "Constraint",
                &[("Kind", "MaxLength"), ("Value", len.as_str())],
            )
        }
        ValidationConstraint::IsNumber => write_empty(writer, "Constraint", &[("Kind", "IsNumber")]),
        ValidationConstraint::IsNumberString => {
            write_empty(writer, "Constraint", &[("Kind", "IsNumberString")])
        }
        ValidationConstraint::IsIn { values, each } => {
            let elem = BytesStart::new("Constraint")
                .with_attributes([("Kind", "IsIn"), ("Each", bool_str(*each))]);
            writer.write_event(Event::Start(elem))?;
            for value in values {
                write_text_element(writer, "Value", value)?;
            }
            writer.write_event(Event::End(BytesEnd::new("Constraint")))?;
            Ok(())
        }
        ValidationConstraint::Required => write_empty(writer, "Constraint", &[("Kind", "Required")]),
        ValidationConstraint::Optional => write_empty(writer, "Constraint", &[("Kind", "Optional")]),
    }
}

fn write_index<W: Write>(writer: &mut Writer<W>, index: &Index) -> anyhow::Result<()> {
    let elem = BytesStart::new("Index").with_attributes([
        ("Name", index.name.as_str()),
        ("Primary", bool_str(index.primary)),
        ("Unique", bool_str(index.unique)),
        ("Fulltext", bool_str(index.fulltext)),
    ]);
    writer.write_event(Event::Start(elem))?;
    for column in &index.columns {
        write_empty(writer, "IndexColumn", &[("Name", column.as_str())])?;
    }
    writer.write_event(Event::End(BytesEnd::new("Index")))?;
    Ok(())
}

fn write_relation_view<W: Write>(writer: &mut Writer<W>, view: &RelationView) -> anyhow::Result<()> {
    let id = view.relation.to_string();
    let related = view.related.to_string();
    write_empty(
        writer,
        "RelationView",
        &[
            ("Relation", id.as_str()),
            ("Side", view.side.as_str()),
            ("Field", view.field_name.as_str()),
            ("Cardinality", view.cardinality.as_str()),
            ("Related", related.as_str()),
        ],
    )
}

fn write_relation<W: Write>(writer: &mut Writer<W>, relation: &Relation) -> anyhow::Result<()> {
    let id = relation.id.to_string();
    let owning = relation.owning.to_string();
    let referenced = relation.referenced.to_string();
    let mut elem = BytesStart::new("Relation").with_attributes([
        ("Id", id.as_str()),
        ("Constraint", relation.constraint_name.as_str()),
        ("Cardinality", relation.cardinality.as_str()),
        ("Owning", owning.as_str()),
        ("Referenced", referenced.as_str()),
        ("OwningField", relation.owning_field.as_str()),
        ("InverseField", relation.inverse_field.as_str()),
    ]);
    if let Some(action) = &relation.on_delete {
        elem.push_attribute(("OnDelete", action.as_str()));
    }
    if let Some(action) = &relation.on_update {
        elem.push_attribute(("OnUpdate", action.as_str()));
    }
    writer.write_event(Event::Start(elem))?;

    write_column_pairs(writer, "ColumnPair", &relation.column_pairs)?;

    if let Some(join) = &relation.join_table {
        let table = join.table.to_string();
        let elem = BytesStart::new("JoinTable").with_attributes([("Table", table.as_str())]);
        writer.write_event(Event::Start(elem))?;
        write_column_pairs(writer, "OwningColumn", &join.owning_columns)?;
        write_column_pairs(writer, "InverseColumn", &join.inverse_columns)?;
        writer.write_event(Event::End(BytesEnd::new("JoinTable")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Relation")))?;
    Ok(())
}

fn write_column_pairs<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    pairs: &[ColumnPair],
) -> anyhow::Result<()> {
    for pair in pairs {
        write_empty(
            writer,
            name,
            &[
                ("Column", pair.owning.as_str()),
                ("References", pair.referenced.as_str()),
            ],
        )?;
    }
    Ok(())
}

fn write_diagnostic<W: Write>(writer: &mut Writer<W>, diagnostic: &Diagnostic) -> anyhow::Result<()> {
    let message = diagnostic.to_string();
    write_empty(
        writer,
        "Diagnostic",
        &[("Kind", diagnostic.kind()), ("Message", message.as_str())],
    )
}

fn write_empty<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, &str)],
) -> anyhow::Result<()> {
    let elem = BytesStart::new(name).with_attributes(attributes.iter().copied());
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, value: &str) -> anyhow::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
