//! Lifts the parsed XML model into the internal representation, resolving each interaction
//! pattern into its canonical message sequence

use std::collections::HashSet;

use crate::{
    error::{Error, Result},
    repr::{
        self, Area, Composite, Enumeration, Field, Item, Message, MessageRole, Model, Operation,
        PatternInteraction, PatternKind, Service, Type,
    },
    schema::{self, MessageBody},
};

/// How duplicate definitions within a single scope are handled
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Strictness {
    /// Reject a second definition with the same name, or an enumeration value assigned twice
    Strict,

    /// Keep every definition, logging a warning for each duplicate
    Lenient,
}

#[derive(Clone, Debug)]
pub struct LiftConfig {
    pub strictness: Strictness,
}

impl Default for LiftConfig {
    fn default() -> Self {
        Self { strictness: Strictness::Strict }
    }
}

pub fn lift_specification(spec: schema::Specification, config: &LiftConfig) -> Result<Model> {
    let mut areas = vec![];
    for area in spec.areas {
        areas.push(lift_area(area, config)?);
    }
    Ok(Model { areas })
}

fn lift_area(def: schema::Area, config: &LiftConfig) -> Result<Area> {
    tracing::debug!(area = %def.name, services = def.services.len(), "lifting area");

    let (composites, enumerations) = lift_data_types(&def.name, def.data_types, config)?;

    let mut services = vec![];
    for service in def.services {
        services.push(lift_service(&def.name, service, config)?);
    }

    let errors = def
        .errors
        .errors
        .into_iter()
        .map(|e| repr::Error { name: e.name, number: e.number, comment: e.comment })
        .collect();

    Ok(Area {
        name: def.name,
        number: def.number,
        version: def.version,
        comment: def.comment,
        requirements: def.requirements,
        services,
        composites,
        enumerations,
        errors,
    })
}

fn lift_service(area: &str, def: schema::Service, config: &LiftConfig) -> Result<Service> {
    tracing::debug!(area, service = %def.name, "lifting service");

    let mut operations: Vec<Operation> = vec![];
    let mut seen = HashSet::new();

    for capability_set in &def.capability_sets {
        for element in capability_set.operations() {
            let operation = lift_operation(element)?;

            if !seen.insert(operation.name.clone()) {
                match config.strictness {
                    Strictness::Strict => {
                        return Err(Error::DuplicateOperationName {
                            service: def.name.clone(),
                            operation: operation.name,
                        })
                    }
                    Strictness::Lenient => tracing::warn!(
                        service = %def.name,
                        operation = %operation.name,
                        "duplicate operation name"
                    ),
                }
            }

            operations.push(operation);
        }
    }

    let scope = format!("{}::{}", area, def.name);
    let (composites, enumerations) = lift_data_types(&scope, def.data_types, config)?;

    Ok(Service {
        area: area.to_owned(),
        name: def.name,
        number: def.number,
        comment: def.comment,
        operations,
        composites,
        enumerations,
    })
}

fn lift_operation(element: schema::OperationElement) -> Result<Operation> {
    let kind = PatternKind::from_element_name(element.element)?;
    let def = element.operation;

    Ok(Operation {
        name: def.name.clone(),
        number: def.number,
        comment: def.comment.clone(),
        pattern: resolve_pattern(kind, &def.messages),
    })
}

/// Builds the complete message sequence of `kind`. Messages missing from the document are still
/// emitted, with no types.
pub fn resolve_pattern(kind: PatternKind, messages: &schema::Messages) -> PatternInteraction {
    use MessageRole::*;

    let none = None;
    let sequence: Vec<(&str, MessageRole, &Option<MessageBody>)> = match kind {
        PatternKind::Send => vec![("send", InputOutput, &messages.send)],
        PatternKind::Submit => {
            vec![("submit", Input, &messages.submit), ("ack", Output, &none)]
        }
        PatternKind::Request => vec![
            ("request", Input, &messages.request),
            ("response", Output, &messages.response),
        ],
        PatternKind::Invoke => vec![
            ("invoke", Input, &messages.invoke),
            ("ack", Intermediate, &none),
            ("response", Output, &messages.response),
        ],
        PatternKind::Progress => vec![
            ("progress", Input, &messages.progress),
            ("update", Intermediate, &messages.update),
            ("response", Output, &messages.response),
        ],
        PatternKind::PubSub => {
            vec![("publishNotify", InputOutput, &messages.publish_notify)]
        }
    };

    let messages = sequence
        .into_iter()
        .map(|(name, role, body)| Message {
            name: name.to_owned(),
            role,
            types: MessageBody::types_of(body).iter().map(lift_type).collect(),
        })
        .collect();

    PatternInteraction { kind, messages }
}

fn lift_type(def: &schema::TypeRef) -> Type {
    Type {
        name: def.name.clone(),
        area: def.area.clone(),
        service: def.service.clone(),
        is_list: def.is_a_list(),
    }
}

fn lift_data_types(
    scope: &str,
    def: schema::DataTypes,
    config: &LiftConfig,
) -> Result<(Vec<Composite>, Vec<Enumeration>)> {
    let mut names = HashSet::new();
    let mut check_name = |name: &str| -> Result<()> {
        if names.insert(name.to_owned()) {
            return Ok(());
        }
        match config.strictness {
            Strictness::Strict => {
                Err(Error::DuplicateTypeName { scope: scope.to_owned(), name: name.to_owned() })
            }
            Strictness::Lenient => {
                tracing::warn!(scope, name, "duplicate type name");
                Ok(())
            }
        }
    };

    let mut enumerations = vec![];
    for enumeration in def.enumerations {
        check_name(&enumeration.name)?;
        enumerations.push(lift_enumeration(enumeration, config)?);
    }

    let mut composites = vec![];
    for composite in def.composites {
        check_name(&composite.name)?;
        composites.push(lift_composite(composite));
    }

    Ok((composites, enumerations))
}

/// Items without an `nvalue` take their position. A value assigned twice, explicitly or by
/// position, is an error when strict.
fn lift_enumeration(def: schema::Enumeration, config: &LiftConfig) -> Result<Enumeration> {
    let mut values = HashSet::new();
    let mut items = vec![];

    for (position, item) in def.items.into_iter().enumerate() {
        let nvalue = item.nvalue.unwrap_or(position as u32);
        if !values.insert(nvalue) {
            match config.strictness {
                Strictness::Strict => {
                    return Err(Error::DuplicateEnumerationValue {
                        enumeration: def.name,
                        value: nvalue,
                    })
                }
                Strictness::Lenient => tracing::warn!(
                    enumeration = %def.name,
                    value = nvalue,
                    "duplicate enumeration value"
                ),
            }
        }
        items.push(Item { nvalue, value: item.value, comment: item.comment });
    }

    Ok(Enumeration {
        name: def.name,
        short_form_part: def.short_form_part,
        comment: def.comment,
        items,
    })
}

fn lift_composite(def: schema::Composite) -> Composite {
    let fields = def
        .fields
        .into_iter()
        .map(|field| Field {
            can_be_null: field.can_be_null.as_deref() == Some("true"),
            ty: lift_type(&field.type_),
            name: field.name,
            comment: field.comment,
        })
        .collect();

    Composite::new(
        def.name,
        def.short_form_part,
        def.comment,
        def.extends.map(|extends| lift_type(&extends.type_)),
        fields,
    )
}
