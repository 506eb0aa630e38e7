//! Code for parsing MAL service definitions from an XML file

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Deserialize)]
#[serde(rename = "specification")]
pub struct Specification {
    #[serde(rename = "area", default)]
    pub areas: Vec<Area>,
}

#[derive(Debug, Deserialize)]
pub struct Area {
    pub name: String,
    pub number: u16,
    pub version: u16,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub requirements: String,

    #[serde(rename = "service", default)]
    pub services: Vec<Service>,

    #[serde(rename = "dataTypes", default)]
    pub data_types: DataTypes,

    #[serde(default)]
    pub errors: Errors,
}

#[derive(Debug, Default, Deserialize)]
pub struct DataTypes {
    #[serde(rename = "enumeration", default)]
    pub enumerations: Vec<Enumeration>,

    #[serde(rename = "composite", default)]
    pub composites: Vec<Composite>,
}

#[derive(Debug, Deserialize)]
pub struct Enumeration {
    pub name: String,

    #[serde(rename = "shortFormPart", default)]
    pub short_form_part: String,

    #[serde(default)]
    pub comment: String,

    #[serde(rename = "item", default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
pub struct Item {
    pub value: String,
    pub nvalue: Option<u32>,

    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct Composite {
    pub name: String,

    #[serde(rename = "shortFormPart", default)]
    pub short_form_part: String,

    #[serde(default)]
    pub comment: String,

    pub extends: Option<Extends>,

    #[serde(rename = "field", default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Deserialize)]
pub struct Extends {
    #[serde(rename = "type")]
    pub type_: TypeRef,
}

#[derive(Debug, Deserialize)]
pub struct Field {
    pub name: String,

    #[serde(rename = "canBeNull")]
    pub can_be_null: Option<String>,

    #[serde(default)]
    pub comment: String,

    #[serde(rename = "type")]
    pub type_: TypeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeRef {
    pub name: String,
    pub list: Option<String>,

    #[serde(default)]
    pub service: String,

    #[serde(default)]
    pub area: String,
}

impl TypeRef {
    /// Only the exact literal `true` marks a list
    pub fn is_a_list(&self) -> bool {
        self.list.as_deref() == Some("true")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Errors {
    #[serde(rename = "error", default)]
    pub errors: Vec<ErrorDefinition>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDefinition {
    pub name: String,
    pub number: u32,

    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct Service {
    pub name: String,
    pub number: u16,

    #[serde(default)]
    pub comment: String,

    #[serde(rename = "capabilitySet", default)]
    pub capability_sets: Vec<CapabilitySet>,

    #[serde(rename = "dataTypes", default)]
    pub data_types: DataTypes,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilitySet {
    pub number: u16,

    #[serde(default)]
    pub comment: String,

    #[serde(rename = "sendIP", default)]
    pub send: Vec<Operation>,

    #[serde(rename = "submitIP", default)]
    pub submit: Vec<Operation>,

    #[serde(rename = "requestIP", default)]
    pub request: Vec<Operation>,

    #[serde(rename = "invokeIP", default)]
    pub invoke: Vec<Operation>,

    #[serde(rename = "progressIP", default)]
    pub progress: Vec<Operation>,

    #[serde(rename = "pubsubIP", default)]
    pub pubsub: Vec<Operation>,
}

impl CapabilitySet {
    /// Every operation of the set tagged with the element it was read from, ordered by operation
    /// number. Operations sharing a number keep their element order.
    pub fn operations(&self) -> Vec<OperationElement<'_>> {
        let lists = [
            ("sendIP", &self.send),
            ("submitIP", &self.submit),
            ("requestIP", &self.request),
            ("invokeIP", &self.invoke),
            ("progressIP", &self.progress),
            ("pubsubIP", &self.pubsub),
        ];

        let mut operations: Vec<_> = lists
            .iter()
            .flat_map(|&(element, ops)| {
                ops.iter().map(move |operation| OperationElement { element, operation })
            })
            .collect();
        operations.sort_by_key(|op| op.operation.number);
        operations
    }
}

/// An operation together with the name of the element (`sendIP`, `invokeIP`, ...) that declared it
#[derive(Debug, Clone, Copy)]
pub struct OperationElement<'a> {
    pub element: &'static str,
    pub operation: &'a Operation,
}

#[derive(Debug, Deserialize)]
pub struct Operation {
    pub name: String,
    pub number: u16,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub messages: Messages,
}

#[derive(Debug, Default, Deserialize)]
pub struct Messages {
    pub send: Option<MessageBody>,
    pub submit: Option<MessageBody>,
    pub request: Option<MessageBody>,
    pub invoke: Option<MessageBody>,

    #[serde(rename = "acknowledgement")]
    pub ack: Option<MessageBody>,

    pub progress: Option<MessageBody>,
    pub update: Option<MessageBody>,
    pub response: Option<MessageBody>,

    #[serde(rename = "publishNotify")]
    pub publish_notify: Option<MessageBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub comment: String,

    #[serde(rename = "type", default)]
    pub types: Vec<TypeRef>,
}

impl MessageBody {
    /// The types carried by an optional message element, empty if the element is absent
    pub fn types_of(body: &Option<MessageBody>) -> &[TypeRef] {
        body.as_ref().map(|body| &body.types[..]).unwrap_or(&[])
    }
}

/// Parses a service definition. Sibling lists may be interleaved, e.g. enumerations and
/// composites mixed inside `dataTypes`.
pub fn parse(data: &[u8]) -> Result<Specification> {
    let mut deserializer =
        serde_xml_rs::Deserializer::new_from_reader(data).non_contiguous_seq_elements(true);
    Ok(Specification::deserialize(&mut deserializer)?)
}
