//! Internal representation of a MAL service definition, closer to the structure needed for code
//! generation than the raw XML model

use std::fmt;

use crate::error;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub areas: Vec<Area>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub name: String,
    pub number: u16,
    pub version: u16,
    pub comment: String,
    pub requirements: String,

    pub services: Vec<Service>,
    pub composites: Vec<Composite>,
    pub enumerations: Vec<Enumeration>,

    /// Errors are area scoped and may be raised by any service in the area
    pub errors: Vec<Error>,
}

impl Area {
    pub fn abstract_types(&self) -> impl Iterator<Item = &Composite> {
        self.composites.iter().filter(|c| c.is_abstract())
    }

    pub fn is_abstract_type(&self, name: &str) -> bool {
        self.composites.iter().any(|c| c.name == name && c.is_abstract())
    }

    /// Whether `base` refers to an abstract composite defined in this area, or in `service` when
    /// resolving from within a service. A reference without a service is looked up in `service`
    /// first, then in the area.
    pub fn is_abstract_base(&self, service: Option<&Service>, base: &Type) -> bool {
        if !base.area.is_empty() && base.area != self.name {
            return false;
        }

        match service {
            Some(service) if base.service == service.name => service.is_abstract_type(&base.name),
            Some(service) if base.service.is_empty() => {
                service.is_abstract_type(&base.name) || self.is_abstract_type(&base.name)
            }
            _ => base.service.is_empty() && self.is_abstract_type(&base.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    /// Name of the owning area
    pub area: String,
    pub name: String,
    pub number: u16,
    pub comment: String,

    pub operations: Vec<Operation>,
    pub composites: Vec<Composite>,
    pub enumerations: Vec<Enumeration>,
}

impl Service {
    pub fn abstract_types(&self) -> impl Iterator<Item = &Composite> {
        self.composites.iter().filter(|c| c.is_abstract())
    }

    pub fn is_abstract_type(&self, name: &str) -> bool {
        self.composites.iter().any(|c| c.name == name && c.is_abstract())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: String,
    pub number: u16,
    pub comment: String,
    pub pattern: PatternInteraction,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PatternKind {
    Send,
    Submit,
    Request,
    Invoke,
    Progress,
    PubSub,
}

impl PatternKind {
    pub const ALL: [PatternKind; 6] = [
        PatternKind::Send,
        PatternKind::Submit,
        PatternKind::Request,
        PatternKind::Invoke,
        PatternKind::Progress,
        PatternKind::PubSub,
    ];

    /// Resolves the pattern from the name of the element an operation is declared with
    pub fn from_element_name(name: &str) -> error::Result<Self> {
        PatternKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.element_name() == name)
            .ok_or_else(|| error::Error::UnknownPatternKind(name.to_owned()))
    }

    pub fn element_name(self) -> &'static str {
        match self {
            PatternKind::Send => "sendIP",
            PatternKind::Submit => "submitIP",
            PatternKind::Request => "requestIP",
            PatternKind::Invoke => "invokeIP",
            PatternKind::Progress => "progressIP",
            PatternKind::PubSub => "pubsubIP",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::Send => "send",
            PatternKind::Submit => "submit",
            PatternKind::Request => "request",
            PatternKind::Invoke => "invoke",
            PatternKind::Progress => "progress",
            PatternKind::PubSub => "pubsub",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternInteraction {
    pub kind: PatternKind,

    /// The full canonical message sequence for `kind`
    pub messages: Vec<Message>,
}

impl PatternInteraction {
    /// Types supplied by the consumer when initiating the interaction
    pub fn input(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role.is_input())
    }

    /// Types returned by the provider when the interaction completes
    pub fn output(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role.is_output())
    }

    pub fn message_names(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.name.as_str()).collect()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MessageRole {
    Input,
    Intermediate,
    Output,

    /// The only message of a single message pattern
    InputOutput,
}

impl MessageRole {
    pub fn is_input(self) -> bool {
        matches!(self, MessageRole::Input | MessageRole::InputOutput)
    }

    pub fn is_output(self) -> bool {
        matches!(self, MessageRole::Output | MessageRole::InputOutput)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,
    pub role: MessageRole,
    pub types: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    pub name: String,
    pub area: String,

    /// Empty for area scoped types
    pub service: String,

    pub is_list: bool,
}

impl Type {
    pub fn is_a_list(&self) -> bool {
        self.is_list
    }

    /// The rendered name of the type. Lists of `X` are named `XList`, even when `X` already ends
    /// with `List`.
    pub fn adapt_type(&self) -> String {
        match self.is_list {
            true => format!("{}List", self.name),
            false => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub name: String,
    pub short_form_part: String,
    pub comment: String,

    /// The supertype, `None` for root types
    pub extends: Option<Type>,

    pub fields: Vec<Field>,
    is_abstract: bool,
}

impl Composite {
    /// A composite declared without any fields is treated as abstract. This is an approximation:
    /// the schema has no explicit flag, so a concrete composite without fields is also reported as
    /// abstract.
    pub fn new(
        name: String,
        short_form_part: String,
        comment: String,
        extends: Option<Type>,
        fields: Vec<Field>,
    ) -> Self {
        let is_abstract = fields.is_empty();
        Composite { name, short_form_part, comment, extends, fields, is_abstract }
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub can_be_null: bool,
    pub comment: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    pub name: String,
    pub short_form_part: String,
    pub comment: String,

    /// Items in declaration order
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub value: String,
    pub nvalue: u32,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub name: String,
    pub number: u32,
    pub comment: String,
}
