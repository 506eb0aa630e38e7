use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The input could not be parsed, or a required attribute was missing
    #[error("Malformed document: {0}")]
    MalformedDocument(#[from] serde_xml_rs::Error),

    #[error("Unknown interaction pattern: {0}")]
    UnknownPatternKind(String),

    #[error("Operation `{service}::{operation}` has no pattern messages")]
    MissingPatternMessages { service: String, operation: String },

    #[error("Service `{service}` defines operation `{operation}` more than once")]
    DuplicateOperationName { service: String, operation: String },

    #[error("Type `{name}` is defined more than once in `{scope}`")]
    DuplicateTypeName { scope: String, name: String },

    #[error("Enumeration `{enumeration}` assigns value {value} to more than one item")]
    DuplicateEnumerationValue { enumeration: String, value: u32 },

    #[error("`{0}` is not a valid identifier")]
    InvalidIdentifier(String),
}
