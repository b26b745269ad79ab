//! Generation errors. Every variant aborts generation for the whole schema set.

use crate::template::TemplateError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("No schema to generate from")]
    NoSchema,
    #[error("Unknown wire type {wire_type:?} for field {field} in message {message}")]
    UnknownWireType {
        message: String,
        field: String,
        wire_type: String,
    },
    #[error("Field {field} in message {message} references unknown enum {enum_name}")]
    UnknownEnum {
        message: String,
        field: String,
        enum_name: String,
    },
    #[error("Duplicate message id {id}: {first} and {second}")]
    DuplicateMessageId { id: u32, first: String, second: String },
    #[error("Message {message}: wire order is not a permutation of its fields")]
    InvalidWireOrder { message: String },
    #[error("Message {message}: fields are reordered but the schema does not sort fields")]
    UnexpectedReorder { message: String },
    #[error("Message {message}: declared wire length {declared}, fields add up to {computed}")]
    LengthMismatch {
        message: String,
        declared: usize,
        computed: usize,
    },
    #[error("Message {message}: field {field} declared at offset {declared}, wire order puts it at {computed}")]
    OffsetMismatch {
        message: String,
        field: String,
        declared: usize,
        computed: usize,
    },
    #[error("Message {message}: omitted field {field} has no constant value")]
    MissingConstant { message: String, field: String },
    #[error("Message {message}: fields {first} and {second} both map to identifier {identifier}")]
    FieldCollision {
        message: String,
        identifier: String,
        first: String,
        second: String,
    },
    #[error("Enum {enumeration}: entries {first} and {second} both map to identifier {identifier}")]
    EntryCollision {
        enumeration: String,
        identifier: String,
        first: String,
        second: String,
    },
    #[error("Template: {0}")]
    Template(#[from] TemplateError),
    #[error("IO on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Write: {0}")]
    Write(#[from] std::io::Error),
}
