//! # mavsharp: MAVLink schema compiler for C#
//!
//! Takes the parsed object graph of one or more MAVLink protocol definitions and emits a single
//! C# source file: fixed-layout message structures, a global message registry and sanitized
//! enumerations.
//!
//! ## Pipeline
//!
//! - **Schema** ([`Schema`]): messages, fields and enumerations as a parser produced them
//!   (loadable from JSON, or built with [`MessageBuilder`]).
//! - **Derivation**: per-field ([`FieldView`]), per-message ([`MessageView`]) and per-enum
//!   ([`EnumView`]) views, plus the id-ordered [`Registry`]. All of it is computed before any
//!   output is produced.
//! - **Emission** ([`Generator`]): header, enumerations, one structure per message and footer,
//!   rendered through a [`TemplateRenderer`] (the bundled [`MavTemplate`] by default).
//!
//! ## Template syntax
//!
//! ```text
//! public enum MAVLINK_MSG_ID
//! {
//! ${{registry:    ${name} = ${id},
//! }}}
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use mavsharp::{Generator, Schema};
//! use std::path::Path;
//!
//! let text = std::fs::read_to_string("common.json")?;
//! let schema = Schema::from_json(&text)?;
//! let path = Generator::default().generate_to_dir(&[schema], Path::new("generated"))?;
//! println!("{}", path.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`accessor::decode_payload`] replays the derived layout against raw payload bytes; see
//! `tests/integration.rs` for end-to-end examples.

pub mod accessor;
pub mod crc;
pub mod emit;
pub mod enums;
pub mod error;
pub mod field;
pub mod message;
pub mod registry;
pub mod schema;
pub mod template;
pub mod templates;
pub mod value;

pub use accessor::{decode_payload, DecodeError, Endianness};
pub use emit::{Compilation, GenConfig, Generator};
pub use enums::{sanitize_entry_name, EnumView};
pub use error::GenError;
pub use field::{escape_identifier, AccessorHint, FieldView, HostType, WireType};
pub use message::{Binding, MessageView};
pub use registry::{Registry, RegistryRow};
pub use schema::{Enumeration, Field, Message, MessageBuilder, Schema, Settings, TestValue};
pub use template::{Context, MavTemplate, TemplateError, TemplateRenderer};
pub use value::Value;
