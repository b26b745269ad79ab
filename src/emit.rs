//! Generation: derive every view, then render the four passes (header, enumerations,
//! per-message structures, footer) into one artifact.
//!
//! All derivation happens in [`Compilation::compile`] before any text is produced, so a schema
//! error never leaves a partially written file behind.

use crate::enums::{single_line, EnumView};
use crate::error::GenError;
use crate::field::FieldView;
use crate::message::MessageView;
use crate::registry::Registry;
use crate::schema::{Schema, Settings};
use crate::template::{Context, MavTemplate, TemplateRenderer};
use crate::templates;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Output naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenConfig {
    /// File written inside `<out_dir>/<basename>/`.
    pub file_name: String,
    /// Name of the partial class wrapping the generated code.
    pub class_name: String,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            file_name: "mavlink.cs".to_string(),
            class_name: "MAVLink".to_string(),
        }
    }
}

/// Every derived view of a schema set, ready to render.
#[derive(Debug, Clone)]
pub struct Compilation<'a> {
    /// Settings of the first schema; they drive the header.
    pub settings: &'a Settings,
    pub registry: Registry,
    pub enums: Vec<EnumView<'a>>,
    pub messages: Vec<MessageView<'a>>,
}

impl<'a> Compilation<'a> {
    /// Derive views for `schemas`. The first schema is the dialect, the rest its includes.
    pub fn compile(schemas: &'a [Schema]) -> Result<Self, GenError> {
        let first = schemas.first().ok_or(GenError::NoSchema)?;
        let settings = &first.settings;

        let known_enums: BTreeSet<&str> = schemas
            .iter()
            .flat_map(|s| s.enums.iter().map(|e| e.name.as_str()))
            .collect();

        let enums = schemas
            .iter()
            .flat_map(|s| &s.enums)
            .map(EnumView::derive)
            .collect::<Result<Vec<_>, _>>()?;

        let messages = schemas
            .iter()
            .flat_map(|s| &s.messages)
            .map(|m| MessageView::derive(m, settings, &known_enums))
            .collect::<Result<Vec<_>, _>>()?;

        let registry = Registry::build(schemas.iter().flat_map(|s| &s.messages), settings.command_24bit)?;

        log::debug!(
            "compiled {} message(s), {} enum(s), {} registry row(s)",
            messages.len(),
            enums.len(),
            registry.len()
        );
        Ok(Compilation {
            settings,
            registry,
            enums,
            messages,
        })
    }

    pub fn largest_payload(&self) -> usize {
        self.messages.iter().map(|m| m.size()).max().unwrap_or(0)
    }

    pub fn header_context(&self, config: &GenConfig) -> Context {
        let s = self.settings;
        let rows = self
            .registry
            .rows()
            .iter()
            .map(|r| {
                Context::new()
                    .with("id", r.id)
                    .with("name", &r.name)
                    .with("crc_extra", r.crc_extra)
                    .with("min_length", r.min_length)
                    .with("length", r.length)
                    .with("type_name", &r.type_name)
            })
            .collect();
        Context::new()
            .with("class_name", &config.class_name)
            .with("parse_time", &s.parse_time)
            .with("wire_protocol_version", &s.wire_protocol_version)
            .with("largest_payload", self.largest_payload())
            .with("protocol_marker", format!("0x{:02X}", s.protocol_marker))
            .with(
                "mavlink_endian",
                if s.little_endian {
                    "MAVLINK_LITTLE_ENDIAN"
                } else {
                    "MAVLINK_BIG_ENDIAN"
                },
            )
            .with("aligned_fields_define", flag(s.sort_fields))
            .with("crc_extra_define", flag(s.crc_extra))
            .with("command_24bit_define", flag(s.command_24bit))
            .with("version", s.version)
            .with_list("registry", rows)
    }

    pub fn enums_context(&self) -> Context {
        let enums = self
            .enums
            .iter()
            .map(|e| {
                let entries = e
                    .entries
                    .iter()
                    .map(|entry| {
                        let params = entry
                            .params
                            .iter()
                            .map(|p| Context::new().with("description", p))
                            .collect();
                        Context::new()
                            .with("name", &entry.identifier)
                            .with("value", entry.value())
                            .with("description", &entry.description)
                            .with_list("param", params)
                    })
                    .collect();
                let underlying = e
                    .underlying_type()
                    .map(|t| format!(" : {}", t))
                    .unwrap_or_default();
                Context::new()
                    .with("name", e.name())
                    .with("description", &e.description)
                    .with("underlying", underlying)
                    .with_list("entry", entries)
            })
            .collect();
        Context::new().with_list("enum", enums)
    }

    pub fn message_context(view: &MessageView<'_>) -> Context {
        let field_ctx = |f: &FieldView<'_>| {
            Context::new()
                .with("name", &f.identifier)
                .with("description", &f.description)
                .with("type", f.host_type)
                .with("array_prefix", f.array_prefix())
                .with("array_suffix", "")
                .with("array_length", f.field.array_length)
                .with("wire_offset", f.offset)
                .with("array_tag", f.accessor_tag())
                .with("decode_left", f.decode_left(&view.name_lower))
                .with("test_value", &f.test_literal)
        };

        let arg_list = view
            .arg_fields()
            .map(|f| format!("{} {}", f.host_type, f.identifier))
            .collect::<Vec<_>>()
            .join(", ");
        let constructor = if arg_list.is_empty() {
            Vec::new()
        } else {
            vec![Context::new()]
        };
        let assignments = view
            .bound_fields()
            .map(|(f, b)| Context::new().with("name", &f.identifier).with("putname", b.put_name()))
            .collect();

        Context::new()
            .with("id", view.message.id)
            .with("name", &view.message.name)
            .with("name_lower", &view.name_lower)
            .with("type_name", &view.type_name)
            .with("description", single_line(&view.message.description))
            .with("wire_length", view.size())
            .with("crc_extra_arg", &view.crc_extra_arg)
            .with("arg_list", arg_list)
            .with_list("constructor", constructor)
            .with_list("fields", assignments)
            .with_list("ordered_fields", view.wire_fields().map(field_ctx).collect())
            .with_list("array_fields", view.array_fields().map(field_ctx).collect())
            .with_list("scalar_fields", view.scalar_fields().map(field_ctx).collect())
    }
}

fn flag(on: bool) -> &'static str {
    if on {
        "1"
    } else {
        "0"
    }
}

/// Renders a schema set into the C# artifact.
#[derive(Debug, Clone)]
pub struct Generator<R = MavTemplate> {
    renderer: R,
    config: GenConfig,
}

impl Generator {
    pub fn new(config: GenConfig) -> Self {
        Generator {
            renderer: MavTemplate,
            config,
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Generator::new(GenConfig::default())
    }
}

impl<R: TemplateRenderer> Generator<R> {
    pub fn with_renderer(renderer: R, config: GenConfig) -> Self {
        Generator { renderer, config }
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// Render all four passes into one string.
    pub fn render(&self, schemas: &[Schema]) -> Result<String, GenError> {
        let compiled = Compilation::compile(schemas)?;
        let mut out = self
            .renderer
            .render(templates::HEADER, &compiled.header_context(&self.config))?;
        out.push_str(&self.renderer.render(templates::ENUMS, &compiled.enums_context())?);
        for view in &compiled.messages {
            log::debug!("rendering {} ({} bytes)", view.type_name, view.size());
            out.push_str(
                &self
                    .renderer
                    .render(templates::MESSAGE, &Compilation::message_context(view))?,
            );
        }
        out.push_str(&self.renderer.render(templates::FOOTER, &Context::new())?);
        Ok(out)
    }

    pub fn generate<W: Write>(&self, schemas: &[Schema], out: &mut W) -> Result<(), GenError> {
        let text = self.render(schemas)?;
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Write the artifact to `<out_dir>/<basename>/<file_name>`, replacing any previous one.
    pub fn generate_to_dir(&self, schemas: &[Schema], out_dir: &Path) -> Result<PathBuf, GenError> {
        let first = schemas.first().ok_or(GenError::NoSchema)?;
        let text = self.render(schemas)?;

        let directory = out_dir.join(&first.basename);
        log::info!("Generating C# implementation in directory {}", directory.display());
        fs::create_dir_all(&directory).map_err(|source| GenError::Io {
            path: directory.clone(),
            source,
        })?;

        let path = directory.join(&self.config.file_name);
        let file = File::create(&path).map_err(|source| GenError::Io {
            path: path.clone(),
            source,
        })?;
        let mut w = BufWriter::new(file);
        w.write_all(text.as_bytes())
            .and_then(|_| w.flush())
            .map_err(|source| GenError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}
