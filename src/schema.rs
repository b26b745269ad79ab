//! Parsed protocol schema: messages, fields and enumerations as handed over by a schema parser.
//!
//! These records are inputs only. Everything the generator derives from them lives in
//! separate view types ([`FieldView`](crate::field::FieldView),
//! [`MessageView`](crate::message::MessageView), [`EnumView`](crate::enums::EnumView)).

use crate::accessor::Endianness;
use crate::crc::X25;
use crate::error::GenError;
use crate::field::WireType;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// One protocol definition file (a dialect or one of its includes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub basename: String,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub enums: Vec<Enumeration>,
}

impl Schema {
    pub fn new(basename: impl Into<String>, settings: Settings) -> Self {
        Schema {
            basename: basename.into(),
            settings,
            messages: Vec::new(),
            enums: Vec::new(),
        }
    }

    /// Load the object graph a parser serialized as JSON.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn get_message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    pub fn get_enum(&self, name: &str) -> Option<&Enumeration> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Builder for a message laid out under this schema's settings.
    pub fn message_builder(&self, id: u32, name: impl Into<String>) -> MessageBuilder {
        MessageBuilder::new(id, name).with_settings(&self.settings)
    }
}

/// Global settings of a schema file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub little_endian: bool,
    /// Whether messages carry a checksum-extra byte.
    pub crc_extra: bool,
    /// Extended (24-bit) message id space.
    pub command_24bit: bool,
    /// Fields are reordered by width for alignment.
    pub sort_fields: bool,
    pub protocol_marker: u8,
    pub wire_protocol_version: String,
    pub version: u8,
    /// Parse timestamp supplied by the parser; emitted verbatim as the build date.
    pub parse_time: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            little_endian: true,
            crc_extra: true,
            command_24bit: false,
            sort_fields: true,
            protocol_marker: 0xFE,
            wire_protocol_version: "1.0".to_string(),
            version: 3,
            parse_time: String::new(),
        }
    }
}

impl Settings {
    /// Wire protocol 2.0 defaults: `0xFD` marker and the extended id space.
    pub fn v2() -> Self {
        Settings {
            command_24bit: true,
            protocol_marker: 0xFD,
            wire_protocol_version: "2.0".to_string(),
            ..Settings::default()
        }
    }

    pub fn endianness(&self) -> Endianness {
        if self.little_endian {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Fields in declared order.
    pub fields: Vec<Field>,
    /// Wire order as indices into `fields`.
    pub wire_order: Vec<usize>,
    pub crc_extra: u8,
    pub wire_length: usize,
    pub wire_min_length: usize,
}

impl Message {
    pub fn name_lower(&self) -> String {
        self.name.to_lowercase()
    }

    /// Fields in wire order. Indices outside `fields` are skipped.
    pub fn wire_fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.wire_order.iter().filter_map(move |&i| self.fields.get(i))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    /// Declared wire type as written in the protocol definition (`uint8_t`, `char`, ...).
    #[serde(rename = "type")]
    pub wire_type: String,
    #[serde(default)]
    pub array_length: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enum_name: Option<String>,
    /// Constant-valued field left out of the constructor arguments.
    #[serde(default)]
    pub omit_arg: bool,
    #[serde(default)]
    pub const_value: Option<String>,
    #[serde(default)]
    pub test_value: Option<TestValue>,
    /// Offset a parser computed, if any. Checked against the wire order, never trusted.
    #[serde(default)]
    pub wire_offset: Option<usize>,
    /// Protocol 2.0 extension field (may be truncated off the wire).
    #[serde(default)]
    pub extension: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, wire_type: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            wire_type: wire_type.into(),
            array_length: 0,
            description: String::new(),
            enum_name: None,
            omit_arg: false,
            const_value: None,
            test_value: None,
            wire_offset: None,
            extension: false,
        }
    }

    pub fn array(mut self, length: u32) -> Self {
        self.array_length = length;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_enum(mut self, enum_name: impl Into<String>) -> Self {
        self.enum_name = Some(enum_name.into());
        self
    }

    /// Bind the field to a constant and drop it from the constructor arguments.
    pub fn constant(mut self, value: impl Into<String>) -> Self {
        self.omit_arg = true;
        self.const_value = Some(value.into());
        self
    }

    pub fn test_value(mut self, value: TestValue) -> Self {
        self.test_value = Some(value);
        self
    }

    pub fn extension(mut self) -> Self {
        self.extension = true;
        self
    }
}

/// Test value declared for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestValue {
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    List(Vec<TestValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enumeration {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub entries: Vec<EnumEntry>,
}

impl Enumeration {
    pub fn new(name: impl Into<String>) -> Self {
        Enumeration {
            name: name.into(),
            description: String::new(),
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, name: impl Into<String>, value: i64) -> Self {
        self.entries.push(EnumEntry {
            name: name.into(),
            value,
            description: String::new(),
            params: Vec::new(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumEntry {
    pub name: String,
    pub value: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub params: Vec<EnumParam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumParam {
    pub index: u8,
    #[serde(default)]
    pub description: String,
}

/// Builds a [`Message`] with wire order, offsets, lengths and checksum-extra filled in.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    id: u32,
    name: String,
    description: String,
    fields: Vec<Field>,
    sort_fields: bool,
}

impl MessageBuilder {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        MessageBuilder {
            id,
            name: name.into(),
            description: String::new(),
            fields: Vec::new(),
            sort_fields: true,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn sort_fields(mut self, sort: bool) -> Self {
        self.sort_fields = sort;
        self
    }

    /// Take the layout options (field sorting) from `settings`.
    pub fn with_settings(self, settings: &Settings) -> Self {
        self.sort_fields(settings.sort_fields)
    }

    pub fn build(self) -> Result<Message, GenError> {
        let mut types = Vec::with_capacity(self.fields.len());
        for f in &self.fields {
            let t = WireType::parse(&f.wire_type).ok_or_else(|| GenError::UnknownWireType {
                message: self.name.clone(),
                field: f.name.clone(),
                wire_type: f.wire_type.clone(),
            })?;
            types.push(t);
        }

        // Extensions never move: they follow the base fields in declared order.
        let mut wire_order: Vec<usize> = (0..self.fields.len())
            .filter(|&i| !self.fields[i].extension)
            .collect();
        if self.sort_fields {
            wire_order.sort_by_key(|&i| Reverse(types[i].width()));
        }
        wire_order.extend((0..self.fields.len()).filter(|&i| self.fields[i].extension));

        let mut fields = self.fields;
        let mut offset = 0usize;
        let mut min_length = 0usize;
        let mut crc = X25::new();
        crc.accumulate_str(&format!("{} ", self.name));
        for &i in &wire_order {
            let f = &mut fields[i];
            let size = types[i].width() * f.array_length.max(1) as usize;
            f.wire_offset = Some(offset);
            offset += size;
            if !f.extension {
                min_length += size;
                crc.accumulate_str(&format!("{} ", types[i].c_name()));
                crc.accumulate_str(&format!("{} ", f.name));
                if f.array_length > 0 {
                    crc.accumulate(&[f.array_length as u8]);
                }
            }
        }

        Ok(Message {
            id: self.id,
            name: self.name,
            description: self.description,
            fields,
            wire_order,
            crc_extra: crc.extra_byte(),
            wire_length: offset,
            wire_min_length: min_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heartbeat(sort: bool) -> Message {
        MessageBuilder::new(0, "HEARTBEAT")
            .sort_fields(sort)
            .field(Field::new("type", "uint8_t"))
            .field(Field::new("autopilot", "uint8_t"))
            .field(Field::new("base_mode", "uint8_t"))
            .field(Field::new("custom_mode", "uint32_t"))
            .field(Field::new("system_status", "uint8_t"))
            .field(Field::new("mavlink_version", "uint8_t_mavlink_version").constant("3"))
            .build()
            .expect("build")
    }

    #[test]
    fn sorted_wire_order_puts_wide_fields_first() {
        let m = heartbeat(true);
        let names: Vec<_> = m.wire_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            ["custom_mode", "type", "autopilot", "base_mode", "system_status", "mavlink_version"]
        );
        assert_eq!(m.fields[3].wire_offset, Some(0));
        assert_eq!(m.fields[0].wire_offset, Some(4));
        assert_eq!(m.wire_length, 9);
        assert_eq!(m.wire_min_length, 9);
    }

    #[test]
    fn heartbeat_crc_extra() {
        assert_eq!(heartbeat(true).crc_extra, 50);
    }

    #[test]
    fn unsorted_keeps_declared_order() {
        let m = heartbeat(false);
        assert_eq!(m.wire_order, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(m.fields[3].wire_offset, Some(3));
    }

    #[test]
    fn schema_builder_follows_sort_setting() {
        let schema = Schema::new(
            "plain",
            Settings {
                sort_fields: false,
                ..Settings::default()
            },
        );
        let m = schema
            .message_builder(2, "PAIR")
            .field(Field::new("a", "uint8_t"))
            .field(Field::new("b", "uint32_t"))
            .build()
            .expect("build");
        assert_eq!(m.wire_order, vec![0, 1]);
        let sorted = Schema::new("aligned", Settings::default())
            .message_builder(2, "PAIR")
            .field(Field::new("a", "uint8_t"))
            .field(Field::new("b", "uint32_t"))
            .build()
            .expect("build");
        assert_eq!(sorted.wire_order, vec![1, 0]);
    }

    #[test]
    fn extensions_trail_and_shrink_min_length() {
        let m = MessageBuilder::new(1, "EXT")
            .field(Field::new("a", "uint8_t"))
            .field(Field::new("b", "uint32_t"))
            .field(Field::new("c", "uint64_t").extension())
            .build()
            .expect("build");
        let names: Vec<_> = m.wire_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert_eq!(m.wire_length, 13);
        assert_eq!(m.wire_min_length, 5);
    }

    #[test]
    fn unknown_type_names_field_and_message() {
        let err = MessageBuilder::new(2, "BAD")
            .field(Field::new("x", "int128_t"))
            .build()
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("BAD") && text.contains("x") && text.contains("int128_t"), "{}", text);
    }

    #[test]
    fn schema_from_json() {
        let json = r#"{
            "basename": "minimal",
            "settings": { "command_24bit": true },
            "messages": [{
                "id": 0, "name": "PING", "crc_extra": 7,
                "wire_length": 2, "wire_min_length": 2, "wire_order": [0],
                "fields": [{ "name": "seq", "type": "uint16_t", "test_value": 17 }]
            }],
            "enums": [{ "name": "E", "entries": [{ "name": "E_A", "value": 1 }] }]
        }"#;
        let schema = Schema::from_json(json).expect("json");
        assert!(schema.settings.command_24bit);
        assert!(schema.settings.little_endian);
        let ping = schema.get_message("PING").expect("PING");
        assert_eq!(ping.fields[0].test_value, Some(TestValue::Int(17)));
        assert_eq!(ping.fields[0].wire_offset, None);
        assert_eq!(schema.get_enum("E").map(|e| e.entries.len()), Some(1));
    }
}
