//! Per-message derived view: field views, wire-order partitions and constructor bindings.

use crate::error::GenError;
use crate::field::FieldView;
use crate::registry::struct_type_name;
use crate::schema::{Message, Settings};
use std::collections::{BTreeSet, HashMap};

/// What the generated constructor assigns to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Taken from the constructor argument of this name.
    Argument(String),
    /// Fixed literal; the field is not a constructor argument.
    Constant(String),
}

impl Binding {
    /// Expression placed on the right-hand side of the assignment.
    pub fn put_name(&self) -> &str {
        match self {
            Binding::Argument(name) | Binding::Constant(name) => name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessageView<'a> {
    pub message: &'a Message,
    pub name_lower: String,
    pub type_name: String,
    /// `, <crc>` when the schema uses checksum-extra bytes, empty otherwise.
    pub crc_extra_arg: String,
    /// Field views in declared order.
    pub fields: Vec<FieldView<'a>>,
    /// One binding per declared field.
    pub bindings: Vec<Binding>,
    wire_order: Vec<usize>,
    array_fields: Vec<usize>,
    scalar_fields: Vec<usize>,
    size: usize,
}

impl<'a> MessageView<'a> {
    pub fn derive(
        message: &'a Message,
        settings: &Settings,
        known_enums: &BTreeSet<&str>,
    ) -> Result<Self, GenError> {
        let mut placed = vec![false; message.fields.len()];
        let permutation = message.wire_order.len() == placed.len()
            && message
                .wire_order
                .iter()
                .all(|&i| i < placed.len() && !std::mem::replace(&mut placed[i], true));
        if !permutation {
            return Err(GenError::InvalidWireOrder {
                message: message.name.clone(),
            });
        }
        if !settings.sort_fields {
            let base = message.wire_order.iter().filter(|&&i| !message.fields[i].extension);
            if !base.clone().zip(base.skip(1)).all(|(a, b)| a < b) {
                return Err(GenError::UnexpectedReorder {
                    message: message.name.clone(),
                });
            }
        }

        // Offsets come from the wire order; a parser-supplied offset is only checked.
        let mut offset = 0usize;
        let mut slots: Vec<Option<FieldView<'a>>> = vec![None; message.fields.len()];
        let mut array_fields = Vec::new();
        let mut scalar_fields = Vec::new();
        for &i in &message.wire_order {
            let field = &message.fields[i];
            if let Some(declared) = field.wire_offset.filter(|&d| d != offset) {
                return Err(GenError::OffsetMismatch {
                    message: message.name.clone(),
                    field: field.name.clone(),
                    declared,
                    computed: offset,
                });
            }
            let view = FieldView::derive(field, message, offset, known_enums)?;
            offset += view.byte_size();
            if view.is_array() {
                array_fields.push(i);
            } else {
                scalar_fields.push(i);
            }
            slots[i] = Some(view);
        }
        let fields: Vec<FieldView<'a>> = slots.into_iter().flatten().collect();

        let mut seen: HashMap<&str, &str> = HashMap::new();
        for f in &fields {
            if let Some(first) = seen.insert(f.identifier.as_str(), f.field.name.as_str()) {
                return Err(GenError::FieldCollision {
                    message: message.name.clone(),
                    identifier: f.identifier.clone(),
                    first: first.to_string(),
                    second: f.field.name.clone(),
                });
            }
        }

        if offset != message.wire_length {
            return Err(GenError::LengthMismatch {
                message: message.name.clone(),
                declared: message.wire_length,
                computed: offset,
            });
        }

        let bindings = fields
            .iter()
            .map(|f| {
                if !f.field.omit_arg {
                    return Ok(Binding::Argument(f.identifier.clone()));
                }
                f.field
                    .const_value
                    .clone()
                    .map(Binding::Constant)
                    .ok_or_else(|| GenError::MissingConstant {
                        message: message.name.clone(),
                        field: f.field.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let crc_extra_arg = if settings.crc_extra {
            format!(", {}", message.crc_extra)
        } else {
            String::new()
        };

        Ok(MessageView {
            message,
            name_lower: message.name_lower(),
            type_name: struct_type_name(&message.name),
            crc_extra_arg,
            fields,
            bindings,
            wire_order: message.wire_order.clone(),
            array_fields,
            scalar_fields,
            size: offset,
        })
    }

    /// Structure size in bytes: the sum of field sizes in wire order.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn wire_fields(&self) -> impl Iterator<Item = &FieldView<'a>> + '_ {
        self.wire_order.iter().map(move |&i| &self.fields[i])
    }

    /// Array-typed fields, in wire order.
    pub fn array_fields(&self) -> impl Iterator<Item = &FieldView<'a>> + '_ {
        self.array_fields.iter().map(move |&i| &self.fields[i])
    }

    /// Scalar fields, in wire order.
    pub fn scalar_fields(&self) -> impl Iterator<Item = &FieldView<'a>> + '_ {
        self.scalar_fields.iter().map(move |&i| &self.fields[i])
    }

    /// Constructor arguments: non-omitted fields in declared order.
    pub fn arg_fields(&self) -> impl Iterator<Item = &FieldView<'a>> + '_ {
        self.fields.iter().filter(|f| !f.field.omit_arg)
    }

    /// Fields paired with their constructor bindings, in declared order.
    pub fn bound_fields(&self) -> impl Iterator<Item = (&FieldView<'a>, &Binding)> + '_ {
        self.fields.iter().zip(self.bindings.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, MessageBuilder};

    fn names<'v, 'a: 'v>(it: impl Iterator<Item = &'v FieldView<'a>>) -> Vec<&'v str> {
        it.map(|f| f.field.name.as_str()).collect()
    }

    fn gps() -> Message {
        MessageBuilder::new(24, "GPS_RAW")
            .field(Field::new("time_usec", "uint64_t"))
            .field(Field::new("fix_type", "uint8_t"))
            .field(Field::new("lat", "int32_t"))
            .field(Field::new("name", "char").array(4))
            .field(Field::new("cov", "float").array(2))
            .field(Field::new("version", "uint8_t").constant("2"))
            .build()
            .expect("build")
    }

    #[test]
    fn partitions_follow_wire_order() {
        let m = gps();
        let view = MessageView::derive(&m, &Settings::default(), &BTreeSet::new()).unwrap();
        assert_eq!(names(view.wire_fields()), ["time_usec", "lat", "cov", "fix_type", "name", "version"]);
        assert_eq!(names(view.array_fields()), ["cov", "name"]);
        assert_eq!(names(view.scalar_fields()), ["time_usec", "lat", "fix_type", "version"]);
        assert_eq!(view.size(), 8 + 4 + 8 + 1 + 4 + 1);
    }

    #[test]
    fn arguments_in_declared_order_and_constants_bound() {
        let m = gps();
        let view = MessageView::derive(&m, &Settings::default(), &BTreeSet::new()).unwrap();
        assert_eq!(names(view.arg_fields()), ["time_usec", "fix_type", "lat", "name", "cov"]);
        assert_eq!(view.bindings[5], Binding::Constant("2".to_string()));
        assert_eq!(view.bindings[0].put_name(), "time_usec");
    }

    #[test]
    fn crc_extra_arg_follows_settings() {
        let m = gps();
        let with = MessageView::derive(&m, &Settings::default(), &BTreeSet::new()).unwrap();
        assert_eq!(with.crc_extra_arg, format!(", {}", m.crc_extra));
        let settings = Settings {
            crc_extra: false,
            ..Settings::default()
        };
        let without = MessageView::derive(&m, &settings, &BTreeSet::new()).unwrap();
        assert_eq!(without.crc_extra_arg, "");
    }

    #[test]
    fn escaped_identifier_is_used_for_binding() {
        let m = MessageBuilder::new(1, "FIX")
            .field(Field::new("fixed", "uint8_t"))
            .build()
            .unwrap();
        let view = MessageView::derive(&m, &Settings::default(), &BTreeSet::new()).unwrap();
        assert_eq!(view.fields[0].identifier, "@fixed");
        assert_eq!(view.bindings[0].put_name(), "@fixed");
        assert_eq!(view.fields[0].decode_left("fix"), "fix.@fixed = ");
    }

    #[test]
    fn field_collision_is_reported() {
        let m = MessageBuilder::new(1, "DUP")
            .field(Field::new("x", "uint8_t"))
            .field(Field::new("x", "uint16_t"))
            .build()
            .unwrap();
        let err = MessageView::derive(&m, &Settings::default(), &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, GenError::FieldCollision { .. }), "{}", err);
    }

    #[test]
    fn length_mismatch_is_reported() {
        let mut m = gps();
        m.wire_length += 1;
        let err = MessageView::derive(&m, &Settings::default(), &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, GenError::LengthMismatch { declared: 27, computed: 26, .. }), "{}", err);
    }

    #[test]
    fn broken_wire_order_is_reported() {
        let mut m = gps();
        m.wire_order[1] = m.wire_order[0];
        let err = MessageView::derive(&m, &Settings::default(), &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, GenError::InvalidWireOrder { .. }));
    }

    #[test]
    fn offsets_derived_without_parser_offsets() {
        let mut m = gps();
        for f in &mut m.fields {
            f.wire_offset = None;
        }
        let view = MessageView::derive(&m, &Settings::default(), &BTreeSet::new()).unwrap();
        let offsets: Vec<usize> = view.wire_fields().map(|f| f.offset).collect();
        assert_eq!(offsets, [0, 8, 12, 20, 21, 25]);
        assert_eq!(view.fields[3].accessor_tag(), "System.Text.ASCIIEncoding.ASCII.GetString(msg,21,4); //");
    }

    #[test]
    fn declared_offset_is_checked() {
        let mut m = gps();
        m.fields[2].wire_offset = Some(4);
        let err = MessageView::derive(&m, &Settings::default(), &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, GenError::OffsetMismatch { declared: 4, computed: 8, .. }), "{}", err);
    }

    #[test]
    fn reorder_rejected_when_schema_does_not_sort() {
        let settings = Settings {
            sort_fields: false,
            ..Settings::default()
        };
        let err = MessageView::derive(&gps(), &settings, &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, GenError::UnexpectedReorder { .. }), "{}", err);
        let plain = MessageBuilder::new(24, "GPS_RAW")
            .with_settings(&settings)
            .field(Field::new("time_usec", "uint64_t"))
            .field(Field::new("fix_type", "uint8_t"))
            .build()
            .expect("build");
        assert!(MessageView::derive(&plain, &settings, &BTreeSet::new()).is_ok());
    }

    #[test]
    fn omitted_field_without_constant() {
        let mut m = gps();
        m.fields[5].const_value = None;
        let err = MessageView::derive(&m, &Settings::default(), &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, GenError::MissingConstant { ref field, .. } if field == "version"));
    }
}
