//! Field metadata derivation: host type, array marker, accessor hint, identifier and test literal.
//!
//! Every attribute here is a function of the field's own wire type, array length, name and the
//! offset its message's wire order assigns it; sibling fields are never consulted. [`FieldView::derive`] bundles them into one record
//! borrowed from the schema field.

use crate::error::GenError;
use crate::schema::{Field, Message, TestValue};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// Closed set of wire primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Char,
    Uint8,
    Int8,
    Uint16,
    Int16,
    Uint32,
    Int32,
    Uint64,
    Int64,
    Float,
    Double,
}

impl WireType {
    /// Parse a declared wire type. `uint8_t_mavlink_version` is the protocol-version byte.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "char" => WireType::Char,
            "uint8_t" | "uint8_t_mavlink_version" => WireType::Uint8,
            "int8_t" => WireType::Int8,
            "uint16_t" => WireType::Uint16,
            "int16_t" => WireType::Int16,
            "uint32_t" => WireType::Uint32,
            "int32_t" => WireType::Int32,
            "uint64_t" => WireType::Uint64,
            "int64_t" => WireType::Int64,
            "float" => WireType::Float,
            "double" => WireType::Double,
            _ => return None,
        })
    }

    pub fn width(self) -> usize {
        match self {
            WireType::Char | WireType::Uint8 | WireType::Int8 => 1,
            WireType::Uint16 | WireType::Int16 => 2,
            WireType::Uint32 | WireType::Int32 | WireType::Float => 4,
            WireType::Uint64 | WireType::Int64 | WireType::Double => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            WireType::Int8 | WireType::Int16 | WireType::Int32 | WireType::Int64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, WireType::Float | WireType::Double)
    }

    /// Canonical C spelling, as fed into the checksum-extra seed.
    pub fn c_name(self) -> &'static str {
        match self {
            WireType::Char => "char",
            WireType::Uint8 => "uint8_t",
            WireType::Int8 => "int8_t",
            WireType::Uint16 => "uint16_t",
            WireType::Int16 => "int16_t",
            WireType::Uint32 => "uint32_t",
            WireType::Int32 => "int32_t",
            WireType::Uint64 => "uint64_t",
            WireType::Int64 => "int64_t",
            WireType::Float => "float",
            WireType::Double => "double",
        }
    }

    /// C# scalar type carrying this wire type.
    pub fn host_name(self) -> &'static str {
        match self {
            WireType::Char | WireType::Uint8 | WireType::Int8 => "byte",
            WireType::Int16 => "Int16",
            WireType::Uint16 => "UInt16",
            WireType::Int32 => "Int32",
            WireType::Uint32 => "UInt32",
            WireType::Int64 => "Int64",
            WireType::Uint64 => "UInt64",
            WireType::Float => "Single",
            WireType::Double => "Double",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostType {
    Scalar(WireType),
    Array(WireType),
}

impl HostType {
    pub fn element(self) -> WireType {
        match self {
            HostType::Scalar(t) | HostType::Array(t) => t,
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Scalar(t) => f.write_str(t.host_name()),
            HostType::Array(t) => write!(f, "{}[]", t.host_name()),
        }
    }
}

/// Inline fixed-length array annotation for the structure layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayMarker {
    pub length: u32,
}

impl fmt::Display for ArrayMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[MarshalAs(UnmanagedType.ByValArray,SizeConst={})]", self.length)
    }
}

/// How a decoder extracts a field from the raw payload at its wire offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorHint {
    /// Single-byte read (byte-sized scalars).
    Byte(WireType),
    /// Fixed-width integer in the schema's byte order.
    Integer(WireType),
    /// IEEE-754 float in the schema's byte order.
    Float(WireType),
    /// Zero-copy byte slice (`uint8_t[]`, `int8_t[]`).
    Bytes { length: usize },
    /// Array of wider elements, decoded one by one.
    Elements { element: WireType, length: usize },
    /// `char[]` decoded as ASCII text.
    Text { length: usize },
}

impl AccessorHint {
    pub fn for_field(wire_type: WireType, array_length: u32) -> Self {
        let length = array_length as usize;
        match (wire_type, array_length) {
            (WireType::Char, 0) | (WireType::Uint8, 0) | (WireType::Int8, 0) => AccessorHint::Byte(wire_type),
            (t, 0) if t.is_float() => AccessorHint::Float(t),
            (t, 0) => AccessorHint::Integer(t),
            (WireType::Char, _) => AccessorHint::Text { length },
            (WireType::Uint8, _) | (WireType::Int8, _) => AccessorHint::Bytes { length },
            (t, _) => AccessorHint::Elements { element: t, length },
        }
    }

    pub fn byte_len(&self) -> usize {
        match self {
            AccessorHint::Byte(_) => 1,
            AccessorHint::Integer(t) | AccessorHint::Float(t) => t.width(),
            AccessorHint::Bytes { length } | AccessorHint::Text { length } => *length,
            AccessorHint::Elements { element, length } => element.width() * length,
        }
    }

    /// C# token used by the decode helpers for a field at `offset`.
    pub fn tag(&self, offset: usize) -> String {
        match self {
            AccessorHint::Byte(_) => "getByte".to_string(),
            AccessorHint::Integer(t) | AccessorHint::Float(t) => format!("BitConverter.To{}", t.host_name()),
            AccessorHint::Bytes { .. } | AccessorHint::Elements { .. } => "getBytes".to_string(),
            AccessorHint::Text { length } => {
                format!("System.Text.ASCIIEncoding.ASCII.GetString(msg,{},{}); //", offset, length)
            }
        }
    }
}

// Sorted for binary search.
const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Escape a field name that collides with a C# keyword (`fixed` → `@fixed`).
pub fn escape_identifier(name: &str) -> Cow<'_, str> {
    if CSHARP_KEYWORDS.binary_search(&name).is_ok() {
        Cow::Owned(format!("@{}", name))
    } else {
        Cow::Borrowed(name)
    }
}

/// Field description on one line: line feeds become spaces, carriage returns are dropped.
pub fn field_description(text: &str) -> String {
    text.replace('\n', " ").replace('\r', "")
}

fn scalar_literal(t: WireType, v: &TestValue) -> String {
    match (t, v) {
        (WireType::Float, TestValue::Float(x)) => format!("{:?}f", x),
        (WireType::Float, TestValue::Int(x)) => format!("{}f", x),
        (WireType::Float, TestValue::Uint(x)) => format!("{}f", x),
        (_, TestValue::Float(x)) => format!("{:?}", x),
        (_, TestValue::Int(x)) => x.to_string(),
        (_, TestValue::Uint(x)) => x.to_string(),
        (WireType::Char, TestValue::Text(s)) => match s.chars().next() {
            Some(c) => format!("(byte){}", char_literal(c)),
            None => "0".to_string(),
        },
        (_, TestValue::Text(s)) => s.clone(),
        (_, TestValue::List(items)) => items
            .first()
            .map(|first| scalar_literal(t, first))
            .unwrap_or_else(|| "0".to_string()),
    }
}

fn char_literal(c: char) -> String {
    match c {
        '\'' => "'\\''".to_string(),
        '\\' => "'\\\\'".to_string(),
        c => format!("'{}'", c),
    }
}

/// One character of a `char[]` test value given as a list of codes or one-letter strings.
fn char_of(v: &TestValue) -> Option<char> {
    match v {
        TestValue::Int(x) => u8::try_from(*x).ok().map(char::from),
        TestValue::Uint(x) => u8::try_from(*x).ok().map(char::from),
        TestValue::Text(s) => s.chars().next(),
        TestValue::Float(_) | TestValue::List(_) => None,
    }
}

fn string_literal(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render a field's declared test value as a C# literal shaped to its host type.
///
/// `char[]` fields render as a string converted with `ToCharArray()`; every other array is a
/// brace-enclosed element list.
pub fn test_literal(t: WireType, array_length: u32, value: Option<&TestValue>) -> String {
    if array_length == 0 {
        return match value {
            Some(v) => scalar_literal(t, v),
            None => "0".to_string(),
        };
    }
    match (t, value) {
        (WireType::Char, Some(TestValue::Text(s))) => format!("{}.ToCharArray()", string_literal(s)),
        (WireType::Char, Some(TestValue::List(items))) => {
            let text: String = items.iter().filter_map(char_of).collect();
            format!("{}.ToCharArray()", string_literal(&text))
        }
        (WireType::Char, None) => "\"\".ToCharArray()".to_string(),
        (_, Some(TestValue::List(items))) => {
            let parts: Vec<String> = items.iter().map(|v| scalar_literal(t, v)).collect();
            format!("{{ {} }}", parts.join(", "))
        }
        (_, Some(v)) => format!("{{ {} }}", scalar_literal(t, v)),
        (_, None) => {
            let zero = if t == WireType::Float { "0f" } else { "0" };
            format!("{{ {} }}", vec![zero; array_length as usize].join(", "))
        }
    }
}

/// Derived, emission-ready view of one schema field.
#[derive(Debug, Clone)]
pub struct FieldView<'a> {
    pub field: &'a Field,
    pub wire_type: WireType,
    pub host_type: HostType,
    pub array_marker: Option<ArrayMarker>,
    pub accessor: AccessorHint,
    /// Byte offset in the structure, from the message's wire order.
    pub offset: usize,
    pub identifier: String,
    pub description: String,
    pub test_literal: String,
}

impl<'a> FieldView<'a> {
    /// Derive the view of `field`, owned by `message` and placed at `offset`. `known_enums`
    /// holds every enumeration name in the schema set.
    pub fn derive(
        field: &'a Field,
        message: &Message,
        offset: usize,
        known_enums: &BTreeSet<&str>,
    ) -> Result<Self, GenError> {
        let wire_type = WireType::parse(&field.wire_type).ok_or_else(|| GenError::UnknownWireType {
            message: message.name.clone(),
            field: field.name.clone(),
            wire_type: field.wire_type.clone(),
        })?;
        if let Some(enum_name) = &field.enum_name {
            if !known_enums.contains(enum_name.as_str()) {
                return Err(GenError::UnknownEnum {
                    message: message.name.clone(),
                    field: field.name.clone(),
                    enum_name: enum_name.clone(),
                });
            }
        }

        let (host_type, array_marker) = if field.array_length == 0 {
            (HostType::Scalar(wire_type), None)
        } else {
            (
                HostType::Array(wire_type),
                Some(ArrayMarker {
                    length: field.array_length,
                }),
            )
        };

        Ok(FieldView {
            field,
            wire_type,
            host_type,
            array_marker,
            accessor: AccessorHint::for_field(wire_type, field.array_length),
            offset,
            identifier: escape_identifier(&field.name).into_owned(),
            description: field_description(&field.description),
            test_literal: test_literal(wire_type, field.array_length, field.test_value.as_ref()),
        })
    }

    pub fn is_array(&self) -> bool {
        self.array_marker.is_some()
    }

    /// Bytes the field occupies on the wire.
    pub fn byte_size(&self) -> usize {
        self.wire_type.width() * self.field.array_length.max(1) as usize
    }

    /// Declaration prefix: the array marker (when present) and the access modifier.
    pub fn array_prefix(&self) -> String {
        match self.array_marker {
            Some(marker) => format!("{}\n\t\tpublic", marker),
            None => "public".to_string(),
        }
    }

    pub fn accessor_tag(&self) -> String {
        self.accessor.tag(self.offset)
    }

    /// Left-hand side of the decode assignment into a structure value named `target`.
    pub fn decode_left(&self, target: &str) -> String {
        format!("{}.{} = ", target, self.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MessageBuilder;

    fn view_of(field: Field) -> (Message, usize) {
        let m = MessageBuilder::new(9, "T").field(field).build().expect("build");
        (m, 0)
    }

    #[test]
    fn keywords_sorted() {
        assert!(CSHARP_KEYWORDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn scalar_host_types() {
        let cases = [
            ("char", "byte"),
            ("uint8_t", "byte"),
            ("int8_t", "byte"),
            ("int16_t", "Int16"),
            ("uint16_t", "UInt16"),
            ("uint32_t", "UInt32"),
            ("int32_t", "Int32"),
            ("uint64_t", "UInt64"),
            ("int64_t", "Int64"),
            ("float", "Single"),
        ];
        for (wire, host) in cases {
            let t = WireType::parse(wire).expect(wire);
            assert_eq!(HostType::Scalar(t).to_string(), host, "{}", wire);
        }
    }

    #[test]
    fn array_host_type_and_marker() {
        let (m, i) = view_of(Field::new("values", "uint16_t").array(4));
        let v = FieldView::derive(&m.fields[i], &m, 0, &BTreeSet::new()).unwrap();
        assert_eq!(v.host_type.to_string(), "UInt16[]");
        assert_eq!(
            v.array_marker.map(|a| a.to_string()).as_deref(),
            Some("[MarshalAs(UnmanagedType.ByValArray,SizeConst=4)]")
        );
        assert_eq!(v.accessor, AccessorHint::Elements { element: WireType::Uint16, length: 4 });
        assert_eq!(v.byte_size(), 8);
    }

    #[test]
    fn byte_scalars_collapse_to_single_byte_read() {
        for wire in ["char", "uint8_t", "int8_t"] {
            let t = WireType::parse(wire).unwrap();
            assert_eq!(AccessorHint::for_field(t, 0).tag(0), "getByte");
        }
        assert_eq!(AccessorHint::for_field(WireType::Int32, 0).tag(4), "BitConverter.ToInt32");
        assert_eq!(AccessorHint::for_field(WireType::Uint8, 3), AccessorHint::Bytes { length: 3 });
    }

    #[test]
    fn char_array_is_text() {
        let (m, i) = view_of(Field::new("text", "char").array(10).test_value(TestValue::Text("ABCDEFGHI".into())));
        let v = FieldView::derive(&m.fields[i], &m, 6, &BTreeSet::new()).unwrap();
        assert_eq!(v.host_type.to_string(), "byte[]");
        assert_eq!(v.accessor, AccessorHint::Text { length: 10 });
        assert_eq!(v.accessor_tag(), "System.Text.ASCIIEncoding.ASCII.GetString(msg,6,10); //");
        assert_eq!(v.test_literal, "\"ABCDEFGHI\".ToCharArray()");
    }

    #[test]
    fn reserved_word_is_escaped() {
        assert_eq!(escape_identifier("fixed"), "@fixed");
        assert_eq!(escape_identifier("lat"), "lat");
        assert!(matches!(escape_identifier("lat"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_literals() {
        assert_eq!(test_literal(WireType::Float, 0, Some(&TestValue::Float(17.0))), "17.0f");
        assert_eq!(test_literal(WireType::Uint32, 0, Some(&TestValue::Uint(963497464))), "963497464");
        assert_eq!(test_literal(WireType::Char, 0, Some(&TestValue::Text("A".into()))), "(byte)'A'");
        assert_eq!(
            test_literal(WireType::Int16, 3, Some(&TestValue::List(vec![TestValue::Int(1), TestValue::Int(-2), TestValue::Int(3)]))),
            "{ 1, -2, 3 }"
        );
        assert_eq!(test_literal(WireType::Uint8, 2, None), "{ 0, 0 }");
        assert_eq!(test_literal(WireType::Char, 4, Some(&TestValue::Text("a\"b".into()))), "\"a\\\"b\".ToCharArray()");
    }

    #[test]
    fn char_array_list_is_still_text() {
        let codes = TestValue::List(vec![TestValue::Uint(65), TestValue::Int(66), TestValue::Text("C".into())]);
        assert_eq!(test_literal(WireType::Char, 3, Some(&codes)), "\"ABC\".ToCharArray()");
        assert_eq!(test_literal(WireType::Char, 2, Some(&TestValue::List(Vec::new()))), "\"\".ToCharArray()");
    }

    #[test]
    fn description_is_single_line() {
        assert_eq!(field_description("first\r\nsecond\nthird"), "first second third");
    }

    #[test]
    fn unknown_enum_is_an_error() {
        let (m, i) = view_of(Field::new("mode", "uint8_t").with_enum("MAV_MODE"));
        let err = FieldView::derive(&m.fields[i], &m, 0, &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, GenError::UnknownEnum { ref enum_name, .. } if enum_name == "MAV_MODE"));
        let known: BTreeSet<&str> = ["MAV_MODE"].into_iter().collect();
        assert!(FieldView::derive(&m.fields[i], &m, 0, &known).is_ok());
    }

    #[test]
    fn unknown_wire_type_is_an_error() {
        let m = Message {
            id: 1,
            name: "RAW".into(),
            description: String::new(),
            fields: vec![Field::new("x", "uint24_t")],
            wire_order: vec![0],
            crc_extra: 0,
            wire_length: 3,
            wire_min_length: 3,
        };
        let err = FieldView::derive(&m.fields[0], &m, 0, &BTreeSet::new()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown wire type \"uint24_t\" for field x in message RAW");
    }
}
