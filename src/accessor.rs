//! Execute accessor hints against raw payload bytes.
//!
//! The generated C# reads fields with the token each [`AccessorHint`] renders to. This module
//! performs the same reads in Rust so the derived layout can be checked against real payloads:
//! [`AccessorHint::read`] extracts one field at its wire offset and [`decode_payload`] walks a
//! whole message in wire order.

use crate::field::{AccessorHint, WireType};
use crate::message::MessageView;
use crate::value::Value;
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use std::collections::BTreeMap;
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Field at offset {offset} needs {len} bytes, payload has {available}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },
    #[error("Payload of {actual} bytes exceeds wire length {expected}")]
    Oversized { expected: usize, actual: usize },
}

impl AccessorHint {
    /// Read the field this hint describes from `buf` at `offset`.
    pub fn read(&self, buf: &[u8], offset: usize, endianness: Endianness) -> Result<Value, DecodeError> {
        let len = self.byte_len();
        let bytes = self.slice(buf, offset).ok_or(DecodeError::OutOfBounds {
            offset,
            len,
            available: buf.len(),
        })?;
        let mut r = Cursor::new(bytes);
        match self {
            AccessorHint::Byte(t) => Ok(if t.is_signed() {
                Value::I8(r.read_i8()?)
            } else {
                Value::U8(r.read_u8()?)
            }),
            AccessorHint::Integer(t) | AccessorHint::Float(t) => read_scalar(&mut r, *t, endianness),
            AccessorHint::Bytes { .. } => Ok(Value::Bytes(bytes.to_vec())),
            AccessorHint::Elements { element, length } => (0..*length)
                .map(|_| read_scalar(&mut r, *element, endianness))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            AccessorHint::Text { .. } => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                Ok(Value::Text(String::from_utf8_lossy(&bytes[..end]).into_owned()))
            }
        }
    }

    /// Borrow the raw bytes of the field without decoding.
    pub fn slice<'b>(&self, buf: &'b [u8], offset: usize) -> Option<&'b [u8]> {
        let end = offset.checked_add(self.byte_len())?;
        buf.get(offset..end)
    }
}

fn read_scalar(r: &mut Cursor<&[u8]>, t: WireType, endianness: Endianness) -> Result<Value, DecodeError> {
    match endianness {
        Endianness::Big => read_scalar_as::<BigEndian>(r, t),
        Endianness::Little => read_scalar_as::<LittleEndian>(r, t),
    }
}

fn read_scalar_as<B: ByteOrder>(r: &mut Cursor<&[u8]>, t: WireType) -> Result<Value, DecodeError> {
    Ok(match t {
        WireType::Char | WireType::Uint8 => Value::U8(r.read_u8()?),
        WireType::Int8 => Value::I8(r.read_i8()?),
        WireType::Uint16 => Value::U16(r.read_u16::<B>()?),
        WireType::Int16 => Value::I16(r.read_i16::<B>()?),
        WireType::Uint32 => Value::U32(r.read_u32::<B>()?),
        WireType::Int32 => Value::I32(r.read_i32::<B>()?),
        WireType::Uint64 => Value::U64(r.read_u64::<B>()?),
        WireType::Int64 => Value::I64(r.read_i64::<B>()?),
        WireType::Float => Value::Float(r.read_f32::<B>()?),
        WireType::Double => Value::Double(r.read_f64::<B>()?),
    })
}

/// Decode a message payload into field values keyed by field name.
///
/// Payloads shorter than the wire length are zero-extended (protocol 2.0 truncates trailing
/// zero bytes on send).
pub fn decode_payload(
    view: &MessageView<'_>,
    payload: &[u8],
    endianness: Endianness,
) -> Result<BTreeMap<String, Value>, DecodeError> {
    let length = view.size();
    if payload.len() > length {
        return Err(DecodeError::Oversized {
            expected: length,
            actual: payload.len(),
        });
    }
    let mut buf = payload.to_vec();
    buf.resize(length, 0);

    let mut out = BTreeMap::new();
    for f in view.wire_fields() {
        let v = f.accessor.read(&buf, f.offset, endianness)?;
        out.insert(f.field.name.clone(), v);
    }
    Ok(out)
}
