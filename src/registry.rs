//! Global message registry: one row per message, ordered by numeric id.
//!
//! The table is the single source for every id-keyed lookup. The four projections
//! (names, lengths, checksum-extra bytes, structure types) are built together with the
//! rows, so lookups never trigger lazy construction.

use crate::error::GenError;
use crate::schema::Message;
use std::collections::BTreeMap;

/// Highest id of the classic one-byte id space.
pub const MAX_CLASSIC_ID: u32 = 255;

/// Name of the structure type emitted for a message.
pub fn struct_type_name(message_name: &str) -> String {
    format!("mavlink_{}_t", message_name.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRow {
    pub id: u32,
    pub name: String,
    pub crc_extra: u8,
    pub min_length: usize,
    pub length: usize,
    pub type_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    rows: Vec<RegistryRow>,
    names: BTreeMap<u32, String>,
    lengths: BTreeMap<u32, usize>,
    crcs: BTreeMap<u32, u8>,
    types: BTreeMap<u32, String>,
}

impl Registry {
    /// Build the registry over `messages`.
    ///
    /// Without the extended id space only ids 0..=255 get rows (higher ids are skipped with a
    /// warning) and the minimum length equals the full length. With it, every message gets a
    /// row. Either way rows ascend by id.
    pub fn build<'a, I>(messages: I, extended_ids: bool) -> Result<Self, GenError>
    where
        I: IntoIterator<Item = &'a Message>,
    {
        let mut by_id: BTreeMap<u32, &Message> = BTreeMap::new();
        for m in messages {
            if let Some(first) = by_id.insert(m.id, m) {
                return Err(GenError::DuplicateMessageId {
                    id: m.id,
                    first: first.name.clone(),
                    second: m.name.clone(),
                });
            }
        }

        let mut registry = Registry::default();
        for (&id, m) in &by_id {
            let row = if extended_ids {
                RegistryRow {
                    id,
                    name: m.name.clone(),
                    crc_extra: m.crc_extra,
                    min_length: m.wire_min_length,
                    length: m.wire_length,
                    type_name: struct_type_name(&m.name),
                }
            } else if id <= MAX_CLASSIC_ID {
                RegistryRow {
                    id,
                    name: m.name.clone(),
                    crc_extra: m.crc_extra,
                    min_length: m.wire_length,
                    length: m.wire_length,
                    type_name: struct_type_name(&m.name),
                }
            } else {
                log::warn!(
                    "message {} has id {} outside the one-byte id space; left out of the registry",
                    m.name,
                    id
                );
                continue;
            };
            registry.push(row);
        }
        Ok(registry)
    }

    fn push(&mut self, row: RegistryRow) {
        self.names.insert(row.id, row.name.clone());
        self.lengths.insert(row.id, row.length);
        self.crcs.insert(row.id, row.crc_extra);
        self.types.insert(row.id, row.type_name.clone());
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[RegistryRow] {
        &self.rows
    }

    pub fn get(&self, id: u32) -> Option<&RegistryRow> {
        self.rows
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn names(&self) -> &BTreeMap<u32, String> {
        &self.names
    }

    pub fn lengths(&self) -> &BTreeMap<u32, usize> {
        &self.lengths
    }

    pub fn crcs(&self) -> &BTreeMap<u32, u8> {
        &self.crcs
    }

    pub fn types(&self) -> &BTreeMap<u32, String> {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Largest wire length among the registered messages.
    pub fn largest_payload(&self) -> usize {
        self.rows.iter().map(|r| r.length).max().unwrap_or(0)
    }
}
