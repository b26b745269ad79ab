//! Enumeration sanitization: single-line descriptions and identifier-safe member names.

use crate::error::GenError;
use crate::schema::{EnumEntry, Enumeration};
use std::collections::HashMap;

/// Replace every line break with a space.
pub fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

/// Member name for `entry_name` inside enumeration `enum_name`.
///
/// The leading `<EnumName>_` prefix is stripped (repeatedly, so the result never starts with
/// it) and a name starting with a digit gets a `_` prefix. Applying this to its own output
/// returns the output unchanged.
///
/// Only the enumeration's own prefix goes: `MAV_CMD_NAV_WAYPOINT` becomes `NAV_WAYPOINT`, not
/// the `WAYPOINT` that older C# output used for the first dialect's commands.
pub fn sanitize_entry_name(enum_name: &str, entry_name: &str) -> String {
    let prefix = format!("{}_", enum_name);
    let mut name = entry_name;
    while let Some(rest) = name.strip_prefix(prefix.as_str()) {
        if rest.is_empty() {
            break;
        }
        name = rest;
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", name)
    } else {
        name.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct EntryView<'a> {
    pub entry: &'a EnumEntry,
    pub identifier: String,
    pub description: String,
    /// Parameter descriptions, each on one line.
    pub params: Vec<String>,
}

impl<'a> EntryView<'a> {
    pub fn value(&self) -> i64 {
        self.entry.value
    }
}

#[derive(Debug, Clone)]
pub struct EnumView<'a> {
    pub enumeration: &'a Enumeration,
    pub description: String,
    pub entries: Vec<EntryView<'a>>,
}

impl<'a> EnumView<'a> {
    pub fn derive(enumeration: &'a Enumeration) -> Result<Self, GenError> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        let mut entries = Vec::with_capacity(enumeration.entries.len());
        for entry in &enumeration.entries {
            let identifier = sanitize_entry_name(&enumeration.name, &entry.name);
            if let Some(first) = seen.insert(identifier.clone(), &entry.name) {
                return Err(GenError::EntryCollision {
                    enumeration: enumeration.name.clone(),
                    identifier,
                    first: first.to_string(),
                    second: entry.name.clone(),
                });
            }
            entries.push(EntryView {
                entry,
                identifier,
                description: single_line(&entry.description),
                params: entry.params.iter().map(|p| single_line(&p.description)).collect(),
            });
        }
        log::debug!("enum {}: {} entries", enumeration.name, entries.len());
        Ok(EnumView {
            enumeration,
            description: single_line(&enumeration.description),
            entries,
        })
    }

    pub fn name(&self) -> &str {
        &self.enumeration.name
    }

    /// Explicit C# underlying type, needed only when a value falls outside `int`.
    pub fn underlying_type(&self) -> Option<&'static str> {
        let values = || self.entries.iter().map(EntryView::value);
        let min = values().min().unwrap_or(0);
        let max = values().max().unwrap_or(0);
        if min >= i64::from(i32::MIN) && max <= i64::from(i32::MAX) {
            None
        } else if min >= 0 && max <= i64::from(u32::MAX) {
            Some("uint")
        } else {
            Some("long")
        }
    }
}
