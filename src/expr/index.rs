//! Symbol to `(offset, length)` index over the record stream.
//!
//! Serialized as a JSON object `{"SYMBOL": [offset, length], ...}` whose keys
//! appear in write order.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Location of one compressed record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u64, u64)", into = "(u64, u64)")]
pub struct IndexEntry {
    /// Byte offset of the record in the stream
    pub offset: u64,
    /// Compressed length in bytes
    pub length: u64,
}

impl From<(u64, u64)> for IndexEntry {
    fn from((offset, length): (u64, u64)) -> Self {
        Self { offset, length }
    }
}

impl From<IndexEntry> for (u64, u64) {
    fn from(entry: IndexEntry) -> Self {
        (entry.offset, entry.length)
    }
}

/// Ordered map from gene symbol to record location
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionIndex {
    entries: Vec<(String, IndexEntry)>,
    positions: HashMap<String, usize>,
}

impl ExpressionIndex {
    /// Empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol. Returns `false` and leaves the index untouched if the
    /// symbol is already present.
    pub fn insert(&mut self, symbol: impl Into<String>, entry: IndexEntry) -> bool {
        let symbol = symbol.into();
        if self.positions.contains_key(&symbol) {
            return false;
        }
        self.positions.insert(symbol.clone(), self.entries.len());
        self.entries.push((symbol, entry));
        true
    }

    /// Location of a symbol's record
    pub fn get(&self, symbol: &str) -> Option<IndexEntry> {
        self.positions.get(symbol).map(|&i| self.entries[i].1)
    }

    /// True if the symbol is indexed
    pub fn contains(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    /// Entries in write order
    pub fn iter(&self) -> impl Iterator<Item = (&str, IndexEntry)> {
        self.entries.iter().map(|(s, e)| (s.as_str(), *e))
    }

    /// Number of genes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no gene was indexed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ExpressionIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (symbol, entry) in &self.entries {
            map.serialize_entry(symbol, entry)?;
        }
        map.end()
    }
}

struct IndexVisitor;

impl<'de> Visitor<'de> for IndexVisitor {
    type Value = ExpressionIndex;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of gene symbol to [offset, length]")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut index = ExpressionIndex::new();
        while let Some((symbol, entry)) = access.next_entry::<String, IndexEntry>()? {
            index.insert(symbol, entry);
        }
        Ok(index)
    }
}

impl<'de> Deserialize<'de> for ExpressionIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(IndexVisitor)
    }
}
