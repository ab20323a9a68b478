//! Case-insensitive lookup from identity key to definition entry.

use std::collections::HashMap;

use log::info;

use crate::{
    definition::{self, EnrichmentEntry, MetadataEntry, SourceDeclaration, TagEntry},
    error::Result,
};

pub type EnrichmentIndex = MetadataIndex<EnrichmentEntry>;
pub type TagIndex = MetadataIndex<TagEntry>;

#[derive(Debug, Clone)]
pub struct MetadataIndex<V> {
    entries: HashMap<String, V>,
}

impl<V> Default for MetadataIndex<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> MetadataIndex<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under the lower-cased `key`, replacing any previous
    /// entry.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key: String = key.into();
        let key = if key.chars().any(char::is_uppercase) {
            key.to_lowercase()
        } else {
            key
        };
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        if key.chars().any(char::is_uppercase) {
            self.entries.get(&key.to_lowercase())
        } else {
            self.entries.get(key)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: MetadataEntry> MetadataIndex<V> {
    /// Reads every source in declaration order into one index. The first
    /// failing source aborts the build.
    pub fn build<S: SourceDeclaration>(sources: &[S]) -> Result<Self> {
        let mut index = Self::new();
        for source in sources {
            let rows = definition::read_source(source, &mut index)?;
            info!(
                "Read {} definition row(s) from {:?} sheet '{}'",
                rows,
                source.book(),
                source.sheet()
            );
        }
        Ok(index)
    }
}
