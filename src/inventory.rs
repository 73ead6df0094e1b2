//! Inventory Codec
//!
//! The inventory is the flat `key=value` file exchanged with the installer.
//! It is written into the working directory as seed input before the run
//! and read back as the result state after a successful run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Separator between inventory entries
pub const LINE_SEPARATOR: char = '\n';

/// Separator between an entry's key and value
pub const VALUE_SEPARATOR: char = '=';

/// Default name of the inventory file inside the working directory
pub const DEFAULT_INVENTORY_FILE: &str = "hosts.txt";

/// Mapping of inventory keys to values
///
/// Only bulk replacement is offered; the installer owns the individual entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    values: HashMap<String, String>,
}

impl Inventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an inventory from an existing mapping
    pub fn from_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Replace every entry at once
    pub fn replace(&mut self, values: HashMap<String, String>) {
        self.values = values;
    }

    /// All entries
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Consume the inventory, returning its mapping
    pub fn into_values(self) -> HashMap<String, String> {
        self.values
    }

    /// Look up a single value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialize to one `key=value` line per entry, each newline-terminated
    pub fn serialize(&self) -> String {
        let mut text = String::new();
        for (key, value) in &self.values {
            text.push_str(key);
            text.push(VALUE_SEPARATOR);
            text.push_str(value);
            text.push(LINE_SEPARATOR);
        }
        text
    }

    /// Parse inventory text
    ///
    /// Lines without `=` (blank lines, comments) are skipped. Each remaining
    /// line is split on its first `=`; later duplicates win.
    pub fn deserialize(text: &str) -> Self {
        let values = text
            .split(LINE_SEPARATOR)
            .filter_map(|line| line.split_once(VALUE_SEPARATOR))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        Self { values }
    }

    /// Read and parse an inventory file
    ///
    /// Fails only when the file cannot be read; malformed lines are ignored.
    pub fn read_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::InventoryReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let inventory = Self::deserialize(&content);
        debug!(
            "Read {} inventory entries from {}",
            inventory.len(),
            path.display()
        );
        Ok(inventory)
    }

    /// Serialize and write the inventory to `path`
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.serialize()).map_err(|e| Error::InventoryWriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!("Wrote {} inventory entries to {}", self.len(), path.display());
        Ok(())
    }

    /// First entry that cannot survive the line format, with the reason
    pub fn find_unrepresentable(&self) -> Option<(&str, &'static str)> {
        self.values.iter().find_map(|(key, value)| {
            let reason = if key.is_empty() {
                "key is empty"
            } else if key.contains(VALUE_SEPARATOR) {
                "key contains '='"
            } else if key.contains(LINE_SEPARATOR) {
                "key contains a line break"
            } else if value.contains(LINE_SEPARATOR) {
                "value contains a line break"
            } else {
                return None;
            };
            Some((key.as_str(), reason))
        })
    }
}

impl<K, V> FromIterator<(K, V)> for Inventory
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for Inventory {
    fn from(values: HashMap<String, String>) -> Self {
        Self::from_values(values)
    }
}
