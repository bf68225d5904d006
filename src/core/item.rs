//! Work item payloads
//!
//! An [`Item`] is the unit of data that flows from producers to consumers: an
//! opaque mapping of string keys to JSON values. The processor never inspects
//! the contents; items only need to be cloneable and sendable across threads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// An opaque key-value payload carried through the work queue
///
/// Keys are unique strings; values are arbitrary JSON values. Iteration order
/// is unspecified and irrelevant to the processor.
///
/// # Example
///
/// ```rust
/// use queue_processor::Item;
///
/// let mut item = Item::new();
/// item.insert("host", "db-01");
/// item.insert("attempt", 3);
///
/// assert_eq!(item.get("host"), Some(&serde_json::json!("db-01")));
/// assert_eq!(item.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item {
    fields: HashMap<String, Value>,
}

impl Item {
    /// Create a new empty item
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Insert a field, returning the previous value for that key if any
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Get a field by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the item has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over the fields in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Consume the item, returning the underlying map
    pub fn into_inner(self) -> HashMap<String, Value> {
        self.fields
    }
}

impl From<HashMap<String, Value>> for Item {
    fn from(fields: HashMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl<K, V> FromIterator<(K, V)> for Item
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
