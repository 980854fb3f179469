use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::store::registry::COLLECTIONS;

/// A record is an opaque, order-preserving field mapping. The store only
/// interprets the `id` field; everything else passes through verbatim.
pub type Record = serde_json::Map<String, Value>;

/// One dataset's full document: every registered collection name mapped to
/// its ordered record sequence. Absent collections are normalized to empty
/// arrays so the key set is identical across datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDocument {
    #[serde(flatten)]
    collections: BTreeMap<String, Vec<Record>>,
}

impl DatasetDocument {
    /// All registered collections, all empty.
    pub fn empty() -> Self {
        let collections = COLLECTIONS
            .iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        Self { collections }
    }

    /// Ensure every registered collection key is present.
    pub fn normalized(mut self) -> Self {
        for name in COLLECTIONS {
            self.collections.entry(name.to_string()).or_default();
        }
        self
    }

    pub fn collection(&self, name: &str) -> Option<&Vec<Record>> {
        self.collections.get(name)
    }

    pub fn collection_mut(&mut self, name: &str) -> Option<&mut Vec<Record>> {
        self.collections.get_mut(name)
    }

    /// Position of a record within a collection, by its `id` field.
    pub fn position_of(&self, collection: &str, id: &str) -> Option<usize> {
        self.collection(collection)?
            .iter()
            .position(|record| record.get("id").and_then(Value::as_str) == Some(id))
    }
}

impl Default for DatasetDocument {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_document_has_all_collections() {
        let doc = DatasetDocument::empty();
        for name in COLLECTIONS {
            assert_eq!(doc.collection(name).map(Vec::len), Some(0), "{}", name);
        }
    }

    #[test]
    fn normalization_fills_missing_collections() {
        let sparse: DatasetDocument =
            serde_json::from_value(json!({ "leaderShortcuts": [{"id": "a"}] })).unwrap();
        let doc = sparse.normalized();

        assert_eq!(doc.collection("leaderShortcuts").unwrap().len(), 1);
        for name in COLLECTIONS {
            assert!(doc.collection(name).is_some(), "{} missing", name);
        }
    }

    #[test]
    fn serialization_keeps_all_keys() {
        let value = serde_json::to_value(DatasetDocument::empty()).unwrap();
        let keys = value.as_object().unwrap();
        assert_eq!(keys.len(), COLLECTIONS.len());
        for name in COLLECTIONS {
            assert!(keys[*name].is_array());
        }
    }

    #[test]
    fn position_of_matches_string_ids() {
        let mut doc = DatasetDocument::empty();
        let record: Record = serde_json::from_value(json!({"id": "leader_1", "name": "x"})).unwrap();
        doc.collection_mut("leaderShortcuts").unwrap().push(record);

        assert_eq!(doc.position_of("leaderShortcuts", "leader_1"), Some(0));
        assert_eq!(doc.position_of("leaderShortcuts", "leader_2"), None);
        assert_eq!(doc.position_of("systemShortcuts", "leader_1"), None);
    }
}
