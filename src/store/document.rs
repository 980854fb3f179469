use std::path::PathBuf;

use serde_json::Value;

use crate::store::dataset::{DatasetDocument, Record};
use crate::store::registry::{is_known_collection, new_identifier};
use crate::store::resolver::Dataset;
use crate::store::serializer::WriteSerializer;

/// Typed outcomes of store operations. All are returned to the API layer
/// explicitly; none are retried internally.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown collection type '{0}'")]
    UnknownCollection(String),
    #[error("write access denied")]
    Forbidden,
    #[error("record '{id}' not found in collection '{collection}'")]
    NotFound { collection: String, id: String },
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset file corrupt: {0}")]
    Corrupt(String),
}

/// File-backed document store. Owns read/write access to the dataset files
/// under `data_dir`; every mutation runs under the dataset's exclusive lock
/// and commits via atomic replace, so concurrent writers never lose updates
/// and readers never see a torn file.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    data_dir: PathBuf,
    serializer: WriteSerializer,
}

impl DocumentStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            serializer: WriteSerializer::new(),
        }
    }

    fn file_path(&self, dataset: Dataset) -> Option<PathBuf> {
        dataset.file_name().map(|name| self.data_dir.join(name))
    }

    /// The complete current dataset. The `none` pseudo-dataset and a dataset
    /// whose file does not exist yet both yield the all-empty shape. Reads
    /// never take the write lock: the atomic-rename discipline guarantees the
    /// file is always a fully committed state.
    pub async fn read_all(&self, dataset: Dataset) -> Result<DatasetDocument, StoreError> {
        match self.file_path(dataset) {
            Some(path) => self.load(&path).await,
            None => Ok(DatasetDocument::empty()),
        }
    }

    async fn load(&self, path: &std::path::Path) -> Result<DatasetDocument, StoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(DatasetDocument::empty());
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let doc: DatasetDocument = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?;
        Ok(doc.normalized())
    }

    async fn persist(
        &self,
        path: &std::path::Path,
        doc: &DatasetDocument,
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| StoreError::Corrupt(format!("serialize: {}", e)))?;
        self.serializer.commit(path, &bytes).await?;
        Ok(())
    }

    fn writable_path(
        &self,
        dataset: Dataset,
        collection: &str,
        can_write: bool,
    ) -> Result<PathBuf, StoreError> {
        if !can_write {
            return Err(StoreError::Forbidden);
        }
        if !is_known_collection(collection) {
            return Err(StoreError::UnknownCollection(collection.to_string()));
        }
        // A write permission against the file-less pseudo-dataset cannot be
        // produced by the resolver; treat it as forbidden rather than panic.
        self.file_path(dataset).ok_or(StoreError::Forbidden)
    }

    /// Append a new record to a collection. The identifier is always
    /// store-generated; any client-supplied `id` is discarded.
    pub async fn create(
        &self,
        dataset: Dataset,
        collection: &str,
        fields: Record,
        can_write: bool,
    ) -> Result<Record, StoreError> {
        let path = self.writable_path(dataset, collection, can_write)?;
        let _guard = self.serializer.lock(&path).await;

        let mut doc = self.load(&path).await?;

        let mut id = new_identifier(collection);
        while doc.position_of(collection, &id).is_some() {
            id = new_identifier(collection);
        }

        let mut record = Record::new();
        record.insert("id".to_string(), Value::String(id));
        for (key, value) in fields {
            if key != "id" {
                record.insert(key, value);
            }
        }

        doc.collection_mut(collection)
            .expect("normalized document has every registered collection")
            .push(record.clone());

        self.persist(&path, &doc).await?;
        Ok(record)
    }

    /// Merge the supplied fields into an existing record. Omitted fields keep
    /// their prior values; the identifier is preserved even if supplied.
    pub async fn update(
        &self,
        dataset: Dataset,
        collection: &str,
        id: &str,
        fields: Record,
        can_write: bool,
    ) -> Result<Record, StoreError> {
        let path = self.writable_path(dataset, collection, can_write)?;
        let _guard = self.serializer.lock(&path).await;

        let mut doc = self.load(&path).await?;
        let position = doc
            .position_of(collection, id)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        let records = doc
            .collection_mut(collection)
            .expect("normalized document has every registered collection");
        let record = &mut records[position];
        for (key, value) in fields {
            if key != "id" {
                record.insert(key, value);
            }
        }
        let updated = record.clone();

        self.persist(&path, &doc).await?;
        Ok(updated)
    }

    /// Remove a record from its collection. Deleting an id that is absent
    /// (including a repeat delete) is `NotFound`, never a silent success.
    pub async fn delete(
        &self,
        dataset: Dataset,
        collection: &str,
        id: &str,
        can_write: bool,
    ) -> Result<(), StoreError> {
        let path = self.writable_path(dataset, collection, can_write)?;
        let _guard = self.serializer.lock(&path).await;

        let mut doc = self.load(&path).await?;
        let position = doc
            .position_of(collection, id)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        doc.collection_mut(collection)
            .expect("normalized document has every registered collection")
            .remove(position);

        self.persist(&path, &doc).await
    }
}
