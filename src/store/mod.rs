pub mod dataset;
pub mod document;
pub mod registry;
pub mod resolver;
pub mod serializer;

pub use dataset::{DatasetDocument, Record};
pub use document::{DocumentStore, StoreError};
pub use registry::{is_known_collection, new_identifier, COLLECTIONS};
pub use resolver::{resolve, Dataset, DatasetSelection, Identity, Role};
pub use serializer::WriteSerializer;
