use serde::{Deserialize, Serialize};

/// User role carried in JWT claims. A closed enum: tokens carrying any other
/// role string fail deserialization at the auth boundary instead of silently
/// mapping to a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Demo,
    Client,
}

/// Resolved caller context produced by the auth middleware.
#[derive(Debug, Clone)]
pub enum Identity {
    Anonymous,
    User { id: String, role: Role },
}

/// One of the physical datasets (or the empty pseudo-dataset for clients).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Primary,
    Demo,
    None,
}

impl Dataset {
    /// File name within the data directory, if this dataset is backed by one.
    pub fn file_name(self) -> Option<&'static str> {
        match self {
            Dataset::Primary => Some("db.json"),
            Dataset::Demo => Some("demo_db.json"),
            Dataset::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSelection {
    pub dataset: Dataset,
    pub can_write: bool,
}

/// Map an identity to its dataset and write permission. Pure and total over
/// the identity classes; recomputed per request, never cached.
pub fn resolve(identity: &Identity) -> DatasetSelection {
    match identity {
        Identity::User { role: Role::Admin, .. } => DatasetSelection {
            dataset: Dataset::Primary,
            can_write: true,
        },
        Identity::User { role: Role::Demo, .. } => DatasetSelection {
            dataset: Dataset::Demo,
            can_write: true,
        },
        Identity::Anonymous => DatasetSelection {
            dataset: Dataset::Demo,
            can_write: false,
        },
        Identity::User { role: Role::Client, .. } => DatasetSelection {
            dataset: Dataset::None,
            can_write: false,
        },
    }
}
