use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::store::{Role, StoreError, WriteSerializer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub password_hash: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

/// Client-safe view of a user, returned by the auth endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub role: Role,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
        }
    }

    fn verify_password(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_hash
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("username '{0}' already exists")]
    UsernameTaken(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Profile mutation payload for `update_profile`.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// File-backed user accounts, guarded by the same per-file write serializer
/// as the dataset files.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
    serializer: WriteSerializer,
}

impl UserStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join("users.json"),
            serializer: WriteSerializer::new(),
        }
    }

    async fn load(&self) -> Result<Vec<User>, UserStoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e).into()),
        };
        let users = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))?;
        Ok(users)
    }

    async fn persist(&self, users: &[User]) -> Result<(), UserStoreError> {
        let bytes = serde_json::to_vec_pretty(users)
            .map_err(|e| StoreError::Corrupt(format!("serialize users: {}", e)))?;
        self.serializer
            .commit(&self.path, &bytes)
            .await
            .map_err(StoreError::Io)?;
        Ok(())
    }

    /// Create an account. Self-registration always gets the `client` role;
    /// seeding passes admin/demo explicitly. Usernames are stored lowercase
    /// and must be unique.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
        role: Role,
    ) -> Result<User, UserStoreError> {
        let username = username.trim().to_lowercase();
        let _guard = self.serializer.lock(&self.path).await;

        let mut users = self.load().await?;
        if users.iter().any(|u| u.username == username) {
            return Err(UserStoreError::UsernameTaken(username));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let user = User {
            id: format!("user_{}", Uuid::new_v4().simple()),
            username,
            display_name: display_name.to_string(),
            role,
            password_hash: hash_password(&salt, password),
            salt,
            created_at: Utc::now(),
        };

        users.push(user.clone());
        self.persist(&users).await?;
        Ok(user)
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, UserStoreError> {
        let username = username.trim().to_lowercase();
        let users = self.load().await?;

        users
            .into_iter()
            .find(|u| u.username == username)
            .filter(|u| u.verify_password(password))
            .ok_or(UserStoreError::InvalidCredentials)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<User, UserStoreError> {
        let users = self.load().await?;
        users
            .into_iter()
            .find(|u| u.id == id)
            .ok_or(UserStoreError::NotFound)
    }

    /// Apply profile changes. A password change must present the correct
    /// current password; the presence check (400 vs 401) lives in the handler.
    pub async fn update_profile(
        &self,
        id: &str,
        changes: ProfileChanges,
    ) -> Result<User, UserStoreError> {
        let _guard = self.serializer.lock(&self.path).await;

        let mut users = self.load().await?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(UserStoreError::NotFound)?;

        if let Some(display_name) = changes.display_name {
            user.display_name = display_name;
        }

        if let Some(new_password) = changes.new_password {
            let current = changes
                .current_password
                .ok_or(UserStoreError::InvalidCredentials)?;
            if !user.verify_password(&current) {
                return Err(UserStoreError::InvalidCredentials);
            }
            user.salt = Uuid::new_v4().simple().to_string();
            user.password_hash = hash_password(&user.salt, &new_password);
        }

        let updated = user.clone();
        self.persist(&users).await?;
        Ok(updated)
    }

    /// Ensure the default admin and demo accounts exist.
    pub async fn seed_defaults(&self) -> Result<(), UserStoreError> {
        let security = &crate::config::config().security;
        let seeds = [
            (
                security.seed_admin_username.as_str(),
                security.seed_admin_password.as_str(),
                Role::Admin,
            ),
            (
                security.seed_demo_username.as_str(),
                security.seed_demo_password.as_str(),
                Role::Demo,
            ),
        ];

        for (username, password, role) in seeds {
            match self.create_user(username, password, username, role).await {
                Ok(user) => tracing::info!("Seeded {:?} user '{}'", role, user.username),
                Err(UserStoreError::UsernameTaken(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
