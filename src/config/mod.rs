use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_cors: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding db.json, demo_db.json and users.json
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub seed_admin_username: String,
    pub seed_admin_password: String,
    pub seed_demo_username: String,
    pub seed_demo_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub timeout_secs: u64,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_ENABLE_CORS") {
            self.server.enable_cors = v.parse().unwrap_or(self.server.enable_cors);
        }
        if let Ok(v) = env::var("SERVER_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        if let Ok(v) = env::var("SHORTCUTS_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }

        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SEED_ADMIN_USERNAME") {
            self.security.seed_admin_username = v;
        }
        if let Ok(v) = env::var("SEED_ADMIN_PASSWORD") {
            self.security.seed_admin_password = v;
        }
        if let Ok(v) = env::var("SEED_DEMO_USERNAME") {
            self.security.seed_demo_username = v;
        }
        if let Ok(v) = env::var("SEED_DEMO_PASSWORD") {
            self.security.seed_demo_password = v;
        }

        if let Ok(v) = env::var("PROXY_TIMEOUT_SECS") {
            self.proxy.timeout_secs = v.parse().unwrap_or(self.proxy.timeout_secs);
        }
        if let Ok(v) = env::var("PROXY_MAX_BODY_BYTES") {
            self.proxy.max_body_bytes = v.parse().unwrap_or(self.proxy.max_body_bytes);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3001,
                enable_cors: true,
                max_request_size_bytes: 100 * 1024 * 1024, // image payloads can be large
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("data"),
            },
            security: SecurityConfig {
                jwt_secret: "shortcuts_manager_secret_key_2024".to_string(),
                jwt_expiry_hours: 24 * 7,
                seed_admin_username: "renshu".to_string(),
                seed_admin_password: "renshu123".to_string(),
                seed_demo_username: "gabby_demo".to_string(),
                seed_demo_password: "gabby123".to_string(),
            },
            proxy: ProxyConfig {
                timeout_secs: 10,
                max_body_bytes: 20 * 1024 * 1024,
            },
        }
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.server.max_request_size_bytes = 25 * 1024 * 1024;
        config.security.jwt_expiry_hours = 24;
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
