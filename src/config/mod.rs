use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string; empty when DATABASE_URL is not set
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
    /// Upper bound applied to `limit` on list endpoints
    pub max_list_limit: i64,
    pub log_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_expiry_hours: u64,
    pub refresh_expiry_days: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Base URL that stored image references are resolved against
    pub base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Some(port) = env::var("API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_MAX_LIST_LIMIT") {
            self.api.max_list_limit = v.parse().unwrap_or(self.api.max_list_limit);
        }
        if let Ok(v) = env::var("RUST_LOG") {
            self.api.log_filter = v;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_REFRESH_EXPIRY_DAYS") {
            self.security.refresh_expiry_days = v.parse().unwrap_or(self.security.refresh_expiry_days);
        }

        if let Ok(v) = env::var("MEDIA_BASE_URL") {
            self.media.base_url = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 8000,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                max_list_limit: 1000,
                log_filter: "plantation_registry=debug,tower_http=debug,info".to_string(),
            },
            security: SecurityConfig {
                // Development only; staging and production must set JWT_SECRET
                jwt_secret: "development-secret-change-me".to_string(),
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_expiry_hours: 24,
                refresh_expiry_days: 30,
            },
            media: MediaConfig {
                base_url: "http://localhost:8000/media/".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 8000,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                max_list_limit: 500,
                log_filter: "plantation_registry=info,tower_http=info,warn".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_expiry_hours: 12,
                refresh_expiry_days: 14,
            },
            media: MediaConfig {
                base_url: "https://staging.example.com/media/".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                port: 8000,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                max_list_limit: 500,
                log_filter: "plantation_registry=info,warn".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_expiry_hours: 4,
                refresh_expiry_days: 7,
            },
            media: MediaConfig {
                base_url: "https://app.example.com/media/".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.database.run_migrations);
        assert_eq!(config.api.max_list_limit, 1000);
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.database.run_migrations);
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.security.jwt_expiry_hours, 4);
    }

    #[test]
    fn secret_is_not_serialized() {
        let config = AppConfig::development();
        let value = serde_json::to_value(&config.security).unwrap();
        assert!(value.get("jwt_secret").is_none());
    }
}
