use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Signing secret used when JWT_SECRET is not provided. Kept for compatibility
/// with tokens issued by earlier deployments; production refuses to start with it.
pub const FALLBACK_JWT_SECRET: &str = "clavesupersecreta";

/// Cost range bcrypt accepts
const BCRYPT_MIN_COST: u32 = 4;
const BCRYPT_MAX_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing {0}. Check your .env file.")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("JWT_SECRET must be set in production")]
    InsecureSecret,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub store: StoreConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    /// Hosted PostgREST table service
    Rest,
    /// In-process tables, for local development and tests
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Base URL of the hosted project (SUPABASE_URL)
    pub url: Option<String>,
    /// Service access key (SUPABASE_KEY)
    #[serde(skip_serializing)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_minutes: i64,
    pub bcrypt_cost: u32,
    /// Gate the resource routes behind the bearer token check
    pub require_auth: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Store
        if let Ok(v) = env::var("STORE_BACKEND") {
            self.store.backend = match v.trim().to_ascii_lowercase().as_str() {
                "rest" | "supabase" => StoreBackend::Rest,
                "memory" => StoreBackend::Memory,
                _ => return Err(ConfigError::Invalid { name: "STORE_BACKEND", value: v }),
            };
        }
        self.store.url = non_empty_var("SUPABASE_URL");
        self.store.key = non_empty_var("SUPABASE_KEY");

        // API
        if let Some(v) = non_empty_var("HOST") {
            self.api.host = v;
        }
        if let Some(v) = non_empty_var("GAMEDATA_API_PORT").or_else(|| non_empty_var("PORT")) {
            self.api.port = v
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value: v })?;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = non_empty_var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_MINUTES") {
            self.security.jwt_expiry_minutes = v.parse().unwrap_or(self.security.jwt_expiry_minutes);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_REQUIRE_AUTH") {
            self.security.require_auth = v.parse().unwrap_or(self.security.require_auth);
        }

        Ok(self)
    }

    /// Fails when the selected backend lacks its connection settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Rest {
            if self.store.url.is_none() {
                return Err(ConfigError::Missing("SUPABASE_URL"));
            }
            if self.store.key.is_none() {
                return Err(ConfigError::Missing("SUPABASE_KEY"));
            }
        }
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                value: self.security.bcrypt_cost.to_string(),
            });
        }
        if self.environment == Environment::Production && self.uses_fallback_secret() {
            return Err(ConfigError::InsecureSecret);
        }
        Ok(())
    }

    pub fn uses_fallback_secret(&self) -> bool {
        self.security.jwt_secret == FALLBACK_JWT_SECRET
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            store: StoreConfig {
                backend: StoreBackend::Rest,
                url: None,
                key: None,
            },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: FALLBACK_JWT_SECRET.to_string(),
                jwt_expiry_minutes: 60,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                require_auth: false,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.api.enable_request_logging = false;
        config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
