use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Signing secret for the tenant plane (auth_token / demo_token).
    pub jwt_secret: String,
    /// Signing secret for the admin plane (admin_token). Kept separate so a
    /// leaked tenant secret cannot mint operator tokens.
    pub admin_jwt_secret: String,
    pub bcrypt_cost: u32,
    /// Lifetime of auth_token / admin_token and their session rows.
    pub session_ttl_days: i64,
    /// Lifetime of the demo_token minted from a temporary access grant.
    pub demo_token_ttl_hours: i64,
    /// Set the Secure attribute on issued cookies.
    pub secure_cookies: bool,
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
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("ADMIN_JWT_SECRET") {
            self.security.admin_jwt_secret = v;
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SESSION_TTL_DAYS") {
            self.security.session_ttl_days = v.parse().unwrap_or(self.security.session_ttl_days);
        }
        if let Ok(v) = env::var("DEMO_TOKEN_TTL_HOURS") {
            self.security.demo_token_ttl_hours =
                v.parse().unwrap_or(self.security.demo_token_ttl_hours);
        }
        if let Ok(v) = env::var("SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: "onlytrack-dev-secret".to_string(),
                admin_jwt_secret: "onlytrack-dev-admin-secret".to_string(),
                bcrypt_cost: 12,
                session_ttl_days: 7,
                demo_token_ttl_hours: 24,
                secure_cookies: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                admin_jwt_secret: String::new(),
                bcrypt_cost: 12,
                session_ttl_days: 7,
                demo_token_ttl_hours: 24,
                secure_cookies: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                // Must come from JWT_SECRET / ADMIN_JWT_SECRET; an empty
                // secret fails every token verification.
                jwt_secret: String::new(),
                admin_jwt_secret: String::new(),
                bcrypt_cost: 12,
                session_ttl_days: 7,
                demo_token_ttl_hours: 24,
                secure_cookies: true,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.security.secure_cookies);
        assert_eq!(config.security.session_ttl_days, 7);
        assert_eq!(config.security.bcrypt_cost, 12);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.secure_cookies);
        assert!(config.security.jwt_secret.is_empty());
        assert!(config.security.admin_jwt_secret.is_empty());
    }
}
