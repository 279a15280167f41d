/// Configuration management for the API server
///
/// Configuration is read from environment variables; a `.env` file in the
/// working directory is loaded first when present.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `API_CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: `*`)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing, at least 32 characters (required)
/// - `AUTHZ_TRANSITIVE_CHIEFS`: Let chiefs act on every employee below them,
///   not only direct subordinates (default: false)
/// - `RUST_LOG`: Log filter (default: `taskboard_api=debug,tower_http=debug`)
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use taskboard_shared::auth::{authorization::AuthzPolicy, hierarchy::ChiefScope};
use taskboard_shared::db::pool;

/// Minimum length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub authz: AuthzConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any origin
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,
}

/// Authorization configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthzConfig {
    /// Chief authority reaches every level below, not just direct reports
    pub transitive_chiefs: bool,
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("{key} must be a boolean, got '{other}'"),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - A numeric or boolean variable cannot be parsed
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var("API_HOST", "0.0.0.0");
        let api_port = var("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {e}"))?;

        let cors_origins = var("API_CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {e}"))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters long");
        }

        let transitive_chiefs = parse_bool(
            "AUTHZ_TRANSITIVE_CHIEFS",
            &var("AUTHZ_TRANSITIVE_CHIEFS", "false"),
        )?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            authz: AuthzConfig { transitive_chiefs },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Pool settings for the shared database layer
    pub fn pool_config(&self) -> pool::DatabaseConfig {
        pool::DatabaseConfig {
            max_connections: self.database.max_connections,
            ..pool::DatabaseConfig::with_url(&self.database.url)
        }
    }

    /// Authorization policy derived from the `authz` section
    pub fn authz_policy(&self) -> AuthzPolicy {
        AuthzPolicy {
            chief_scope: if self.authz.transitive_chiefs {
                ChiefScope::Transitive
            } else {
                ChiefScope::Direct
            },
        }
    }

    /// True if any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database.max_connections, 10);
        assert!(config.allows_any_origin());
        assert!(!config.authz.transitive_chiefs);
        assert_eq!(config.authz_policy().chief_scope, ChiefScope::Direct);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "9000"),
            ("API_CORS_ORIGINS", "https://a.example, https://b.example"),
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
            ("JWT_SECRET", SECRET),
            ("AUTHZ_TRANSITIVE_CHIEFS", "true"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(!config.allows_any_origin());
        assert_eq!(config.authz_policy().chief_scope, ChiefScope::Transitive);

        let pool = config.pool_config();
        assert_eq!(pool.url, "postgresql://localhost/test");
        assert_eq!(pool.max_connections, 25);
    }

    #[test]
    fn test_required_variables() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "postgresql://localhost/test")]).is_err());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let err = load(&[("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", "short")])
            .unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = [("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", SECRET)];

        let mut bad_port = base.to_vec();
        bad_port.push(("API_PORT", "eighty"));
        assert!(load(&bad_port).is_err());

        let mut bad_bool = base.to_vec();
        bad_bool.push(("AUTHZ_TRANSITIVE_CHIEFS", "maybe"));
        assert!(load(&bad_bool).is_err());
    }
}
