use titulacion_core::prerequisite::EligibilityPolicy;
use titulacion_core::progress::ResubmissionPolicy;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum pool connections (default: `20`).
    pub db_max_connections: u32,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// How a student with no prerequisite rows is classified.
    pub eligibility: EligibilityPolicy,
    /// Whether delivered reports may be submitted again.
    pub resubmission: ResubmissionPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                 |
    /// |--------------------------------|-------------------------|
    /// | `HOST`                         | `0.0.0.0`               |
    /// | `PORT`                         | `3000`                  |
    /// | `CORS_ORIGINS`                 | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                    |
    /// | `DB_MAX_CONNECTIONS`           | `20`                    |
    /// | `EMPTY_PREREQUISITES_ELIGIBLE` | `true`                  |
    /// | `RESUBMISSION_POLICY`          | `allow`                 |
    ///
    /// # Panics
    ///
    /// Panics on any unparseable value so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let db_max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .map(|v| v.parse().expect("DB_MAX_CONNECTIONS must be a valid u32"))
            .unwrap_or(titulacion_db::DEFAULT_MAX_CONNECTIONS);

        let eligibility: EligibilityPolicy = std::env::var("EMPTY_PREREQUISITES_ELIGIBLE")
            .map(|v| {
                v.parse()
                    .unwrap_or_else(|e| panic!("EMPTY_PREREQUISITES_ELIGIBLE: {e}"))
            })
            .unwrap_or_default();

        let resubmission: ResubmissionPolicy = std::env::var("RESUBMISSION_POLICY")
            .map(|v| v.parse().unwrap_or_else(|e| panic!("RESUBMISSION_POLICY: {e}")))
            .unwrap_or_default();

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            db_max_connections,
            jwt,
            eligibility,
            resubmission,
        }
    }
}
