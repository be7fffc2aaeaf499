use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SurveyError};
use crate::geo::ReferenceCell;

/// Environment variable holding the PostgreSQL connection string
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Environment variable holding the optional export bearer token
pub const ADMIN_TOKEN_VAR: &str = "SURVEY_ADMIN_TOKEN";

/// Load environment variables from .env files
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.parksurvey/.env
///
/// dotenvy never overwrites variables that are already present.
pub fn load_dotenv() {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded_from.push(format!("current directory ({})", path.display()));
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(_) => loaded_from.push(format!("~/.parksurvey/.env ({})", env_file.display())),
                Err(e) => debug!("Failed to load {}: {}", env_file.display(), e),
            }
        }
    }

    if loaded_from.is_empty() {
        info!("Using environment variables only (no .env file found)");
    } else {
        info!("Loaded configuration from: {}", loaded_from.join(", "));
    }
}

/// Get the parksurvey config directory path (~/.parksurvey)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".parksurvey"))
}

// ============================================================================
// TOML Configuration
// ============================================================================

/// Optional tuning file (`parksurvey.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub pool: PoolSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

/// Connection pool bounds and timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Idle connections kept open
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Hard cap on concurrent checkouts
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a checkout waits for a free connection before failing
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,

    /// Server-side `statement_timeout` applied to every connection
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,
}

impl PoolSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_millis(self.statement_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(SurveyError::configuration(
                "pool.max_connections must be at least 1",
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(SurveyError::configuration(format!(
                "pool.min_connections ({}) exceeds pool.max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
            statement_timeout_ms: default_statement_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

// Default value functions for serde
fn default_min_connections() -> u32 {
    5
}

fn default_max_connections() -> u32 {
    30
}

fn default_acquire_timeout_ms() -> u64 {
    5_000
}

fn default_statement_timeout_ms() -> u64 {
    10_000
}

fn default_bind() -> String {
    "127.0.0.1:8501".to_string()
}

impl FileConfig {
    /// Load `./parksurvey.toml`, falling back to `~/.parksurvey/config.toml`,
    /// then built-in defaults.
    ///
    /// A file that exists but does not parse is a configuration error.
    pub fn load() -> Result<Self> {
        let candidates = std::iter::once(PathBuf::from("parksurvey.toml"))
            .chain(config_dir().map(|d| d.join("config.toml")));

        for path in candidates {
            if path.exists() {
                return Self::from_path(&path);
            }
        }

        debug!("No parksurvey.toml found, using defaults");
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SurveyError::configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: FileConfig = toml::from_str(&contents).map_err(|e| {
            SurveyError::configuration(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.pool.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Everything the service needs at startup, validated.
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    pub database_url: String,
    pub reference: ReferenceCell,
    pub admin_token: Option<String>,
    pub pool: PoolSettings,
    pub server: ServerSettings,
}

impl SurveyConfig {
    /// Build the startup config from the process environment and the
    /// optional TOML file. Missing or malformed required values are fatal.
    pub fn load() -> Result<Self> {
        let file = FileConfig::load()?;
        Self::from_parts(
            std::env::var(DATABASE_URL_VAR).ok(),
            std::env::var(ReferenceCell::ENV_VAR).ok(),
            std::env::var(ADMIN_TOKEN_VAR).ok(),
            file,
        )
    }

    /// Validate raw values. Split out from [`Self::load`] so it can be
    /// exercised without touching the process environment.
    pub fn from_parts(
        database_url: Option<String>,
        reference: Option<String>,
        admin_token: Option<String>,
        file: FileConfig,
    ) -> Result<Self> {
        let database_url = database_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                SurveyError::configuration(format!("{DATABASE_URL_VAR} environment variable not set"))
            })?;

        if !(database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")) {
            return Err(SurveyError::configuration(format!(
                "{DATABASE_URL_VAR} must be a postgres:// connection string"
            )));
        }

        let reference = reference.ok_or_else(|| {
            SurveyError::configuration(format!(
                "{} environment variable not set",
                ReferenceCell::ENV_VAR
            ))
        })?;
        let reference = ReferenceCell::parse(&reference)?;

        let admin_token = admin_token
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty());
        if admin_token.is_none() {
            warn!("{ADMIN_TOKEN_VAR} not set, CSV export is unauthenticated");
        }

        file.pool.validate()?;

        Ok(Self {
            database_url,
            reference,
            admin_token,
            pool: file.pool,
            server: file.server,
        })
    }
}
