use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default)]
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Log every SQL statement through sqlx.
    pub sqlx_logging: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens.
    pub token_ttl_hours: i64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// `fs_files` / `fs_chunks` tables in the main database.
    #[default]
    Database,
    /// Process-local maps. Contents are lost on restart.
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackendKind,
    /// Chunk size in bytes for newly uploaded files.
    pub chunk_size: u32,
    /// Largest single file accepted by an upload.
    pub max_file_size: u64,
    /// Largest multipart request body for event create/update.
    pub max_request_size: usize,
}

/// Admin account created on startup when no admin exists yet.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BootstrapConfig {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.sqlx_logging", false)?
            .set_default("auth.token_ttl_hours", 24)?
            .set_default(
                "storage.chunk_size",
                i64::from(common::storage::DEFAULT_CHUNK_SIZE),
            )?
            .set_default("storage.max_file_size", 16 * 1024 * 1024)?
            .set_default("storage.max_request_size", 50 * 1024 * 1024)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., CLUBHOUSE__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("CLUBHOUSE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
