use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub mysql: MysqlConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_expiration_minutes: i64,
    pub refresh_expiration_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MysqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory uploaded avatars and media files are written under.
    pub root: PathBuf,
    /// URL prefix the stored files are served from.
    pub base_url: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
}

/// Reads `key`, falling back to `default` when unset.
fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Reads and parses `key`; unset or unparsable values fall back to `default`.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid value {:?} for {}", raw, key);
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv::dotenv().ok();

        let secret = env_or("JWT_SECRET", "your-secret-key-change-this");
        if secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        Ok(Config {
            server: ServerConfig {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: env_parse("SERVER_PORT", 8080),
            },
            jwt: JwtConfig {
                secret,
                access_expiration_minutes: env_parse("JWT_ACCESS_EXPIRATION_MINUTES", 5),
                refresh_expiration_hours: env_parse("JWT_REFRESH_EXPIRATION_HOURS", 24),
            },
            mysql: MysqlConfig {
                host: env_or("MYSQL_HOST", "localhost"),
                port: env_parse("MYSQL_PORT", 3306),
                user: env_or("MYSQL_USER", "root"),
                password: env_or("MYSQL_PASSWORD", "password"),
                database: env_or("MYSQL_DATABASE", "pawlser"),
            },
            storage: StorageConfig {
                root: PathBuf::from(env_or("STORAGE_ROOT", "./files")),
                base_url: env_or("STORAGE_BASE_URL", "/files"),
                max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", 50 * 1024 * 1024),
            },
            auth: AuthConfig {
                bcrypt_cost: env_parse("BCRYPT_COST", bcrypt::DEFAULT_COST),
            },
        })
    }

    /// Full connection string. `DATABASE_URL` wins over the individual MySQL
    /// settings so a SQLite file can be used for local runs.
    pub fn database_url(&self) -> String {
        if let Ok(url) = env::var("DATABASE_URL") {
            return url;
        }
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.mysql.user,
            self.mysql.password,
            self.mysql.host,
            self.mysql.port,
            self.mysql.database
        )
    }
}
