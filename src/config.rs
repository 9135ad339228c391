use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL host
    #[serde(default = "default_db_host")]
    pub db_host: String,

    /// PostgreSQL port
    #[serde(default = "default_db_port")]
    pub db_port: u16,

    /// PostgreSQL database name
    #[serde(default = "default_db_name")]
    pub db_name: String,

    /// PostgreSQL user
    #[serde(default = "default_db_user")]
    pub db_user: String,

    /// PostgreSQL password
    #[serde(default = "default_db_password")]
    pub db_password: String,

    /// Upper bound on pooled database connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Table holding titles, their embeddings and full-text vectors
    #[serde(default = "default_table")]
    pub table: String,

    /// Embedding model identifier sent to the embedding server
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// Base URL of the embedding server
    #[serde(default = "default_embedding_url")]
    pub embedding_url: String,

    /// HTTP listen address (`SERVER_HOST`)
    #[serde(default = "default_server_host")]
    pub server_host: String,

    /// HTTP listen port (`SERVER_PORT`); a bare `PORT` is not read
    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "titles".to_string()
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_password() -> String {
    "postgres".to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_table() -> String {
    "titles".to_string()
}

fn default_model_path() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_embedding_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would be unsafe to use at runtime.
    ///
    /// The table name is spliced into SQL text, so it must be a plain identifier
    /// (optionally schema-qualified).
    pub fn validate(&self) -> anyhow::Result<()> {
        if !is_sql_identifier(&self.table) {
            anyhow::bail!("TABLE must be a plain SQL identifier, got {:?}", self.table);
        }
        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        Ok(())
    }

    /// Connection options for the title database
    pub fn pg_connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .database(&self.db_name)
            .username(&self.db_user)
            .password(&self.db_password)
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn is_sql_identifier(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
