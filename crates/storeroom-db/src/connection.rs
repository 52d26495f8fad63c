//! SurrealDB connection management.

use std::env;

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`). Empty means the remote
    /// store was never configured.
    pub url: String,
    /// SurrealDB namespace.
    pub namespace: String,
    /// SurrealDB database name.
    pub database: String,
    /// Root username for authentication.
    pub username: String,
    /// Root password for authentication.
    pub password: String,
    /// Newest audit entries kept in each log snapshot (`None` = all).
    pub log_limit: Option<usize>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "storeroom".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
            log_limit: None,
        }
    }
}

impl DbConfig {
    /// Read the configuration from `STOREROOM_DB_*` and
    /// `STOREROOM_LOG_LIMIT` environment variables.
    ///
    /// `STOREROOM_DB_URL` has no fallback: when it is unset the
    /// returned config reports [`DbConfig::is_configured`] as false.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env::var("STOREROOM_DB_URL").unwrap_or_default(),
            namespace: env::var("STOREROOM_DB_NS").unwrap_or(defaults.namespace),
            database: env::var("STOREROOM_DB_NAME").unwrap_or(defaults.database),
            username: env::var("STOREROOM_DB_USER").unwrap_or(defaults.username),
            password: env::var("STOREROOM_DB_PASS").unwrap_or(defaults.password),
            log_limit: env::var("STOREROOM_LOG_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
            && !self.namespace.trim().is_empty()
            && !self.database.trim().is_empty()
    }
}

/// Manages a connection to SurrealDB.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect to SurrealDB using the provided configuration.
    ///
    /// Authenticates as root, selects the configured namespace and
    /// database, and returns a ready-to-use manager.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Successfully connected to SurrealDB");

        Ok(Self { db })
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }

    pub fn into_client(self) -> Surreal<Client> {
        self.db
    }
}
