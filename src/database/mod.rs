use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Connection, PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::config::DbConfig;

#[derive(Clone, Debug)]
pub struct DbManager {
    db: PgPool,
}

impl DbManager {
    pub async fn init(db_config: &DbConfig) -> Result<Self> {
        info!("{:<12} - Initializing the DB pool", "init_db");
        // NOTE: Tests sometimes fail if there is more than 1 max connection. This fixes it.
        let max_cons = if cfg!(test) { 1 } else { 5 };

        let con_opts = db_config.connection_options();

        let db_pool = PgPoolOptions::new()
            .max_connections(max_cons)
            .acquire_timeout(Duration::from_millis(500))
            .connect_with(con_opts)
            .await
            .map_err(|ex| Error::FailToCreatePool(format!("Standard DB Pool: {}", ex)))?;

        Ok(Self { db: db_pool })
    }

    /// Creates a database with a random unique name, runs the migrations on it
    /// and returns a manager connected to it. Each integration test gets its
    /// own database so they can't observe each other's rows.
    pub async fn test_init(db_config: &DbConfig) -> Result<Self> {
        let mut db_config = db_config.clone();
        db_config.db_name = Uuid::new_v4().to_string();

        let mut connection =
            PgConnection::connect_with(&db_config.connection_options_without_db()).await?;
        let sql = format!(r#"CREATE DATABASE "{}";"#, db_config.db_name);
        sqlx::query(&sql).execute(&mut connection).await?;

        let mgr = Self::init(&db_config).await?;
        sqlx::migrate!("./migrations").run(mgr.db()).await?;

        Ok(mgr)
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create db pool: {0}")]
    FailToCreatePool(String),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("sqlx migration error: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),
}
