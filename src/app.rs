use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::{
    config::AppConfig,
    database::DbManager,
    web::{self, WebResult},
    Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}

impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        // Missing connection parameters don't stop the app from serving:
        // every submission then takes the configuration-error path.
        let database_mgr = match &config.db_config {
            Some(db_config) => Some(DbManager::init(db_config).await?),
            None => {
                error!(
                    "{:<12} - Database connection parameters are missing, \
                     waitlist storage is unavailable",
                    "build_app"
                );
                None
            }
        };

        let app_state = AppState::new(database_mgr);

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<12} - Listening on: {addr}", "build_app");

        let app = App::new(app_state, listener);
        Ok(app)
    }
}

pub struct InternalState {
    pub database_mgr: Option<DbManager>,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(database_mgr: Option<DbManager>) -> Self {
        AppState(Arc::new(InternalState { database_mgr }))
    }

    /// The waitlist database pool.
    /// Errors when the connection parameters were absent at startup, which
    /// handlers report to the caller as a configuration error.
    pub fn db(&self) -> WebResult<&PgPool> {
        self.database_mgr
            .as_ref()
            .map(DbManager::db)
            .ok_or(web::Error::DbNotConfigured)
    }
}
