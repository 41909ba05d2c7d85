use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::storage::{KeyLocks, KvStore, MemoryStore, PgStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub config: Arc<AppConfig>,
    pub clock: Arc<dyn Clock>,
    pub locks: Arc<KeyLocks>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.database_url {
            Some(url) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    tracing::warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(PgStore::new(db)) as Arc<dyn KvStore>
            }
            None => {
                tracing::warn!("DATABASE_URL not set; state lives in memory and dies with the process");
                Arc::new(MemoryStore::new()) as Arc<dyn KvStore>
            }
        };

        Ok(Self::from_parts(store, config, Arc::new(SystemClock)))
    }

    pub fn from_parts(
        store: Arc<dyn KvStore>,
        config: Arc<AppConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            config,
            clock,
            locks: Arc::new(KeyLocks::default()),
        }
    }

    /// In-memory state with test config and the given clock.
    pub fn fake(clock: Arc<dyn Clock>) -> Self {
        Self::from_parts(
            Arc::new(MemoryStore::new()),
            Arc::new(AppConfig::for_tests()),
            clock,
        )
    }
}
