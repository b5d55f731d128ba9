use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{debug, instrument};

mod error;
pub mod models;
mod postgres;
mod store;

pub use error::{Error, Result};
pub use postgres::PgStore;
pub use store::Store;

pub struct Database {
    pool: sqlx::Pool<sqlx::Postgres>,
}

impl Database {
    /// Connects with explicit options. An ingest run only ever holds one
    /// transaction, so the pool is capped at a single connection.
    #[instrument(skip_all, level = "trace")]
    pub async fn connect_with(options: PgConnectOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        debug!("connected to database");

        Ok(Self { pool })
    }

    /// Opens the transaction every store operation of a run goes through.
    #[instrument(skip(self), level = "trace")]
    pub async fn begin(&self) -> Result<PgStore> {
        let tx = self.pool.begin().await?;

        Ok(PgStore::new(tx))
    }
}
