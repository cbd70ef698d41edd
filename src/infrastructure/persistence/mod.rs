use sqlx::{
    any::{AnyConnectOptions, AnyPoolOptions, AnyRow},
    Any, AnyConnection, AnyPool, ConnectOptions, Decode, Row, Type,
};
use std::str::FromStr;
use log::LevelFilter;

use crate::infrastructure::http::middleware::error::ApiResult;

mod followups;
mod queues;
mod tickets;
mod users;

pub struct Database {
    pub(crate) pool: AnyPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        // Ensure drivers are installed for AnyPool
        sqlx::any::install_default_drivers();

        let connect_options = AnyConnectOptions::from_str(database_url)?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, std::time::Duration::from_secs(1));

        let pool = AnyPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    // Per-connection pragmas; foreign keys are off by default in SQLite
                    if conn.backend_name() == "SQLite" {
                        sqlx::query("PRAGMA foreign_keys = ON")
                            .execute(&mut *conn)
                            .await?;
                        sqlx::query("PRAGMA busy_timeout = 5000")
                            .execute(&mut *conn)
                            .await?;
                    }
                    Ok(())
                })
            })
            .connect_with(connect_options)
            .await?;

        if database_url.starts_with("sqlite") {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await?;
        }

        tracing::info!("Database pool ready");
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("migrations/sqlite").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

/// Read a nullable column. SQL NULL comes back as `None`.
pub(crate) fn nullable<T>(row: &AnyRow, column: &str) -> Option<T>
where
    T: for<'r> Decode<'r, Any> + Type<Any>,
{
    row.try_get::<Option<T>, _>(column).ok().flatten()
}

/// Rowid of the last INSERT on this connection. Call it on the connection
/// (or transaction) that ran the insert.
pub(crate) async fn last_insert_rowid(conn: &mut AnyConnection) -> ApiResult<i64> {
    let id: i64 = sqlx::query_scalar("SELECT last_insert_rowid()")
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}
