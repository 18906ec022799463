use std::time::Duration;

use anyhow::{anyhow, Result};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::{Error as DieselError, QueryResult};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{debug, warn};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Attempts made by [`with_retry`] before a lock error is returned
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Base delay between retries; doubled on each attempt
const RETRY_BASE_DELAY: Duration = Duration::from_millis(20);

/// Applies the pragmas every pooled connection needs
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Creates a connection pool for the given SQLite database URL
///
/// Every connection handed out by the pool has foreign keys enforced and a
/// busy timeout set.
pub fn init_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .map_err(|e| anyhow!("Failed to create pool for {}: {}", database_url, e))
}

/// Runs all pending embedded migrations
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;
    debug!("Applied {} migrations", applied.len());
    Ok(())
}

fn is_locked(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(_, info) => {
            let message = info.message();
            message.contains("database is locked") || message.contains("database table is locked")
        }
        _ => false,
    }
}

/// Runs a write operation, retrying with backoff while SQLite reports the
/// database as locked
///
/// ### Arguments
///
/// * `conn` - The connection to run the operation on
/// * `op` - The operation; called once per attempt
///
/// ### Returns
///
/// The result of the first attempt that does not fail with a lock error, or
/// the lock error from the final attempt
pub async fn with_retry<T, F>(conn: &mut SqliteConnection, mut op: F) -> QueryResult<T>
where
    F: FnMut(&mut SqliteConnection) -> QueryResult<T>,
{
    let mut attempt = 1;
    loop {
        match op(conn) {
            Err(err) if is_locked(&err) && attempt < MAX_WRITE_ATTEMPTS => {
                let delay = RETRY_BASE_DELAY * 2u32.pow(attempt - 1);
                warn!(attempt, ?delay, "Database locked, retrying write");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
