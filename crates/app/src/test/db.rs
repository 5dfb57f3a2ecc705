//! One Postgres container per test run, one database per test.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};
use uuid::Uuid;

use crate::database;

const USER: &str = "storefront_test";
const PASSWORD: &str = "storefront_test_password";
const DB_PREFIX: &str = "storefront_test_";

static POSTGRES_CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

/// Databases to drop, fed by `TestDb::drop`.
static DROP_QUEUE: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

/// Names are interpolated into `CREATE`/`DROP DATABASE`, so only our own
/// generated shape is accepted.
fn is_test_database_name(name: &str) -> bool {
    name.len() <= 63
        && name
            .strip_prefix(DB_PREFIX)
            .is_some_and(|suffix| {
                !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_hexdigit())
            })
}

async fn start_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(USER)
        .with_password(PASSWORD)
        .with_db_name(USER)
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

async fn server_url(database: &str) -> String {
    let container = POSTGRES_CONTAINER.get_or_init(start_container).await;

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get container port");

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    format!("postgresql://{USER}:{PASSWORD}@{host}:{port}/{database}")
}

async fn start_drop_queue() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(name) = receiver.recv().await {
            if let Err(error) = drop_database(&name).await {
                eprintln!("Failed to drop test database '{name}': {error}");
            }
        }
    });

    sender
}

async fn drop_database(name: &str) -> Result<(), sqlx::Error> {
    if !is_test_database_name(name) {
        return Ok(());
    }

    let mut conn = PgConnection::connect(&server_url("postgres").await).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS \"{name}\""))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// A freshly migrated database, dropped in the background once the value goes away.
///
/// Services commit for real; isolation comes from every test owning its
/// database, not from rolled-back transactions.
#[derive(Debug)]
pub struct TestDb {
    pool: PgPool,
    name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(queue) = DROP_QUEUE.get() {
            let _ = queue.send(self.name.clone());
        }
    }
}

impl TestDb {
    pub async fn new() -> Self {
        DROP_QUEUE.get_or_init(start_drop_queue).await;

        let name = format!("{DB_PREFIX}{}", Uuid::now_v7().simple());

        let mut admin = PgConnection::connect(&server_url("postgres").await)
            .await
            .expect("Failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut admin)
            .await
            .expect("Failed to create test database");

        admin
            .close()
            .await
            .expect("Failed to close admin connection");

        let pool = PgPool::connect(&server_url(&name).await)
            .await
            .expect("Failed to create pool for database");

        database::migrate(&pool)
            .await
            .expect("Failed to run migrations on database");

        Self { pool, name }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_generated_names_are_droppable() {
        let generated = format!("{DB_PREFIX}{}", Uuid::now_v7().simple());

        assert!(is_test_database_name(&generated));
        assert!(!is_test_database_name("postgres"));
        assert!(!is_test_database_name(DB_PREFIX));
        assert!(!is_test_database_name("storefront_test_abc\"; DROP"));
    }

    #[tokio::test]
    async fn databases_are_migrated_and_separate() {
        let first = TestDb::new().await;
        let second = TestDb::new().await;

        assert_ne!(first.name, second.name);

        sqlx::query("INSERT INTO sessions (session_key, expires_at) VALUES ('k', now())")
            .execute(first.pool())
            .await
            .expect("Failed to insert session row");

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(second.pool())
            .await
            .expect("Failed to count session rows");

        assert_eq!(rows, 0);
    }
}
