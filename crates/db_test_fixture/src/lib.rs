//! Per-test Postgres databases, created from an admin connection and dropped on cleanup.

use std::env;

use anyhow::{Context, Result};
use db::pg::{run_migrations, PgDatabase};
use sqlx::{Executor, PgPool};
use tracing::debug;
use uuid::Uuid;

pub struct DbFixture {
    admin_url: String,
}

impl DbFixture {
    /// Fails when neither `TEST_ADMIN_URL` nor `DATABASE_URL` is set; callers skip the test.
    pub fn from_env() -> Result<Self> {
        let admin_url = env::var("TEST_ADMIN_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .context("TEST_ADMIN_URL or DATABASE_URL must be set for tests")?;
        Ok(Self {
            admin_url: admin_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates an empty, migrated database named `<prefix>_<uuid>`.
    pub async fn create(&self, prefix: &str) -> Result<TestDatabase> {
        let name = format!("{}_{}", prefix, Uuid::new_v4().simple());
        let admin_pool = PgPool::connect(&self.admin_url).await?;
        admin_pool
            .execute(format!("CREATE DATABASE \"{name}\"").as_str())
            .await
            .with_context(|| format!("creating test database {name}"))?;

        let url = format!("{}/{}", self.admin_url, name);
        let pool = PgPool::connect(&url).await?;
        run_migrations(&pool).await?;
        debug!(database = %name, "test database ready");

        Ok(TestDatabase {
            database: PgDatabase::from_pool(pool),
            name,
            url,
            admin_url: self.admin_url.clone(),
        })
    }
}

pub struct TestDatabase {
    database: PgDatabase,
    name: String,
    url: String,
    admin_url: String,
}

impl TestDatabase {
    pub fn database(&self) -> &PgDatabase {
        &self.database
    }

    pub fn database_url(&self) -> &str {
        &self.url
    }

    pub async fn cleanup(self) -> Result<()> {
        self.database.pool().close().await;
        let admin_pool = PgPool::connect(&self.admin_url).await?;
        admin_pool
            .execute(
                format!(
                    "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
                    self.name
                )
                .as_str(),
            )
            .await?;
        admin_pool
            .execute(format!("DROP DATABASE IF EXISTS \"{}\"", self.name).as_str())
            .await?;
        Ok(())
    }
}
