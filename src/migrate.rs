use crate::config::Config;
use crate::db;
use crate::error::CoreError;

pub async fn run_migrations(config: &Config) -> Result<(), CoreError> {
    let pool = db::connect(config).await?;

    // Create customers table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Create incidents table. The customer reference is validated at write
    // time; the FK clause documents the relationship but does not cascade.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS incidents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL,
            priority_tier TEXT NOT NULL DEFAULT 'NORMAL',
            priority_score REAL NOT NULL DEFAULT 0.0,
            created_at INTEGER NOT NULL,
            dedup_hash TEXT NOT NULL,
            FOREIGN KEY (customer_id) REFERENCES customers(id)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_customers_name ON customers(name)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_incidents_customer_id ON incidents(customer_id)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_incidents_dedup ON incidents(dedup_hash)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_incidents_tier ON incidents(priority_tier)")
        .execute(&pool)
        .await?;

    pool.close().await;
    Ok(())
}
