//! Database migrations
//!
//! Migrations are versioned and applied automatically on database connection.

use sqlx::SqlitePool;

/// Current schema version
pub const CURRENT_VERSION: i32 = 3;

/// SQL for creating the migrations tracking table
const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: Corpus schema
const MIGRATION_V1: &str = r#"
    CREATE TABLE IF NOT EXISTS units (
        id INTEGER PRIMARY KEY NOT NULL,
        code TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        color TEXT NOT NULL,
        sort_order INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS sub_themes (
        id INTEGER PRIMARY KEY NOT NULL,
        unit_id INTEGER NOT NULL REFERENCES units(id) ON DELETE CASCADE,
        label TEXT NOT NULL,
        sort_order INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_sub_themes_unit_id ON sub_themes(unit_id);

    CREATE TABLE IF NOT EXISTS words (
        id INTEGER PRIMARY KEY NOT NULL,
        arabic TEXT NOT NULL,
        transliteration TEXT,
        gloss TEXT,
        surah_ayah TEXT,
        root_id INTEGER,
        difficulty INTEGER CHECK (difficulty IS NULL OR difficulty BETWEEN 1 AND 5),
        is_advanced INTEGER NOT NULL DEFAULT 0,
        part_2 INTEGER NOT NULL DEFAULT 0
    );

    -- Membership order matters: paired sub-themes list their pairs consecutively
    CREATE TABLE IF NOT EXISTS word_themes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word_id INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
        sub_theme_id INTEGER NOT NULL REFERENCES sub_themes(id) ON DELETE CASCADE,
        UNIQUE (word_id, sub_theme_id)
    );

    CREATE INDEX IF NOT EXISTS idx_word_themes_sub_theme_id ON word_themes(sub_theme_id);

    CREATE TABLE IF NOT EXISTS word_relationships (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word_id_1 INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
        word_id_2 INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
        relationship_type TEXT NOT NULL CHECK (relationship_type IN (
            'same_root', 'opposite', 'virtue_pair', 'semantic_similar', 'morphological_variant'
        )),
        weight REAL NOT NULL CHECK (weight > 0 AND weight <= 1),
        CHECK (word_id_1 < word_id_2),
        UNIQUE (word_id_1, word_id_2, relationship_type)
    );

    CREATE INDEX IF NOT EXISTS idx_word_relationships_word_id_2 ON word_relationships(word_id_2);
"#;

/// Migration 2: Lookup indexes for word focus and recommendations
const MIGRATION_V2: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_words_root_id ON words(root_id);
    CREATE INDEX IF NOT EXISTS idx_words_difficulty ON words(difficulty);
    CREATE INDEX IF NOT EXISTS idx_word_themes_word_id ON word_themes(word_id);
"#;

/// Migration 3: Bare Arabic form for vowel-insensitive search
const MIGRATION_V3: &str = r#"
    ALTER TABLE words ADD COLUMN arabic_bare TEXT NOT NULL DEFAULT '';
    CREATE INDEX IF NOT EXISTS idx_words_arabic_bare ON words(arabic_bare);
"#;

/// Get the current schema version from the database
async fn get_current_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    let row: Option<(Option<i32>,)> = sqlx::query_as("SELECT MAX(version) FROM _migrations")
        .fetch_optional(pool)
        .await?;

    Ok(row.and_then(|(v,)| v).unwrap_or(0))
}

/// Record that a migration has been applied
async fn record_migration(pool: &SqlitePool, version: i32) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let current_version = get_current_version(pool).await?;

    tracing::info!(
        current_version = current_version,
        target_version = CURRENT_VERSION,
        "Checking database migrations"
    );

    if current_version >= CURRENT_VERSION {
        tracing::debug!("Database is up to date");
        return Ok(());
    }

    if current_version < 1 {
        tracing::info!("Applying migration v1: Corpus schema");
        sqlx::raw_sql(MIGRATION_V1).execute(pool).await?;
        record_migration(pool, 1).await?;
    }

    if current_version < 2 {
        tracing::info!("Applying migration v2: Lookup indexes");
        sqlx::raw_sql(MIGRATION_V2).execute(pool).await?;
        record_migration(pool, 2).await?;
    }

    if current_version < 3 {
        tracing::info!("Applying migration v3: Bare Arabic form");
        sqlx::raw_sql(MIGRATION_V3).execute(pool).await?;
        record_migration(pool, 3).await?;
    }

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Get migration status information
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = get_current_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Current schema version in the database
    pub current_version: i32,
    /// Target schema version (latest)
    pub target_version: i32,
    pub needs_migration: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool")
    }

    #[tokio::test]
    async fn test_run_migrations() {
        let pool = create_test_pool().await;

        let status = migration_status(&pool).await.unwrap();
        assert_eq!(status.current_version, 0);
        assert!(status.needs_migration);

        run_migrations(&pool).await.unwrap();

        let status = migration_status(&pool).await.unwrap();
        assert_eq!(status.current_version, CURRENT_VERSION);
        assert!(!status.needs_migration);
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let pool = create_test_pool().await;

        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let status = migration_status(&pool).await.unwrap();
        assert_eq!(status.current_version, CURRENT_VERSION);
    }

    #[tokio::test]
    async fn test_tables_created() {
        let pool = create_test_pool().await;
        run_migrations(&pool).await.unwrap();

        for table in ["units", "sub_themes", "words", "word_themes", "word_relationships"] {
            let result: (i32,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(&pool)
                .await
                .unwrap_or_else(|_| panic!("Table {} should exist", table));
            assert_eq!(result.0, 0, "Table {} should be empty", table);
        }
    }

    #[tokio::test]
    async fn test_bare_form_column_defaults_empty() {
        let pool = create_test_pool().await;
        run_migrations(&pool).await.unwrap();

        sqlx::raw_sql("INSERT INTO words (id, arabic) VALUES (1, 'نُور');")
            .execute(&pool)
            .await
            .unwrap();
        let (bare,): (String,) = sqlx::query_as("SELECT arabic_bare FROM words WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(bare, "");
    }

    #[tokio::test]
    async fn test_relationship_constraints() {
        let pool = create_test_pool().await;
        run_migrations(&pool).await.unwrap();

        sqlx::raw_sql("INSERT INTO words (id, arabic) VALUES (1, 'a'), (2, 'b');")
            .execute(&pool)
            .await
            .unwrap();

        let insert = "INSERT INTO word_relationships (word_id_1, word_id_2, relationship_type, weight) VALUES (?, ?, ?, ?)";

        sqlx::query(insert)
            .bind(1)
            .bind(2)
            .bind("opposite")
            .bind(0.8)
            .execute(&pool)
            .await
            .unwrap();

        // Same pair and type again
        assert!(sqlx::query(insert).bind(1).bind(2).bind("opposite").bind(0.8).execute(&pool).await.is_err());
        // Reversed pair
        assert!(sqlx::query(insert).bind(2).bind(1).bind("same_root").bind(0.9).execute(&pool).await.is_err());
        // Unknown type
        assert!(sqlx::query(insert).bind(1).bind(2).bind("cousin").bind(0.5).execute(&pool).await.is_err());
        // Same pair, different type is fine
        sqlx::query(insert)
            .bind(1)
            .bind(2)
            .bind("same_root")
            .bind(0.9)
            .execute(&pool)
            .await
            .unwrap();
    }
}
