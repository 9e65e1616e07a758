//! Image artifact repository
//!
//! Durable, versioned persistence of image artifacts over SQLite. The
//! payload column holds the codec frame (version, media type, body); the
//! remaining columns are queryable metadata. Records are visible only once
//! fully committed, and the on-disk schema carries an explicit version with
//! a non-destructive upgrade path.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use uuid::Uuid;

use easel_common::{payload_checksum, Error, Result};

use crate::domain::codec;
use crate::domain::entities::{ImageArtifact, Payload, StoredImage};

/// Current on-disk schema version.
/// Version history:
/// - v1: Initial schema, raw payload bytes, no source or checksum columns
/// - v2: Framed payload buffer, source and checksum columns
pub const SCHEMA_VERSION: i64 = 2;

/// All metadata columns in the images table, used for SELECT clauses.
const IMAGE_COLUMNS: &str = "\
    id, original_prompt, refined_prompt, source, \
    content_type, size_bytes, checksum, created_at";

#[derive(Debug, sqlx::FromRow)]
struct StoredRow {
    #[sqlx(flatten)]
    artifact: ImageArtifact,
    payload: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct ImageRepository {
    pool: SqlitePool,
    max_store_bytes: i64,
}

impl ImageRepository {
    /// Open (or create) the store at the given path and bring its schema to
    /// the current version.
    pub async fn open(path: &Path, max_store_bytes: i64) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::StorageUnavailable(format!("Failed to create data directory: {}", e))
            })?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
            .map_err(|e| Error::StorageUnavailable(format!("Invalid SQLite path: {}", e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        Self::connect(options, max_store_bytes).await
    }

    /// Open an in-memory store (for testing).
    pub async fn open_in_memory(max_store_bytes: i64) -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| Error::StorageUnavailable(format!("Invalid SQLite path: {}", e)))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        Self::connect(options, max_store_bytes).await
    }

    async fn connect(options: SqliteConnectOptions, max_store_bytes: i64) -> Result<Self> {
        // A single connection serializes store operations; WAL keeps readers
        // from blocking on the writer.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| Error::StorageUnavailable(format!("Failed to open SQLite: {}", e)))?;

        let repo = Self {
            pool,
            max_store_bytes,
        };
        repo.initialize_schema().await?;
        Ok(repo)
    }

    /// Underlying pool, exposed for maintenance tooling and tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn initialize_schema(&self) -> Result<()> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)")
            .execute(&self.pool)
            .await?;

        let current: Option<i64> = sqlx::query_scalar("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        match current {
            None => {
                // Fresh database
                self.create_schema().await?;
                sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                    .bind(SCHEMA_VERSION)
                    .execute(&self.pool)
                    .await?;
                tracing::info!(version = SCHEMA_VERSION, "Created image store schema");
            }
            Some(1) => {
                self.migrate_v1_to_v2().await?;
                tracing::info!("Migrated image store schema from v1 to v{}", SCHEMA_VERSION);
            }
            Some(v) if v == SCHEMA_VERSION => {
                tracing::debug!(version = v, "Image store schema is current");
            }
            Some(v) => {
                // A schema from the future cannot be interpreted safely
                return Err(Error::StorageUnavailable(format!(
                    "Store schema version {} is newer than supported version {}",
                    v, SCHEMA_VERSION
                )));
            }
        }

        Ok(())
    }

    async fn create_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS images (
                id TEXT PRIMARY KEY,
                original_prompt TEXT NOT NULL,
                refined_prompt TEXT NOT NULL,
                source TEXT NOT NULL,
                content_type TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                checksum TEXT NOT NULL,
                payload BLOB NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_images_created_at ON images(created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Upgrade a v1 store in place: add the source and checksum columns,
    /// wrap every raw payload in the codec frame, and backfill checksums.
    /// No records are discarded.
    async fn migrate_v1_to_v2(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("ALTER TABLE images ADD COLUMN source TEXT NOT NULL DEFAULT 'unknown'")
            .execute(&mut *tx)
            .await?;
        sqlx::query("ALTER TABLE images ADD COLUMN checksum TEXT NOT NULL DEFAULT ''")
            .execute(&mut *tx)
            .await?;

        let rows: Vec<(Uuid, String, Vec<u8>)> =
            sqlx::query_as("SELECT id, content_type, payload FROM images")
                .fetch_all(&mut *tx)
                .await?;

        for (id, content_type, raw) in rows {
            let payload = Payload::new(content_type, raw);
            let framed = codec::encode(&payload);
            let checksum = payload_checksum(&payload.bytes);

            sqlx::query("UPDATE images SET payload = ?, checksum = ? WHERE id = ?")
                .bind(&framed)
                .bind(&checksum)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE schema_version SET version = ?")
            .bind(SCHEMA_VERSION)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Persist a record with its payload; overwrites any record with the
    /// same id. Atomic: a failed put leaves nothing visible.
    pub async fn put(&self, artifact: &ImageArtifact, payload: &Payload) -> Result<()> {
        artifact.validate()?;

        if payload.bytes.len() as i64 != artifact.size_bytes {
            return Err(Error::Validation(
                "Payload length does not match the record's size_bytes".to_string(),
            ));
        }

        let framed = codec::encode(payload);

        let mut tx = self.pool.begin().await?;

        // Quota check inside the transaction; a replaced record's bytes are
        // credited back before the projection.
        let replaced: Option<i64> = sqlx::query_scalar("SELECT size_bytes FROM images WHERE id = ?")
            .bind(artifact.id)
            .fetch_optional(&mut *tx)
            .await?;
        let used: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(size_bytes), 0) FROM images")
            .fetch_one(&mut *tx)
            .await?;

        let projected = used - replaced.unwrap_or(0) + artifact.size_bytes;
        if projected > self.max_store_bytes {
            return Err(Error::QuotaExceeded(format!(
                "Write of {} bytes would exceed the {} byte store budget",
                artifact.size_bytes, self.max_store_bytes
            )));
        }

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO images
                (id, original_prompt, refined_prompt, source,
                 content_type, size_bytes, checksum, payload, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(artifact.id)
        .bind(&artifact.original_prompt)
        .bind(&artifact.refined_prompt)
        .bind(&artifact.source)
        .bind(&artifact.content_type)
        .bind(artifact.size_bytes)
        .bind(&artifact.checksum)
        .bind(&framed)
        .bind(artifact.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_write_err)?;

        tx.commit().await.map_err(map_write_err)?;
        Ok(())
    }

    /// Fetch a record with its reconstructed payload.
    ///
    /// A missing id is `None`, never an error; an undecodable frame is
    /// `Error::CorruptRecord`.
    pub async fn get(&self, id: Uuid) -> Result<Option<StoredImage>> {
        let query = format!("SELECT {IMAGE_COLUMNS}, payload FROM images WHERE id = ?");
        let row: Option<StoredRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let payload = codec::decode(&row.payload)
                    .map_err(|e| Error::CorruptRecord(format!("record {}: {}", id, e)))?;
                Ok(Some(StoredImage {
                    artifact: row.artifact,
                    payload,
                }))
            }
        }
    }

    /// Every record with its payload, newest first. An empty store yields an
    /// empty vec. Records whose frame no longer decodes are skipped with a
    /// warning; the health monitor is the component that reports them.
    pub async fn get_all(&self) -> Result<Vec<StoredImage>> {
        let query =
            format!("SELECT {IMAGE_COLUMNS}, payload FROM images ORDER BY created_at DESC, id");
        let rows: Vec<StoredRow> = sqlx::query_as(&query).fetch_all(&self.pool).await?;

        let mut images = Vec::with_capacity(rows.len());
        for row in rows {
            match codec::decode(&row.payload) {
                Ok(payload) => images.push(StoredImage {
                    artifact: row.artifact,
                    payload,
                }),
                Err(e) => {
                    tracing::warn!(id = %row.artifact.id, error = %e, "Skipping undecodable record");
                }
            }
        }
        Ok(images)
    }

    /// Every record id, newest first. Used by the health monitor's walk.
    pub async fn ids(&self) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar("SELECT id FROM images ORDER BY created_at DESC, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    /// Idempotent removal; deleting a nonexistent id is a no-op.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every record. Used only by the health monitor's rebuild.
    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM images").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM images")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Total stored payload bytes (body bytes, not frame overhead).
    pub async fn total_payload_bytes(&self) -> Result<i64> {
        let total = sqlx::query_scalar("SELECT COALESCE(SUM(size_bytes), 0) FROM images")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

/// Map write-side database failures; a full disk surfaces as quota.
fn map_write_err(e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("13") || db.message().contains("database or disk is full")
        {
            return Error::QuotaExceeded(
                "Underlying database rejected the write for space".to_string(),
            );
        }
    }
    Error::Database(e)
}
