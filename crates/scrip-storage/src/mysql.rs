use async_trait::async_trait;
use jiff::Timestamp;
use scrip_core::error::Result;
use scrip_core::{CodePage, CodeStatus, RedemptionCode, Repository, StorageError};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

/// Rows per INSERT statement inside the batch transaction.
const INSERT_CHUNK_SIZE: usize = 50;

/// MySQL implementation of the repository contract.
///
/// The batch insert is chunked for statement-size reasons but runs in a
/// single transaction, so callers observe an all-or-nothing outcome. The
/// `expired_time` column keeps the wire convention of `0` meaning
/// "never expires"; the domain model's `Option` is converted at this
/// boundary.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn expired_time_column(expires_at: Option<Timestamp>) -> i64 {
    expires_at.map_or(0, |expires_at| expires_at.as_second())
}

fn parse_timestamp(seconds: i64, column: &str) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{seconds}': {e}"))
    })
}

fn decode_code(row: &MySqlRow) -> Result<RedemptionCode> {
    let status_raw: i32 = row.try_get("status").map_err(map_sqlx_error)?;
    let status =
        CodeStatus::try_from(status_raw).map_err(|e| StorageError::InvalidData(e.to_string()))?;

    let created_time: i64 = row.try_get("created_time").map_err(map_sqlx_error)?;
    let expired_time: i64 = row.try_get("expired_time").map_err(map_sqlx_error)?;
    let expires_at = if expired_time == 0 {
        None
    } else {
        Some(parse_timestamp(expired_time, "expired_time")?)
    };

    Ok(RedemptionCode {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        owner_id: row.try_get("owner_id").map_err(map_sqlx_error)?,
        name: row.try_get("name").map_err(map_sqlx_error)?,
        key: row.try_get("key").map_err(map_sqlx_error)?,
        status,
        quota: row.try_get("quota").map_err(map_sqlx_error)?,
        created_at: parse_timestamp(created_time, "created_time")?,
        expires_at,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

const SELECT_COLUMNS: &str =
    "id, owner_id, name, `key`, status, quota, created_time, expired_time";

#[async_trait]
impl Repository for MySqlRepository {
    async fn create_batch(&self, codes: &[RedemptionCode]) -> Result<()> {
        if codes.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for chunk in codes.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = sqlx::QueryBuilder::<sqlx::MySql>::new(
                "INSERT INTO redemption_codes \
                 (owner_id, name, `key`, status, quota, created_time, expired_time) ",
            );
            builder.push_values(chunk, |mut row, code| {
                row.push_bind(code.owner_id)
                    .push_bind(&code.name)
                    .push_bind(&code.key)
                    .push_bind(i32::from(code.status))
                    .push_bind(code.quota)
                    .push_bind(code.created_at.as_second())
                    .push_bind(expired_time_column(code.expires_at));
            });

            // Dropping the transaction on error rolls back every chunk
            // already written, so no partial batch becomes visible.
            match builder.build().execute(&mut *tx).await {
                Ok(_) => {}
                Err(err) if is_unique_violation(&err) => {
                    return Err(StorageError::Conflict(err.to_string()));
                }
                Err(err) => return Err(map_sqlx_error(err)),
            }
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<RedemptionCode>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM redemption_codes WHERE id = ? LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(decode_code).transpose()
    }

    async fn search(&self, keyword: &str, offset: u64, limit: u64) -> Result<CodePage> {
        // A numeric keyword also matches the id exactly; NULL disables
        // the id clause for everything else.
        let id_match: Option<i64> = keyword.parse().ok();
        let pattern = format!("%{keyword}%");

        let where_sql = "(? IS NOT NULL AND id = ?) OR name LIKE ? OR `key` = ?";

        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM redemption_codes \
             WHERE {where_sql} ORDER BY id DESC LIMIT ? OFFSET ?"
        ))
        .bind(id_match)
        .bind(id_match)
        .bind(&pattern)
        .bind(keyword)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM redemption_codes WHERE {where_sql}"
        ))
        .bind(id_match)
        .bind(id_match)
        .bind(&pattern)
        .bind(keyword)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let items = rows.iter().map(decode_code).collect::<Result<Vec<_>>>()?;
        Ok(CodePage {
            items,
            total: total as u64,
        })
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<CodePage> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM redemption_codes \
             ORDER BY id DESC LIMIT ? OFFSET ?"
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM redemption_codes")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let items = rows.iter().map(decode_code).collect::<Result<Vec<_>>>()?;
        Ok(CodePage {
            items,
            total: total as u64,
        })
    }

    async fn update(&self, code: &RedemptionCode) -> Result<bool> {
        // Existence is checked separately: MySQL reports zero affected
        // rows for updates that change nothing, which is not "missing".
        let exists = sqlx::query("SELECT 1 FROM redemption_codes WHERE id = ? LIMIT 1")
            .bind(code.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .is_some();
        if !exists {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE redemption_codes \
             SET name = ?, status = ?, quota = ?, expired_time = ? \
             WHERE id = ?",
        )
        .bind(&code.name)
        .bind(i32::from(code.status))
        .bind(code.quota)
        .bind(expired_time_column(code.expires_at))
        .bind(code.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(true)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM redemption_codes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_invalid(&self, now: Timestamp) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM redemption_codes \
             WHERE status = ? OR status = ? \
             OR (expired_time != 0 AND expired_time < ?)",
        )
        .bind(i32::from(CodeStatus::Used))
        .bind(i32::from(CodeStatus::Disabled))
        .bind(now.as_second())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
