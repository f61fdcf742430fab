use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Role, StoreError, StoreResult, User, UserRepository, UserUpdate};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    is_blocked: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        // ---
        let role = r.role.parse::<Role>().map_err(|e| {
            StoreError::Unavailable(anyhow::anyhow!("corrupt user row {}: {e}", r.id))
        })?;

        Ok(User {
            id: r.id,
            username: r.username,
            email: r.email,
            password_hash: r.password_hash,
            role,
            is_blocked: r.is_blocked,
            created_at: r.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, is_blocked, created_at";

/// Maps a sqlx error, singling out unique violations by constraint name.
fn map_sqlx(err: sqlx::Error) -> StoreError {
    // ---
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            if constraint.contains("email") {
                return StoreError::Conflict("email");
            }
            if constraint.contains("username") {
                return StoreError::Conflict("username");
            }
            return StoreError::Conflict("unknown");
        }
    }
    StoreError::Unavailable(err.into())
}

pub fn create_postgres_repository(pool: PgPool) -> crate::domain::RepositoryPtr {
    // ---
    std::sync::Arc::new(PostgresRepository::new(pool))
}

pub struct PostgresRepository {
    // ---
    pool: PgPool,
}

impl PostgresRepository {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for PostgresRepository {
    // ---
    async fn create_user(&self, user: User) -> StoreResult<User> {
        // ---
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, role, is_blocked, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_blocked)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        // ---
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        row.map(User::try_from).transpose()
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        // ---
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        row.map(User::try_from).transpose()
    }

    async fn list_users(&self, search: Option<&str>) -> StoreResult<Vec<User>> {
        // ---
        // strpos keeps the term literal; no LIKE wildcards to escape.
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE $1::text IS NULL
                OR strpos(lower(username), lower($1)) > 0
                OR strpos(lower(email), lower($1)) > 0
             ORDER BY created_at, username"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(search)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update_user(&self, user_id: Uuid, update: &UserUpdate) -> StoreResult<bool> {
        // ---
        let result =
            sqlx::query("UPDATE users SET username = $1, email = $2, role = $3 WHERE id = $4")
                .bind(&update.username)
                .bind(&update.email)
                .bind(update.role.as_str())
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_blocked(&self, user_id: Uuid, blocked: bool) -> StoreResult<bool> {
        // ---
        let result = sqlx::query("UPDATE users SET is_blocked = $1 WHERE id = $2")
            .bind(blocked)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, user_id: Uuid) -> StoreResult<bool> {
        // ---
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        // ---
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}
