use crate::domain::entities::{CreateUserRequest, User};
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::{last_insert_rowid, nullable, Database};
use crate::shared::utils::timestamps::now_timestamp;
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const USER_COLUMNS: &str = "id, username, first_name, last_name, email, created_at";

fn map_user(row: &AnyRow) -> ApiResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        first_name: nullable(row, "first_name"),
        last_name: nullable(row, "last_name"),
        email: nullable(row, "email"),
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserRepository for Database {
    async fn create_user(&self, request: &CreateUserRequest) -> ApiResult<User> {
        let now = now_timestamp();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (username, first_name, last_name, email, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&request.username)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        let id = last_insert_rowid(&mut *tx).await?;
        tx.commit().await?;

        let user = User {
            id,
            username: request.username.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
            created_at: now,
        };

        tracing::info!("User created: id={}, username={}", user.id, user.username);
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i64) -> ApiResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    async fn list_users(&self) -> ApiResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY username",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_user).collect()
    }
}
