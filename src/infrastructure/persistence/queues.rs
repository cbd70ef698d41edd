use crate::domain::entities::{MailboxType, Queue};
use crate::domain::ports::queue_repository::QueueRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{last_insert_rowid, nullable, Database};
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const QUEUE_COLUMNS: &str = "id, title, slug, email_address, email_box_type, email_box_host,
     email_box_port, email_box_user, email_box_pass, email_box_imap_folder,
     email_box_interval, email_box_last_check";

fn map_queue(row: &AnyRow) -> ApiResult<Queue> {
    let email_box_type = nullable::<String>(row, "email_box_type")
        .map(|value| value.parse::<MailboxType>())
        .transpose()
        .map_err(ApiError::Internal)?;

    Ok(Queue {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        email_address: nullable(row, "email_address"),
        email_box_type,
        email_box_host: nullable(row, "email_box_host"),
        email_box_port: nullable(row, "email_box_port"),
        email_box_user: nullable(row, "email_box_user"),
        email_box_pass: nullable(row, "email_box_pass"),
        email_box_imap_folder: nullable(row, "email_box_imap_folder"),
        email_box_interval: nullable(row, "email_box_interval"),
        email_box_last_check: nullable(row, "email_box_last_check"),
    })
}

#[async_trait]
impl QueueRepository for Database {
    async fn create_queue(&self, queue: &Queue) -> ApiResult<Queue> {
        let mut queue = queue.clone();
        queue.prepare_for_save();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO queues (title, slug, email_address, email_box_type, email_box_host,
                email_box_port, email_box_user, email_box_pass, email_box_imap_folder,
                email_box_interval)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&queue.title)
        .bind(&queue.slug)
        .bind(&queue.email_address)
        .bind(queue.email_box_type.map(|t| t.as_str()))
        .bind(&queue.email_box_host)
        .bind(queue.email_box_port)
        .bind(&queue.email_box_user)
        .bind(&queue.email_box_pass)
        .bind(&queue.email_box_imap_folder)
        .bind(queue.email_box_interval)
        .execute(&mut *tx)
        .await?;
        queue.id = last_insert_rowid(&mut *tx).await?;
        tx.commit().await?;

        queue.email_box_last_check = None;

        tracing::info!("Queue created: id={}, slug={}", queue.id, queue.slug);
        Ok(queue)
    }

    async fn get_queue_by_id(&self, id: i64) -> ApiResult<Option<Queue>> {
        let row = sqlx::query(&format!("SELECT {} FROM queues WHERE id = ?", QUEUE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_queue).transpose()
    }

    async fn get_queue_by_slug(&self, slug: &str) -> ApiResult<Option<Queue>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM queues WHERE slug = ?",
            QUEUE_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_queue).transpose()
    }

    async fn list_queues(&self) -> ApiResult<Vec<Queue>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM queues ORDER BY title, id",
            QUEUE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_queue).collect()
    }

    async fn update_queue(
        &self,
        id: i64,
        edit: &(dyn for<'q> Fn(&'q mut Queue) -> ApiResult<()> + Send + Sync),
    ) -> ApiResult<Queue> {
        let mut tx = self.pool.begin().await?;

        // Take the write lock before reading so concurrent edits serialize
        let locked = sqlx::query("UPDATE queues SET title = title WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if locked.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Queue {} not found", id)));
        }

        let row = sqlx::query(&format!("SELECT {} FROM queues WHERE id = ?", QUEUE_COLUMNS))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let mut queue = map_queue(&row)?;

        edit(&mut queue)?;
        queue.id = id;
        queue.prepare_for_save();

        // email_box_last_check belongs to the mail checker and is never
        // written here
        sqlx::query(
            "UPDATE queues
             SET title = ?, slug = ?, email_address = ?, email_box_type = ?,
                 email_box_host = ?, email_box_port = ?, email_box_user = ?,
                 email_box_pass = ?, email_box_imap_folder = ?, email_box_interval = ?
             WHERE id = ?",
        )
        .bind(&queue.title)
        .bind(&queue.slug)
        .bind(&queue.email_address)
        .bind(queue.email_box_type.map(|t| t.as_str()))
        .bind(&queue.email_box_host)
        .bind(queue.email_box_port)
        .bind(&queue.email_box_user)
        .bind(&queue.email_box_pass)
        .bind(&queue.email_box_imap_folder)
        .bind(queue.email_box_interval)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Queue updated: id={}", id);
        Ok(queue)
    }

    async fn delete_queue(&self, id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM queues WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Queue {} not found", id)));
        }

        tracing::info!("Queue deleted: id={}", id);
        Ok(())
    }

    async fn record_mailbox_check(&self, id: i64, checked_at: &str) -> ApiResult<()> {
        let result = sqlx::query("UPDATE queues SET email_box_last_check = ? WHERE id = ?")
            .bind(checked_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Queue {} not found", id)));
        }

        Ok(())
    }
}
