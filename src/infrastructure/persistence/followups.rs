use crate::domain::entities::{FollowUp, NewFollowUp, NewTicketChange, TicketChange, TicketStatus};
use crate::domain::ports::followup_repository::FollowUpRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{last_insert_rowid, nullable, Database};
use crate::shared::utils::timestamps::now_timestamp;
use async_trait::async_trait;
use sqlx::{any::AnyRow, AnyConnection, Row};
use std::collections::HashMap;

const FOLLOWUP_COLUMNS: &str = "id, ticket_id, date, title, comment, public, user_id, new_status";

pub(crate) fn decode_status(code: i64) -> ApiResult<TicketStatus> {
    TicketStatus::try_from(code).map_err(ApiError::Internal)
}

fn map_followup(row: &AnyRow) -> ApiResult<FollowUp> {
    Ok(FollowUp {
        id: row.try_get("id")?,
        ticket_id: row.try_get("ticket_id")?,
        date: row.try_get("date")?,
        title: nullable(row, "title"),
        comment: nullable(row, "comment"),
        public: nullable::<i64>(row, "public").map(|v| v != 0),
        user_id: row.try_get("user_id")?,
        new_status: nullable::<i64>(row, "new_status")
            .map(decode_status)
            .transpose()?,
        changes: Vec::new(),
    })
}

fn map_change(row: &AnyRow) -> ApiResult<TicketChange> {
    Ok(TicketChange {
        id: row.try_get("id")?,
        followup_id: row.try_get("followup_id")?,
        field: row.try_get("field")?,
        old_value: nullable(row, "old_value"),
        new_value: nullable(row, "new_value"),
    })
}

/// Insert a follow-up and its changes on an open connection, so callers can
/// run it inside their own transaction.
pub(crate) async fn insert_followup(
    conn: &mut AnyConnection,
    followup: &NewFollowUp,
    changes: &[NewTicketChange],
) -> ApiResult<FollowUp> {
    let date = now_timestamp();

    sqlx::query(
        "INSERT INTO followups (ticket_id, date, title, comment, public, user_id, new_status)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(followup.ticket_id)
    .bind(&date)
    .bind(&followup.title)
    .bind(&followup.comment)
    .bind(followup.public.map(i64::from))
    .bind(followup.user_id)
    .bind(followup.new_status.map(|s| s.code()))
    .execute(&mut *conn)
    .await?;
    let followup_id = last_insert_rowid(&mut *conn).await?;

    let mut saved_changes = Vec::with_capacity(changes.len());
    for change in changes {
        sqlx::query(
            "INSERT INTO ticket_changes (followup_id, field, old_value, new_value)
             VALUES (?, ?, ?, ?)",
        )
        .bind(followup_id)
        .bind(&change.field)
        .bind(&change.old_value)
        .bind(&change.new_value)
        .execute(&mut *conn)
        .await?;

        saved_changes.push(TicketChange {
            id: last_insert_rowid(&mut *conn).await?,
            followup_id,
            field: change.field.clone(),
            old_value: change.old_value.clone(),
            new_value: change.new_value.clone(),
        });
    }

    tracing::info!(
        "Follow-up recorded: id={}, ticket_id={}, changes={}",
        followup_id,
        followup.ticket_id,
        saved_changes.len()
    );

    Ok(FollowUp {
        id: followup_id,
        ticket_id: followup.ticket_id,
        date,
        title: followup.title.clone(),
        comment: followup.comment.clone(),
        public: followup.public,
        user_id: followup.user_id,
        new_status: followup.new_status,
        changes: saved_changes,
    })
}

#[async_trait]
impl FollowUpRepository for Database {
    async fn create_followup(
        &self,
        followup: &NewFollowUp,
        changes: &[NewTicketChange],
    ) -> ApiResult<FollowUp> {
        let mut tx = self.pool.begin().await?;
        let saved = insert_followup(&mut *tx, followup, changes).await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn get_followup_by_id(&self, id: i64) -> ApiResult<Option<FollowUp>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM followups WHERE id = ?",
            FOLLOWUP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut followup = map_followup(&row)?;

        let change_rows = sqlx::query(
            "SELECT id, followup_id, field, old_value, new_value
             FROM ticket_changes
             WHERE followup_id = ?
             ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        followup.changes = change_rows
            .iter()
            .map(map_change)
            .collect::<ApiResult<Vec<_>>>()?;

        Ok(Some(followup))
    }

    async fn list_followups_for_ticket(&self, ticket_id: i64) -> ApiResult<Vec<FollowUp>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM followups WHERE ticket_id = ? ORDER BY date ASC, id ASC",
            FOLLOWUP_COLUMNS
        ))
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;

        let change_rows = sqlx::query(
            "SELECT c.id, c.followup_id, c.field, c.old_value, c.new_value
             FROM ticket_changes c
             INNER JOIN followups f ON f.id = c.followup_id
             WHERE f.ticket_id = ?
             ORDER BY c.id",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;

        let mut changes_by_followup: HashMap<i64, Vec<TicketChange>> = HashMap::new();
        for row in &change_rows {
            let change = map_change(row)?;
            changes_by_followup
                .entry(change.followup_id)
                .or_default()
                .push(change);
        }

        let mut followups = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut followup = map_followup(row)?;
            followup.changes = changes_by_followup.remove(&followup.id).unwrap_or_default();
            followups.push(followup);
        }

        Ok(followups)
    }
}
