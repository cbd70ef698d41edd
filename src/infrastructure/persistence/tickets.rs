use crate::domain::entities::{
    CreateTicketRequest, FollowUp, NewFollowUp, Ticket, TicketEdit, TicketFilter, User,
};
use crate::domain::ports::ticket_repository::TicketRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::followups::{decode_status, insert_followup};
use crate::infrastructure::persistence::{last_insert_rowid, nullable, Database};
use crate::shared::utils::timestamps::now_timestamp;
use async_trait::async_trait;
use sqlx::{any::AnyRow, Any, QueryBuilder, Row};

const TICKET_SELECT: &str = "SELECT t.id, t.title, t.queue_id, q.slug AS queue_slug,
        q.title AS queue_title, t.created,
        t.submitter_email, t.assigned_to, t.status, t.description, t.resolution,
        u.username AS assignee_username, u.first_name AS assignee_first_name,
        u.last_name AS assignee_last_name, u.email AS assignee_email,
        u.created_at AS assignee_created_at
     FROM tickets t
     INNER JOIN queues q ON q.id = t.queue_id
     LEFT JOIN users u ON u.id = t.assigned_to";

fn map_ticket(row: &AnyRow) -> ApiResult<Ticket> {
    let assigned_to: Option<i64> = nullable(row, "assigned_to");
    let assignee = match (assigned_to, nullable::<String>(row, "assignee_username")) {
        (Some(id), Some(username)) => Some(User {
            id,
            username,
            first_name: nullable(row, "assignee_first_name"),
            last_name: nullable(row, "assignee_last_name"),
            email: nullable(row, "assignee_email"),
            created_at: row.try_get("assignee_created_at")?,
        }),
        _ => None,
    };

    Ok(Ticket {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        queue_id: row.try_get("queue_id")?,
        queue_slug: row.try_get("queue_slug")?,
        queue_title: row.try_get("queue_title")?,
        created: row.try_get("created")?,
        submitter_email: nullable(row, "submitter_email"),
        assigned_to,
        assignee,
        status: decode_status(row.try_get("status")?)?,
        description: nullable(row, "description"),
        resolution: nullable(row, "resolution"),
    })
}

fn push_filters(builder: &mut QueryBuilder<'_, Any>, filter: &TicketFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(queue_id) = filter.queue_id {
        builder.push(" AND t.queue_id = ").push_bind(queue_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND t.status = ").push_bind(status.code());
    }
    if let Some(assigned_to) = filter.assigned_to {
        builder.push(" AND t.assigned_to = ").push_bind(assigned_to);
    } else if filter.unassigned == Some(true) {
        builder.push(" AND t.assigned_to IS NULL");
    }
}

#[async_trait]
impl TicketRepository for Database {
    async fn create_ticket(
        &self,
        request: &CreateTicketRequest,
        opening: Option<&NewFollowUp>,
    ) -> ApiResult<Ticket> {
        let created = now_timestamp();
        let status = request.status.unwrap_or_default();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO tickets (title, queue_id, created, submitter_email, assigned_to,
                status, description, resolution)
             VALUES (?, ?, ?, ?, ?, ?, ?, NULL)",
        )
        .bind(&request.title)
        .bind(request.queue_id)
        .bind(&created)
        .bind(&request.submitter_email)
        .bind(request.assigned_to)
        .bind(status.code())
        .bind(&request.description)
        .execute(&mut *tx)
        .await?;
        let id = last_insert_rowid(&mut *tx).await?;

        if let Some(opening) = opening {
            let opening = NewFollowUp {
                ticket_id: id,
                ..opening.clone()
            };
            insert_followup(&mut *tx, &opening, &[]).await?;
        }

        tx.commit().await?;
        tracing::info!("Ticket created: id={}, queue_id={}", id, request.queue_id);

        self.get_ticket_by_id(id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("Ticket {} vanished after insert", id)))
    }

    async fn get_ticket_by_id(&self, id: i64) -> ApiResult<Option<Ticket>> {
        let row = sqlx::query(&format!("{} WHERE t.id = ?", TICKET_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_ticket).transpose()
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> ApiResult<(Vec<Ticket>, i64)> {
        let mut count_query = QueryBuilder::<Any>::new("SELECT COUNT(*) AS count FROM tickets t");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build()
            .fetch_one(&self.pool)
            .await?
            .try_get("count")?;

        let mut query = QueryBuilder::<Any>::new(TICKET_SELECT);
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY t.created DESC, t.id DESC LIMIT ")
            .push_bind(filter.limit())
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let rows = query.build().fetch_all(&self.pool).await?;
        let tickets = rows.iter().map(map_ticket).collect::<ApiResult<Vec<_>>>()?;

        Ok((tickets, total))
    }

    async fn latest_ticket(&self) -> ApiResult<Option<Ticket>> {
        let row = sqlx::query(&format!(
            "{} ORDER BY t.created DESC, t.id DESC LIMIT 1",
            TICKET_SELECT
        ))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_ticket).transpose()
    }

    async fn update_ticket_with_followup(
        &self,
        ticket_id: i64,
        edit: &(dyn for<'t> Fn(&'t Ticket) -> ApiResult<TicketEdit> + Send + Sync),
    ) -> ApiResult<FollowUp> {
        let mut tx = self.pool.begin().await?;

        // Take the write lock before reading so concurrent edits serialize
        let locked = sqlx::query("UPDATE tickets SET title = title WHERE id = ?")
            .bind(ticket_id)
            .execute(&mut *tx)
            .await?;
        if locked.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Ticket {} not found", ticket_id)));
        }

        let row = sqlx::query(&format!("{} WHERE t.id = ?", TICKET_SELECT))
            .bind(ticket_id)
            .fetch_one(&mut *tx)
            .await?;
        let current = map_ticket(&row)?;

        let TicketEdit {
            ticket,
            followup,
            changes,
        } = edit(&current)?;

        sqlx::query(
            "UPDATE tickets
             SET title = ?, queue_id = ?, submitter_email = ?, assigned_to = ?,
                 status = ?, description = ?, resolution = ?
             WHERE id = ?",
        )
        .bind(&ticket.title)
        .bind(ticket.queue_id)
        .bind(&ticket.submitter_email)
        .bind(ticket.assigned_to)
        .bind(ticket.status.code())
        .bind(&ticket.description)
        .bind(&ticket.resolution)
        .bind(ticket_id)
        .execute(&mut *tx)
        .await?;

        let saved = insert_followup(&mut *tx, &followup, &changes).await?;
        tx.commit().await?;

        tracing::info!("Ticket updated: id={}, followup_id={}", ticket_id, saved.id);
        Ok(saved)
    }

    async fn delete_ticket(&self, id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Ticket {} not found", id)));
        }

        tracing::info!("Ticket deleted: id={}", id);
        Ok(())
    }
}
