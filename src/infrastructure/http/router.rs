use crate::infrastructure::http::controllers::{followups, health, queues, tickets, users};
use crate::infrastructure::http::middleware::AppState;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// The full routing table. Every endpoint the service exposes is listed here.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Users
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/:id", get(users::get_user))
        // Queues
        .route(
            "/api/queues",
            get(queues::list_queues).post(queues::create_queue),
        )
        .route("/api/queues/slug/:slug", get(queues::get_queue_by_slug))
        .route(
            "/api/queues/:id",
            get(queues::get_queue)
                .patch(queues::update_queue)
                .delete(queues::delete_queue),
        )
        // Tickets
        .route(
            "/api/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route("/api/tickets/latest", get(tickets::latest_ticket))
        .route(
            "/api/tickets/:id",
            get(tickets::get_ticket)
                .patch(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        // Follow-ups
        .route(
            "/api/tickets/:id/followups",
            get(followups::list_ticket_followups).post(followups::add_ticket_followup),
        )
        .route("/api/followups/:id", get(followups::get_followup))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
