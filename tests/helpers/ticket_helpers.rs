use helpdesk::bootstrap::build_app_state;
use helpdesk::config::Config;
use helpdesk::domain::entities::*;
use helpdesk::infrastructure::http::middleware::AppState;
use helpdesk::infrastructure::persistence::Database;

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        service_name: "helpdesk-test".to_string(),
        otel_exporter_endpoint: None,
        metrics_port: None,
        default_mailbox_interval: DEFAULT_MAILBOX_INTERVAL,
    }
}

pub fn build_test_state(db: &Database) -> AppState {
    build_app_state(db.clone(), &test_config())
}

pub async fn create_test_user(
    state: &AppState,
    username: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> User {
    state
        .user_service
        .create_user(CreateUserRequest {
            username: username.to_string(),
            first_name: first_name.map(String::from),
            last_name: last_name.map(String::from),
            email: None,
        })
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_queue(state: &AppState, title: &str, slug: &str) -> Queue {
    state
        .queue_service
        .create_queue(CreateQueueRequest {
            title: title.to_string(),
            slug: slug.to_string(),
            email_address: Some(format!("{}@example.com", slug)),
            ..Default::default()
        })
        .await
        .expect("Failed to create test queue")
}

pub async fn create_test_ticket(state: &AppState, queue: &Queue, title: &str) -> Ticket {
    state
        .ticket_service
        .create_ticket(CreateTicketRequest {
            title: title.to_string(),
            queue_id: queue.id,
            submitter_email: Some("customer@example.com".to_string()),
            description: Some("It does not work".to_string()),
            ..Default::default()
        })
        .await
        .expect("Failed to create test ticket")
}
