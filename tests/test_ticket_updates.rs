use helpdesk::domain::entities::*;
use helpdesk::infrastructure::http::middleware::ApiError;

mod helpers;
use helpers::*;

fn displays(followup: &FollowUp) -> Vec<String> {
    followup.changes.iter().map(|c| c.to_string()).collect()
}

#[tokio::test]
async fn test_update_records_one_change_per_field() {
    let test_db = setup_test_db().await;
    let state = build_test_state(&test_db.db());
    let queue = create_test_queue(&state, "Support", "support").await;
    let agent = create_test_user(&state, "agent", None, None).await;
    let ticket = create_test_ticket(&state, &queue, "Printer on fire").await;

    let (updated, followup) = state
        .ticket_service
        .update_ticket(
            ticket.id,
            UpdateTicketRequest {
                user_id: agent.id,
                title: Some("Printer smoking".to_string()),
                submitter_email: Some(None),
                description: Some(Some("Smoke only".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Printer smoking");
    assert_eq!(updated.submitter_email, None);
    assert_eq!(updated.description.as_deref(), Some("Smoke only"));

    assert_eq!(followup.title.as_deref(), Some("Updated"));
    assert_eq!(followup.user_id, agent.id);
    assert_eq!(followup.new_status, None);
    assert_eq!(
        displays(&followup),
        vec![
            "Title changed from \"Printer on fire\" to \"Printer smoking\"".to_string(),
            "Submitter E-Mail removed".to_string(),
            "Description changed from \"It does not work\" to \"Smoke only\"".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_unchanged_values_are_not_recorded() {
    let test_db = setup_test_db().await;
    let state = build_test_state(&test_db.db());
    let queue = create_test_queue(&state, "Support", "support").await;
    let agent = create_test_user(&state, "agent", None, None).await;
    let ticket = create_test_ticket(&state, &queue, "Same").await;

    let result = state
        .ticket_service
        .update_ticket(
            ticket.id,
            UpdateTicketRequest {
                user_id: agent.id,
                title: Some("Same".to_string()),
                status: Some(TicketStatus::Open),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(ApiError::BadRequest(_))));
    let followups = state.followup_service.list_for_ticket(ticket.id).await.unwrap();
    assert!(followups.is_empty());
}

#[tokio::test]
async fn test_assignment_titles_and_owner_change() {
    let test_db = setup_test_db().await;
    let state = build_test_state(&test_db.db());
    let queue = create_test_queue(&state, "Support", "support").await;
    let jane = create_test_user(&state, "jdoe", Some("Jane"), Some("Doe")).await;
    let ticket = create_test_ticket(&state, &queue, "Needs an owner").await;

    let (assigned, followup) = state
        .ticket_service
        .update_ticket(
            ticket.id,
            UpdateTicketRequest {
                user_id: jane.id,
                assigned_to: Some(Some(jane.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(assigned.assigned_to, Some(jane.id));
    assert_eq!(assigned.assigned_to_display(), "Jane Doe");
    assert_eq!(followup.title.as_deref(), Some("Assigned to Jane Doe"));
    assert_eq!(displays(&followup), vec!["Owner set to Jane Doe".to_string()]);

    let (unassigned, followup) = state
        .ticket_service
        .update_ticket(
            ticket.id,
            UpdateTicketRequest {
                user_id: jane.id,
                assigned_to: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(unassigned.assigned_to_display(), "Unassigned");
    assert_eq!(followup.title.as_deref(), Some("Unassigned"));
    assert_eq!(displays(&followup), vec!["Owner removed".to_string()]);
}

#[tokio::test]
async fn test_moving_queue_changes_reference() {
    let test_db = setup_test_db().await;
    let state = build_test_state(&test_db.db());
    let support = create_test_queue(&state, "Support", "support").await;
    let sales = create_test_queue(&state, "Sales", "sales").await;
    let agent = create_test_user(&state, "agent", None, None).await;
    let ticket = create_test_ticket(&state, &support, "Wrong queue").await;

    let (moved, followup) = state
        .ticket_service
        .update_ticket(
            ticket.id,
            UpdateTicketRequest {
                user_id: agent.id,
                queue_id: Some(sales.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(moved.reference(), format!("[sales-{}]", ticket.id));
    assert_eq!(
        displays(&followup),
        vec!["Queue changed from \"Support\" to \"Sales\"".to_string()]
    );
}

#[tokio::test]
async fn test_resolving_comment_becomes_resolution() {
    let test_db = setup_test_db().await;
    let state = build_test_state(&test_db.db());
    let queue = create_test_queue(&state, "Support", "support").await;
    let agent = create_test_user(&state, "agent", None, None).await;
    let ticket = create_test_ticket(&state, &queue, "Broken").await;

    let (resolved, followup) = state
        .ticket_service
        .add_followup(
            ticket.id,
            AddFollowUpRequest {
                user_id: agent.id,
                comment: Some("Replaced the toner".to_string()),
                public: Some(true),
                new_status: Some(TicketStatus::Resolved),
            },
        )
        .await
        .unwrap();

    assert_eq!(resolved.status, TicketStatus::Resolved);
    assert_eq!(resolved.resolution.as_deref(), Some("Replaced the toner"));
    assert_eq!(followup.title.as_deref(), Some("Resolved"));
    assert_eq!(followup.new_status, Some(TicketStatus::Resolved));
    assert!(followup.is_public());
    assert_eq!(
        displays(&followup),
        vec!["Resolution set to Replaced the toner".to_string()]
    );
}

#[tokio::test]
async fn test_opening_a_resolved_ticket_reopens_it() {
    let test_db = setup_test_db().await;
    let state = build_test_state(&test_db.db());
    let queue = create_test_queue(&state, "Support", "support").await;
    let agent = create_test_user(&state, "agent", None, None).await;
    let ticket = create_test_ticket(&state, &queue, "Flaky").await;

    state
        .ticket_service
        .add_followup(
            ticket.id,
            AddFollowUpRequest {
                user_id: agent.id,
                new_status: Some(TicketStatus::Closed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (reopened, followup) = state
        .ticket_service
        .add_followup(
            ticket.id,
            AddFollowUpRequest {
                user_id: agent.id,
                comment: Some("It broke again".to_string()),
                new_status: Some(TicketStatus::Open),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(reopened.status, TicketStatus::Reopened);
    assert_eq!(followup.new_status, Some(TicketStatus::Reopened));
    assert_eq!(followup.title.as_deref(), Some("Reopened"));
    assert!(!followup.is_public());
}

#[tokio::test]
async fn test_plain_comment() {
    let test_db = setup_test_db().await;
    let state = build_test_state(&test_db.db());
    let queue = create_test_queue(&state, "Support", "support").await;
    let agent = create_test_user(&state, "agent", None, None).await;
    let ticket = create_test_ticket(&state, &queue, "Question").await;

    let (unchanged, followup) = state
        .ticket_service
        .add_followup(
            ticket.id,
            AddFollowUpRequest {
                user_id: agent.id,
                comment: Some("  Called the customer  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(unchanged.status, TicketStatus::Open);
    assert_eq!(followup.title.as_deref(), Some("Comment"));
    assert_eq!(followup.comment.as_deref(), Some("Called the customer"));
    assert!(followup.changes.is_empty());
}

#[tokio::test]
async fn test_update_requires_existing_author_and_ticket() {
    let test_db = setup_test_db().await;
    let state = build_test_state(&test_db.db());
    let queue = create_test_queue(&state, "Support", "support").await;
    let agent = create_test_user(&state, "agent", None, None).await;
    let ticket = create_test_ticket(&state, &queue, "Orphan").await;

    let no_author = state
        .ticket_service
        .add_followup(
            ticket.id,
            AddFollowUpRequest {
                user_id: agent.id + 100,
                comment: Some("Hello".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(no_author, Err(ApiError::NotFound(_))));

    let no_ticket = state
        .ticket_service
        .add_followup(
            ticket.id + 100,
            AddFollowUpRequest {
                user_id: agent.id,
                comment: Some("Hello".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(no_ticket, Err(ApiError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_keep_both_edits() {
    let test_db = setup_test_db().await;
    let state = build_test_state(&test_db.db());
    let queue = create_test_queue(&state, "Support", "support").await;
    let agent = create_test_user(&state, "agent", None, None).await;

    for _ in 0..10 {
        let ticket = create_test_ticket(&state, &queue, "Original").await;

        let (title_update, description_update) = tokio::join!(
            state.ticket_service.update_ticket(
                ticket.id,
                UpdateTicketRequest {
                    user_id: agent.id,
                    title: Some("New title".to_string()),
                    ..Default::default()
                },
            ),
            state.ticket_service.update_ticket(
                ticket.id,
                UpdateTicketRequest {
                    user_id: agent.id,
                    description: Some(Some("New description".to_string())),
                    ..Default::default()
                },
            ),
        );
        title_update.unwrap();
        description_update.unwrap();

        let stored = state.ticket_service.get_ticket(ticket.id).await.unwrap();
        assert_eq!(stored.title, "New title");
        assert_eq!(stored.description.as_deref(), Some("New description"));

        // Each follow-up describes exactly the field its request touched
        let followups = state.followup_service.list_for_ticket(ticket.id).await.unwrap();
        assert_eq!(followups.len(), 2);
        let mut fields: Vec<&str> = followups
            .iter()
            .flat_map(|f| f.changes.iter().map(|c| c.field.as_str()))
            .collect();
        fields.sort();
        assert_eq!(fields, vec!["Description", "Title"]);
    }
}

#[tokio::test]
async fn test_update_sees_changes_made_since_it_was_requested() {
    let test_db = setup_test_db().await;
    let state = build_test_state(&test_db.db());
    let queue = create_test_queue(&state, "Support", "support").await;
    let agent = create_test_user(&state, "agent", None, None).await;
    let ticket = create_test_ticket(&state, &queue, "Stale").await;

    state
        .ticket_service
        .update_ticket(
            ticket.id,
            UpdateTicketRequest {
                user_id: agent.id,
                title: Some("Fresh".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Setting the title it already has is a no-op against the stored row
    let result = state
        .ticket_service
        .update_ticket(
            ticket.id,
            UpdateTicketRequest {
                user_id: agent.id,
                title: Some("Fresh".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::BadRequest(_))));

    let followups = state.followup_service.list_for_ticket(ticket.id).await.unwrap();
    assert_eq!(followups.len(), 1);
}
