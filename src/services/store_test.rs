use super::*;
use time::macros::datetime;

// =============================================================================
// Panel
// =============================================================================

#[test]
fn panel_parses_known_names() {
    assert_eq!("coder".parse::<Panel>().unwrap(), Panel::Coder);
    assert_eq!("tutor".parse::<Panel>().unwrap(), Panel::Tutor);
}

#[test]
fn panel_rejects_artist_and_case_variants() {
    assert!(matches!("artist".parse::<Panel>(), Err(StoreError::Invalid(_))));
    assert!("Coder".parse::<Panel>().is_err());
}

#[test]
fn panel_display_matches_column_value() {
    assert_eq!(Panel::Tutor.to_string(), "tutor");
    assert_eq!(serde_json::to_value(Panel::Coder).unwrap(), "coder");
}

#[test]
fn parse_role_round_trips_as_str() {
    for role in [Role::User, Role::Assistant] {
        assert_eq!(parse_role(role.as_str()).unwrap(), role);
    }
    assert!(parse_role("system").is_err());
}

// =============================================================================
// PanelStates
// =============================================================================

#[test]
fn panel_states_default_all_open() {
    assert_eq!(PanelStates::default(), PanelStates { coder: true, artist: true, tutor: true });
}

#[test]
fn panel_states_missing_fields_default_open() {
    let parsed: PanelStates = serde_json::from_str(r#"{"artist": false}"#).unwrap();
    assert_eq!(parsed, PanelStates { coder: true, artist: false, tutor: true });
}

// =============================================================================
// SERDE SHAPES
// =============================================================================

#[test]
fn workspace_serializes_camel_case() {
    let ws = Workspace {
        id: Uuid::nil(),
        user_id: Uuid::nil(),
        name: "Demo".into(),
        panel_states: PanelStates::default(),
        created_at: datetime!(2024-05-01 12:00 UTC),
        updated_at: datetime!(2024-05-02 08:30 UTC),
    };
    let json = serde_json::to_value(&ws).unwrap();
    assert_eq!(json["userId"], Uuid::nil().to_string());
    assert_eq!(json["panelStates"]["artist"], true);
    assert_eq!(json["createdAt"], "2024-05-01T12:00:00Z");
    assert_eq!(json["updatedAt"], "2024-05-02T08:30:00Z");
}

#[test]
fn diagram_serializes_mermaid_code() {
    let diagram = Diagram {
        id: Uuid::nil(),
        workspace_id: Uuid::nil(),
        prompt: "login flow".into(),
        mermaid_code: "graph TD\n    A --> B".into(),
        created_at: datetime!(2024-05-01 12:00 UTC),
    };
    let json = serde_json::to_value(&diagram).unwrap();
    assert_eq!(json["mermaidCode"], "graph TD\n    A --> B");
    assert_eq!(json["workspaceId"], Uuid::nil().to_string());
}

#[test]
fn message_serializes_panel_and_role() {
    let msg = ChatMessage {
        id: Uuid::nil(),
        workspace_id: Uuid::nil(),
        panel_type: Panel::Coder,
        role: Role::Assistant,
        content: "hi".into(),
        created_at: datetime!(2024-05-01 12:00 UTC),
    };
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["panelType"], "coder");
    assert_eq!(json["role"], "assistant");
}

#[test]
fn new_reminder_parses_camel_case_with_optional_fields() {
    let parsed: NewReminder =
        serde_json::from_str(r#"{"title":"Review PR","reminderDate":"2024-06-01T09:00:00Z"}"#).unwrap();
    assert_eq!(parsed.title, "Review PR");
    assert_eq!(parsed.reminder_date, datetime!(2024-06-01 09:00 UTC));
    assert!(parsed.description.is_none());
    assert!(parsed.workspace_id.is_none());
}

#[test]
fn new_reminder_requires_rfc3339_date() {
    let parsed = serde_json::from_str::<NewReminder>(r#"{"title":"x","reminderDate":"tomorrow"}"#);
    assert!(parsed.is_err());
}

#[test]
fn workspace_patch_accepts_partial_body() {
    let patch: WorkspacePatch = serde_json::from_str(r#"{"panelStates":{"coder":false}}"#).unwrap();
    assert!(patch.name.is_none());
    assert_eq!(patch.panel_states, Some(PanelStates { coder: false, artist: true, tutor: true }));
}

// =============================================================================
// clean_text
// =============================================================================

#[test]
fn clean_text_trims() {
    assert_eq!(clean_text("name", "  My space ", 50).unwrap(), "My space");
}

#[test]
fn clean_text_rejects_blank_and_long() {
    assert!(matches!(clean_text("name", "   ", 50), Err(StoreError::Invalid(msg)) if msg.contains("empty")));
    assert!(clean_text("name", &"x".repeat(51), 50).is_err());
    assert!(clean_text("name", &"é".repeat(50), 50).is_ok());
}

// =============================================================================
// LIVE DB
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::services::auth;

    async fn pool() -> PgPool {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL required");
        crate::db::init_pool(&url).await.expect("init pool")
    }

    async fn user(pool: &PgPool) -> Uuid {
        let name = format!("store{}", &Uuid::new_v4().simple().to_string()[..12]);
        auth::register(pool, &name, "password123").await.unwrap().id
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn workspace_crud_is_owner_scoped() {
        let pool = pool().await;
        let owner = user(&pool).await;
        let stranger = user(&pool).await;

        let ws = create_workspace(&pool, owner, " Project ").await.unwrap();
        assert_eq!(ws.name, "Project");
        assert_eq!(ws.panel_states, PanelStates::default());

        assert!(matches!(get_workspace(&pool, stranger, ws.id).await, Err(StoreError::NotFound)));
        assert!(list_workspaces(&pool, stranger).await.unwrap().is_empty());

        let patch = WorkspacePatch { name: None, panel_states: Some(PanelStates { tutor: false, ..PanelStates::default() }) };
        let updated = update_workspace(&pool, owner, ws.id, &patch).await.unwrap();
        assert_eq!(updated.name, "Project");
        assert!(!updated.panel_states.tutor);
        assert!(updated.updated_at >= ws.updated_at);

        assert!(!delete_workspace(&pool, stranger, ws.id).await.unwrap());
        assert!(delete_workspace(&pool, owner, ws.id).await.unwrap());
        assert!(!delete_workspace(&pool, owner, ws.id).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn messages_are_ordered_per_panel() {
        let pool = pool().await;
        let owner = user(&pool).await;
        let ws = create_workspace(&pool, owner, "Chat").await.unwrap();

        create_message(&pool, owner, ws.id, Panel::Coder, Role::User, "first").await.unwrap();
        create_message(&pool, owner, ws.id, Panel::Coder, Role::Assistant, "second").await.unwrap();
        create_message(&pool, owner, ws.id, Panel::Tutor, Role::User, "other panel").await.unwrap();

        let coder = list_messages(&pool, owner, ws.id, Panel::Coder).await.unwrap();
        let contents: Vec<&str> = coder.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);

        let stranger = user(&pool).await;
        assert!(matches!(
            create_message(&pool, stranger, ws.id, Panel::Coder, Role::User, "x").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn diagrams_newest_first_and_deletable() {
        let pool = pool().await;
        let owner = user(&pool).await;
        let ws = create_workspace(&pool, owner, "Art").await.unwrap();

        let first = create_diagram(&pool, owner, NewDiagram { workspace_id: ws.id, prompt: "a", mermaid_code: "graph TD\nA-->B" })
            .await
            .unwrap();
        let second = create_diagram(&pool, owner, NewDiagram { workspace_id: ws.id, prompt: "b", mermaid_code: "graph TD\nB-->C" })
            .await
            .unwrap();

        let listed = list_diagrams(&pool, owner, ws.id).await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);

        let stranger = user(&pool).await;
        assert!(!delete_diagram(&pool, stranger, first.id).await.unwrap());
        assert!(delete_diagram(&pool, owner, first.id).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn reminders_sorted_and_completable() {
        let pool = pool().await;
        let owner = user(&pool).await;
        let later = NewReminder {
            title: "Later".into(),
            description: Some("  ".into()),
            reminder_date: datetime!(2030-01-02 00:00 UTC),
            workspace_id: None,
        };
        let sooner = NewReminder { title: "Sooner".into(), reminder_date: datetime!(2030-01-01 00:00 UTC), ..later.clone() };

        let created = create_reminder(&pool, owner, &later).await.unwrap();
        assert!(created.description.is_none());
        create_reminder(&pool, owner, &sooner).await.unwrap();

        let titles: Vec<String> = list_reminders(&pool, owner).await.unwrap().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, ["Sooner", "Later"]);

        let done = set_reminder_completed(&pool, owner, created.id, true).await.unwrap();
        assert!(done.completed);
        assert!(delete_reminder(&pool, owner, created.id).await.unwrap());
    }
}
