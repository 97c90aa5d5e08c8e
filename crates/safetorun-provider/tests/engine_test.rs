//! Plan/apply tests for the declarative engine

mod common;

use common::{FakeApi, provider_with};
use safetorun_config::{Manifest, ResourceBlock};
use safetorun_provider::{ActionType, Engine, GlobalState, ProviderError, StateManager};
use std::sync::Arc;
use tempfile::tempdir;
use tokio_test::assert_ok;

fn organisation_block(name: &str) -> ResourceBlock {
    ResourceBlock::new("safetorun_organisation", name)
        .with_attribute("organisation_id", name)
        .with_attribute("organisation_name", "Acme Ltd")
        .with_attribute("admin_email", "admin@acme.io")
}

fn application_block(name: &str, application_name: &str) -> ResourceBlock {
    ResourceBlock::new("safetorun_application", name)
        .with_attribute("organisation_id", "acme")
        .with_attribute("application_name", application_name)
}

fn manifest(resources: Vec<ResourceBlock>) -> Manifest {
    Manifest {
        resources,
        data: Vec::new(),
    }
}

fn organisation_lookup(name: &str, organisation_id: &str) -> ResourceBlock {
    ResourceBlock::new("safetorun_organisation", name)
        .with_attribute("organisation_id", organisation_id)
}

#[tokio::test(start_paused = true)]
async fn test_plan_and_apply_from_empty_state() {
    let api = Arc::new(FakeApi::new());
    let provider = provider_with(api.clone());
    let engine = Engine::new(&provider);
    let mut state = GlobalState::new();

    let desired = manifest(vec![
        organisation_block("acme"),
        application_block("web", "website"),
    ]);
    let plan = engine.plan(&desired, &state).unwrap();
    assert_eq!(plan.summary().create, 2);
    assert_eq!(plan.actions[0].key, "safetorun_organisation.acme");

    let result = engine.apply(&plan, &mut state).await;
    assert!(result.is_success(), "{:?}", result.failed);
    assert_eq!(result.succeeded.len(), 2);

    let org = state.get_resource("safetorun_organisation.acme").unwrap();
    assert_eq!(org.data.id(), Some("acme"));
    let app = state.get_resource("safetorun_application.web").unwrap();
    assert_eq!(app.data.id(), Some("app-1"));
    assert_eq!(app.data.get_str("application_id"), Some("app-1"));

    // Nothing left to do
    let plan = engine.plan(&desired, &state).unwrap();
    assert!(!plan.has_changes);
    assert_eq!(plan.summary().no_change, 2);
}

#[tokio::test(start_paused = true)]
async fn test_changed_attribute_plans_update() {
    let api = Arc::new(FakeApi::new());
    let provider = provider_with(api.clone());
    let engine = Engine::new(&provider);
    let mut state = GlobalState::new();

    let before = manifest(vec![
        organisation_block("acme"),
        application_block("web", "website"),
    ]);
    let plan = engine.plan(&before, &state).unwrap();
    engine.apply(&plan, &mut state).await;

    let after = manifest(vec![
        organisation_block("acme"),
        application_block("web", "storefront"),
    ]);
    let plan = engine.plan(&after, &state).unwrap();
    let updates = plan.actions_by_type(ActionType::Update);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].key, "safetorun_application.web");

    let result = engine.apply(&plan, &mut state).await;
    assert!(result.is_success());
    assert_eq!(api.count_calls("update_application:app-1"), 1);
    assert_eq!(
        api.application("app-1").unwrap().application_name,
        "storefront"
    );

    let app = state.get_resource("safetorun_application.web").unwrap();
    assert_eq!(app.data.get_str("application_name"), Some("storefront"));
    assert_eq!(app.data.id(), Some("app-1"));
}

#[tokio::test(start_paused = true)]
async fn test_removed_block_plans_delete_first() {
    let api = Arc::new(FakeApi::new());
    let provider = provider_with(api.clone());
    let engine = Engine::new(&provider);
    let mut state = GlobalState::new();

    let plan = engine
        .plan(
            &manifest(vec![
                organisation_block("acme"),
                application_block("web", "website"),
            ]),
            &state,
        )
        .unwrap();
    engine.apply(&plan, &mut state).await;

    let plan = engine
        .plan(
            &manifest(vec![
                organisation_block("acme"),
                application_block("api", "public-api"),
            ]),
            &state,
        )
        .unwrap();
    let kinds: Vec<ActionType> = plan.actions.iter().map(|a| a.action_type).collect();
    assert_eq!(
        kinds,
        vec![ActionType::Delete, ActionType::NoOp, ActionType::Create]
    );
    assert_eq!(plan.actions[0].key, "safetorun_application.web");

    let result = engine.apply(&plan, &mut state).await;
    assert!(result.is_success());
    assert!(state.get_resource("safetorun_application.web").is_none());
    assert!(state.get_resource("safetorun_application.api").is_some());
    assert!(api.application("app-1").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_failed_action_does_not_stop_apply() {
    let api = Arc::new(FakeApi::new().with_organisation("acme"));
    let provider = provider_with(api.clone());
    let engine = Engine::new(&provider);
    let mut state = GlobalState::new();

    let plan = engine
        .plan(
            &manifest(vec![organisation_block("acme"), organisation_block("globex")]),
            &state,
        )
        .unwrap();
    let result = engine.apply(&plan, &mut state).await;

    assert!(!result.is_success());
    assert_eq!(result.failed.len(), 1);
    assert_eq!(
        result.failed[0].action_id,
        "create-safetorun_organisation.acme"
    );
    assert!(
        result.failed[0]
            .error
            .as_deref()
            .unwrap()
            .contains("org already exists: acme")
    );
    assert!(state.get_resource("safetorun_organisation.acme").is_none());
    assert!(state.get_resource("safetorun_organisation.globex").is_some());
}

#[test]
fn test_plan_rejects_invalid_blocks() {
    let provider = provider_with(Arc::new(FakeApi::new()));
    let engine = Engine::new(&provider);
    let state = GlobalState::new();

    let missing = ResourceBlock::new("safetorun_organisation", "acme")
        .with_attribute("organisation_id", "acme");
    let err = engine.plan(&manifest(vec![missing]), &state).unwrap_err();
    assert!(matches!(err, ProviderError::MissingAttribute(ref m) if m.contains("safetorun_organisation.acme")));

    let computed = application_block("web", "website").with_attribute("application_id", "app-9");
    assert!(matches!(
        engine.plan(&manifest(vec![computed]), &state),
        Err(ProviderError::InvalidAttribute { .. })
    ));

    let unknown = ResourceBlock::new("safetorun_user", "bob");
    assert!(matches!(
        engine.plan(&manifest(vec![unknown]), &state),
        Err(ProviderError::UnknownResourceType(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_destroy_removes_everything() {
    let api = Arc::new(FakeApi::new());
    let provider = provider_with(api.clone());
    let engine = Engine::new(&provider);
    let mut state = GlobalState::new();

    let plan = engine
        .plan(
            &manifest(vec![
                organisation_block("acme"),
                application_block("web", "website"),
            ]),
            &state,
        )
        .unwrap();
    engine.apply(&plan, &mut state).await;

    let plan = engine.plan_destroy(&state);
    assert_eq!(plan.summary().delete, 2);
    // Applications go before the organisation that owns them
    assert_eq!(plan.actions[0].key, "safetorun_application.web");
    assert_eq!(plan.actions[1].key, "safetorun_organisation.acme");

    let result = engine.apply(&plan, &mut state).await;
    assert!(result.is_success(), "{:?}", result.failed);
    assert!(state.resources.is_empty());
    assert_eq!(api.count_calls("delete_organisation:acme"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_destroy_deletes_applications_before_organisations() {
    let api = Arc::new(
        FakeApi::new()
            .with_organisation("acme")
            .with_application("app-9", "website"),
    );
    let provider = provider_with(api.clone());
    let engine = Engine::new(&provider);
    let mut state = GlobalState::new();

    // The application is recorded before the organisation that owns it
    engine
        .import("safetorun_application", "web", "acme/app-9", &mut state)
        .await
        .unwrap();
    engine
        .import("safetorun_organisation", "acme", "acme", &mut state)
        .await
        .unwrap();

    let plan = engine.plan_destroy(&state);
    let order: Vec<&str> = plan.actions.iter().map(|a| a.key.as_str()).collect();
    assert_eq!(
        order,
        vec!["safetorun_application.web", "safetorun_organisation.acme"]
    );

    let result = engine.apply(&plan, &mut state).await;
    assert!(result.is_success(), "{:?}", result.failed);

    let deletes: Vec<String> = api
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("delete_"))
        .collect();
    assert_eq!(
        deletes,
        vec!["delete_application:app-9", "delete_organisation:acme"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_removing_both_blocks_deletes_application_first() {
    let api = Arc::new(
        FakeApi::new()
            .with_organisation("acme")
            .with_application("app-9", "website"),
    );
    let provider = provider_with(api);
    let engine = Engine::new(&provider);
    let mut state = GlobalState::new();

    engine
        .import("safetorun_application", "web", "acme/app-9", &mut state)
        .await
        .unwrap();
    engine
        .import("safetorun_organisation", "acme", "acme", &mut state)
        .await
        .unwrap();

    let plan = engine.plan(&manifest(vec![]), &state).unwrap();
    assert_eq!(plan.actions[0].key, "safetorun_application.web");
    assert_eq!(plan.actions[1].key, "safetorun_organisation.acme");
}

#[tokio::test(start_paused = true)]
async fn test_read_data_records_lookups() {
    let api = Arc::new(FakeApi::new().with_organisation("shared"));
    let provider = provider_with(api.clone());
    let engine = Engine::new(&provider);
    let mut state = GlobalState::new();

    let mut desired = manifest(vec![organisation_block("acme")]);
    desired.data.push(organisation_lookup("shared", "shared"));

    // Data blocks never turn into actions
    let plan = engine.plan(&desired, &state).unwrap();
    assert_eq!(plan.actions.len(), 1);
    assert_eq!(api.count_calls("query_status"), 0);

    assert_eq!(engine.read_data(&desired, &mut state).await.unwrap(), 1);
    let shared = state.get_data("safetorun_organisation.shared").unwrap();
    assert_eq!(shared.id(), Some("shared"));
    assert_eq!(shared.get_str("status"), Some("InfrastructureCreated"));
    // Same key as a managed resource does not collide
    assert!(state.get_resource("safetorun_organisation.shared").is_none());

    // Lookups removed from the manifest are dropped
    desired.data.clear();
    assert_eq!(engine.read_data(&desired, &mut state).await.unwrap(), 0);
    assert!(state.data.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_read_data_fails_for_missing_organisation() {
    let provider = provider_with(Arc::new(FakeApi::new()));
    let engine = Engine::new(&provider);
    let mut state = GlobalState::new();

    let mut desired = manifest(vec![]);
    desired.data.push(organisation_lookup("ghost", "ghost"));

    let err = engine.read_data(&desired, &mut state).await.unwrap_err();
    assert!(matches!(err, ProviderError::DataSource { ref key, .. } if key == "safetorun_organisation.ghost"));
    assert!(state.data.is_empty());
}

#[test]
fn test_plan_rejects_invalid_data_blocks() {
    let provider = provider_with(Arc::new(FakeApi::new()));
    let engine = Engine::new(&provider);
    let state = GlobalState::new();

    let mut unknown = manifest(vec![]);
    unknown
        .data
        .push(ResourceBlock::new("safetorun_application", "web"));
    assert!(matches!(
        engine.plan(&unknown, &state),
        Err(ProviderError::UnknownResourceType(ref t)) if t == "safetorun_application"
    ));

    let mut missing = manifest(vec![]);
    missing
        .data
        .push(ResourceBlock::new("safetorun_organisation", "shared"));
    assert!(matches!(
        engine.plan(&missing, &state),
        Err(ProviderError::MissingAttribute(ref m)) if m.contains("safetorun_organisation.shared")
    ));

    let mut computed = manifest(vec![]);
    computed
        .data
        .push(organisation_lookup("shared", "shared").with_attribute("status", "DeleteComplete"));
    assert!(matches!(
        engine.plan(&computed, &state),
        Err(ProviderError::InvalidAttribute { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_import_then_plan() {
    let api = Arc::new(FakeApi::new().with_organisation("acme"));
    let provider = provider_with(api.clone());
    let engine = Engine::new(&provider);
    let mut state = GlobalState::new();

    assert_ok!(
        engine
            .import("safetorun_organisation", "acme", "acme", &mut state)
            .await
    );
    assert!(matches!(
        engine
            .import("safetorun_organisation", "acme", "acme", &mut state)
            .await,
        Err(ProviderError::AlreadyManaged(_))
    ));

    // Imported organisations only know their id until the next apply
    let plan = engine
        .plan(&manifest(vec![organisation_block("acme")]), &state)
        .unwrap();
    assert_eq!(plan.actions[0].action_type, ActionType::Update);
    assert_eq!(api.count_calls("create_organisation"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_reports_missing_resources() {
    let api = Arc::new(FakeApi::new().with_organisation("acme"));
    let provider = provider_with(api.clone());
    let engine = Engine::new(&provider);
    let mut state = GlobalState::new();

    engine
        .import("safetorun_organisation", "acme", "acme", &mut state)
        .await
        .unwrap();
    engine
        .import("safetorun_application", "web", "acme/app-3", &mut state)
        .await
        .unwrap();

    let result = engine.refresh(&mut state).await;
    assert!(result.is_success());
    assert_eq!(result.succeeded.len(), 2);

    api.set_statuses("acme", &[]);
    let result = engine.refresh(&mut state).await;
    assert_eq!(result.failed.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_state_round_trip_after_apply() {
    let temp_dir = tempdir().unwrap();
    let manager = StateManager::new(temp_dir.path());
    let provider = provider_with(Arc::new(FakeApi::new()));
    let engine = Engine::new(&provider);

    let mut state = manager.load().await.unwrap();
    let plan = engine
        .plan(&manifest(vec![organisation_block("acme")]), &state)
        .unwrap();
    engine.apply(&plan, &mut state).await;
    manager.save(&state).await.unwrap();

    let reloaded = manager.load().await.unwrap();
    let plan = engine
        .plan(&manifest(vec![organisation_block("acme")]), &reloaded)
        .unwrap();
    assert!(!plan.has_changes);
}
