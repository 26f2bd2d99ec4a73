use crate::common::{FixtureDir, StubBackend, api_client, credentials, ok, tenant};
use claims::assert_matches;
use litecard_e2e::card_flow::{CardFlow, CardFlowError, CardFlowStep, DEFAULT_CARD_ID_FIELDS};
use litecard_e2e::fixtures::{CardFlowFixtures, FixtureError};
use serde_json::json;
use wiremock::ResponseTemplate;

fn default_fields() -> Vec<String> {
    DEFAULT_CARD_ID_FIELDS.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn created_card_id_is_used_by_the_update_step() {
    // Arrange
    let backend = StubBackend::start().await;
    backend.mount_happy_path("abc123").await;
    let fixtures = FixtureDir::new().with_card_flow_fixtures();
    let client = api_client(&backend.uri());
    let fields = default_fields();

    // Act
    let report = CardFlow::new(&client, &fields)
        .run(
            &credentials(),
            tenant(),
            CardFlowFixtures::load(&fixtures.settings).unwrap(),
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(report.card_id.as_ref().map(|id| id.as_ref()), Some("abc123"));
    let updates = backend.received_bodies("PATCH", "/api/v1/card").await;
    assert_eq!(
        updates,
        vec![json!({ "cardId": "abc123", "cardPayload": { "lastName": "Updated" } })]
    );
    // The hand-off happens in memory only
    assert_eq!(fixtures.read("update_pass.json")["cardId"], "stale-id");
}

#[tokio::test]
async fn steps_run_in_a_fixed_order() {
    let backend = StubBackend::start().await;
    backend.mount_happy_path("abc123").await;
    let fixtures = FixtureDir::new().with_card_flow_fixtures();
    let client = api_client(&backend.uri());
    let fields = default_fields();

    CardFlow::new(&client, &fields)
        .run(
            &credentials(),
            tenant(),
            CardFlowFixtures::load(&fixtures.settings).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        backend.received_calls().await,
        vec![
            "POST /api/v1/token",
            "POST /api/v1/template",
            "POST /api/v1/card",
            "PATCH /api/v1/card",
        ]
    );
}

#[tokio::test]
async fn every_step_after_authentication_sends_token_and_tenant() {
    let backend = StubBackend::start().await;
    backend.mount_happy_path("abc123").await;
    let fixtures = FixtureDir::new().with_card_flow_fixtures();
    let client = api_client(&backend.uri());
    let fields = default_fields();

    CardFlow::new(&client, &fields)
        .run(
            &credentials(),
            tenant(),
            CardFlowFixtures::load(&fixtures.settings).unwrap(),
        )
        .await
        .unwrap();

    let requests = backend.server.received_requests().await.unwrap();
    for request in requests.iter().skip(1) {
        assert_eq!(
            request.headers.get("authorization").unwrap(),
            "Bearer stub-access-token"
        );
        assert_eq!(
            request.headers.get("x-active-business-id").unwrap(),
            tenant().as_ref()
        );
    }
}

#[tokio::test]
async fn nested_card_id_shapes_are_handed_over() {
    for (response, expected) in [
        (json!({ "data": { "cardId": "from-data" } }), "from-data"),
        (json!({ "card": { "id": "from-card" } }), "from-card"),
        (json!({ "result": { "cardId": "from-result" } }), "from-result"),
        (json!({ "id": "from-id", "result": { "cardId": "ignored" } }), "from-id"),
    ] {
        let backend = StubBackend::start().await;
        backend.mount_token().await;
        backend
            .mount_create_template(ok(json!({ "templateId": "t" })))
            .await;
        backend.mount_create_pass(ok(response)).await;
        backend.mount_update_pass(ok(json!({ "success": true }))).await;
        let fixtures = FixtureDir::new().with_card_flow_fixtures();
        let client = api_client(&backend.uri());
        let fields = default_fields();

        CardFlow::new(&client, &fields)
            .run(
                &credentials(),
                tenant(),
                CardFlowFixtures::load(&fixtures.settings).unwrap(),
            )
            .await
            .unwrap();

        let updates = backend.received_bodies("PATCH", "/api/v1/card").await;
        assert_eq!(updates[0]["cardId"], expected);
    }
}

#[tokio::test]
async fn missing_card_id_falls_back_to_the_fixture_value() {
    let backend = StubBackend::start().await;
    backend.mount_token().await;
    backend
        .mount_create_template(ok(json!({ "templateId": "t" })))
        .await;
    backend
        .mount_create_pass(ok(json!({ "status": "CREATED" })))
        .await;
    backend.mount_update_pass(ok(json!({ "success": true }))).await;
    let fixtures = FixtureDir::new().with_card_flow_fixtures();
    let client = api_client(&backend.uri());
    let fields = default_fields();

    let report = CardFlow::new(&client, &fields)
        .run(
            &credentials(),
            tenant(),
            CardFlowFixtures::load(&fixtures.settings).unwrap(),
        )
        .await
        .unwrap();

    assert!(report.card_id.is_none());
    let updates = backend.received_bodies("PATCH", "/api/v1/card").await;
    assert_eq!(updates[0]["cardId"], "stale-id");
}

#[tokio::test]
async fn failing_template_creation_aborts_before_any_card_call() {
    let backend = StubBackend::start().await;
    backend.mount_token().await;
    backend
        .mount_create_template(ResponseTemplate::new(422).set_body_string("Invalid template"))
        .await;
    let fixtures = FixtureDir::new().with_card_flow_fixtures();
    let client = api_client(&backend.uri());
    let fields = default_fields();

    let outcome = CardFlow::new(&client, &fields)
        .run(
            &credentials(),
            tenant(),
            CardFlowFixtures::load(&fixtures.settings).unwrap(),
        )
        .await;

    let error = outcome.unwrap_err();
    assert_eq!(error.step(), CardFlowStep::CreateTemplate);
    assert!(format!("{:?}", error).contains("failed 422: Invalid template"));
    assert_eq!(
        backend.received_calls().await,
        vec!["POST /api/v1/token", "POST /api/v1/template"]
    );
}

#[tokio::test]
async fn rejected_credentials_abort_the_flow() {
    let backend = StubBackend::start().await;
    let fixtures = FixtureDir::new().with_card_flow_fixtures();
    let client = api_client(&backend.uri());
    let fields = default_fields();

    let outcome = CardFlow::new(&client, &fields)
        .run(
            &credentials(),
            tenant(),
            CardFlowFixtures::load(&fixtures.settings).unwrap(),
        )
        .await;

    assert_matches!(outcome, Err(CardFlowError::Authentication(_)));
}

#[tokio::test]
async fn empty_update_response_fails_the_flow() {
    let backend = StubBackend::start().await;
    backend.mount_token().await;
    backend
        .mount_create_template(ok(json!({ "templateId": "t" })))
        .await;
    backend
        .mount_create_pass(ok(json!({ "cardId": "abc123" })))
        .await;
    backend.mount_update_pass(ResponseTemplate::new(204)).await;
    let fixtures = FixtureDir::new().with_card_flow_fixtures();
    let client = api_client(&backend.uri());
    let fields = default_fields();

    let outcome = CardFlow::new(&client, &fields)
        .run(
            &credentials(),
            tenant(),
            CardFlowFixtures::load(&fixtures.settings).unwrap(),
        )
        .await;

    assert_matches!(
        outcome,
        Err(CardFlowError::EmptyResponse {
            step: CardFlowStep::UpdatePass
        })
    );
}

#[tokio::test]
async fn persisted_card_id_lands_in_the_update_fixture() {
    // Arrange
    let backend = StubBackend::start().await;
    backend.mount_happy_path("abc123").await;
    let fixtures = FixtureDir::new().with_card_flow_fixtures();
    let update_fixture = fixtures.settings.path_of(&fixtures.settings.update_pass);
    let client = api_client(&backend.uri());
    let fields = default_fields();

    // Act
    CardFlow::new(&client, &fields)
        .persisting_card_id_to(&update_fixture)
        .run(
            &credentials(),
            tenant(),
            CardFlowFixtures::load(&fixtures.settings).unwrap(),
        )
        .await
        .unwrap();

    // Assert
    let on_disk = fixtures.read("update_pass.json");
    assert_eq!(on_disk["cardId"], "abc123");
    assert_eq!(on_disk["cardPayload"]["lastName"], "Updated");
    let updates = backend.received_bodies("PATCH", "/api/v1/card").await;
    assert_eq!(updates[0]["cardId"], "abc123");
}

#[tokio::test]
async fn persisting_leaves_the_fixture_alone_without_a_card_id() {
    let backend = StubBackend::start().await;
    backend.mount_token().await;
    backend
        .mount_create_template(ok(json!({ "templateId": "t" })))
        .await;
    backend
        .mount_create_pass(ok(json!({ "status": "CREATED" })))
        .await;
    backend.mount_update_pass(ok(json!({ "success": true }))).await;
    let fixtures = FixtureDir::new().with_card_flow_fixtures();
    let update_fixture = fixtures.settings.path_of(&fixtures.settings.update_pass);
    let before = std::fs::read_to_string(&update_fixture).unwrap();
    let client = api_client(&backend.uri());
    let fields = default_fields();

    CardFlow::new(&client, &fields)
        .persisting_card_id_to(&update_fixture)
        .run(
            &credentials(),
            tenant(),
            CardFlowFixtures::load(&fixtures.settings).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&update_fixture).unwrap(), before);
}

#[tokio::test]
async fn unwritable_update_fixture_fails_before_the_update() {
    let backend = StubBackend::start().await;
    backend.mount_happy_path("abc123").await;
    let fixtures = FixtureDir::new().with_card_flow_fixtures();
    let unwritable = fixtures.dir.path().join("missing").join("update_pass.json");
    let client = api_client(&backend.uri());
    let fields = default_fields();

    let outcome = CardFlow::new(&client, &fields)
        .persisting_card_id_to(&unwritable)
        .run(
            &credentials(),
            tenant(),
            CardFlowFixtures::load(&fixtures.settings).unwrap(),
        )
        .await;

    assert_matches!(
        outcome,
        Err(CardFlowError::PersistCardId(FixtureError::Write { path, .. })) if path == unwritable
    );
    assert!(
        backend
            .received_bodies("PATCH", "/api/v1/card")
            .await
            .is_empty()
    );
}
