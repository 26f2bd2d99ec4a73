#![cfg(feature = "live-tests")]

//! Checks against a real Litecard backend and web app.
//! Credentials come from `APP_*` variables, see `configuration/base.yaml`.

#[path = "../common/helpers.rs"]
#[allow(dead_code)]
mod helpers;

use litecard_e2e::authentication::get_token;
use litecard_e2e::bulk_update::BulkUpdate;
use litecard_e2e::card_flow::CardFlow;
use litecard_e2e::configuration::{Settings, get_configuration};
use litecard_e2e::fixtures::{CardFlowFixtures, load_email_card_map};
use litecard_e2e::ui::{ChromiumDriver, UiFlows};

fn configuration() -> Settings {
    helpers::init_tracing();
    get_configuration().expect("Failed to read configuration.")
}

#[tokio::test]
async fn card_flow_passes_against_the_backend() {
    let configuration = configuration();
    let client = configuration.api.client().unwrap();
    let fixtures = CardFlowFixtures::load(&configuration.fixtures).unwrap();

    let report = CardFlow::new(&client, &configuration.card_flow.card_id_fields)
        .run(
            &configuration.credentials.credentials(),
            configuration.api.tenant().unwrap(),
            fixtures,
        )
        .await
        .unwrap();

    assert!(report.card_id.is_some(), "create-pass returned no card id");
}

#[tokio::test]
#[ignore = "deletes the first mapped cards"]
async fn bulk_update_passes_against_the_backend() {
    let configuration = configuration();
    let client = configuration.api.client().unwrap();
    let tenant = configuration.api.tenant().unwrap();
    let entries = load_email_card_map(
        &configuration
            .fixtures
            .path_of(&configuration.fixtures.email_to_card_id),
    )
    .unwrap();
    let token = get_token(&client, &configuration.credentials.credentials())
        .await
        .unwrap();

    BulkUpdate::new(
        &client,
        &token,
        Some(&tenant),
        configuration.bulk_update.options(),
    )
    .run(&entries)
    .await
    .unwrap();
}

#[tokio::test]
async fn login_then_open_create_template() {
    let configuration = configuration();
    let driver = ChromiumDriver::launch(&configuration.ui).await.unwrap();
    let flows = UiFlows::new(&driver, configuration.ui.timeout());

    let outcome = async {
        flows.open_login(&configuration.ui.base_url).await?;
        flows.login(&configuration.ui_credentials()).await?;
        flows.create_template().await
    }
    .await;

    driver.close().await.unwrap();
    outcome.unwrap();
}
