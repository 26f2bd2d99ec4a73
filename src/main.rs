use anyhow::Context;
use clap::{Parser, Subcommand};
use litecard_e2e::authentication::get_token;
use litecard_e2e::bulk_update::BulkUpdate;
use litecard_e2e::card_flow::CardFlow;
use litecard_e2e::configuration::{Settings, get_configuration};
use litecard_e2e::fixtures::{CardFlowFixtures, load_email_card_map};
use litecard_e2e::telemetry::{get_subscriber, init_subscriber};
use litecard_e2e::ui::{ChromiumDriver, UiFlows};
use std::path::PathBuf;

/// Run Litecard checks against the configured backend.
#[derive(Parser)]
#[command(name = "litecard-e2e")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a template and a pass, then update the new pass
    CardFlow,
    /// Update birthdays for every mapped card and retire the first few
    BulkUpdate {
        /// Email → card id map; defaults to the configured fixture
        #[arg(long)]
        map: Option<PathBuf>,
    },
    /// Log in through the web app
    UiLogin {
        /// Continue to the create-template screen after logging in
        #[arg(long)]
        create_template: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("litecard-e2e".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let cli = Cli::parse();
    let configuration = get_configuration().context("Failed to read configuration.")?;

    match cli.command {
        Commands::CardFlow => card_flow(&configuration).await,
        Commands::BulkUpdate { map } => bulk_update(&configuration, map).await,
        Commands::UiLogin { create_template } => ui_login(&configuration, create_template).await,
    }
}

async fn card_flow(configuration: &Settings) -> anyhow::Result<()> {
    let api_client = configuration.api.client()?;
    let tenant_id = configuration.api.tenant().map_err(anyhow::Error::msg)?;
    let fixtures = CardFlowFixtures::load(&configuration.fixtures)?;

    let update_fixture = configuration
        .fixtures
        .path_of(&configuration.fixtures.update_pass);

    let mut card_flow = CardFlow::new(&api_client, &configuration.card_flow.card_id_fields);
    if configuration.card_flow.persist_card_id {
        card_flow = card_flow.persisting_card_id_to(&update_fixture);
    }
    let report = card_flow
        .run(&configuration.credentials.credentials(), tenant_id, fixtures)
        .await?;

    match &report.card_id {
        Some(card_id) => tracing::info!(%card_id, "Card flow passed"),
        None => tracing::warn!("Card flow passed without a fresh card id"),
    }
    Ok(())
}

async fn bulk_update(configuration: &Settings, map: Option<PathBuf>) -> anyhow::Result<()> {
    let api_client = configuration.api.client()?;
    let tenant_id = configuration.api.tenant().map_err(anyhow::Error::msg)?;
    let map = map.unwrap_or_else(|| {
        configuration
            .fixtures
            .path_of(&configuration.fixtures.email_to_card_id)
    });
    let entries = load_email_card_map(&map)?;

    let token = get_token(&api_client, &configuration.credentials.credentials()).await?;
    let report = BulkUpdate::new(
        &api_client,
        &token,
        Some(&tenant_id),
        configuration.bulk_update.options(),
    )
    .run(&entries)
    .await?;

    tracing::info!(
        updated = report.updated.len(),
        retired = report.retired.len(),
        skipped = report.skipped.len(),
        "Bulk update passed"
    );
    Ok(())
}

async fn ui_login(configuration: &Settings, create_template: bool) -> anyhow::Result<()> {
    let driver = ChromiumDriver::launch(&configuration.ui).await?;
    let flows = UiFlows::new(&driver, configuration.ui.timeout());

    let outcome = async {
        flows.open_login(&configuration.ui.base_url).await?;
        flows.login(&configuration.ui_credentials()).await?;
        if create_template {
            flows.create_template().await?;
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;

    driver.close().await?;
    outcome
}
