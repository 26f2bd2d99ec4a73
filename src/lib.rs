pub mod api_client;
pub mod authentication;
pub mod bulk_update;
pub mod card_flow;
pub mod configuration;
pub mod domain;
pub mod fixtures;
pub mod telemetry;
pub mod ui;
