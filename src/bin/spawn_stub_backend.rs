// Starts a stub of the Litecard API for running `litecard-e2e` locally.
// Build with: cargo build --bin spawn_stub_backend --features stub-backend

#[cfg(feature = "stub-backend")]
#[allow(dead_code)]
mod stub_backend {
    // The path is relative to this file
    include!("../../tests/common/stub_backend.rs");
}

#[cfg(feature = "stub-backend")]
use std::io::{self, Write};

#[cfg(feature = "stub-backend")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let card_id =
        std::env::var("STUB_CARD_ID").unwrap_or_else(|_| uuid::Uuid::new_v4().to_string());

    let backend = stub_backend::StubBackend::start().await;
    backend.mount_happy_path(&card_id).await;

    // Point the runner at the stub with `APP_API__BASE_URL=<address>`
    let output = serde_json::json!({
        "address": backend.uri(),
        "card_id": card_id,
    });
    println!("{}", serde_json::to_string(&output)?);
    io::stdout().flush()?;

    tokio::signal::ctrl_c().await?;

    Ok(())
}

#[cfg(not(feature = "stub-backend"))]
fn main() {
    eprintln!("This binary requires the 'stub-backend' feature to be enabled.");
    eprintln!("Build with: cargo build --bin spawn_stub_backend --features stub-backend");
    std::process::exit(1);
}
