//! Bulk account creation against mail.tm.
//!
//! ```bash
//! export MAILTM_LOCAL_PARTS=$'alice\nbob\ncarol'
//! export MAILTM_PASSWORD="s3cret-pass"
//! # optional, defaults to the first domain the provider lists
//! export MAILTM_DOMAIN="example.com"
//! cargo run --example bulk_create
//! ```

use mailtm_client::{export_accounts, Client, Notification, ProvisionRequest, Provisioner};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailtm_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let local_parts = env::var("MAILTM_LOCAL_PARTS").unwrap_or_default();
    let password = env::var("MAILTM_PASSWORD").unwrap_or_default();

    let client = Client::new()?;
    let domain = match env::var("MAILTM_DOMAIN") {
        Ok(domain) if !domain.trim().is_empty() => domain,
        _ => client.default_domain().await?.domain,
    };

    let request = match ProvisionRequest::from_lines(&local_parts, &domain, &password) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("❌ {err}");
            return Ok(());
        }
    };

    let start = Notification::info(format!(
        "Creating {} account(s) under @{}",
        request.local_parts().len(),
        request.domain()
    ));
    println!("📬 {start}");

    let summary = Provisioner::new(client)
        .provision(&request, |progress| println!("   {progress}"))
        .await;

    println!(
        "\n✅ {} created, ❌ {} failed",
        summary.succeeded, summary.failed
    );
    for failure in summary.failures() {
        println!("   - {}", failure.email());
    }

    if !summary.created.is_empty() {
        println!("\n{}", export_accounts(&summary.created));
    }

    Ok(())
}
