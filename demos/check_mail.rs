//! Log in to a mail.tm mailbox and list messages with their verification codes.
//!
//! ```bash
//! export MAILTM_ADDRESS="alice@example.com"
//! export MAILTM_PASSWORD="s3cret-pass"
//! cargo run --example check_mail
//! ```

use mailtm_client::{check_mailbox, failure_notification, Client};
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

    let address = env::var("MAILTM_ADDRESS").unwrap_or_default();
    let password = env::var("MAILTM_PASSWORD").unwrap_or_default();

    let client = Client::new()?;
    let report = match check_mailbox(&client, &address, &password).await {
        Ok(report) => report,
        Err(err) => {
            eprintln!("❌ {}", failure_notification(&err));
            return Ok(());
        }
    };

    println!("🔔 {}", report.notification());
    for (index, msg) in report.messages.iter().enumerate() {
        let subject = if msg.subject.is_empty() {
            "(no subject)"
        } else {
            msg.subject.as_str()
        };
        println!("\n#{} - {} | Code: {}", index + 1, subject, msg.code);
        println!("   From: {} | {}", msg.from, msg.created_at);
    }

    Ok(())
}
