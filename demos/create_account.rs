//! Create a single mail.tm account.
//!
//! ```bash
//! export MAILTM_LOCAL_PART="alice"
//! export MAILTM_PASSWORD="s3cret-pass"
//! cargo run --example create_account
//! ```

use mailtm_client::{create_single, Client, Error, Notification};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let local_part = env::var("MAILTM_LOCAL_PART").unwrap_or_default();
    let password = env::var("MAILTM_PASSWORD").unwrap_or_default();

    let client = Client::new()?;

    println!("🌐 Available domains:");
    let domains = client.domains().await?;
    for domain in &domains {
        println!("   - @{}", domain.domain);
    }
    let Some(domain) = domains.first() else {
        return Err(Error::NoDomains.into());
    };

    let notification = match create_single(&client, &local_part, &domain.domain, &password).await {
        Ok(account) => {
            println!("\nEmail: {}\nPass:  {}", account.email, account.password);
            println!("{}", account.export_line());
            Notification::success("Account created")
        }
        Err(Error::Validation(_)) => Notification::error("Enter both a name and a password"),
        Err(err) => Notification::error(format!("Account creation failed: {}", err.reason())),
    };

    println!("\n🔔 {notification}");
    Ok(())
}
