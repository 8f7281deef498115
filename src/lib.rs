//! mail.tm Rust Client
//!
//! An async Rust client for the mail.tm temporary email API, with sequential
//! bulk account creation that respects the provider's rate limit.
//!
//! # Example
//! ```no_run
//! use mailtm_client::{check_mailbox, export_accounts, Client, ProvisionRequest, Provisioner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailtm_client::Error> {
//!     let client = Client::new()?;
//!     let domain = client.default_domain().await?;
//!
//!     let request = ProvisionRequest::from_lines("alice\nbob", &domain.domain, "s3cret-pass")?;
//!     let summary = Provisioner::new(client.clone())
//!         .provision(&request, |progress| println!("{progress}"))
//!         .await;
//!     println!("{}", export_accounts(&summary.created));
//!
//!     if let Some(account) = summary.created.first() {
//!         let report = check_mailbox(&client, &account.email, &account.password).await?;
//!         for msg in &report.messages {
//!             println!("{} | code: {}", msg.subject, msg.code);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod code;
mod config;
mod error;
mod export;
mod inbox;
mod models;
mod notify;
mod provision;

pub use client::{Client, ClientBuilder};
pub use code::{extract_code, NO_CODE};
pub use config::ProvisionConfig;
pub use error::Error;
pub use export::export_accounts;
pub use inbox::{check_mailbox, failure_notification, CheckedMessage, InboxReport};
pub use models::{Account, Domain, Message, MessageDetails, Participant, Token};
pub use notify::{Notification, NotificationKind};
pub use provision::{
    create_single, provision, AccountCreator, AccountResult, CancelFlag, CreatedAccount, Pause,
    Progress, ProvisionRequest, ProvisionSummary, Provisioner, TokioPause,
};

/// Result type alias for mail.tm operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
