//! Sequential bulk account creation.
//!
//! A run walks the requested local-parts one at a time. Each address gets up
//! to [`ProvisionConfig::max_attempts`] create requests: HTTP 429 backs off
//! exponentially, a missing response waits a flat delay, and any other
//! rejection fails the address at once. A fixed delay separates consecutive
//! addresses. Nothing is ever sent concurrently.

use crate::{Client, Error, ProvisionConfig, Result};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Something that can create a mailbox account.
///
/// Implemented by [`Client`]; tests substitute scripted creators.
pub trait AccountCreator {
    /// Create `address` with `password`.
    ///
    /// [`Error::RateLimited`] and [`Error::Request`] are retried by the
    /// provisioner; every other error fails the address.
    fn create(&self, address: &str, password: &str) -> impl Future<Output = Result<()>> + Send;
}

impl AccountCreator for Client {
    async fn create(&self, address: &str, password: &str) -> Result<()> {
        match self.create_account(address, password).await {
            // 2xx with a body we could not read still means the account exists.
            Ok(_) | Err(Error::Json(_) | Error::Body { .. }) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// Suspension used for every wait of a run.
pub trait Pause {
    /// Wait for `duration`.
    fn pause(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// [`Pause`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Shared flag to stop a run between units of work.
///
/// Cancellation is observed before an address is started and before each
/// attempt; an in-flight request always completes.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// New, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Validated input of a bulk run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    local_parts: Vec<String>,
    domain: String,
    password: String,
}

impl ProvisionRequest {
    /// Build a request from already separated local-parts.
    ///
    /// Local-parts are trimmed and empty ones dropped. Duplicates are kept.
    ///
    /// # Errors
    /// [`Error::Validation`] when no local-part remains or `domain`/`password` is empty.
    pub fn new<I, S>(local_parts: I, domain: &str, password: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let local_parts: Vec<String> = local_parts
            .into_iter()
            .map(|part| part.as_ref().trim().to_string())
            .filter(|part| !part.is_empty())
            .collect();

        if local_parts.is_empty() {
            return Err(Error::Validation("no local-parts given".to_string()));
        }
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(Error::Validation("domain is empty".to_string()));
        }
        if password.is_empty() {
            return Err(Error::Validation("password is empty".to_string()));
        }

        Ok(Self {
            local_parts,
            domain: domain.to_string(),
            password: password.to_string(),
        })
    }

    /// Build a request from multiline text, one local-part per line.
    ///
    /// # Errors
    /// Same as [`ProvisionRequest::new`].
    pub fn from_lines(input: &str, domain: &str, password: &str) -> Result<Self> {
        Self::new(input.lines(), domain, password)
    }

    /// Local-parts in input order.
    pub fn local_parts(&self) -> &[String] {
        &self.local_parts
    }

    /// Shared domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Shared password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Full addresses (`local@domain`) in input order.
    pub fn addresses(&self) -> impl Iterator<Item = String> + '_ {
        self.local_parts
            .iter()
            .map(move |local| format!("{local}@{}", self.domain))
    }
}

/// An account that was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAccount {
    /// Full address.
    pub email: String,
    /// Password it was created with.
    pub password: String,
}

/// Terminal outcome for one local-part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountResult {
    /// The provider accepted the account.
    Created(CreatedAccount),
    /// The account was not created.
    Failed {
        /// Full address.
        email: String,
        /// Provider description or local reason.
        reason: String,
    },
}

impl AccountResult {
    /// Address this result is about.
    pub fn email(&self) -> &str {
        match self {
            AccountResult::Created(account) => &account.email,
            AccountResult::Failed { email, .. } => email,
        }
    }

    /// Whether the account was created.
    pub fn is_created(&self) -> bool {
        matches!(self, AccountResult::Created(_))
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionSummary {
    /// Number of created accounts.
    pub succeeded: usize,
    /// Number of failed addresses.
    pub failed: usize,
    /// Created accounts, in input order.
    pub created: Vec<CreatedAccount>,
    /// One result per local-part, in input order.
    pub results: Vec<AccountResult>,
}

impl ProvisionSummary {
    fn from_results(results: Vec<AccountResult>) -> Self {
        let created: Vec<CreatedAccount> = results
            .iter()
            .filter_map(|result| match result {
                AccountResult::Created(account) => Some(account.clone()),
                AccountResult::Failed { .. } => None,
            })
            .collect();

        Self {
            succeeded: created.len(),
            failed: results.len() - created.len(),
            created,
            results,
        }
    }

    /// Failed results, in input order.
    pub fn failures(&self) -> impl Iterator<Item = &AccountResult> {
        self.results.iter().filter(|result| !result.is_created())
    }
}

/// Status update emitted during a run.
///
/// `Display` renders the human-readable status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// About to make the first attempt for an address.
    Starting {
        /// One-based position in the run.
        index: usize,
        /// Number of addresses in the run.
        total: usize,
        /// Full address.
        email: String,
    },
    /// Provider answered 429; waiting before the next attempt.
    RateLimited {
        /// Full address.
        email: String,
        /// One-based number of the attempt that was rate limited.
        attempt: u32,
        /// Backoff before the next attempt.
        wait: Duration,
    },
    /// No response; waiting before the next attempt.
    TransportRetry {
        /// Full address.
        email: String,
        /// One-based number of the attempt that failed.
        attempt: u32,
        /// Delay before the next attempt.
        wait: Duration,
    },
    /// Account created.
    Created {
        /// Full address.
        email: String,
    },
    /// Address failed.
    Failed {
        /// Full address.
        email: String,
        /// Why.
        reason: String,
    },
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Starting {
                index,
                total,
                email,
            } => write!(f, "[{index}/{total}] creating {email}"),
            Progress::RateLimited {
                email,
                attempt,
                wait,
            } => write!(
                f,
                "rate limited on {email} (attempt {attempt}), waiting {}s",
                wait.as_secs()
            ),
            Progress::TransportRetry {
                email,
                attempt,
                wait,
            } => write!(
                f,
                "network error on {email} (attempt {attempt}), retrying in {}s",
                wait.as_secs()
            ),
            Progress::Created { email } => write!(f, "created {email}"),
            Progress::Failed { email, reason } => write!(f, "failed {email}: {reason}"),
        }
    }
}

const CANCELLED: &str = "cancelled";

/// Runs bulk account creation against an [`AccountCreator`].
///
/// # Examples
/// ```no_run
/// # use mailtm_client::{Client, ProvisionRequest, Provisioner};
/// # #[tokio::main]
/// # async fn main() -> Result<(), mailtm_client::Error> {
/// let client = Client::new()?;
/// let request = ProvisionRequest::from_lines("alice\nbob\n", "example.com", "secret")?;
/// let summary = Provisioner::new(client)
///     .provision(&request, |progress| println!("{progress}"))
///     .await;
/// println!("{} created, {} failed", summary.succeeded, summary.failed);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Provisioner<C, P = TokioPause> {
    creator: C,
    pause: P,
    config: ProvisionConfig,
    cancel: CancelFlag,
}

impl<C: AccountCreator> Provisioner<C> {
    /// Provisioner with the default [`ProvisionConfig`] and real sleeps.
    pub fn new(creator: C) -> Self {
        Self {
            creator,
            pause: TokioPause,
            config: ProvisionConfig::default(),
            cancel: CancelFlag::new(),
        }
    }
}

impl<C: AccountCreator, P: Pause> Provisioner<C, P> {
    /// Replace the pacing configuration.
    pub fn config(mut self, config: ProvisionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace how waits are performed.
    pub fn pause_with<Q: Pause>(self, pause: Q) -> Provisioner<C, Q> {
        Provisioner {
            creator: self.creator,
            pause,
            config: self.config,
            cancel: self.cancel,
        }
    }

    /// Observe `cancel` between units of work.
    pub fn cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// The underlying creator.
    pub fn creator(&self) -> &C {
        &self.creator
    }

    /// Create every account of `request`, one after the other.
    ///
    /// Always returns one result per local-part in input order; item failures
    /// never abort the run. `on_progress` receives a status update before each
    /// address and on every wait, success and failure.
    pub async fn provision<F>(&self, request: &ProvisionRequest, mut on_progress: F) -> ProvisionSummary
    where
        F: FnMut(&Progress),
    {
        let total = request.local_parts().len();
        let mut results = Vec::with_capacity(total);

        info!(total, domain = request.domain(), "starting bulk account creation");

        for (index, email) in request.addresses().enumerate() {
            if self.cancel.is_cancelled() {
                on_progress(&Progress::Failed {
                    email: email.clone(),
                    reason: CANCELLED.to_string(),
                });
                results.push(AccountResult::Failed {
                    email,
                    reason: CANCELLED.to_string(),
                });
                continue;
            }

            on_progress(&Progress::Starting {
                index: index + 1,
                total,
                email: email.clone(),
            });

            let result = self
                .provision_one(email, request.password(), &mut on_progress)
                .await;
            results.push(result);

            let is_last = index + 1 == total;
            if !is_last && !self.cancel.is_cancelled() {
                self.pause.pause(self.config.inter_item_delay).await;
            }
        }

        let summary = ProvisionSummary::from_results(results);
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "bulk account creation finished"
        );
        summary
    }

    async fn provision_one<F>(&self, email: String, password: &str, on_progress: &mut F) -> AccountResult
    where
        F: FnMut(&Progress),
    {
        let max_attempts = self.config.max_attempts;
        let mut attempt: u32 = 0;
        let mut last_reason = String::from("no attempt made");

        while attempt < max_attempts {
            if self.cancel.is_cancelled() {
                last_reason = CANCELLED.to_string();
                break;
            }

            match self.creator.create(&email, password).await {
                Ok(()) => {
                    info!(%email, attempt = attempt + 1, "account created");
                    on_progress(&Progress::Created {
                        email: email.clone(),
                    });
                    return AccountResult::Created(CreatedAccount {
                        email,
                        password: password.to_string(),
                    });
                }
                Err(Error::RateLimited) => {
                    let wait = self.config.rate_limit_wait(attempt);
                    warn!(%email, attempt = attempt + 1, ?wait, "rate limited");
                    on_progress(&Progress::RateLimited {
                        email: email.clone(),
                        attempt: attempt + 1,
                        wait,
                    });
                    self.pause.pause(wait).await;
                    attempt += 1;
                    last_reason = Error::RateLimited.reason();
                }
                Err(err @ Error::Request(_)) => {
                    attempt += 1;
                    last_reason = err.reason();
                    if attempt < max_attempts {
                        let wait = self.config.transport_retry_delay;
                        warn!(%email, attempt, error = %err, "request failed, retrying");
                        on_progress(&Progress::TransportRetry {
                            email: email.clone(),
                            attempt,
                            wait,
                        });
                        self.pause.pause(wait).await;
                    }
                }
                Err(err) => {
                    last_reason = err.reason();
                    break;
                }
            }
        }

        warn!(%email, reason = %last_reason, "account not created");
        on_progress(&Progress::Failed {
            email: email.clone(),
            reason: last_reason.clone(),
        });
        AccountResult::Failed {
            email,
            reason: last_reason,
        }
    }
}

/// Validate the input and create every account with `client`.
///
/// Convenience over [`ProvisionRequest::new`] plus [`Provisioner::provision`]
/// with default pacing.
///
/// # Errors
/// Only [`Error::Validation`]; per-address failures are part of the summary.
pub async fn provision<I, S, F>(
    client: &Client,
    local_parts: I,
    domain: &str,
    password: &str,
    on_progress: F,
) -> Result<ProvisionSummary>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(&Progress),
{
    let request = ProvisionRequest::new(local_parts, domain, password)?;
    Ok(Provisioner::new(client.clone())
        .provision(&request, on_progress)
        .await)
}

/// Create one account, without retries or delays.
///
/// # Errors
/// [`Error::Validation`] on empty input, otherwise whatever the creator returns.
pub async fn create_single<C: AccountCreator>(
    creator: &C,
    local_part: &str,
    domain: &str,
    password: &str,
) -> Result<CreatedAccount> {
    let request = ProvisionRequest::new([local_part], domain, password)?;
    let email = format!("{}@{}", request.local_parts()[0], request.domain());
    creator.create(&email, password).await?;
    info!(%email, "account created");
    Ok(CreatedAccount {
        email,
        password: password.to_string(),
    })
}
