//! mail.tm async client implementation.
//!
//! This module provides an async [`Client`] and [`ClientBuilder`] for interacting with
//! the mail.tm temporary email API.
//!
//! Typical flow:
//! 1) Build a client (`Client::new` or `Client::builder().build()`)
//! 2) Pick a domain via [`Client::domains`]
//! 3) Create an account via [`Client::create_account`]
//! 4) Log in via [`Client::token`]
//! 5) List the inbox via [`Client::get_messages`] and open one via [`Client::get_message`]

use crate::models::{Collection, Credentials, ErrorBody};
use crate::{Account, Domain, Error, Message, MessageDetails, Result, Token};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Async client for the mail.tm temporary email API.
///
/// A `Client` is cheap to clone at the `reqwest` level (internally shared connection pool),
/// and this type is `Clone`. Create it once and clone as needed.
///
/// The client itself is stateless with respect to accounts: authenticated calls take the
/// [`Token`] returned by [`Client::token`].
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    proxy: Option<String>,
    user_agent: String,
    base_url: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("http", &"<reqwest::Client>")
            .field("proxy", &self.proxy)
            .field("user_agent", &self.user_agent)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Client {
    /// Create a [`ClientBuilder`] for configuring a new client.
    ///
    /// Use this when you need to set a proxy, a timeout, or point at another base URL.
    ///
    /// # Examples
    /// ```no_run
    /// # use mailtm_client::Client;
    /// # fn main() -> Result<(), mailtm_client::Error> {
    /// let client = Client::builder()
    ///     .user_agent("my-app/1.0")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new client using default settings.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Get the proxy URL configured for this client (if any).
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Base URL all endpoints are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List the domains accounts can be created under.
    ///
    /// The provider returns them in its preferred order; callers that need a default
    /// should take the first entry (see [`Client::default_domain`]).
    ///
    /// # Errors
    /// Returns an error if the request fails or the response is not a domain collection.
    pub async fn domains(&self) -> Result<Vec<Domain>> {
        let url = self.url("/domains");
        let collection: Collection<Domain> = self.request(self.http.get(&url), &url, None).await?;
        Ok(collection.member)
    }

    /// First domain advertised by the provider.
    ///
    /// # Errors
    /// Returns [`Error::NoDomains`] when the provider lists none.
    pub async fn default_domain(&self) -> Result<Domain> {
        self.domains().await?.into_iter().next().ok_or(Error::NoDomains)
    }

    /// Create an account with the given full address and password.
    ///
    /// # Errors
    /// - [`Error::RateLimited`] on HTTP 429,
    /// - [`Error::Api`] when the provider rejects the address or password,
    /// - [`Error::Request`] when no response was received.
    ///
    /// # Examples
    /// ```no_run
    /// # use mailtm_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), mailtm_client::Error> {
    /// let client = Client::new()?;
    /// let domain = client.default_domain().await?;
    /// let account = client
    ///     .create_account(&format!("myalias@{}", domain.domain), "hunter22")
    ///     .await?;
    /// println!("{}", account.address);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_account(&self, address: &str, password: &str) -> Result<Account> {
        let url = self.url("/accounts");
        let body = Credentials { address, password };
        self.request(self.http.post(&url).json(&body), &url, None)
            .await
    }

    /// Log in and obtain a bearer token for the account.
    ///
    /// # Errors
    /// Returns [`Error::Api`] with the provider's description on bad credentials.
    pub async fn token(&self, address: &str, password: &str) -> Result<Token> {
        let url = self.url("/token");
        let body = Credentials { address, password };
        self.request(self.http.post(&url).json(&body), &url, None)
            .await
    }

    /// Retrieve the inbox (first page) for the account the token belongs to.
    ///
    /// # Errors
    /// Returns an error if the request fails or the token is rejected.
    pub async fn get_messages(&self, token: &Token) -> Result<Vec<Message>> {
        let url = self.url("/messages");
        let collection: Collection<Message> = self
            .request(self.http.get(&url), &url, Some(token))
            .await?;
        Ok(collection.member)
    }

    /// Fetch the full content of a specific message.
    ///
    /// # Errors
    /// Returns an error if the request fails or the message does not exist.
    pub async fn get_message(&self, token: &Token, id: &str) -> Result<MessageDetails> {
        if id.trim().is_empty() {
            return Err(Error::Validation("message id is empty".to_string()));
        }
        let url = self.url(&format!("/messages/{id}"));
        self.request(self.http.get(&url), &url, Some(token)).await
    }

    async fn request<T>(
        &self,
        builder: reqwest::RequestBuilder,
        url: &str,
        token: Option<&Token>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let (status, body) = self.execute_request(builder, url, token).await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }

        if !status.is_success() {
            let description = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_description)
                .unwrap_or_else(|| "unknown".to_string());
            return Err(Error::Api {
                status: status.as_u16(),
                description,
            });
        }

        serde_json::from_slice::<T>(&body).map_err(|err| {
            debug!(url, body = %Self::body_snippet(&body), "response did not match expected shape");
            err.into()
        })
    }

    async fn execute_request(
        &self,
        builder: reqwest::RequestBuilder,
        url: &str,
        token: Option<&Token>,
    ) -> Result<(StatusCode, Vec<u8>)> {
        let mut headers = self.headers();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.token))
                .map_err(|_| Error::Validation("token contains invalid characters".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        debug!(url, authenticated = token.is_some(), "mail.tm request");

        let response = builder.headers(headers).send().await?;
        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            // The provider already acted on a 2xx; this must not look like a missing response.
            Err(source) if status.is_success() => {
                return Err(Error::Body {
                    status: status.as_u16(),
                    source,
                });
            }
            Err(err) => {
                debug!(url, status = status.as_u16(), error = %err, "error body unreadable");
                Vec::new()
            }
        };

        debug!(url, status = status.as_u16(), bytes = body.len(), "mail.tm response");

        #[cfg(feature = "debug_responses")]
        self.log_response(status, &body);

        Ok((status, body))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn body_snippet(body: &[u8]) -> String {
        String::from_utf8_lossy(body).chars().take(200).collect()
    }

    #[cfg(feature = "debug_responses")]
    fn log_response(&self, status: StatusCode, body: &[u8]) {
        if let Ok(mut value) = serde_json::from_slice::<serde_json::Value>(body) {
            redact_tokens_in_value(&mut value);
            if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                debug!(status = status.as_u16(), "response body:\n{pretty}");
                return;
            }
        }

        let body_text = String::from_utf8_lossy(body);
        debug!(status = status.as_u16(), "response body:\n{}", redact_tokens_in_text(&body_text));
    }

    /// Construct the HTTP headers shared by every request.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/ld+json, application/json"));

        headers
    }
}

#[cfg(feature = "debug_responses")]
fn redact_tokens_in_value(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key.to_lowercase().contains("token") || key == "password" {
                    *val = serde_json::Value::String("<redacted>".to_string());
                } else {
                    redact_tokens_in_value(val);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                redact_tokens_in_value(item);
            }
        }
        _ => {}
    }
}

#[cfg(feature = "debug_responses")]
fn redact_tokens_in_text(raw: &str) -> String {
    let patterns = [
        r#"(?i)("token"\s*:\s*")[^"]*(")"#,
        r#"(?i)("password"\s*:\s*")[^"]*(")"#,
        r"(?i)(Bearer\s+)[A-Za-z0-9._\-]+",
    ];

    let mut redacted = raw.to_string();
    for pattern in patterns {
        if let Ok(re) = regex::Regex::new(pattern) {
            redacted = re
                .replace_all(&redacted, |caps: &regex::Captures<'_>| {
                    if caps.len() >= 3 {
                        format!("{}<redacted>{}", &caps[1], &caps[2])
                    } else {
                        format!("{}<redacted>", &caps[1])
                    }
                })
                .to_string();
        }
    }

    redacted
}

const BASE_URL: &str = "https://api.mail.tm";
const USER_AGENT_VALUE: &str = concat!("mailtm-client/", env!("CARGO_PKG_VERSION"));

/// Builder for configuring a mail.tm [`Client`].
///
/// # Defaults
/// - No proxy
/// - Certificate verification enabled
/// - A `mailtm-client/<version>` user agent
/// - `https://api.mail.tm` as base URL
/// - Reqwest default timeout
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    proxy: Option<String>,
    danger_accept_invalid_certs: bool,
    user_agent: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            proxy: None,
            danger_accept_invalid_certs: false,
            user_agent: USER_AGENT_VALUE.to_string(),
            base_url: BASE_URL.to_string(),
            timeout: None,
        }
    }

    /// Set a proxy URL (e.g. `"http://127.0.0.1:8080"`).
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Configure whether to accept invalid TLS certificates (default: `false`).
    ///
    /// # Security
    /// Only useful for traffic inspection in controlled environments.
    pub fn danger_accept_invalid_certs(mut self, value: bool) -> Self {
        self.danger_accept_invalid_certs = value;
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the API base URL. Primarily useful for testing.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set a request timeout applied to all operations.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the [`Client`].
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed (e.g. invalid proxy URL).
    pub fn build(self) -> Result<Client> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs);

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Client {
            http: builder.build()?,
            proxy: self.proxy,
            user_agent: self.user_agent,
            base_url: self.base_url,
        })
    }
}
