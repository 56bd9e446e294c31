use log::{debug, warn};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

use crate::auth::{AuthScheme, Token};
use crate::error::{Result, SnapshotError};

use super::endpoints::derive_release_url;

pub(super) const CONTINUATION_HEADER: &str = "x-ms-continuationtoken";

/// Everything needed to talk to one Azure DevOps organization.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub org_url: String,
    pub token: Token,
    pub auth_scheme: AuthScheme,
    /// Release management host; derived from `org_url` when absent.
    pub release_url: Option<String>,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub concurrency: usize,
}

/// Status, headers and raw body of one HTTP exchange.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned)
    }

    pub fn continuation_token(&self) -> Option<String> {
        self.header(CONTINUATION_HEADER)
    }

    fn into_success(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(SnapshotError::Api {
                status: self.status.as_u16(),
                message: String::from_utf8_lossy(&self.body).into_owned(),
            })
        }
    }
}

/// Authenticated transport shared by the typed calls and the raw REST calls.
pub struct AzureClient {
    client: Client,
    pub org_url: Url,
    pub release_url: Url,
    token: Token,
    auth_scheme: AuthScheme,
    max_retries: u32,
    retry_delay: Duration,
    semaphore: Arc<Semaphore>,
}

impl AzureClient {
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("devops-snapshot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SnapshotError::Config(format!("Failed to create HTTP client: {e}")))?;

        let org_url = Url::parse(&settings.org_url)
            .map_err(|e| SnapshotError::Config(format!("Invalid organization URL: {e}")))?;

        if org_url.cannot_be_a_base() {
            return Err(SnapshotError::Config(format!(
                "Organization URL cannot be used as a base: {org_url}"
            )));
        }

        let release_url = match &settings.release_url {
            Some(url) => Url::parse(url)
                .map_err(|e| SnapshotError::Config(format!("Invalid release URL: {e}")))?,
            None => derive_release_url(&org_url),
        };

        Ok(Self {
            client,
            org_url,
            release_url,
            token: settings.token.clone(),
            auth_scheme: settings.auth_scheme,
            max_retries: settings.max_retries,
            retry_delay: settings.retry_delay,
            semaphore: Arc::new(Semaphore::new(settings.concurrency.max(1))),
        })
    }

    /// Attaches the authorization header derived from the stored token.
    pub fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        self.auth_scheme.apply(request, &self.token)
    }

    /// Sends one authenticated request and returns whatever the server answered.
    ///
    /// A body, when present, is sent as `application/json`. GETs are retried
    /// on network errors, 429 and 5xx; other methods are sent once. Non-2xx
    /// responses are returned as-is once retries are exhausted or not applicable.
    pub async fn send(&self, method: Method, url: &Url, body: Option<&[u8]>) -> Result<RawResponse> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| SnapshotError::Config("Request limiter was closed".to_string()))?;

        let retryable = method == Method::GET;
        let mut retry_count = 0;

        loop {
            let mut request = self.auth_request(self.client.request(method.clone(), url.clone()));
            if let Some(body) = body {
                request = request
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.to_vec());
            }

            debug!("{method} {url}");

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) if retryable && (e.is_connect() || e.is_timeout()) => {
                    if retry_count >= self.max_retries {
                        return Err(e.into());
                    }
                    warn!(
                        "Network error ({e}), retrying in {}s ({}/{})...",
                        self.retry_delay.as_secs(),
                        retry_count + 1,
                        self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    retry_count += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();

            let throttled = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

            if retryable && throttled && self.max_retries > 0 {
                if retry_count >= self.max_retries {
                    return Err(SnapshotError::ApiErrorAfterRetries {
                        status: status.as_u16(),
                        retries: self.max_retries,
                    });
                }

                warn!(
                    "Azure DevOps API error (status {status}). Waiting {}s before retry {}/{}...",
                    self.retry_delay.as_secs(),
                    retry_count + 1,
                    self.max_retries
                );

                tokio::time::sleep(self.retry_delay).await;
                retry_count += 1;
                continue;
            }

            let headers = response.headers().clone();
            let body = response.bytes().await?.to_vec();

            return Ok(RawResponse {
                status,
                headers,
                body,
            });
        }
    }

    /// Authenticated GET that treats any non-2xx status as an error.
    pub async fn get(&self, url: &Url) -> Result<RawResponse> {
        self.send(Method::GET, url, None).await?.into_success()
    }

    /// Authenticated GET of an absolute URL handed out by the service itself.
    pub async fn get_href(&self, href: &str) -> Result<Vec<u8>> {
        let url = Url::parse(href)
            .map_err(|e| SnapshotError::resolution(href, format!("invalid URL: {e}")))?;
        Ok(self.get(&url).await?.body)
    }

    /// Authenticated POST of a JSON body that treats any non-2xx status as an error.
    pub async fn post(&self, url: &Url, body: &[u8]) -> Result<RawResponse> {
        self.send(Method::POST, url, Some(body)).await?.into_success()
    }
}
