//! Tenant directory service client
//!
//! The directory service owns tenant records; the gateway only reads them.
//! Every call has a hard timeout and is retried at most once with a short
//! backoff, and only for transport errors and 5xx responses. A 404 is a
//! definitive answer and is never retried.

use std::time::Duration;

use reqwest::StatusCode;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;

use storegate_shared::{IdentifierKind, TenantRecord};

/// Backoff before the single retry.
const RETRY_BACKOFF_MS: u64 = 100;

/// Errors from the directory collaborator. This is the only place in the
/// gateway where transport failures can surface.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Tenant directory unavailable: {0}")]
    Unavailable(String),

    #[error("Tenant directory returned unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("Tenant directory returned an invalid record: {0}")]
    InvalidRecord(String),
}

impl DirectoryError {
    /// Transport errors and 5xx are worth one retry; anything else is not.
    fn is_retryable(&self) -> bool {
        matches!(self, DirectoryError::Unavailable(_))
    }
}

/// HTTP client for the tenant directory service
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl DirectoryClient {
    /// Create a client with a hard per-call timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up a tenant by identifier.
    ///
    /// Returns Ok(Some(record)) on a match, Ok(None) on a definitive 404.
    pub async fn lookup(
        &self,
        identifier: &str,
        kind: IdentifierKind,
    ) -> Result<Option<TenantRecord>, DirectoryError> {
        let url = self.lookup_url(identifier, kind);
        let strategy = ExponentialBackoff::from_millis(RETRY_BACKOFF_MS).take(1);

        RetryIf::spawn(
            strategy,
            || self.lookup_once(&url),
            DirectoryError::is_retryable,
        )
        .await
    }

    /// Liveness probe against the directory, used by the readiness endpoint.
    pub async fn ping(&self) -> Result<(), DirectoryError> {
        let response = self
            .http
            .get(format!("{}/healthz", self.base_url))
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(DirectoryError::UnexpectedStatus(response.status().as_u16()))
        }
    }

    fn lookup_url(&self, identifier: &str, kind: IdentifierKind) -> String {
        match kind {
            IdentifierKind::Subdomain => {
                format!("{}/tenants/by-subdomain/{}", self.base_url, identifier)
            }
            IdentifierKind::CustomDomain => {
                format!("{}/tenants/by-domain/{}", self.base_url, identifier)
            }
            IdentifierKind::ExplicitMerchantId => {
                format!("{}/tenants/{}", self.base_url, identifier)
            }
        }
    }

    async fn lookup_once(&self, url: &str) -> Result<Option<TenantRecord>, DirectoryError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let record = response
                    .json::<TenantRecord>()
                    .await
                    .map_err(|e| DirectoryError::InvalidRecord(e.to_string()))?;
                Ok(Some(record))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_server_error() => {
                Err(DirectoryError::Unavailable(format!("status {}", status)))
            }
            status => Err(DirectoryError::UnexpectedStatus(status.as_u16())),
        }
    }
}
