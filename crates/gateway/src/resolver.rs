//! Tenant resolution
//!
//! Resolves candidate identifiers to tenant records through the cache and
//! the directory client. Concurrent misses for the same identifier are
//! coalesced: one request becomes the leader and performs the backend
//! lookup, the rest wait and consume the leader's published outcome --
//! successes and failures alike, so a down backend sees one lookup no
//! matter how many requests piled up behind it. On backend failure the
//! resolver serves the last-known-good record if it is within the grace
//! window; it never falls back to a different tenant's data.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use storegate_shared::{IdentifierKind, TenantRecord};

use crate::directory::{DirectoryClient, DirectoryError};
use crate::routing::TenantCache;

/// Resolution failure, surfaced through the normal decision channel.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("No tenant found for {0}")]
    NotFound(String),

    #[error("Tenant directory unavailable: {0}")]
    Unavailable(String),
}

/// Outcome a leader shares with its followers. `Ok(None)` is a definitive
/// miss; the error string carries the unavailability cause.
type SharedOutcome = Result<Option<TenantRecord>, String>;

/// Cache-fronted, single-flight tenant resolver
pub struct TenantResolver {
    cache: TenantCache,
    directory: DirectoryClient,
    /// In-flight lookups: key -> outcome channel. The leader for a key
    /// publishes when its lookup finishes; followers wait on it.
    in_flight: Arc<Mutex<HashMap<String, watch::Sender<Option<SharedOutcome>>>>>,
}

impl TenantResolver {
    pub fn new(cache: TenantCache, directory: DirectoryClient) -> Self {
        Self {
            cache,
            directory,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Resolve an identifier to a tenant record.
    pub async fn resolve(
        &self,
        identifier: &str,
        kind: IdentifierKind,
    ) -> Result<TenantRecord, ResolveError> {
        let key = resolution_key(identifier, kind);

        if let Some(cached) = self.cache.get(&key) {
            return cached.ok_or_else(|| ResolveError::NotFound(identifier.to_string()));
        }

        match self.acquire(&key) {
            Slot::Leader(mut guard) => {
                // Re-check: a previous leader may have finished between our
                // cache miss and acquiring the slot.
                let result = match self.cache.get(&key) {
                    Some(cached) => {
                        cached.ok_or_else(|| ResolveError::NotFound(identifier.to_string()))
                    }
                    None => self.lookup_and_cache(&key, identifier, kind).await,
                };
                guard.publish(&result);
                result
            }
            Slot::Follower(mut rx) => {
                // Consume the leader's outcome, failures included. Followers
                // never talk to the backend themselves.
                let outcome = match rx.wait_for(Option::is_some).await {
                    Ok(value) => (*value).clone(),
                    Err(_) => None,
                };
                match outcome {
                    Some(Ok(Some(record))) => Ok(record),
                    Some(Ok(None)) => Err(ResolveError::NotFound(identifier.to_string())),
                    Some(Err(message)) => Err(ResolveError::Unavailable(message)),
                    None => Err(ResolveError::Unavailable(
                        "tenant lookup aborted".to_string(),
                    )),
                }
            }
        }
    }

    /// Invalidate the cached resolution for one identifier.
    pub fn invalidate(&self, identifier: &str, kind: IdentifierKind) {
        self.cache.invalidate(&resolution_key(identifier, kind));
    }

    pub fn cache(&self) -> &TenantCache {
        &self.cache
    }

    pub fn directory(&self) -> &DirectoryClient {
        &self.directory
    }

    fn acquire(&self, key: &str) -> Slot {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(sender) = in_flight.get(key) {
            Slot::Follower(sender.subscribe())
        } else {
            let (tx, _rx) = watch::channel(None);
            in_flight.insert(key.to_string(), tx.clone());
            Slot::Leader(LeaderGuard {
                key: key.to_string(),
                in_flight: Arc::clone(&self.in_flight),
                sender: tx,
                published: false,
            })
        }
    }

    async fn lookup_and_cache(
        &self,
        key: &str,
        identifier: &str,
        kind: IdentifierKind,
    ) -> Result<TenantRecord, ResolveError> {
        match self.directory.lookup(identifier, kind).await {
            Ok(Some(record)) => {
                self.cache.set(key, Some(record.clone()));
                Ok(record)
            }
            Ok(None) => {
                self.cache.set(key, None);
                Err(ResolveError::NotFound(identifier.to_string()))
            }
            Err(err) => {
                if let Some(stale) = self.cache.get_stale(key) {
                    tracing::warn!(
                        identifier = %identifier,
                        error = %err,
                        "Directory lookup failed, serving stale tenant record"
                    );
                    Ok(stale)
                } else {
                    Err(ResolveError::Unavailable(err.to_string()))
                }
            }
        }
    }
}

fn resolution_key(identifier: &str, kind: IdentifierKind) -> String {
    format!("{}:{}", kind.as_str(), identifier)
}

enum Slot {
    Leader(LeaderGuard),
    Follower(watch::Receiver<Option<SharedOutcome>>),
}

/// Held by the leader for a key. Dropping it removes the in-flight entry
/// and wakes every follower, including when the lookup was cancelled before
/// an outcome could be published.
struct LeaderGuard {
    key: String,
    in_flight: Arc<Mutex<HashMap<String, watch::Sender<Option<SharedOutcome>>>>>,
    sender: watch::Sender<Option<SharedOutcome>>,
    published: bool,
}

impl LeaderGuard {
    fn publish(&mut self, result: &Result<TenantRecord, ResolveError>) {
        self.published = true;
        let outcome = match result {
            Ok(record) => Ok(Some(record.clone())),
            Err(ResolveError::NotFound(_)) => Ok(None),
            Err(ResolveError::Unavailable(message)) => Err(message.clone()),
        };
        let _ = self.sender.send(Some(outcome));
    }
}

impl Drop for LeaderGuard {
    fn drop(&mut self) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        in_flight.remove(&self.key);
        drop(in_flight);
        if !self.published {
            let _ = self
                .sender
                .send(Some(Err("tenant lookup aborted".to_string())));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use storegate_shared::TenantId;
    use uuid::Uuid;

    fn record_json(subdomain: &str) -> String {
        serde_json::to_string(&TenantRecord {
            id: TenantId(Uuid::new_v4()),
            name: subdomain.to_string(),
            subdomain: subdomain.to_string(),
            custom_domain: None,
        })
        .unwrap()
    }

    fn resolver_for(server: &mockito::Server, ttl: Duration, grace: Duration) -> TenantResolver {
        let cache = TenantCache::new(ttl, 64, grace);
        let directory =
            DirectoryClient::new(&server.url(), Duration::from_millis(500)).unwrap();
        TenantResolver::new(cache, directory)
    }

    #[tokio::test]
    async fn test_resolve_caches_positive_result() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tenants/by-subdomain/joes-coffee")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(record_json("joes-coffee"))
            .expect(1)
            .create_async()
            .await;

        let resolver =
            resolver_for(&server, Duration::from_secs(60), Duration::from_secs(300));

        let first = resolver
            .resolve("joes-coffee", IdentifierKind::Subdomain)
            .await
            .unwrap();
        let second = resolver
            .resolve("joes-coffee", IdentifierKind::Subdomain)
            .await
            .unwrap();
        assert_eq!(first, second);
        mock.assert_async().await; // one backend call for two resolves
    }

    #[tokio::test]
    async fn test_resolve_caches_negative_result() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tenants/by-subdomain/ghost")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let resolver =
            resolver_for(&server, Duration::from_secs(60), Duration::from_secs(300));

        for _ in 0..2 {
            let err = resolver
                .resolve("ghost", IdentifierKind::Subdomain)
                .await
                .unwrap_err();
            assert!(matches!(err, ResolveError::NotFound(_)));
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_concurrent_misses_coalesce_to_one_lookup() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tenants/by-subdomain/acme")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(record_json("acme"))
            .expect(1)
            .create_async()
            .await;

        let resolver = Arc::new(resolver_for(
            &server,
            Duration::from_secs(60),
            Duration::from_secs(300),
        ));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let resolver = Arc::clone(&resolver);
            tasks.push(tokio::spawn(async move {
                resolver.resolve("acme", IdentifierKind::Subdomain).await
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_stale_served_when_backend_fails() {
        let mut server = mockito::Server::new_async().await;
        // Short TTL so the entry expires, long grace so it is still usable
        let resolver =
            resolver_for(&server, Duration::from_millis(30), Duration::from_secs(300));

        let ok = server
            .mock("GET", "/tenants/by-subdomain/acme")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(record_json("acme"))
            .expect(1)
            .create_async()
            .await;
        let fresh = resolver
            .resolve("acme", IdentifierKind::Subdomain)
            .await
            .unwrap();
        ok.assert_async().await;
        ok.remove_async().await;

        // Entry expires; the directory is now down
        tokio::time::sleep(Duration::from_millis(40)).await;
        server
            .mock("GET", "/tenants/by-subdomain/acme")
            .with_status(500)
            .create_async()
            .await;

        let stale = resolver
            .resolve("acme", IdentifierKind::Subdomain)
            .await
            .unwrap();
        assert_eq!(stale, fresh);
    }

    #[tokio::test]
    async fn test_backend_error_coalesces_to_one_lookup() {
        let mut server = mockito::Server::new_async().await;
        // One lookup plus its single retry, no matter how many callers wait
        let mock = server
            .mock("GET", "/tenants/by-subdomain/acme")
            .with_status(500)
            .expect(2)
            .create_async()
            .await;

        let resolver = Arc::new(resolver_for(
            &server,
            Duration::from_secs(60),
            Duration::from_secs(300),
        ));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let resolver = Arc::clone(&resolver);
            tasks.push(tokio::spawn(async move {
                resolver.resolve("acme", IdentifierKind::Subdomain).await
            }));
        }
        for task in tasks {
            let err = task.await.unwrap().unwrap_err();
            assert!(matches!(err, ResolveError::Unavailable(_)));
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unavailable_without_stale_record() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tenants/by-subdomain/acme")
            .with_status(500)
            .create_async()
            .await;

        let resolver =
            resolver_for(&server, Duration::from_secs(60), Duration::from_secs(300));
        let err = resolver
            .resolve("acme", IdentifierKind::Subdomain)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_invalidate_forces_fresh_lookup() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tenants/by-subdomain/acme")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(record_json("acme"))
            .expect(2)
            .create_async()
            .await;

        let resolver =
            resolver_for(&server, Duration::from_secs(60), Duration::from_secs(300));
        resolver
            .resolve("acme", IdentifierKind::Subdomain)
            .await
            .unwrap();
        resolver.invalidate("acme", IdentifierKind::Subdomain);
        resolver
            .resolve("acme", IdentifierKind::Subdomain)
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
