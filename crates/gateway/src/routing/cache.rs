//! In-memory tenant resolution cache
//!
//! Caches identifier-to-tenant lookups to bound directory latency and
//! backend load. Not authoritative: entries expire on a short TTL, the map
//! is bounded with least-recently-used eviction, and expired positive
//! entries stay readable for a grace window so the resolver can serve
//! stale data when the directory is down.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use storegate_shared::{TenantId, TenantRecord};

/// Cache entry with expiration and access tracking
#[derive(Clone)]
struct CacheEntry {
    /// None means the identifier was looked up and does not resolve
    record: Option<TenantRecord>,
    expires_at: Instant,
    last_used: Instant,
}

impl CacheEntry {
    fn new(record: Option<TenantRecord>, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            record,
            expires_at: now + ttl,
            last_used: now,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }

    /// Expired entries stay usable as stale fallbacks for this long.
    fn is_within_grace(&self, grace: Duration) -> bool {
        Instant::now() <= self.expires_at + grace
    }
}

/// Thread-safe bounded tenant cache
pub struct TenantCache {
    /// Maps resolution key ("{kind}:{identifier}") -> cached lookup result
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
    grace: Duration,
}

impl TenantCache {
    pub fn new(ttl: Duration, capacity: usize, grace: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
            grace,
        }
    }

    /// Get a fresh cached result for a key.
    /// Returns Some(Some(record)) if found and valid
    /// Returns Some(None) if the key was cached as not resolving
    /// Returns None if not in cache or expired
    pub fn get(&self, key: &str) -> Option<Option<TenantRecord>> {
        let mut entries = self.entries.lock().ok()?;
        let entry = entries.get_mut(key)?;

        if entry.is_expired() {
            None
        } else {
            entry.last_used = Instant::now();
            Some(entry.record.clone())
        }
    }

    /// Get a positive record even if expired, as long as it is within the
    /// grace window. Used only when the directory backend fails.
    pub fn get_stale(&self, key: &str) -> Option<TenantRecord> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;
        if entry.is_within_grace(self.grace) {
            entry.record.clone()
        } else {
            None
        }
    }

    /// Cache a lookup result, evicting the least-recently-used entry when
    /// the map is at capacity.
    pub fn set(&self, key: &str, record: Option<TenantRecord>) {
        if let Ok(mut entries) = self.entries.lock() {
            if !entries.contains_key(key) && entries.len() >= self.capacity {
                // Linear scan; the map is bounded by capacity
                let evict = entries
                    .iter()
                    .min_by_key(|(_, e)| e.last_used)
                    .map(|(k, _)| k.clone());
                if let Some(k) = evict {
                    entries.remove(&k);
                }
            }
            entries.insert(key.to_string(), CacheEntry::new(record, self.ttl));
        }
    }

    /// Invalidate a specific key
    pub fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    /// Invalidate all entries for a tenant (useful when tenant settings change)
    pub fn invalidate_tenant(&self, tenant_id: TenantId) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, entry| {
                entry.record.as_ref().map(|r| r.id) != Some(tenant_id)
            });
        }
    }

    /// Clear entries past their grace window (call periodically for memory management)
    pub fn cleanup(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            let grace = self.grace;
            entries.retain(|_, entry| entry.is_within_grace(grace));
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        if let Ok(entries) = self.entries.lock() {
            let total = entries.len();
            let expired = entries.values().filter(|e| e.is_expired()).count();
            CacheStats {
                total_entries: total,
                expired_entries: expired,
                active_entries: total - expired,
            }
        } else {
            CacheStats::default()
        }
    }
}

/// Cache statistics
#[derive(Default, Debug)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}
