//! Per-service key lists with lazy cooldown
//!
//! Each service owns one ordered list of key entries; an entry carries the key and
//! its status together. Selection always scans from the first declared key, so a
//! primary key is preferred again as soon as its cooldown is over.
//!
//! Cooldown transitions happen on read: when a failed key is checked and its
//! cooldown has elapsed, it transitions back to Available without a timer.

use std::collections::HashMap;
use std::time::Duration;

use common::{EnvSource, Secret};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::loader::{ServiceKeys, collect_keys};

/// Runtime status of a single key.
///
/// Transitions:
/// - Available → Failed (upstream rejected the key)
/// - Failed → Failed (rejected again, timestamp refreshed)
/// - Failed → Available (cooldown elapsed, on next selection)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Available,
    Failed { at: Instant },
}

impl KeyStatus {
    /// Status label for health/logging.
    pub fn label(&self) -> &'static str {
        match self {
            KeyStatus::Available => "available",
            KeyStatus::Failed { .. } => "cooling_down",
        }
    }
}

struct KeyEntry {
    key: Secret<String>,
    status: KeyStatus,
}

/// A key handed out by the pool, ready for a request.
#[derive(Debug, Clone)]
pub struct SelectedKey {
    pub service: String,
    /// Position in the service's declaration order.
    pub index: usize,
    pub key: Secret<String>,
}

/// Keys for every configured service plus the shared cooldown policy.
///
/// The service map is fixed after construction. Each service's entries sit
/// behind their own mutex so status updates from concurrent callers are
/// serialized per service.
pub struct CredentialPool {
    services: HashMap<String, Mutex<Vec<KeyEntry>>>,
    cooldown: Duration,
}

impl CredentialPool {
    /// Create an empty pool. Register services with `insert_service`.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            services: HashMap::new(),
            cooldown,
        }
    }

    /// Build a pool from an env source, reading each service's keys from its prefix.
    pub fn from_source(services: &[ServiceKeys], source: &EnvSource, cooldown: Duration) -> Self {
        let mut pool = Self::new(cooldown);
        for service in services {
            let keys = collect_keys(source, &service.env_prefix);
            pool.insert_service(&service.name, keys);
        }
        pool
    }

    /// Register (or replace) a service's keys. All keys start Available; empty
    /// strings are dropped, and a repeated key keeps only its first position.
    pub fn insert_service(&mut self, name: &str, keys: Vec<String>) {
        let mut entries: Vec<KeyEntry> = Vec::with_capacity(keys.len());
        let mut duplicates = 0usize;
        for key in keys {
            if key.is_empty() {
                continue;
            }
            // mark_failed looks keys up by value, so each value must appear once.
            if entries.iter().any(|e| e.key.expose() == &key) {
                duplicates += 1;
                continue;
            }
            entries.push(KeyEntry {
                key: Secret::new(key),
                status: KeyStatus::Available,
            });
        }
        if duplicates > 0 {
            warn!(service = name, duplicates, "duplicate keys ignored");
        }
        info!(service = name, keys = entries.len(), "service keys loaded");
        self.services.insert(name.to_string(), Mutex::new(entries));
    }

    /// The key to use right now for `service`, if any.
    ///
    /// Scans in declaration order. A failed key whose cooldown has elapsed is
    /// flipped back to Available and returned. Unknown services, empty lists,
    /// and lists where every key is still cooling down all yield `None`.
    pub async fn get_key(&self, service: &str) -> Option<SelectedKey> {
        let Some(entries) = self.services.get(service) else {
            debug!(service, "unknown service, no key");
            return None;
        };
        let mut entries = entries.lock().await;
        let now = Instant::now();

        for (index, entry) in entries.iter_mut().enumerate() {
            if let KeyStatus::Failed { at } = entry.status {
                if now.duration_since(at) < self.cooldown {
                    continue;
                }
                info!(service, index, "cooldown expired, key available again");
                entry.status = KeyStatus::Available;
            }
            debug!(service, index, "selected key");
            return Some(SelectedKey {
                service: service.to_string(),
                index,
                key: entry.key.clone(),
            });
        }

        debug!(service, keys = entries.len(), "no eligible key");
        None
    }

    /// Put `key` into cooldown starting now.
    ///
    /// Marking an already failed key refreshes its timestamp. A key or service
    /// the pool does not know is ignored.
    pub async fn mark_failed(&self, service: &str, key: &str) {
        let Some(entries) = self.services.get(service) else {
            debug!(service, "mark_failed for unknown service ignored");
            return;
        };
        let mut entries = entries.lock().await;
        let Some(index) = entries.iter().position(|e| e.key.expose() == key) else {
            debug!(service, "mark_failed for unknown key ignored");
            return;
        };

        entries[index].status = KeyStatus::Failed { at: Instant::now() };
        warn!(
            service,
            index,
            cooldown_secs = self.cooldown.as_secs(),
            "key marked failed, switching to next"
        );
        metrics::counter!("credential_failures_total", "service" => service.to_string())
            .increment(1);
    }

    /// Number of keys configured for `service` (0 if unknown).
    pub async fn len(&self, service: &str) -> usize {
        match self.services.get(service) {
            Some(entries) => entries.lock().await.len(),
            None => 0,
        }
    }

    /// Configured service names, sorted.
    pub fn services(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot of every service's key statuses. Never includes key material.
    ///
    /// A failed key whose cooldown has already elapsed is reported as available,
    /// since the next `get_key` would select it.
    pub async fn health(&self) -> serde_json::Value {
        let now = Instant::now();
        let mut services = serde_json::Map::new();

        for name in self.services() {
            let Some(entries) = self.services.get(&name) else {
                continue;
            };
            let entries = entries.lock().await;

            let mut keys = Vec::with_capacity(entries.len());
            let mut available = 0usize;
            let mut cooling = 0usize;

            for (index, entry) in entries.iter().enumerate() {
                match entry.status {
                    KeyStatus::Failed { at } if now.duration_since(at) < self.cooldown => {
                        cooling += 1;
                        let remaining = self.cooldown - now.duration_since(at);
                        keys.push(serde_json::json!({
                            "index": index,
                            "status": entry.status.label(),
                            "cooldown_remaining_secs": remaining.as_secs()
                        }));
                    }
                    _ => {
                        available += 1;
                        keys.push(serde_json::json!({
                            "index": index,
                            "status": KeyStatus::Available.label()
                        }));
                    }
                }
            }

            services.insert(
                name,
                serde_json::json!({
                    "keys_total": entries.len(),
                    "keys_available": available,
                    "keys_cooling_down": cooling,
                    "keys": keys
                }),
            );
        }

        serde_json::json!({
            "cooldown_secs": self.cooldown.as_secs(),
            "services": services
        })
    }
}
