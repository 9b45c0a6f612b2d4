use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::ClientProfile;

/// Owns every registered client profile for the lifetime of the process.
///
/// Each profile sits behind its own mutex. Holding the guard returned by
/// [`ClientStore::lock`] is what serializes turns for the same client.
#[derive(Default)]
pub struct ClientStore {
    clients: RwLock<HashMap<String, Arc<Mutex<ClientProfile>>>>,
}

impl ClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile. Returns false (and keeps the existing profile)
    /// when the id is already registered.
    pub async fn register(&self, profile: ClientProfile) -> bool {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&profile.id) {
            tracing::warn!(client_id = %profile.id, "client is already registered");
            return false;
        }
        tracing::info!(client_id = %profile.id, name = %profile.name, "client registered");
        clients.insert(profile.id.clone(), Arc::new(Mutex::new(profile)));
        true
    }

    pub async fn is_registered(&self, client_id: &str) -> bool {
        self.clients.read().await.contains_key(client_id)
    }

    /// Exclusive access to a client's profile, `None` if not registered.
    pub async fn lock(&self, client_id: &str) -> Option<OwnedMutexGuard<ClientProfile>> {
        let entry = self.clients.read().await.get(client_id).cloned();
        match entry {
            Some(profile) => Some(profile.lock_owned().await),
            None => {
                tracing::warn!(client_id, "client is not registered");
                None
            }
        }
    }

    /// Copy of a client's profile, `None` if not registered.
    pub async fn snapshot(&self, client_id: &str) -> Option<ClientProfile> {
        self.lock(client_id).await.map(|guard| guard.clone())
    }

    /// Copies of every registered profile, in no particular order.
    pub async fn snapshots(&self) -> Vec<ClientProfile> {
        let entries: Vec<_> = self.clients.read().await.values().cloned().collect();
        let mut profiles = Vec::with_capacity(entries.len());
        for entry in entries {
            profiles.push(entry.lock().await.clone());
        }
        profiles
    }
}
