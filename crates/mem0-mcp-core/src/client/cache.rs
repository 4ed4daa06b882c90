//! Credential-keyed client cache.
//!
//! Constructing a [`Mem0Client`] builds a connection pool, so the cache
//! guarantees at most one construction per distinct API key for the life of
//! the process. The check-then-insert runs under one mutex, which also
//! serializes concurrent first-time construction for the same key. Keys are
//! compared as exact strings; no normalization is applied.
//!
//! The cache is an explicit object owned by the composition root rather than
//! a process-wide singleton, with [`ClientCache::reset`] provided for test
//! isolation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::CoreResult;

use super::mem0::{validate_api_key, Mem0Client, Mem0Config};

/// Cache of mem0 clients, one per distinct API key.
pub struct ClientCache {
    config: Mem0Config,
    clients: Mutex<HashMap<String, Arc<Mem0Client>>>,
}

impl ClientCache {
    /// Create an empty cache; all clients are built with the given config.
    pub fn new(config: Mem0Config) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Return the client for this API key, constructing it on first use.
    ///
    /// The key format is validated before the cache is consulted: a
    /// malformed key never reaches client construction.
    pub fn get_or_create(&self, api_key: &str) -> CoreResult<Arc<Mem0Client>> {
        validate_api_key(api_key)?;

        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(api_key) {
            return Ok(Arc::clone(client));
        }

        debug!("Constructing mem0 client for new API key");
        let client = Arc::new(Mem0Client::new(api_key, self.config.clone())?);
        clients.insert(api_key.to_string(), Arc::clone(&client));
        Ok(client)
    }

    /// Drop all cached clients; subsequent calls reconstruct.
    pub fn reset(&self) {
        self.clients.lock().clear();
    }

    /// Number of distinct keys with a constructed client.
    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    /// True if no client has been constructed since creation or last reset.
    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }
}
