use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use super::{SessionToken, TokenStore};

/// Live copy of the session token shared with every view.
///
/// Created once at application start and handed to whoever needs it. All
/// mutations write through to the `TokenStore` before subscribers are told,
/// so a consumer woken by a change never reads a stale store.
///
/// Clone is cheap; clones share the same session.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn TokenStore>,
    tx: Arc<watch::Sender<Option<SessionToken>>>,
}

impl SessionContext {
    /// Create a session seeded from whatever the store already holds, so a
    /// restart keeps the user logged in.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let initial = store.read();
        debug!(authenticated = initial.is_some(), "Session context seeded from store");
        let (tx, _rx) = watch::channel(initial);
        Self {
            store,
            tx: Arc::new(tx),
        }
    }

    /// Snapshot of the current token
    pub fn token(&self) -> Option<SessionToken> {
        self.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Receiver that observes every subsequent mutation
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionToken>> {
        self.tx.subscribe()
    }

    /// The store this session writes through to
    pub fn store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.store)
    }

    /// Adopt `token` as the session credential.
    ///
    /// This is the only path by which a token enters the session.
    pub fn set_token(&self, token: SessionToken) {
        self.store.write(&token);
        self.tx.send_replace(Some(token));
        info!("Session token set");
    }

    /// Drop the session credential. Calling it on an empty session is a no-op
    /// apart from re-clearing the store.
    pub fn clear_token(&self) {
        self.store.clear();
        let previous = self.tx.send_replace(None);
        if previous.is_some() {
            info!("Session token cleared");
        }
    }
}
