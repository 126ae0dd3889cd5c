//! Refresh-token store
//!
//! The set of currently valid refresh tokens. In-memory and volatile: a
//! restart logs every staff member out. The trait exists so a durable
//! implementation can be swapped in without touching call sites.

use std::collections::HashSet;

use parking_lot::RwLock;

pub trait TokenStore: Send + Sync {
    fn insert(&self, token: String);

    /// Remove a token, reporting whether it was present.
    fn remove(&self, token: &str) -> bool;

    fn contains(&self, token: &str) -> bool;
}

#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<HashSet<String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn insert(&self, token: String) {
        self.tokens.write().insert(token);
    }

    fn remove(&self, token: &str) -> bool {
        self.tokens.write().remove(token)
    }

    fn contains(&self, token: &str) -> bool {
        self.tokens.read().contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_reports_presence() {
        let store = InMemoryTokenStore::new();
        store.insert("tok".to_string());

        assert!(store.contains("tok"));
        assert!(store.remove("tok"));
        assert!(!store.remove("tok"));
        assert!(!store.contains("tok"));
    }
}
