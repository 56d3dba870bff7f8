use std::sync::{Mutex, MutexGuard};

use super::{StoredTokens, TokenStore};

/// Process-local store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<StoredTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: StoredTokens) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<StoredTokens>> {
        self.tokens
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> anyhow::Result<Option<StoredTokens>> {
        Ok(self.lock().clone())
    }

    fn save(&self, tokens: &StoredTokens) -> anyhow::Result<()> {
        *self.lock() = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self.lock() = None;
        Ok(())
    }
}
