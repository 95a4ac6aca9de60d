use pms_model::{AuthToken, StoreError};

use crate::storage::{Storage, TOKEN_KEY};

/// The persisted session token, stored as `{"token": "..."}`.
#[derive(Debug, Clone)]
pub struct TokenStore<S> {
    storage: S,
}

impl<S: Storage> TokenStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn try_load(&self) -> Result<Option<AuthToken>, StoreError> {
        let Some(raw) = self.storage.get(TOKEN_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::PersistenceCorrupt {
                key: TOKEN_KEY.to_string(),
                source,
            })
    }

    /// The stored token; unreadable or corrupt data counts as no token.
    pub fn load(&self) -> Option<AuthToken> {
        self.try_load().unwrap_or_else(|e| {
            log::warn!("ignoring stored token: {e}");
            None
        })
    }

    pub fn save(&self, token: &AuthToken) -> Result<(), StoreError> {
        let raw = serde_json::to_string(token).map_err(|source| StoreError::Serialize {
            key: TOKEN_KEY.to_string(),
            source,
        })?;
        self.storage.set(TOKEN_KEY, &raw)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove(TOKEN_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use test_log::test;

    #[test]
    fn test_save_load_clear() {
        let store = TokenStore::new(MemoryStorage::new());
        assert_eq!(store.load(), None);
        store.save(&AuthToken::new("abc123")).unwrap();
        assert_eq!(store.load(), Some(AuthToken::new("abc123")));
        store.clear().unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_corrupt_token() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, r#""abc123""#).unwrap();
        let store = TokenStore::new(storage);
        assert!(store.try_load().is_err());
        assert_eq!(store.load(), None);
    }
}
