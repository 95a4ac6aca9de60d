use std::sync::{Arc, PoisonError, RwLock};

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use pms_model::{AuthToken, HeaderError, HeaderSet};

use crate::storage::Storage;
use crate::token::TokenStore;

const X_REQUESTED_WITH: &str = "X-Requested-With";

/// The headers sent with every call of a client session.
///
/// The set is seeded once on construction. A token found at that point is
/// sent as `Authorization: token <t>`; a token saved later only takes effect
/// in a new session or through [HeaderSession::replace]. Clones share the
/// same header set.
#[derive(Debug, Clone)]
pub struct HeaderSession {
    headers: Arc<RwLock<HeaderSet>>,
    defaults: Arc<HeaderSet>,
}

fn default_headers(token: Option<&AuthToken>) -> Result<HeaderSet, HeaderError> {
    let mut headers = HeaderSet::new();
    headers.add(X_REQUESTED_WITH, "XMLHttpRequest")?;
    headers.add(ACCEPT.as_str(), "application/json")?;
    headers.add(CONTENT_TYPE.as_str(), "application/json")?;
    if let Some(token) = token {
        headers.add(AUTHORIZATION.as_str(), &token.header_value())?;
    }
    Ok(headers)
}

impl HeaderSession {
    pub fn new(token: Option<&AuthToken>) -> Result<Self, HeaderError> {
        let defaults = default_headers(token)?;
        Ok(Self {
            headers: Arc::new(RwLock::new(defaults.clone())),
            defaults: Arc::new(defaults),
        })
    }

    /// Seeds the session from the token persisted in `tokens`, if any.
    pub fn from_token_store<S: Storage>(tokens: &TokenStore<S>) -> Result<Self, HeaderError> {
        Self::new(tokens.load().as_ref())
    }

    pub fn add(&self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.write(|h| h.add(name, value))
    }

    pub fn remove(&self, name: &str) -> bool {
        self.write(|h| h.remove(name))
    }

    pub fn replace(&self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.write(|h| h.replace(name, value))
    }

    /// Restores the headers the session was seeded with.
    pub fn reset(&self) {
        let defaults = (*self.defaults).clone();
        self.write(|h| *h = defaults);
    }

    pub fn clear(&self) {
        self.write(HeaderSet::clear);
    }

    /// Copy of the current set. Every call takes one at its start, so a
    /// concurrent mutation never shows up half applied in a request.
    pub fn snapshot(&self) -> HeaderSet {
        self.headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write<R>(&self, f: impl FnOnce(&mut HeaderSet) -> R) -> R {
        let mut headers = self.headers.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use test_log::test;

    #[test]
    fn test_defaults() {
        let session = HeaderSession::new(None).unwrap();
        let headers = session.snapshot();
        assert_eq!(headers.get("x-requested-with"), Some("XMLHttpRequest"));
        assert_eq!(headers.get("accept"), Some("application/json"));
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert!(!headers.contains("authorization"));
    }

    #[test]
    fn test_token_read_once() {
        let tokens = TokenStore::new(MemoryStorage::new());
        tokens.save(&AuthToken::new("abc123")).unwrap();
        let session = HeaderSession::from_token_store(&tokens).unwrap();
        assert_eq!(session.snapshot().get("Authorization"), Some("token abc123"));

        // later changes to the stored token do not reach this session
        tokens.save(&AuthToken::new("other")).unwrap();
        assert_eq!(session.snapshot().get("Authorization"), Some("token abc123"));
    }

    #[test]
    fn test_mutations() {
        let session = HeaderSession::new(None).unwrap();
        session.add("X-Project", "1").unwrap();
        session.add("X-Project", "2").unwrap();
        assert_eq!(session.snapshot().get_all("x-project"), vec!["1", "2"]);

        session.replace("X-Project", "3").unwrap();
        assert_eq!(session.snapshot().get_all("x-project"), vec!["3"]);

        assert!(session.remove("X-Project"));
        assert!(!session.remove("X-Project"));

        assert!(session.add("bad header", "x").is_err());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let session = HeaderSession::new(None).unwrap();
        let before = session.snapshot();
        session.replace("Accept", "text/plain").unwrap();
        assert_eq!(before.get("accept"), Some("application/json"));
        assert_eq!(session.snapshot().get("accept"), Some("text/plain"));
    }

    #[test]
    fn test_reset_and_clear() {
        let session = HeaderSession::new(Some(&AuthToken::new("t"))).unwrap();
        let seeded = session.snapshot();
        session.clear();
        assert!(session.snapshot().is_empty());

        session.add("X-Extra", "1").unwrap();
        session.reset();
        assert_eq!(session.snapshot(), seeded);
    }
}
