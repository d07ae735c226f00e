use parking_lot::Mutex;
use rand::Rng;
use std::{collections::HashSet, sync::Arc};

/// Number of characters in a session token.
pub const TOKEN_LENGTH: usize = 55;

/// Symbols a token is drawn from: 52 mixed-case ASCII letters.
pub const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// SessionStore
///
/// Contract for the session registry. A token is the whole identity of a session:
/// there is no owner and no expiry, so an issued token stays valid until revoked.
pub trait SessionStore: Send + Sync {
    /// Issues a fresh token and records it as live. Always succeeds.
    fn create(&self) -> String;
    /// Authorization predicate for every gated route.
    fn exists(&self, token: &str) -> bool;
    /// Forgets the token. Unknown tokens are a no-op, which keeps logout idempotent.
    fn revoke(&self, token: &str);
    fn count(&self) -> usize;
}

/// SessionState
///
/// The shared handle stored in `AppState`.
pub type SessionState = Arc<dyn SessionStore>;

/// Generates a token of `TOKEN_LENGTH` symbols from `TOKEN_ALPHABET` using the
/// thread-local CSPRNG.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LENGTH)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// InMemorySessionStore
///
/// Set of live tokens behind a single mutex. Every call holds the lock for its
/// whole duration.
#[derive(Default)]
pub struct InMemorySessionStore {
    tokens: Mutex<HashSet<String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self) -> String {
        let mut tokens = self.tokens.lock();
        loop {
            let token = generate_token();
            // Tokens must be unique; regenerate on collision.
            if tokens.insert(token.clone()) {
                tracing::debug!(sessions = tokens.len(), "session created");
                return token;
            }
        }
    }

    fn exists(&self, token: &str) -> bool {
        self.tokens.lock().contains(token)
    }

    fn revoke(&self, token: &str) {
        let mut tokens = self.tokens.lock();
        if tokens.remove(token) {
            tracing::debug!(sessions = tokens.len(), "session revoked");
        }
    }

    fn count(&self) -> usize {
        self.tokens.lock().len()
    }
}
