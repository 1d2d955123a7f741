//! Session-scoped access gates.
//!
//! Two gates share one pattern: a two-state machine that moves from Locked
//! to Unlocked on a secret match and never relocks for the lifetime of the
//! session. There is no logout and no rate limiting on guesses.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use parking_lot::RwLock;
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

use crate::store::{StoreResult, TokenStore};

/// Length of generated access tokens.
pub const TOKEN_LENGTH: usize = 12;

/// Admin-selectable validity window, in days.
pub const MIN_VALIDITY_DAYS: i64 = 1;
pub const MAX_VALIDITY_DAYS: i64 = 30;

/// One gate. The only transition is [`Gate::unlock`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Gate {
    #[default]
    Locked,
    Unlocked,
}

impl Gate {
    pub fn unlock(&mut self) {
        *self = Gate::Unlocked;
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, Gate::Unlocked)
    }
}

/// Per-browser session state: one gate for the admin panel, one for the
/// viewer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Session {
    pub admin: Gate,
    pub viewer: Gate,
}

/// In-memory session map keyed by the `sid` cookie value.
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Mint a fresh locked session and return its id.
    pub fn create(&self) -> String {
        let sid = generate_session_id();
        self.sessions.write().insert(sid.clone(), Session::default());
        sid
    }

    pub fn get(&self, sid: &str) -> Option<Session> {
        self.sessions.read().get(sid).copied()
    }

    /// Unlock the admin gate, creating the session if the id is unknown.
    pub fn unlock_admin(&self, sid: &str) {
        self.sessions
            .write()
            .entry(sid.to_string())
            .or_default()
            .admin
            .unlock();
    }

    /// Unlock the viewer gate, creating the session if the id is unknown.
    pub fn unlock_viewer(&self, sid: &str) {
        self.sessions
            .write()
            .entry(sid.to_string())
            .or_default()
            .viewer
            .unlock();
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide whether an access code opens the viewer gate.
///
/// The master key is checked first and short-circuits: a code equal to the
/// master key never touches the store.
pub async fn viewer_secret_matches(
    store: &dyn TokenStore,
    master_key: &str,
    code: &str,
) -> StoreResult<bool> {
    if code == master_key {
        return Ok(true);
    }
    store.find_valid(code).await
}

/// Generate a random alphanumeric access token.
pub fn generate_access_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Generate an opaque session id.
fn generate_session_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let mut hasher = Sha256::new();

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    hasher.update(timestamp.to_le_bytes());

    let nonce: [u8; 16] = rand::thread_rng().gen();
    hasher.update(nonce);

    let result = hasher.finalize();
    BASE64.encode(&result[..24]) // 24 bytes = 32 base64 chars
}
