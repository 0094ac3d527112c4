//! User session persistence
//!
//! Features:
//! - Versionless JSON record under a single storage key
//! - Lenient loading: corrupted or missing fields fall back to defaults
//! - Bounded, newest-first score history
//! - Fire-and-forget saves (failures are logged, never propagated)

pub mod storage;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use storage::{MemoryStorage, StorageBackend, StorageError};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

/// Storage key for the session record
pub const SESSION_KEY: &str = "chef_runner_data";
/// Name used when none is stored
pub const DEFAULT_USERNAME: &str = "Chef";
/// Maximum number of score records kept
pub const MAX_HISTORY: usize = 10;
pub const MAX_USERNAME_CHARS: usize = 12;
pub const MAX_EMAIL_CHARS: usize = 64;

/// A completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Unix timestamp (ms) when the run ended
    pub date: f64,
    pub score: u64,
}

/// Persisted player profile and history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub high_score: u64,
    /// Newest first, at most [`MAX_HISTORY`]
    pub history: Vec<ScoreRecord>,
}

impl Default for UserSession {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            email: None,
            high_score: 0,
            history: Vec::new(),
        }
    }
}

impl UserSession {
    /// Parse a stored record, salvaging whatever fields are well-formed.
    /// Returns `None` only when the data is not a JSON object at all.
    pub fn from_json_lenient(json: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(json).ok()?;
        let obj = value.as_object()?;

        let username = obj
            .get("username")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|s| bounded(s, MAX_USERNAME_CHARS))
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let email = obj
            .get("email")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|s| bounded(s, MAX_EMAIL_CHARS));
        let high_score = obj
            .get("highScore")
            .and_then(Value::as_f64)
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(|s| s.floor() as u64)
            .unwrap_or(0);
        let mut history: Vec<ScoreRecord> = obj
            .get("history")
            .and_then(Value::as_array)
            .map(|records| {
                records
                    .iter()
                    .filter_map(|r| serde_json::from_value(r.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        history.truncate(MAX_HISTORY);

        Some(Self {
            username,
            email,
            high_score,
            history,
        })
    }

    /// Best score including history (guards against a stale high score field)
    pub fn best(&self) -> u64 {
        self.history
            .iter()
            .map(|r| r.score)
            .max()
            .unwrap_or(0)
            .max(self.high_score)
    }
}

/// Truncate to at most `max` characters (not bytes)
fn bounded(s: &str, max: usize) -> String {
    s.trim().chars().take(max).collect()
}

/// Current wall-clock time in Unix milliseconds
pub fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }
}

/// Loads and persists the [`UserSession`]
pub struct SessionStore {
    backend: Box<dyn StorageBackend>,
}

impl SessionStore {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by memory only
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn StorageBackend {
        self.backend.as_mut()
    }

    /// Load the session, falling back to defaults on missing or corrupt data
    pub fn load(&self) -> UserSession {
        match self.backend.read(SESSION_KEY) {
            Ok(Some(json)) => match UserSession::from_json_lenient(&json) {
                Some(session) => {
                    log::info!(
                        "Loaded session for {} ({} runs)",
                        session.username,
                        session.history.len()
                    );
                    session
                }
                None => {
                    log::warn!("Stored session is corrupted, starting fresh");
                    UserSession::default()
                }
            },
            Ok(None) => {
                log::info!("No session found, starting fresh");
                UserSession::default()
            }
            Err(e) => {
                log::warn!("Failed to read session: {e}");
                UserSession::default()
            }
        }
    }

    /// Persist the session; failures are logged and swallowed
    pub fn save(&mut self, session: &UserSession) {
        let result = serde_json::to_string(session)
            .map_err(StorageError::from)
            .and_then(|json| self.backend.write(SESSION_KEY, &json));
        match result {
            Ok(()) => log::debug!("Session saved ({} runs)", session.history.len()),
            Err(e) => log::warn!("Failed to save session: {e}"),
        }
    }

    /// Record a finished run now
    pub fn add_score(&mut self, session: &UserSession, score: f64) -> UserSession {
        self.add_score_at(session, score, now_ms())
    }

    /// Record a finished run at `timestamp` (Unix ms): floors the score,
    /// prepends it to the history, trims, raises the high score, and saves
    pub fn add_score_at(&mut self, session: &UserSession, score: f64, timestamp: f64) -> UserSession {
        let score = if score.is_finite() && score > 0.0 {
            score.floor() as u64
        } else {
            0
        };
        let mut updated = session.clone();
        updated.history.insert(0, ScoreRecord { date: timestamp, score });
        updated.history.truncate(MAX_HISTORY);
        updated.high_score = updated.high_score.max(score);
        self.save(&updated);
        updated
    }

    /// Update name and email (bounded lengths) and save
    pub fn update_profile(
        &mut self,
        session: &UserSession,
        name: &str,
        email: Option<&str>,
    ) -> UserSession {
        let mut updated = session.clone();
        let name = bounded(name, MAX_USERNAME_CHARS);
        updated.username = if name.is_empty() {
            DEFAULT_USERNAME.to_string()
        } else {
            name
        };
        updated.email = email
            .map(|e| bounded(e, MAX_EMAIL_CHARS))
            .filter(|e| !e.is_empty());
        self.save(&updated);
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend that fails every operation
    struct BrokenStorage;

    impl StorageBackend for BrokenStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable)
        }
        fn write(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    fn store_with(json: &str) -> SessionStore {
        let mut storage = MemoryStorage::new();
        storage.write(SESSION_KEY, json).unwrap();
        SessionStore::new(Box::new(storage))
    }

    #[test]
    fn test_missing_data_gives_default() {
        let store = SessionStore::in_memory();
        assert_eq!(store.load(), UserSession::default());
    }

    #[test]
    fn test_corrupt_data_gives_default() {
        for junk in ["{not json", "42", "[1,2,3]", "null"] {
            assert_eq!(store_with(junk).load(), UserSession::default());
        }
    }

    #[test]
    fn test_partial_data_salvaged() {
        let store = store_with(
            r#"{"username":"","highScore":"lots","history":[{"date":1.0,"score":5},{"bad":true}]}"#,
        );
        let session = store.load();
        assert_eq!(session.username, DEFAULT_USERNAME);
        assert_eq!(session.high_score, 0);
        assert_eq!(session.history, vec![ScoreRecord { date: 1.0, score: 5 }]);
    }

    #[test]
    fn test_unreadable_backend_gives_default() {
        let mut store = SessionStore::new(Box::new(BrokenStorage));
        assert_eq!(store.load(), UserSession::default());
        // Save failure does not panic or propagate
        let session = store.add_score_at(&UserSession::default(), 10.0, 1.0);
        assert_eq!(session.high_score, 10);
    }

    #[test]
    fn test_add_score_floors_and_persists() {
        let mut store = SessionStore::in_memory();
        let session = store.load();
        let updated = store.add_score_at(&session, 1234.9, 1_700_000_000_000.0);
        assert_eq!(updated.high_score, 1234);
        assert_eq!(
            updated.history,
            vec![ScoreRecord {
                date: 1_700_000_000_000.0,
                score: 1234
            }]
        );
        // Idempotent under re-load
        assert_eq!(store.load(), updated);
        assert_eq!(store.load(), store.load());
    }

    #[test]
    fn test_lower_score_keeps_high_score() {
        let mut store = SessionStore::in_memory();
        let s = store.add_score_at(&UserSession::default(), 500.0, 1.0);
        let s = store.add_score_at(&s, 200.0, 2.0);
        assert_eq!(s.high_score, 500);
        assert_eq!(s.history[0].score, 200);
        assert_eq!(s.history[1].score, 500);
    }

    #[test]
    fn test_history_bounded_newest_first() {
        let mut store = SessionStore::in_memory();
        let mut session = UserSession::default();
        for i in 0..15 {
            session = store.add_score_at(&session, i as f64, i as f64);
        }
        assert_eq!(session.history.len(), MAX_HISTORY);
        assert_eq!(session.history[0].score, 14);
        assert_eq!(session.history.last().map(|r| r.score), Some(5));
        assert_eq!(session.high_score, 14);
    }

    #[test]
    fn test_update_profile_bounds_fields() {
        let mut store = SessionStore::in_memory();
        let session = store.update_profile(
            &UserSession::default(),
            "  Gordon Ramsay The Third ",
            Some("chef@example.com"),
        );
        assert_eq!(session.username, "Gordon Ramsa");
        assert_eq!(session.email.as_deref(), Some("chef@example.com"));
        assert_eq!(store.load(), session);

        let cleared = store.update_profile(&session, "", Some(""));
        assert_eq!(cleared.username, DEFAULT_USERNAME);
        assert_eq!(cleared.email, None);
    }

    #[test]
    fn test_negative_or_nan_score_is_zero() {
        let mut store = SessionStore::in_memory();
        let s = store.add_score_at(&UserSession::default(), f64::NAN, 1.0);
        let s = store.add_score_at(&s, -5.0, 2.0);
        assert!(s.history.iter().all(|r| r.score == 0));
    }

    #[test]
    fn test_best_uses_history() {
        let session = UserSession {
            high_score: 3,
            history: vec![ScoreRecord { date: 0.0, score: 9 }],
            ..UserSession::default()
        };
        assert_eq!(session.best(), 9);
    }
}
