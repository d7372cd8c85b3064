//! Credential persistence.
//!
//! The console uses [`FileStore`] (one JSON file); tests use [`MemoryStore`].
//! A corrupt or unreadable file degrades to "no session" with a warning —
//! the operator just logs in again.

use super::errors::SessionResult;
use super::models::StoredSession;
use log::warn;
use std::path::PathBuf;
use std::sync::Mutex;

/// Where the session token and operator record live between runs.
pub trait CredentialStore: Send + Sync {
    /// Synchronous read of the persisted session, if any.
    fn load(&self) -> Option<StoredSession>;

    /// Replace the persisted session.
    fn save(&self, session: &StoredSession) -> SessionResult<()>;

    /// Remove the persisted session. Idempotent.
    fn clear(&self) -> SessionResult<()>;
}

/// JSON-file-backed store.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Option<StoredSession> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&text) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("discarding unreadable session file {}: {e}", self.path.display());
                None
            }
        }
    }

    fn save(&self, session: &StoredSession) -> SessionResult<()> {
        let text = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<StoredSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Option<StoredSession> {
        self.slot.lock().expect("store lock poisoned").clone()
    }

    fn save(&self, session: &StoredSession) -> SessionResult<()> {
        *self.slot.lock().expect("store lock poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        *self.slot.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentStatus, Operator, Role};

    fn sample_session() -> StoredSession {
        StoredSession {
            token: "tok-1".to_string(),
            operator: Operator {
                id: "agent-1".to_string(),
                name: "ananya".to_string(),
                username: Some("ananya".to_string()),
                email: None,
                role: Role::OnboardingAgent,
                status: AgentStatus::Active,
                last_active: None,
            },
        }
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert!(store.load().is_none());
        store.save(&sample_session()).unwrap();
        assert_eq!(store.load().unwrap().token, "tok-1");
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn file_store_round_trips_and_clear_is_idempotent() {
        let path = std::env::temp_dir().join(format!("bahumati-session-{}.json", std::process::id()));
        let store = FileStore::new(path.clone());
        store.clear().unwrap();

        assert!(store.load().is_none());
        store.save(&sample_session()).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.operator.id, "agent-1");
        assert_eq!(loaded.operator.role, Role::OnboardingAgent);

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_file_degrades_to_no_session() {
        let path = std::env::temp_dir().join(format!("bahumati-corrupt-{}.json", std::process::id()));
        std::fs::write(&path, "{not json").unwrap();
        let store = FileStore::new(path.clone());
        assert!(store.load().is_none());
        let _ = std::fs::remove_file(path);
    }
}
