//! Session manager.

use super::errors::SessionResult;
use super::models::{Credentials, LoginResponse, StoredSession};
use super::store::CredentialStore;
use crate::client::{ApiClient, Auth};
use crate::models::{AgentStatus, Operator};
use log::info;
use std::sync::Arc;

/// Owns the login endpoint and the credential store.
///
/// Login success persists `{token, operator}`; login failure performs no
/// storage mutation. `current_operator` is a synchronous read used once at
/// startup to decide the initial authenticated state.
#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
    store: Arc<dyn CredentialStore>,
}

impl SessionManager {
    pub fn new(base_url: String, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            api: ApiClient::new(base_url),
            store,
        }
    }

    /// Authenticate an operator and persist the session.
    pub async fn login(&self, credentials: Credentials) -> SessionResult<Operator> {
        let response: LoginResponse = self
            .api
            .post("/admin/login", &credentials, Auth::None)
            .await?;

        let operator = Operator {
            id: response.user.id,
            name: response
                .user
                .name
                .unwrap_or_else(|| response.user.username.clone()),
            username: Some(response.user.username),
            email: None,
            role: response.user.role,
            status: AgentStatus::Active,
            last_active: None,
        };

        self.store.save(&StoredSession {
            token: response.token,
            operator: operator.clone(),
        })?;
        info!("operator {} logged in as {}", operator.name, operator.role);
        Ok(operator)
    }

    /// The persisted operator, if a session exists.
    pub fn current_operator(&self) -> Option<Operator> {
        self.store.load().map(|s| s.operator)
    }

    /// The persisted bearer token, if a session exists.
    pub fn token(&self) -> Option<String> {
        self.store.load().map(|s| s.token)
    }

    /// Drop the persisted session. Idempotent.
    pub fn logout(&self) -> SessionResult<()> {
        self.store.clear()?;
        info!("operator logged out");
        Ok(())
    }

    /// An API client for the configured backend carrying the current
    /// session token, ready to hand to [`crate::services::Services`].
    pub fn authenticated_client(&self) -> Option<ApiClient> {
        let session = self.store.load()?;
        Some(ApiClient::new(self.api.base_url().to_string()).with_token(session.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;

    #[tokio::test]
    async fn failed_login_stores_nothing() {
        // Nothing listens on this port: the login call fails with a
        // transport error and the store must stay empty.
        let store = Arc::new(MemoryStore::new());
        let manager = SessionManager::new("http://127.0.0.1:19999".to_string(), store.clone());

        let result = manager
            .login(Credentials {
                username: "ananya".to_string(),
                password: "wrong".to_string(),
            })
            .await;

        assert!(result.is_err());
        assert!(manager.current_operator().is_none());
        assert!(manager.token().is_none());
    }

    #[test]
    fn logout_clears_any_prior_state() {
        use crate::models::{AgentStatus, Role};

        let store = Arc::new(MemoryStore::new());
        store
            .save(&StoredSession {
                token: "tok".to_string(),
                operator: Operator {
                    id: "a1".to_string(),
                    name: "sanjay".to_string(),
                    username: None,
                    email: None,
                    role: Role::SuperAdmin,
                    status: AgentStatus::Active,
                    last_active: None,
                },
            })
            .unwrap();

        let manager = SessionManager::new("http://localhost:5000/api/v1".to_string(), store);
        assert!(manager.current_operator().is_some());

        manager.logout().unwrap();
        assert!(manager.current_operator().is_none());
        assert!(manager.token().is_none());

        // Idempotent on an already-empty store.
        manager.logout().unwrap();
    }
}
