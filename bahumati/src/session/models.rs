//! Session data models.

use crate::models::Operator;
use serde::{Deserialize, Serialize};

/// Operator login credentials.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The record persisted between console runs: the bearer token and the
/// operator it authenticates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub operator: Operator,
}

/// Wire shape of `POST /admin/login`.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[allow(dead_code)]
    pub success: bool,
    pub user: LoginUser,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginUser {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub role: crate::models::Role,
}
