//! Agent management service (super-admin only).

use crate::client::{Ack, ApiClient, Auth, ServiceResult};
use crate::models::{AgentStatus, Operator, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload for creating an agent account.
#[derive(Debug, Clone, Serialize)]
pub struct NewAgent {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Partial update for an existing agent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Clone)]
pub struct AgentService {
    api: ApiClient,
}

impl AgentService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /admin/agents`. Super-admin accounts are managed elsewhere and
    /// are excluded from this listing.
    pub async fn list(&self) -> ServiceResult<Vec<Operator>> {
        let response: ListAgentsResponse = self.api.get("/admin/agents").await?;
        Ok(response
            .data
            .into_iter()
            .map(map_agent)
            .filter(|agent| agent.role != Role::SuperAdmin)
            .collect())
    }

    /// `POST /admin/agents`.
    pub async fn create(&self, agent: &NewAgent) -> ServiceResult<()> {
        let _: Ack = self.api.post("/admin/agents", agent, Auth::Operator).await?;
        Ok(())
    }

    /// `PUT /admin/agents/:id`.
    pub async fn update(&self, id: &str, update: &AgentUpdate) -> ServiceResult<()> {
        let _: Ack = self
            .api
            .put(&format!("/admin/agents/{id}"), update, Auth::Operator)
            .await?;
        Ok(())
    }

    /// `DELETE /admin/agents/:id`.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let _: Ack = self.api.delete(&format!("/admin/agents/{id}")).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ListAgentsResponse {
    #[allow(dead_code)]
    success: bool,
    data: Vec<AgentWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    role: Role,
    #[serde(default)]
    status: Option<AgentStatus>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    last_active: Option<DateTime<Utc>>,
}

fn map_agent(wire: AgentWire) -> Operator {
    // Either an explicit status or the legacy isActive flag; absent both,
    // an account the backend returns is active.
    let status = wire.status.unwrap_or(match wire.is_active {
        Some(false) => AgentStatus::Disabled,
        _ => AgentStatus::Active,
    });
    let name = wire
        .name
        .clone()
        .or_else(|| wire.username.clone())
        .unwrap_or_else(|| wire.id.clone());
    Operator {
        id: wire.id,
        name,
        username: wire.username,
        email: wire.email,
        role: wire.role,
        status,
        last_active: wire.last_active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_wire_resolves_status_from_is_active() {
        let wire: AgentWire = serde_json::from_value(serde_json::json!({
            "_id": "agent-2",
            "username": "rohan",
            "role": "reconciliation_agent",
            "isActive": false,
            "lastActive": "2024-03-01T08:00:00Z"
        }))
        .unwrap();
        let agent = map_agent(wire);
        assert_eq!(agent.name, "rohan");
        assert_eq!(agent.role, Role::ReconciliationAgent);
        assert_eq!(agent.status, AgentStatus::Disabled);
    }

    #[test]
    fn new_agent_serializes_role_in_wire_casing() {
        let body = serde_json::to_value(NewAgent {
            username: "ananya".to_string(),
            password: "s3cret".to_string(),
            role: Role::OnboardingAgent,
        })
        .unwrap();
        assert_eq!(body["role"], "OnboardingAgent");
    }
}
