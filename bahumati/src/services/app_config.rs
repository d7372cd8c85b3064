//! System configuration service (super-admin only): one flat singleton of
//! operational toggles.

use crate::client::{ApiClient, Auth, ServiceResult};
use crate::models::AppConfig;
use serde::Deserialize;

#[derive(Clone)]
pub struct ConfigService {
    api: ApiClient,
}

impl ConfigService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /admin/config`.
    pub async fn get(&self) -> ServiceResult<AppConfig> {
        let response: ConfigResponse = self.api.get("/admin/config").await?;
        Ok(response.data)
    }

    /// `PUT /admin/config` — full replacement; returns the stored config.
    pub async fn update(&self, config: &AppConfig) -> ServiceResult<AppConfig> {
        let response: ConfigResponse = self.api.put("/admin/config", config, Auth::Operator).await?;
        Ok(response.data)
    }
}

#[derive(Debug, Deserialize)]
struct ConfigResponse {
    #[allow(dead_code)]
    success: bool,
    data: AppConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_the_flat_singleton() {
        let response: ConfigResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "data": {
                "maintenanceMode": false,
                "minAppVersionIos": "1.2.0",
                "minAppVersionAndroid": "1.1.0",
                "supportEmail": "support@bahumati.in",
                "supportPhone": "+91-800-123-4567",
                "maxDailyWithdrawalLimit": 5000.0,
                "kycAutoApprovalEnabled": false
            }
        }))
        .unwrap();
        assert_eq!(response.data.min_app_version_ios, "1.2.0");
        assert!(!response.data.maintenance_mode);
    }

    #[test]
    fn config_missing_toggle_is_a_parse_error() {
        let body = serde_json::json!({
            "success": true,
            "data": { "maintenanceMode": true }
        });
        assert!(serde_json::from_value::<ConfigResponse>(body).is_err());
    }
}
