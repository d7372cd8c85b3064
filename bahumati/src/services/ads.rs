//! Ad management service (super-admin only).

use crate::client::{Ack, ApiClient, Auth, ServiceResult};
use crate::models::{Ad, AdPlacement, AdType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Create/update payload. The console's form enforces the required fields
/// (title, image URL, redirect URL) before this is ever built.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdDraft {
    pub title: String,
    pub image_url: String,
    pub redirect_url: String,
    pub placement: AdPlacement,
    #[serde(rename = "type")]
    pub ad_type: AdType,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct AdService {
    api: ApiClient,
}

impl AdService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /admin/ads`.
    pub async fn list(&self) -> ServiceResult<Vec<Ad>> {
        let response: ListAdsResponse = self.api.get("/admin/ads").await?;
        Ok(response.data.into_iter().map(map_ad).collect())
    }

    /// `POST /admin/ads`.
    pub async fn create(&self, draft: &AdDraft) -> ServiceResult<()> {
        let _: Ack = self.api.post("/admin/ads", draft, Auth::Operator).await?;
        Ok(())
    }

    /// `PUT /admin/ads/:id`.
    pub async fn update(&self, id: &str, draft: &AdDraft) -> ServiceResult<()> {
        let _: Ack = self
            .api
            .put(&format!("/admin/ads/{id}"), draft, Auth::Operator)
            .await?;
        Ok(())
    }

    /// `DELETE /admin/ads/:id`.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let _: Ack = self.api.delete(&format!("/admin/ads/{id}")).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ListAdsResponse {
    #[allow(dead_code)]
    success: bool,
    data: Vec<AdWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    title: String,
    image_url: String,
    redirect_url: String,
    placement: AdPlacement,
    #[serde(rename = "type")]
    ad_type: AdType,
    is_active: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

fn map_ad(wire: AdWire) -> Ad {
    Ad {
        id: wire.id,
        title: wire.title,
        image_url: wire.image_url,
        redirect_url: wire.redirect_url,
        placement: wire.placement,
        ad_type: wire.ad_type,
        is_active: wire.is_active,
        created_at: wire.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ad_wire_maps_placement_and_type() {
        let wire: AdWire = serde_json::from_value(serde_json::json!({
            "_id": "ad1",
            "title": "Welcome Bonus",
            "imageUrl": "https://cdn/banner.png",
            "redirectUrl": "https://example.com/bonus",
            "placement": "HomeBanner",
            "type": "ImageOnly",
            "isActive": true
        }))
        .unwrap();
        let ad = map_ad(wire);
        assert_eq!(ad.placement, AdPlacement::HomeBanner);
        assert_eq!(ad.ad_type, AdType::ImageOnly);
        assert!(ad.is_active);
    }

    #[test]
    fn draft_serializes_type_under_wire_key() {
        let body = serde_json::to_value(AdDraft {
            title: "Refer a Friend".to_string(),
            image_url: "https://cdn/refer.png".to_string(),
            redirect_url: "https://example.com/refer".to_string(),
            placement: AdPlacement::DashboardCard,
            ad_type: AdType::TextOnly,
            is_active: true,
        })
        .unwrap();
        assert_eq!(body["type"], "TextOnly");
        assert_eq!(body["imageUrl"], "https://cdn/refer.png");
    }
}
