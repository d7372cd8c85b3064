//! Event service: listing, detail (with aggregates, gifts, and related
//! withdrawals), rule updates, and deletion.

use crate::client::{Ack, ApiClient, ServiceResult};
use crate::models::{Event, EventDetail, EventGift, EventStats, EventStatus};
use crate::services::withdrawals::{WithdrawWire, map_withdrawal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields a reconciliation agent may change on an event.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRulesUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawal_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_allocation_scheduled_date: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct EventService {
    api: ApiClient,
}

impl EventService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /events` — every event, newest start first.
    pub async fn list(&self) -> ServiceResult<Vec<Event>> {
        let response: ListEventsResponse = self.api.get("/events").await?;
        let mut events: Vec<Event> = response.data.events.into_iter().map(map_event).collect();
        events.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(events)
    }

    /// `GET /events/:id` — the event plus aggregates and related records.
    pub async fn detail(&self, id: &str) -> ServiceResult<EventDetail> {
        let response: EventDetailResponse = self.api.get(&format!("/events/{id}")).await?;
        Ok(EventDetail {
            event: map_event(response.data.event),
            stats: response.data.stats,
            gifts: response.data.gifts.into_iter().map(map_gift).collect(),
            withdrawals: response
                .data
                .withdrawals
                .into_iter()
                .map(map_withdrawal)
                .collect(),
        })
    }

    /// `PATCH /events/:id` — adjust withdrawal rules.
    pub async fn update_rules(&self, id: &str, update: EventRulesUpdate) -> ServiceResult<()> {
        let _: Ack = self.api.patch(&format!("/events/{id}"), &update).await?;
        Ok(())
    }

    /// `DELETE /events/:id`.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let _: Ack = self.api.delete(&format!("/events/{id}")).await?;
        Ok(())
    }
}

// --- Wire shapes ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListEventsResponse {
    #[allow(dead_code)]
    success: bool,
    data: EventsEnvelope,
}

#[derive(Debug, Deserialize)]
struct EventsEnvelope {
    events: Vec<EventWire>,
}

#[derive(Debug, Deserialize)]
struct EventDetailResponse {
    #[allow(dead_code)]
    success: bool,
    data: EventDetailWire,
}

#[derive(Debug, Deserialize)]
struct EventDetailWire {
    event: EventWire,
    #[serde(default)]
    stats: EventStats,
    #[serde(default)]
    gifts: Vec<GiftWire>,
    #[serde(default)]
    withdrawals: Vec<WithdrawWire>,
}

/// The events endpoints and the legacy admin endpoints disagree on key
/// spellings; both documented variants parse.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(alias = "name")]
    title: String,
    #[serde(default)]
    creator: Option<CreatorWire>,
    #[serde(alias = "startDate")]
    event_start_date: DateTime<Utc>,
    #[serde(alias = "endDate")]
    event_end_date: DateTime<Utc>,
    status: EventStatus,
    #[serde(default, alias = "totalGiftsAmount")]
    total_collected_amount: f64,
    #[serde(default, alias = "totalWithdrawn")]
    total_withdrawn_amount: f64,
    #[serde(default, alias = "allowedWithdrawPercentage")]
    withdrawal_percentage: f64,
    #[serde(default, alias = "autoAllocationDate")]
    auto_allocation_scheduled_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CreatorWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(alias = "fullName")]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GiftWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(default)]
    sender: Option<NameWire>,
    #[serde(default, alias = "valueInINR")]
    amount: f64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct NameWire {
    #[serde(alias = "fullName")]
    name: String,
}

fn map_event(wire: EventWire) -> Event {
    Event {
        id: wire.id,
        title: wire.title,
        creator_id: wire.creator.as_ref().map(|c| c.id.clone()),
        creator_name: wire.creator.map(|c| c.name),
        start_date: wire.event_start_date,
        end_date: wire.event_end_date,
        status: wire.status,
        total_collected: wire.total_collected_amount,
        total_withdrawn: wire.total_withdrawn_amount,
        allowed_withdraw_percentage: wire.withdrawal_percentage,
        auto_allocation_date: wire.auto_allocation_scheduled_date,
    }
}

fn map_gift(wire: GiftWire) -> EventGift {
    EventGift {
        id: wire.id,
        sender_name: wire
            .sender
            .map(|s| s.name)
            .unwrap_or_else(|| "Unknown".to_string()),
        amount: wire.amount,
        created_at: wire.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_wire_accepts_both_key_spellings() {
        let real: EventWire = serde_json::from_value(serde_json::json!({
            "_id": "e1",
            "title": "Housewarming",
            "creator": { "_id": "u7", "fullName": "Diya Patel" },
            "eventStartDate": "2024-01-01T00:00:00Z",
            "eventEndDate": "2024-01-09T00:00:00Z",
            "status": "active",
            "totalGiftsAmount": 1200.0,
            "withdrawalPercentage": 50.0,
            "autoAllocationScheduledDate": "2024-01-16T00:00:00Z"
        }))
        .unwrap();
        let event = map_event(real);
        assert_eq!(event.title, "Housewarming");
        assert_eq!(event.creator_name.as_deref(), Some("Diya Patel"));
        assert_eq!(event.status, EventStatus::Ongoing);
        assert_eq!(event.total_collected, 1200.0);
        assert!(event.auto_allocation_date.is_some());

        let legacy: EventWire = serde_json::from_value(serde_json::json!({
            "id": "e2",
            "name": "Gold Rush",
            "startDate": "2024-02-01T00:00:00Z",
            "endDate": "2024-02-28T00:00:00Z",
            "status": "Upcoming",
            "allowedWithdrawPercentage": 100.0
        }))
        .unwrap();
        let event = map_event(legacy);
        assert_eq!(event.title, "Gold Rush");
        assert_eq!(event.status, EventStatus::Upcoming);
        assert_eq!(event.allowed_withdraw_percentage, 100.0);
        assert!(event.auto_allocation_date.is_none());
    }

    #[test]
    fn event_detail_defaults_absent_sections() {
        let response: EventDetailResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "data": {
                "event": {
                    "_id": "e1",
                    "title": "Housewarming",
                    "eventStartDate": "2024-01-01T00:00:00Z",
                    "eventEndDate": "2024-01-09T00:00:00Z",
                    "status": "ended"
                }
            }
        }))
        .unwrap();
        assert!(response.data.gifts.is_empty());
        assert!(response.data.withdrawals.is_empty());
        assert_eq!(response.data.stats.total_gifts_amount, 0.0);
    }

    #[test]
    fn rules_update_serializes_only_set_fields() {
        let update = EventRulesUpdate {
            withdrawal_percentage: Some(60.0),
            auto_allocation_scheduled_date: None,
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, serde_json::json!({ "withdrawalPercentage": 60.0 }));
    }
}
