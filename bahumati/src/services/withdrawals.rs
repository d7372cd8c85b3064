//! Withdrawal service: the settlement queue, approve/reject, and the
//! advisory withdrawal-window check.
//!
//! The backend is the authority on whether a settlement is allowed; the
//! window check only disables the console action and shows the warning
//! banner. The backend has no singular GET for a request, so by-id lookup
//! is fetch-all-then-filter — a documented fallback, not a defect.

use crate::client::{Ack, ApiClient, ServiceResult};
use crate::models::{Event, WithdrawRequest, WithdrawStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

/// Where "now" falls relative to a request's event window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawWindow {
    /// After the event end and before the auto-allocation cutoff.
    Open,
    /// The event has not ended yet.
    BeforeEventEnd,
    /// The auto-allocation cutoff has passed.
    AfterAllocation,
    /// The request has no event link; it cannot be settled here.
    NotLinked,
}

impl WithdrawWindow {
    pub fn is_open(self) -> bool {
        self == WithdrawWindow::Open
    }

    /// Warning banner text for a closed window.
    pub fn banner(self) -> Option<&'static str> {
        match self {
            WithdrawWindow::Open => None,
            WithdrawWindow::BeforeEventEnd => {
                Some("Event has not ended yet. Withdrawals are not allowed.")
            }
            WithdrawWindow::AfterAllocation => {
                Some("Auto-allocation date passed. Withdrawals are no longer allowed.")
            }
            WithdrawWindow::NotLinked => Some(
                "This withdrawal is not linked to an event. Only event funds can be withdrawn manually.",
            ),
        }
    }
}

/// Literal boundary semantics: closed strictly before the end date and
/// strictly after the cutoff, open at both exact instants.
pub fn evaluate_window(
    now: DateTime<Utc>,
    end_date: DateTime<Utc>,
    auto_allocation_date: Option<DateTime<Utc>>,
) -> WithdrawWindow {
    if now < end_date {
        return WithdrawWindow::BeforeEventEnd;
    }
    if let Some(cutoff) = auto_allocation_date
        && now > cutoff
    {
        return WithdrawWindow::AfterAllocation;
    }
    WithdrawWindow::Open
}

/// Window for a concrete request given its (possibly absent) event.
pub fn window_for(
    request: &WithdrawRequest,
    event: Option<&Event>,
    now: DateTime<Utc>,
) -> WithdrawWindow {
    if request.event_id.is_none() {
        return WithdrawWindow::NotLinked;
    }
    match event {
        Some(event) => evaluate_window(now, event.end_date, event.auto_allocation_date),
        // Event link present but the event could not be fetched: treat as
        // not settleable rather than guessing a window.
        None => WithdrawWindow::NotLinked,
    }
}

#[derive(Clone)]
pub struct WithdrawalService {
    api: ApiClient,
}

impl WithdrawalService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /withdrawals/all?status=` — newest first.
    pub async fn list(&self, status: Option<WithdrawStatus>) -> ServiceResult<Vec<WithdrawRequest>> {
        let query = match status {
            Some(status) => vec![("status", status.to_string())],
            None => Vec::new(),
        };
        let response: ListWithdrawalsResponse = self.api.get_with("/withdrawals/all", &query).await?;
        let mut requests: Vec<WithdrawRequest> =
            response.data.into_iter().map(map_withdrawal).collect();
        requests.sort_by(|a, b| b.request_date.cmp(&a.request_date));
        Ok(requests)
    }

    /// Fetch-all-then-filter fallback.
    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Option<WithdrawRequest>> {
        Ok(self.list(None).await?.into_iter().find(|w| w.id == id))
    }

    /// `PATCH /withdrawals/:id/approve` — mark settled.
    pub async fn approve(&self, id: &str) -> ServiceResult<()> {
        let _: Ack = self
            .api
            .patch(&format!("/withdrawals/{id}/approve"), &json!({}))
            .await?;
        Ok(())
    }

    /// `PATCH /withdrawals/:id/reject` — with a mandatory reason.
    pub async fn reject(&self, id: &str, reason: &str) -> ServiceResult<()> {
        let _: Ack = self
            .api
            .patch(
                &format!("/withdrawals/{id}/reject"),
                &json!({ "rejectionReason": reason }),
            )
            .await?;
        Ok(())
    }
}

// --- Wire shapes ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListWithdrawalsResponse {
    #[allow(dead_code)]
    success: bool,
    data: Vec<WithdrawWire>,
}

/// The backend nests or inlines references depending on the endpoint;
/// both documented shapes parse.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinkWire {
    Ref(LinkRefWire),
    Id(String),
}

#[derive(Debug, Deserialize)]
struct LinkRefWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(default, alias = "fullName")]
    title: Option<String>,
}

impl LinkWire {
    fn id(&self) -> String {
        match self {
            LinkWire::Ref(r) => r.id.clone(),
            LinkWire::Id(id) => id.clone(),
        }
    }

    fn label(&self) -> Option<String> {
        match self {
            LinkWire::Ref(r) => r.title.clone(),
            LinkWire::Id(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WithdrawWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    user_id: LinkWire,
    #[serde(default)]
    event_id: Option<LinkWire>,
    #[serde(alias = "requestedAmount")]
    amount: f64,
    #[serde(default)]
    percentage: f64,
    #[serde(default)]
    total_gifts_amount: f64,
    #[serde(default)]
    allowed_max_amount: Option<f64>,
    status: WithdrawStatus,
    #[serde(alias = "requestDate")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    approved_by: Option<LinkWire>,
    #[serde(default)]
    rejected_by: Option<LinkWire>,
    #[serde(default)]
    approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    rejected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default)]
    transaction_proof_image_url: Option<String>,
    #[serde(default, alias = "notes")]
    rejection_reason: Option<String>,
}

pub(crate) fn map_withdrawal(wire: WithdrawWire) -> WithdrawRequest {
    // Backend-computed ceiling; older responses omit the explicit field and
    // carry the percentage terms instead.
    let allowed_max = wire
        .allowed_max_amount
        .unwrap_or(wire.total_gifts_amount * wire.percentage / 100.0);
    let processed_by = wire
        .approved_by
        .as_ref()
        .or(wire.rejected_by.as_ref())
        .and_then(|link| link.label().or(Some(link.id())));

    WithdrawRequest {
        id: wire.id,
        user_id: wire.user_id.id(),
        event_id: wire.event_id.as_ref().map(LinkWire::id),
        event_title: wire.event_id.as_ref().and_then(LinkWire::label),
        requested_amount: wire.amount,
        allowed_max_amount: allowed_max,
        status: wire.status,
        request_date: wire.created_at,
        processed_by,
        processed_date: wire.approved_at.or(wire.rejected_at),
        transaction_id: wire.transaction_id,
        transaction_proof_url: wire.transaction_proof_image_url,
        notes: wire.rejection_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn window_is_closed_strictly_before_end() {
        let end = at(1_000);
        let cutoff = at(2_000);
        assert_eq!(
            evaluate_window(at(999), end, Some(cutoff)),
            WithdrawWindow::BeforeEventEnd
        );
        // The exact end instant is already open.
        assert_eq!(evaluate_window(at(1_000), end, Some(cutoff)), WithdrawWindow::Open);
    }

    #[test]
    fn window_is_closed_strictly_after_cutoff() {
        let end = at(1_000);
        let cutoff = at(2_000);
        // The exact cutoff instant is still open.
        assert_eq!(evaluate_window(at(2_000), end, Some(cutoff)), WithdrawWindow::Open);
        assert_eq!(
            evaluate_window(at(2_001), end, Some(cutoff)),
            WithdrawWindow::AfterAllocation
        );
    }

    #[test]
    fn missing_cutoff_leaves_the_window_open_after_end() {
        assert_eq!(evaluate_window(at(5_000), at(1_000), None), WithdrawWindow::Open);
    }

    proptest! {
        #[test]
        fn window_open_iff_within_literal_bounds(
            now in -1_000_000i64..1_000_000,
            end in -1_000_000i64..1_000_000,
            cutoff in -1_000_000i64..1_000_000,
        ) {
            let window = evaluate_window(at(now), at(end), Some(at(cutoff)));
            let expected_open = !(now < end) && !(now > cutoff);
            prop_assert_eq!(window.is_open(), expected_open);
        }
    }

    #[test]
    fn eventless_request_is_not_settleable() {
        let wire: WithdrawWire = serde_json::from_value(serde_json::json!({
            "_id": "w1",
            "userId": "u1",
            "amount": 500.0,
            "status": "pending",
            "createdAt": "2024-01-10T10:00:00Z"
        }))
        .unwrap();
        let request = map_withdrawal(wire);
        assert_eq!(
            window_for(&request, None, at(0)),
            WithdrawWindow::NotLinked
        );
    }

    #[test]
    fn withdraw_wire_maps_nested_references_and_computed_max() {
        let wire: WithdrawWire = serde_json::from_value(serde_json::json!({
            "_id": "w2",
            "userId": { "_id": "u2" },
            "eventId": { "_id": "e1", "title": "Housewarming" },
            "amount": 400.0,
            "percentage": 50.0,
            "totalGiftsAmount": 1000.0,
            "status": "approved",
            "createdAt": "2024-01-10T10:00:00Z",
            "approvedBy": { "_id": "agent-2", "fullName": "Rohan" },
            "approvedAt": "2024-01-12T10:00:00Z",
            "transactionId": "TXN-9"
        }))
        .unwrap();

        let request = map_withdrawal(wire);
        assert_eq!(request.user_id, "u2");
        assert_eq!(request.event_id.as_deref(), Some("e1"));
        assert_eq!(request.event_title.as_deref(), Some("Housewarming"));
        assert_eq!(request.allowed_max_amount, 500.0);
        assert_eq!(request.status, WithdrawStatus::Completed);
        assert_eq!(request.processed_by.as_deref(), Some("Rohan"));
        assert_eq!(request.transaction_id.as_deref(), Some("TXN-9"));
    }
}
