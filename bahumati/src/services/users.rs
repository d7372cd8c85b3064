//! End-user service: paginated listing, lookup, ban toggle, history, and
//! the three-step enrollment wizard (OTP dispatch → OTP verify → default
//! allocation).

use crate::client::{Ack, ApiClient, Auth, ServiceResult};
use crate::models::{
    AllocationType, BankDetails, EndUser, EventStats, HistoryEvent, HistoryEventStatus,
    HistorySummary, HistoryTransaction, HistoryTxKind, KycStatus, UserHistory,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

/// One page of the admin user listing.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<EndUser>,
    pub total: u64,
    pub total_pages: u32,
}

/// The user created by a verified OTP, plus the one-shot token scoped to it.
/// The token is held only in wizard state; abandoning the wizard loses it.
#[derive(Debug, Clone)]
pub struct EnrolledUser {
    pub user_id: String,
    pub phone: String,
    pub token: String,
}

#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /admin/users?page&limit` — server-side pagination.
    pub async fn list(&self, page: u32, limit: u32) -> ServiceResult<UserPage> {
        let response: ListUsersResponse = self
            .api
            .get_with(
                "/admin/users",
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(UserPage {
            users: response.users.into_iter().map(map_user).collect(),
            total: response.pagination.total,
            total_pages: response.pagination.total_pages.max(1),
        })
    }

    /// `POST /admin/users/find` — lookup by id, phone, or email.
    pub async fn find(&self, value: &str) -> ServiceResult<EndUser> {
        let response: FindUserResponse = self
            .api
            .post("/admin/users/find", &json!({ "value": value }), Auth::Operator)
            .await?;
        Ok(map_user(response.user))
    }

    /// `PUT /users/:id` with the operator token — ban or unban.
    pub async fn set_banned(&self, user_id: &str, banned: bool) -> ServiceResult<()> {
        let _: Ack = self
            .api
            .put(
                &format!("/users/{user_id}"),
                &json!({ "isBanned": banned }),
                Auth::Operator,
            )
            .await?;
        Ok(())
    }

    /// `GET /admin/users/:id/transactions` — the rich history document
    /// (summary, gift/allocation rows, and the user's own events).
    pub async fn history(&self, user_id: &str) -> ServiceResult<UserHistory> {
        let response: HistoryResponse = self
            .api
            .get(&format!("/admin/users/{user_id}/transactions"))
            .await?;
        Ok(map_history(response.data))
    }

    // --- Enrollment wizard -------------------------------------------------

    /// `POST /users/login` — dispatch an OTP to a new user's phone.
    pub async fn send_otp(&self, number: &str) -> ServiceResult<()> {
        let _: Ack = self
            .api
            .post("/users/login", &json!({ "number": number }), Auth::None)
            .await?;
        Ok(())
    }

    /// `POST /users/verify-otp` — trade a correct OTP for the new user and
    /// a short-lived token scoped to that user.
    pub async fn verify_otp(&self, number: &str, otp: &str) -> ServiceResult<EnrolledUser> {
        let response: VerifyOtpResponse = self
            .api
            .post(
                "/users/verify-otp",
                &json!({ "number": number, "otp": otp }),
                Auth::None,
            )
            .await?;
        Ok(EnrolledUser {
            user_id: response.user.id,
            phone: number.to_string(),
            token: response.token,
        })
    }

    /// `PUT /users/:id` with the wizard's one-shot user token — set the
    /// default allocation preference.
    pub async fn set_default_allocation(
        &self,
        enrolled: &EnrolledUser,
        allocation: AllocationType,
    ) -> ServiceResult<()> {
        let _: Ack = self
            .api
            .put(
                &format!("/users/{}", enrolled.user_id),
                &json!({ "defaultAllocationType": allocation.wire_name() }),
                Auth::UserToken(enrolled.token.clone()),
            )
            .await?;
        Ok(())
    }
}

// --- Wire shapes ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListUsersResponse {
    #[allow(dead_code)]
    success: bool,
    users: Vec<UserWire>,
    pagination: PaginationWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaginationWire {
    total: u64,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct FindUserResponse {
    #[allow(dead_code)]
    success: bool,
    user: UserWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(alias = "name")]
    full_name: String,
    #[serde(alias = "phone")]
    number: String,
    #[serde(default)]
    email: Option<String>,
    kyc_status: KycStatus,
    #[serde(default)]
    is_banned: bool,
    default_allocation_type: AllocationType,
    #[serde(default)]
    event_participation_count: u32,
    #[serde(default)]
    total_balance: f64,
    #[serde(default)]
    withdrawable_amount: f64,
    #[serde(default)]
    bank_details: Option<BankDetailsWire>,
    #[serde(default)]
    upi_id: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BankDetailsWire {
    account_number: String,
    ifsc_code: String,
    bank_name: String,
    account_holder_name: String,
}

#[derive(Debug, Deserialize)]
struct VerifyOtpResponse {
    #[allow(dead_code)]
    success: bool,
    user: WizardUserWire,
    token: String,
}

#[derive(Debug, Deserialize)]
struct WizardUserWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[allow(dead_code)]
    success: bool,
    data: HistoryData,
}

#[derive(Debug, Deserialize)]
struct HistoryData {
    user: HistoryUserWire,
    #[serde(default)]
    summary: HistorySummary,
    transactions: HistoryTxSection,
    events: HistoryEventSection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryUserWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    full_name: String,
    number: String,
}

#[derive(Debug, Deserialize)]
struct HistoryTxSection {
    list: Vec<HistoryTxWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryTxWire {
    #[serde(rename = "type")]
    kind: HistoryTxKind,
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    sender: Option<PartyWire>,
    #[serde(default)]
    receiver: Option<PartyWire>,
    #[serde(default)]
    event: Option<EventRefWire>,
    #[serde(default)]
    status: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct PartyWire {
    name: String,
}

#[derive(Debug, Deserialize)]
struct EventRefWire {
    title: String,
}

#[derive(Debug, Deserialize)]
struct HistoryEventSection {
    list: Vec<HistoryEventWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryEventWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    title: String,
    event_start_date: DateTime<Utc>,
    event_end_date: DateTime<Utc>,
    status: HistoryEventStatus,
    #[serde(default)]
    withdrawal_percentage: f64,
    #[serde(default)]
    stats: EventStats,
}

// --- Mapping ----------------------------------------------------------------

fn map_user(wire: UserWire) -> EndUser {
    EndUser {
        id: wire.id,
        name: wire.full_name,
        phone: wire.number,
        email: wire.email,
        kyc_status: wire.kyc_status,
        is_banned: wire.is_banned,
        default_allocation: wire.default_allocation_type,
        event_participation_count: wire.event_participation_count,
        total_balance: wire.total_balance,
        withdrawable_amount: wire.withdrawable_amount,
        bank_details: wire.bank_details.map(|b| BankDetails {
            account_number: b.account_number,
            ifsc_code: b.ifsc_code,
            bank_name: b.bank_name,
            account_holder_name: b.account_holder_name,
        }),
        upi_id: wire.upi_id,
        created_at: wire.created_at,
    }
}

fn map_history(data: HistoryData) -> UserHistory {
    let transactions = data
        .transactions
        .list
        .into_iter()
        .map(|tx| {
            let counterparty = match tx.kind {
                HistoryTxKind::GiftSent => tx.receiver.map(|p| p.name),
                HistoryTxKind::GiftReceived => tx.sender.map(|p| p.name),
                HistoryTxKind::Allocation => None,
            };
            HistoryTransaction {
                kind: tx.kind,
                amount: tx.amount,
                counterparty,
                event_title: tx.event.map(|e| e.title),
                status: tx.status,
                created_at: tx.created_at,
            }
        })
        .collect();

    let events = data
        .events
        .list
        .into_iter()
        .map(|e| HistoryEvent {
            id: e.id,
            title: e.title,
            start_date: e.event_start_date,
            end_date: e.event_end_date,
            status: e.status,
            withdrawal_percentage: e.withdrawal_percentage,
            stats: e.stats,
        })
        .collect();

    UserHistory {
        user_id: data.user.id,
        user_name: data.user.full_name,
        user_phone: data.user.number,
        summary: data.summary,
        transactions,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_wire_maps_to_flat_view() {
        let body = serde_json::json!({
            "success": true,
            "users": [{
                "_id": "u1",
                "fullName": "Aarav Sharma",
                "number": "9876543210",
                "email": "aarav@example.com",
                "kycStatus": "Pending",
                "isBanned": false,
                "defaultAllocationType": "Top 50 Companies",
                "eventParticipationCount": 2,
                "totalBalance": 50000,
                "withdrawableAmount": 10000,
                "bankDetails": {
                    "accountNumber": "1234567890",
                    "ifscCode": "HDFC0001234",
                    "bankName": "HDFC Bank",
                    "accountHolderName": "Aarav Sharma"
                },
                "upiId": "aarav@upi"
            }],
            "pagination": { "total": 42, "totalPages": 3 }
        });

        let parsed: ListUsersResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.pagination.total_pages, 3);

        let user = map_user(parsed.users.into_iter().next().unwrap());
        assert_eq!(user.id, "u1");
        assert_eq!(user.name, "Aarav Sharma");
        assert_eq!(user.phone, "9876543210");
        assert_eq!(user.kyc_status, KycStatus::Pending);
        assert_eq!(user.default_allocation, AllocationType::Top50Companies);
        assert_eq!(user.bank_details.unwrap().ifsc_code, "HDFC0001234");
    }

    #[test]
    fn user_missing_kyc_status_is_a_parse_error() {
        let body = serde_json::json!({
            "_id": "u9",
            "fullName": "No Status",
            "number": "9999999999",
            "defaultAllocationType": "Digital Gold"
        });
        assert!(serde_json::from_value::<UserWire>(body).is_err());
    }

    #[test]
    fn history_rows_pick_the_right_counterparty() {
        let body = serde_json::json!({
            "success": true,
            "data": {
                "user": { "_id": "u2", "fullName": "Diya Patel", "number": "9898989898" },
                "summary": { "totalGiftsReceived": 1200.0, "netBalance": 800.0 },
                "transactions": { "list": [
                    {
                        "type": "gift_received",
                        "amount": 700.0,
                        "sender": { "name": "Vihaan" },
                        "event": { "title": "Housewarming" },
                        "createdAt": "2024-01-10T10:00:00Z"
                    },
                    {
                        "type": "gift_sent",
                        "amount": 500.0,
                        "receiver": { "name": "Aarav" },
                        "createdAt": "2024-01-11T10:00:00Z"
                    },
                    {
                        "type": "allocation",
                        "amount": 300.0,
                        "status": "completed",
                        "createdAt": "2024-01-12T10:00:00Z"
                    }
                ]},
                "events": { "list": [{
                    "_id": "e1",
                    "title": "Housewarming",
                    "eventStartDate": "2024-01-01T00:00:00Z",
                    "eventEndDate": "2024-01-09T00:00:00Z",
                    "status": "ended",
                    "withdrawalPercentage": 50.0,
                    "stats": { "totalGiftsAmount": 1200.0, "maxWithdrawable": 600.0 }
                }]}
            }
        });

        let parsed: HistoryResponse = serde_json::from_value(body).unwrap();
        let history = map_history(parsed.data);

        assert_eq!(history.user_name, "Diya Patel");
        assert_eq!(history.summary.total_gifts_received, 1200.0);
        assert_eq!(history.transactions.len(), 3);
        assert_eq!(history.transactions[0].counterparty.as_deref(), Some("Vihaan"));
        assert_eq!(history.transactions[1].counterparty.as_deref(), Some("Aarav"));
        assert_eq!(history.transactions[2].counterparty, None);
        assert_eq!(history.events[0].stats.max_withdrawable, 600.0);
        assert_eq!(history.events[0].status, HistoryEventStatus::Ended);
    }
}
