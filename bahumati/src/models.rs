//! View-model entities for the admin console.
//!
//! Every entity here is owned and persisted by the platform backend; the
//! console holds request-scoped copies only. Wire shapes (snake_case keys,
//! `_id` fields, nested creator objects) live next to the service that
//! consumes them — these are the flat shapes the pages render.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operator (console user) role. The backend has emitted both PascalCase
/// and snake_case spellings; both parse, normalized to this closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(alias = "onboarding_agent")]
    OnboardingAgent,
    #[serde(alias = "reconciliation_agent")]
    ReconciliationAgent,
    #[serde(alias = "super_admin", alias = "admin")]
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 3] = [
        Role::OnboardingAgent,
        Role::ReconciliationAgent,
        Role::SuperAdmin,
    ];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::OnboardingAgent => write!(f, "Onboarding Agent"),
            Role::ReconciliationAgent => write!(f, "Reconciliation Agent"),
            Role::SuperAdmin => write!(f, "Super Admin"),
        }
    }
}

/// Agent account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentStatus {
    #[serde(alias = "active")]
    Active,
    #[serde(alias = "disabled", alias = "inactive")]
    Disabled,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Active => write!(f, "Active"),
            AgentStatus::Disabled => write!(f, "Disabled"),
        }
    }
}

/// A console operator: the authenticated user of this console, and the
/// record shown on the super-admin agent management screen. Operators never
/// modify themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    pub id: String,
    pub name: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub status: AgentStatus,
    pub last_active: Option<DateTime<Utc>>,
}

/// KYC verification status. Pending transitions to Approved or Rejected
/// exactly once; the console never re-opens a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KycStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KycStatus::Pending => write!(f, "Pending"),
            KycStatus::Approved => write!(f, "Approved"),
            KycStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Where a user's collected funds are allocated by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationType {
    #[serde(rename = "Top 50 Companies", alias = "stock", alias = "top50")]
    Top50Companies,
    #[serde(rename = "Digital Gold", alias = "gold")]
    DigitalGold,
}

impl AllocationType {
    pub const ALL: [AllocationType; 2] = [AllocationType::Top50Companies, AllocationType::DigitalGold];

    /// The string the backend expects on update calls.
    pub fn wire_name(self) -> &'static str {
        match self {
            AllocationType::Top50Companies => "Top 50 Companies",
            AllocationType::DigitalGold => "Digital Gold",
        }
    }
}

impl std::fmt::Display for AllocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Bank account details attached to an end user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
    pub account_holder_name: String,
}

/// A platform end user as the console sees one.
#[derive(Debug, Clone)]
pub struct EndUser {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub kyc_status: KycStatus,
    pub is_banned: bool,
    pub default_allocation: AllocationType,
    pub event_participation_count: u32,
    pub total_balance: f64,
    pub withdrawable_amount: f64,
    pub bank_details: Option<BankDetails>,
    pub upi_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Accepted id-document types for KYC submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdDocType {
    Aadhaar,
    Pan,
    DrivingLicense,
    VoterId,
    Passport,
}

impl std::fmt::Display for IdDocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdDocType::Aadhaar => write!(f, "Aadhaar"),
            IdDocType::Pan => write!(f, "PAN"),
            IdDocType::DrivingLicense => write!(f, "Driving License"),
            IdDocType::VoterId => write!(f, "Voter ID"),
            IdDocType::Passport => write!(f, "Passport"),
        }
    }
}

/// One KYC submission under review, joined with the submitting user.
/// A user can resubmit; the latest submission wins.
#[derive(Debug, Clone)]
pub struct KycCase {
    pub kyc_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_phone: String,
    pub id_type: IdDocType,
    pub id_number: Option<String>,
    pub front_pic: String,
    pub back_pic: String,
    pub selfie: String,
    pub status: KycStatus,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Backend-reported event lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    #[serde(alias = "upcoming")]
    Upcoming,
    #[serde(alias = "ongoing", alias = "active")]
    Ongoing,
    #[serde(alias = "ended", alias = "cancelled")]
    Ended,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Upcoming => write!(f, "Upcoming"),
            EventStatus::Ongoing => write!(f, "Ongoing"),
            EventStatus::Ended => write!(f, "Ended"),
        }
    }
}

/// A gifting event. The withdrawal window for event funds runs from
/// `end_date` to `auto_allocation_date`.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub creator_id: Option<String>,
    pub creator_name: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: EventStatus,
    pub total_collected: f64,
    pub total_withdrawn: f64,
    pub allowed_withdraw_percentage: f64,
    pub auto_allocation_date: Option<DateTime<Utc>>,
}

/// Aggregates returned with an event detail.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventStats {
    pub total_gifts_received: u64,
    pub total_gifts_amount: f64,
    pub max_withdrawable: f64,
    pub total_withdrawn: f64,
    pub total_pending_withdrawals: f64,
    pub available_for_withdrawal: f64,
}

/// One gift row on the event detail screen.
#[derive(Debug, Clone)]
pub struct EventGift {
    pub id: String,
    pub sender_name: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

/// Event detail: the event plus its aggregates and related records.
#[derive(Debug, Clone)]
pub struct EventDetail {
    pub event: Event,
    pub stats: EventStats,
    pub gifts: Vec<EventGift>,
    pub withdrawals: Vec<WithdrawRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(alias = "deposit")]
    Deposit,
    #[serde(alias = "withdrawal")]
    Withdrawal,
    #[serde(alias = "allocation")]
    Allocation,
    #[serde(alias = "refund")]
    Refund,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "Deposit"),
            TransactionType::Withdrawal => write!(f, "Withdrawal"),
            TransactionType::Allocation => write!(f, "Allocation"),
            TransactionType::Refund => write!(f, "Refund"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "completed", alias = "success")]
    Completed,
    #[serde(alias = "failed")]
    Failed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "Pending"),
            TransactionStatus::Completed => write!(f, "Completed"),
            TransactionStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// A money movement on the platform ledger.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub event_id: Option<String>,
    pub tx_type: TransactionType,
    pub amount: f64,
    pub currency: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Withdrawal request status. Pending→{Completed,Rejected} is one-way and
/// performed exclusively by a reconciliation agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "completed", alias = "approved")]
    Completed,
    #[serde(alias = "rejected")]
    Rejected,
}

impl std::fmt::Display for WithdrawStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawStatus::Pending => write!(f, "Pending"),
            WithdrawStatus::Completed => write!(f, "Completed"),
            WithdrawStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// A user's request to withdraw event funds to their bank account.
#[derive(Debug, Clone)]
pub struct WithdrawRequest {
    pub id: String,
    pub user_id: String,
    pub event_id: Option<String>,
    pub event_title: Option<String>,
    pub requested_amount: f64,
    /// Backend-computed ceiling for this request.
    pub allowed_max_amount: f64,
    pub status: WithdrawStatus,
    pub request_date: DateTime<Utc>,
    pub processed_by: Option<String>,
    pub processed_date: Option<DateTime<Utc>>,
    pub transaction_id: Option<String>,
    pub transaction_proof_url: Option<String>,
    pub notes: Option<String>,
}

/// Ad placement slot in the end-user app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdPlacement {
    #[serde(alias = "home_banner")]
    HomeBanner,
    #[serde(alias = "dashboard_card")]
    DashboardCard,
    #[serde(alias = "sidebar")]
    Sidebar,
}

impl AdPlacement {
    pub const ALL: [AdPlacement; 3] = [AdPlacement::HomeBanner, AdPlacement::DashboardCard, AdPlacement::Sidebar];
}

impl std::fmt::Display for AdPlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdPlacement::HomeBanner => write!(f, "Home Banner"),
            AdPlacement::DashboardCard => write!(f, "Dashboard Card"),
            AdPlacement::Sidebar => write!(f, "Sidebar"),
        }
    }
}

/// Ad content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdType {
    #[serde(alias = "text_only")]
    TextOnly,
    #[serde(alias = "image_only")]
    ImageOnly,
    #[serde(alias = "text_and_image")]
    TextAndImage,
}

impl AdType {
    pub const ALL: [AdType; 3] = [AdType::TextOnly, AdType::ImageOnly, AdType::TextAndImage];
}

impl std::fmt::Display for AdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdType::TextOnly => write!(f, "Text Only"),
            AdType::ImageOnly => write!(f, "Image Only"),
            AdType::TextAndImage => write!(f, "Text + Image"),
        }
    }
}

/// An in-app advertisement managed by super-admins.
#[derive(Debug, Clone)]
pub struct Ad {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub redirect_url: String,
    pub placement: AdPlacement,
    pub ad_type: AdType,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// The flat singleton of operational toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub maintenance_mode: bool,
    pub min_app_version_ios: String,
    pub min_app_version_android: String,
    pub support_email: String,
    pub support_phone: String,
    pub max_daily_withdrawal_limit: f64,
    pub kyc_auto_approval_enabled: bool,
}

// --- User history (reconciliation lookup) ----------------------------------

/// Aggregate figures across a user's lifetime on the platform.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistorySummary {
    pub total_gifts_sent: f64,
    pub total_gifts_received: f64,
    pub total_allocated: f64,
    pub total_withdrawn: f64,
    pub total_pending_withdrawals: f64,
    pub net_balance: f64,
    pub total_events_created: u64,
    pub total_event_gifts_amount: f64,
    pub total_event_withdrawals: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryTxKind {
    GiftSent,
    GiftReceived,
    Allocation,
}

impl std::fmt::Display for HistoryTxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryTxKind::GiftSent => write!(f, "Gift Sent"),
            HistoryTxKind::GiftReceived => write!(f, "Gift Received"),
            HistoryTxKind::Allocation => write!(f, "Allocation"),
        }
    }
}

/// One row in the history transactions tab: a gift in either direction or
/// an allocation, flattened from the backend's nested sender/receiver/event
/// objects.
#[derive(Debug, Clone)]
pub struct HistoryTransaction {
    pub kind: HistoryTxKind,
    pub amount: f64,
    pub counterparty: Option<String>,
    pub event_title: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryEventStatus {
    Active,
    Ended,
    Cancelled,
}

impl std::fmt::Display for HistoryEventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryEventStatus::Active => write!(f, "Active"),
            HistoryEventStatus::Ended => write!(f, "Ended"),
            HistoryEventStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// One of the user's own events with its fund aggregates.
#[derive(Debug, Clone)]
pub struct HistoryEvent {
    pub id: String,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: HistoryEventStatus,
    pub withdrawal_percentage: f64,
    pub stats: EventStats,
}

/// The assembled user-history lookup result.
#[derive(Debug, Clone)]
pub struct UserHistory {
    pub user_id: String,
    pub user_name: String,
    pub user_phone: String,
    pub summary: HistorySummary,
    pub transactions: Vec<HistoryTransaction>,
    pub events: Vec<HistoryEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_both_wire_casings() {
        let pascal: Role = serde_json::from_str("\"SuperAdmin\"").unwrap();
        let snake: Role = serde_json::from_str("\"super_admin\"").unwrap();
        assert_eq!(pascal, Role::SuperAdmin);
        assert_eq!(snake, Role::SuperAdmin);

        let legacy: Role = serde_json::from_str("\"onboarding_agent\"").unwrap();
        assert_eq!(legacy, Role::OnboardingAgent);
    }

    #[test]
    fn role_rejects_unknown_value() {
        assert!(serde_json::from_str::<Role>("\"auditor\"").is_err());
    }

    #[test]
    fn allocation_type_round_trips_wire_name() {
        let parsed: AllocationType = serde_json::from_str("\"Top 50 Companies\"").unwrap();
        assert_eq!(parsed, AllocationType::Top50Companies);
        assert_eq!(
            serde_json::to_string(&AllocationType::DigitalGold).unwrap(),
            "\"Digital Gold\""
        );
    }

    #[test]
    fn withdraw_status_maps_backend_approved_to_completed() {
        let status: WithdrawStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(status, WithdrawStatus::Completed);
    }

    #[test]
    fn event_status_accepts_backend_active() {
        let status: EventStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(status, EventStatus::Ongoing);
    }
}
