//! KYC service: the review queue and the approve/reject decision.

use crate::client::{Ack, ApiClient, Auth, ServiceResult};
use crate::models::{IdDocType, KycCase, KycStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

/// An agent's decision on one submission. Pending→Approved and
/// Pending→Rejected are the only transitions this console performs, and the
/// backend owns idempotency — the call is issued unconditionally.
#[derive(Debug, Clone)]
pub enum KycDecision {
    Approve,
    Reject { reason: String },
}

#[derive(Clone)]
pub struct KycService {
    api: ApiClient,
}

impl KycService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /kyc/all?status=` — submissions joined with their users.
    pub async fn list(&self, status: Option<KycStatus>) -> ServiceResult<Vec<KycCase>> {
        let query = match status {
            Some(status) => vec![("status", status.to_string())],
            None => Vec::new(),
        };
        let response: ListKycResponse = self.api.get_with("/kyc/all", &query).await?;
        Ok(response.data.into_iter().map(map_case).collect())
    }

    /// The latest submission for one user, if any. The backend keeps
    /// resubmissions; the newest `submitted_at` wins.
    pub async fn latest_for_user(&self, user_id: &str) -> ServiceResult<Option<KycCase>> {
        let mut cases: Vec<KycCase> = self
            .list(None)
            .await?
            .into_iter()
            .filter(|c| c.user_id == user_id)
            .collect();
        cases.sort_by_key(|c| c.submitted_at);
        Ok(cases.pop())
    }

    /// `PUT /kyc/review` — record the decision.
    pub async fn review(&self, kyc_id: &str, decision: KycDecision) -> ServiceResult<()> {
        let body = match decision {
            KycDecision::Approve => json!({ "kycId": kyc_id, "status": "Approved" }),
            KycDecision::Reject { reason } => json!({
                "kycId": kyc_id,
                "status": "Rejected",
                "rejectionReason": reason,
            }),
        };
        let _: Ack = self.api.put("/kyc/review", &body, Auth::Operator).await?;
        Ok(())
    }
}

// --- Wire shapes ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListKycResponse {
    #[allow(dead_code)]
    success: bool,
    data: Vec<KycWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KycWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    user_id: KycUserWire,
    id_type: IdDocType,
    #[serde(default)]
    id_number: Option<String>,
    front_pic: String,
    back_pic: String,
    selfie: String,
    status: KycStatus,
    #[serde(default)]
    rejection_reason: Option<String>,
    #[serde(alias = "submittedAt")]
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KycUserWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    full_name: String,
    number: String,
}

fn map_case(wire: KycWire) -> KycCase {
    KycCase {
        kyc_id: wire.id,
        user_id: wire.user_id.id,
        user_name: wire.user_id.full_name,
        user_phone: wire.user_id.number,
        id_type: wire.id_type,
        id_number: wire.id_number,
        front_pic: wire.front_pic,
        back_pic: wire.back_pic,
        selfie: wire.selfie,
        status: wire.status,
        rejection_reason: wire.rejection_reason,
        submitted_at: wire.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case_json(id: &str, submitted: &str) -> serde_json::Value {
        serde_json::json!({
            "_id": id,
            "userId": { "_id": "u1", "fullName": "Aarav Sharma", "number": "9876543210" },
            "idType": "pan",
            "idNumber": "ABCDE1234F",
            "frontPic": "https://cdn/front.jpg",
            "backPic": "https://cdn/back.jpg",
            "selfie": "https://cdn/selfie.jpg",
            "status": "pending",
            "createdAt": submitted
        })
    }

    #[test]
    fn kyc_wire_flattens_the_nested_user() {
        let wire: KycWire = serde_json::from_value(case_json("k1", "2024-02-01T09:00:00Z")).unwrap();
        let case = map_case(wire);
        assert_eq!(case.kyc_id, "k1");
        assert_eq!(case.user_id, "u1");
        assert_eq!(case.user_name, "Aarav Sharma");
        assert_eq!(case.id_type, IdDocType::Pan);
        assert_eq!(case.status, KycStatus::Pending);
    }

    #[test]
    fn missing_document_urls_are_a_parse_error() {
        let body = serde_json::json!({
            "_id": "k2",
            "userId": { "_id": "u1", "fullName": "A", "number": "9" },
            "idType": "aadhaar",
            "status": "pending",
            "createdAt": "2024-02-01T09:00:00Z"
        });
        assert!(serde_json::from_value::<KycWire>(body).is_err());
    }

    #[test]
    fn latest_submission_wins() {
        let older: KycWire =
            serde_json::from_value(case_json("k-old", "2024-01-01T09:00:00Z")).unwrap();
        let newer: KycWire =
            serde_json::from_value(case_json("k-new", "2024-03-01T09:00:00Z")).unwrap();

        let mut cases = vec![map_case(newer), map_case(older)];
        cases.sort_by_key(|c| c.submitted_at);
        assert_eq!(cases.pop().unwrap().kyc_id, "k-new");
    }
}
