//! Per-resource backend services.
//!
//! Each service wraps a fixed set of REST endpoints behind the shared
//! [`ApiClient`](crate::client::ApiClient): strict wire parsing, flat view
//! models out, human-readable errors from mutations. Callers own the
//! refresh step after every mutation — there is no cache to invalidate.

pub mod ads;
pub mod agents;
pub mod app_config;
pub mod events;
pub mod kyc;
pub mod transactions;
pub mod users;
pub mod withdrawals;

pub use ads::{AdDraft, AdService};
pub use agents::{AgentService, AgentUpdate, NewAgent};
pub use app_config::ConfigService;
pub use events::{EventRulesUpdate, EventService};
pub use kyc::{KycDecision, KycService};
pub use transactions::TransactionService;
pub use users::{EnrolledUser, UserPage, UserService};
pub use withdrawals::{WithdrawWindow, WithdrawalService};

use crate::client::ApiClient;

/// One handle per resource, all sharing a single HTTP client.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub kyc: KycService,
    pub events: EventService,
    pub transactions: TransactionService,
    pub withdrawals: WithdrawalService,
    pub agents: AgentService,
    pub ads: AdService,
    pub config: ConfigService,
}

impl Services {
    pub fn new(api: ApiClient) -> Self {
        Self {
            users: UserService::new(api.clone()),
            kyc: KycService::new(api.clone()),
            events: EventService::new(api.clone()),
            transactions: TransactionService::new(api.clone()),
            withdrawals: WithdrawalService::new(api.clone()),
            agents: AgentService::new(api.clone()),
            ads: AdService::new(api.clone()),
            config: ConfigService::new(api),
        }
    }
}
