//! Role/route guard.
//!
//! Each console page has a fixed allowed-role set. An authenticated operator
//! whose role is outside the set is redirected to their home dashboard; the
//! page itself is never rendered. The same sets drive menu filtering.

use crate::models::Role;

/// Every reachable console page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Dashboard,
    KycQueue,
    KycReview,
    Users,
    CreateUser,
    UserHistory,
    Transactions,
    TransactionDetail,
    Events,
    EventDetail,
    Withdrawals,
    WithdrawalDetail,
    Ads,
    Agents,
    Config,
}

const ONBOARDING: &[Role] = &[Role::OnboardingAgent, Role::SuperAdmin];
const RECONCILIATION: &[Role] = &[Role::ReconciliationAgent, Role::SuperAdmin];
const ADMIN_ONLY: &[Role] = &[Role::SuperAdmin];
const EVERYONE: &[Role] = &[
    Role::OnboardingAgent,
    Role::ReconciliationAgent,
    Role::SuperAdmin,
];

impl Page {
    pub const ALL: [Page; 15] = [
        Page::Dashboard,
        Page::KycQueue,
        Page::KycReview,
        Page::Users,
        Page::CreateUser,
        Page::UserHistory,
        Page::Transactions,
        Page::TransactionDetail,
        Page::Events,
        Page::EventDetail,
        Page::Withdrawals,
        Page::WithdrawalDetail,
        Page::Ads,
        Page::Agents,
        Page::Config,
    ];

    /// Roles permitted to render this page.
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Page::Dashboard => EVERYONE,
            Page::KycQueue | Page::KycReview | Page::Users | Page::CreateUser => ONBOARDING,
            Page::UserHistory
            | Page::Transactions
            | Page::TransactionDetail
            | Page::Events
            | Page::EventDetail
            | Page::Withdrawals
            | Page::WithdrawalDetail => RECONCILIATION,
            Page::Ads | Page::Agents | Page::Config => ADMIN_ONLY,
        }
    }

    /// Human title used for window headers and menu labels.
    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::KycQueue => "KYC Queue",
            Page::KycReview => "KYC Review",
            Page::Users => "Users",
            Page::CreateUser => "Create User",
            Page::UserHistory => "User History",
            Page::Transactions => "Transactions",
            Page::TransactionDetail => "Transaction",
            Page::Events => "Events",
            Page::EventDetail => "Event",
            Page::Withdrawals => "Withdrawals",
            Page::WithdrawalDetail => "Withdrawal",
            Page::Ads => "Ads",
            Page::Agents => "Agents",
            Page::Config => "Configuration",
        }
    }
}

/// Guard outcome for an authenticated operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Granted,
    RedirectHome,
}

/// Decide whether `role` may render `page`.
pub fn check(role: Role, page: Page) -> GuardDecision {
    if page.allowed_roles().contains(&role) {
        GuardDecision::Granted
    } else {
        GuardDecision::RedirectHome
    }
}

/// Top-level menu entries for a role, in display order. Detail pages and
/// the create-user flow are reached from their lists, never from the menu.
pub fn menu_for(role: Role) -> Vec<Page> {
    let order = [
        Page::Dashboard,
        Page::KycQueue,
        Page::Users,
        Page::Transactions,
        Page::Events,
        Page::Withdrawals,
        Page::UserHistory,
        Page::Ads,
        Page::Agents,
        Page::Config,
    ];
    order
        .into_iter()
        .filter(|page| check(role, *page) == GuardDecision::Granted)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_is_granted_everywhere() {
        for page in Page::ALL {
            assert_eq!(check(Role::SuperAdmin, page), GuardDecision::Granted);
        }
    }

    #[test]
    fn reconciliation_agent_is_redirected_from_kyc_queue() {
        assert_eq!(
            check(Role::ReconciliationAgent, Page::KycQueue),
            GuardDecision::RedirectHome
        );
        assert_eq!(
            check(Role::ReconciliationAgent, Page::KycReview),
            GuardDecision::RedirectHome
        );
    }

    #[test]
    fn onboarding_agent_is_redirected_from_reconciliation_and_admin_pages() {
        for page in [
            Page::Transactions,
            Page::Withdrawals,
            Page::UserHistory,
            Page::Ads,
            Page::Agents,
            Page::Config,
        ] {
            assert_eq!(
                check(Role::OnboardingAgent, page),
                GuardDecision::RedirectHome
            );
        }
    }

    #[test]
    fn grant_matches_allowed_set_exhaustively() {
        for role in Role::ALL {
            for page in Page::ALL {
                let expected = page.allowed_roles().contains(&role);
                assert_eq!(
                    check(role, page) == GuardDecision::Granted,
                    expected,
                    "role {role:?} page {page:?}"
                );
            }
        }
    }

    #[test]
    fn menus_only_contain_granted_pages_and_always_start_home() {
        for role in Role::ALL {
            let menu = menu_for(role);
            assert_eq!(menu.first(), Some(&Page::Dashboard));
            for page in menu {
                assert_eq!(check(role, page), GuardDecision::Granted);
            }
        }
    }

    #[test]
    fn detail_pages_never_appear_in_menus() {
        for role in Role::ALL {
            let menu = menu_for(role);
            for page in [
                Page::KycReview,
                Page::CreateUser,
                Page::TransactionDetail,
                Page::EventDetail,
                Page::WithdrawalDetail,
            ] {
                assert!(!menu.contains(&page));
            }
        }
    }
}
