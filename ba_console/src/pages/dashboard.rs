//! Role-specific home dashboards: a few stat cards, nothing more. Each
//! figure degrades independently — a failed count renders as a dash, never
//! an error page.

use bahumati::ServiceResult;
use bahumati::models::{EventStatus, KycStatus, Role, WithdrawStatus};
use bahumati::services::Services;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Stylize,
    text::{Line, Text},
    widgets::{Block, Paragraph},
};

use crate::app::{App, FetchResult, PageState};
use crate::widgets::inr;

#[derive(Debug, Default)]
pub struct DashboardData {
    pub users_total: Option<u64>,
    pub kyc_pending: Option<usize>,
    pub events_ongoing: Option<usize>,
    pub withdrawals_pending: Option<usize>,
    pub total_volume: Option<f64>,
}

pub struct DashboardPage {
    pub loading: bool,
    pub data: DashboardData,
}

pub fn enter(app: &mut App, role: Role) {
    app.page = PageState::Dashboard(DashboardPage {
        loading: true,
        data: DashboardData::default(),
    });
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move { FetchResult::Dashboard(load(svc, role).await) });
}

fn note<T>(result: ServiceResult<T>, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("dashboard {what} fetch degraded: {e}");
            None
        }
    }
}

async fn load(svc: Services, role: Role) -> DashboardData {
    let mut data = DashboardData::default();
    match role {
        Role::OnboardingAgent => {
            let (users, kyc) = tokio::join!(
                svc.users.list(1, 1),
                svc.kyc.list(Some(KycStatus::Pending))
            );
            data.users_total = note(users, "users").map(|page| page.total);
            data.kyc_pending = note(kyc, "kyc").map(|cases| cases.len());
        }
        Role::ReconciliationAgent => {
            let (withdrawals, events, transactions) = tokio::join!(
                svc.withdrawals.list(Some(WithdrawStatus::Pending)),
                svc.events.list(),
                svc.transactions.list()
            );
            data.withdrawals_pending = note(withdrawals, "withdrawals").map(|w| w.len());
            data.events_ongoing = note(events, "events")
                .map(|events| events.iter().filter(|e| e.status == EventStatus::Ongoing).count());
            data.total_volume = note(transactions, "transactions")
                .map(|txs| txs.iter().map(|t| t.amount).sum());
        }
        Role::SuperAdmin => {
            let (users, kyc, withdrawals, events, transactions) = tokio::join!(
                svc.users.list(1, 1),
                svc.kyc.list(Some(KycStatus::Pending)),
                svc.withdrawals.list(Some(WithdrawStatus::Pending)),
                svc.events.list(),
                svc.transactions.list()
            );
            data.users_total = note(users, "users").map(|page| page.total);
            data.kyc_pending = note(kyc, "kyc").map(|cases| cases.len());
            data.withdrawals_pending = note(withdrawals, "withdrawals").map(|w| w.len());
            data.events_ongoing = note(events, "events")
                .map(|events| events.iter().filter(|e| e.status == EventStatus::Ongoing).count());
            data.total_volume = note(transactions, "transactions")
                .map(|txs| txs.iter().map(|t| t.amount).sum());
        }
    }
    data
}

fn stat_card(frame: &mut Frame, area: Rect, label: &str, value: Option<String>) {
    let value = value.unwrap_or_else(|| "—".to_string());
    let text = Text::from(vec![
        Line::raw(""),
        Line::from(value.bold()).alignment(Alignment::Center),
        Line::from(label.to_string().dim()).alignment(Alignment::Center),
    ]);
    frame.render_widget(Paragraph::new(text).block(Block::bordered()), area);
}

pub fn draw(page: &DashboardPage, role: Role, frame: &mut Frame, area: Rect) {
    if page.loading {
        frame.render_widget(
            Paragraph::new("Loading dashboard…").alignment(Alignment::Center),
            area,
        );
        return;
    }

    let cards: Vec<(&str, Option<String>)> = match role {
        Role::OnboardingAgent => vec![
            ("Total Users", page.data.users_total.map(|n| n.to_string())),
            ("Pending KYC", page.data.kyc_pending.map(|n| n.to_string())),
        ],
        Role::ReconciliationAgent => vec![
            ("Pending Withdrawals", page.data.withdrawals_pending.map(|n| n.to_string())),
            ("Ongoing Events", page.data.events_ongoing.map(|n| n.to_string())),
            ("Total Volume", page.data.total_volume.map(inr)),
        ],
        Role::SuperAdmin => vec![
            ("Total Users", page.data.users_total.map(|n| n.to_string())),
            ("Pending KYC", page.data.kyc_pending.map(|n| n.to_string())),
            ("Pending Withdrawals", page.data.withdrawals_pending.map(|n| n.to_string())),
            ("Ongoing Events", page.data.events_ongoing.map(|n| n.to_string())),
            ("Total Volume", page.data.total_volume.map(inr)),
        ],
    };

    let [row] = Layout::vertical([Constraint::Length(5)]).areas(area);
    let constraints: Vec<Constraint> = cards.iter().map(|_| Constraint::Fill(1)).collect();
    let slots = Layout::horizontal(constraints).split(row);
    for (idx, (label, value)) in cards.into_iter().enumerate() {
        if let Some(slot) = slots.get(idx) {
            stat_card(frame, *slot, label, value);
        }
    }
}
