//! Page modules and the app-level dispatch for keys, data, and drawing.

pub mod admin;
pub mod dashboard;
pub mod login;
pub mod onboarding;
pub mod reconciliation;

use bahumati::access;
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{App, FetchResult, PageState, Route};
use crate::widgets::{self, ToastKind};

/// Route a key press to the active page. Returns true when consumed.
pub fn on_key(app: &mut App, key: KeyEvent) -> bool {
    match &app.page {
        PageState::Login(_) => login::on_key(app, key),
        PageState::Dashboard(_) => false,
        PageState::KycQueue(_) => onboarding::kyc_queue_key(app, key),
        PageState::KycReview(_) => onboarding::kyc_review_key(app, key),
        PageState::Users(_) => onboarding::users_key(app, key),
        PageState::CreateUser(_) => onboarding::create_user_key(app, key),
        PageState::UserHistory(_) => reconciliation::user_history_key(app, key),
        PageState::Transactions(_) => reconciliation::transactions_key(app, key),
        PageState::TransactionDetail(_) => false,
        PageState::Events(_) => reconciliation::events_key(app, key),
        PageState::EventDetail(_) => reconciliation::event_detail_key(app, key),
        PageState::Withdrawals(_) => reconciliation::withdrawals_key(app, key),
        PageState::WithdrawalDetail(_) => reconciliation::withdrawal_detail_key(app, key),
        PageState::Ads(_) => admin::ads_key(app, key),
        PageState::Agents(_) => admin::agents_key(app, key),
        PageState::Config(_) => admin::config_key(app, key),
    }
}

/// Apply a completed fetch to the page that requested it. Results for a
/// page the operator already left are dropped — their tasks were aborted,
/// but anything already queued on the channel lands here.
pub fn on_data(app: &mut App, result: FetchResult) {
    let mut degraded: Option<String> = None;

    match (&mut app.page, result) {
        (PageState::Dashboard(page), FetchResult::Dashboard(data)) => {
            page.data = data;
            page.loading = false;
        }
        (PageState::KycQueue(page), FetchResult::KycQueue(result)) => match result {
            Ok(cases) => {
                page.cases = cases;
                page.table.loading = false;
                page.sync_table();
            }
            Err(e) => {
                page.table.loading = false;
                page.table.loaded(0);
                degraded = Some(e.user_message());
            }
        },
        (PageState::KycReview(page), FetchResult::KycReview(result)) => {
            page.loading = false;
            match result {
                Ok((user, case)) => {
                    page.user = Some(user);
                    page.case = case;
                }
                Err(e) => degraded = Some(e.user_message()),
            }
        }
        (PageState::Users(page), FetchResult::Users(result)) => match result {
            Ok(loaded) => onboarding::on_users_loaded(page, loaded),
            Err(e) => {
                page.users.clear();
                page.table.loaded(0);
                degraded = Some(e.user_message());
            }
        },
        (PageState::CreateUser(page), FetchResult::OtpSent(result)) => {
            page.submitting = false;
            match result {
                Ok(()) => page.step = onboarding::WizardStep::Otp,
                Err(e) => degraded = Some(e.user_message()),
            }
        }
        (PageState::CreateUser(page), FetchResult::OtpVerified(result)) => {
            page.submitting = false;
            match result {
                Ok(enrolled) => {
                    page.enrolled = Some(enrolled);
                    page.step = onboarding::WizardStep::Allocation;
                }
                Err(e) => degraded = Some(e.user_message()),
            }
        }
        (PageState::CreateUser(page), FetchResult::AllocationSet(result)) => {
            page.submitting = false;
            match result {
                Ok(()) => page.step = onboarding::WizardStep::Done,
                Err(e) => degraded = Some(e.user_message()),
            }
        }
        (PageState::UserHistory(page), FetchResult::UserHistory(result)) => {
            page.loading = false;
            match result {
                Ok(data) => {
                    page.data = Some(data);
                    page.tab = reconciliation::HistoryTab::Transactions;
                    let len = page
                        .data
                        .as_ref()
                        .map_or(0, |d| d.history.transactions.len());
                    page.table.loaded(len);
                }
                Err(e) => degraded = Some(e.user_message()),
            }
        }
        (PageState::Transactions(page), FetchResult::Transactions(result)) => match result {
            Ok(transactions) => {
                page.transactions = transactions;
                page.table.loaded(page.transactions.len());
            }
            Err(e) => {
                page.table.loaded(0);
                degraded = Some(e.user_message());
            }
        },
        (PageState::TransactionDetail(page), FetchResult::TransactionDetail(result)) => {
            page.loading = false;
            match result {
                Ok(transaction) => page.transaction = transaction,
                Err(e) => degraded = Some(e.user_message()),
            }
        }
        (PageState::Events(page), FetchResult::Events(result)) => match result {
            Ok(events) => {
                page.events = events;
                page.table.loaded(page.events.len());
            }
            Err(e) => {
                page.table.loaded(0);
                degraded = Some(e.user_message());
            }
        },
        (PageState::EventDetail(page), FetchResult::EventDetail(result)) => {
            page.loading = false;
            match result {
                Ok(detail) => {
                    page.gifts_table.loaded(detail.gifts.len());
                    page.withdrawals_table.loaded(detail.withdrawals.len());
                    page.detail = Some(detail);
                }
                Err(e) => degraded = Some(e.user_message()),
            }
        }
        (PageState::Withdrawals(page), FetchResult::Withdrawals(result)) => match result {
            Ok(requests) => {
                page.requests = requests;
                page.table.loaded(page.requests.len());
            }
            Err(e) => {
                page.table.loaded(0);
                degraded = Some(e.user_message());
            }
        },
        (PageState::WithdrawalDetail(page), FetchResult::WithdrawalDetail(result)) => {
            page.loading = false;
            match *result {
                Ok(ctx) => {
                    if let Some(tx_id) = &ctx.request.transaction_id {
                        page.tx_id = page.tx_id.clone().with_value(tx_id.clone());
                    }
                    page.ctx = Some(ctx);
                }
                Err(e) => degraded = Some(e.user_message()),
            }
        }
        (PageState::Ads(page), FetchResult::Ads(result)) => match result {
            Ok(ads) => {
                page.ads = ads;
                page.modal = None;
                page.confirm_delete = false;
                page.submitting = false;
                page.table.loaded(page.ads.len());
            }
            Err(e) => {
                page.table.loaded(0);
                degraded = Some(e.user_message());
            }
        },
        (PageState::Agents(page), FetchResult::Agents(result)) => match result {
            Ok(agents) => {
                page.agents = agents;
                page.modal = None;
                page.confirm_delete = false;
                page.submitting = false;
                page.table.loaded(page.agents.len());
            }
            Err(e) => {
                page.table.loaded(0);
                degraded = Some(e.user_message());
            }
        },
        (PageState::Config(page), FetchResult::Config(result)) => match result {
            Ok(config) => {
                admin::on_config_loaded(page, &config);
                page.submitting = false;
            }
            Err(e) => degraded = Some(e.user_message()),
        },
        // Stale result for a page that is no longer current.
        _ => {}
    }

    if let Some(message) = degraded {
        app.toast(ToastKind::Error, message);
    }
}

/// Reset in-progress flags after a failed mutation so the page accepts
/// input again.
pub fn clear_submitting(page: &mut PageState) {
    match page {
        PageState::Login(p) => p.submitting = false,
        PageState::KycReview(p) => p.submitting = false,
        PageState::CreateUser(p) => p.submitting = false,
        PageState::EventDetail(p) => p.submitting = false,
        PageState::WithdrawalDetail(p) => p.submitting = false,
        PageState::Ads(p) => p.submitting = false,
        PageState::Agents(p) => p.submitting = false,
        PageState::Config(p) => p.submitting = false,
        _ => {}
    }
}

fn hints(route: &Route) -> &'static [(&'static str, &'static str)] {
    match route {
        Route::Login => &[("Enter", "log in"), ("Tab", "next field"), ("Esc", "quit")],
        Route::Dashboard => &[("1-9", "menu"), ("^R", "refresh"), ("^L", "logout"), ("^Q", "quit")],
        Route::KycQueue => &[
            ("↑↓", "select"),
            ("Enter", "review"),
            ("f", "filter"),
            ("/", "search"),
            ("Esc", "home"),
        ],
        Route::KycReview { .. } => &[
            ("a", "approve"),
            ("x", "reject"),
            ("b", "ban/unban"),
            ("Esc", "back"),
        ],
        Route::Users => &[
            ("↑↓", "select"),
            ("◂▸", "page"),
            ("Enter", "open"),
            ("b", "ban/unban"),
            ("c", "create"),
            ("Esc", "home"),
        ],
        Route::CreateUser => &[("Enter", "continue"), ("Esc", "abandon")],
        Route::UserHistory => &[
            ("/", "search"),
            ("t/e/w", "tabs"),
            ("Enter", "open"),
            ("Esc", "home"),
        ],
        Route::Transactions => &[("↑↓", "select"), ("Enter", "detail"), ("Esc", "home")],
        Route::TransactionDetail { .. } => &[("Esc", "back")],
        Route::Events => &[("↑↓", "select"), ("Enter", "detail"), ("Esc", "home")],
        Route::EventDetail { .. } => &[
            ("Tab", "gifts/withdrawals"),
            ("u", "withdraw %"),
            ("d", "delete"),
            ("Esc", "back"),
        ],
        Route::Withdrawals => &[
            ("↑↓", "select"),
            ("Enter", "process"),
            ("f", "filter"),
            ("Esc", "home"),
        ],
        Route::WithdrawalDetail { .. } => &[
            ("c", "complete"),
            ("x", "reject"),
            ("Esc", "back"),
        ],
        Route::Ads | Route::Agents => &[
            ("c", "create"),
            ("e", "edit"),
            ("d", "delete"),
            ("Esc", "home"),
        ],
        Route::Config => &[("Tab", "next field"), ("^S", "save"), ("Esc", "home")],
    }
}

fn draw_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = app.route.page().title();
    let operator = app
        .operator
        .as_ref()
        .map(|op| format!("{} ({})", op.name, op.role))
        .unwrap_or_default();
    let line = Line::from(vec![
        Span::styled(" Bahumati ", Style::new().bold().white()),
        Span::raw(format!("— {title}")),
        Span::raw("  "),
        Span::styled(operator, Style::new().dim()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_menu(app: &App, frame: &mut Frame, area: Rect) {
    let Some(operator) = &app.operator else {
        return;
    };
    let current = app.route.page();
    let mut spans: Vec<Span> = Vec::new();
    for (idx, page) in access::menu_for(operator.role).into_iter().enumerate() {
        let digit = if idx == 9 { 0 } else { idx + 1 };
        let label = format!("[{digit}] {}  ", page.title());
        if page == current {
            spans.push(Span::styled(label, Style::new().bold().light_yellow()));
        } else {
            spans.push(Span::raw(label));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Top-level draw: chrome plus the active page body.
pub fn draw(app: &mut App, frame: &mut Frame) {
    if let PageState::Login(_) = &app.page {
        let [body, toast_area, help] = Layout::vertical([
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        if let PageState::Login(page) = &app.page {
            login::draw(page, frame, body);
        }
        app.toasts.draw(frame, toast_area);
        widgets::help_bar(frame, help, hints(&Route::Login));
        return;
    }

    let [header, menu, body, toast_area, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(8),
        Constraint::Length(6),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(app, frame, header);
    draw_menu(app, frame, menu);

    let role = app.operator.as_ref().map(|op| op.role);
    match &mut app.page {
        PageState::Login(_) => {}
        PageState::Dashboard(page) => {
            if let Some(role) = role {
                dashboard::draw(page, role, frame, body);
            }
        }
        PageState::KycQueue(page) => onboarding::draw_kyc_queue(page, frame, body),
        PageState::KycReview(page) => onboarding::draw_kyc_review(page, frame, body),
        PageState::Users(page) => onboarding::draw_users(page, frame, body),
        PageState::CreateUser(page) => onboarding::draw_create_user(page, frame, body),
        PageState::UserHistory(page) => reconciliation::draw_user_history(page, frame, body),
        PageState::Transactions(page) => reconciliation::draw_transactions(page, frame, body),
        PageState::TransactionDetail(page) => {
            reconciliation::draw_transaction_detail(page, frame, body)
        }
        PageState::Events(page) => reconciliation::draw_events(page, frame, body),
        PageState::EventDetail(page) => reconciliation::draw_event_detail(page, frame, body),
        PageState::Withdrawals(page) => reconciliation::draw_withdrawals(page, frame, body),
        PageState::WithdrawalDetail(page) => {
            reconciliation::draw_withdrawal_detail(page, frame, body)
        }
        PageState::Ads(page) => admin::draw_ads(page, frame, body),
        PageState::Agents(page) => admin::draw_agents(page, frame, body),
        PageState::Config(page) => admin::draw_config(page, frame, body),
    }

    app.toasts.draw(frame, toast_area);
    let route = app.route.clone();
    widgets::help_bar(frame, help, hints(&route));
}
