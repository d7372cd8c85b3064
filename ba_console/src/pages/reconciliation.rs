//! Reconciliation-agent pages: transactions, events, the withdrawal
//! settlement queue, and the user-history lookup.

use bahumati::ServiceError;
use bahumati::models::{
    EndUser, Event, EventDetail, Transaction, UserHistory, WithdrawRequest, WithdrawStatus,
};
use bahumati::services::withdrawals::{WithdrawWindow, window_for};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Stylize,
    text::Text,
    widgets::{Block, Cell, Paragraph, Row},
};

use crate::app::{App, FetchResult, PageState, Route};
use crate::widgets::{
    self, DataTable, TextField, ToastKind, amount_cell, date, datetime, info_lines, inr,
};

// --- Transactions -----------------------------------------------------------

pub struct TransactionsPage {
    pub transactions: Vec<Transaction>,
    pub table: DataTable,
}

pub fn enter_transactions(app: &mut App) {
    app.page = PageState::Transactions(TransactionsPage {
        transactions: Vec::new(),
        table: DataTable::new("No transactions."),
    });
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move { FetchResult::Transactions(svc.transactions.list().await) });
}

pub fn transactions_key(app: &mut App, key: KeyEvent) -> bool {
    let open = {
        let PageState::Transactions(page) = &mut app.page else {
            return false;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        match key.code {
            KeyCode::Enter => page
                .table
                .selected()
                .and_then(|idx| page.transactions.get(idx))
                .map(|tx| tx.id.clone()),
            _ => return page.table.handle_key(key),
        }
    };
    if let Some(id) = open {
        app.navigate(Route::TransactionDetail { id });
    }
    true
}

pub fn draw_transactions(page: &mut TransactionsPage, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row> = page
        .transactions
        .iter()
        .map(|tx| {
            Row::new(vec![
                Cell::new(date(&tx.created_at)),
                Cell::new(tx.id.clone()),
                Cell::new(tx.user_id.clone()),
                Cell::new(tx.tx_type.to_string()),
                amount_cell(tx.amount),
                Cell::new(tx.status.to_string()),
            ])
        })
        .collect();
    page.table.draw(
        frame,
        area,
        "transactions",
        Row::new(vec!["Date", "ID", "User", "Type", "Amount", "Status"]),
        &[
            Constraint::Length(10),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ],
        rows,
        None,
    );
}

pub struct TransactionDetailPage {
    pub id: String,
    pub transaction: Option<Transaction>,
    pub loading: bool,
}

pub fn enter_transaction_detail(app: &mut App, id: String) {
    app.page = PageState::TransactionDetail(TransactionDetailPage {
        id: id.clone(),
        transaction: None,
        loading: true,
    });
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move { FetchResult::TransactionDetail(svc.transactions.get_by_id(&id).await) });
}

pub fn draw_transaction_detail(page: &TransactionDetailPage, frame: &mut Frame, area: Rect) {
    if page.loading {
        frame.render_widget(Paragraph::new("Loading…").alignment(Alignment::Center), area);
        return;
    }
    let text = match &page.transaction {
        Some(tx) => info_lines(&[
            ("ID", tx.id.clone()),
            ("User", tx.user_id.clone()),
            ("Event", tx.event_id.clone().unwrap_or_else(|| "—".to_string())),
            ("Type", tx.tx_type.to_string()),
            ("Amount", format!("{} {}", inr(tx.amount), tx.currency)),
            ("Status", tx.status.to_string()),
            ("Created", datetime(&tx.created_at)),
            (
                "Processed",
                tx.processed_at.as_ref().map(datetime).unwrap_or_else(|| "—".to_string()),
            ),
        ]),
        None => Text::raw("Transaction not found."),
    };
    frame.render_widget(
        Paragraph::new(text).block(Block::bordered().title(" transaction  ")),
        area,
    );
}

// --- Events -----------------------------------------------------------------

pub struct EventsPage {
    pub events: Vec<Event>,
    pub table: DataTable,
}

pub fn enter_events(app: &mut App) {
    app.page = PageState::Events(EventsPage {
        events: Vec::new(),
        table: DataTable::new("No events."),
    });
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move { FetchResult::Events(svc.events.list().await) });
}

pub fn events_key(app: &mut App, key: KeyEvent) -> bool {
    let open = {
        let PageState::Events(page) = &mut app.page else {
            return false;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        match key.code {
            KeyCode::Enter => page
                .table
                .selected()
                .and_then(|idx| page.events.get(idx))
                .map(|event| event.id.clone()),
            _ => return page.table.handle_key(key),
        }
    };
    if let Some(id) = open {
        app.navigate(Route::EventDetail { id });
    }
    true
}

pub fn draw_events(page: &mut EventsPage, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row> = page
        .events
        .iter()
        .map(|event| {
            let status = match event.status {
                bahumati::models::EventStatus::Upcoming => Cell::new("Upcoming".light_blue()),
                bahumati::models::EventStatus::Ongoing => Cell::new("Ongoing".light_green()),
                bahumati::models::EventStatus::Ended => Cell::new("Ended".dim()),
            };
            Row::new(vec![
                Cell::new(event.title.clone()),
                Cell::new(event.creator_name.clone().unwrap_or_else(|| "—".to_string())),
                Cell::new(date(&event.start_date)),
                Cell::new(date(&event.end_date)),
                status,
                amount_cell(event.total_collected),
            ])
        })
        .collect();
    page.table.draw(
        frame,
        area,
        "events",
        Row::new(vec!["Title", "Creator", "Start", "End", "Status", "Collected"]),
        &[
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ],
        rows,
        None,
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDetailFocus {
    Gifts,
    Withdrawals,
}

pub struct EventDetailPage {
    pub id: String,
    pub detail: Option<EventDetail>,
    pub loading: bool,
    pub focus: EventDetailFocus,
    pub gifts_table: DataTable,
    pub withdrawals_table: DataTable,
    pub percent_edit: Option<TextField>,
    pub confirm_delete: bool,
    pub submitting: bool,
}

pub fn enter_event_detail(app: &mut App, id: String) {
    app.page = PageState::EventDetail(EventDetailPage {
        id: id.clone(),
        detail: None,
        loading: true,
        focus: EventDetailFocus::Gifts,
        gifts_table: DataTable::new("No gifts."),
        withdrawals_table: DataTable::new("No withdrawals."),
        percent_edit: None,
        confirm_delete: false,
        submitting: false,
    });
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move { FetchResult::EventDetail(svc.events.detail(&id).await) });
}

pub fn event_detail_key(app: &mut App, key: KeyEvent) -> bool {
    use bahumati::services::EventRulesUpdate;

    enum Intent {
        Pass,
        Consumed,
        Toast(String),
        UpdatePercent { id: String, percent: f64 },
        Delete(String),
        OpenWithdrawal(String),
    }

    let intent = {
        let PageState::EventDetail(page) = &mut app.page else {
            return false;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) || page.submitting {
            Intent::Pass
        } else if let Some(edit) = &mut page.percent_edit {
            match key.code {
                KeyCode::Esc => {
                    page.percent_edit = None;
                    Intent::Consumed
                }
                KeyCode::Enter => match edit.trimmed().parse::<f64>() {
                    Ok(percent) if (0.0..=100.0).contains(&percent) => {
                        page.submitting = true;
                        Intent::UpdatePercent {
                            id: page.id.clone(),
                            percent,
                        }
                    }
                    _ => Intent::Toast("Percentage must be between 0 and 100".to_string()),
                },
                _ => {
                    edit.handle_key(key);
                    Intent::Consumed
                }
            }
        } else if page.confirm_delete {
            match key.code {
                KeyCode::Char('y') => {
                    page.submitting = true;
                    Intent::Delete(page.id.clone())
                }
                _ => {
                    page.confirm_delete = false;
                    Intent::Consumed
                }
            }
        } else {
            match key.code {
                KeyCode::Tab => {
                    page.focus = match page.focus {
                        EventDetailFocus::Gifts => EventDetailFocus::Withdrawals,
                        EventDetailFocus::Withdrawals => EventDetailFocus::Gifts,
                    };
                    Intent::Consumed
                }
                KeyCode::Char('%') | KeyCode::Char('u') => {
                    let current = page
                        .detail
                        .as_ref()
                        .map(|d| d.event.allowed_withdraw_percentage.to_string())
                        .unwrap_or_default();
                    page.percent_edit =
                        Some(TextField::new("Withdraw percentage").with_value(current));
                    Intent::Consumed
                }
                KeyCode::Char('d') => {
                    page.confirm_delete = true;
                    Intent::Consumed
                }
                KeyCode::Enter if page.focus == EventDetailFocus::Withdrawals => {
                    match page.withdrawals_table.selected().and_then(|idx| {
                        page.detail.as_ref().and_then(|d| d.withdrawals.get(idx))
                    }) {
                        Some(request) => Intent::OpenWithdrawal(request.id.clone()),
                        None => Intent::Consumed,
                    }
                }
                _ => {
                    let handled = match page.focus {
                        EventDetailFocus::Gifts => page.gifts_table.handle_key(key),
                        EventDetailFocus::Withdrawals => page.withdrawals_table.handle_key(key),
                    };
                    if handled { Intent::Consumed } else { Intent::Pass }
                }
            }
        }
    };

    match intent {
        Intent::Pass => false,
        Intent::Consumed => true,
        Intent::Toast(message) => {
            app.toast(ToastKind::Error, message);
            true
        }
        Intent::UpdatePercent { id, percent } => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc
                        .events
                        .update_rules(
                            &id,
                            EventRulesUpdate {
                                withdrawal_percentage: Some(percent),
                                ..Default::default()
                            },
                        )
                        .await,
                    success: "Event rules updated".to_string(),
                    goto: None,
                }
            });
            true
        }
        Intent::Delete(id) => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc.events.delete(&id).await,
                    success: "Event deleted".to_string(),
                    goto: Some(Route::Events),
                }
            });
            true
        }
        Intent::OpenWithdrawal(id) => {
            app.navigate(Route::WithdrawalDetail { id });
            true
        }
    }
}

pub fn draw_event_detail(page: &mut EventDetailPage, frame: &mut Frame, area: Rect) {
    if page.loading {
        frame.render_widget(Paragraph::new("Loading…").alignment(Alignment::Center), area);
        return;
    }
    let Some(detail) = &page.detail else {
        frame.render_widget(Paragraph::new("Event not found."), area);
        return;
    };

    let [info_area, tables_area] =
        Layout::vertical([Constraint::Length(10), Constraint::Min(4)]).areas(area);
    let [event_area, stats_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(info_area);

    let event = &detail.event;
    frame.render_widget(
        Paragraph::new(info_lines(&[
            ("Title", event.title.clone()),
            ("Creator", event.creator_name.clone().unwrap_or_else(|| "—".to_string())),
            ("Window", format!("{} → {}", date(&event.start_date), date(&event.end_date))),
            ("Status", event.status.to_string()),
            ("Withdraw %", format!("{}%", event.allowed_withdraw_percentage)),
            (
                "Auto-allocation",
                event.auto_allocation_date.as_ref().map(date).unwrap_or_else(|| "—".to_string()),
            ),
        ]))
        .block(Block::bordered().title(" event  ")),
        event_area,
    );

    let stats = &detail.stats;
    frame.render_widget(
        Paragraph::new(info_lines(&[
            ("Gifts received", stats.total_gifts_received.to_string()),
            ("Gifts amount", inr(stats.total_gifts_amount)),
            ("Max withdrawable", inr(stats.max_withdrawable)),
            ("Withdrawn", inr(stats.total_withdrawn)),
            ("Pending withdrawals", inr(stats.total_pending_withdrawals)),
            ("Available", inr(stats.available_for_withdrawal)),
        ]))
        .block(Block::bordered().title(" funds  ")),
        stats_area,
    );

    let [gifts_area, withdrawals_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(tables_area);

    let gift_rows: Vec<Row> = detail
        .gifts
        .iter()
        .map(|gift| {
            Row::new(vec![
                Cell::new(gift.sender_name.clone()),
                amount_cell(gift.amount),
                Cell::new(date(&gift.created_at)),
            ])
        })
        .collect();
    let gifts_title = if page.focus == EventDetailFocus::Gifts {
        "gifts [active]"
    } else {
        "gifts"
    };
    page.gifts_table.draw(
        frame,
        gifts_area,
        gifts_title,
        Row::new(vec!["Sender", "Amount", "Date"]),
        &[Constraint::Fill(2), Constraint::Fill(1), Constraint::Length(10)],
        gift_rows,
        None,
    );

    let withdrawal_rows: Vec<Row> = detail
        .withdrawals
        .iter()
        .map(|request| {
            Row::new(vec![
                Cell::new(request.user_id.clone()),
                amount_cell(request.requested_amount),
                Cell::new(request.status.to_string()),
                Cell::new(date(&request.request_date)),
            ])
        })
        .collect();
    let withdrawals_title = if page.focus == EventDetailFocus::Withdrawals {
        "withdrawals [active]"
    } else {
        "withdrawals"
    };
    page.withdrawals_table.draw(
        frame,
        withdrawals_area,
        withdrawals_title,
        Row::new(vec!["User", "Amount", "Status", "Date"]),
        &[
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(10),
        ],
        withdrawal_rows,
        None,
    );

    if let Some(edit) = &page.percent_edit {
        let modal = widgets::modal_area(frame, 44, 3);
        let inner = widgets::modal_block(frame, modal, "Allowed withdraw percentage");
        frame.render_widget(Paragraph::new(edit.value.clone()), inner);
    }
    if page.confirm_delete {
        let modal = widgets::modal_area(frame, 44, 3);
        let inner = widgets::modal_block(frame, modal, "Delete event?");
        frame.render_widget(Paragraph::new("press y to confirm, any other key to cancel"), inner);
    }
}

// --- Withdrawals ------------------------------------------------------------

pub struct WithdrawalsPage {
    pub requests: Vec<WithdrawRequest>,
    pub table: DataTable,
    pub filter: Option<WithdrawStatus>,
}

pub fn enter_withdrawals(app: &mut App) {
    app.page = PageState::Withdrawals(WithdrawalsPage {
        requests: Vec::new(),
        table: DataTable::new("No withdrawal requests."),
        filter: Some(WithdrawStatus::Pending),
    });
    load_withdrawals(app, Some(WithdrawStatus::Pending));
}

fn load_withdrawals(app: &mut App, filter: Option<WithdrawStatus>) {
    if let PageState::Withdrawals(page) = &mut app.page {
        page.table.loading = true;
        page.filter = filter;
    }
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move { FetchResult::Withdrawals(svc.withdrawals.list(filter).await) });
}

fn cycle_withdraw_filter(filter: Option<WithdrawStatus>) -> Option<WithdrawStatus> {
    match filter {
        Some(WithdrawStatus::Pending) => Some(WithdrawStatus::Completed),
        Some(WithdrawStatus::Completed) => Some(WithdrawStatus::Rejected),
        Some(WithdrawStatus::Rejected) => None,
        None => Some(WithdrawStatus::Pending),
    }
}

pub fn withdrawals_key(app: &mut App, key: KeyEvent) -> bool {
    enum Intent {
        Pass,
        Consumed,
        Reload(Option<WithdrawStatus>),
        Open(String),
    }

    let intent = {
        let PageState::Withdrawals(page) = &mut app.page else {
            return false;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            Intent::Pass
        } else {
            match key.code {
                KeyCode::Char('f') => Intent::Reload(cycle_withdraw_filter(page.filter)),
                KeyCode::Enter => match page.table.selected().and_then(|idx| page.requests.get(idx)) {
                    Some(request) => Intent::Open(request.id.clone()),
                    None => Intent::Consumed,
                },
                _ => {
                    if page.table.handle_key(key) {
                        Intent::Consumed
                    } else {
                        Intent::Pass
                    }
                }
            }
        }
    };

    match intent {
        Intent::Pass => false,
        Intent::Consumed => true,
        Intent::Reload(filter) => {
            load_withdrawals(app, filter);
            true
        }
        Intent::Open(id) => {
            app.navigate(Route::WithdrawalDetail { id });
            true
        }
    }
}

pub fn draw_withdrawals(page: &mut WithdrawalsPage, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row> = page
        .requests
        .iter()
        .map(|request| {
            let status = match request.status {
                WithdrawStatus::Pending => Cell::new("Pending".light_yellow()),
                WithdrawStatus::Completed => Cell::new("Completed".light_green()),
                WithdrawStatus::Rejected => Cell::new("Rejected".light_red()),
            };
            Row::new(vec![
                Cell::new(date(&request.request_date)),
                Cell::new(request.user_id.clone()),
                Cell::new(
                    request
                        .event_title
                        .clone()
                        .or_else(|| request.event_id.clone())
                        .unwrap_or_else(|| "not linked".to_string()),
                ),
                amount_cell(request.requested_amount),
                amount_cell(request.allowed_max_amount),
                status,
            ])
        })
        .collect();

    let filter_label = match page.filter {
        Some(status) => status.to_string(),
        None => "All".to_string(),
    };
    page.table.draw(
        frame,
        area,
        &format!("withdrawals — {filter_label}"),
        Row::new(vec!["Date", "User", "Event", "Requested", "Max", "Status"]),
        &[
            Constraint::Length(10),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ],
        rows,
        None,
    );
}

/// Everything the settlement screen needs: the request, its user's payout
/// details, the linked event, and the evaluated window.
pub struct WithdrawalContext {
    pub request: WithdrawRequest,
    pub user: Option<EndUser>,
    pub event: Option<Event>,
    pub window: WithdrawWindow,
}

pub struct WithdrawalDetailPage {
    pub id: String,
    pub ctx: Option<WithdrawalContext>,
    pub loading: bool,
    pub tx_id: TextField,
    pub reason: Option<TextField>,
    pub submitting: bool,
}

pub fn enter_withdrawal_detail(app: &mut App, id: String) {
    app.page = PageState::WithdrawalDetail(WithdrawalDetailPage {
        id: id.clone(),
        ctx: None,
        loading: true,
        tx_id: TextField::new("Transaction ID"),
        reason: None,
        submitting: false,
    });
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move {
        let result = async {
            let request = svc
                .withdrawals
                .get_by_id(&id)
                .await?
                .ok_or_else(|| ServiceError::Rejected("Withdrawal request not found".to_string()))?;
            // Context fetches degrade independently; the request itself is
            // the only hard requirement.
            let user = match svc.users.find(&request.user_id).await {
                Ok(user) => Some(user),
                Err(e) => {
                    log::warn!("withdrawal user lookup degraded: {e}");
                    None
                }
            };
            let event = match &request.event_id {
                Some(event_id) => match svc.events.detail(event_id).await {
                    Ok(detail) => Some(detail.event),
                    Err(e) => {
                        log::warn!("withdrawal event lookup degraded: {e}");
                        None
                    }
                },
                None => None,
            };
            let window = window_for(&request, event.as_ref(), Utc::now());
            Ok(WithdrawalContext {
                request,
                user,
                event,
                window,
            })
        }
        .await;
        FetchResult::WithdrawalDetail(Box::new(result))
    });
}

pub fn withdrawal_detail_key(app: &mut App, key: KeyEvent) -> bool {
    enum Intent {
        Pass,
        Consumed,
        Toast(String),
        Approve(String),
        Reject { id: String, reason: String },
    }

    let intent = {
        let PageState::WithdrawalDetail(page) = &mut app.page else {
            return false;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) || page.submitting {
            Intent::Pass
        } else if let Some(reason) = &mut page.reason {
            match key.code {
                KeyCode::Esc => {
                    page.reason = None;
                    Intent::Consumed
                }
                KeyCode::Enter => {
                    let text = reason.trimmed().to_string();
                    if text.is_empty() {
                        Intent::Toast("Rejection reason is required".to_string())
                    } else {
                        page.submitting = true;
                        Intent::Reject {
                            id: page.id.clone(),
                            reason: text,
                        }
                    }
                }
                _ => {
                    reason.handle_key(key);
                    Intent::Consumed
                }
            }
        } else {
            let Some(ctx) = &page.ctx else {
                return false;
            };
            let pending = ctx.request.status == WithdrawStatus::Pending;
            match key.code {
                // Completion stays disabled outside the window; the backend
                // would refuse it anyway.
                KeyCode::Char('c') if pending && ctx.window.is_open() => {
                    page.submitting = true;
                    Intent::Approve(page.id.clone())
                }
                KeyCode::Char('c') if pending => {
                    Intent::Toast("Settlement is disabled outside the withdrawal window".to_string())
                }
                KeyCode::Char('x') if pending => {
                    page.reason = Some(TextField::new("Rejection reason").required());
                    Intent::Consumed
                }
                _ => {
                    if page.tx_id.handle_key(key) {
                        Intent::Consumed
                    } else {
                        Intent::Pass
                    }
                }
            }
        }
    };

    match intent {
        Intent::Pass => false,
        Intent::Consumed => true,
        Intent::Toast(message) => {
            app.toast(ToastKind::Error, message);
            true
        }
        Intent::Approve(id) => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc.withdrawals.approve(&id).await,
                    success: "Withdrawal marked as completed".to_string(),
                    goto: Some(Route::Withdrawals),
                }
            });
            true
        }
        Intent::Reject { id, reason } => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc.withdrawals.reject(&id, &reason).await,
                    success: "Withdrawal rejected".to_string(),
                    goto: Some(Route::Withdrawals),
                }
            });
            true
        }
    }
}

pub fn draw_withdrawal_detail(page: &WithdrawalDetailPage, frame: &mut Frame, area: Rect) {
    if page.loading {
        frame.render_widget(Paragraph::new("Loading…").alignment(Alignment::Center), area);
        return;
    }
    let Some(ctx) = &page.ctx else {
        frame.render_widget(Paragraph::new("Withdrawal request not found."), area);
        return;
    };

    let pending = ctx.request.status == WithdrawStatus::Pending;
    let banner = if pending { ctx.window.banner() } else { None };
    let banner_height = if banner.is_some() { 3 } else { 0 };
    let [banner_area, body_area] =
        Layout::vertical([Constraint::Length(banner_height), Constraint::Min(6)]).areas(area);

    if let Some(text) = banner {
        frame.render_widget(
            Paragraph::new(format!("Warning: {text}"))
                .light_red()
                .block(Block::bordered()),
            banner_area,
        );
    }

    let [left, right] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(body_area);
    let [request_area, user_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)]).areas(left);

    let request = &ctx.request;
    let event_context = match &ctx.event {
        Some(event) => format!(
            "{} (ends {}, alloc {})",
            event.title,
            date(&event.end_date),
            event.auto_allocation_date.as_ref().map(date).unwrap_or_else(|| "—".to_string()),
        ),
        None => "Not linked to an event".to_string(),
    };
    frame.render_widget(
        Paragraph::new(info_lines(&[
            ("Request", request.id.clone()),
            ("User", request.user_id.clone()),
            ("Requested", inr(request.requested_amount)),
            ("Max allowed", inr(request.allowed_max_amount)),
            ("Status", request.status.to_string()),
            ("Requested on", datetime(&request.request_date)),
            ("Event", event_context),
        ]))
        .block(Block::bordered().title(" request  ")),
        request_area,
    );

    let user_text = match &ctx.user {
        Some(user) => {
            let mut pairs = vec![("Name", user.name.clone()), ("Phone", user.phone.clone())];
            match &user.bank_details {
                Some(bank) => {
                    pairs.push(("Bank", bank.bank_name.clone()));
                    pairs.push(("Account", bank.account_number.clone()));
                    pairs.push(("IFSC", bank.ifsc_code.clone()));
                    pairs.push(("Holder", bank.account_holder_name.clone()));
                }
                None => pairs.push(("Bank", "No bank details available".to_string())),
            }
            if let Some(upi) = &user.upi_id {
                pairs.push(("UPI", upi.clone()));
            }
            info_lines(&pairs)
        }
        None => Text::raw("User details unavailable."),
    };
    frame.render_widget(
        Paragraph::new(user_text).block(Block::bordered().title(" payout account  ")),
        user_area,
    );

    let processing_text = if pending {
        info_lines(&[
            ("Transaction ID", format!("{}▏", page.tx_id.value)),
            ("", String::new()),
            ("Actions", "c mark completed   x reject".to_string()),
        ])
    } else {
        info_lines(&[
            (
                "Transaction ID",
                request.transaction_id.clone().unwrap_or_else(|| "N/A".to_string()),
            ),
            (
                "Processed",
                request.processed_date.as_ref().map(datetime).unwrap_or_else(|| "N/A".to_string()),
            ),
            (
                "Processed by",
                request.processed_by.clone().unwrap_or_else(|| "—".to_string()),
            ),
            (
                "Proof",
                request.transaction_proof_url.clone().unwrap_or_else(|| "—".to_string()),
            ),
            ("Notes", request.notes.clone().unwrap_or_else(|| "—".to_string())),
        ])
    };
    frame.render_widget(
        Paragraph::new(processing_text).block(Block::bordered().title(" processing  ")),
        right,
    );

    if let Some(reason) = &page.reason {
        let modal = widgets::modal_area(frame, 60, 3);
        let inner = widgets::modal_block(frame, modal, "Rejection reason");
        frame.render_widget(Paragraph::new(reason.value.clone()), inner);
    }
}

// --- User history -----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryTab {
    Transactions,
    Events,
    Withdrawals,
}

/// The history document plus the user's withdrawal requests. The two are
/// fetched concurrently once the user is resolved; the history document
/// already folds transactions and events into one response.
pub struct UserHistoryData {
    pub history: UserHistory,
    pub withdrawals: Vec<WithdrawRequest>,
}

pub struct UserHistoryPage {
    pub query: TextField,
    pub searching: bool,
    pub loading: bool,
    pub data: Option<UserHistoryData>,
    pub tab: HistoryTab,
    pub table: DataTable,
}

pub fn enter_user_history(app: &mut App) {
    app.page = PageState::UserHistory(UserHistoryPage {
        query: TextField::new("User ID, phone, or email"),
        searching: true,
        loading: false,
        data: None,
        tab: HistoryTab::Transactions,
        table: DataTable::new("Nothing to show."),
    });
}

fn history_rows(page: &UserHistoryPage) -> usize {
    match (&page.data, page.tab) {
        (Some(data), HistoryTab::Transactions) => data.history.transactions.len(),
        (Some(data), HistoryTab::Events) => data.history.events.len(),
        (Some(data), HistoryTab::Withdrawals) => data.withdrawals.len(),
        (None, _) => 0,
    }
}

pub fn user_history_key(app: &mut App, key: KeyEvent) -> bool {
    enum Intent {
        Pass,
        Consumed,
        Toast(String),
        Search(String),
        OpenWithdrawal(String),
    }

    let intent = {
        let PageState::UserHistory(page) = &mut app.page else {
            return false;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) || page.loading {
            Intent::Pass
        } else if page.searching {
            match key.code {
                KeyCode::Esc => {
                    page.searching = false;
                    Intent::Consumed
                }
                KeyCode::Enter => {
                    let query = page.query.trimmed().to_string();
                    if query.is_empty() {
                        Intent::Toast("Enter a user ID, phone, or email".to_string())
                    } else {
                        page.loading = true;
                        page.searching = false;
                        Intent::Search(query)
                    }
                }
                _ => {
                    page.query.handle_key(key);
                    Intent::Consumed
                }
            }
        } else {
            match key.code {
                KeyCode::Char('/') => {
                    page.searching = true;
                    Intent::Consumed
                }
                KeyCode::Char('t') => {
                    page.tab = HistoryTab::Transactions;
                    let len = history_rows(page);
                    page.table.loaded(len);
                    Intent::Consumed
                }
                KeyCode::Char('e') => {
                    page.tab = HistoryTab::Events;
                    let len = history_rows(page);
                    page.table.loaded(len);
                    Intent::Consumed
                }
                KeyCode::Char('w') => {
                    page.tab = HistoryTab::Withdrawals;
                    let len = history_rows(page);
                    page.table.loaded(len);
                    Intent::Consumed
                }
                KeyCode::Enter if page.tab == HistoryTab::Withdrawals => {
                    match page.table.selected().and_then(|idx| {
                        page.data.as_ref().and_then(|d| d.withdrawals.get(idx))
                    }) {
                        Some(request) => Intent::OpenWithdrawal(request.id.clone()),
                        None => Intent::Consumed,
                    }
                }
                _ => {
                    if page.table.handle_key(key) {
                        Intent::Consumed
                    } else {
                        Intent::Pass
                    }
                }
            }
        }
    };

    match intent {
        Intent::Pass => false,
        Intent::Consumed => true,
        Intent::Toast(message) => {
            app.toast(ToastKind::Error, message);
            true
        }
        Intent::Search(query) => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                let result = async {
                    let user = svc.users.find(&query).await?;
                    let (history, withdrawals) = tokio::join!(
                        svc.users.history(&user.id),
                        svc.withdrawals.list(None)
                    );
                    let history = history?;
                    let withdrawals = match withdrawals {
                        Ok(all) => all.into_iter().filter(|w| w.user_id == user.id).collect(),
                        Err(e) => {
                            log::warn!("history withdrawals fetch degraded: {e}");
                            Vec::new()
                        }
                    };
                    Ok(UserHistoryData {
                        history,
                        withdrawals,
                    })
                }
                .await;
                FetchResult::UserHistory(result)
            });
            true
        }
        Intent::OpenWithdrawal(id) => {
            app.navigate(Route::WithdrawalDetail { id });
            true
        }
    }
}

pub fn draw_user_history(page: &mut UserHistoryPage, frame: &mut Frame, area: Rect) {
    let [search_area, profile_area, table_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(6),
        Constraint::Min(4),
    ])
    .areas(area);

    let query_display = if page.searching {
        format!("{}▏", page.query.value)
    } else {
        page.query.value.clone()
    };
    frame.render_widget(
        Paragraph::new(query_display).block(Block::bordered().title(" lookup (Enter to search)  ")),
        search_area,
    );

    if page.loading {
        frame.render_widget(
            Paragraph::new("Searching…").alignment(Alignment::Center),
            profile_area,
        );
        return;
    }

    let Some(data) = &page.data else {
        frame.render_widget(
            Paragraph::new("Search for a user to see their history.")
                .dim()
                .alignment(Alignment::Center),
            profile_area,
        );
        return;
    };

    let summary = &data.history.summary;
    frame.render_widget(
        Paragraph::new(info_lines(&[
            (
                "User",
                format!("{} ({})", data.history.user_name, data.history.user_phone),
            ),
            (
                "Gifts",
                format!(
                    "sent {}   received {}",
                    inr(summary.total_gifts_sent),
                    inr(summary.total_gifts_received)
                ),
            ),
            (
                "Funds",
                format!(
                    "allocated {}   withdrawn {}   pending {}",
                    inr(summary.total_allocated),
                    inr(summary.total_withdrawn),
                    inr(summary.total_pending_withdrawals)
                ),
            ),
            ("Net balance", inr(summary.net_balance)),
        ]))
        .block(Block::bordered().title(" profile  ")),
        profile_area,
    );

    let tab_title = match page.tab {
        HistoryTab::Transactions => "history — [t]ransactions  e  w",
        HistoryTab::Events => "history — t  [e]vents  w",
        HistoryTab::Withdrawals => "history — t  e  [w]ithdrawals",
    };

    match page.tab {
        HistoryTab::Transactions => {
            let rows: Vec<Row> = data
                .history
                .transactions
                .iter()
                .map(|tx| {
                    Row::new(vec![
                        Cell::new(date(&tx.created_at)),
                        Cell::new(tx.kind.to_string()),
                        Cell::new(tx.counterparty.clone().unwrap_or_else(|| "—".to_string())),
                        Cell::new(tx.event_title.clone().unwrap_or_else(|| "—".to_string())),
                        amount_cell(tx.amount),
                        Cell::new(tx.status.clone().unwrap_or_default()),
                    ])
                })
                .collect();
            page.table.draw(
                frame,
                table_area,
                tab_title,
                Row::new(vec!["Date", "Kind", "Counterparty", "Event", "Amount", "Status"]),
                &[
                    Constraint::Length(10),
                    Constraint::Fill(1),
                    Constraint::Fill(1),
                    Constraint::Fill(1),
                    Constraint::Fill(1),
                    Constraint::Fill(1),
                ],
                rows,
                None,
            );
        }
        HistoryTab::Events => {
            let rows: Vec<Row> = data
                .history
                .events
                .iter()
                .map(|event| {
                    Row::new(vec![
                        Cell::new(event.title.clone()),
                        Cell::new(event.status.to_string()),
                        Cell::new(date(&event.start_date)),
                        amount_cell(event.stats.total_gifts_amount),
                        amount_cell(event.stats.available_for_withdrawal),
                    ])
                })
                .collect();
            page.table.draw(
                frame,
                table_area,
                tab_title,
                Row::new(vec!["Event", "Status", "Start", "Gifts", "Available"]),
                &[
                    Constraint::Fill(2),
                    Constraint::Fill(1),
                    Constraint::Length(10),
                    Constraint::Fill(1),
                    Constraint::Fill(1),
                ],
                rows,
                None,
            );
        }
        HistoryTab::Withdrawals => {
            let rows: Vec<Row> = data
                .withdrawals
                .iter()
                .map(|request| {
                    Row::new(vec![
                        Cell::new(date(&request.request_date)),
                        amount_cell(request.requested_amount),
                        Cell::new(request.status.to_string()),
                        Cell::new(
                            request
                                .event_title
                                .clone()
                                .or_else(|| request.event_id.clone())
                                .unwrap_or_else(|| "not linked".to_string()),
                        ),
                    ])
                })
                .collect();
            page.table.draw(
                frame,
                table_area,
                tab_title,
                Row::new(vec!["Date", "Amount", "Status", "Event"]),
                &[
                    Constraint::Length(10),
                    Constraint::Fill(1),
                    Constraint::Fill(1),
                    Constraint::Fill(2),
                ],
                rows,
                None,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdraw_filter_cycles_back_to_all() {
        let mut filter = Some(WithdrawStatus::Pending);
        filter = cycle_withdraw_filter(filter);
        assert_eq!(filter, Some(WithdrawStatus::Completed));
        filter = cycle_withdraw_filter(filter);
        assert_eq!(filter, Some(WithdrawStatus::Rejected));
        filter = cycle_withdraw_filter(filter);
        assert_eq!(filter, None);
        filter = cycle_withdraw_filter(filter);
        assert_eq!(filter, Some(WithdrawStatus::Pending));
    }
}
