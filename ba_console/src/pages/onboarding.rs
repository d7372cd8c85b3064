//! Onboarding-agent pages: KYC queue, KYC review, user list, and the
//! three-step create-user wizard.

use bahumati::models::{EndUser, KycCase, KycStatus};
use bahumati::services::kyc::KycDecision;
use bahumati::services::{EnrolledUser, UserPage};
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
    self, DataTable, Pagination, SelectField, TextField, ToastKind, amount_cell, date, info_lines,
};

const USERS_PAGE_SIZE: u32 = 20;

// --- KYC queue --------------------------------------------------------------

pub struct KycQueuePage {
    pub cases: Vec<KycCase>,
    pub table: DataTable,
    pub filter: Option<KycStatus>,
    pub search: TextField,
    pub searching: bool,
}

impl KycQueuePage {
    pub fn visible(&self) -> Vec<&KycCase> {
        let query = self.search.trimmed().to_lowercase();
        self.cases
            .iter()
            .filter(|case| self.filter.is_none_or(|status| case.status == status))
            .filter(|case| {
                query.is_empty()
                    || case.user_name.to_lowercase().contains(&query)
                    || case.user_phone.contains(&query)
                    || case.user_id.contains(&query)
            })
            .collect()
    }

    pub fn sync_table(&mut self) {
        let len = self.visible().len();
        let loading = self.table.loading;
        self.table.loaded(len);
        self.table.loading = loading;
    }
}

pub fn enter_kyc_queue(app: &mut App) {
    app.page = PageState::KycQueue(KycQueuePage {
        cases: Vec::new(),
        table: DataTable::new("No submissions match the current filter."),
        filter: None,
        search: TextField::new("Search"),
        searching: false,
    });
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move { FetchResult::KycQueue(svc.kyc.list(None).await) });
}

fn cycle_kyc_filter(filter: Option<KycStatus>) -> Option<KycStatus> {
    match filter {
        None => Some(KycStatus::Pending),
        Some(KycStatus::Pending) => Some(KycStatus::Approved),
        Some(KycStatus::Approved) => Some(KycStatus::Rejected),
        Some(KycStatus::Rejected) => None,
    }
}

pub fn kyc_queue_key(app: &mut App, key: KeyEvent) -> bool {
    enum Intent {
        Pass,
        Consumed,
        Open(String),
    }

    let intent = {
        let PageState::KycQueue(page) = &mut app.page else {
            return false;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            Intent::Pass
        } else if page.searching {
            match key.code {
                KeyCode::Enter => {
                    page.searching = false;
                    Intent::Consumed
                }
                KeyCode::Esc => {
                    page.search.clear();
                    page.searching = false;
                    page.sync_table();
                    Intent::Consumed
                }
                _ => {
                    if page.search.handle_key(key) {
                        page.sync_table();
                    }
                    Intent::Consumed
                }
            }
        } else {
            match key.code {
                KeyCode::Char('/') => {
                    page.searching = true;
                    Intent::Consumed
                }
                KeyCode::Char('f') => {
                    page.filter = cycle_kyc_filter(page.filter);
                    page.sync_table();
                    Intent::Consumed
                }
                KeyCode::Enter => match page.table.selected().and_then(|idx| page.visible().get(idx).copied())
                {
                    Some(case) => Intent::Open(case.user_id.clone()),
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
        Intent::Open(user_id) => {
            app.navigate(Route::KycReview { user_id });
            true
        }
    }
}

pub fn draw_kyc_queue(page: &mut KycQueuePage, frame: &mut Frame, area: Rect) {
    let [filter_area, table_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(4)]).areas(area);

    let filter_label = match page.filter {
        None => "All",
        Some(KycStatus::Pending) => "Pending",
        Some(KycStatus::Approved) => "Approved",
        Some(KycStatus::Rejected) => "Rejected",
    };
    let search_display = if page.searching {
        format!("{}▏", page.search.value)
    } else if page.search.trimmed().is_empty() {
        "press / to search".to_string()
    } else {
        page.search.value.clone()
    };
    frame.render_widget(
        Paragraph::new(format!("status: {filter_label}   search: {search_display}"))
            .block(Block::bordered().title(" filters  ")),
        filter_area,
    );

    let rows: Vec<Row> = page
        .visible()
        .iter()
        .map(|case| {
            let status = match case.status {
                KycStatus::Pending => Cell::new("Pending".light_yellow()),
                KycStatus::Approved => Cell::new("Approved".light_green()),
                KycStatus::Rejected => Cell::new("Rejected".light_red()),
            };
            Row::new(vec![
                Cell::new(case.user_name.clone()),
                Cell::new(case.user_phone.clone()),
                Cell::new(case.id_type.to_string()),
                Cell::new(date(&case.submitted_at)),
                status,
            ])
        })
        .collect();

    page.table.draw(
        frame,
        table_area,
        "KYC queue",
        Row::new(vec!["Name", "Phone", "Document", "Submitted", "Status"]),
        &[
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ],
        rows,
        None,
    );
}

// --- KYC review -------------------------------------------------------------

pub struct KycReviewPage {
    pub user_id: String,
    pub user: Option<EndUser>,
    pub case: Option<KycCase>,
    pub loading: bool,
    pub reason: Option<TextField>,
    pub submitting: bool,
}

pub fn enter_kyc_review(app: &mut App, user_id: String) {
    app.page = PageState::KycReview(KycReviewPage {
        user_id: user_id.clone(),
        user: None,
        case: None,
        loading: true,
        reason: None,
        submitting: false,
    });
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move {
        let result = async {
            let user = svc.users.find(&user_id).await?;
            let case = svc.kyc.latest_for_user(&user_id).await?;
            Ok((user, case))
        }
        .await;
        FetchResult::KycReview(result)
    });
}

pub fn kyc_review_key(app: &mut App, key: KeyEvent) -> bool {
    enum Intent {
        Pass,
        Consumed,
        Toast(String),
        Approve(String),
        Reject { kyc_id: String, reason: String },
        ToggleBan { user_id: String, banned: bool },
    }

    let intent = {
        let PageState::KycReview(page) = &mut app.page else {
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
                        match &page.case {
                            Some(case) => {
                                page.submitting = true;
                                Intent::Reject {
                                    kyc_id: case.kyc_id.clone(),
                                    reason: text,
                                }
                            }
                            None => Intent::Consumed,
                        }
                    }
                }
                _ => {
                    reason.handle_key(key);
                    Intent::Consumed
                }
            }
        } else {
            let pending = page
                .case
                .as_ref()
                .is_some_and(|case| case.status == KycStatus::Pending);
            match key.code {
                KeyCode::Char('a') if pending => {
                    page.submitting = true;
                    Intent::Approve(page.case.as_ref().expect("pending case").kyc_id.clone())
                }
                KeyCode::Char('x') if pending => {
                    page.reason = Some(TextField::new("Rejection reason").required());
                    Intent::Consumed
                }
                KeyCode::Char('b') => match &page.user {
                    Some(user) => Intent::ToggleBan {
                        user_id: user.id.clone(),
                        banned: !user.is_banned,
                    },
                    None => Intent::Consumed,
                },
                _ => Intent::Pass,
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
        Intent::Approve(kyc_id) => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc.kyc.review(&kyc_id, KycDecision::Approve).await,
                    success: "KYC approved".to_string(),
                    goto: Some(Route::KycQueue),
                }
            });
            true
        }
        Intent::Reject { kyc_id, reason } => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc.kyc.review(&kyc_id, KycDecision::Reject { reason }).await,
                    success: "KYC rejected".to_string(),
                    goto: Some(Route::KycQueue),
                }
            });
            true
        }
        Intent::ToggleBan { user_id, banned } => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            let success = if banned { "User banned" } else { "User unbanned" };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc.users.set_banned(&user_id, banned).await,
                    success: success.to_string(),
                    goto: None,
                }
            });
            true
        }
    }
}

pub fn draw_kyc_review(page: &KycReviewPage, frame: &mut Frame, area: Rect) {
    if page.loading {
        frame.render_widget(
            Paragraph::new("Loading submission…").alignment(Alignment::Center),
            area,
        );
        return;
    }

    let [user_area, kyc_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(area);

    let user_text = match &page.user {
        Some(user) => info_lines(&[
            ("Name", user.name.clone()),
            ("Phone", user.phone.clone()),
            ("Email", user.email.clone().unwrap_or_else(|| "—".to_string())),
            ("KYC status", user.kyc_status.to_string()),
            ("Account", if user.is_banned { "Banned".to_string() } else { "Active".to_string() }),
            ("Allocation", user.default_allocation.to_string()),
            ("Total balance", widgets::inr(user.total_balance)),
            ("Withdrawable", widgets::inr(user.withdrawable_amount)),
        ]),
        None => Text::raw("User not found."),
    };
    frame.render_widget(
        Paragraph::new(user_text).block(Block::bordered().title(" user  ")),
        user_area,
    );

    let kyc_text = match &page.case {
        Some(case) => {
            let mut pairs = vec![
                ("Document", case.id_type.to_string()),
                ("Number", case.id_number.clone().unwrap_or_else(|| "—".to_string())),
                ("Front", case.front_pic.clone()),
                ("Back", case.back_pic.clone()),
                ("Selfie", case.selfie.clone()),
                ("Submitted", date(&case.submitted_at)),
                ("Status", case.status.to_string()),
            ];
            if let Some(reason) = &case.rejection_reason {
                pairs.push(("Rejected for", reason.clone()));
            }
            info_lines(&pairs)
        }
        None => Text::raw("No KYC submission on file."),
    };
    frame.render_widget(
        Paragraph::new(kyc_text).block(Block::bordered().title(" kyc submission  ")),
        kyc_area,
    );

    if let Some(reason) = &page.reason {
        let modal = widgets::modal_area(frame, 60, 3);
        let inner = widgets::modal_block(frame, modal, "Rejection reason");
        frame.render_widget(Paragraph::new(reason.value.clone()), inner);
        frame.set_cursor_position(ratatui::layout::Position::new(
            inner.x + reason.char_idx as u16,
            inner.y,
        ));
    }
}

// --- User list --------------------------------------------------------------

pub struct UsersPage {
    pub users: Vec<EndUser>,
    pub table: DataTable,
    pub pagination: Pagination,
    pub pending_page: u32,
}

pub fn enter_users(app: &mut App) {
    app.page = PageState::Users(UsersPage {
        users: Vec::new(),
        table: DataTable::new("No users on this page."),
        pagination: Pagination::new(1, 1),
        pending_page: 1,
    });
    load_users_page(app, 1);
}

fn load_users_page(app: &mut App, page_num: u32) {
    if let PageState::Users(page) = &mut app.page {
        page.table.loading = true;
        page.pending_page = page_num;
    }
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move { FetchResult::Users(svc.users.list(page_num, USERS_PAGE_SIZE).await) });
}

pub fn users_key(app: &mut App, key: KeyEvent) -> bool {
    enum Intent {
        Pass,
        Consumed,
        LoadPage(u32),
        Open(String),
        ToggleBan { user_id: String, banned: bool },
        Create,
    }

    let intent = {
        let PageState::Users(page) = &mut app.page else {
            return false;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            Intent::Pass
        } else {
            match key.code {
                KeyCode::Left | KeyCode::Char('p') if page.pagination.prev_enabled() => {
                    Intent::LoadPage(page.pagination.prev())
                }
                KeyCode::Right | KeyCode::Char('n') if page.pagination.next_enabled() => {
                    Intent::LoadPage(page.pagination.next())
                }
                KeyCode::Left | KeyCode::Right | KeyCode::Char('p') | KeyCode::Char('n') => {
                    // Bounded controls: disabled edges swallow the key.
                    Intent::Consumed
                }
                KeyCode::Char('c') => Intent::Create,
                KeyCode::Char('b') => match page.table.selected().and_then(|idx| page.users.get(idx)) {
                    Some(user) => Intent::ToggleBan {
                        user_id: user.id.clone(),
                        banned: !user.is_banned,
                    },
                    None => Intent::Consumed,
                },
                KeyCode::Enter => match page.table.selected().and_then(|idx| page.users.get(idx)) {
                    Some(user) => Intent::Open(user.id.clone()),
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
        Intent::LoadPage(page_num) => {
            load_users_page(app, page_num);
            true
        }
        Intent::Open(user_id) => {
            app.navigate(Route::KycReview { user_id });
            true
        }
        Intent::Create => {
            app.navigate(Route::CreateUser);
            true
        }
        Intent::ToggleBan { user_id, banned } => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            let success = if banned { "User banned" } else { "User unbanned" };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc.users.set_banned(&user_id, banned).await,
                    success: success.to_string(),
                    goto: None,
                }
            });
            true
        }
    }
}

pub fn on_users_loaded(page: &mut UsersPage, loaded: UserPage) {
    page.pagination = Pagination::new(page.pending_page, loaded.total_pages);
    page.users = loaded.users;
    page.table.loaded(page.users.len());
}

pub fn draw_users(page: &mut UsersPage, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row> = page
        .users
        .iter()
        .map(|user| {
            let account = if user.is_banned {
                Cell::new("Banned".light_red())
            } else {
                Cell::new("Active".light_green())
            };
            Row::new(vec![
                Cell::new(user.name.clone()),
                Cell::new(user.phone.clone()),
                Cell::new(user.kyc_status.to_string()),
                account,
                amount_cell(user.total_balance),
                amount_cell(user.withdrawable_amount),
            ])
        })
        .collect();

    let footer = page.pagination.footer();
    page.table.draw(
        frame,
        area,
        "users",
        Row::new(vec!["Name", "Phone", "KYC", "Account", "Balance", "Withdrawable"]),
        &[
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ],
        rows,
        Some(footer),
    );
}

// --- Create-user wizard -----------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Phone,
    Otp,
    Allocation,
    Done,
}

pub struct CreateUserPage {
    pub step: WizardStep,
    pub phone: TextField,
    pub otp: TextField,
    pub allocation: SelectField,
    pub enrolled: Option<EnrolledUser>,
    pub submitting: bool,
}

pub fn enter_create_user(app: &mut App) {
    app.page = PageState::CreateUser(CreateUserPage {
        step: WizardStep::Phone,
        phone: TextField::new("Phone number").required(),
        otp: TextField::new("OTP").required(),
        allocation: SelectField::new(
            "Default allocation",
            vec!["Top 50 Companies".to_string(), "Digital Gold".to_string()],
        ),
        enrolled: None,
        submitting: false,
    });
}

/// Client-side check issued before any request: exactly ten digits.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (digits.len() == 10).then_some(digits)
}

/// Client-side check issued before any request: exactly four digits.
pub fn valid_otp(raw: &str) -> bool {
    raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit())
}

pub fn create_user_key(app: &mut App, key: KeyEvent) -> bool {
    use bahumati::models::AllocationType;

    enum Intent {
        Pass,
        Consumed,
        Toast(String),
        SendOtp(String),
        VerifyOtp { phone: String, otp: String },
        SetAllocation { enrolled: EnrolledUser, allocation: AllocationType },
        Finish(String),
    }

    let intent = {
        let PageState::CreateUser(page) = &mut app.page else {
            return false;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) || page.submitting {
            Intent::Pass
        } else {
            match page.step {
                WizardStep::Phone => match key.code {
                    KeyCode::Enter => match normalize_phone(page.phone.trimmed()) {
                        Some(phone) => {
                            page.submitting = true;
                            Intent::SendOtp(phone)
                        }
                        None => Intent::Toast("Phone number must be 10 digits".to_string()),
                    },
                    _ => {
                        if page.phone.handle_key(key) {
                            Intent::Consumed
                        } else {
                            Intent::Pass
                        }
                    }
                },
                WizardStep::Otp => match key.code {
                    KeyCode::Enter => {
                        let otp = page.otp.trimmed().to_string();
                        if valid_otp(&otp) {
                            match normalize_phone(page.phone.trimmed()) {
                                Some(phone) => {
                                    page.submitting = true;
                                    Intent::VerifyOtp { phone, otp }
                                }
                                None => Intent::Toast("Phone number must be 10 digits".to_string()),
                            }
                        } else {
                            Intent::Toast("OTP must be 4 digits".to_string())
                        }
                    }
                    _ => {
                        if page.otp.handle_key(key) {
                            Intent::Consumed
                        } else {
                            Intent::Pass
                        }
                    }
                },
                WizardStep::Allocation => match key.code {
                    KeyCode::Enter => match page.enrolled.clone() {
                        Some(enrolled) => {
                            let allocation = if page.allocation.selected == 0 {
                                AllocationType::Top50Companies
                            } else {
                                AllocationType::DigitalGold
                            };
                            page.submitting = true;
                            Intent::SetAllocation { enrolled, allocation }
                        }
                        None => Intent::Consumed,
                    },
                    _ => {
                        if page.allocation.handle_key(key) {
                            Intent::Consumed
                        } else {
                            Intent::Pass
                        }
                    }
                },
                WizardStep::Done => match key.code {
                    KeyCode::Enter => match page.enrolled.clone() {
                        Some(enrolled) => Intent::Finish(enrolled.user_id),
                        None => Intent::Pass,
                    },
                    _ => Intent::Pass,
                },
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
        Intent::SendOtp(phone) => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move { FetchResult::OtpSent(svc.users.send_otp(&phone).await) });
            true
        }
        Intent::VerifyOtp { phone, otp } => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::OtpVerified(svc.users.verify_otp(&phone, &otp).await)
            });
            true
        }
        Intent::SetAllocation { enrolled, allocation } => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::AllocationSet(
                    svc.users.set_default_allocation(&enrolled, allocation).await,
                )
            });
            true
        }
        Intent::Finish(user_id) => {
            app.navigate(Route::KycReview { user_id });
            true
        }
    }
}

pub fn draw_create_user(page: &CreateUserPage, frame: &mut Frame, area: Rect) {
    let steps = ["1 Phone", "2 OTP", "3 Allocation", "4 Done"];
    let active = match page.step {
        WizardStep::Phone => 0,
        WizardStep::Otp => 1,
        WizardStep::Allocation => 2,
        WizardStep::Done => 3,
    };
    let mut header = String::new();
    for (idx, step) in steps.iter().enumerate() {
        if idx > 0 {
            header.push_str("  →  ");
        }
        if idx == active {
            header.push('[');
            header.push_str(step);
            header.push(']');
        } else {
            header.push_str(step);
        }
    }

    let [steps_area, field_area, hint_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(2),
    ])
    .areas(area);
    frame.render_widget(Paragraph::new(header).alignment(Alignment::Center), steps_area);

    let (title, value, hint) = match page.step {
        WizardStep::Phone => (
            " phone number  ",
            format!("{}▏", page.phone.value),
            "Enter the new user's 10-digit mobile number, then press Enter to send an OTP.",
        ),
        WizardStep::Otp => (
            " one-time password  ",
            format!("{}▏", page.otp.value),
            "Enter the 4-digit OTP the user received, then press Enter to verify.",
        ),
        WizardStep::Allocation => (
            " default allocation  ",
            format!("◂ {} ▸", page.allocation.value()),
            "Pick where collected funds go by default, then press Enter.",
        ),
        WizardStep::Done => (
            " done  ",
            match &page.enrolled {
                Some(enrolled) => format!("User {} created", enrolled.user_id),
                None => "User created".to_string(),
            },
            "Press Enter to open the new user's KYC review.",
        ),
    };

    let [field_slot] = Layout::horizontal([Constraint::Length(44)])
        .flex(ratatui::layout::Flex::Center)
        .areas(field_area);
    frame.render_widget(
        Paragraph::new(value).block(Block::bordered().title(title)),
        field_slot,
    );
    let status = if page.submitting { "Working…" } else { hint };
    frame.render_widget(
        Paragraph::new(status).alignment(Alignment::Center).dim(),
        hint_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_must_be_exactly_ten_digits() {
        assert_eq!(normalize_phone("9876543210").as_deref(), Some("9876543210"));
        assert_eq!(normalize_phone("98765 43210").as_deref(), Some("9876543210"));
        assert!(normalize_phone("98765").is_none());
        assert!(normalize_phone("+91 98765 43210").is_none());
        assert!(normalize_phone("").is_none());
    }

    #[test]
    fn otp_must_be_exactly_four_digits() {
        assert!(valid_otp("1234"));
        assert!(!valid_otp("123"));
        assert!(!valid_otp("12345"));
        assert!(!valid_otp("12a4"));
        assert!(!valid_otp(""));
    }

    #[test]
    fn kyc_filter_cycles_through_all_states() {
        let mut filter = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            filter = cycle_kyc_filter(filter);
            seen.push(filter);
        }
        assert_eq!(
            seen,
            vec![
                Some(KycStatus::Pending),
                Some(KycStatus::Approved),
                Some(KycStatus::Rejected),
                None
            ]
        );
    }
}
