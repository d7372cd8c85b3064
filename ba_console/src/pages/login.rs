//! Login page: the only view an unauthenticated operator can reach.

use bahumati::models::Operator;
use bahumati::services::Services;
use bahumati::session::{Credentials, SessionError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    widgets::{Block, Paragraph},
};

use crate::app::{App, FetchResult, PageState, Route};
use crate::widgets::{Form, FormField, TextField, ToastKind};

pub struct LoginPage {
    pub form: Form,
    pub submitting: bool,
}

impl LoginPage {
    pub fn new(prefill: Option<(String, String)>) -> Self {
        let (username, password) = prefill.unwrap_or_default();
        Self {
            form: Form::new(vec![
                FormField::Text(TextField::new("Username").required().with_value(username)),
                FormField::Text(TextField::new("Password").required().masked().with_value(password)),
            ]),
            submitting: false,
        }
    }
}

enum Intent {
    Pass,
    Consumed,
    Toast(String),
    Submit(Credentials),
}

pub fn on_key(app: &mut App, key: KeyEvent) -> bool {
    let intent = {
        let PageState::Login(page) = &mut app.page else {
            return false;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            Intent::Pass
        } else if page.submitting {
            Intent::Consumed
        } else if key.code == KeyCode::Enter {
            match page.form.missing_required() {
                Some(missing) => Intent::Toast(format!("{missing} is required")),
                None => {
                    page.submitting = true;
                    Intent::Submit(Credentials {
                        username: page.form.text("Username").to_string(),
                        password: page.form.text("Password").to_string(),
                    })
                }
            }
        } else if page.form.handle_key(key) {
            Intent::Consumed
        } else {
            Intent::Pass
        }
    };

    match intent {
        Intent::Pass => false,
        Intent::Consumed => true,
        Intent::Toast(message) => {
            app.toast(ToastKind::Error, message);
            true
        }
        Intent::Submit(credentials) => {
            let session = app.session.clone();
            app.spawn(async move { FetchResult::LoggedIn(session.login(credentials).await) });
            true
        }
    }
}

pub fn on_logged_in(app: &mut App, outcome: Result<Operator, SessionError>) {
    match outcome {
        Ok(operator) => {
            app.services = app.session.authenticated_client().map(Services::new);
            app.toast(ToastKind::Success, format!("Welcome, {}", operator.name));
            app.operator = Some(operator);
            app.navigate(Route::Dashboard);
        }
        Err(e) => {
            app.toast(ToastKind::Error, e.user_message());
            if let PageState::Login(page) = &mut app.page {
                page.submitting = false;
            }
        }
    }
}

pub fn draw(page: &LoginPage, frame: &mut Frame, area: Rect) {
    let [card] = Layout::vertical([Constraint::Length(10)])
        .flex(Flex::Center)
        .areas(area);
    let [card] = Layout::horizontal([Constraint::Length(48)])
        .flex(Flex::Center)
        .areas(card);

    let block = Block::bordered().title(" Bahumati Admin Console  ");
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let [form_area, status] =
        Layout::vertical([Constraint::Length(6), Constraint::Length(1)]).areas(inner);
    page.form.draw(frame, form_area);

    if page.submitting {
        frame.render_widget(
            Paragraph::new("Signing in…").alignment(Alignment::Center),
            status,
        );
    }
}
