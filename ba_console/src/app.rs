//! Application state machine and event loop.
//!
//! One loop drives everything, the way a terminal client should: draw,
//! poll the keyboard with a short timeout, then drain completed fetches
//! from the mpsc channel. Every page-scoped fetch runs as a spawned task
//! whose `JoinHandle` is retained here; navigation aborts all of them, so a
//! stale response can never write into a page the operator already left.

use anyhow::Result;
use bahumati::access::{self, GuardDecision, Page};
use bahumati::models::{
    Ad, AppConfig, EndUser, Event, EventDetail, KycCase, Operator, Transaction, WithdrawRequest,
};
use bahumati::services::{EnrolledUser, Services, UserPage};
use bahumati::session::{SessionError, SessionManager};
use bahumati::{ServiceError, ServiceResult};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::pages::{self, admin, dashboard, login, onboarding, reconciliation};
use crate::widgets::{ToastKind, Toasts};

const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Every navigable location, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    KycQueue,
    KycReview { user_id: String },
    Users,
    CreateUser,
    UserHistory,
    Transactions,
    TransactionDetail { id: String },
    Events,
    EventDetail { id: String },
    Withdrawals,
    WithdrawalDetail { id: String },
    Ads,
    Agents,
    Config,
}

impl Route {
    /// The guard page this route renders.
    pub fn page(&self) -> Page {
        match self {
            // Login is outside the guard: it is where unauthenticated
            // operators land.
            Route::Login => Page::Dashboard,
            Route::Dashboard => Page::Dashboard,
            Route::KycQueue => Page::KycQueue,
            Route::KycReview { .. } => Page::KycReview,
            Route::Users => Page::Users,
            Route::CreateUser => Page::CreateUser,
            Route::UserHistory => Page::UserHistory,
            Route::Transactions => Page::Transactions,
            Route::TransactionDetail { .. } => Page::TransactionDetail,
            Route::Events => Page::Events,
            Route::EventDetail { .. } => Page::EventDetail,
            Route::Withdrawals => Page::Withdrawals,
            Route::WithdrawalDetail { .. } => Page::WithdrawalDetail,
            Route::Ads => Page::Ads,
            Route::Agents => Page::Agents,
            Route::Config => Page::Config,
        }
    }

    /// Where Esc leads from this route.
    pub fn back(&self) -> Option<Route> {
        match self {
            Route::Login | Route::Dashboard => None,
            Route::KycReview { .. } => Some(Route::KycQueue),
            Route::CreateUser => Some(Route::Users),
            Route::TransactionDetail { .. } => Some(Route::Transactions),
            Route::EventDetail { .. } => Some(Route::Events),
            Route::WithdrawalDetail { .. } => Some(Route::Withdrawals),
            _ => Some(Route::Dashboard),
        }
    }

    pub fn from_page(page: Page) -> Option<Route> {
        match page {
            Page::Dashboard => Some(Route::Dashboard),
            Page::KycQueue => Some(Route::KycQueue),
            Page::Users => Some(Route::Users),
            Page::CreateUser => Some(Route::CreateUser),
            Page::UserHistory => Some(Route::UserHistory),
            Page::Transactions => Some(Route::Transactions),
            Page::Events => Some(Route::Events),
            Page::Withdrawals => Some(Route::Withdrawals),
            Page::Ads => Some(Route::Ads),
            Page::Agents => Some(Route::Agents),
            Page::Config => Some(Route::Config),
            _ => None,
        }
    }
}

/// State for the currently rendered page.
pub enum PageState {
    Login(login::LoginPage),
    Dashboard(dashboard::DashboardPage),
    KycQueue(onboarding::KycQueuePage),
    KycReview(onboarding::KycReviewPage),
    Users(onboarding::UsersPage),
    CreateUser(onboarding::CreateUserPage),
    UserHistory(reconciliation::UserHistoryPage),
    Transactions(reconciliation::TransactionsPage),
    TransactionDetail(reconciliation::TransactionDetailPage),
    Events(reconciliation::EventsPage),
    EventDetail(reconciliation::EventDetailPage),
    Withdrawals(reconciliation::WithdrawalsPage),
    WithdrawalDetail(reconciliation::WithdrawalDetailPage),
    Ads(admin::AdsPage),
    Agents(admin::AgentsPage),
    Config(admin::ConfigPage),
}

/// Completed asynchronous work, delivered over the app channel.
pub enum FetchResult {
    LoggedIn(Result<Operator, SessionError>),
    Dashboard(dashboard::DashboardData),
    KycQueue(ServiceResult<Vec<KycCase>>),
    KycReview(ServiceResult<(EndUser, Option<KycCase>)>),
    Users(ServiceResult<UserPage>),
    OtpSent(ServiceResult<()>),
    OtpVerified(ServiceResult<EnrolledUser>),
    AllocationSet(ServiceResult<()>),
    UserHistory(ServiceResult<reconciliation::UserHistoryData>),
    Transactions(ServiceResult<Vec<Transaction>>),
    TransactionDetail(ServiceResult<Option<Transaction>>),
    Events(ServiceResult<Vec<Event>>),
    EventDetail(ServiceResult<EventDetail>),
    Withdrawals(ServiceResult<Vec<WithdrawRequest>>),
    WithdrawalDetail(Box<ServiceResult<reconciliation::WithdrawalContext>>),
    Ads(ServiceResult<Vec<Ad>>),
    Agents(ServiceResult<Vec<Operator>>),
    Config(ServiceResult<AppConfig>),
    /// Outcome of any mutation: toast, then either jump somewhere or
    /// refetch the current page. The explicit refresh is the whole cache
    /// story — there is nothing else to invalidate.
    Mutation {
        result: ServiceResult<()>,
        success: String,
        goto: Option<Route>,
    },
}

/// Top-level application state.
pub struct App {
    pub session: SessionManager,
    pub services: Option<Services>,
    pub operator: Option<Operator>,
    pub route: Route,
    pub page: PageState,
    pub toasts: Toasts,
    pub should_quit: bool,
    tx: mpsc::UnboundedSender<FetchResult>,
    rx: mpsc::UnboundedReceiver<FetchResult>,
    inflight: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(session: SessionManager, prefill: Option<(String, String)>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let operator = session.current_operator();
        let services = session.authenticated_client().map(Services::new);

        let mut app = Self {
            session,
            services,
            operator,
            route: Route::Login,
            page: PageState::Login(login::LoginPage::new(prefill)),
            toasts: Toasts::new(),
            should_quit: false,
            tx,
            rx,
            inflight: Vec::new(),
        };
        if app.operator.is_some() {
            app.navigate(Route::Dashboard);
        }
        app
    }

    pub fn toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.toasts.push(kind, message);
    }

    pub fn toast_error(&mut self, error: &ServiceError) {
        self.toasts.push(ToastKind::Error, error.user_message());
    }

    /// Spawn a page-scoped fetch. The handle is retained so navigation can
    /// abort it.
    pub fn spawn<F>(&mut self, fut: F)
    where
        F: Future<Output = FetchResult> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.inflight.push(tokio::spawn(async move {
            let _ = tx.send(fut.await);
        }));
    }

    fn abort_inflight(&mut self) {
        for handle in self.inflight.drain(..) {
            handle.abort();
        }
    }

    /// Move to a route: abort outstanding fetches, run the role guard,
    /// build the page state, kick off its loads.
    pub fn navigate(&mut self, route: Route) {
        self.abort_inflight();

        let Some(operator) = self.operator.clone() else {
            self.route = Route::Login;
            self.page = PageState::Login(login::LoginPage::new(None));
            return;
        };

        let route = match access::check(operator.role, route.page()) {
            GuardDecision::Granted => route,
            GuardDecision::RedirectHome => {
                self.toast(
                    ToastKind::Error,
                    format!("{} is not available to a {}", route.page().title(), operator.role),
                );
                Route::Dashboard
            }
        };

        self.route = route.clone();
        match route {
            Route::Login => {
                self.page = PageState::Login(login::LoginPage::new(None));
            }
            Route::Dashboard => dashboard::enter(self, operator.role),
            Route::KycQueue => onboarding::enter_kyc_queue(self),
            Route::KycReview { user_id } => onboarding::enter_kyc_review(self, user_id),
            Route::Users => onboarding::enter_users(self),
            Route::CreateUser => onboarding::enter_create_user(self),
            Route::UserHistory => reconciliation::enter_user_history(self),
            Route::Transactions => reconciliation::enter_transactions(self),
            Route::TransactionDetail { id } => reconciliation::enter_transaction_detail(self, id),
            Route::Events => reconciliation::enter_events(self),
            Route::EventDetail { id } => reconciliation::enter_event_detail(self, id),
            Route::Withdrawals => reconciliation::enter_withdrawals(self),
            Route::WithdrawalDetail { id } => reconciliation::enter_withdrawal_detail(self, id),
            Route::Ads => admin::enter_ads(self),
            Route::Agents => admin::enter_agents(self),
            Route::Config => admin::enter_config(self),
        }
    }

    /// Explicit refetch of the current route.
    pub fn refresh(&mut self) {
        self.navigate(self.route.clone());
    }

    pub fn logout(&mut self) {
        self.abort_inflight();
        if let Err(e) = self.session.logout() {
            log::warn!("logout failed to clear credentials: {e}");
        }
        self.operator = None;
        self.services = None;
        self.route = Route::Login;
        self.page = PageState::Login(login::LoginPage::new(None));
        self.toast(ToastKind::Info, "Logged out");
    }

    /// Main loop: draw, poll keys, drain fetch results.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        loop {
            terminal.draw(|frame| pages::draw(&mut self, frame))?;

            if event::poll(POLL_TIMEOUT)?
                && let TermEvent::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.on_key(key);
            }

            while let Ok(result) = self.rx.try_recv() {
                self.on_data(result);
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if pages::on_key(self, key) {
            return;
        }

        // Global fallbacks, only for keys the page did not consume.
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('r') => self.refresh(),
                KeyCode::Char('l') => self.logout(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => match self.route.back() {
                Some(route) => self.navigate(route),
                None => {
                    if self.route == Route::Login {
                        self.should_quit = true;
                    }
                }
            },
            KeyCode::Char(c @ '0'..='9') => {
                if let Some(operator) = &self.operator {
                    let menu = access::menu_for(operator.role);
                    let idx = if c == '0' { 9 } else { c as usize - '1' as usize };
                    if let Some(route) = menu.get(idx).copied().and_then(Route::from_page) {
                        self.navigate(route);
                    }
                }
            }
            _ => {}
        }
    }

    fn on_data(&mut self, result: FetchResult) {
        match result {
            FetchResult::LoggedIn(outcome) => login::on_logged_in(self, outcome),
            FetchResult::Mutation {
                result,
                success,
                goto,
            } => match result {
                Ok(()) => {
                    self.toast(ToastKind::Success, success);
                    match goto {
                        Some(route) => self.navigate(route),
                        None => self.refresh(),
                    }
                }
                Err(e) => {
                    self.toast_error(&e);
                    pages::clear_submitting(&mut self.page);
                }
            },
            other => pages::on_data(self, other),
        }
    }
}
