//! Super-admin pages: ad management, agent management, system config.

use bahumati::models::{Ad, AdPlacement, AdType, AppConfig, Operator, Role};
use bahumati::services::{AdDraft, AgentUpdate, NewAgent};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Stylize,
    widgets::{Cell, Paragraph, Row},
};

use crate::app::{App, FetchResult, PageState};
use crate::widgets::{
    self, CheckboxField, DataTable, Form, FormField, SelectField, TextField, ToastKind, date,
};

// --- Ads --------------------------------------------------------------------

pub struct AdModal {
    /// `Some(id)` when editing an existing ad.
    pub editing: Option<String>,
    pub form: Form,
}

impl AdModal {
    fn create() -> Self {
        Self {
            editing: None,
            form: ad_form(None),
        }
    }

    fn edit(ad: &Ad) -> Self {
        Self {
            editing: Some(ad.id.clone()),
            form: ad_form(Some(ad)),
        }
    }
}

fn ad_form(ad: Option<&Ad>) -> Form {
    let placements: Vec<String> = AdPlacement::ALL.iter().map(ToString::to_string).collect();
    let types: Vec<String> = AdType::ALL.iter().map(ToString::to_string).collect();
    let placement_idx = ad
        .map(|a| AdPlacement::ALL.iter().position(|p| *p == a.placement).unwrap_or(0))
        .unwrap_or(0);
    let type_idx = ad
        .map(|a| AdType::ALL.iter().position(|t| *t == a.ad_type).unwrap_or(0))
        .unwrap_or(0);

    Form::new(vec![
        FormField::Text(
            TextField::new("Title")
                .required()
                .with_value(ad.map(|a| a.title.clone()).unwrap_or_default()),
        ),
        FormField::Text(
            TextField::new("Image URL")
                .required()
                .with_value(ad.map(|a| a.image_url.clone()).unwrap_or_default()),
        ),
        FormField::Text(
            TextField::new("Redirect URL")
                .required()
                .with_value(ad.map(|a| a.redirect_url.clone()).unwrap_or_default()),
        ),
        FormField::Select(SelectField::new("Placement", placements).with_selected(placement_idx)),
        FormField::Select(SelectField::new("Type", types).with_selected(type_idx)),
        FormField::Checkbox(CheckboxField::new("Active", ad.map(|a| a.is_active).unwrap_or(true))),
    ])
}

fn draft_from_form(form: &Form) -> AdDraft {
    AdDraft {
        title: form.text("Title").to_string(),
        image_url: form.text("Image URL").to_string(),
        redirect_url: form.text("Redirect URL").to_string(),
        placement: AdPlacement::ALL[form.selected("Placement").min(AdPlacement::ALL.len() - 1)],
        ad_type: AdType::ALL[form.selected("Type").min(AdType::ALL.len() - 1)],
        is_active: form.checked("Active"),
    }
}

pub struct AdsPage {
    pub ads: Vec<Ad>,
    pub table: DataTable,
    pub modal: Option<AdModal>,
    pub confirm_delete: bool,
    pub submitting: bool,
}

pub fn enter_ads(app: &mut App) {
    app.page = PageState::Ads(AdsPage {
        ads: Vec::new(),
        table: DataTable::new("No ads configured."),
        modal: None,
        confirm_delete: false,
        submitting: false,
    });
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move { FetchResult::Ads(svc.ads.list().await) });
}

pub fn ads_key(app: &mut App, key: KeyEvent) -> bool {
    enum Intent {
        Pass,
        Consumed,
        Toast(String),
        Create(AdDraft),
        Update { id: String, draft: AdDraft },
        Delete(String),
    }

    let intent = {
        let PageState::Ads(page) = &mut app.page else {
            return false;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) || page.submitting {
            Intent::Pass
        } else if let Some(modal) = &mut page.modal {
            match key.code {
                KeyCode::Esc => {
                    page.modal = None;
                    Intent::Consumed
                }
                KeyCode::Enter => match modal.form.missing_required() {
                    // The required-field check is the only client-side gate,
                    // exactly like the browser's `required` constraint.
                    Some(missing) => Intent::Toast(format!("{missing} is required")),
                    None => {
                        let draft = draft_from_form(&modal.form);
                        let editing = modal.editing.clone();
                        page.submitting = true;
                        match editing {
                            Some(id) => Intent::Update { id, draft },
                            None => Intent::Create(draft),
                        }
                    }
                },
                _ => {
                    modal.form.handle_key(key);
                    Intent::Consumed
                }
            }
        } else if page.confirm_delete {
            match key.code {
                KeyCode::Char('y') => match page.table.selected().and_then(|idx| page.ads.get(idx)) {
                    Some(ad) => {
                        page.submitting = true;
                        Intent::Delete(ad.id.clone())
                    }
                    None => Intent::Consumed,
                },
                _ => {
                    page.confirm_delete = false;
                    Intent::Consumed
                }
            }
        } else {
            match key.code {
                KeyCode::Char('c') => {
                    page.modal = Some(AdModal::create());
                    Intent::Consumed
                }
                KeyCode::Char('e') | KeyCode::Enter => {
                    match page.table.selected().and_then(|idx| page.ads.get(idx)) {
                        Some(ad) => {
                            page.modal = Some(AdModal::edit(ad));
                            Intent::Consumed
                        }
                        None => Intent::Consumed,
                    }
                }
                KeyCode::Char('d') if page.table.selected().is_some() => {
                    page.confirm_delete = true;
                    Intent::Consumed
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
        Intent::Create(draft) => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc.ads.create(&draft).await,
                    success: "Ad created".to_string(),
                    goto: None,
                }
            });
            true
        }
        Intent::Update { id, draft } => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc.ads.update(&id, &draft).await,
                    success: "Ad updated".to_string(),
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
                    result: svc.ads.delete(&id).await,
                    success: "Ad deleted".to_string(),
                    goto: None,
                }
            });
            true
        }
    }
}

pub fn draw_ads(page: &mut AdsPage, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row> = page
        .ads
        .iter()
        .map(|ad| {
            let active = if ad.is_active {
                Cell::new("Active".light_green())
            } else {
                Cell::new("Inactive".dim())
            };
            Row::new(vec![
                Cell::new(ad.title.clone()),
                Cell::new(ad.placement.to_string()),
                Cell::new(ad.ad_type.to_string()),
                active,
                Cell::new(ad.created_at.as_ref().map(date).unwrap_or_else(|| "—".to_string())),
            ])
        })
        .collect();
    page.table.draw(
        frame,
        area,
        "ads",
        Row::new(vec!["Title", "Placement", "Type", "Active", "Created"]),
        &[
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(10),
        ],
        rows,
        None,
    );

    if let Some(modal) = &page.modal {
        let title = if modal.editing.is_some() { "Edit ad" } else { "New ad" };
        let area = widgets::modal_area(frame, 56, 20);
        let inner = widgets::modal_block(frame, area, title);
        modal.form.draw(frame, inner);
    }
    if page.confirm_delete {
        let area = widgets::modal_area(frame, 44, 3);
        let inner = widgets::modal_block(frame, area, "Delete ad?");
        frame.render_widget(Paragraph::new("press y to confirm, any other key to cancel"), inner);
    }
}

// --- Agents -----------------------------------------------------------------

pub struct AgentModal {
    pub editing: Option<String>,
    pub form: Form,
}

const AGENT_ROLES: [Role; 2] = [Role::OnboardingAgent, Role::ReconciliationAgent];

impl AgentModal {
    fn create() -> Self {
        Self {
            editing: None,
            form: Form::new(vec![
                FormField::Text(TextField::new("Username").required()),
                FormField::Text(TextField::new("Password").required().masked()),
                FormField::Select(SelectField::new(
                    "Role",
                    AGENT_ROLES.iter().map(ToString::to_string).collect(),
                )),
            ]),
        }
    }

    fn edit(agent: &Operator) -> Self {
        let role_idx = AGENT_ROLES.iter().position(|r| *r == agent.role).unwrap_or(0);
        Self {
            editing: Some(agent.id.clone()),
            form: Form::new(vec![
                FormField::Text(TextField::new("Name").required().with_value(agent.name.clone())),
                FormField::Select(
                    SelectField::new("Role", AGENT_ROLES.iter().map(ToString::to_string).collect())
                        .with_selected(role_idx),
                ),
            ]),
        }
    }
}

pub struct AgentsPage {
    pub agents: Vec<Operator>,
    pub table: DataTable,
    pub modal: Option<AgentModal>,
    pub confirm_delete: bool,
    pub submitting: bool,
}

pub fn enter_agents(app: &mut App) {
    app.page = PageState::Agents(AgentsPage {
        agents: Vec::new(),
        table: DataTable::new("No agents."),
        modal: None,
        confirm_delete: false,
        submitting: false,
    });
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move { FetchResult::Agents(svc.agents.list().await) });
}

pub fn agents_key(app: &mut App, key: KeyEvent) -> bool {
    enum Intent {
        Pass,
        Consumed,
        Toast(String),
        Create(NewAgent),
        Update { id: String, update: AgentUpdate },
        Delete(String),
    }

    let intent = {
        let PageState::Agents(page) = &mut app.page else {
            return false;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) || page.submitting {
            Intent::Pass
        } else if let Some(modal) = &mut page.modal {
            match key.code {
                KeyCode::Esc => {
                    page.modal = None;
                    Intent::Consumed
                }
                KeyCode::Enter => match modal.form.missing_required() {
                    Some(missing) => Intent::Toast(format!("{missing} is required")),
                    None => {
                        let role = AGENT_ROLES[modal.form.selected("Role").min(AGENT_ROLES.len() - 1)];
                        let editing = modal.editing.clone();
                        page.submitting = true;
                        match editing {
                            Some(id) => Intent::Update {
                                id,
                                update: AgentUpdate {
                                    name: Some(modal.form.text("Name").to_string()),
                                    role: Some(role),
                                },
                            },
                            None => Intent::Create(NewAgent {
                                username: modal.form.text("Username").to_string(),
                                password: modal.form.text("Password").to_string(),
                                role,
                            }),
                        }
                    }
                },
                _ => {
                    modal.form.handle_key(key);
                    Intent::Consumed
                }
            }
        } else if page.confirm_delete {
            match key.code {
                KeyCode::Char('y') => {
                    match page.table.selected().and_then(|idx| page.agents.get(idx)) {
                        Some(agent) => {
                            page.submitting = true;
                            Intent::Delete(agent.id.clone())
                        }
                        None => Intent::Consumed,
                    }
                }
                _ => {
                    page.confirm_delete = false;
                    Intent::Consumed
                }
            }
        } else {
            match key.code {
                KeyCode::Char('c') => {
                    page.modal = Some(AgentModal::create());
                    Intent::Consumed
                }
                KeyCode::Char('e') | KeyCode::Enter => {
                    match page.table.selected().and_then(|idx| page.agents.get(idx)) {
                        Some(agent) => {
                            page.modal = Some(AgentModal::edit(agent));
                            Intent::Consumed
                        }
                        None => Intent::Consumed,
                    }
                }
                KeyCode::Char('d') if page.table.selected().is_some() => {
                    page.confirm_delete = true;
                    Intent::Consumed
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
        Intent::Create(agent) => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc.agents.create(&agent).await,
                    success: "Agent created".to_string(),
                    goto: None,
                }
            });
            true
        }
        Intent::Update { id, update } => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc.agents.update(&id, &update).await,
                    success: "Agent updated".to_string(),
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
                    result: svc.agents.delete(&id).await,
                    success: "Agent deleted".to_string(),
                    goto: None,
                }
            });
            true
        }
    }
}

pub fn draw_agents(page: &mut AgentsPage, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row> = page
        .agents
        .iter()
        .map(|agent| {
            let status = match agent.status {
                bahumati::models::AgentStatus::Active => Cell::new("Active".light_green()),
                bahumati::models::AgentStatus::Disabled => Cell::new("Disabled".light_red()),
            };
            Row::new(vec![
                Cell::new(agent.name.clone()),
                Cell::new(agent.username.clone().unwrap_or_else(|| "—".to_string())),
                Cell::new(agent.role.to_string()),
                status,
                Cell::new(
                    agent
                        .last_active
                        .as_ref()
                        .map(date)
                        .unwrap_or_else(|| "—".to_string()),
                ),
            ])
        })
        .collect();
    page.table.draw(
        frame,
        area,
        "agents",
        Row::new(vec!["Name", "Username", "Role", "Status", "Last active"]),
        &[
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Length(11),
        ],
        rows,
        None,
    );

    if let Some(modal) = &page.modal {
        let title = if modal.editing.is_some() { "Edit agent" } else { "New agent" };
        let area = widgets::modal_area(frame, 52, 12);
        let inner = widgets::modal_block(frame, area, title);
        modal.form.draw(frame, inner);
    }
    if page.confirm_delete {
        let area = widgets::modal_area(frame, 44, 3);
        let inner = widgets::modal_block(frame, area, "Delete agent?");
        frame.render_widget(Paragraph::new("press y to confirm, any other key to cancel"), inner);
    }
}

// --- Config -----------------------------------------------------------------

pub struct ConfigPage {
    pub form: Form,
    pub loaded: bool,
    pub submitting: bool,
}

fn config_form(config: &AppConfig) -> Form {
    Form::new(vec![
        FormField::Checkbox(CheckboxField::new("Maintenance mode", config.maintenance_mode)),
        FormField::Text(
            TextField::new("Min iOS version")
                .required()
                .with_value(config.min_app_version_ios.clone()),
        ),
        FormField::Text(
            TextField::new("Min Android version")
                .required()
                .with_value(config.min_app_version_android.clone()),
        ),
        FormField::Text(
            TextField::new("Support email")
                .required()
                .with_value(config.support_email.clone()),
        ),
        FormField::Text(
            TextField::new("Support phone")
                .required()
                .with_value(config.support_phone.clone()),
        ),
        FormField::Text(
            TextField::new("Max daily withdrawal limit")
                .required()
                .with_value(config.max_daily_withdrawal_limit.to_string()),
        ),
        FormField::Checkbox(CheckboxField::new(
            "KYC auto-approval",
            config.kyc_auto_approval_enabled,
        )),
    ])
}

fn config_from_form(form: &Form) -> Result<AppConfig, String> {
    let limit: f64 = form
        .text("Max daily withdrawal limit")
        .parse()
        .map_err(|_| "Max daily withdrawal limit must be a number".to_string())?;
    Ok(AppConfig {
        maintenance_mode: form.checked("Maintenance mode"),
        min_app_version_ios: form.text("Min iOS version").to_string(),
        min_app_version_android: form.text("Min Android version").to_string(),
        support_email: form.text("Support email").to_string(),
        support_phone: form.text("Support phone").to_string(),
        max_daily_withdrawal_limit: limit,
        kyc_auto_approval_enabled: form.checked("KYC auto-approval"),
    })
}

pub fn enter_config(app: &mut App) {
    app.page = PageState::Config(ConfigPage {
        form: Form::default(),
        loaded: false,
        submitting: false,
    });
    let Some(svc) = app.services.clone() else {
        return;
    };
    app.spawn(async move { FetchResult::Config(svc.config.get().await) });
}

pub fn on_config_loaded(page: &mut ConfigPage, config: &AppConfig) {
    page.form = config_form(config);
    page.loaded = true;
}

pub fn config_key(app: &mut App, key: KeyEvent) -> bool {
    enum Intent {
        Pass,
        Consumed,
        Toast(String),
        Save(AppConfig),
    }

    let intent = {
        let PageState::Config(page) = &mut app.page else {
            return false;
        };
        if !page.loaded || page.submitting {
            Intent::Pass
        } else if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            match page.form.missing_required() {
                Some(missing) => Intent::Toast(format!("{missing} is required")),
                None => match config_from_form(&page.form) {
                    Ok(config) => {
                        page.submitting = true;
                        Intent::Save(config)
                    }
                    Err(message) => Intent::Toast(message),
                },
            }
        } else if key.modifiers.contains(KeyModifiers::CONTROL) {
            Intent::Pass
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
        Intent::Save(config) => {
            let Some(svc) = app.services.clone() else {
                return true;
            };
            app.spawn(async move {
                FetchResult::Mutation {
                    result: svc.config.update(&config).await.map(|_| ()),
                    success: "Configuration saved".to_string(),
                    goto: None,
                }
            });
            true
        }
    }
}

pub fn draw_config(page: &ConfigPage, frame: &mut Frame, area: Rect) {
    if !page.loaded {
        frame.render_widget(
            Paragraph::new("Loading configuration…").alignment(Alignment::Center),
            area,
        );
        return;
    }
    let [form_area, hint] =
        Layout::vertical([Constraint::Length(21), Constraint::Length(1)]).areas(area);
    page.form.draw(frame, form_area);
    frame.render_widget(
        Paragraph::new("Ctrl+S saves the configuration").dim(),
        hint,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> AppConfig {
        AppConfig {
            maintenance_mode: false,
            min_app_version_ios: "1.2.0".to_string(),
            min_app_version_android: "1.1.0".to_string(),
            support_email: "support@bahumati.in".to_string(),
            support_phone: "+91-800-123-4567".to_string(),
            max_daily_withdrawal_limit: 5000.0,
            kyc_auto_approval_enabled: false,
        }
    }

    #[test]
    fn config_round_trips_through_the_form() {
        let form = config_form(&sample_config());
        let parsed = config_from_form(&form).unwrap();
        assert_eq!(parsed.min_app_version_ios, "1.2.0");
        assert_eq!(parsed.max_daily_withdrawal_limit, 5000.0);
        assert!(!parsed.maintenance_mode);
    }

    #[test]
    fn config_rejects_non_numeric_limit() {
        let mut form = config_form(&sample_config());
        for field in &mut form.fields {
            if let FormField::Text(f) = field
                && f.label == "Max daily withdrawal limit"
            {
                *f = f.clone().with_value("lots");
            }
        }
        assert!(config_from_form(&form).is_err());
    }

    #[test]
    fn ad_form_requires_image_url() {
        let mut form = ad_form(None);
        assert_eq!(form.missing_required(), Some("Title"));
        for field in &mut form.fields {
            if let FormField::Text(f) = field
                && f.label == "Title"
            {
                *f = f.clone().with_value("Welcome Bonus");
            }
        }
        assert_eq!(form.missing_required(), Some("Image URL"));
    }
}
