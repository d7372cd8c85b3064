//! Generic UI primitives: table, form fields, pagination, toasts.
//!
//! These render and hold cursor/selection state only — they never fetch,
//! sort, or validate domain rules. Filtering and validation belong to the
//! page that owns the data.

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, List, ListDirection, ListItem, Paragraph, Row, Table, TableState},
};
use std::collections::VecDeque;

const MAX_TOASTS: usize = 64;

// --- Text input -------------------------------------------------------------

/// A single-line controlled input with cursor movement.
#[derive(Debug, Clone)]
pub struct TextField {
    pub label: &'static str,
    pub value: String,
    pub char_idx: usize,
    pub required: bool,
    pub masked: bool,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            char_idx: 0,
            required: false,
            masked: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.char_idx = self.value.chars().count();
        self
    }

    fn byte_idx(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.char_idx)
            .map_or(self.value.len(), |(i, _)| i)
    }

    pub fn input(&mut self, c: char) {
        let idx = self.byte_idx();
        self.value.insert(idx, c);
        self.char_idx += 1;
    }

    pub fn backspace(&mut self) {
        if self.char_idx > 0 {
            self.char_idx -= 1;
            let idx = self.byte_idx();
            self.value.remove(idx);
        }
    }

    pub fn delete(&mut self) {
        if self.char_idx < self.value.chars().count() {
            let idx = self.byte_idx();
            self.value.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.char_idx = self.char_idx.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.char_idx < self.value.chars().count() {
            self.char_idx += 1;
        }
    }

    pub fn jump_to_first(&mut self) {
        self.char_idx = 0;
    }

    pub fn jump_to_last(&mut self) {
        self.char_idx = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.char_idx = 0;
    }

    /// Trimmed value for submission.
    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    pub fn display_value(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Route an edit key to this field. Returns false for keys the field
    /// does not consume (Enter, Tab, Esc, ...).
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => {
                self.input(c);
                true
            }
            KeyCode::Backspace => {
                self.backspace();
                true
            }
            KeyCode::Delete => {
                self.delete();
                true
            }
            KeyCode::Left => {
                self.move_left();
                true
            }
            KeyCode::Right => {
                self.move_right();
                true
            }
            KeyCode::Home => {
                self.jump_to_first();
                true
            }
            KeyCode::End => {
                self.jump_to_last();
                true
            }
            _ => false,
        }
    }
}

/// A closed-option picker; Left/Right cycle.
#[derive(Debug, Clone)]
pub struct SelectField {
    pub label: &'static str,
    pub options: Vec<String>,
    pub selected: usize,
}

impl SelectField {
    pub fn new(label: &'static str, options: Vec<String>) -> Self {
        Self {
            label,
            options,
            selected: 0,
        }
    }

    pub fn with_selected(mut self, selected: usize) -> Self {
        self.selected = selected.min(self.options.len().saturating_sub(1));
        self
    }

    pub fn next(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + 1) % self.options.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + self.options.len() - 1) % self.options.len();
        }
    }

    pub fn value(&self) -> &str {
        self.options.get(self.selected).map_or("", String::as_str)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left => {
                self.prev();
                true
            }
            KeyCode::Right | KeyCode::Char(' ') => {
                self.next();
                true
            }
            _ => false,
        }
    }
}

/// A toggle; Space flips.
#[derive(Debug, Clone)]
pub struct CheckboxField {
    pub label: &'static str,
    pub checked: bool,
}

impl CheckboxField {
    pub fn new(label: &'static str, checked: bool) -> Self {
        Self { label, checked }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                self.checked = !self.checked;
                true
            }
            _ => false,
        }
    }
}

/// One slot in a [`Form`].
#[derive(Debug, Clone)]
pub enum FormField {
    Text(TextField),
    Select(SelectField),
    Checkbox(CheckboxField),
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Text(f) => f.label,
            FormField::Select(f) => f.label,
            FormField::Checkbox(f) => f.label,
        }
    }
}

/// An ordered field list with one focused field. The only built-in check is
/// required-field emptiness — the browser-style `required` constraint.
#[derive(Debug, Clone, Default)]
pub struct Form {
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Route a key to the focused field; Tab/BackTab move focus.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.next_field();
                return true;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.prev_field();
                return true;
            }
            _ => {}
        }
        match self.fields.get_mut(self.focus) {
            Some(FormField::Text(f)) => f.handle_key(key),
            Some(FormField::Select(f)) => f.handle_key(key),
            Some(FormField::Checkbox(f)) => f.handle_key(key),
            None => false,
        }
    }

    /// The label of the first empty required field, if any.
    pub fn missing_required(&self) -> Option<&'static str> {
        self.fields.iter().find_map(|field| match field {
            FormField::Text(f) if f.required && f.trimmed().is_empty() => Some(f.label),
            _ => None,
        })
    }

    pub fn text(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find_map(|field| match field {
                FormField::Text(f) if f.label == label => Some(f.trimmed()),
                _ => None,
            })
            .unwrap_or("")
    }

    pub fn selected(&self, label: &str) -> usize {
        self.fields
            .iter()
            .find_map(|field| match field {
                FormField::Select(f) if f.label == label => Some(f.selected),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn checked(&self, label: &str) -> bool {
        self.fields
            .iter()
            .find_map(|field| match field {
                FormField::Checkbox(f) if f.label == label => Some(f.checked),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Render one bordered line per field, highlighting the focused one.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let constraints: Vec<Constraint> =
            self.fields.iter().map(|_| Constraint::Length(3)).collect();
        let rows = Layout::vertical(constraints).split(area);
        for (idx, field) in self.fields.iter().enumerate() {
            let Some(row) = rows.get(idx) else { break };
            let focused = idx == self.focus;
            let (label, rendered): (String, String) = match field {
                FormField::Text(f) => {
                    let mark = if f.required { " *" } else { "" };
                    (format!(" {}{mark} ", f.label), f.display_value())
                }
                FormField::Select(f) => (format!(" {} ", f.label), format!("◂ {} ▸", f.value())),
                FormField::Checkbox(f) => (
                    format!(" {} ", f.label),
                    if f.checked { "[x]".to_string() } else { "[ ]".to_string() },
                ),
            };
            let mut block = Block::bordered().title(label);
            if focused {
                block = block.border_style(Style::new().light_yellow());
            }
            frame.render_widget(Paragraph::new(rendered).block(block), *row);
            if focused && let FormField::Text(f) = field {
                frame.set_cursor_position(ratatui::layout::Position::new(
                    row.x + f.char_idx as u16 + 1,
                    row.y + 1,
                ));
            }
        }
    }
}

// --- Pagination -------------------------------------------------------------

/// Bounded prev/next page controls. Pages are 1-based, matching the
/// backend's `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(current: u32, total_pages: u32) -> Self {
        Self {
            current: current.max(1),
            total_pages: total_pages.max(1),
        }
    }

    pub fn prev_enabled(&self) -> bool {
        self.current > 1
    }

    pub fn next_enabled(&self) -> bool {
        self.current < self.total_pages
    }

    /// The previous page number, unchanged when already on page 1.
    pub fn prev(&self) -> u32 {
        if self.prev_enabled() { self.current - 1 } else { self.current }
    }

    /// The next page number, unchanged when already on the last page.
    pub fn next(&self) -> u32 {
        if self.next_enabled() { self.current + 1 } else { self.current }
    }

    pub fn footer(&self) -> String {
        let prev = if self.prev_enabled() { "◂ prev" } else { "·     " };
        let next = if self.next_enabled() { "next ▸" } else { "     ·" };
        format!(" {prev}  page {}/{}  {next} ", self.current, self.total_pages)
    }
}

// --- Data table -------------------------------------------------------------

/// Selection + loading/empty state for one table of rows. The caller builds
/// the rows; this widget never touches the data.
#[derive(Debug)]
pub struct DataTable {
    pub state: TableState,
    pub len: usize,
    pub loading: bool,
    pub empty_message: &'static str,
}

impl DataTable {
    pub fn new(empty_message: &'static str) -> Self {
        Self {
            state: TableState::default(),
            len: 0,
            loading: true,
            empty_message,
        }
    }

    /// Record a freshly loaded row count and clamp the selection.
    pub fn loaded(&mut self, len: usize) {
        self.loading = false;
        self.len = len;
        if len == 0 {
            self.state.select(None);
        } else {
            let idx = self.state.selected().unwrap_or(0).min(len - 1);
            self.state.select(Some(idx));
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected().filter(|_| self.len > 0)
    }

    pub fn move_up(&mut self) {
        if let Some(idx) = self.state.selected() {
            self.state.select(Some(idx.saturating_sub(1)));
        }
    }

    pub fn move_down(&mut self) {
        if let Some(idx) = self.state.selected()
            && self.len > 0
        {
            self.state.select(Some((idx + 1).min(self.len - 1)));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => {
                self.move_up();
                true
            }
            KeyCode::Down => {
                self.move_down();
                true
            }
            _ => false,
        }
    }

    /// Render the table, or its loading/empty placeholder.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        header: Row<'static>,
        widths: &[Constraint],
        rows: Vec<Row<'static>>,
        footer: Option<String>,
    ) {
        let mut block = Block::bordered().title(format!(" {title}  "));
        if let Some(footer) = footer {
            block = block.title_bottom(footer);
        }

        if self.loading {
            let placeholder = Paragraph::new("Loading…")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }
        if rows.is_empty() {
            let placeholder = Paragraph::new(self.empty_message)
                .alignment(Alignment::Center)
                .dim()
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let table = Table::new(rows, widths.to_vec())
            .header(header.bold())
            .row_highlight_style(Style::new().bold().white().on_dark_gray())
            .block(block);
        frame.render_stateful_widget(table, area, &mut self.state);
    }
}

// --- Toasts -----------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Error,
}

/// A timestamped notification with an importance label to direct operator
/// attention.
#[derive(Debug, Clone)]
pub struct Toast {
    pub at: DateTime<Utc>,
    pub kind: ToastKind,
    pub message: String,
}

impl From<&Toast> for ListItem<'_> {
    fn from(toast: &Toast) -> Self {
        let tag = match toast.kind {
            ToastKind::Success => "OK".light_green(),
            ToastKind::Info => "INFO".light_blue(),
            ToastKind::Error => "ERROR".light_red(),
        };
        let line = Line::from(vec![
            format!("[{} ", toast.at.format("%H:%M:%S")).into(),
            Span::styled(format!("{:5}", tag.content), tag.style),
            format!("]: {}", toast.message).into(),
        ]);
        ListItem::new(line)
    }
}

/// Bounded toast history, newest rendered first.
#[derive(Debug, Default)]
pub struct Toasts {
    items: VecDeque<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) {
        if self.items.len() == MAX_TOASTS {
            self.items.pop_front();
        }
        self.items.push_back(Toast {
            at: Utc::now(),
            kind,
            message: message.into(),
        });
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self.items.iter().rev().map(ListItem::from).collect();
        let list = List::new(items)
            .direction(ListDirection::TopToBottom)
            .block(Block::bordered().title(" notifications  "));
        frame.render_widget(list, area);
    }
}

// --- Shared rendering helpers ----------------------------------------------

/// Rupee amount for display.
pub fn inr(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("₹{amount:.0}")
    } else {
        format!("₹{amount:.2}")
    }
}

pub fn date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

pub fn datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// The bottom help bar: bold keys with dim action labels.
pub fn help_bar(frame: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let mut spans: Vec<Span> = Vec::new();
    for (idx, (key, action)) in hints.iter().enumerate() {
        if idx > 0 {
            spans.push(" | ".into());
        }
        spans.push(Span::styled((*key).to_string(), Style::new().bold().white()));
        spans.push(format!(" {action}").into());
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// A centered overlay rect for modal forms.
pub fn modal_area(frame: &Frame, width: u16, height: u16) -> Rect {
    let area = frame.area();
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Clear and frame a modal region, returning the inner area.
pub fn modal_block(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::bordered().title(format!(" {title}  "));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// Label/value rows for a detail card.
pub fn info_lines(pairs: &[(&str, String)]) -> Text<'static> {
    let lines: Vec<Line> = pairs
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label:<18}"), Style::new().dim()),
                Span::raw(value.clone()),
            ])
        })
        .collect();
    Text::from(lines)
}

/// Row cell helper with right alignment for amounts.
pub fn amount_cell(amount: f64) -> Cell<'static> {
    Cell::new(Text::from(inr(amount)).alignment(Alignment::Right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn prev_disabled_exactly_on_page_one() {
        assert!(!Pagination::new(1, 5).prev_enabled());
        assert!(Pagination::new(2, 5).prev_enabled());
        assert_eq!(Pagination::new(1, 5).prev(), 1);
        assert_eq!(Pagination::new(3, 5).prev(), 2);
    }

    #[test]
    fn next_disabled_exactly_on_last_page() {
        assert!(!Pagination::new(5, 5).next_enabled());
        assert!(Pagination::new(4, 5).next_enabled());
        assert_eq!(Pagination::new(5, 5).next(), 5);
        assert_eq!(Pagination::new(4, 5).next(), 5);
    }

    #[test]
    fn single_page_disables_both_controls() {
        let p = Pagination::new(1, 1);
        assert!(!p.prev_enabled());
        assert!(!p.next_enabled());
    }

    #[test]
    fn text_field_edits_at_the_cursor() {
        let mut field = TextField::new("Phone");
        for c in "987654".chars() {
            field.input(c);
        }
        field.move_left();
        field.move_left();
        field.input('X');
        assert_eq!(field.value, "9876X54");
        field.backspace();
        assert_eq!(field.value, "987654");
        field.jump_to_last();
        field.delete();
        assert_eq!(field.value, "987654");
    }

    #[test]
    fn masked_field_hides_its_value() {
        let field = TextField::new("Password").masked().with_value("s3cret");
        assert_eq!(field.display_value(), "••••••");
        assert_eq!(field.trimmed(), "s3cret");
    }

    #[test]
    fn form_required_check_blocks_empty_fields_only() {
        let mut form = Form::new(vec![
            FormField::Text(TextField::new("Title").required()),
            FormField::Text(TextField::new("Image URL").required()),
            FormField::Text(TextField::new("Notes")),
        ]);
        assert_eq!(form.missing_required(), Some("Title"));

        if let FormField::Text(f) = &mut form.fields[0] {
            *f = f.clone().with_value("Welcome Bonus");
        }
        assert_eq!(form.missing_required(), Some("Image URL"));

        if let FormField::Text(f) = &mut form.fields[1] {
            *f = f.clone().with_value("https://cdn/banner.png");
        }
        assert_eq!(form.missing_required(), None);
    }

    #[test]
    fn form_tab_cycles_focus() {
        let mut form = Form::new(vec![
            FormField::Text(TextField::new("Username")),
            FormField::Text(TextField::new("Password")),
        ]);
        assert_eq!(form.focus, 0);
        form.handle_key(key(KeyCode::Tab));
        assert_eq!(form.focus, 1);
        form.handle_key(key(KeyCode::Tab));
        assert_eq!(form.focus, 0);
        form.handle_key(key(KeyCode::BackTab));
        assert_eq!(form.focus, 1);
    }

    #[test]
    fn select_field_wraps_in_both_directions() {
        let mut field = SelectField::new("Role", vec!["A".into(), "B".into(), "C".into()]);
        field.prev();
        assert_eq!(field.value(), "C");
        field.next();
        assert_eq!(field.value(), "A");
    }

    #[test]
    fn data_table_clamps_selection_after_shrink() {
        let mut table = DataTable::new("empty");
        table.loaded(3);
        table.move_down();
        table.move_down();
        assert_eq!(table.selected(), Some(2));
        table.loaded(1);
        assert_eq!(table.selected(), Some(0));
        table.loaded(0);
        assert_eq!(table.selected(), None);
    }

    #[test]
    fn toast_history_is_bounded() {
        let mut toasts = Toasts::new();
        for i in 0..(MAX_TOASTS + 10) {
            toasts.push(ToastKind::Info, format!("m{i}"));
        }
        assert_eq!(toasts.items.len(), MAX_TOASTS);
        assert_eq!(toasts.items.back().unwrap().message, "m73");
    }

    #[test]
    fn inr_formats_whole_and_fractional_amounts() {
        assert_eq!(inr(5000.0), "₹5000");
        assert_eq!(inr(99.5), "₹99.50");
    }
}
