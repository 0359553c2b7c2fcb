//! Roster screen: the student form above the student table.
//!
//! The form always mirrors the controller's edit session; keystrokes are
//! turned into `InsertChar`/`DeleteChar` actions and the updated session
//! comes back through `SessionChanged`. Nothing here talks to the network.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::{Throbber, ThrobberState};

use roster_core::{
    DraftField, EditMode, EditSession, LoadState, RecordId, RosterEvent, Snapshot, StudentRecord,
};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

/// Which half of the screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    List,
    Form,
}

pub struct RosterScreen {
    students: Snapshot,
    session: EditSession,
    load_state: LoadState,
    pane: Pane,
    active_field: DraftField,
    table_state: TableState,
    throbber_state: ThrobberState,
}

impl RosterScreen {
    pub fn new() -> Self {
        Self {
            students: Arc::new(Vec::new()),
            session: EditSession::new(),
            load_state: LoadState::Idle,
            pane: Pane::List,
            active_field: DraftField::Name,
            table_state: TableState::default(),
            throbber_state: ThrobberState::default(),
        }
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    fn focus_form(&mut self) {
        self.pane = Pane::Form;
        self.active_field = DraftField::Name;
    }

    // ── Selection ────────────────────────────────────────────────────

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn select(&mut self, idx: usize) {
        if self.students.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state
                .select(Some(idx.min(self.students.len() - 1)));
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.students.is_empty() {
            return;
        }
        self.select(self.selected_index().saturating_add_signed(delta));
    }

    pub fn selected_student(&self) -> Option<&Arc<StudentRecord>> {
        self.table_state
            .selected()
            .and_then(|idx| self.students.get(idx))
    }

    fn selected_id(&self) -> Option<RecordId> {
        self.selected_student().map(|s| s.id.clone())
    }

    fn select_id(&mut self, id: &RecordId) {
        if let Some(idx) = self.students.iter().position(|s| &s.id == id) {
            self.select(idx);
        }
    }

    // ── Key handling ─────────────────────────────────────────────────

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.select(0);
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.select(self.students.len().saturating_sub(1));
                None
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let id = self.selected_id()?;
                self.focus_form();
                Some(Action::StartEdit(id))
            }
            KeyCode::Char('d') | KeyCode::Delete => self.selected_id().map(Action::RequestDelete),
            KeyCode::Char('n' | 'a') => {
                self.focus_form();
                Some(Action::StartCreate)
            }
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Tab | KeyCode::Char('i') => {
                self.pane = Pane::Form;
                None
            }
            _ => None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        let field = self.active_field;
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.active_field = field.next();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.active_field = field.prev();
                None
            }
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Esc => {
                self.pane = Pane::List;
                self.session.is_editing().then_some(Action::StartCreate)
            }
            KeyCode::Backspace => Some(Action::DeleteChar { field }),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::InsertChar { field, ch })
            }
            _ => None,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let focused = self.pane == Pane::Form;
        let title = match self.session.mode() {
            EditMode::Create => " Add student ".to_owned(),
            EditMode::Edit { target } => format!(" Edit student #{target} "),
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let draft = self.session.draft();
        let mut lines: Vec<Line> = DraftField::ALL
            .iter()
            .map(|&field| {
                let is_active = focused && field == self.active_field;
                let label_style = if is_active {
                    theme::field_focused()
                } else {
                    theme::field_label()
                };
                let marker = if is_active { "▸ " } else { "  " };
                let value = draft.get(field);
                let value_span = if value.is_empty() {
                    Span::styled(field.placeholder(), theme::placeholder())
                } else {
                    Span::styled(value.to_owned(), theme::field_value())
                };
                let cursor = if is_active { "▎" } else { "" };

                Line::from(vec![
                    Span::styled(marker, label_style),
                    Span::styled(format!("{:<17}", field.label()), label_style),
                    value_span,
                    Span::styled(cursor, Style::default().fg(theme::ELECTRIC_YELLOW)),
                ])
            })
            .collect();

        let submit_label = if self.session.is_editing() {
            "update  "
        } else {
            "add  "
        };
        let escape_label = if self.session.is_editing() {
            "cancel edit"
        } else {
            "back to list"
        };
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  Tab", theme::key_hint_key()),
            Span::styled(" next field  ", theme::key_hint()),
            Span::styled("Enter", theme::key_hint_key()),
            Span::styled(format!(" {submit_label}"), theme::key_hint()),
            Span::styled("Esc", theme::key_hint_key()),
            Span::styled(format!(" {escape_label}"), theme::key_hint()),
        ]));

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let focused = self.pane == Pane::List;
        let block = Block::default()
            .title(format!(" Students ({}) ", self.students.len()))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Min(1),    // table
            Constraint::Length(1), // hints
        ])
        .split(inner);

        if self.students.is_empty() {
            self.render_empty(frame, layout[0]);
        } else {
            self.render_table(frame, layout[0]);
        }

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("e ", theme::key_hint_key()),
            Span::styled("edit  ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("new  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

        match &self.load_state {
            LoadState::Idle | LoadState::Loading => {
                let throbber = Throbber::default()
                    .label("  Loading students...")
                    .style(Style::default().fg(theme::NEON_CYAN))
                    .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
                frame.render_stateful_widget(throbber, rows[1], &mut self.throbber_state.clone());
            }
            LoadState::Failed { message } => {
                let line = Line::from(vec![
                    Span::styled("  Could not load students: ", Style::default().fg(theme::ERROR_RED)),
                    Span::styled(message.clone(), theme::table_row()),
                ]);
                frame.render_widget(Paragraph::new(line), rows[1]);
                let retry = Line::from(vec![
                    Span::styled("  r ", theme::key_hint_key()),
                    Span::styled("retry", theme::key_hint()),
                ]);
                frame.render_widget(Paragraph::new(retry), rows[2]);
            }
            LoadState::Loaded => {
                let line = Line::from(vec![
                    Span::styled("  No students yet. Press ", theme::key_hint()),
                    Span::styled("n", theme::key_hint_key()),
                    Span::styled(" to add one.", theme::key_hint()),
                ]);
                frame.render_widget(Paragraph::new(line), rows[1]);
            }
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(vec![
            Cell::from("ID").style(theme::table_header()),
            Cell::from("Name").style(theme::table_header()),
            Cell::from("Email").style(theme::table_header()),
            Cell::from("Major").style(theme::table_header()),
            Cell::from("Enrolled").style(theme::table_header()),
        ]);

        let selected = self.table_state.selected();
        let target = self.session.target_id();
        let rows: Vec<Row> = self
            .students
            .iter()
            .enumerate()
            .map(|(i, student)| {
                let prefix = if selected == Some(i) { "▸" } else { " " };
                let id_style = if target == Some(&student.id) {
                    Style::default().fg(theme::CORAL)
                } else {
                    Style::default().fg(theme::NEON_CYAN)
                };
                Row::new(vec![
                    Cell::from(format!("{prefix}{}", student.id)).style(id_style),
                    Cell::from(student.name.clone()),
                    Cell::from(student.email.clone()),
                    Cell::from(student.major_display().to_owned()),
                    Cell::from(student.enrollment_date_display().to_owned()),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Length(8),
            Constraint::Min(16),
            Constraint::Min(22),
            Constraint::Min(14),
            Constraint::Length(11),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }
}

impl Component for RosterScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.pane {
            Pane::List => self.handle_list_key(key),
            Pane::Form => self.handle_form_key(key),
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::StudentsUpdated(students) => {
                let previous = self.selected_id();
                self.students = Arc::clone(students);
                match previous {
                    Some(id) if self.students.iter().any(|s| s.id == id) => self.select_id(&id),
                    _ => self.select(self.selected_index()),
                }
            }
            Action::SessionChanged(session) => {
                self.session = session.clone();
            }
            Action::LoadStateChanged(state) => {
                self.load_state = state.clone();
            }
            Action::Tick => {
                if matches!(self.load_state, LoadState::Idle | LoadState::Loading) {
                    self.throbber_state.calc_next();
                }
            }
            Action::Roster(RosterEvent::Created { record }) => {
                self.select_id(&record.id);
                self.active_field = DraftField::Name;
            }
            Action::Roster(RosterEvent::Updated { id }) => {
                self.select_id(id);
                self.pane = Pane::List;
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            // Four fields, blank line, hints, borders
            Constraint::Length(8),
            Constraint::Min(5),
        ])
        .split(area);

        self.render_form(frame, layout[0]);
        self.render_list(frame, layout[1]);
    }

    fn captures_text(&self) -> bool {
        self.pane == Pane::Form
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(id: i64, name: &str) -> Arc<StudentRecord> {
        Arc::new(StudentRecord {
            id: RecordId::from(id),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            major: String::new(),
            enrollment_date: String::new(),
        })
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn screen_with(names: &[&str]) -> RosterScreen {
        let mut screen = RosterScreen::new();
        let students: Vec<_> = names
            .iter()
            .zip(1..)
            .map(|(name, id)| record(id, name))
            .collect();
        screen
            .update(&Action::StudentsUpdated(Arc::new(students)))
            .unwrap();
        screen
    }

    fn press(screen: &mut RosterScreen, code: KeyCode) -> Option<Action> {
        screen.handle_key_event(key(code)).unwrap()
    }

    #[test]
    fn first_snapshot_selects_first_row() {
        let screen = screen_with(&["Ann", "Bob"]);
        assert_eq!(screen.selected_student().unwrap().name, "Ann");
    }

    #[test]
    fn selection_follows_record_across_refresh() {
        let mut screen = screen_with(&["Ann", "Bob", "Cy"]);
        press(&mut screen, KeyCode::Char('j'));
        assert_eq!(screen.selected_student().unwrap().name, "Bob");

        // Bob moves to the front after the server reorders.
        let reordered = Arc::new(vec![record(2, "Bob"), record(1, "Ann"), record(3, "Cy")]);
        screen.update(&Action::StudentsUpdated(reordered)).unwrap();
        assert_eq!(screen.selected_student().unwrap().name, "Bob");
    }

    #[test]
    fn selection_clamps_when_list_shrinks() {
        let mut screen = screen_with(&["Ann", "Bob", "Cy"]);
        press(&mut screen, KeyCode::Char('G'));
        screen
            .update(&Action::StudentsUpdated(Arc::new(vec![record(1, "Ann")])))
            .unwrap();
        assert_eq!(screen.selected_student().unwrap().name, "Ann");

        screen
            .update(&Action::StudentsUpdated(Arc::new(Vec::new())))
            .unwrap();
        assert!(screen.selected_student().is_none());
    }

    #[test]
    fn edit_key_targets_selected_record() {
        let mut screen = screen_with(&["Ann", "Bob"]);
        press(&mut screen, KeyCode::Down);
        let action = press(&mut screen, KeyCode::Char('e'));
        assert!(matches!(action, Some(Action::StartEdit(id)) if id == RecordId::from(2)));
        assert_eq!(screen.pane(), Pane::Form);
    }

    #[test]
    fn delete_key_requests_confirmation() {
        let mut screen = screen_with(&["Ann"]);
        let action = press(&mut screen, KeyCode::Char('d'));
        assert!(matches!(action, Some(Action::RequestDelete(id)) if id == RecordId::from(1)));
        assert_eq!(screen.pane(), Pane::List);
    }

    #[test]
    fn list_keys_on_empty_list_do_nothing() {
        let mut screen = screen_with(&[]);
        assert!(press(&mut screen, KeyCode::Char('e')).is_none());
        assert!(press(&mut screen, KeyCode::Char('d')).is_none());
        assert_eq!(screen.pane(), Pane::List);
    }

    #[test]
    fn typing_targets_active_field() {
        let mut screen = screen_with(&[]);
        press(&mut screen, KeyCode::Char('n'));
        assert!(screen.captures_text());

        let action = press(&mut screen, KeyCode::Char('n'));
        assert!(matches!(
            action,
            Some(Action::InsertChar {
                field: DraftField::Name,
                ch: 'n'
            })
        ));

        press(&mut screen, KeyCode::Tab);
        let action = press(&mut screen, KeyCode::Backspace);
        assert!(matches!(
            action,
            Some(Action::DeleteChar {
                field: DraftField::Email
            })
        ));
    }

    #[test]
    fn control_chords_are_not_text() {
        let mut screen = screen_with(&[]);
        press(&mut screen, KeyCode::Tab);
        let chord = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert!(screen.handle_key_event(chord).unwrap().is_none());
    }

    #[test]
    fn tab_cycles_fields_and_wraps() {
        let mut screen = screen_with(&[]);
        press(&mut screen, KeyCode::Char('n'));
        for expected in [
            DraftField::Email,
            DraftField::Major,
            DraftField::EnrollmentDate,
            DraftField::Name,
        ] {
            press(&mut screen, KeyCode::Tab);
            assert_eq!(screen.active_field, expected);
        }
        press(&mut screen, KeyCode::BackTab);
        assert_eq!(screen.active_field, DraftField::EnrollmentDate);
    }

    #[test]
    fn escape_cancels_edit_but_keeps_new_draft() {
        let mut screen = screen_with(&["Ann"]);
        press(&mut screen, KeyCode::Char('n'));
        assert!(press(&mut screen, KeyCode::Esc).is_none());
        assert_eq!(screen.pane(), Pane::List);

        press(&mut screen, KeyCode::Char('e'));
        let mut editing = EditSession::new();
        editing.start_edit(&record(1, "Ann"));
        screen.update(&Action::SessionChanged(editing)).unwrap();
        assert!(matches!(
            press(&mut screen, KeyCode::Esc),
            Some(Action::StartCreate)
        ));
    }

    #[test]
    fn enter_in_form_submits() {
        let mut screen = screen_with(&[]);
        press(&mut screen, KeyCode::Tab);
        assert!(matches!(
            press(&mut screen, KeyCode::Enter),
            Some(Action::Submit)
        ));
    }

    #[test]
    fn successful_update_returns_to_list() {
        let mut screen = screen_with(&["Ann", "Bob"]);
        press(&mut screen, KeyCode::Char('e'));
        screen
            .update(&Action::Roster(RosterEvent::Updated {
                id: RecordId::from(2),
            }))
            .unwrap();
        assert_eq!(screen.pane(), Pane::List);
        assert_eq!(screen.selected_student().unwrap().name, "Bob");
    }
}
