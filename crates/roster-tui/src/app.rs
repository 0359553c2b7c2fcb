//! Application core: event loop, action dispatch, overlays.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use roster_core::{
    CoreError, DeleteConfirmation, DraftField, Operation, RemoteCollection, Roster, RosterEvent,
};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screens::roster::{Pane, RosterScreen};
use crate::theme;
use crate::tui::Tui;

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);
const ERROR_NOTIFICATION_TTL: Duration = Duration::from_secs(6);

/// Top-level application state and event loop.
pub struct App<R: RemoteCollection> {
    roster: Roster<R>,
    screen: RosterScreen,
    running: bool,
    help_visible: bool,
    /// Mirrors the roster's in-flight slot for the status bar.
    in_flight: Option<Operation>,
    throbber_state: ThrobberState,
    /// Delete awaiting y/n. Captures all input while set.
    pending_delete: Option<DeleteConfirmation>,
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    data_cancel: CancellationToken,
}

impl<R: RemoteCollection> App<R> {
    pub fn new(roster: Roster<R>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            roster,
            screen: RosterScreen::new(),
            running: true,
            help_visible: false,
            in_flight: None,
            throbber_state: ThrobberState::default(),
            pending_delete: None,
            notification: None,
            action_tx,
            action_rx,
            data_cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        let (width, height) = tui.size()?;
        debug!(width, height, "terminal ready");

        let bridge_roster = self.roster.clone();
        let bridge_tx = self.action_tx.clone();
        let bridge_cancel = self.data_cancel.clone();
        tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(bridge_roster, bridge_tx, bridge_cancel).await;
        });

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key to an action. Overlays capture input first; global keys
    /// only apply while the screen is not taking text.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_delete.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmDelete),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::DeclineDelete),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        if !self.screen.captures_text() {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
                _ => {}
            }
        }

        self.screen.handle_key_event(key)
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(w, h) => {
                debug!(width = w, height = h, "terminal resized");
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Render => {}

            Action::Tick => {
                if let Some((notification, created)) = &self.notification {
                    let ttl = if notification.level == NotificationLevel::Error {
                        ERROR_NOTIFICATION_TTL
                    } else {
                        NOTIFICATION_TTL
                    };
                    if created.elapsed() > ttl {
                        self.notification = None;
                    }
                }
                if self.in_flight.is_some() {
                    self.throbber_state.calc_next();
                }
                self.forward(action)?;
            }

            Action::InFlightChanged(op) => {
                self.in_flight = *op;
            }

            Action::PendingDeleteChanged(pending) => {
                self.pending_delete.clone_from(pending);
            }

            Action::Roster(event) => {
                if let Some(notification) = notification_for(event) {
                    self.notification = Some((notification, Instant::now()));
                }
                self.forward(action)?;
            }

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            // ── Roster intents ───────────────────────────────────────
            Action::Refresh => {
                let roster = self.roster.clone();
                self.spawn_op(async move {
                    let count = roster.refresh().await?;
                    Ok(Some(Notification::info(format!(
                        "Refreshed {}",
                        students_label(count)
                    ))))
                });
            }

            // Bridge snapshots may be queued behind newer edits.
            Action::SessionChanged(_) => self.echo_session()?,

            Action::StartCreate => {
                let result = self.roster.start_create();
                self.report(result);
                self.echo_session()?;
            }

            Action::StartEdit(id) => {
                let result = self.roster.start_edit(id);
                self.report(result);
                self.echo_session()?;
            }

            Action::InsertChar { field, ch } => {
                self.edit_field(*field, |value| {
                    value.push(*ch);
                    true
                })?;
            }

            Action::DeleteChar { field } => {
                self.edit_field(*field, |value| value.pop().is_some())?;
            }

            Action::Submit => {
                let roster = self.roster.clone();
                self.spawn_op(async move {
                    roster.submit().await?;
                    Ok(None)
                });
            }

            Action::RequestDelete(id) => match self.roster.request_delete(id) {
                Ok(confirmation) => self.pending_delete = Some(confirmation),
                Err(e) => self.report::<()>(Err(e)),
            },

            Action::ConfirmDelete => {
                self.pending_delete = None;
                let roster = self.roster.clone();
                self.spawn_op(async move {
                    roster.confirm_delete().await?;
                    Ok(None)
                });
            }

            Action::DeclineDelete => {
                self.pending_delete = None;
                self.roster.decline_delete();
            }

            other => self.forward(other)?,
        }

        Ok(())
    }

    fn forward(&mut self, action: &Action) -> Result<()> {
        if let Some(follow_up) = self.screen.update(action)? {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    /// Apply a keystroke to the controller's current draft. `edit` returns
    /// whether it changed the value.
    fn edit_field(
        &mut self,
        field: DraftField,
        edit: impl FnOnce(&mut String) -> bool,
    ) -> Result<()> {
        let mut value = self.roster.session().draft().get(field).to_owned();
        if edit(&mut value) {
            let result = self.roster.update_field(field, value);
            self.report(result);
        }
        self.echo_session()
    }

    /// Hand the screen the live session.
    fn echo_session(&mut self) -> Result<()> {
        let session = self.roster.session();
        self.forward(&Action::SessionChanged(session))
    }

    /// Surface a rejected synchronous call as a warning toast.
    fn report<T>(&mut self, result: Result<T, CoreError>) {
        if let Err(e) = result {
            debug!(error = %e, "action rejected");
            self.notification = Some((Notification::warning(e.to_string()), Instant::now()));
        }
    }

    /// Run a roster call off the UI loop. Runtime failures already arrive
    /// as `RosterEvent::Failed`; only rejections are reported here.
    fn spawn_op<F>(&self, op: F)
    where
        F: Future<Output = Result<Option<Notification>, CoreError>> + Send + 'static,
    {
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match op.await {
                Ok(Some(notification)) => {
                    let _ = tx.send(Action::Notify(notification));
                }
                Ok(None) => {}
                Err(e) if e.is_contract_error() => {
                    let _ = tx.send(Action::Notify(Notification::warning(e.to_string())));
                }
                Err(e) => {
                    debug!(error = %e, "operation failed");
                }
            }
        });
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        self.screen.render(frame, layout[0]);
        self.render_status_bar(frame, layout[1]);

        if let Some(ref confirm) = self.pending_delete {
            render_confirm_dialog(frame, area, confirm);
        }

        if self.help_visible {
            render_help_overlay(frame, area);
        }

        if let Some((ref notification, _)) = self.notification {
            render_notification(frame, area, notification);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::horizontal([Constraint::Length(26), Constraint::Min(0)]).split(area);

        if let Some(op) = self.in_flight {
            let throbber = Throbber::default()
                .label(format!("{}...", op.progress_label()))
                .style(Style::default().fg(theme::ELECTRIC_YELLOW))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, layout[0], &mut self.throbber_state.clone());
        } else {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::raw(" "),
                    Span::styled("● ready", Style::default().fg(theme::SUCCESS_GREEN)),
                ])),
                layout[0],
            );
        }

        let mode = match self.screen.pane() {
            Pane::List => "list",
            Pane::Form => "form",
        };
        let hints = Line::from(vec![
            Span::styled("│ ", theme::key_hint()),
            Span::styled(mode, theme::field_label()),
            Span::styled("  ", theme::key_hint()),
            Span::styled("? ", theme::key_hint_key()),
            Span::styled("help  ", theme::key_hint()),
            Span::styled("q ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }
}

/// Toast for a roster event, if it deserves one.
fn notification_for(event: &RosterEvent) -> Option<Notification> {
    match event {
        RosterEvent::Loaded { count } => Some(Notification::info(format!(
            "Loaded {}",
            students_label(*count)
        ))),
        RosterEvent::Created { record } => {
            Some(Notification::success(format!("Added {}", record.name)))
        }
        RosterEvent::Updated { id } => Some(Notification::success(format!("Saved student #{id}"))),
        RosterEvent::Deleted { id } => {
            Some(Notification::success(format!("Deleted student #{id}")))
        }
        RosterEvent::DeleteDeclined { .. } => Some(Notification::info("Delete cancelled")),
        RosterEvent::Failed { operation, message } => {
            warn!(%operation, %message, "roster operation failed");
            Some(Notification::error(format!("{operation} failed: {message}")))
        }
        RosterEvent::Refreshed { .. } | RosterEvent::DeleteRequested(_) => None,
    }
}

fn students_label(count: usize) -> String {
    if count == 1 {
        "1 student".into()
    } else {
        format!("{count} students")
    }
}

/// A rectangle of at most `width` x `height`, centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &DeleteConfirmation) {
    let dialog_area = centered(area, 56, 5);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Confirm delete ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ELECTRIC_YELLOW))
        .style(Style::default().bg(theme::BG_DARK));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(Span::styled(
            format!("  Delete {} (#{})?", confirm.name, confirm.id),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("delete    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("keep", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(area, 54, 20);
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let section = |title: &'static str| {
        [
            Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(theme::NEON_CYAN),
            )),
            Line::from(Span::styled(
                format!("  {}", "─".repeat(title.chars().count())),
                theme::key_hint(),
            )),
        ]
    };
    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(desc, theme::key_hint()),
        ])
    };

    let mut lines = vec![Line::from("")];
    lines.extend(section("Student list"));
    lines.extend([
        entry("j/k ↑/↓", "Move selection"),
        entry("e Enter", "Edit selected student"),
        entry("n", "New student"),
        entry("d", "Delete selected student"),
        entry("r", "Refresh from server"),
        entry("Tab", "Focus the form"),
    ]);
    lines.push(Line::from(""));
    lines.extend(section("Form"));
    lines.extend([
        entry("Tab ↑/↓", "Next / previous field"),
        entry("Enter", "Add or update"),
        entry("Esc", "Cancel edit, back to list"),
    ]);
    lines.push(Line::from(""));
    lines.push(entry("q  Ctrl+c", "Quit"));
    lines.push(Line::from(Span::styled(
        "                      Esc or ? to close",
        theme::key_hint(),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render a notification toast in the bottom-right corner.
fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 1); // above status bar
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let (border_color, icon) = match notif.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme::BG_DARK));

    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}
