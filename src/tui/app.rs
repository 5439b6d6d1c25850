//! Main TUI application state and logic

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame, Terminal,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

use super::events::AppEvent;
use super::screens::bookings::BookingsAction;
use super::screens::*;
use super::ui::{centered_rect, Styles};
use crate::config::Config;
use crate::export::{self, ExportFormat};
use crate::feedback::{FeedbackRequest, FeedbackSubmitter, SimulatedSubmitter, SubmissionOutcome};
use crate::models::ProfileState;
use crate::storage::KeyValueStore;
use crate::{mock, profile};

/// Application screens
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Profile,
    Support,
    Bookings,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Profile, Screen::Support, Screen::Bookings];

    pub fn title(&self) -> &str {
        match self {
            Screen::Profile => "My Profile",
            Screen::Support => "Support",
            Screen::Bookings => "Previous Bookings",
        }
    }

    fn index(&self) -> usize {
        Screen::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

/// Main TUI application state
pub struct App {
    pub current_screen: Screen,
    pub config: Config,

    pub profile: ProfileScreen,
    pub support: SupportScreen,
    pub bookings: BookingsScreen,

    submitter: Arc<dyn FeedbackSubmitter>,
    events_tx: UnboundedSender<AppEvent>,
    pub events_rx: UnboundedReceiver<AppEvent>,

    pub should_quit: bool,
    pub show_help_popup: bool,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    /// Create the application, reading the profile once and generating the bookings.
    pub async fn new(config: Config) -> Result<Self> {
        let submitter = Arc::new(SimulatedSubmitter::new(config.feedback_latency()));
        let mut app = Self::with_submitter(config, submitter);
        app.load_profile().await;
        Ok(app)
    }

    pub fn with_submitter(config: Config, submitter: Arc<dyn FeedbackSubmitter>) -> Self {
        let bookings = mock::generate_with_seed(
            config.mock.booking_count,
            Local::now().date_naive(),
            config.mock.seed,
        );
        let (events_tx, events_rx) = unbounded_channel();

        Self {
            current_screen: Screen::Bookings,
            bookings: BookingsScreen::new(bookings, config.page_size),
            profile: ProfileScreen::new(ProfileState::Missing),
            support: SupportScreen::new(),
            config,
            submitter,
            events_tx,
            events_rx,
            should_quit: false,
            show_help_popup: false,
            status_message: None,
            error_message: None,
        }
    }

    async fn load_profile(&mut self) {
        let state = match KeyValueStore::open(self.config.store_path_str()).await {
            Ok(store) => {
                let state = profile::load_profile(&store).await;
                store.close().await;
                state
            }
            Err(e) => Err(e),
        };

        match state {
            Ok(state) => self.profile.state = state,
            Err(e) => {
                error!("Failed to read profile: {}", e);
                self.set_error(format!("Profile unavailable: {}", e));
            }
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            while let Ok(app_event) = self.events_rx.try_recv() {
                self.handle_app_event(app_event);
            }

            // Poll so timer events are picked up without a key press
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let typing = self.current_screen == Screen::Bookings && self.bookings.captures_input();

        // Global shortcuts
        match key.code {
            KeyCode::F(1) => {
                self.show_help_popup = !self.show_help_popup;
                return;
            }
            KeyCode::Esc if self.show_help_popup => {
                self.show_help_popup = false;
                return;
            }
            KeyCode::Char('?') if !typing => {
                self.show_help_popup = !self.show_help_popup;
                return;
            }
            KeyCode::Char('q') if !typing => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab if !typing => {
                self.navigate_to_screen(Screen::ALL[(self.current_screen.index() + 1) % Screen::ALL.len()]);
                return;
            }
            KeyCode::BackTab if !typing => {
                let count = Screen::ALL.len();
                self.navigate_to_screen(Screen::ALL[(self.current_screen.index() + count - 1) % count]);
                return;
            }
            KeyCode::Char(c @ '1'..='3') if !typing => {
                let index = c as usize - '1' as usize;
                self.navigate_to_screen(Screen::ALL[index]);
                return;
            }
            _ => {}
        }

        if self.show_help_popup || self.current_screen != Screen::Bookings {
            return;
        }

        match self.bookings.handle_key(key) {
            BookingsAction::None => {}
            BookingsAction::Submit(request) => self.spawn_submission(request),
            BookingsAction::Export(format) => self.export(format),
            BookingsAction::Status(msg) => self.set_status(msg),
            BookingsAction::Error(msg) => self.set_error(msg),
        }
    }

    /// Start the simulated round trip; the result comes back as an [`AppEvent`].
    fn spawn_submission(&mut self, request: FeedbackRequest) {
        let submitter = Arc::clone(&self.submitter);
        let tx = self.events_tx.clone();
        self.set_status(format!("Submitting feedback for {}", request.booking_id));

        tokio::spawn(async move {
            let outcome = submitter.submit(&request).await;
            let _ = tx.send(AppEvent::FeedbackResolved { request, outcome });
        });
    }

    pub fn handle_app_event(&mut self, app_event: AppEvent) {
        match app_event {
            AppEvent::FeedbackResolved { request, outcome } => {
                let screen = &mut self.bookings;
                screen.modal.complete(&request, &outcome, &mut screen.bookings);

                match outcome {
                    SubmissionOutcome::Accepted => {
                        self.set_status(format!("Feedback recorded for {}", request.booking_id));

                        let tx = self.events_tx.clone();
                        let delay = self.config.feedback_dismiss_delay();
                        let booking_id = request.booking_id;
                        tokio::spawn(async move {
                            tokio::time::sleep(delay).await;
                            let _ = tx.send(AppEvent::FeedbackDismiss { booking_id });
                        });
                    }
                    SubmissionOutcome::Rejected(reason) => self.set_error(reason),
                }
            }
            AppEvent::FeedbackDismiss { booking_id } => {
                if self.bookings.modal.dismiss_if_current(&booking_id) {
                    info!("Closed feedback modal for {}", booking_id);
                }
            }
        }
    }

    fn export(&mut self, format: ExportFormat) {
        match export::write_export(format, &self.bookings.bookings, &self.config.export_dir) {
            Ok(path) => self.set_status(format!("Saved {}", path.display())),
            Err(e) => {
                error!("{} export failed: {}", format.as_str(), e);
                self.set_error(format!("Export failed: {}", e));
            }
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        let titles: Vec<Line> = Screen::ALL.iter().map(|s| Line::from(s.title().to_string())).collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("Parcel Desk"))
            .select(self.current_screen.index())
            .style(Styles::info())
            .highlight_style(Styles::selected());
        f.render_widget(tabs, chunks[0]);

        match self.current_screen {
            Screen::Profile => self.profile.draw(f, chunks[1]),
            Screen::Support => self.support.draw(f, chunks[1]),
            Screen::Bookings => self.bookings.draw(f, chunks[1]),
        }

        self.draw_status_bar(f, chunks[2]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    /// Draw status bar with current screen info and shortcuts
    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if let Some(ref msg) = self.status_message {
            format!("Status: {}", msg)
        } else if let Some(ref err) = self.error_message {
            format!("Error: {}", err)
        } else {
            format!(
                "Parcel Desk - {} | Tab: Switch view | Q: Quit | F1/?: Help",
                self.current_screen.title()
            )
        };

        let style = if self.error_message.is_some() {
            Style::default().fg(Color::Red)
        } else if self.status_message.is_some() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };

        let status_bar = Paragraph::new(status_text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(status_bar, area);
    }

    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(70, 70, area);
        f.render_widget(Clear, popup_area);

        let help_popup = Paragraph::new(self.get_context_help())
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        f.render_widget(help_popup, popup_area);
    }

    fn get_context_help(&self) -> String {
        let global_help = "Global Shortcuts:\n\
            Tab / Shift+Tab - Switch view\n\
            1 / 2 / 3 - Profile / Support / Bookings\n\
            Q - Quit application\n\
            F1 / ? - Toggle this help\n\n";

        let screen_help = match self.current_screen {
            Screen::Profile => "My Profile:\n\
                Shows the user record saved with `parceldesk profile --set`",
            Screen::Support => "Support:\n\
                Contact details of the support desk",
            Screen::Bookings => {
                "Previous Bookings:\n\
                ↑/↓ - Select booking\n\
                ←/→ - Previous/next page\n\
                / - Filter by booking id\n\
                d - Filter by date (Enter to apply)\n\
                s - Cycle status filter\n\
                c - Clear filters\n\
                Enter - Rate selected booking\n\
                x / p / v - Export Excel / PDF / CSV\n\n\
                Feedback:\n\
                ←/→ - Stars | Type - Suggestion | Enter - Submit | Esc - Close"
            }
        };

        format!("{}{}", global_help, screen_help)
    }

    pub fn navigate_to_screen(&mut self, screen: Screen) {
        self.current_screen = screen;
        self.clear_messages();
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.error_message = None;
    }

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.status_message = None;
    }

    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }
}
