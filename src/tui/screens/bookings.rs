//! Previous-bookings screen: filters, paged table and the feedback modal

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{
    export::ExportFormat,
    feedback::{FeedbackModal, FeedbackPhase, FeedbackRequest, MAX_RATING},
    listing::{self, ListingAction, ListingState, PageView},
    models::{Booking, BookingStatus},
    tui::{
        components::{render_feedback_modal, BookingTable, BookingTableConfig},
        ui::{InputField, Styles},
    },
};

/// Which part of the screen receives typed input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingsFocus {
    Table,
    BookingIdFilter,
    DateFilter,
}

/// What the app should do after a key was handled here
#[derive(Debug, Clone, PartialEq)]
pub enum BookingsAction {
    None,
    Submit(FeedbackRequest),
    Export(ExportFormat),
    Status(String),
    Error(String),
}

pub struct BookingsScreen {
    pub bookings: Vec<Booking>,
    pub listing: ListingState,
    pub table: BookingTable,
    pub modal: FeedbackModal,
    pub focus: BookingsFocus,
    pub id_input: InputField,
    pub date_input: InputField,
}

impl BookingsScreen {
    pub fn new(bookings: Vec<Booking>, page_size: usize) -> Self {
        let listing = ListingState::for_bookings(page_size, &bookings);
        Self {
            bookings,
            listing,
            table: BookingTable::new(BookingTableConfig::default()),
            modal: FeedbackModal::new(),
            focus: BookingsFocus::Table,
            id_input: InputField::new("Booking ID").with_placeholder("press / to filter"),
            date_input: InputField::new("Date (YYYY-MM-DD)").with_placeholder("press d to filter"),
        }
    }

    /// True while keys are consumed as text rather than shortcuts.
    pub fn captures_input(&self) -> bool {
        self.focus != BookingsFocus::Table || self.modal.is_open()
    }

    pub fn page(&self) -> PageView<'_> {
        listing::view(&self.listing, &self.bookings)
    }

    pub fn selected_booking(&self) -> Option<&Booking> {
        let page = self.page();
        self.table.selected_booking(&page)
    }

    fn dispatch(&mut self, action: ListingAction) {
        let page_before = self.listing.current_page;
        self.listing = listing::reduce(self.listing.clone(), action, &self.bookings);
        let page_len = self.page().items.len();
        if page_before != self.listing.current_page || self.table.state.selected().map_or(true, |i| i >= page_len) {
            self.table.reset_selection(page_len);
        }
    }

    fn set_focus(&mut self, focus: BookingsFocus) {
        self.focus = focus;
        self.id_input.set_focus(focus == BookingsFocus::BookingIdFilter);
        self.date_input.set_focus(focus == BookingsFocus::DateFilter);
    }

    fn cycle_status(&mut self) -> Option<BookingStatus> {
        let next = match self.listing.filter.status {
            None => Some(BookingStatus::ALL[0]),
            Some(current) => BookingStatus::ALL
                .iter()
                .position(|s| *s == current)
                .and_then(|i| BookingStatus::ALL.get(i + 1).copied()),
        };
        self.dispatch(ListingAction::SetStatus(next));
        next
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> BookingsAction {
        if self.modal.is_open() {
            return self.handle_modal_key(key);
        }
        match self.focus {
            BookingsFocus::Table => self.handle_table_key(key),
            BookingsFocus::BookingIdFilter => self.handle_id_filter_key(key),
            BookingsFocus::DateFilter => self.handle_date_filter_key(key),
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> BookingsAction {
        let page_len = self.page().items.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.table.navigate_up(page_len),
            KeyCode::Down | KeyCode::Char('j') => self.table.navigate_down(page_len),
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => self.dispatch(ListingAction::NextPage),
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('b') => self.dispatch(ListingAction::PrevPage),
            KeyCode::Char('/') => self.set_focus(BookingsFocus::BookingIdFilter),
            KeyCode::Char('d') => self.set_focus(BookingsFocus::DateFilter),
            KeyCode::Char('s') => {
                let status = self.cycle_status();
                return BookingsAction::Status(format!(
                    "Status filter: {}",
                    status.map(|s| s.as_str().to_string()).unwrap_or_else(|| "All".to_string())
                ));
            }
            KeyCode::Char('c') => {
                if self.listing.filter.is_empty() && self.id_input.is_empty() && self.date_input.is_empty() {
                    return BookingsAction::Status("No filters to clear".to_string());
                }
                self.id_input.clear();
                self.date_input.clear();
                self.dispatch(ListingAction::ClearFilters);
                return BookingsAction::Status("Filters cleared".to_string());
            }
            KeyCode::Enter | KeyCode::Char('f') => {
                let selected = self.selected_booking().cloned();
                match selected {
                    Some(booking) => self.modal.open(&booking),
                    None => return BookingsAction::Error("No booking selected".to_string()),
                }
            }
            KeyCode::Char('x') => return self.export(ExportFormat::Xlsx),
            KeyCode::Char('p') => return self.export(ExportFormat::Pdf),
            KeyCode::Char('v') => return self.export(ExportFormat::Csv),
            _ => {}
        }
        BookingsAction::None
    }

    fn export(&self, format: ExportFormat) -> BookingsAction {
        if listing::show_download_options(&self.bookings) {
            BookingsAction::Export(format)
        } else {
            BookingsAction::Error("Downloads are offered for more than 10 bookings".to_string())
        }
    }

    fn handle_id_filter_key(&mut self, key: KeyEvent) -> BookingsAction {
        match key.code {
            KeyCode::Char(c) => {
                self.id_input.insert_char(c);
                self.dispatch(ListingAction::SetBookingId(self.id_input.value.clone()));
            }
            KeyCode::Backspace => {
                self.id_input.delete_char();
                self.dispatch(ListingAction::SetBookingId(self.id_input.value.clone()));
            }
            KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => self.set_focus(BookingsFocus::Table),
            _ => {}
        }
        BookingsAction::None
    }

    fn handle_date_filter_key(&mut self, key: KeyEvent) -> BookingsAction {
        match key.code {
            KeyCode::Char(c) => self.date_input.insert_char(c),
            KeyCode::Backspace => self.date_input.delete_char(),
            KeyCode::Esc => {
                // drop unapplied text
                match self.listing.filter.date {
                    Some(date) => self.date_input.set_value(&date.format("%Y-%m-%d").to_string()),
                    None => self.date_input.clear(),
                }
                self.set_focus(BookingsFocus::Table);
            }
            KeyCode::Enter | KeyCode::Tab => {
                let text = self.date_input.value.trim().to_string();
                if text.is_empty() {
                    self.dispatch(ListingAction::SetDate(None));
                } else {
                    match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
                        Ok(date) => self.dispatch(ListingAction::SetDate(Some(date))),
                        Err(_) => return BookingsAction::Error(format!("Invalid date: {}", text)),
                    }
                }
                self.set_focus(BookingsFocus::Table);
            }
            _ => {}
        }
        BookingsAction::None
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> BookingsAction {
        match key.code {
            KeyCode::Esc => self.modal.close(),
            _ if self.modal.phase != FeedbackPhase::Open => {}
            KeyCode::Left => {
                let _ = self.modal.set_rating(self.modal.rating.saturating_sub(1));
            }
            KeyCode::Right => {
                let _ = self.modal.set_rating((self.modal.rating + 1).min(MAX_RATING));
            }
            KeyCode::Char(c) => self.modal.push_suggestion_char(c),
            KeyCode::Backspace => self.modal.pop_suggestion_char(),
            KeyCode::Enter => {
                if let Ok(request) = self.modal.begin_submit(&self.bookings) {
                    return BookingsAction::Submit(request);
                }
            }
            _ => {}
        }
        BookingsAction::None
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let filters = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(30),
                Constraint::Percentage(30),
            ])
            .split(chunks[0]);

        self.id_input.render(f, filters[0]);
        self.date_input.render(f, filters[1]);

        let status_text = self
            .listing
            .filter
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "All".to_string());
        let status = Paragraph::new(Line::from(vec![
            Span::raw(status_text),
            Span::styled("  (s to cycle)", Styles::inactive()),
        ]))
        .block(Block::default().title("Status").borders(Borders::ALL).border_style(Styles::inactive_border()));
        f.render_widget(status, filters[2]);

        let page = listing::view(&self.listing, &self.bookings);
        self.table.render(f, chunks[1], &page);

        let mut hints = "↑/↓: Select | ←/→: Page | Enter: Feedback | /: ID | d: Date | s: Status | c: Clear".to_string();
        if listing::show_download_options(&self.bookings) {
            hints.push_str(" | x: Excel | p: PDF | v: CSV");
        }
        f.render_widget(Paragraph::new(hints).style(Styles::inactive()), chunks[2]);

        if self.modal.is_open() {
            let booking = self
                .modal
                .selected
                .as_deref()
                .and_then(|id| self.bookings.iter().find(|b| b.booking_id == id));
            render_feedback_modal(f, area, &self.modal, booking);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::generate_with_seed;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen() -> BookingsScreen {
        let bookings = generate_with_seed(50, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(), Some(21));
        BookingsScreen::new(bookings, 10)
    }

    fn press(screen: &mut BookingsScreen, code: KeyCode) -> BookingsAction {
        screen.handle_key(KeyEvent::from(code))
    }

    fn type_text(screen: &mut BookingsScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_paging_and_filter_reset() {
        let mut screen = screen();
        press(&mut screen, KeyCode::Right);
        press(&mut screen, KeyCode::Right);
        assert_eq!(screen.listing.current_page, 3);
        assert_eq!(screen.selected_booking().unwrap().booking_id, "BK-2025021");

        press(&mut screen, KeyCode::Char('/'));
        assert!(screen.captures_input());
        type_text(&mut screen, "bk-202500");
        assert_eq!(screen.listing.current_page, 1);
        assert_eq!(screen.page().match_count, 9);
        press(&mut screen, KeyCode::Enter);
        assert!(!screen.captures_input());
    }

    #[test]
    fn test_date_filter_validation() {
        let mut screen = screen();
        let target = screen.bookings[4].booking_date;

        press(&mut screen, KeyCode::Char('d'));
        type_text(&mut screen, "2024-13-45");
        let action = press(&mut screen, KeyCode::Enter);
        assert!(matches!(action, BookingsAction::Error(_)));
        assert_eq!(screen.listing.filter.date, None);

        screen.date_input.clear();
        type_text(&mut screen, &target.format("%Y-%m-%d").to_string());
        press(&mut screen, KeyCode::Enter);
        assert_eq!(screen.listing.filter.date, Some(target));
        assert!(screen.page().items.iter().all(|b| b.booking_date == target));
        assert_eq!(screen.focus, BookingsFocus::Table);
    }

    #[test]
    fn test_escape_discards_unapplied_date() {
        let mut screen = screen();
        let target = screen.bookings[2].booking_date;

        press(&mut screen, KeyCode::Char('d'));
        type_text(&mut screen, "2024-01");
        press(&mut screen, KeyCode::Esc);
        assert_eq!(screen.focus, BookingsFocus::Table);
        assert!(screen.date_input.is_empty());
        assert_eq!(screen.listing.filter.date, None);

        let applied = target.format("%Y-%m-%d").to_string();
        press(&mut screen, KeyCode::Char('d'));
        type_text(&mut screen, &applied);
        press(&mut screen, KeyCode::Enter);
        press(&mut screen, KeyCode::Char('d'));
        press(&mut screen, KeyCode::Backspace);
        type_text(&mut screen, "x");
        press(&mut screen, KeyCode::Esc);
        assert_eq!(screen.date_input.value, applied);
        assert_eq!(screen.listing.filter.date, Some(target));
    }

    #[test]
    fn test_clear_without_filters_reports_nothing_to_clear() {
        let mut screen = screen();
        assert_eq!(
            press(&mut screen, KeyCode::Char('c')),
            BookingsAction::Status("No filters to clear".to_string())
        );

        press(&mut screen, KeyCode::Char('s'));
        assert_eq!(
            press(&mut screen, KeyCode::Char('c')),
            BookingsAction::Status("Filters cleared".to_string())
        );
        assert!(screen.listing.filter.is_empty());
    }

    #[test]
    fn test_status_cycle_returns_to_all() {
        let mut screen = screen();
        for expected in BookingStatus::ALL {
            press(&mut screen, KeyCode::Char('s'));
            assert_eq!(screen.listing.filter.status, Some(expected));
        }
        press(&mut screen, KeyCode::Char('s'));
        assert_eq!(screen.listing.filter.status, None);
    }

    #[test]
    fn test_feedback_modal_flow() {
        let mut screen = screen();
        press(&mut screen, KeyCode::Down);
        press(&mut screen, KeyCode::Enter);
        assert!(screen.modal.is_open());
        assert_eq!(screen.modal.selected.as_deref(), Some("BK-2025002"));

        // no rating yet
        assert_eq!(press(&mut screen, KeyCode::Enter), BookingsAction::None);
        assert_eq!(screen.modal.error.as_deref(), Some("Please select a star rating."));

        press(&mut screen, KeyCode::Right);
        press(&mut screen, KeyCode::Right);
        press(&mut screen, KeyCode::Right);
        type_text(&mut screen, "ok");
        assert_eq!(screen.modal.rating, 3);
        assert_eq!(screen.modal.suggestion, "ok");

        match press(&mut screen, KeyCode::Enter) {
            BookingsAction::Submit(request) => {
                assert_eq!(request.booking_id, "BK-2025002");
                assert_eq!(request.rating, 3);
                assert_eq!(request.feedback_suggestion, "ok");
            }
            other => panic!("expected submit, got {:?}", other),
        }
        assert_eq!(screen.modal.phase, FeedbackPhase::Submitting);

        // keys other than Esc are ignored while in flight
        press(&mut screen, KeyCode::Left);
        assert_eq!(screen.modal.rating, 3);

        press(&mut screen, KeyCode::Esc);
        assert!(!screen.modal.is_open());
    }

    #[test]
    fn test_export_keys() {
        let mut screen = screen();
        assert_eq!(press(&mut screen, KeyCode::Char('x')), BookingsAction::Export(ExportFormat::Xlsx));
        assert_eq!(press(&mut screen, KeyCode::Char('p')), BookingsAction::Export(ExportFormat::Pdf));

        let few = generate_with_seed(10, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(), Some(1));
        let mut small = BookingsScreen::new(few, 10);
        assert!(matches!(press(&mut small, KeyCode::Char('x')), BookingsAction::Error(_)));
    }

    #[test]
    fn test_draw_shows_first_page() {
        let mut screen = screen();
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal.draw(|f| screen.draw(f, f.size())).unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains("BK-2025001"));
        assert!(content.contains("Page 1/5"));
        assert!(!content.contains("BK-2025011"));
    }
}
