//! Booking table component for the previous-bookings screen

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::{listing::PageView, models::Booking, tui::ui::Styles};

/// Configuration for booking table display
#[derive(Debug, Clone)]
pub struct BookingTableConfig {
    pub title: String,
    pub show_header: bool,
    pub max_receiver_len: usize,
    pub max_address_len: usize,
}

impl Default for BookingTableConfig {
    fn default() -> Self {
        Self {
            title: "Previous Bookings".to_string(),
            show_header: true,
            max_receiver_len: 14,
            max_address_len: 24,
        }
    }
}

/// Selectable rows of the current page. Selection is an index into the page.
pub struct BookingTable {
    pub state: ListState,
    pub config: BookingTableConfig,
}

impl BookingTable {
    pub fn new(config: BookingTableConfig) -> Self {
        let mut state = ListState::default();
        state.select(Some(0));
        Self { state, config }
    }

    /// Put the selection back on the first row of a fresh page.
    pub fn reset_selection(&mut self, page_len: usize) {
        self.state.select(if page_len == 0 { None } else { Some(0) });
    }

    pub fn selected_booking<'a>(&self, page: &PageView<'a>) -> Option<&'a Booking> {
        self.state.selected().and_then(|i| page.items.get(i).copied())
    }

    pub fn navigate_up(&mut self, page_len: usize) {
        if page_len == 0 {
            return;
        }
        let selected = self.state.selected().unwrap_or(0);
        let new_selected = if selected == 0 { page_len - 1 } else { selected - 1 };
        self.state.select(Some(new_selected));
    }

    pub fn navigate_down(&mut self, page_len: usize) {
        if page_len == 0 {
            return;
        }
        let selected = self.state.selected().unwrap_or(0);
        self.state.select(Some((selected + 1) % page_len));
    }

    fn pad(text: &str, width: usize) -> String {
        format!("{:<width$}", text.chars().take(width).collect::<String>(), width = width)
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, page: &PageView<'_>) {
        let mut items = Vec::new();

        if self.config.show_header {
            let header = format!(
                "{:<9} | {:<10} | {:<10} | {} | {} | {:>6} | {:<10} | Feedback",
                "Customer",
                "Booking",
                "Date",
                Self::pad("Receiver", self.config.max_receiver_len),
                Self::pad("Address", self.config.max_address_len),
                "Amount",
                "Status",
            );
            items.push(ListItem::new(Line::from(Span::styled(header, Styles::title()))));
        }

        // Header row shifts the list offset by one
        let offset = usize::from(self.config.show_header);
        for (i, booking) in page.items.iter().enumerate() {
            let style = if self.state.selected() == Some(i) {
                Styles::selected()
            } else {
                Style::default()
            };
            let feedback = if booking.has_feedback() { "rated" } else { "-" };
            let row = format!(
                "{:<9} | {:<10} | {:<10} | {} | {} | {:>6} | {:<10} | {}",
                booking.customer_id,
                booking.booking_id,
                booking.booking_date.format("%Y-%m-%d").to_string(),
                Self::pad(&booking.receiver_name, self.config.max_receiver_len),
                Self::pad(&booking.delivered_address, self.config.max_address_len),
                booking.amount,
                booking.status.as_str(),
                feedback,
            );
            items.push(ListItem::new(Line::from(Span::styled(row, style))));
        }

        let title = if page.match_count == 0 {
            format!("{} (No bookings found)", self.config.title)
        } else {
            format!(
                "{} ({}/{} - Page {}/{})",
                self.config.title,
                page.items.len(),
                page.match_count,
                page.current_page,
                page.total_pages
            )
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Styles::active_border());

        // Highlighting is done per row above; the widget state only drives scrolling
        let mut render_state = ListState::default();
        render_state.select(self.state.selected().map(|i| i + offset));
        f.render_stateful_widget(List::new(items).block(block), area, &mut render_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_wraps_within_page() {
        let mut table = BookingTable::new(BookingTableConfig::default());
        table.navigate_up(4);
        assert_eq!(table.state.selected(), Some(3));
        table.navigate_down(4);
        assert_eq!(table.state.selected(), Some(0));

        table.reset_selection(0);
        assert_eq!(table.state.selected(), None);
        table.navigate_down(0);
        assert_eq!(table.state.selected(), None);
    }
}
