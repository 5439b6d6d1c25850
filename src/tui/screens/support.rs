//! Support contact screen

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{models::SupportContact, profile::support_contact, tui::ui::Styles};

pub struct SupportScreen {
    pub contact: SupportContact,
}

impl SupportScreen {
    pub fn new() -> Self {
        Self {
            contact: support_contact(),
        }
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let row = |label: &str, value: &str| {
            Line::from(vec![
                Span::styled(format!("{:<15}", label), Styles::title()),
                Span::raw(value.to_string()),
            ])
        };

        let lines = vec![
            Line::from(Span::styled("Need help with a parcel? Reach us at:", Styles::info())),
            Line::from(""),
            row("Email", self.contact.company_email),
            row("Phone", self.contact.support_phone),
            row("Working days", self.contact.working_days),
            row("Working hours", self.contact.working_hours),
        ];

        let widget = Paragraph::new(lines).block(
            Block::default()
                .title("Support")
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );
        f.render_widget(widget, area);
    }
}

impl Default for SupportScreen {
    fn default() -> Self {
        Self::new()
    }
}
