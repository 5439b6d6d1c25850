//! My-profile screen

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{
    models::ProfileState,
    profile::profile_rows,
    tui::ui::Styles,
};

pub struct ProfileScreen {
    pub state: ProfileState,
}

impl ProfileScreen {
    pub fn new(state: ProfileState) -> Self {
        Self { state }
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let rows = profile_rows(&self.state.profile());

        let mut lines: Vec<Line> = rows
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{:<12}", label), Styles::title()),
                    Span::raw(value),
                ])
            })
            .collect();

        if lines.is_empty() {
            lines.push(Line::from(Span::styled("No profile data available", Styles::inactive())));
        }
        if self.state == ProfileState::Malformed {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Stored user data could not be read",
                Styles::error(),
            )));
        }

        let widget = Paragraph::new(lines).block(
            Block::default()
                .title("My Profile")
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );
        f.render_widget(widget, area);
    }
}
