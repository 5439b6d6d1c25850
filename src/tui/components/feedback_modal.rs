//! Feedback popup drawn over the bookings screen

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    feedback::{FeedbackModal, FeedbackPhase},
    models::Booking,
    tui::ui::{centered_rect, star_bar, Styles},
};

pub fn render_feedback_modal(f: &mut Frame, area: Rect, modal: &FeedbackModal, booking: Option<&Booking>) {
    let popup = centered_rect(60, 50, area);
    f.render_widget(Clear, popup);

    let title = match booking {
        Some(b) => format!("Feedback - {} ({})", b.booking_id, b.receiver_name),
        None => "Feedback".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Styles::active_border());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(inner);

    let rating = Line::from(vec![
        Span::styled("Rating: ", Styles::title()),
        Span::styled(star_bar(modal.rating), Styles::info()),
        Span::raw(format!("  ({}/5)", modal.rating)),
    ]);
    f.render_widget(Paragraph::new(rating), chunks[0]);

    let suggestion = Paragraph::new(modal.suggestion.as_str())
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Suggestion").borders(Borders::ALL));
    f.render_widget(suggestion, chunks[1]);

    let message = if let Some(ref success) = modal.success {
        Paragraph::new(success.as_str()).style(Styles::success())
    } else if let Some(ref error) = modal.error {
        Paragraph::new(error.as_str()).style(Styles::error())
    } else if modal.phase == FeedbackPhase::Submitting {
        Paragraph::new("Submitting...").style(Styles::info())
    } else {
        Paragraph::new("")
    };
    f.render_widget(message, chunks[2]);

    let hint = match modal.phase {
        FeedbackPhase::Open => "←/→: Rating | Type: Suggestion | Enter: Submit | Esc: Close",
        FeedbackPhase::Submitting => "Waiting for confirmation... | Esc: Close",
        _ => "Esc: Close",
    };
    f.render_widget(Paragraph::new(hint).style(Styles::inactive()), chunks[3]);
}
