use crate::error::EngineError;
use crate::interactive::constants::{ERROR_POPUP_MARGIN, ERROR_POPUP_MAX_WIDTH};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

fn title_for(error: &EngineError) -> &'static str {
    match error {
        EngineError::Configuration(_) => " Configuration Error ",
        EngineError::Gateway { .. } => " Request Failed ",
        EngineError::Internal(_) => " Internal Error ",
    }
}

/// Centered popup rendering `error` verbatim over whatever is below.
pub fn render(f: &mut Frame, area: Rect, error: &EngineError) {
    let message = error.to_string();
    let width = ERROR_POPUP_MAX_WIDTH.min(area.width.saturating_sub(ERROR_POPUP_MARGIN));
    let inner_width = width.saturating_sub(2).max(1) as usize;
    let text_lines = message.chars().count().div_ceil(inner_width).max(1) as u16;
    // borders, blank line and hint line
    let height = (text_lines + 4).min(area.height.saturating_sub(ERROR_POPUP_MARGIN));

    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );

    let body = vec![
        Line::from(message),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Enter/Esc: dismiss   q: quit",
            Style::default().fg(Color::DarkGray),
        )]),
    ];

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(title_for(error))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            ),
        popup,
    );
}
