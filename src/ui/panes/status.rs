//! Status bar rendering with keybindings and state indicators

use crate::session::LoadState;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub source_name: &'a str,
    /// `None` until a trace is installed
    pub position: Option<usize>,
    pub total_steps: usize,
    pub load_state: &'a LoadState,
    pub is_playing: bool,
}

/// `" Step 3/16 "`, or `" Step -/- "` before anything is loaded
pub fn step_counter(position: Option<usize>, total_steps: usize) -> String {
    match position {
        Some(pos) => format!(" Step {}/{} ", pos + 1, total_steps),
        None => " Step -/- ".to_string(),
    }
}

fn badge(text: &'static str, bg: Color) -> Span<'static> {
    Span::styled(
        text,
        Style::default()
            .bg(bg)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let is_failed = data.load_state.is_failed();

    let left_spans = vec![
        Span::styled(
            step_counter(data.position, data.total_steps),
            Style::default()
                .bg(if is_failed {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.primary
                })
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", data.source_name),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            "│",
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            format!(" {} ", data.message),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(if is_failed {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.fg
                }),
        ),
    ];

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let mut right_spans = vec![
        Span::styled(" ←/→ ", key_style),
        Span::styled(" step ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ⎵ ", key_style),
        Span::styled(" play ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ↵ / ⌫ ", key_style),
        Span::styled(" end/start ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" r ", key_style),
        Span::styled(" reload ", desc_style),
        Span::styled("│", sep_style),
        Span::styled("q", key_style),
        Span::styled(" quit ", desc_style),
    ];

    let is_at_start = data.position == Some(0);
    let is_at_end = data
        .position
        .is_some_and(|pos| pos + 1 >= data.total_steps);

    let indicator = match data.load_state {
        LoadState::Pending => Some(badge(" ⟳ LOADING ", DEFAULT_THEME.primary)),
        LoadState::Failed { .. } => Some(badge(" ERROR ", DEFAULT_THEME.error)),
        LoadState::Idle | LoadState::Ready if data.is_playing => {
            Some(badge(" ▶ PLAYING ", DEFAULT_THEME.secondary))
        }
        LoadState::Idle | LoadState::Ready if is_at_end => {
            Some(badge(" END ", DEFAULT_THEME.error))
        }
        LoadState::Idle | LoadState::Ready if is_at_start => {
            Some(badge(" START ", DEFAULT_THEME.success))
        }
        LoadState::Idle | LoadState::Ready => None,
    };
    if let Some(indicator) = indicator {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(indicator);
    }

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_counter_is_one_based() {
        assert_eq!(step_counter(Some(0), 16), " Step 1/16 ");
        assert_eq!(step_counter(Some(15), 16), " Step 16/16 ");
        assert_eq!(step_counter(None, 0), " Step -/- ");
    }
}
