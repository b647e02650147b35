// Placeholder shown in place of the panes while no trace is installed

use crate::session::LoadState;
use crate::ui::theme::{border_style, DEFAULT_THEME};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// What the user can do about a failed fetch
pub fn failure_hint(retryable: bool) -> &'static str {
    if retryable {
        "Press r to retry or q to quit."
    } else {
        "Retrying will not help; fix the request or press q to quit."
    }
}

pub fn notice_lines(state: &LoadState, source_name: &str) -> Vec<Line<'static>> {
    match state {
        LoadState::Idle => vec![Line::from(Span::styled(
            "No trace loaded. Press r to fetch one.",
            Style::default().fg(DEFAULT_THEME.comment),
        ))],
        LoadState::Pending | LoadState::Ready => vec![Line::from(Span::styled(
            format!("Loading trace from {source_name}..."),
            Style::default().fg(DEFAULT_THEME.primary),
        ))],
        LoadState::Failed { message, retryable } => vec![
            Line::from(Span::styled(
                "Could not load trace",
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                message.clone(),
                Style::default().fg(DEFAULT_THEME.fg),
            )),
            Line::from(""),
            Line::from(Span::styled(
                failure_hint(*retryable),
                Style::default().fg(DEFAULT_THEME.comment),
            )),
        ],
    }
}

pub fn render_notice_pane(frame: &mut Frame, area: Rect, state: &LoadState, source_name: &str) {
    let block = Block::default()
        .title(" intervis ")
        .borders(Borders::ALL)
        .border_style(border_style(state.is_failed()));

    let inner_height = area.height.saturating_sub(2) as usize;
    let lines = notice_lines(state, source_name);
    let mut padded = vec![Line::from(""); inner_height.saturating_sub(lines.len()) / 2];
    padded.extend(lines);

    let paragraph = Paragraph::new(padded)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(state: &LoadState) -> Vec<String> {
        notice_lines(state, "remote")
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_failure_shows_message_and_retry_hint() {
        let text = text_of(&LoadState::Failed {
            message: "connection refused".to_string(),
            retryable: true,
        });
        assert!(text.contains(&"connection refused".to_string()));
        assert!(text.contains(&"Press r to retry or q to quit.".to_string()));
    }

    #[test]
    fn test_rejected_request_does_not_suggest_retry() {
        let text = text_of(&LoadState::Failed {
            message: "Request rejected: Invalid input format".to_string(),
            retryable: false,
        });
        assert!(!text.iter().any(|t| t.contains("Press r")));
        assert!(text.iter().any(|t| t.contains("Retrying will not help")));
    }
}
