//! Call stack pane rendering
//!
//! One block per simulated call, outermost first. The active call is marked
//! and drawn on the highlighted background; the calls waiting on it keep
//! their names lit, while calls that already returned are muted. Each block shows the interval
//! under examination, the bound it was handed, and its decision and return
//! value once they exist.

use super::ScrollState;
use crate::model::Interval;
use crate::simulator::{CallId, Decision, FrameStatus};
use crate::trace::FrameSnapshot;
use crate::ui::theme::{border_style, interval_color, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

pub struct StackRenderData<'a> {
    pub frames: &'a [FrameSnapshot],
    pub active_call: Option<CallId>,
    /// Root down to the active call
    pub caller_chain: &'a [CallId],
}

/// How a frame relates to the active call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameRole {
    Active,
    /// Suspended somewhere above the active call
    Caller,
    /// Off the active chain (already returned)
    Done,
}

fn status_style(status: FrameStatus) -> Style {
    match status {
        FrameStatus::Examining => Style::default().fg(DEFAULT_THEME.secondary),
        FrameStatus::Decided => Style::default().fg(DEFAULT_THEME.primary),
        FrameStatus::Returning => Style::default().fg(DEFAULT_THEME.return_value),
    }
}

fn decision_span(decision: Option<Decision>) -> Span<'static> {
    match decision {
        None => Span::styled("pending", Style::default().fg(DEFAULT_THEME.comment)),
        Some(Decision::Keep) => Span::styled(
            Decision::Keep.label(),
            Style::default()
                .fg(DEFAULT_THEME.success)
                .add_modifier(Modifier::BOLD),
        ),
        Some(Decision::Covered) => Span::styled(
            Decision::Covered.label(),
            Style::default()
                .fg(DEFAULT_THEME.error)
                .add_modifier(Modifier::BOLD),
        ),
    }
}

/// `[(1, 4), (6, 8)]`
pub fn format_intervals(intervals: &[Interval]) -> String {
    let parts: Vec<String> = intervals.iter().map(Interval::to_string).collect();
    format!("[{}]", parts.join(", "))
}

fn frame_lines(snapshot: &FrameSnapshot, role: FrameRole) -> Vec<Line<'static>> {
    let is_active = role == FrameRole::Active;
    let indent = "  ".repeat(snapshot.depth);
    let label = Style::default().fg(DEFAULT_THEME.comment);
    let value = Style::default().fg(DEFAULT_THEME.fg);

    let marker = if is_active {
        Span::styled(
            format!("{indent}▶ "),
            Style::default()
                .fg(DEFAULT_THEME.secondary)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(format!("{indent}▸ "), label)
    };

    let name_style = match role {
        FrameRole::Active => Style::default()
            .fg(DEFAULT_THEME.function)
            .add_modifier(Modifier::BOLD),
        FrameRole::Caller => Style::default().fg(DEFAULT_THEME.function),
        FrameRole::Done => Style::default().fg(DEFAULT_THEME.muted_function),
    };

    let mut header = vec![
        marker,
        Span::styled(format!("Call {} ", snapshot.call_id), name_style),
        Span::styled(format!("│ depth {} │ ", snapshot.depth), label),
        Span::styled(snapshot.status.label(), status_style(snapshot.status)),
    ];
    if snapshot.is_root() {
        header.push(Span::styled(" (root)", label));
    }
    let mut lines = vec![Line::from(header)];

    lines.push(Line::from(vec![
        Span::styled(format!("{indent}    interval  "), label),
        Span::styled(
            snapshot.current.to_string(),
            Style::default().fg(interval_color(snapshot.current.color)),
        ),
        Span::styled(format!("  ({} left)", snapshot.remaining_count), label),
    ]));
    lines.push(Line::from(vec![
        Span::styled(format!("{indent}    max_end   "), label),
        Span::styled(snapshot.max_end.to_string(), Style::default().fg(DEFAULT_THEME.bound)),
    ]));
    lines.push(Line::from(vec![
        Span::styled(format!("{indent}    decision  "), label),
        decision_span(snapshot.decision),
    ]));

    if let Some(returned) = &snapshot.return_value {
        lines.push(Line::from(vec![
            Span::styled(format!("{indent}    ↩ "), label),
            Span::styled(
                format_intervals(returned),
                Style::default().fg(DEFAULT_THEME.return_value),
            ),
        ]));
    } else if let Some(parent) = snapshot.parent {
        lines.push(Line::from(vec![
            Span::styled(format!("{indent}    ↪ called by "), label),
            Span::styled(parent.to_string(), value),
        ]));
    }

    lines
}

pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    data: StackRenderData,
    is_focused: bool,
    scroll_state: &mut ScrollState,
) {
    let block = Block::default()
        .title(" Call Stack ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let mut all_items = Vec::new();

    if data.frames.is_empty() {
        all_items.push(ListItem::new("(empty)").style(Style::default().fg(DEFAULT_THEME.comment)));
    } else {
        for (i, snapshot) in data.frames.iter().enumerate() {
            let role = if data.active_call == Some(snapshot.call_id) {
                FrameRole::Active
            } else if data.caller_chain.contains(&snapshot.call_id) {
                FrameRole::Caller
            } else {
                FrameRole::Done
            };
            for line in frame_lines(snapshot, role) {
                let item = ListItem::new(line);
                all_items.push(if role == FrameRole::Active {
                    item.style(Style::default().bg(DEFAULT_THEME.current_line_bg))
                } else {
                    item
                });
            }
            if i + 1 < data.frames.len() {
                all_items.push(ListItem::new(""));
            }
        }
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let visible_items = scroll_state.window(all_items, visible_height);
    frame.render_widget(List::new(visible_items).block(block), area);
}
