// Step detail pane: what the current step did

use super::stack::format_intervals;
use crate::model::Interval;
use crate::simulator::Decision;
use crate::trace::{IntervalState, IntervalView, Step, StepKind};
use crate::ui::theme::{border_style, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn field(name: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{name:<16}"),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
        Span::styled(value, Style::default().fg(DEFAULT_THEME.fg)),
    ])
}

/// First interval already kept at this step that contains `interval`
pub fn covering_interval(views: &[IntervalView], interval: &Interval) -> Option<Interval> {
    views
        .iter()
        .filter(|v| v.state == IntervalState::Kept && v.interval.id != interval.id)
        .map(|v| v.interval)
        .find(|kept| kept.contains(interval))
}

/// Kind-specific detail rows. `views` is the step's interval display state.
pub fn detail_lines(kind: &StepKind, views: &[IntervalView]) -> Vec<Line<'static>> {
    match kind {
        StepKind::InitialState { count } => vec![field("intervals", count.to_string())],
        StepKind::SortBegin => vec![field("order", "start ↑, end ↓".to_string())],
        StepKind::SortComplete => Vec::new(),
        StepKind::Examine {
            call_id,
            depth,
            interval,
        } => vec![
            field("call", call_id.to_string()),
            field("depth", depth.to_string()),
            field("interval", interval.to_string()),
        ],
        StepKind::Decide {
            call_id,
            interval,
            decision,
            max_end_before,
            max_end_after,
        } => {
            let mut lines = vec![
                field("call", call_id.to_string()),
                field("interval", interval.to_string()),
                field("decision", decision.label().to_string()),
                field("max_end", format!("{max_end_before} → {max_end_after}")),
            ];
            if *decision == Decision::Covered {
                if let Some(kept) = covering_interval(views, interval) {
                    lines.push(field("covered by", format!("#{} {}", kept.id, kept)));
                }
            }
            lines
        }
        StepKind::Return {
            call_id,
            depth,
            value,
        } => vec![
            field("call", call_id.to_string()),
            field("depth", depth.to_string()),
            field("returns", format_intervals(value)),
        ],
        StepKind::AlgorithmComplete {
            result,
            kept_count,
            removed_count,
        } => vec![
            field("result", format_intervals(result)),
            field("kept", kept_count.to_string()),
            field("removed", removed_count.to_string()),
        ],
    }
}

pub fn render_step_pane(frame: &mut Frame, area: Rect, step: &Step, is_focused: bool) {
    let block = Block::default()
        .title(format!(" Step {} ", step.index))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let mut lines = vec![
        Line::from(Span::styled(
            step.kind.tag(),
            Style::default()
                .fg(DEFAULT_THEME.secondary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            step.description.clone(),
            Style::default().fg(DEFAULT_THEME.fg),
        )),
        Line::from(""),
    ];
    lines.extend(detail_lines(&step.kind, &step.data.all_intervals));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
