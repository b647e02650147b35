//! Interval timeline rendering
//!
//! Draws every input interval as a horizontal bar on a shared axis, in the
//! order the current step presents them (input order before sorting, sorted
//! order after). A vertical marker shows the running `max_end`.

use super::ScrollState;
use crate::model::{Coord, MaxEnd};
use crate::trace::{IntervalState, IntervalView};
use crate::ui::theme::{border_style, interval_style, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Width reserved for the `#id (start, end)` label
const LABEL_WIDTH: usize = 20;

pub struct TimelineRenderData<'a> {
    pub intervals: &'a [IntervalView],
    pub max_end: MaxEnd,
}

/// Coordinate range spanned by the intervals, widened so it is never empty
pub fn axis_bounds(intervals: &[IntervalView]) -> Option<(Coord, Coord)> {
    let lo = intervals
        .iter()
        .map(|v| v.interval.start.min(v.interval.end))
        .min()?;
    let hi = intervals
        .iter()
        .map(|v| v.interval.start.max(v.interval.end))
        .max()?;
    if hi > lo {
        Some((lo, hi))
    } else if lo < Coord::MAX {
        Some((lo, lo + 1))
    } else {
        Some((lo - 1, lo))
    }
}

/// Column of `value` on a `width`-column axis covering `[lo, hi]`.
///
/// Computed in `i128`: `hi - lo` alone can exceed `i64` for the full
/// coordinate range.
pub fn column(value: Coord, lo: Coord, hi: Coord, width: usize) -> usize {
    if width == 0 || hi <= lo {
        return 0;
    }
    let clamped = i128::from(value.clamp(lo, hi));
    let span = i128::from(hi) - i128::from(lo);
    let offset = (clamped - i128::from(lo)) * (width as i128 - 1) / span;
    usize::try_from(offset).map_or(0, |col| col.min(width - 1))
}

fn state_marker(state: IntervalState) -> Span<'static> {
    match state {
        IntervalState::Idle => Span::styled("  ", Style::default()),
        IntervalState::Examining => Span::styled(
            "▶ ",
            Style::default()
                .fg(DEFAULT_THEME.secondary)
                .add_modifier(Modifier::BOLD),
        ),
        IntervalState::Kept => Span::styled("✓ ", Style::default().fg(DEFAULT_THEME.success)),
        IntervalState::Covered => Span::styled("✗ ", Style::default().fg(DEFAULT_THEME.error)),
    }
}

fn bar_line(
    view: &IntervalView,
    lo: Coord,
    hi: Coord,
    width: usize,
    bound: Option<usize>,
) -> Line<'static> {
    let iv = view.interval;
    let from = column(iv.start.min(iv.end), lo, hi, width);
    let to = column(iv.start.max(iv.end), lo, hi, width);
    let style = interval_style(iv.color, view.state);

    let label = format!("#{:<3} {:>14}", iv.id, iv.to_string());
    let mut spans = vec![
        state_marker(view.state),
        Span::styled(
            format!("{:<width$}", label, width = LABEL_WIDTH - 2),
            Style::default().fg(DEFAULT_THEME.fg),
        ),
        Span::raw(" "),
    ];

    if width > 0 {
        let gap = |cols: std::ops::Range<usize>| -> String {
            cols.map(|col| if bound == Some(col) { '┆' } else { ' ' })
                .collect()
        };
        let bound_style = Style::default().fg(DEFAULT_THEME.bound);
        spans.push(Span::styled(gap(0..from), bound_style));
        spans.push(Span::styled("█".repeat(to - from + 1), style));
        spans.push(Span::styled(gap(to + 1..width), bound_style));
    }

    Line::from(spans)
}

pub fn render_timeline_pane(
    frame: &mut Frame,
    area: Rect,
    data: TimelineRenderData,
    is_focused: bool,
    scroll_state: &mut ScrollState,
) {
    let block = Block::default()
        .title(" Intervals ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let mut all_items = Vec::new();
    let content_width = area.width.saturating_sub(2) as usize;
    let bar_width = content_width.saturating_sub(LABEL_WIDTH + 1);

    match axis_bounds(data.intervals) {
        None => {
            all_items.push(
                ListItem::new("(no intervals)").style(Style::default().fg(DEFAULT_THEME.comment)),
            );
        }
        Some((lo, hi)) => {
            let bound_col = data.max_end.value().map(|v| column(v, lo, hi, bar_width));

            all_items.push(ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<width$}", "max_end", width = LABEL_WIDTH),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::raw(" "),
                Span::styled(
                    data.max_end.to_string(),
                    Style::default()
                        .fg(DEFAULT_THEME.bound)
                        .add_modifier(Modifier::BOLD),
                ),
            ])));

            for view in data.intervals {
                all_items.push(ListItem::new(bar_line(view, lo, hi, bar_width, bound_col)));
            }

            let axis = format!(
                "{:<width$} {}{:>pad$}",
                "",
                lo,
                hi,
                width = LABEL_WIDTH,
                pad = bar_width.saturating_sub(lo.to_string().len())
            );
            all_items.push(ListItem::new(axis).style(Style::default().fg(DEFAULT_THEME.comment)));
        }
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let visible_items = scroll_state.pinned_window(all_items, visible_height);
    frame.render_widget(List::new(visible_items).block(block), area);
}
