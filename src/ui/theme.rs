use crate::model::IntervalColor;
use crate::trace::IntervalState;
use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
    pub function: Color,
    pub muted_function: Color, // Muted yellow for the caller chain
    pub bound: Color,          // max_end marker
    pub return_value: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for focus
    border_normal: Color::Rgb(108, 112, 134),  // Grey border for normal
    current_line_bg: Color::Rgb(50, 50, 70),   // Slightly lighter BG for current line
    function: Color::Rgb(249, 226, 175),
    muted_function: Color::Rgb(180, 165, 120),
    bound: Color::Rgb(148, 226, 213),
    return_value: Color::Rgb(245, 194, 231),
};

/// Bar color for an interval's display tag
pub fn interval_color(color: IntervalColor) -> Color {
    match color {
        IntervalColor::Blue => Color::Rgb(137, 180, 250),
        IntervalColor::Green => Color::Rgb(166, 227, 161),
        IntervalColor::Amber => Color::Rgb(249, 226, 175),
        IntervalColor::Purple => Color::Rgb(203, 166, 247),
        IntervalColor::Red => Color::Rgb(243, 139, 168),
        IntervalColor::Cyan => Color::Rgb(148, 226, 213),
        IntervalColor::Pink => Color::Rgb(245, 194, 231),
        IntervalColor::Orange => Color::Rgb(250, 179, 135),
    }
}

/// Bar style for an interval in the given state
pub fn interval_style(color: IntervalColor, state: IntervalState) -> Style {
    let base = Style::default().fg(interval_color(color));
    match state {
        IntervalState::Idle => base,
        IntervalState::Examining => base
            .bg(DEFAULT_THEME.current_line_bg)
            .add_modifier(Modifier::BOLD),
        IntervalState::Kept => base.add_modifier(Modifier::BOLD),
        IntervalState::Covered => Style::default()
            .fg(DEFAULT_THEME.comment)
            .add_modifier(Modifier::CROSSED_OUT | Modifier::DIM),
    }
}

pub fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tag_has_a_distinct_color() {
        let colors: Vec<Color> = IntervalColor::ALL.iter().map(|c| interval_color(*c)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
