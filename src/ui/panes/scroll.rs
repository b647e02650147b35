use ratatui::widgets::ListItem;

/// Scroll state for a list pane
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollState {
    pub offset: usize,
    pub prev_item_count: usize,
}

impl ScrollState {
    /// Follow the bottom when content grows, otherwise keep the user's position.
    ///
    /// Returns the offset to render from.
    pub fn update(&mut self, total_items: usize, visible_height: usize) -> usize {
        let max_scroll = total_items.saturating_sub(visible_height);
        if total_items > self.prev_item_count {
            self.offset = max_scroll;
        } else {
            self.offset = self.offset.min(max_scroll);
        }
        self.prev_item_count = total_items;
        self.offset
    }

    pub fn scroll_up(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.offset = self.offset.saturating_add(1);
    }

    /// Take only the rows that fit, starting at the updated offset
    pub fn window<'a>(
        &mut self,
        items: Vec<ListItem<'a>>,
        visible_height: usize,
    ) -> Vec<ListItem<'a>> {
        let offset = self.update(items.len(), visible_height);
        items.into_iter().skip(offset).take(visible_height).collect()
    }

    /// Like [`window`](Self::window) but never jumps to the bottom
    pub fn pinned_window<'a>(
        &mut self,
        items: Vec<ListItem<'a>>,
        visible_height: usize,
    ) -> Vec<ListItem<'a>> {
        self.offset = self.offset.min(items.len().saturating_sub(visible_height));
        self.prev_item_count = items.len();
        items
            .into_iter()
            .skip(self.offset)
            .take(visible_height)
            .collect()
    }
}
