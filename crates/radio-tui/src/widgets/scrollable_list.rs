//! Generic scrollable list state: selection plus scroll offset.

pub struct ScrollableList<T> {
    pub items: Vec<T>,
    pub selected: usize,
    pub scroll_offset: usize,
}

impl<T> ScrollableList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            scroll_offset: 0,
        }
    }

    /// Replace the items, keeping the selection index in range.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
        if self.scroll_offset > self.selected {
            self.scroll_offset = self.selected;
        }
    }

    /// Replace the items, following the selected item to its new position when `same` finds it.
    pub fn set_items_keeping<F>(&mut self, items: Vec<T>, same: F)
    where
        F: Fn(&T, &T) -> bool,
    {
        let previous = self.selected;
        let found = self
            .items
            .get(previous)
            .and_then(|old| items.iter().position(|new| same(old, new)));
        self.set_items(items);
        if let Some(pos) = found {
            self.selected = pos;
        }
    }

    pub fn select_up(&mut self, n: usize) {
        if self.items.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + n).min(self.items.len().saturating_sub(1));
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    /// Returns (index, &item) pairs visible in `height` rows.
    /// Call ensure_visible first to update scroll_offset.
    pub fn visible_items(&self, height: usize) -> Vec<(usize, &T)> {
        if height == 0 || self.items.is_empty() {
            return Vec::new();
        }
        let start = self.scroll_offset.min(self.items.len());
        let end = (start + height).min(self.items.len());
        (start..end).map(|i| (i, &self.items[i])).collect()
    }

    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected.saturating_sub(height - 1);
        }
    }

    /// Handle a click at `row` within the rendered area.
    /// Returns true if the row holds an item.
    pub fn handle_click(&mut self, row: usize) -> bool {
        let target = self.scroll_offset + row;
        if target < self.items.len() {
            self.selected = target;
            return true;
        }
        false
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected_in_view(&self, height: usize) -> usize {
        self.selected
            .saturating_sub(self.scroll_offset)
            .min(height.saturating_sub(1))
    }
}

impl<T> Default for ScrollableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_stays_in_bounds() {
        let mut list = ScrollableList::new();
        list.select_down(3);
        assert_eq!(list.selected, 0);

        list.set_items(vec!["a", "b", "c"]);
        list.select_down(10);
        assert_eq!(list.selected_item(), Some(&"c"));
        list.set_items(vec!["a"]);
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn scrolling_follows_selection() {
        let mut list = ScrollableList::new();
        list.set_items((0..20).collect::<Vec<_>>());
        list.select_down(12);
        list.ensure_visible(5);
        assert_eq!(list.scroll_offset, 8);
        let rows: Vec<usize> = list.visible_items(5).into_iter().map(|(i, _)| i).collect();
        assert_eq!(rows, vec![8, 9, 10, 11, 12]);
        assert_eq!(list.selected_in_view(5), 4);

        assert!(list.handle_click(0));
        assert_eq!(list.selected, 8);
        list.set_items(vec![1, 2]);
        assert!(!list.handle_click(4));
    }

    #[test]
    fn replacing_items_keeps_the_selected_one() {
        let mut list = ScrollableList::new();
        list.set_items(vec!["a", "b", "c"]);
        list.select_down(1);
        list.set_items_keeping(vec!["x", "c", "b"], |a, b| a == b);
        assert_eq!(list.selected_item(), Some(&"b"));
    }
}
