//! FocusRing: manages keyboard focus cycling between components.

use crate::action::ComponentId;

pub struct FocusRing {
    items: Vec<ComponentId>,
    current: usize,
}

impl FocusRing {
    pub fn new(items: Vec<ComponentId>) -> Self {
        Self { items, current: 0 }
    }

    pub fn current(&self) -> Option<ComponentId> {
        self.items.get(self.current).copied()
    }

    pub fn next(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.items.len();
        self.current()
    }

    pub fn prev(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = if self.current == 0 {
            self.items.len() - 1
        } else {
            self.current - 1
        };
        self.current()
    }

    pub fn at_start(&self) -> bool {
        self.current == 0
    }

    pub fn at_end(&self) -> bool {
        self.current + 1 >= self.items.len()
    }

    pub fn focus_last(&mut self) {
        self.current = self.items.len().saturating_sub(1);
    }

    pub fn set(&mut self, id: ComponentId) {
        if let Some(pos) = self.items.iter().position(|&x| x == id) {
            self.current = pos;
        }
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.current() == Some(id)
    }

    /// Replace the ring contents (on tab switch), keeping the focused id if
    /// it is still present.
    pub fn set_items(&mut self, items: Vec<ComponentId>) {
        let old = self.current();
        self.items = items;
        if let Some(id) = old {
            if let Some(pos) = self.items.iter().position(|&x| x == id) {
                self.current = pos;
                return;
            }
        }
        self.current = 0;
    }
}

impl Default for FocusRing {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
