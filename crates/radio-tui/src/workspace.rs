//! TabManager: which tab is visible, per-tab focus, and shared overlays.

use crate::action::{ComponentId, Tab};
use crate::focus::FocusRing;

pub struct TabManager {
    pub tab: Tab,
    pub show_log_panel: bool,
    pub show_help: bool,
    pub show_keys_bar: bool,
    pub focus: FocusRing,
}

impl TabManager {
    pub fn new() -> Self {
        let mut tm = Self {
            tab: Tab::Discover,
            show_log_panel: false,
            show_help: false,
            show_keys_bar: true,
            focus: FocusRing::default(),
        };
        tm.rebuild_focus_ring();
        tm
    }

    /// Focusable panes of `tab`, in Tab order.
    pub fn panes(tab: Tab) -> Vec<ComponentId> {
        match tab {
            Tab::Discover => vec![ComponentId::DiscoverList],
            Tab::Search => vec![ComponentId::SearchBar, ComponentId::SearchList],
            Tab::Favorites => vec![ComponentId::FavoritesList],
            Tab::Playlists => vec![ComponentId::PlaylistIndex, ComponentId::PlaylistItems],
        }
    }

    pub fn rebuild_focus_ring(&mut self) {
        self.focus.set_items(Self::panes(self.tab));
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.rebuild_focus_ring();
        }
    }

    /// Move focus one pane along.  Stepping past either end of the tab's
    /// panes moves to the neighbouring tab instead.
    pub fn step_focus(&mut self, forward: bool) {
        match (forward, self.focus.at_end(), self.focus.at_start()) {
            (true, true, _) => self.switch_tab(self.tab.next()),
            (false, _, true) => {
                self.switch_tab(self.tab.prev());
                self.focus.focus_last();
            }
            (true, false, _) => {
                self.focus.next();
            }
            (false, _, false) => {
                self.focus.prev();
            }
        }
    }

    pub fn focused(&self) -> Option<ComponentId> {
        self.focus.current()
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.focus.is_focused(id)
    }
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_tabs_moves_focus_to_their_first_pane() {
        let mut tm = TabManager::new();
        assert_eq!(tm.focused(), Some(ComponentId::DiscoverList));

        tm.switch_tab(Tab::Search);
        assert_eq!(tm.focused(), Some(ComponentId::SearchBar));
        tm.focus.next();
        assert!(tm.is_focused(ComponentId::SearchList));

        tm.switch_tab(Tab::Playlists);
        assert_eq!(tm.focused(), Some(ComponentId::PlaylistIndex));
    }

    #[test]
    fn stepping_focus_walks_panes_then_tabs() {
        let mut tm = TabManager::new();
        tm.step_focus(true);
        assert_eq!(tm.tab, Tab::Search);
        assert_eq!(tm.focused(), Some(ComponentId::SearchBar));
        tm.step_focus(true);
        assert_eq!(tm.focused(), Some(ComponentId::SearchList));
        tm.step_focus(true);
        assert_eq!(tm.tab, Tab::Favorites);

        tm.step_focus(false);
        assert_eq!(tm.tab, Tab::Search);
        assert_eq!(tm.focused(), Some(ComponentId::SearchList));
        tm.switch_tab(Tab::Discover);
        tm.step_focus(false);
        assert_eq!(tm.tab, Tab::Playlists);
        assert_eq!(tm.focused(), Some(ComponentId::PlaylistItems));
    }
}
