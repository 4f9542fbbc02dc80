//! App: component-based event loop.
//!
//! Architecture:
//! - `App` owns all components, the `Library`, and `AppState` (shared
//!   read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background
//!   tasks: terminal input, player updates, directory responses.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Playback commands flow out to the player task through `player_tx`.

use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use radio_core::config::DirectoryConfig;
use radio_core::directory::{pick_random, DirectoryClient, DirectoryError};
use radio_core::library::{AddOutcome, Library, Membership};
use radio_core::station::Station;
use radio_core::store::{CollectionStore, StoreError};
use radio_core::text::sanitize;

use crate::{
    action::{Action, ComponentId, Tab},
    app_state::{AppState, RegionState},
    component::Component,
    components::{
        dialog::{Dialog, DialogOutcome},
        header::Header,
        help_overlay::HelpOverlay,
        log_panel::LogPanel,
        playlist_index::PlaylistIndex,
        search_bar::SearchBar,
        station_list::{ListKind, StationList},
    },
    player::{PlayerCommand, PlayerUpdate},
    requests::{Region, RequestTracker, Ticket},
    theme::C_BG,
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
    workspace::TabManager,
};

/// Lines of santoplay.log kept for the log panel.
const LOG_TAIL_LINES: usize = 500;

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    Player(PlayerUpdate),
    /// Stations for one of the result regions.
    Listing {
        ticket: Ticket,
        listing: Listing,
        result: Result<Vec<Station>, DirectoryError>,
    },
    /// A single station chosen for immediate playback.
    Picked {
        pick: Pick,
        result: Result<Option<Station>, DirectoryError>,
    },
}

/// Directory requests that fill a result region.
#[derive(Debug, Clone)]
enum Listing {
    Discover,
    Search(String),
    Tag,
}

impl Listing {
    fn region(&self) -> Region {
        match self {
            Self::Discover => Region::Discover,
            Self::Search(_) | Self::Tag => Region::Search,
        }
    }

    /// Spinner owner.  Requests for the same region share one spinner.
    fn spinner_key(&self) -> &'static str {
        match self.region() {
            Region::Discover => "discover",
            Region::Search => "search",
        }
    }

    fn progress(&self, tag: &str) -> String {
        match self {
            Self::Discover => format!("loading top {} stations…", tag),
            Self::Search(query) => format!("searching for \"{}\"…", query),
            Self::Tag => format!("loading {} stations…", tag),
        }
    }

    fn caption(&self, count: usize, tag: &str) -> String {
        match self {
            Self::Discover => format!("{} most played {} stations", count, tag),
            Self::Search(query) => format!("{} result(s) for \"{}\"", count, query),
            Self::Tag => format!("{} {} station(s)", count, tag),
        }
    }

    fn failure(&self) -> &'static str {
        match self {
            Self::Discover => "could not load stations. press R to retry",
            Self::Search(_) => "search failed. press / and Enter to try again",
            Self::Tag => "could not load the tag list. press T to retry",
        }
    }
}

/// Directory requests that end in playback.
#[derive(Debug, Clone, Copy)]
enum Pick {
    Top,
    Random,
}

impl Pick {
    fn spinner_key(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Random => "random",
        }
    }

    fn progress(self, tag: &str) -> String {
        match self {
            Self::Top => format!("looking for a top {} station…", tag),
            Self::Random => format!("picking a random {} station…", tag),
        }
    }

    fn nothing_found(self, tag: &str) -> String {
        match self {
            Self::Top => format!("no {} stations found right now", tag),
            Self::Random => format!("no {} stations available right now", tag),
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App<S> {
    state: AppState,
    tabs: TabManager,
    library: Library<S>,
    directory: DirectoryClient,
    limits: DirectoryConfig,
    requests: RequestTracker,

    player_tx: mpsc::Sender<PlayerCommand>,
    player_rx: Option<mpsc::Receiver<PlayerUpdate>>,
    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,

    // ── Components ────────────────────────────────────────────────────────────
    header: Header,
    discover_list: StationList,
    search_bar: SearchBar,
    search_list: StationList,
    favorites_list: StationList,
    playlist_index: PlaylistIndex,
    playlist_items: StationList,
    log_panel: LogPanel,
    help_overlay: HelpOverlay,
    dialog: Option<Dialog>,
    toast: ToastManager,

    // ── Hit-testing areas from the last draw ─────────────────────────────────
    header_area: Rect,
    log_area: Rect,
    pane_areas: Vec<(ComponentId, Rect)>,

    should_quit: bool,
}

impl<S: CollectionStore> App<S> {
    pub fn new(
        state: AppState,
        library: Library<S>,
        directory: DirectoryClient,
        limits: DirectoryConfig,
        player_tx: mpsc::Sender<PlayerCommand>,
        player_rx: mpsc::Receiver<PlayerUpdate>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<AppMessage>(1024);
        let mut app = Self {
            state,
            tabs: TabManager::new(),
            library,
            directory,
            limits,
            requests: RequestTracker::new(),
            player_tx,
            player_rx: Some(player_rx),
            tx,
            rx: Some(rx),
            header: Header::new(),
            discover_list: StationList::new(ListKind::Discover),
            search_bar: SearchBar::new(),
            search_list: StationList::new(ListKind::Search),
            favorites_list: StationList::new(ListKind::Favorites),
            playlist_index: PlaylistIndex::new(),
            playlist_items: StationList::new(ListKind::PlaylistItems),
            log_panel: LogPanel::new(),
            help_overlay: HelpOverlay::new(),
            dialog: None,
            toast: ToastManager::new(),
            header_area: Rect::default(),
            log_area: Rect::default(),
            pane_areas: Vec::new(),
            should_quit: false,
        };
        app.sync_library();
        app
    }

    /// Show `message` as a warning once the UI is up.
    pub fn with_notice(mut self, message: impl Into<String>) -> Self {
        self.toast.warning(message);
        self
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let (Some(mut rx), Some(mut player_rx)) = (self.rx.take(), self.player_rx.take()) else {
            anyhow::bail!("app event loop already started");
        };

        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: player updates → AppMessage ─────────────────────
        let player_fwd = self.tx.clone();
        tokio::spawn(async move {
            while let Some(update) = player_rx.recv().await {
                if player_fwd.send(AppMessage::Player(update)).await.is_err() {
                    break;
                }
            }
        });

        // ── Periodic timers ───────────────────────────────────────────────────
        // Toast expiry + spinner animation.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // santoplay.log tail refresh, only while the log panel is open.
        let mut log_refresh = tokio::time::interval(Duration::from_secs(2));
        log_refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!("santoplay started");
        self.dispatch(Action::LoadDiscover).await;

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 64;
                    self.handle_message(msg).await;
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        let Ok(next) = rx.try_recv() else { break };
                        drained += 1;
                        self.handle_message(next).await;
                    }
                    needs_redraw = true;
                }

                _ = ui_tick.tick() => {
                    let had_toasts = !self.toast.is_empty();
                    self.toast.tick();
                    needs_redraw = had_toasts;
                }

                _ = log_refresh.tick() => {
                    if self.tabs.show_log_panel {
                        self.reload_log();
                        needs_redraw = true;
                    }
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("santoplay exiting");

        Ok(())
    }

    async fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return;
                    }
                    for a in self.handle_key(key) {
                        self.dispatch(a).await;
                    }
                }
                Event::Mouse(mouse) => {
                    for a in self.handle_mouse(mouse) {
                        self.dispatch(a).await;
                    }
                }
                _ => {}
            },

            AppMessage::Player(PlayerUpdate::State(snapshot)) => {
                self.state.player = snapshot;
            }
            AppMessage::Player(PlayerUpdate::Failed(message)) => {
                self.toast.warning(message);
            }

            AppMessage::Listing {
                ticket,
                listing,
                result,
            } => {
                if !self.requests.is_current(&ticket) {
                    debug!("dropping stale {:?} response", listing);
                    return;
                }
                self.toast.dismiss_spinner(listing.spinner_key());
                let tag = self.state.discover_tag.clone();
                let region = self.region_mut(listing.region());
                match result {
                    Ok(stations) => {
                        info!("{:?}: {} stations", listing, stations.len());
                        let caption = listing.caption(stations.len(), &tag);
                        region.finish(stations, caption);
                    }
                    Err(e) => {
                        warn!("{:?} failed: {}", listing, e);
                        region.fail(listing.failure().to_string());
                        self.toast.warning(e.to_string());
                    }
                }
            }

            AppMessage::Picked { pick, result } => {
                self.toast.dismiss_spinner(pick.spinner_key());
                match result {
                    Ok(Some(station)) => self.play(station).await,
                    Ok(None) => {
                        let message = pick.nothing_found(&self.state.discover_tag);
                        self.toast.warning(message);
                    }
                    Err(e) => {
                        warn!("{:?} pick failed: {}", pick, e);
                        self.toast.warning(e.to_string());
                    }
                }
            }
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }

        // A dialog captures every key until it resolves.
        if let Some(dialog) = self.dialog.as_mut() {
            return match dialog.handle_key(key) {
                DialogOutcome::Pending => vec![],
                DialogOutcome::Done(actions) => {
                    self.dialog = None;
                    self.sync_input_mode();
                    actions
                }
            };
        }

        if self.tabs.show_help {
            return self.help_overlay.handle_key(key, &self.state);
        }

        // Text entry gets everything but focus movement.
        if self.search_bar.is_editing() {
            return match key.code {
                KeyCode::Tab => vec![Action::CloseInput, Action::FocusNext],
                KeyCode::BackTab => vec![Action::CloseInput, Action::FocusPrev],
                _ => self.search_bar.handle_key(key, &self.state),
            };
        }

        match key.code {
            KeyCode::Char('q') => return vec![Action::Quit],
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                return Tab::from_index(idx)
                    .map(|tab| vec![Action::SwitchTab(tab)])
                    .unwrap_or_default();
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => return vec![Action::FocusNext],
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                return vec![Action::FocusPrev]
            }
            KeyCode::Char(' ') => return vec![Action::TogglePause],
            KeyCode::Char('s') => return vec![Action::Stop],
            KeyCode::Char('?') => return vec![Action::ToggleHelp],
            KeyCode::Char('L') => return vec![Action::ToggleLogs],
            KeyCode::Char('K') => return vec![Action::ToggleKeys],
            _ => {}
        }

        let Some(focused) = self.tabs.focused() else {
            return vec![];
        };
        let actions = self.with_component(focused, |c, s| c.handle_key(key, s));
        if !actions.is_empty() {
            return actions;
        }

        // Nothing selected: y / Y fall back to the station that is playing.
        let Some(current) = self.state.player.current.as_ref() else {
            return vec![];
        };
        match key.code {
            KeyCode::Char('y') => current
                .stream_url()
                .map(|url| vec![Action::CopyToClipboard(url.to_string())])
                .unwrap_or_default(),
            KeyCode::Char('Y') => match current.homepage_url() {
                Some(url) => vec![Action::CopyToClipboard(url.to_string())],
                None => vec![Action::Notify("this station has no homepage".into())],
            },
            _ => vec![],
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let is_click = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !is_click || self.dialog.is_some() || self.tabs.show_help {
            return vec![];
        }

        fn hit(r: Rect, col: u16, row: u16) -> bool {
            r.width > 0
                && r.height > 0
                && col >= r.x
                && col < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        }

        let (col, row) = (event.column, event.row);
        if hit(self.header_area, col, row) {
            return self.header.handle_mouse(event, self.header_area, &self.state);
        }
        if hit(self.log_area, col, row) {
            return self.log_panel.handle_mouse(event, self.log_area, &self.state);
        }

        let Some((id, area)) = self
            .pane_areas
            .iter()
            .copied()
            .find(|(_, r)| hit(*r, col, row))
        else {
            return vec![];
        };
        let mut actions = self.with_component(id, |c, s| c.handle_mouse(event, area, s));
        // Focus follows the click.
        if self.tabs.focused() != Some(id) && matches!(event.kind, MouseEventKind::Down(_)) {
            actions.insert(0, Action::FocusPane(id));
        }
        actions
    }

    fn with_component<R>(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&mut dyn Component, &AppState) -> R,
    ) -> R {
        let state = &self.state;
        let component: &mut dyn Component = match id {
            ComponentId::DiscoverList => &mut self.discover_list,
            ComponentId::SearchBar => &mut self.search_bar,
            ComponentId::SearchList => &mut self.search_list,
            ComponentId::FavoritesList => &mut self.favorites_list,
            ComponentId::PlaylistIndex => &mut self.playlist_index,
            ComponentId::PlaylistItems => &mut self.playlist_items,
        };
        f(component, state)
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        debug!("dispatch: {:?}", action);
        // Apply first so components react against the updated state.
        let notify = action.clone();
        self.apply_action(action).await;

        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.header.on_action(&notify, s));
            out.extend(self.discover_list.on_action(&notify, s));
            out.extend(self.search_bar.on_action(&notify, s));
            out.extend(self.search_list.on_action(&notify, s));
            out.extend(self.favorites_list.on_action(&notify, s));
            out.extend(self.playlist_index.on_action(&notify, s));
            out.extend(self.playlist_items.on_action(&notify, s));
            out.extend(self.log_panel.on_action(&notify, s));
            out.extend(self.help_overlay.on_action(&notify, s));
            out
        };

        // Secondary actions are applied one level deep.
        for a in secondary {
            self.apply_action(a).await;
        }
        self.sync_input_mode();
    }

    async fn apply_action(&mut self, action: Action) {
        match action {
            // ── Playback ──────────────────────────────────────────────────────
            Action::Play(station) => self.play(station).await,
            Action::TogglePause => self.send_player(PlayerCommand::TogglePause).await,
            Action::Stop => self.send_player(PlayerCommand::Stop).await,

            // ── Directory ─────────────────────────────────────────────────────
            Action::LoadDiscover => self.request_listing(Listing::Discover),
            Action::ListTag => self.request_listing(Listing::Tag),
            Action::Search(query) => {
                let query = query.trim().to_string();
                if query.is_empty() {
                    // Any search still in flight is stale now.
                    self.requests.issue(Region::Search);
                    self.toast.dismiss_spinner(Listing::Search(query).spinner_key());
                    let region = &mut self.state.search;
                    region.loading = false;
                    region.error = None;
                    region.caption = Some(DirectoryError::EmptyQuery.to_string());
                } else {
                    self.request_listing(Listing::Search(query));
                }
            }
            Action::PlayTop => self.request_pick(Pick::Top),
            Action::SurpriseMe => self.request_pick(Pick::Random),

            // ── Library ───────────────────────────────────────────────────────
            Action::ToggleFavorite(station) => {
                let name = sanitize(station.display_name()).into_owned();
                match self.library.toggle_favorite(&station) {
                    Ok(Membership::Added) => self.toast.success(format!("♥ {}", name)),
                    Ok(Membership::Removed) => {
                        self.toast.info(format!("removed {} from favorites", name))
                    }
                    Err(e) => self.store_failed(e),
                }
                self.sync_library();
            }
            Action::AddToPlaylist(station) => {
                if self.library.playlists().is_empty() {
                    self.toast
                        .info("no playlists yet. press n on the playlists tab (4) to create one");
                } else {
                    let names = self
                        .library
                        .playlists()
                        .iter()
                        .map(|p| p.name.clone())
                        .collect();
                    self.open_dialog(Dialog::add_to_playlist(station, names));
                }
            }
            Action::AddStationTo(idx, station) => {
                let name = sanitize(station.display_name()).into_owned();
                let playlist = self.playlist_name(idx);
                match self.library.add_station_to_playlist(idx, &station) {
                    Ok(AddOutcome::Added) => {
                        self.toast.success(format!("added {} to {}", name, playlist))
                    }
                    Ok(AddOutcome::AlreadyPresent) => {
                        self.toast.info(format!("{} is already in {}", name, playlist))
                    }
                    Ok(AddOutcome::NoSuchPlaylist) => {
                        self.toast.warning("that playlist no longer exists")
                    }
                    Err(e) => self.store_failed(e),
                }
                self.sync_library();
            }
            Action::ClearFavorites => {
                let count = self.library.favorites().len();
                if count == 0 {
                    self.toast.info("no favorites to clear");
                } else {
                    self.open_dialog(Dialog::confirm(
                        format!("remove all {} favorites?", count),
                        Action::ConfirmClearFavorites,
                    ));
                }
            }
            Action::ConfirmClearFavorites => {
                match self.library.clear_favorites() {
                    Ok(()) => self.toast.info("favorites cleared"),
                    Err(e) => self.store_failed(e),
                }
                self.sync_library();
            }
            Action::NewPlaylist => self.open_dialog(Dialog::new_playlist()),
            Action::CreatePlaylist(name) => {
                match self.library.create_playlist(&name) {
                    // New playlists are inserted first.
                    Ok(true) => {
                        self.toast
                            .success(format!("created playlist {}", sanitize(name.trim())));
                        self.state.selected_playlist = 0;
                    }
                    Ok(false) => self.toast.warning("a playlist needs a name"),
                    Err(e) => {
                        self.state.selected_playlist = 0;
                        self.store_failed(e);
                    }
                }
                self.sync_library();
            }
            Action::DeletePlaylist(idx) => {
                if idx < self.library.playlists().len() {
                    let message = format!("delete playlist {}?", self.playlist_name(idx));
                    self.open_dialog(Dialog::confirm(message, Action::ConfirmDeletePlaylist(idx)));
                }
            }
            Action::ConfirmDeletePlaylist(idx) => {
                let removed = match self.library.delete_playlist(idx) {
                    Ok(Some(removed)) => {
                        self.toast
                            .info(format!("deleted playlist {}", sanitize(&removed.name)));
                        true
                    }
                    Ok(None) => false,
                    Err(e) => {
                        self.store_failed(e);
                        self.library.playlists().len() < self.state.playlists.len()
                    }
                };
                // Keep the same playlist selected when an earlier one goes.
                if removed && idx < self.state.selected_playlist {
                    self.state.selected_playlist -= 1;
                }
                self.sync_library();
            }
            Action::AddAllFavorites(idx) => {
                let playlist = self.playlist_name(idx);
                if self.library.favorites().is_empty() {
                    self.toast.info("no favorites yet. press f on a station first");
                    return;
                }
                match self.library.add_all_favorites_to_playlist(idx) {
                    Ok(Some(0)) => self
                        .toast
                        .info(format!("every favorite is already in {}", playlist)),
                    Ok(Some(n)) => self
                        .toast
                        .success(format!("added {} favorite(s) to {}", n, playlist)),
                    Ok(None) => {}
                    Err(e) => self.store_failed(e),
                }
                self.sync_library();
            }
            Action::RemoveFromPlaylist(idx, id) => {
                match self.library.remove_station_from_playlist(idx, &id) {
                    Ok(true) => self
                        .toast
                        .info(format!("removed from {}", self.playlist_name(idx))),
                    Ok(false) => {}
                    Err(e) => self.store_failed(e),
                }
                self.sync_library();
            }
            Action::SelectPlaylist(idx) => {
                if idx < self.state.playlists.len() {
                    self.state.selected_playlist = idx;
                }
            }

            // ── Navigation ────────────────────────────────────────────────────
            Action::SwitchTab(tab) => {
                self.tabs.switch_tab(tab);
                self.state.tab = tab;
            }
            Action::FocusNext => {
                self.tabs.step_focus(true);
                self.state.tab = self.tabs.tab;
            }
            Action::FocusPrev => {
                self.tabs.step_focus(false);
                self.state.tab = self.tabs.tab;
            }
            Action::FocusPane(id) => self.tabs.focus.set(id),

            // Components own their text input; the mode is re-synced after dispatch.
            Action::OpenInput | Action::CloseInput => {}

            // ── UI toggles ────────────────────────────────────────────────────
            Action::ToggleLogs => {
                self.tabs.show_log_panel = !self.tabs.show_log_panel;
                if self.tabs.show_log_panel {
                    self.reload_log();
                }
            }
            Action::ToggleHelp => self.tabs.show_help = !self.tabs.show_help,
            Action::ToggleKeys => self.tabs.show_keys_bar = !self.tabs.show_keys_bar,
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        let display = if text.chars().count() > 40 {
                            format!("{}…", text.chars().take(40).collect::<String>())
                        } else {
                            text
                        };
                        self.toast.success(format!("copied: {}", sanitize(&display)));
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.toast.error(format!("clipboard error: {}", e));
                    }
                }
            }
            Action::Notify(message) => self.toast.info(message),

            Action::Quit => {
                info!("quit requested");
                self.should_quit = true;
            }
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    async fn play(&mut self, station: Station) {
        info!("play: {} ({})", station.display_name(), station.id());
        self.send_player(PlayerCommand::Play(station)).await;
    }

    async fn send_player(&mut self, cmd: PlayerCommand) {
        if self.player_tx.send(cmd).await.is_err() {
            warn!("player task is gone");
            self.toast.error("the player stopped running; restart santoplay");
        }
    }

    fn request_listing(&mut self, listing: Listing) {
        let ticket = self.requests.issue(listing.region());
        let tag = self.state.discover_tag.clone();
        self.region_mut(listing.region()).start_loading();
        self.toast
            .spinner(listing.spinner_key(), listing.progress(&tag));

        let client = self.directory.clone();
        let limits = self.limits.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match &listing {
                Listing::Discover => client.top_by_tag(&tag, limits.discover_limit).await,
                Listing::Search(query) => client.search_by_name(query, limits.search_limit).await,
                Listing::Tag => client.list_by_tag(&tag, limits.tag_limit).await,
            };
            let _ = tx
                .send(AppMessage::Listing {
                    ticket,
                    listing,
                    result,
                })
                .await;
        });
    }

    fn request_pick(&mut self, pick: Pick) {
        let tag = self.state.discover_tag.clone();
        self.toast.spinner(pick.spinner_key(), pick.progress(&tag));

        let client = self.directory.clone();
        let limits = self.limits.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match pick {
                Pick::Top => client
                    .top_by_tag(&tag, limits.top_limit)
                    .await
                    .map(|stations| stations.into_iter().next()),
                Pick::Random => client
                    .random_by_tag(&tag, limits.random_limit)
                    .await
                    .map(|stations| pick_random(&stations).cloned()),
            };
            let _ = tx.send(AppMessage::Picked { pick, result }).await;
        });
    }

    fn region_mut(&mut self, region: Region) -> &mut RegionState {
        match region {
            Region::Discover => &mut self.state.discover,
            Region::Search => &mut self.state.search,
        }
    }

    fn playlist_name(&self, idx: usize) -> String {
        self.library
            .playlists()
            .get(idx)
            .map(|p| sanitize(&p.name).into_owned())
            .unwrap_or_else(|| "playlist".to_string())
    }

    fn store_failed(&mut self, e: StoreError) {
        warn!("library save failed: {}", e);
        self.toast.error(format!("not saved: {}", e));
    }

    fn sync_library(&mut self) {
        self.state
            .set_library(self.library.favorites(), self.library.playlists());
    }

    fn open_dialog(&mut self, dialog: Dialog) {
        self.dialog = Some(dialog);
        self.sync_input_mode();
    }

    fn sync_input_mode(&mut self) {
        self.state.input_mode = if self.dialog.is_some() {
            InputMode::Dialog
        } else if self.search_bar.is_editing() {
            InputMode::Input
        } else {
            InputMode::Normal
        };
    }

    /// Read the tail of santoplay.log into `state.log_lines`.
    fn reload_log(&mut self) {
        match std::fs::read_to_string(&self.state.log_path) {
            Ok(content) => {
                let lines: Vec<&str> = content.lines().collect();
                let start = lines.len().saturating_sub(LOG_TAIL_LINES);
                self.state.log_lines = lines[start..].iter().map(|l| l.to_string()).collect();
            }
            Err(e) => debug!("could not read {}: {}", self.state.log_path.display(), e),
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        // ── Outer layout: header | body | (log) | (keys bar) ─────────────────
        let status_h = if self.tabs.show_keys_bar { 1u16 } else { 0 };
        let log_h = if self.tabs.show_log_panel { 10u16 } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(log_h),
                Constraint::Length(status_h),
            ])
            .split(area);

        self.header_area = outer[0];
        self.header.draw(frame, outer[0], false, &self.state);

        self.pane_areas.clear();
        self.draw_body(frame, outer[1]);

        if self.tabs.show_log_panel {
            self.log_area = outer[2];
            self.log_panel.draw(frame, outer[2], false, &self.state);
        } else {
            self.log_area = Rect::default();
        }

        if self.tabs.show_keys_bar {
            status_bar::draw_keys_bar(frame, outer[3], self.state.input_mode, self.tabs.tab);
        }

        // ── Overlays ──────────────────────────────────────────────────────────
        if self.tabs.show_help {
            self.help_overlay.draw(frame, area, false, &self.state);
        }
        if let Some(dialog) = self.dialog.as_ref() {
            dialog.draw(frame, area);
        }
        self.toast.draw(frame, area);
    }

    fn draw_body(&mut self, frame: &mut Frame, area: Rect) {
        match self.tabs.tab {
            Tab::Discover => self.draw_pane(frame, ComponentId::DiscoverList, area),
            Tab::Search => {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(3), Constraint::Min(0)])
                    .split(area);
                self.draw_pane(frame, ComponentId::SearchBar, rows[0]);
                self.draw_pane(frame, ComponentId::SearchList, rows[1]);
            }
            Tab::Favorites => self.draw_pane(frame, ComponentId::FavoritesList, area),
            Tab::Playlists => {
                let cols = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
                    .split(area);
                self.draw_pane(frame, ComponentId::PlaylistIndex, cols[0]);
                self.draw_pane(frame, ComponentId::PlaylistItems, cols[1]);
            }
        }
    }

    fn draw_pane(&mut self, frame: &mut Frame, id: ComponentId, area: Rect) {
        let focused = self.tabs.is_focused(id) && self.dialog.is_none();
        self.pane_areas.push((id, area));
        self.with_component(id, |c, s| c.draw(frame, area, focused, s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_core::store::MemoryStore;
    use std::path::PathBuf;

    fn test_app() -> (App<MemoryStore>, mpsc::Receiver<PlayerCommand>) {
        let (player_tx, commands) = mpsc::channel(8);
        let (_updates, player_rx) = mpsc::channel(8);
        let limits = DirectoryConfig::default();
        let directory = DirectoryClient::new(&limits).unwrap();
        let app = App::new(
            AppState::new("gospel".into(), PathBuf::new()),
            Library::load(MemoryStore::new()),
            directory,
            limits,
            player_tx,
            player_rx,
        );
        (app, commands)
    }

    fn station(id: &str) -> Station {
        Station {
            stationuuid: id.into(),
            name: format!("Rádio {}", id),
            url_resolved: Some(format!("http://{}.example/stream", id)),
            ..Station::default()
        }
    }

    fn selected_name<S: CollectionStore>(app: &App<S>) -> Option<String> {
        app.state.current_playlist().map(|p| p.name.clone())
    }

    #[tokio::test]
    async fn a_new_playlist_becomes_the_selected_one() {
        let (mut app, _commands) = test_app();
        app.apply_action(Action::CreatePlaylist("Old".into())).await;
        app.apply_action(Action::CreatePlaylist("Oração".into())).await;

        assert_eq!(app.state.playlists[0].name, "Oração");
        assert_eq!(selected_name(&app).as_deref(), Some("Oração"));

        app.apply_action(Action::ToggleFavorite(station("A"))).await;
        app.apply_action(Action::AddAllFavorites(app.state.selected_playlist))
            .await;
        assert_eq!(app.library.playlists()[0].items.len(), 1);
        assert!(app.library.playlists()[1].items.is_empty());
    }

    #[tokio::test]
    async fn deleting_a_playlist_keeps_a_sensible_selection() {
        let (mut app, _commands) = test_app();
        for name in ["a", "b", "c"] {
            app.apply_action(Action::CreatePlaylist(name.into())).await;
        }
        // Newest first: c, b, a.
        app.apply_action(Action::SelectPlaylist(2)).await;
        assert_eq!(selected_name(&app).as_deref(), Some("a"));

        app.apply_action(Action::ConfirmDeletePlaylist(0)).await;
        assert_eq!(selected_name(&app).as_deref(), Some("a"));

        app.apply_action(Action::ConfirmDeletePlaylist(1)).await;
        assert_eq!(selected_name(&app).as_deref(), Some("b"));

        app.apply_action(Action::ConfirmDeletePlaylist(0)).await;
        assert_eq!(selected_name(&app), None);
        assert_eq!(app.state.selected_playlist, 0);
    }

    #[tokio::test]
    async fn stale_listing_responses_are_dropped() {
        let (mut app, _commands) = test_app();
        let older = app.requests.issue(Region::Search);
        let newer = app.requests.issue(Region::Search);

        app.handle_message(AppMessage::Listing {
            ticket: newer,
            listing: Listing::Search("louvor".into()),
            result: Ok(vec![station("NEW")]),
        })
        .await;
        app.handle_message(AppMessage::Listing {
            ticket: older,
            listing: Listing::Search("lou".into()),
            result: Ok(vec![station("OLD1"), station("OLD2")]),
        })
        .await;

        let ids: Vec<&str> = app.state.search.stations.iter().map(Station::id).collect();
        assert_eq!(ids, vec!["NEW"]);
        assert_eq!(
            app.state.search.caption.as_deref(),
            Some("1 result(s) for \"louvor\"")
        );
    }

    #[tokio::test]
    async fn blank_search_prompts_and_outlives_the_search_in_flight() {
        let (mut app, _commands) = test_app();
        let in_flight = app.requests.issue(Region::Search);
        app.state.search.start_loading();

        app.apply_action(Action::Search("   ".into())).await;
        assert!(!app.state.search.loading);
        assert_eq!(
            app.state.search.caption.as_deref(),
            Some("type something to search")
        );
        assert!(!app.requests.is_current(&in_flight));

        app.handle_message(AppMessage::Listing {
            ticket: in_flight,
            listing: Listing::Search("gospel".into()),
            result: Ok(vec![station("A")]),
        })
        .await;
        assert!(app.state.search.stations.is_empty());
        assert_eq!(
            app.state.search.caption.as_deref(),
            Some("type something to search")
        );
    }

    #[tokio::test]
    async fn a_listing_leaves_the_pick_spinner_running() {
        let (mut app, _commands) = test_app();
        let tag = app.state.discover_tag.clone();
        app.toast
            .spinner(Pick::Random.spinner_key(), Pick::Random.progress(&tag));
        let ticket = app.requests.issue(Region::Discover);
        app.toast
            .spinner(Listing::Discover.spinner_key(), Listing::Discover.progress(&tag));

        app.handle_message(AppMessage::Listing {
            ticket,
            listing: Listing::Discover,
            result: Ok(vec![station("A")]),
        })
        .await;

        assert_eq!(
            app.toast.spinner_messages().collect::<Vec<_>>(),
            vec![Pick::Random.progress(&tag).as_str()]
        );

        app.handle_message(AppMessage::Picked {
            pick: Pick::Random,
            result: Ok(None),
        })
        .await;
        assert_eq!(app.toast.spinner_messages().count(), 0);
    }
}
