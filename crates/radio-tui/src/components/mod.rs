pub mod dialog;
pub mod header;
pub mod help_overlay;
pub mod log_panel;
pub mod playlist_index;
pub mod search_bar;
pub mod station_list;
