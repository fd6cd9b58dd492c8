// TUI widget modules, one per screen region or overlay.

pub mod confirm;
pub mod detail;
pub mod help_bar;
pub mod notice;
pub mod player_list;
pub mod status_bar;
