//! Terminal User Interface module
//!
//! The ratatui front end: editor buffer, AI panels and the shell pane.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
