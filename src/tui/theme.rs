//! TUI theme and styles

use ratatui::style::{Color, Modifier, Style};

use crate::ai::Severity;
use crate::terminal::LineKind;

/// Application color theme
pub struct Theme;

impl Theme {
    /// Primary accent color
    pub const PRIMARY: Color = Color::Cyan;

    /// Secondary accent color
    pub const SECONDARY: Color = Color::Magenta;

    pub const SUCCESS: Color = Color::Green;

    pub const ERROR: Color = Color::Red;

    pub const WARNING: Color = Color::Yellow;

    /// Muted text color
    pub const MUTED: Color = Color::DarkGray;

    /// Highlighted URLs and paths in terminal output
    pub const LINK: Color = Color::LightBlue;

    pub fn header() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    pub fn status_bar() -> Style {
        Style::default().bg(Color::DarkGray)
    }

    pub fn selected() -> Style {
        Style::default().bg(Self::PRIMARY).fg(Color::Black)
    }

    pub fn normal() -> Style {
        Style::default()
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::MUTED)
    }

    pub fn link() -> Style {
        Style::default()
            .fg(Self::LINK)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Color and prefix icon for a scrollback line
    pub fn line(kind: LineKind) -> (Style, &'static str) {
        match kind {
            LineKind::Input => (Style::default().fg(Self::PRIMARY), "❯"),
            LineKind::Output => (Self::normal(), " "),
            LineKind::Error => (Style::default().fg(Self::ERROR), "✗"),
            LineKind::Success => (Style::default().fg(Self::SUCCESS), "✓"),
            LineKind::Warning => (Style::default().fg(Self::WARNING), "!"),
            LineKind::Info => (Style::default().fg(Self::SECONDARY), "i"),
        }
    }

    pub fn severity(severity: Severity) -> Style {
        match severity {
            Severity::High => Style::default()
                .fg(Self::ERROR)
                .add_modifier(Modifier::BOLD),
            Severity::Medium => Style::default().fg(Self::WARNING),
            Severity::Low => Style::default().fg(Self::PRIMARY),
        }
    }
}
