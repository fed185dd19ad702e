//! Event handling for the TUI

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tokio::time::interval;

/// Application events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard event
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Tick for spinners
    Tick,
}

/// Merges crossterm input and ticks into one channel
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);

        let task = tokio::spawn(async move {
            let mut tick_interval = interval(tick_rate);

            loop {
                tokio::select! {
                    _ = tick_interval.tick() => {
                        if tx.send(AppEvent::Tick).await.is_err() {
                            break;
                        }
                    }
                    ready = tokio::task::spawn_blocking(|| {
                        event::poll(Duration::from_millis(50)).unwrap_or(false)
                    }) => {
                        if !ready.unwrap_or(false) {
                            continue;
                        }
                        let app_event = match event::read() {
                            // Windows reports both press and release
                            Ok(CrosstermEvent::Key(key)) if key.kind == event::KeyEventKind::Press => {
                                Some(AppEvent::Key(key))
                            }
                            Ok(CrosstermEvent::Resize(w, h)) => Some(AppEvent::Resize(w, h)),
                            _ => None,
                        };

                        if let Some(event) = app_event {
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { rx, _task: task }
    }

    /// Get the next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

/// q or Ctrl+C
pub fn is_quit_key(key: &KeyEvent) -> bool {
    matches!(
        key,
        KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            ..
        } | KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        }
    )
}

/// Ctrl+` toggles the terminal pane
///
/// Most terminals deliver Ctrl+` as NUL, which crossterm reports as
/// Ctrl+Space or `Null`. F12 is accepted as well.
pub fn is_terminal_toggle(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('`') | KeyCode::Char(' ') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Null | KeyCode::F(12) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_toggle_keys() {
        assert!(is_terminal_toggle(&KeyEvent::new(
            KeyCode::Char('`'),
            KeyModifiers::CONTROL
        )));
        assert!(is_terminal_toggle(&KeyEvent::new(KeyCode::Null, KeyModifiers::NONE)));
        assert!(!is_terminal_toggle(&KeyEvent::new(
            KeyCode::Char('`'),
            KeyModifiers::NONE
        )));
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit_key(&KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT)));
    }
}
