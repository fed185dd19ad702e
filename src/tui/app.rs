//! Main TUI application state and logic

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::ai::{AiBackend, RefactorSuggestion, SearchResult, SecurityAudit};
use crate::core::config::Config;
use crate::core::formatter;
use crate::core::store::SharedStore;
use crate::core::track::{self, TrackPayload};
use crate::error::{ForgeError, Result};
use crate::panels::{outcome, Panel, RequestId, SavedQueries};
use crate::terminal::commands::ACTIVE_FILE;
use crate::terminal::{LineKind, SessionEffect, TerminalSession};
use crate::tui::event::{is_quit_key, is_terminal_toggle, AppEvent, EventHandler};
use crate::tui::ui;

pub const MIN_TERMINAL_HEIGHT: u16 = 5;
pub const MAX_TERMINAL_HEIGHT: u16 = 40;

/// Message type for async operation results
#[derive(Debug)]
pub enum AsyncMessage {
    /// Formatter finished with the new buffer
    FormatCompleted(String),
    /// Refactor request finished (None = no result)
    RefactorFinished {
        id: RequestId,
        suggestion: Option<RefactorSuggestion>,
    },
    /// Security audit finished
    AuditFinished {
        id: RequestId,
        audit: Option<SecurityAudit>,
    },
    /// Grounded search finished
    SearchFinished {
        id: RequestId,
        result: Option<SearchResult>,
    },
}

/// Current screen in the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Editor buffer with the refactor panel
    Workspace,
    /// Grounded search with saved queries
    Search,
    /// Security audit findings
    Audit,
}

/// Main TUI application
pub struct App {
    /// Whether the app is running
    pub running: bool,
    pub current_screen: Screen,
    pub show_help: bool,
    /// Status message to display
    pub status_message: Option<String>,
    pub config: Config,

    /// Shell state: history, input line, code buffer, saved sessions
    pub session: TerminalSession,
    pub terminal_open: bool,
    pub terminal_height: u16,
    /// Lines scrolled back from the bottom of the scrollback
    pub terminal_scroll: u16,
    pub session_menu_selection: usize,

    pub refactor_panel: Panel<RefactorSuggestion>,
    pub audit_panel: Panel<SecurityAudit>,
    pub audit_selection: usize,
    pub search_panel: Panel<SearchResult>,
    pub search_input: String,
    /// Query behind the current search result
    pub search_query: String,
    pub saved_queries: SavedQueries,
    pub saved_query_selection: Option<usize>,

    /// Tick counter for spinner animation
    pub tick_counter: u64,

    backend: Option<Arc<dyn AiBackend>>,
    async_tx: mpsc::Sender<AsyncMessage>,
    async_rx: mpsc::Receiver<AsyncMessage>,
}

impl App {
    /// Create a new app instance
    ///
    /// Without a backend the AI commands still run but report no result.
    pub fn new(config: Config, store: SharedStore, backend: Option<Arc<dyn AiBackend>>) -> Self {
        let (async_tx, async_rx) = mpsc::channel(32);
        let terminal_height = config
            .terminal_height
            .clamp(MIN_TERMINAL_HEIGHT, MAX_TERMINAL_HEIGHT);

        Self {
            running: true,
            current_screen: Screen::Workspace,
            show_help: false,
            status_message: None,
            config,

            session: TerminalSession::new(store.clone()),
            terminal_open: true,
            terminal_height,
            terminal_scroll: 0,
            session_menu_selection: 0,

            refactor_panel: Panel::new(),
            audit_panel: Panel::new(),
            audit_selection: 0,
            search_panel: Panel::new(),
            search_input: String::new(),
            search_query: String::new(),
            saved_queries: SavedQueries::load(store),
            saved_query_selection: None,

            tick_counter: 0,

            backend,
            async_tx,
            async_rx,
        }
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Setup terminal for TUI
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode().map_err(|e| ForgeError::Terminal(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| ForgeError::Terminal(e.to_string()))?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).map_err(|e| ForgeError::Terminal(e.to_string()))
    }

    /// Restore terminal to normal state
    fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode().map_err(|e| ForgeError::Terminal(e.to_string()))?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| ForgeError::Terminal(e.to_string()))?;
        terminal
            .show_cursor()
            .map_err(|e| ForgeError::Terminal(e.to_string()))?;
        Ok(())
    }

    /// Run the TUI application
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = Self::setup_terminal()?;
        let mut events = EventHandler::new(Duration::from_millis(250));

        while self.running {
            terminal
                .draw(|frame| ui::render(frame, self))
                .map_err(|e| ForgeError::Terminal(e.to_string()))?;

            while let Ok(msg) = self.async_rx.try_recv() {
                self.handle_async_message(msg);
            }

            if let Some(event) = events.next().await {
                match event {
                    AppEvent::Key(key) => self.handle_key_event(key),
                    AppEvent::Resize(_, _) => {}
                    AppEvent::Tick => {
                        self.tick_counter = self.tick_counter.wrapping_add(1);
                    }
                }
            }
        }

        Self::restore_terminal(&mut terminal)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Async completions
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle async message from background tasks
    pub fn handle_async_message(&mut self, msg: AsyncMessage) {
        match msg {
            AsyncMessage::FormatCompleted(code) => self.session.complete_format(code),
            AsyncMessage::RefactorFinished { id, suggestion } => {
                let found = suggestion.is_some();
                if !self.refactor_panel.complete(id, suggestion) {
                    return;
                }
                if found {
                    self.session.log(
                        LineKind::Success,
                        "[AI] Refactor suggestion ready. Press y in the workspace to apply.",
                    );
                } else {
                    self.session
                        .log(LineKind::Warning, "[AI] No refactor suggestion available.");
                }
            }
            AsyncMessage::AuditFinished { id, audit } => {
                let summary = audit.as_ref().map(|a| a.vulnerabilities.len());
                if !self.audit_panel.complete(id, audit) {
                    return;
                }
                self.audit_selection = 0;
                match summary {
                    Some(0) => self.session.log(
                        LineKind::Success,
                        format!("[AI] No vulnerabilities found in {}.", ACTIVE_FILE),
                    ),
                    Some(n) => self.session.log(
                        LineKind::Warning,
                        format!("[AI] Audit found {} issue(s) in {}.", n, ACTIVE_FILE),
                    ),
                    None => self
                        .session
                        .log(LineKind::Warning, "[AI] Security audit returned no result."),
                }
            }
            AsyncMessage::SearchFinished { id, result } => {
                let found = result.is_some();
                if self.search_panel.complete(id, result) {
                    self.status_message = Some(if found {
                        "Search complete".to_string()
                    } else {
                        "Search returned no result".to_string()
                    });
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Key handling
    // ─────────────────────────────────────────────────────────────────────────

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        if is_terminal_toggle(&key) {
            self.toggle_terminal();
            return;
        }

        if self.session.session_menu_open() {
            self.handle_session_menu_key(key);
            return;
        }

        if self.terminal_open {
            self.handle_terminal_key(key);
            return;
        }

        // Search input takes every printable key
        if self.current_screen == Screen::Search {
            self.handle_search_key(key);
            return;
        }

        if key.code == KeyCode::Char('?') {
            self.show_help = true;
            return;
        }

        match self.current_screen {
            Screen::Workspace => self.handle_workspace_key(key),
            Screen::Audit => self.handle_audit_key(key),
            Screen::Search => {}
        }
    }

    fn toggle_terminal(&mut self) {
        self.session.on_other_key();
        self.terminal_open = !self.terminal_open;
        if !self.terminal_open {
            self.session.close_session_menu();
        }
    }

    fn handle_terminal_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Tab => self.session.tab(),
            KeyCode::Enter => {
                self.terminal_scroll = 0;
                let effects = self.session.submit_input();
                self.run_effects(effects);
            }
            KeyCode::Backspace => self.session.backspace(),
            KeyCode::Esc => {
                self.session.on_other_key();
                self.terminal_open = false;
            }
            KeyCode::Char('c') if ctrl => self.quit(),
            KeyCode::Char('s') if ctrl => {
                self.session.on_other_key();
                self.session_menu_selection = 0;
                self.session.toggle_session_menu();
            }
            KeyCode::Up if ctrl => self.resize_terminal(1),
            KeyCode::Down if ctrl => self.resize_terminal(-1),
            KeyCode::PageUp => {
                self.session.on_other_key();
                let max = u16::try_from(self.session.history().len()).unwrap_or(u16::MAX);
                self.terminal_scroll = self.terminal_scroll.saturating_add(5).min(max);
            }
            KeyCode::PageDown => {
                self.session.on_other_key();
                self.terminal_scroll = self.terminal_scroll.saturating_sub(5);
            }
            KeyCode::Char(c) if !ctrl => self.session.insert_char(c),
            _ => self.session.on_other_key(),
        }
    }

    fn handle_session_menu_key(&mut self, key: KeyEvent) {
        let count = self.session.saved_sessions().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down if count > 0 => {
                self.session_menu_selection = (self.session_menu_selection + 1) % count;
            }
            KeyCode::Char('k') | KeyCode::Up if count > 0 => {
                self.session_menu_selection = self
                    .session_menu_selection
                    .checked_sub(1)
                    .unwrap_or(count - 1);
            }
            KeyCode::Enter => {
                let name = self
                    .session
                    .saved_sessions()
                    .get(self.session_menu_selection)
                    .map(|s| s.name.clone());
                if let Some(name) = name {
                    self.terminal_scroll = 0;
                    self.session.load_session(&name);
                }
            }
            KeyCode::Char('n') => {
                let name = self.session.save_session(None);
                self.session_menu_selection = 0;
                self.session
                    .log(LineKind::Success, format!("[SUCCESS] Session saved: {}", name));
            }
            KeyCode::Esc | KeyCode::Char('q') => self.session.close_session_menu(),
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.session.close_session_menu()
            }
            _ => {}
        }
    }

    fn handle_workspace_key(&mut self, key: KeyEvent) {
        if is_quit_key(&key) {
            self.quit();
            return;
        }

        match key.code {
            KeyCode::Char('r') => self.run_command("refactor"),
            KeyCode::Char('a') => self.run_command("audit"),
            KeyCode::Char('f') => self.run_command("format"),
            KeyCode::Char('t') => self.run_command("track"),
            KeyCode::Char('y') => self.apply_suggestion(),
            KeyCode::Char('x') => self.refactor_panel.reset(),
            KeyCode::Char('s') => self.current_screen = Screen::Search,
            KeyCode::Char('v') => self.current_screen = Screen::Audit,
            _ => {}
        }
    }

    fn handle_audit_key(&mut self, key: KeyEvent) {
        let count = self
            .audit_panel
            .state()
            .result()
            .map(|a| a.vulnerabilities.len())
            .unwrap_or(0);

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.current_screen = Screen::Workspace,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),
            KeyCode::Char('j') | KeyCode::Down if count > 0 => {
                self.audit_selection = (self.audit_selection + 1) % count;
            }
            KeyCode::Char('k') | KeyCode::Up if count > 0 => {
                self.audit_selection = self.audit_selection.checked_sub(1).unwrap_or(count - 1);
            }
            KeyCode::Char('a') => self.run_command("audit"),
            KeyCode::Char('t') => self.export_finding(),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.current_screen = Screen::Workspace,
            KeyCode::Enter => self.submit_search(),
            KeyCode::Backspace => {
                self.search_input.pop();
            }
            KeyCode::Up => self.select_saved_query(-1),
            KeyCode::Down => self.select_saved_query(1),
            KeyCode::Char('c') if ctrl => self.quit(),
            KeyCode::Char('s') if ctrl => {
                if self.saved_queries.save(&self.search_input) {
                    self.status_message = Some("Query saved".to_string());
                }
            }
            KeyCode::Char('d') if ctrl => {
                if let Some(query) = self
                    .saved_query_selection
                    .and_then(|i| self.saved_queries.list().get(i).cloned())
                {
                    self.saved_queries.remove(&query);
                    self.saved_query_selection = None;
                    self.status_message = Some(format!("Removed \"{}\"", query));
                }
            }
            KeyCode::Char('x') if ctrl => {
                self.saved_queries.clear();
                self.saved_query_selection = None;
                self.status_message = Some("Cleared saved queries".to_string());
            }
            KeyCode::Char('t') if ctrl => self.export_search(),
            KeyCode::Char(c) if !ctrl => {
                self.saved_query_selection = None;
                self.search_input.push(c);
            }
            _ => {}
        }
    }

    fn select_saved_query(&mut self, step: isize) {
        let count = self.saved_queries.list().len();
        if count == 0 {
            return;
        }
        let next = match self.saved_query_selection {
            None if step > 0 => 0,
            None => count - 1,
            Some(i) => (i as isize + step).rem_euclid(count as isize) as usize,
        };
        self.saved_query_selection = Some(next);
        self.search_input = self.saved_queries.list()[next].clone();
    }

    fn resize_terminal(&mut self, delta: i16) {
        self.session.on_other_key();
        self.terminal_height = self
            .terminal_height
            .saturating_add_signed(delta)
            .clamp(MIN_TERMINAL_HEIGHT, MAX_TERMINAL_HEIGHT);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands and effects
    // ─────────────────────────────────────────────────────────────────────────

    /// Run a shell command as if it was typed into the terminal
    pub fn run_command(&mut self, line: &str) {
        let effects = self.session.submit(line);
        self.run_effects(effects);
    }

    fn run_effects(&mut self, effects: Vec<SessionEffect>) {
        for effect in effects {
            match effect {
                SessionEffect::Format { code } => self.spawn_format(code),
                SessionEffect::Refactor { code } => self.spawn_refactor(code),
                SessionEffect::Audit { file_name, code } => {
                    self.current_screen = Screen::Audit;
                    self.spawn_audit(file_name, code);
                }
                SessionEffect::Track => self.export_refactor(),
            }
        }
    }

    fn spawn_format(&mut self, code: String) {
        let delay = Duration::from_millis(self.config.format_delay_ms);
        let tx = self.async_tx.clone();

        tokio::spawn(async move {
            let formatted = formatter::format_with_delay(code, delay).await;
            let _ = tx.send(AsyncMessage::FormatCompleted(formatted)).await;
        });
    }

    fn spawn_refactor(&mut self, code: String) {
        let id = self.refactor_panel.begin();
        let Some(backend) = self.backend.clone() else {
            self.handle_async_message(AsyncMessage::RefactorFinished {
                id,
                suggestion: None,
            });
            self.warn_missing_backend();
            return;
        };
        let tx = self.async_tx.clone();

        tokio::spawn(async move {
            let suggestion = outcome("refactor", backend.suggest_refactor(&code).await);
            let _ = tx
                .send(AsyncMessage::RefactorFinished { id, suggestion })
                .await;
        });
    }

    fn spawn_audit(&mut self, file_name: String, code: String) {
        let id = self.audit_panel.begin();
        let Some(backend) = self.backend.clone() else {
            self.handle_async_message(AsyncMessage::AuditFinished { id, audit: None });
            self.warn_missing_backend();
            return;
        };
        let tx = self.async_tx.clone();

        tokio::spawn(async move {
            let audit = outcome("audit", backend.audit_security(&file_name, &code).await);
            let _ = tx.send(AsyncMessage::AuditFinished { id, audit }).await;
        });
    }

    fn submit_search(&mut self) {
        let query = self.search_input.trim().to_string();
        if query.is_empty() {
            return;
        }

        self.search_query = query.clone();
        let id = self.search_panel.begin();
        let Some(backend) = self.backend.clone() else {
            self.search_panel.complete(id, None);
            self.status_message = Some(ForgeError::GeminiNotConfigured.to_string());
            return;
        };
        let tx = self.async_tx.clone();
        self.status_message = Some(format!("Searching: {}", query));

        tokio::spawn(async move {
            let result = outcome("search", backend.search(&query).await);
            let _ = tx.send(AsyncMessage::SearchFinished { id, result }).await;
        });
    }

    fn warn_missing_backend(&mut self) {
        self.session.log(
            LineKind::Warning,
            "[AI] Gemini API key not configured. Run: forge config set gemini-key <KEY>",
        );
    }

    fn apply_suggestion(&mut self) {
        let Some(code) = self
            .refactor_panel
            .state()
            .result()
            .map(|s| s.refactored_code.clone())
        else {
            self.status_message = Some("No suggestion to apply".to_string());
            return;
        };
        self.session.apply_suggestion(&code);
        self.refactor_panel.reset();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Track exports
    // ─────────────────────────────────────────────────────────────────────────

    /// Export the suggestion if one is showing, otherwise the buffer
    fn export_refactor(&mut self) {
        let payload = match self.refactor_panel.state().result() {
            Some(s) => TrackPayload::refactor(Some(&s.explanation), &s.refactored_code, ACTIVE_FILE),
            None => TrackPayload::refactor(None, self.session.code(), ACTIVE_FILE),
        };
        self.export(payload);
    }

    fn export_finding(&mut self) {
        let Some(finding) = self
            .audit_panel
            .state()
            .result()
            .and_then(|a| a.vulnerabilities.get(self.audit_selection))
            .cloned()
        else {
            self.status_message = Some("No finding selected".to_string());
            return;
        };
        self.export(TrackPayload::vulnerability(ACTIVE_FILE, finding));
    }

    fn export_search(&mut self) {
        let Some(result) = self.search_panel.state().result() else {
            self.status_message = Some("No search result to export".to_string());
            return;
        };
        let payload =
            TrackPayload::search(&self.search_query, &result.synthesis, result.citations.clone());
        self.export(payload);
    }

    fn export(&mut self, payload: TrackPayload) {
        match track::push(&self.config.track_url, &payload) {
            Ok(url) => {
                self.status_message = Some(format!(
                    "Exported to {}",
                    url.host_str().unwrap_or("TrackCodex")
                ));
            }
            Err(e) => {
                tracing::warn!(error = %e, "track export failed");
                self.session
                    .log(LineKind::Error, format!("[ERROR] Export failed: {}", e));
            }
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockAiBackend;
    use crate::core::store::MemoryStore;
    use crate::panels::PanelState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_line(app: &mut App, line: &str) {
        for c in line.chars() {
            app.handle_key_event(key(KeyCode::Char(c)));
        }
        app.handle_key_event(key(KeyCode::Enter));
    }

    fn app_with(backend: Option<MockAiBackend>) -> App {
        let config = Config {
            format_delay_ms: 0,
            ..Config::default()
        };
        let backend = backend.map(|b| Arc::new(b) as Arc<dyn AiBackend>);
        App::new(config, MemoryStore::shared(), backend)
    }

    #[test]
    fn test_terminal_toggle_hides_pane() {
        let mut app = app_with(None);
        assert!(app.terminal_open);
        app.handle_key_event(ctrl('`'));
        assert!(!app.terminal_open);
        app.handle_key_event(ctrl('`'));
        assert!(app.terminal_open);
    }

    #[test]
    fn test_typed_command_runs_in_terminal() {
        let mut app = app_with(None);
        type_line(&mut app, "ls");
        let last = app.session.history().last().unwrap();
        assert_eq!(last.kind, LineKind::Output);
        assert!(last.content.contains("package.json"));
        assert_eq!(app.session.input(), "");
    }

    #[test]
    fn test_tab_completes_in_terminal() {
        let mut app = app_with(None);
        app.handle_key_event(key(KeyCode::Char('c')));
        app.handle_key_event(key(KeyCode::Char('l')));
        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.session.input(), "clear");
    }

    #[test]
    fn test_refactor_without_backend_is_no_result() {
        let mut app = app_with(None);
        type_line(&mut app, "refactor");
        assert_eq!(app.refactor_panel.state(), &PanelState::NoResult);
        assert_eq!(
            app.session.history().last().unwrap().kind,
            LineKind::Warning
        );
    }

    #[tokio::test]
    async fn test_refactor_result_can_be_applied() {
        let mut backend = MockAiBackend::new();
        backend.expect_suggest_refactor().times(1).returning(|_| {
            Ok(RefactorSuggestion {
                explanation: "Use a named handler".into(),
                refactored_code: "const Counter = () => null;".into(),
            })
        });
        let mut app = app_with(Some(backend));

        type_line(&mut app, "refactor");
        assert!(app.refactor_panel.state().is_pending());

        let msg = app.async_rx.recv().await.unwrap();
        app.handle_async_message(msg);
        assert!(app.refactor_panel.state().result().is_some());

        app.handle_key_event(key(KeyCode::Esc));
        app.handle_key_event(key(KeyCode::Char('y')));
        assert_eq!(app.session.code(), "const Counter = () => null;");
        assert_eq!(app.refactor_panel.state(), &PanelState::Idle);
    }

    #[tokio::test]
    async fn test_stale_refactor_result_is_dropped() {
        let mut app = app_with(None);
        let first = app.refactor_panel.begin();
        let _second = app.refactor_panel.begin();
        let lines = app.session.history().len();

        app.handle_async_message(AsyncMessage::RefactorFinished {
            id: first,
            suggestion: Some(RefactorSuggestion::default()),
        });

        assert!(app.refactor_panel.state().is_pending());
        assert_eq!(app.session.history().len(), lines);
    }

    #[tokio::test]
    async fn test_format_completes_through_channel() {
        let mut app = app_with(None);
        type_line(&mut app, "format");
        assert!(app.session.code().contains("\nconst [count"));

        let msg = app.async_rx.recv().await.unwrap();
        app.handle_async_message(msg);
        assert!(app.session.code().contains("  const [count,setCount]=useState(0);"));
        assert_eq!(
            app.session.history().last().unwrap().kind,
            LineKind::Success
        );
    }

    #[tokio::test]
    async fn test_audit_switches_to_audit_screen() {
        let mut backend = MockAiBackend::new();
        backend
            .expect_audit_security()
            .returning(|_, _| Ok(SecurityAudit::default()));
        let mut app = app_with(Some(backend));

        type_line(&mut app, "audit");
        assert_eq!(app.current_screen, Screen::Audit);

        let msg = app.async_rx.recv().await.unwrap();
        app.handle_async_message(msg);
        assert!(app
            .session
            .history()
            .last()
            .unwrap()
            .content
            .contains("No vulnerabilities"));
    }

    #[test]
    fn test_session_menu_saves_and_loads() {
        let mut app = app_with(None);
        app.handle_key_event(ctrl('s'));
        assert!(app.session.session_menu_open());

        app.handle_key_event(key(KeyCode::Char('n')));
        assert_eq!(app.session.saved_sessions().len(), 1);

        app.handle_key_event(key(KeyCode::Enter));
        assert!(!app.session.session_menu_open());
        assert!(app
            .session
            .history()
            .last()
            .unwrap()
            .content
            .starts_with("[SYSTEM] Loaded session: Session "));
    }

    #[test]
    fn test_search_screen_saves_queries() {
        let mut app = app_with(None);
        app.handle_key_event(key(KeyCode::Esc));
        app.handle_key_event(key(KeyCode::Char('s')));
        assert_eq!(app.current_screen, Screen::Search);

        for c in "rust async".chars() {
            app.handle_key_event(key(KeyCode::Char(c)));
        }
        app.handle_key_event(ctrl('s'));
        assert_eq!(app.saved_queries.list(), ["rust async"]);

        app.search_input.clear();
        app.handle_key_event(key(KeyCode::Down));
        assert_eq!(app.search_input, "rust async");

        app.handle_key_event(key(KeyCode::Enter));
        assert_eq!(app.search_panel.state(), &PanelState::NoResult);
    }

    #[test]
    fn test_resize_is_clamped() {
        let mut app = app_with(None);
        for _ in 0..100 {
            app.handle_key_event(KeyEvent::new(KeyCode::Up, KeyModifiers::CONTROL));
        }
        assert_eq!(app.terminal_height, MAX_TERMINAL_HEIGHT);
    }

    fn start_tab_cycle(app: &mut App) {
        app.handle_key_event(key(KeyCode::Char('f')));
        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.session.input(), "format");
    }

    #[test]
    fn test_resize_resets_tab_cycle() {
        let mut app = app_with(None);
        start_tab_cycle(&mut app);
        app.handle_key_event(KeyEvent::new(KeyCode::Up, KeyModifiers::CONTROL));
        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.session.input(), "format");

        app.handle_key_event(KeyEvent::new(KeyCode::Down, KeyModifiers::CONTROL));
        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.session.input(), "format");
    }

    #[test]
    fn test_toggle_resets_tab_cycle() {
        let mut app = app_with(None);
        start_tab_cycle(&mut app);
        app.handle_key_event(ctrl('`'));
        app.handle_key_event(ctrl('`'));
        assert!(app.terminal_open);
        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.session.input(), "format");
    }

    #[test]
    fn test_page_up_stops_at_scrollback_length() {
        let mut app = app_with(None);
        type_line(&mut app, "ls");
        for _ in 0..100 {
            app.handle_key_event(key(KeyCode::PageUp));
        }
        let len = app.session.history().len() as u16;
        assert_eq!(app.terminal_scroll, len);
        app.handle_key_event(key(KeyCode::PageDown));
        assert_eq!(app.terminal_scroll, len.saturating_sub(5));
    }
}
