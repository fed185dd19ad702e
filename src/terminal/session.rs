//! Terminal session controller

use chrono::Local;
use serde_json::json;

use crate::core::store::SharedStore;
use crate::terminal::autocomplete::AutocompleteState;
use crate::terminal::commands::{resolve_file, SessionCommand, ShellCommand, ACTIVE_FILE, COMMANDS, KNOWN_FILES};
use crate::terminal::sessions::{SavedSession, SessionStore};
use crate::terminal::{LineKind, TerminalLine};

/// Sample component loaded into a fresh editor buffer
pub const INITIAL_CODE: &str = r#"import React, { useState, useEffect } from 'react';

const Counter = () => {
const [count,setCount]=useState(0);

useEffect(()=>{
console.log("Mounted");
},[]);

return (
<div onClick={()=>setCount(c=>c+1)}>
Count: {count}
</div>
);
};

export default Counter;"#;

/// Work a command hands back to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    /// Run the formatter on `code`, then call [`TerminalSession::complete_format`]
    Format { code: String },
    /// Ask the AI backend for a refactor of `code`
    Refactor { code: String },
    /// Ask the AI backend to audit the active buffer
    Audit { file_name: String, code: String },
    /// Export the current buffer (or suggestion) to TrackCodex
    Track,
}

/// One terminal buffer with its command interpreter and snapshots
pub struct TerminalSession {
    history: Vec<TerminalLine>,
    input: String,
    autocomplete: AutocompleteState,
    code: String,
    sessions: SessionStore,
    session_menu_open: bool,
}

impl TerminalSession {
    /// New session with the startup banner; saved sessions load from `store`
    pub fn new(store: SharedStore) -> Self {
        let history = vec![
            TerminalLine::new(
                LineKind::Success,
                format!(
                    "[SUCCESS] Forge Shell v{} (stable) - AI Kernel Initialized",
                    env!("CARGO_PKG_VERSION")
                ),
            ),
            TerminalLine::new(
                LineKind::Info,
                "[SYSTEM] Connected to local node: 127.0.0.1:11434 at https://forge.local/api",
            ),
            TerminalLine::new(LineKind::Info, "[SYSTEM] config path: ~/.forge/config.toml"),
            TerminalLine::new(LineKind::Info, "Type \"help\" for a list of available commands."),
        ];

        Self {
            history,
            input: String::new(),
            autocomplete: AutocompleteState::default(),
            code: INITIAL_CODE.to_string(),
            sessions: SessionStore::load(store),
            session_menu_open: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read-only views
    // ─────────────────────────────────────────────────────────────────────────

    pub fn history(&self) -> &[TerminalLine] {
        &self.history
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn autocomplete(&self) -> &AutocompleteState {
        &self.autocomplete
    }

    pub fn saved_sessions(&self) -> &[SavedSession] {
        self.sessions.list()
    }

    pub fn session_menu_open(&self) -> bool {
        self.session_menu_open
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input line editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Type a character; ends any Tab cycle
    pub fn insert_char(&mut self, c: char) {
        self.on_other_key();
        self.input.push(c);
    }

    /// Delete the last character; ends any Tab cycle
    pub fn backspace(&mut self) {
        self.on_other_key();
        self.input.pop();
    }

    /// Any key other than Tab drops the candidate set
    pub fn on_other_key(&mut self) {
        self.autocomplete.clear();
    }

    /// Tab: complete or cycle the last token of the input line
    pub fn tab(&mut self) {
        self.input = self.autocomplete.complete(&self.input);
    }

    /// Complete `current` and return the new input line
    pub fn autocomplete_input(&mut self, current: &str) -> String {
        self.input = self.autocomplete.complete(current);
        self.input.clone()
    }

    /// Enter: submit the input line
    pub fn submit_input(&mut self) -> Vec<SessionEffect> {
        let raw = std::mem::take(&mut self.input);
        self.submit(&raw)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Command interpreter
    // ─────────────────────────────────────────────────────────────────────────

    /// Interpret one command line
    ///
    /// Blank input is ignored. Otherwise the trimmed line is echoed as an
    /// `input` line before any command output, and the input line and Tab
    /// state are reset afterwards.
    pub fn submit(&mut self, raw: &str) -> Vec<SessionEffect> {
        let line = raw.trim();
        if line.is_empty() {
            return Vec::new();
        }

        // Snapshots taken by `session save` exclude the command's own echo
        let before_echo = self.history.len();
        self.push(LineKind::Input, line);

        let command = ShellCommand::parse(line);
        tracing::debug!(?command, "terminal command");

        let effects = self.dispatch(command, before_echo);

        self.input.clear();
        self.autocomplete.clear();
        effects
    }

    fn dispatch(&mut self, command: ShellCommand, before_echo: usize) -> Vec<SessionEffect> {
        match command {
            ShellCommand::Ls => self.push(LineKind::Output, KNOWN_FILES.join("  ")),
            ShellCommand::Help => self.push(
                LineKind::Info,
                format!("[HELP] Available commands: {}", COMMANDS.join(", ")),
            ),
            ShellCommand::Clear => self.history.clear(),
            ShellCommand::Format => {
                return vec![SessionEffect::Format {
                    code: self.code.clone(),
                }]
            }
            ShellCommand::Refactor => {
                self.push(LineKind::Info, "[AI] Initiating Gemini Reasoner...");
                return vec![SessionEffect::Refactor {
                    code: self.code.clone(),
                }];
            }
            ShellCommand::Audit => {
                self.push(
                    LineKind::Info,
                    format!("[AI] Auditing {} for vulnerabilities...", ACTIVE_FILE),
                );
                return vec![SessionEffect::Audit {
                    file_name: ACTIVE_FILE.to_string(),
                    code: self.code.clone(),
                }];
            }
            ShellCommand::Track => {
                self.push(
                    LineKind::Success,
                    "[SYSTEM] Redirecting to https://trackcodex.workspace...",
                );
                return vec![SessionEffect::Track];
            }
            ShellCommand::Session(sub) => self.dispatch_session(sub, before_echo),
            ShellCommand::Cat(file) => match file.as_deref().and_then(resolve_file) {
                Some(name) => {
                    self.push(LineKind::Output, format!("[FS] Reading ./src/{}...", name))
                }
                None => self.push(
                    LineKind::Error,
                    format!(
                        "[FS_ERROR] File not found \"{}\"",
                        file.as_deref().unwrap_or("undefined")
                    ),
                ),
            },
            ShellCommand::Whoami => self.push(LineKind::Output, "forge_user_0x42"),
            ShellCommand::Version => self.push(
                LineKind::Success,
                format!(
                    "{{ \"core\": \"{}\", \"engine\": \"gemini\", \"license\": \"MIT\" }}",
                    env!("CARGO_PKG_VERSION")
                ),
            ),
            ShellCommand::Git => self.push(
                LineKind::Output,
                "On branch main\nYour branch is up to date with 'origin/main'.\nmodified: ./src/Managing State.tsx",
            ),
            ShellCommand::Status => self.push(
                LineKind::Output,
                "GPU 42% | NPU 18% | VRAM 6.2/8GB | CPU 12% | RAM 3.2GB | TEMP 54C",
            ),
            ShellCommand::Date => self.push(
                LineKind::Output,
                Local::now().format("%a %b %e %H:%M:%S %Y").to_string(),
            ),
            ShellCommand::Forge => self.push(
                LineKind::Info,
                "[FORGE] Local engine online at 127.0.0.1:11434 (GPU-accelerated)",
            ),
            ShellCommand::Unknown(name) => self.push(
                LineKind::Error,
                format!("[SHELL] Command not found: {}", name),
            ),
        }

        Vec::new()
    }

    fn dispatch_session(&mut self, command: SessionCommand, before_echo: usize) {
        match command {
            SessionCommand::Save(name) => {
                let name = name.unwrap_or_else(default_session_name);
                let snapshot = self.history[..before_echo].to_vec();
                let saved = self.sessions.save(&name, &snapshot, &self.code).name.clone();
                let reply = json!({
                    "status": "ok",
                    "action": "save",
                    "name": saved,
                    "path": "~/.forge/sessions/",
                });
                self.push(LineKind::Success, reply.to_string());
            }
            SessionCommand::List => {
                let listing = if self.sessions.is_empty() {
                    "No saved sessions found.".to_string()
                } else {
                    self.sessions
                        .list()
                        .iter()
                        .map(|s| format!("[{}] - {}", s.name, s.local_timestamp()))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                self.push(LineKind::Output, listing);
            }
            SessionCommand::Load(name) => {
                if !self.load_session(&name) {
                    self.push(
                        LineKind::Error,
                        format!("[ERROR] Session not found: {}", name),
                    );
                }
            }
            SessionCommand::Usage => {
                self.push(LineKind::Info, "[USAGE] session <save|list|load> [name]")
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session snapshots
    // ─────────────────────────────────────────────────────────────────────────

    /// Save the current history and code; returns the saved name
    pub fn save_session(&mut self, name: Option<&str>) -> String {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(default_session_name);
        self.sessions.save(&name, &self.history, &self.code).name.clone()
    }

    /// Replace history and code with the named snapshot
    ///
    /// Returns false when no session has that name.
    pub fn load_session(&mut self, name: &str) -> bool {
        let Some(session) = self.sessions.find(name) else {
            return false;
        };

        self.history = session.history.clone();
        self.code = session.code.clone();
        let loaded = session.name.clone();
        self.session_menu_open = false;
        self.push(LineKind::Info, format!("[SYSTEM] Loaded session: {}", loaded));
        true
    }

    pub fn toggle_session_menu(&mut self) {
        self.session_menu_open = !self.session_menu_open;
    }

    pub fn close_session_menu(&mut self) {
        self.session_menu_open = false;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Async completions and buffer updates
    // ─────────────────────────────────────────────────────────────────────────

    /// Formatter finished: replace the buffer and report it
    pub fn complete_format(&mut self, formatted: String) {
        self.code = formatted;
        self.push(
            LineKind::Success,
            "[SUCCESS] Active buffer formatted successfully.",
        );
    }

    /// Replace the code buffer, e.g. when applying a suggestion
    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    /// Accept a refactor suggestion into the buffer
    pub fn apply_suggestion(&mut self, refactored_code: &str) {
        self.set_code(refactored_code);
        self.push(LineKind::Success, "[AI] Refactor applied to active buffer.");
    }

    /// Append a line on behalf of the controller
    pub fn log(&mut self, kind: LineKind, content: impl Into<String>) {
        self.push(kind, content);
    }

    fn push(&mut self, kind: LineKind, content: impl Into<String>) {
        self.history.push(TerminalLine::new(kind, content));
    }
}

fn default_session_name() -> String {
    format!("Session {}", Local::now().format("%H:%M:%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use crate::terminal::sessions::MAX_SAVED_SESSIONS;

    fn session() -> TerminalSession {
        TerminalSession::new(MemoryStore::shared())
    }

    fn kinds_after(session: &TerminalSession, start: usize) -> Vec<LineKind> {
        session.history()[start..].iter().map(|l| l.kind).collect()
    }

    #[test]
    fn test_blank_input_is_noop() {
        let mut s = session();
        let before = s.history().len();
        assert!(s.submit("").is_empty());
        assert!(s.submit("   ").is_empty());
        assert_eq!(s.history().len(), before);
    }

    #[test]
    fn test_input_echo_precedes_output() {
        let mut s = session();
        let start = s.history().len();
        s.submit("  ls  ");

        assert_eq!(kinds_after(&s, start), vec![LineKind::Input, LineKind::Output]);
        assert_eq!(s.history()[start].content, "ls");
        assert_eq!(s.history()[start + 1].content, KNOWN_FILES.join("  "));
    }

    #[test]
    fn test_help_lists_every_command() {
        let mut s = session();
        s.submit("help");
        let last = s.history().last().unwrap();
        assert_eq!(last.kind, LineKind::Info);
        for name in COMMANDS {
            assert!(last.content.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_clear_empties_history() {
        let mut s = session();
        s.submit("ls");
        s.submit("clear");
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_unknown_command_names_token() {
        let mut s = session();
        s.submit("zzz");
        let last = s.history().last().unwrap();
        assert_eq!(last.kind, LineKind::Error);
        assert!(last.content.contains("zzz"));
    }

    #[test]
    fn test_cat_known_and_missing_files() {
        let mut s = session();
        s.submit("cat package.json");
        assert_eq!(s.history().last().unwrap().kind, LineKind::Output);

        s.submit("cat nope.xyz");
        let last = s.history().last().unwrap();
        assert_eq!(last.kind, LineKind::Error);
        assert!(last.content.contains("nope.xyz"));

        s.submit("cat");
        assert_eq!(s.history().last().unwrap().kind, LineKind::Error);

        s.submit("cat package.json extra");
        let last = s.history().last().unwrap();
        assert_eq!(last.kind, LineKind::Output);
        assert!(last.content.contains("./src/package.json"));
    }

    #[test]
    fn test_format_defers_success_line() {
        let mut s = session();
        let start = s.history().len();
        let effects = s.submit("format");

        assert_eq!(
            effects,
            vec![SessionEffect::Format {
                code: INITIAL_CODE.to_string()
            }]
        );
        assert_eq!(kinds_after(&s, start), vec![LineKind::Input]);

        s.complete_format("formatted".to_string());
        assert_eq!(s.code(), "formatted");
        assert_eq!(s.history().last().unwrap().kind, LineKind::Success);
    }

    #[test]
    fn test_refactor_logs_info_and_returns_effect() {
        let mut s = session();
        let start = s.history().len();
        let effects = s.submit("refactor");
        assert!(matches!(effects.as_slice(), [SessionEffect::Refactor { .. }]));
        assert_eq!(kinds_after(&s, start), vec![LineKind::Input, LineKind::Info]);
    }

    #[test]
    fn test_track_and_audit_effects() {
        let mut s = session();
        assert_eq!(s.submit("track"), vec![SessionEffect::Track]);
        assert_eq!(s.history().last().unwrap().kind, LineKind::Success);

        match s.submit("audit").as_slice() {
            [SessionEffect::Audit { file_name, .. }] => assert_eq!(file_name, ACTIVE_FILE),
            other => panic!("unexpected effects {:?}", other),
        }
    }

    #[test]
    fn test_save_then_load_restores_code_and_history() {
        let mut s = session();
        s.submit("whoami");
        s.set_code("const saved = true;");
        let snapshot = s.history().to_vec();

        s.submit("session save Foo");
        let reply = &s.history().last().unwrap().content;
        assert!(reply.contains("\"name\":\"Foo\""));

        s.submit("clear");
        s.set_code("changed");
        s.submit("session load Foo");

        assert_eq!(s.code(), "const saved = true;");
        assert_eq!(&s.history()[..snapshot.len()], snapshot.as_slice());
        let last = s.history().last().unwrap();
        assert_eq!(last.kind, LineKind::Info);
        assert!(last.content.contains("Foo"));
        assert_eq!(s.history().len(), snapshot.len() + 1);
    }

    #[test]
    fn test_load_missing_session_is_error() {
        let mut s = session();
        s.submit("session load Ghost");
        let last = s.history().last().unwrap();
        assert_eq!(last.kind, LineKind::Error);
        assert!(last.content.contains("Ghost"));
    }

    #[test]
    fn test_eleventh_save_drops_oldest() {
        let mut s = session();
        for i in 0..=MAX_SAVED_SESSIONS {
            s.submit(&format!("session save s{}", i));
        }
        let names: Vec<&str> = s.saved_sessions().iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names.len(), MAX_SAVED_SESSIONS);
        assert_eq!(names[0], "s10");
        assert!(!names.contains(&"s0"));
    }

    #[test]
    fn test_session_list_placeholder_and_entries() {
        let mut s = session();
        s.submit("session list");
        assert_eq!(s.history().last().unwrap().content, "No saved sessions found.");

        s.submit("session save Alpha");
        s.submit("session list");
        assert!(s.history().last().unwrap().content.starts_with("[Alpha] - "));
    }

    #[test]
    fn test_sessions_shared_through_store() {
        let store = MemoryStore::shared();
        let mut first = TerminalSession::new(store.clone());
        first.set_code("persisted");
        first.submit("session save Keep");

        let mut second = TerminalSession::new(store);
        second.submit("session load Keep");
        assert_eq!(second.code(), "persisted");
    }

    #[test]
    fn test_load_closes_session_menu() {
        let mut s = session();
        s.save_session(Some("Menu"));
        s.toggle_session_menu();
        assert!(s.session_menu_open());
        assert!(s.load_session("Menu"));
        assert!(!s.session_menu_open());
    }

    #[test]
    fn test_tab_then_keypress_resets_cycle() {
        let mut s = session();
        s.insert_char('f');
        s.tab();
        assert_eq!(s.input(), "format");
        s.tab();
        assert_eq!(s.input(), "forge");

        s.backspace();
        assert!(!s.autocomplete().is_active());
        assert_eq!(s.input(), "forg");
    }

    #[test]
    fn test_submit_clears_input_and_completion() {
        let mut s = session();
        assert_eq!(s.autocomplete_input("he"), "help");
        s.submit_input();
        assert_eq!(s.input(), "");
        assert!(!s.autocomplete().is_active());
        assert_eq!(s.history().last().unwrap().kind, LineKind::Info);
    }

    #[test]
    fn test_apply_suggestion_replaces_buffer() {
        let mut s = session();
        s.apply_suggestion("const A = 1;");
        assert_eq!(s.code(), "const A = 1;");
        assert_eq!(s.history().last().unwrap().kind, LineKind::Success);
    }
}
