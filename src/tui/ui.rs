//! Main UI renderer

use once_cell::sync::Lazy;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use regex::Regex;

use crate::panels::PanelState;
use crate::terminal::commands::ACTIVE_FILE;
use crate::terminal::TerminalLine;
use crate::tui::app::{App, Screen};
use crate::tui::theme::Theme;

/// URLs, relative paths and known source file names in shell output
static LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://[^\s\]\)]+|(?:\./|~/)[\w./-]+|\b[\w-]+\.(?:tsx?|jsx?|json|css|md|toml|rs)\b")
        .unwrap()
});

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];
const PROMPT: &str = "forge@shell:~$ ";

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let terminal_height = if app.terminal_open {
        app.terminal_height
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),               // Header
            Constraint::Min(3),                  // Content
            Constraint::Length(terminal_height), // Shell pane
            Constraint::Length(3),               // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_content(frame, chunks[1], app);
    if app.terminal_open {
        render_terminal(frame, chunks[2], app);
    }
    render_status_bar(frame, chunks[3], app);

    if app.session.session_menu_open() {
        render_session_menu(frame, app);
    }

    if app.show_help {
        render_help_overlay(frame, app);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let screen_name = match app.current_screen {
        Screen::Workspace => "Workspace",
        Screen::Search => "Search",
        Screen::Audit => "Security Audit",
    };

    let title = format!(" forge-shell │ {} │ {} ", screen_name, ACTIVE_FILE);

    let header = Paragraph::new(title)
        .style(Theme::header())
        .block(Block::default().borders(Borders::BOTTOM));

    frame.render_widget(header, area);
}

fn render_content(frame: &mut Frame, area: Rect, app: &App) {
    match app.current_screen {
        Screen::Workspace => render_workspace(frame, area, app),
        Screen::Search => render_search(frame, area, app),
        Screen::Audit => render_audit(frame, area, app),
    }
}

fn spinner(app: &App) -> &'static str {
    SPINNER[(app.tick_counter % SPINNER.len() as u64) as usize]
}

// ─────────────────────────────────────────────────────────────────────────────
// Workspace
// ─────────────────────────────────────────────────────────────────────────────

fn render_workspace(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_code_buffer(frame, chunks[0], app);
    render_suggestion_panel(frame, chunks[1], app);
}

fn render_code_buffer(frame: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .session
        .code()
        .lines()
        .enumerate()
        .map(|(i, line)| {
            Line::from(vec![
                Span::styled(format!("{:>3} ", i + 1), Theme::muted()),
                Span::raw(line.to_string()),
            ])
        })
        .collect();

    let buffer = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" {} ", ACTIVE_FILE))
            .borders(Borders::ALL),
    );
    frame.render_widget(buffer, area);
}

fn render_suggestion_panel(frame: &mut Frame, area: Rect, app: &App) {
    let text: Vec<Line> = match app.refactor_panel.state() {
        PanelState::Idle => vec![Line::styled(
            "Press r (or run `refactor`) for an AI suggestion.",
            Theme::muted(),
        )],
        PanelState::Pending => vec![Line::from(format!("{} Thinking...", spinner(app)))],
        PanelState::NoResult => vec![Line::styled("No result.", Theme::muted())],
        PanelState::Ready(suggestion) => {
            let mut lines: Vec<Line> = suggestion
                .explanation
                .lines()
                .map(|l| Line::from(l.to_string()))
                .collect();
            lines.push(Line::from(""));
            lines.extend(
                suggestion
                    .refactored_code
                    .lines()
                    .map(|l| Line::styled(l.to_string(), Style::default().fg(Theme::SUCCESS))),
            );
            lines.push(Line::from(""));
            lines.push(Line::styled("y apply • x dismiss • t track", Theme::muted()));
            lines
        }
    };

    let panel = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" AI Suggestion ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Theme::SECONDARY)),
    );
    frame.render_widget(panel, area);
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

fn render_search(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let input = Paragraph::new(Line::from(vec![
        Span::raw(app.search_input.clone()),
        Span::styled("█", Style::default().fg(Theme::PRIMARY)),
    ]))
    .block(Block::default().title(" Query ").borders(Borders::ALL));
    frame.render_widget(input, rows[0]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[1]);

    let items: Vec<ListItem> = app
        .saved_queries
        .list()
        .iter()
        .map(|q| ListItem::new(q.clone()))
        .collect();
    let mut state = ListState::default().with_selected(app.saved_query_selection);
    let saved = List::new(items)
        .block(Block::default().title(" Saved ").borders(Borders::ALL))
        .highlight_style(Theme::selected());
    frame.render_stateful_widget(saved, cols[0], &mut state);

    let text: Vec<Line> = match app.search_panel.state() {
        PanelState::Idle => vec![Line::styled(
            "Type a query and press Enter.",
            Theme::muted(),
        )],
        PanelState::Pending => vec![Line::from(format!("{} Searching...", spinner(app)))],
        PanelState::NoResult => vec![Line::styled("No result.", Theme::muted())],
        PanelState::Ready(result) => {
            let mut lines: Vec<Line> = result
                .synthesis
                .lines()
                .map(|l| Line::from(l.to_string()))
                .collect();
            if !result.citations.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::styled(
                    "Sources",
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                for citation in &result.citations {
                    lines.push(Line::from(vec![
                        Span::styled(format!("{} ", citation.id), Theme::header()),
                        Span::raw(format!("{} ", citation.title)),
                        Span::styled(citation.url.clone(), Theme::link()),
                    ]));
                }
            }
            lines
        }
    };

    let answer = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(" Answer ").borders(Borders::ALL));
    frame.render_widget(answer, cols[1]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Audit
// ─────────────────────────────────────────────────────────────────────────────

fn render_audit(frame: &mut Frame, area: Rect, app: &App) {
    let audit = match app.audit_panel.state() {
        PanelState::Ready(audit) if !audit.vulnerabilities.is_empty() => audit,
        PanelState::Ready(_) => {
            return render_placeholder(frame, area, "Security Audit", "No vulnerabilities found.")
        }
        PanelState::Pending => {
            let message = format!("{} Auditing {}...", spinner(app), ACTIVE_FILE);
            return render_placeholder(frame, area, "Security Audit", &message);
        }
        PanelState::NoResult => return render_placeholder(frame, area, "Security Audit", "No result."),
        PanelState::Idle => {
            return render_placeholder(frame, area, "Security Audit", "Press a to audit the active buffer.")
        }
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let items: Vec<ListItem> = audit
        .vulnerabilities
        .iter()
        .map(|v| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<7}", v.severity.label().to_uppercase()),
                    Theme::severity(v.severity),
                ),
                Span::raw(format!("L{:<4} {}", v.line, v.kind)),
            ]))
        })
        .collect();
    let mut state = ListState::default().with_selected(Some(app.audit_selection));
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Findings ({}) ", audit.vulnerabilities.len()))
                .borders(Borders::ALL),
        )
        .highlight_style(Theme::selected());
    frame.render_stateful_widget(list, cols[0], &mut state);

    let detail: Vec<Line> = match audit.vulnerabilities.get(app.audit_selection) {
        Some(v) => vec![
            Line::styled(v.kind.clone(), Theme::severity(v.severity)),
            Line::styled(format!("line {}", v.line), Theme::muted()),
            Line::from(""),
            Line::from(v.description.clone()),
            Line::from(""),
            Line::styled("Fix", Style::default().add_modifier(Modifier::BOLD)),
            Line::from(v.fix.clone()),
            Line::from(""),
            Line::styled("t track this finding", Theme::muted()),
        ],
        None => Vec::new(),
    };
    let detail = Paragraph::new(detail)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(" Detail ").borders(Borders::ALL));
    frame.render_widget(detail, cols[1]);
}

fn render_placeholder(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(format!("\n  {}", message)).block(
        Block::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL),
    );
    frame.render_widget(paragraph, area);
}

// ─────────────────────────────────────────────────────────────────────────────
// Shell pane
// ─────────────────────────────────────────────────────────────────────────────

fn render_terminal(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Terminal ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Theme::PRIMARY));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = scrollback_lines(app.session.history());
    lines.push(input_line(app));

    // Stick to the bottom unless scrolled back
    let overflow = (lines.len() as u16).saturating_sub(inner.height);
    let offset = overflow.saturating_sub(app.terminal_scroll);

    frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), inner);
}

/// One rendered row per line of content; multi-line output keeps its breaks
fn scrollback_lines(history: &[TerminalLine]) -> Vec<Line<'static>> {
    let mut rows = Vec::new();
    for line in history {
        let (style, icon) = Theme::line(line.kind);
        for (i, part) in line.content.split('\n').enumerate() {
            let mut spans = if i == 0 {
                vec![
                    Span::styled(format!("{} ", line.timestamp), Theme::muted()),
                    Span::styled(format!("{} ", icon), style),
                ]
            } else {
                vec![Span::raw(" ".repeat(line.timestamp.len() + 3))]
            };
            spans.extend(highlight_spans(part, style));
            rows.push(Line::from(spans));
        }
    }
    rows
}

/// Split `text` into spans, styling links and paths
fn highlight_spans(text: &str, base: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut last = 0;
    for m in LINK_REGEX.find_iter(text) {
        if m.start() > last {
            spans.push(Span::styled(text[last..m.start()].to_string(), base));
        }
        spans.push(Span::styled(m.as_str().to_string(), Theme::link()));
        last = m.end();
    }
    if last < text.len() {
        spans.push(Span::styled(text[last..].to_string(), base));
    }
    spans
}

fn input_line(app: &App) -> Line<'static> {
    let mut spans = vec![
        Span::styled(PROMPT, Style::default().fg(Theme::SUCCESS)),
        Span::raw(app.session.input().to_string()),
        Span::styled("█", Style::default().fg(Theme::PRIMARY)),
    ];

    let completion = app.session.autocomplete();
    if completion.is_active() {
        spans.push(Span::styled(
            format!(
                "  Tab {}/{}",
                completion.index + 1,
                completion.matches.len()
            ),
            Theme::muted(),
        ));
    }
    Line::from(spans)
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlays
// ─────────────────────────────────────────────────────────────────────────────

fn popup_area(area: Rect, width_pct: u16, max_width: u16, height_pct: u16, max_height: u16) -> Rect {
    let width = (area.width * width_pct / 100).min(max_width);
    let height = (area.height * height_pct / 100).min(max_height);
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn render_session_menu(frame: &mut Frame, app: &App) {
    let area = popup_area(frame.area(), 60, 70, 60, 18);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Saved Sessions ")
        .title_bottom(" Enter load • n save • Esc close ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Theme::WARNING))
        .style(Style::default().bg(Color::Black));

    let sessions = app.session.saved_sessions();
    if sessions.is_empty() {
        let empty = Paragraph::new("\n  No saved sessions found.")
            .style(Theme::muted())
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = sessions
        .iter()
        .map(|s| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<28}", s.name)),
                Span::styled(s.local_timestamp(), Theme::muted()),
            ]))
        })
        .collect();
    let mut state = ListState::default().with_selected(Some(app.session_menu_selection));
    let list = List::new(items)
        .block(block)
        .highlight_style(Theme::selected());
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status_text = if let Some(msg) = &app.status_message {
        format!(" {}", msg)
    } else {
        let ai = if app.has_backend() {
            app.config.gemini_model.display_name()
        } else {
            "AI not configured"
        };
        format!(" {} │ Ctrl+` terminal │ ? help ", ai)
    };

    let status = Paragraph::new(status_text)
        .style(Theme::status_bar())
        .block(Block::default().borders(Borders::TOP));

    frame.render_widget(status, area);
}

fn render_help_overlay(frame: &mut Frame, app: &App) {
    let area = popup_area(frame.area(), 60, 60, 70, 20);
    frame.render_widget(Clear, area);

    let (title, help_lines) = help_content(app);

    let text: Vec<Line> = help_lines
        .into_iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("  {:14}", key), Style::default().fg(Theme::PRIMARY)),
                Span::raw(desc),
            ])
        })
        .collect();

    let help = Paragraph::new(text)
        .block(
            Block::default()
                .title(format!(" {} ", title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Theme::WARNING)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help, area);
}

/// Key bindings for whatever currently has focus
fn help_content(app: &App) -> (&'static str, Vec<(&'static str, &'static str)>) {
    if app.terminal_open {
        return (
            "Help - Terminal",
            vec![
                ("Enter", "Run command"),
                ("Tab", "Complete / cycle"),
                ("Ctrl+S", "Saved sessions"),
                ("Ctrl+↑ / ↓", "Resize pane"),
                ("PgUp / PgDn", "Scroll"),
                ("Esc / Ctrl+`", "Hide terminal"),
                ("Ctrl+C", "Quit"),
            ],
        );
    }

    match app.current_screen {
        Screen::Workspace => (
            "Help - Workspace",
            vec![
                ("r", "Refactor suggestion"),
                ("y / x", "Apply / dismiss suggestion"),
                ("a", "Security audit"),
                ("f", "Format buffer"),
                ("t", "Track export"),
                ("s", "Search"),
                ("v", "View audit"),
                ("Ctrl+`", "Show terminal"),
                ("q", "Quit"),
            ],
        ),
        Screen::Search => (
            "Help - Search",
            vec![
                ("Enter", "Search"),
                ("↑ / ↓", "Recall saved query"),
                ("Ctrl+S", "Save query"),
                ("Ctrl+D", "Remove saved query"),
                ("Ctrl+X", "Clear saved queries"),
                ("Ctrl+T", "Track answer"),
                ("Esc", "Back"),
            ],
        ),
        Screen::Audit => (
            "Help - Security Audit",
            vec![
                ("j / ↓", "Next finding"),
                ("k / ↑", "Previous finding"),
                ("a", "Re-run audit"),
                ("t", "Track finding"),
                ("Esc", "Back"),
            ],
        ),
    }
}
