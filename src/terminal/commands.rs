//! Shell command grammar

/// Every command name the shell recognizes, in `help` order
pub const COMMANDS: &[&str] = &[
    "ls", "help", "refactor", "clear", "git", "audit", "cat", "status", "format", "whoami",
    "version", "date", "forge", "track", "session",
];

/// Files in the simulated project
pub const KNOWN_FILES: &[&str] = &[
    "Managing State.tsx",
    "api.ts",
    "App.tsx",
    "index.tsx",
    "package.json",
    "styles.css",
    "README.md",
    "forge.config.json",
];

/// File shown in the editor buffer
pub const ACTIVE_FILE: &str = "Managing State.tsx";

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Ls,
    Help,
    Clear,
    Format,
    Refactor,
    Audit,
    Track,
    Session(SessionCommand),
    Cat(Option<String>),
    Whoami,
    Version,
    Git,
    Status,
    Date,
    Forge,
    Unknown(String),
}

/// `session` subcommands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Save(Option<String>),
    List,
    Load(String),
    Usage,
}

impl ShellCommand {
    /// Parse a trimmed, non-empty command line
    ///
    /// Tokens are split on single spaces, so repeated spaces yield empty
    /// tokens. The command word is case-insensitive; arguments are not.
    pub fn parse(line: &str) -> Self {
        let tokens: Vec<&str> = line.split(' ').collect();
        let command = tokens[0].to_lowercase();
        let rest = |from: usize| tokens.get(from..).map(|t| t.join(" ")).unwrap_or_default();

        match command.as_str() {
            "ls" => ShellCommand::Ls,
            "help" => ShellCommand::Help,
            "clear" => ShellCommand::Clear,
            "format" => ShellCommand::Format,
            "refactor" => ShellCommand::Refactor,
            "audit" => ShellCommand::Audit,
            "track" => ShellCommand::Track,
            "whoami" => ShellCommand::Whoami,
            "version" => ShellCommand::Version,
            "git" => ShellCommand::Git,
            "status" => ShellCommand::Status,
            "date" => ShellCommand::Date,
            "forge" => ShellCommand::Forge,
            "cat" => {
                let file = rest(1);
                ShellCommand::Cat((!file.is_empty()).then_some(file))
            }
            "session" => {
                let sub = tokens.get(1).map(|s| s.to_lowercase());
                let name = rest(2);
                ShellCommand::Session(match sub.as_deref() {
                    Some("save") => SessionCommand::Save((!name.is_empty()).then_some(name)),
                    Some("list") => SessionCommand::List,
                    Some("load") => SessionCommand::Load(name),
                    _ => SessionCommand::Usage,
                })
            }
            _ => ShellCommand::Unknown(command),
        }
    }
}

/// Match a `cat` argument against the simulated project files
///
/// The whole argument wins (file names may contain spaces); otherwise the
/// first word is tried, so trailing words are ignored.
pub fn resolve_file(arg: &str) -> Option<&'static str> {
    let find = |name: &str| KNOWN_FILES.iter().copied().find(|f| *f == name);
    find(arg).or_else(|| arg.split(' ').next().and_then(find))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_word_is_case_insensitive() {
        assert_eq!(ShellCommand::parse("LS"), ShellCommand::Ls);
        assert_eq!(ShellCommand::parse("Help me"), ShellCommand::Help);
    }

    #[test]
    fn test_cat_keeps_spaces_in_file_name() {
        assert_eq!(
            ShellCommand::parse("cat Managing State.tsx"),
            ShellCommand::Cat(Some("Managing State.tsx".to_string()))
        );
        assert_eq!(ShellCommand::parse("cat"), ShellCommand::Cat(None));
    }

    #[test]
    fn test_resolve_file_falls_back_to_first_word() {
        assert_eq!(resolve_file("Managing State.tsx"), Some("Managing State.tsx"));
        assert_eq!(resolve_file("package.json extra"), Some("package.json"));
        assert_eq!(resolve_file("nope.xyz package.json"), None);
    }

    #[test]
    fn test_session_subcommands() {
        assert_eq!(
            ShellCommand::parse("session save My Work"),
            ShellCommand::Session(SessionCommand::Save(Some("My Work".to_string())))
        );
        assert_eq!(
            ShellCommand::parse("session SAVE"),
            ShellCommand::Session(SessionCommand::Save(None))
        );
        assert_eq!(
            ShellCommand::parse("session list"),
            ShellCommand::Session(SessionCommand::List)
        );
        assert_eq!(
            ShellCommand::parse("session load Foo"),
            ShellCommand::Session(SessionCommand::Load("Foo".to_string()))
        );
        assert_eq!(
            ShellCommand::parse("session"),
            ShellCommand::Session(SessionCommand::Usage)
        );
    }

    #[test]
    fn test_unknown_command_is_lowercased() {
        assert_eq!(
            ShellCommand::parse("ZZZ now"),
            ShellCommand::Unknown("zzz".to_string())
        );
    }
}
