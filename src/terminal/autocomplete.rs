//! Tab completion for the shell input line

use crate::terminal::commands::{COMMANDS, KNOWN_FILES};

/// Candidate set for the current Tab cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutocompleteState {
    /// Candidates for the last token
    pub matches: Vec<String>,
    /// Position of the candidate currently in the input
    pub index: usize,
}

impl AutocompleteState {
    /// Whether a Tab cycle is in progress
    pub fn is_active(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Candidate currently substituted into the input
    pub fn selected(&self) -> Option<&str> {
        self.matches.get(self.index).map(String::as_str)
    }

    /// Forget the candidate set
    pub fn clear(&mut self) {
        self.matches.clear();
        self.index = 0;
    }

    /// Handle a Tab press on `input` and return the new input line
    ///
    /// Repeated Tabs rotate through the candidates. When nothing matches the
    /// input comes back unchanged.
    pub fn complete(&mut self, input: &str) -> String {
        let parts: Vec<&str> = input.split(' ').collect();
        let last = parts.last().copied().unwrap_or_default();

        if self.is_active() && self.selected() == Some(last) {
            self.index = (self.index + 1) % self.matches.len();
            return self.substitute(&parts);
        }

        let needle = last.to_lowercase();
        let matches: Vec<String> = if parts.len() == 1 {
            if needle.is_empty() {
                Vec::new()
            } else {
                prefix_matches(COMMANDS, &needle)
            }
        } else {
            prefix_matches(KNOWN_FILES, &needle)
        };

        if matches.is_empty() {
            return input.to_string();
        }

        self.matches = matches;
        self.index = 0;
        self.substitute(&parts)
    }

    fn substitute(&self, parts: &[&str]) -> String {
        let mut out: Vec<&str> = parts.to_vec();
        if let (Some(last), Some(candidate)) = (out.last_mut(), self.selected()) {
            *last = candidate;
        }
        out.join(" ")
    }
}

fn prefix_matches(candidates: &[&str], needle: &str) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| c.to_lowercase().starts_with(needle))
        .map(|c| c.to_string())
        .collect()
}
