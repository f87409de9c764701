//! Collaborators the framework talks to: the environment, the terminal, and
//! the help renderers.
//!
//! Every collaborator is a trait so tests and embedders can substitute their
//! own. The default implementations here are deliberately plain;
//! `optree-term` provides richer terminal renderers.

use std::collections::HashMap;
use std::io::IsTerminal;

use crate::align::{AlignOptions, Row};

/// Source of environment variables for `env:` defaults.
pub trait EnvSource {
    /// Returns the value of `name`, or `None` if unset.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnv;

impl EnvSource for StdEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment backed by a map (for testing).
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    vars: HashMap<String, String>,
}

impl MockEnv {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an environment from key-value pairs.
    pub fn from_pairs<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Sets a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }
}

impl EnvSource for MockEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Terminal facts used for `terminal` defaults, color and layout.
pub trait Terminal {
    /// Returns `true` if standard output is attached to a terminal.
    fn stdout_is_terminal(&self) -> bool;

    /// Terminal width in columns.
    fn width(&self) -> usize;
}

/// Width used when the terminal size is unknown.
pub const DEFAULT_WIDTH: usize = 80;

/// Terminal detection via [`std::io::IsTerminal`]; width from `$COLUMNS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdTerminal;

impl Terminal for StdTerminal {
    fn stdout_is_terminal(&self) -> bool {
        std::io::stdout().is_terminal()
    }

    fn width(&self) -> usize {
        std::env::var("COLUMNS")
            .ok()
            .and_then(|columns| columns.trim().parse().ok())
            .filter(|&columns: &usize| columns > 0)
            .unwrap_or(DEFAULT_WIDTH)
    }
}

/// Terminal with fixed answers (for testing).
#[derive(Debug, Clone, Copy)]
pub struct FixedTerminal {
    pub is_terminal: bool,
    pub width: usize,
}

impl Terminal for FixedTerminal {
    fn stdout_is_terminal(&self) -> bool {
        self.is_terminal
    }

    fn width(&self) -> usize {
        self.width
    }
}

/// Renders the Markdown part of a help document to terminal text.
pub trait MarkdownRenderer {
    /// Renders `markdown`, reflowing to `width` and coloring when `color`.
    fn render(&self, markdown: &str, color: bool, width: usize) -> String;
}

/// Passes Markdown through untouched, trimming surrounding blank lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainMarkdown;

impl MarkdownRenderer for PlainMarkdown {
    fn render(&self, markdown: &str, _color: bool, _width: usize) -> String {
        let trimmed = markdown.trim_matches('\n');
        if trimmed.is_empty() {
            return String::new();
        }
        format!("{trimmed}\n")
    }
}

/// Lays out table rows in columns.
pub trait TableAligner {
    /// Renders `rows` using the column layout in `options`.
    fn align(&self, rows: &[Row], options: &AlignOptions) -> String;
}
