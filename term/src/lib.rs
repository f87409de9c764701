//! Terminal collaborators for `optree-core` help output.
//!
//! [`TermMarkdown`] reflows help templates with `pulldown-cmark` and colors
//! them with `owo-colors`; [`CrosstermTerminal`] answers terminal questions
//! through `crossterm`. [`term_context`] wires both into a
//! [`ContextBuilder`].
//!
//! ```no_run
//! use optree_core::{CommandSpec, run_with};
//!
//! #[derive(Default)]
//! struct App;
//!
//! let mut app = CommandSpec::<App>::new().with_handler(|_, _| 0);
//! let code = run_with(&mut app, optree_term::term_context().build());
//! # let _ = code;
//! ```

mod markdown;
mod terminal;

pub use markdown::TermMarkdown;
pub use terminal::CrosstermTerminal;

use optree_core::{Context, ContextBuilder};

/// Context builder using [`TermMarkdown`] and [`CrosstermTerminal`], with
/// process streams and environment.
pub fn term_context() -> ContextBuilder {
    Context::builder()
        .markdown(TermMarkdown)
        .terminal(CrosstermTerminal::new())
}
