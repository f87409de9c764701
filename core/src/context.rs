//! Per-invocation context threaded through every command level.
//!
//! A [`Context`] owns the output streams and collaborators for one
//! top-level run and memoizes terminal detection so standard output is
//! probed at most once, however many options and levels ask.
//!
//! # Examples
//!
//! ```
//! use optree_core::{Context, FixedTerminal, MockEnv};
//!
//! let mut ctx = Context::builder()
//!     .env(MockEnv::from_pairs([("COUNT", "5")]))
//!     .terminal(FixedTerminal { is_terminal: false, width: 100 })
//!     .stdout(Vec::new())
//!     .build();
//! assert_eq!(ctx.env().get("COUNT").as_deref(), Some("5"));
//! assert!(!ctx.is_terminal());
//! assert_eq!(ctx.width(), 100);
//! ```

use std::cell::Cell;
use std::io::{self, Write};

use crate::align::ColumnAligner;
use crate::console::{
    EnvSource, MarkdownRenderer, PlainMarkdown, StdEnv, StdTerminal, TableAligner, Terminal,
};
use crate::error::UsageError;

/// Streams, environment, terminal and renderers for one run.
pub struct Context {
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
    env: Box<dyn EnvSource>,
    terminal: Box<dyn Terminal>,
    markdown: Box<dyn MarkdownRenderer>,
    aligner: Box<dyn TableAligner>,
    tty: Cell<Option<bool>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Context {
    /// Returns a builder preloaded with the process streams and the plain
    /// collaborators.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// Standard output.
    pub fn stdout(&mut self) -> &mut dyn Write {
        self.stdout.as_mut()
    }

    /// Standard error.
    pub fn stderr(&mut self) -> &mut dyn Write {
        self.stderr.as_mut()
    }

    /// Environment used by `env:` defaults.
    pub fn env(&self) -> &dyn EnvSource {
        self.env.as_ref()
    }

    /// Whether standard output is a terminal, probed once per context.
    pub fn is_terminal(&self) -> bool {
        if let Some(tty) = self.tty.get() {
            return tty;
        }
        let tty = self.terminal.stdout_is_terminal();
        self.tty.set(Some(tty));
        tty
    }

    /// Terminal width in columns.
    pub fn width(&self) -> usize {
        self.terminal.width()
    }

    pub(crate) fn markdown(&self) -> &dyn MarkdownRenderer {
        self.markdown.as_ref()
    }

    pub(crate) fn aligner(&self) -> &dyn TableAligner {
        self.aligner.as_ref()
    }

    /// Writes a diagnostic line to standard error.
    pub(crate) fn report(&mut self, err: &UsageError) {
        let _ = writeln!(self.stderr, "{err}");
    }
}

/// Builder for [`Context`].
pub struct ContextBuilder {
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
    env: Box<dyn EnvSource>,
    terminal: Box<dyn Terminal>,
    markdown: Box<dyn MarkdownRenderer>,
    aligner: Box<dyn TableAligner>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    /// Process streams, [`StdEnv`], [`StdTerminal`], [`PlainMarkdown`] and
    /// [`ColumnAligner`].
    pub fn new() -> Self {
        Self {
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
            env: Box::new(StdEnv),
            terminal: Box::new(StdTerminal),
            markdown: Box::new(PlainMarkdown),
            aligner: Box::new(ColumnAligner),
        }
    }

    /// Replaces standard output.
    pub fn stdout(mut self, stdout: impl Write + 'static) -> Self {
        self.stdout = Box::new(stdout);
        self
    }

    /// Replaces standard error.
    pub fn stderr(mut self, stderr: impl Write + 'static) -> Self {
        self.stderr = Box::new(stderr);
        self
    }

    /// Replaces the environment source.
    pub fn env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Replaces terminal detection.
    pub fn terminal(mut self, terminal: impl Terminal + 'static) -> Self {
        self.terminal = Box::new(terminal);
        self
    }

    /// Replaces the Markdown renderer.
    pub fn markdown(mut self, markdown: impl MarkdownRenderer + 'static) -> Self {
        self.markdown = Box::new(markdown);
        self
    }

    /// Replaces the table aligner.
    pub fn aligner(mut self, aligner: impl TableAligner + 'static) -> Self {
        self.aligner = Box::new(aligner);
        self
    }

    /// Builds the context.
    pub fn build(self) -> Context {
        Context {
            stdout: self.stdout,
            stderr: self.stderr,
            env: self.env,
            terminal: self.terminal,
            markdown: self.markdown,
            aligner: self.aligner,
            tty: Cell::new(None),
        }
    }
}

/// Cloneable in-memory writer for capturing output.
///
/// ```
/// use std::io::Write;
/// use optree_core::SharedBuffer;
///
/// let buffer = SharedBuffer::new();
/// let mut writer = buffer.clone();
/// write!(writer, "hello").unwrap();
/// assert_eq!(buffer.contents(), "hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: std::rc::Rc<std::cell::RefCell<Vec<u8>>>,
}

impl SharedBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
