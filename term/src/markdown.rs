//! Markdown reflow for help templates.
//!
//! Paragraphs, list items and headings are re-wrapped to the terminal width.
//! Code blocks keep their lines and are indented. Tables are laid out in
//! aligned columns. Styling is only emitted when color is requested.

use owo_colors::{OwoColorize, Style};
use pulldown_cmark::{Alignment, Event, Options, Parser, Tag, TagEnd};
use tracing::trace;
use unicode_width::UnicodeWidthStr;

use optree_core::MarkdownRenderer;

const CODE_INDENT: &str = "    ";
const QUOTE_PREFIX: &str = "> ";

/// [`MarkdownRenderer`] that parses with `pulldown-cmark` and reflows to the
/// terminal width.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermMarkdown;

impl MarkdownRenderer for TermMarkdown {
    fn render(&self, markdown: &str, color: bool, width: usize) -> String {
        let mut writer = Writer::new(color, width);
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        for event in Parser::new_ext(markdown, options) {
            writer.event(event);
        }
        writer.finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    heading: bool,
    strong: bool,
    emphasis: bool,
    strike: bool,
    code: bool,
    link: bool,
}

impl Flags {
    fn style(self) -> Style {
        let mut style = Style::new();
        if self.heading {
            style = style.cyan().bold();
        }
        if self.strong {
            style = style.bold();
        }
        if self.emphasis {
            style = style.italic();
        }
        if self.strike {
            style = style.strikethrough();
        }
        if self.code {
            style = style.yellow();
        }
        if self.link {
            style = style.blue().underline();
        }
        style
    }
}

enum Piece {
    Text(String, Flags),
    Break,
}

enum Token {
    Word(Vec<(String, Flags)>),
    Break,
}

struct ListState {
    next: Option<u64>,
}

#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
}

struct Writer {
    color: bool,
    width: usize,
    lines: Vec<String>,
    gap: bool,
    inline: Vec<Piece>,
    flags: Flags,
    links: Vec<String>,
    lists: Vec<ListState>,
    marker: Option<String>,
    quotes: usize,
    code: Option<String>,
    table: Option<TableState>,
}

impl Writer {
    fn new(color: bool, width: usize) -> Self {
        Self {
            color,
            width,
            lines: Vec::new(),
            gap: false,
            inline: Vec::new(),
            flags: Flags::default(),
            links: Vec::new(),
            lists: Vec::new(),
            marker: None,
            quotes: 0,
            code: None,
            table: None,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(text) => {
                let saved = self.flags;
                self.flags.code = true;
                self.text(&text);
                self.flags = saved;
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.inline.push(Piece::Break),
            Event::Rule => {
                self.flush_inline();
                let indent = self.indent();
                let fill = self.width.saturating_sub(indent.width()).max(1);
                self.emit(vec![format!("{indent}{}", "-".repeat(fill))]);
                self.gap = true;
            }
            Event::TaskListMarker(done) => self.text(if done { "[x] " } else { "[ ] " }),
            other => trace!(event = ?other, "Skipping markdown event"),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.flush_inline();
                self.flags.heading = true;
            }
            Tag::Paragraph => self.flush_inline(),
            Tag::BlockQuote(_) => {
                self.flush_inline();
                self.quotes += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush_inline();
                self.code = Some(String::new());
            }
            Tag::List(start) => {
                self.flush_inline();
                self.lists.push(ListState { next: start });
            }
            Tag::Item => {
                self.flush_inline();
                if let Some(list) = self.lists.last_mut() {
                    let marker = match list.next.as_mut() {
                        Some(n) => {
                            let marker = format!("{n}. ");
                            *n += 1;
                            marker
                        }
                        None => "* ".to_string(),
                    };
                    self.marker = Some(marker);
                }
            }
            Tag::Table(alignments) => {
                self.flush_inline();
                self.table = Some(TableState {
                    alignments,
                    ..TableState::default()
                });
            }
            Tag::Strong => self.flags.strong = true,
            Tag::Emphasis => self.flags.emphasis = true,
            Tag::Strikethrough => self.flags.strike = true,
            Tag::Link { dest_url, .. } => {
                self.flags.link = true;
                self.links.push(dest_url.to_string());
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush_inline();
                self.flags.heading = false;
                self.gap = true;
            }
            TagEnd::Paragraph => {
                self.flush_inline();
                self.gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.flush_inline();
                self.quotes = self.quotes.saturating_sub(1);
                self.gap = true;
            }
            TagEnd::CodeBlock => {
                let code = self.code.take().unwrap_or_default();
                let indent = format!("{}{CODE_INDENT}", self.indent());
                let lines = code
                    .trim_end_matches('\n')
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            return String::new();
                        }
                        if self.color {
                            format!("{indent}{}", line.yellow())
                        } else {
                            format!("{indent}{line}")
                        }
                    })
                    .collect();
                self.emit(lines);
                self.gap = true;
            }
            TagEnd::List(_) => {
                self.flush_inline();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.gap = true;
                }
            }
            TagEnd::Item => {
                self.flush_inline();
                self.marker = None;
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    let indent = self.indent();
                    let lines = layout_table(&table)
                        .into_iter()
                        .map(|line| format!("{indent}{line}"))
                        .collect();
                    self.emit(lines);
                    self.gap = true;
                }
            }
            TagEnd::Strong => self.flags.strong = false,
            TagEnd::Emphasis => self.flags.emphasis = false,
            TagEnd::Strikethrough => self.flags.strike = false,
            TagEnd::Link => {
                self.flags.link = false;
                if let Some(dest) = self.links.pop() {
                    if !self.link_text_is(&dest) {
                        self.text(&format!(" <{dest}>"));
                    }
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.push_str(text);
        } else if let Some(table) = self.table.as_mut() {
            table.cell.push_str(text);
        } else {
            self.inline.push(Piece::Text(text.to_string(), self.flags));
        }
    }

    fn link_text_is(&self, dest: &str) -> bool {
        matches!(self.inline.last(), Some(Piece::Text(text, _)) if text == dest)
    }

    fn indent(&self) -> String {
        let depth = self.lists.len().saturating_sub(1);
        format!("{}{}", QUOTE_PREFIX.repeat(self.quotes), "  ".repeat(depth))
    }

    fn flush_inline(&mut self) {
        if self.inline.is_empty() {
            return;
        }
        let pieces = std::mem::take(&mut self.inline);
        let indent = self.indent();
        let (first, rest) = match self.marker.take() {
            Some(marker) => {
                let hang = " ".repeat(marker.width());
                (format!("{indent}{marker}"), format!("{indent}{hang}"))
            }
            None if !self.lists.is_empty() => (format!("{indent}  "), format!("{indent}  ")),
            None => (indent.clone(), indent),
        };
        let available = self.width.saturating_sub(first.width()).max(1);
        let lines = self.wrap(&pieces, available);
        let lines = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let prefix = if i == 0 { &first } else { &rest };
                if line.is_empty() {
                    prefix.trim_end().to_string()
                } else {
                    format!("{prefix}{line}")
                }
            })
            .collect();
        self.emit(lines);
    }

    fn wrap(&self, pieces: &[Piece], available: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut used = 0;
        for token in tokenize(pieces) {
            match token {
                Token::Break => {
                    lines.push(std::mem::take(&mut line));
                    used = 0;
                }
                Token::Word(fragments) => {
                    let width: usize = fragments.iter().map(|(text, _)| text.width()).sum();
                    if used > 0 && used + 1 + width > available {
                        lines.push(std::mem::take(&mut line));
                        used = 0;
                    }
                    if used > 0 {
                        line.push(' ');
                        used += 1;
                    }
                    for (text, flags) in &fragments {
                        line.push_str(&self.paint(text, *flags));
                    }
                    used += width;
                }
            }
        }
        if !line.is_empty() || lines.is_empty() {
            lines.push(line);
        }
        lines
    }

    fn paint(&self, text: &str, flags: Flags) -> String {
        if self.color && flags != Flags::default() {
            text.style(flags.style()).to_string()
        } else {
            text.to_string()
        }
    }

    fn emit(&mut self, block: Vec<String>) {
        if block.is_empty() {
            return;
        }
        if self.gap && !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.gap = false;
        self.lines.extend(block);
    }

    fn finish(mut self) -> String {
        self.flush_inline();
        while self.lines.last().is_some_and(|line| line.is_empty()) {
            self.lines.pop();
        }
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

fn tokenize(pieces: &[Piece]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word: Vec<(String, Flags)> = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Break => {
                if !word.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                }
                tokens.push(Token::Break);
            }
            Piece::Text(text, flags) => {
                for ch in text.chars() {
                    if ch.is_whitespace() {
                        if !word.is_empty() {
                            tokens.push(Token::Word(std::mem::take(&mut word)));
                        }
                        continue;
                    }
                    match word.last_mut() {
                        Some((fragment, last)) if last == flags => fragment.push(ch),
                        _ => word.push((ch.to_string(), *flags)),
                    }
                }
            }
        }
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    tokens
}

fn layout_table(table: &TableState) -> Vec<String> {
    let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(c))
                .map(|cell| cell.width())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::new();
    for (r, row) in table.rows.iter().enumerate() {
        let cells: Vec<String> = (0..columns)
            .map(|c| {
                let cell = row.get(c).map(String::as_str).unwrap_or("");
                let alignment = table.alignments.get(c).copied().unwrap_or(Alignment::None);
                pad(cell, widths[c], alignment)
            })
            .collect();
        lines.push(cells.join(" | ").trim_end().to_string());
        if r == 0 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            lines.push(rule.join("-+-"));
        }
    }
    lines
}

fn pad(cell: &str, width: usize, alignment: Alignment) -> String {
    let fill = width.saturating_sub(cell.width());
    match alignment {
        Alignment::Right => format!("{}{cell}", " ".repeat(fill)),
        Alignment::Center => {
            let left = fill / 2;
            format!("{}{cell}{}", " ".repeat(left), " ".repeat(fill - left))
        }
        Alignment::Left | Alignment::None => format!("{cell}{}", " ".repeat(fill)),
    }
}
