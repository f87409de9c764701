//! Help document assembly.
//!
//! A document is the rendered help template followed by an `Options:` table
//! and a `Subcommands:` table. The template goes through the context's
//! [`MarkdownRenderer`](crate::MarkdownRenderer); both tables go through its
//! [`TableAligner`](crate::TableAligner).

use unicode_width::UnicodeWidthStr;

use crate::align::{AlignOptions, Row};
use crate::context::Context;
use crate::frame::Frame;
use crate::table::{Descriptor, OptionTable};
use crate::types::{OptionKind, Role};

/// Narrowest help column the tables are laid out with.
const MIN_HELP_WIDTH: usize = 20;

/// Multi-alias boolean options whose joined aliases are shorter than this
/// share a single row.
const SHORT_ALIAS_LIST: usize = 15;

/// Inputs for one level's help document.
pub(crate) struct HelpPage<'a, T> {
    /// Help template with the invocation path already substituted.
    pub(crate) intro: &'a str,
    pub(crate) table: &'a OptionTable<T>,
    /// Visible subcommand names and summaries, sorted by name.
    pub(crate) subcommands: &'a [(String, String)],
}

impl<T: 'static> HelpPage<'_, T> {
    pub(crate) fn render(&self, ctx: &Context, color: bool) -> String {
        let width = ctx.width();
        let max_alias = self.table.max_alias_width();
        let mut out = ctx.markdown().render(self.intro, color, width);

        let rows = option_rows(self.table, !self.subcommands.is_empty());
        if !rows.is_empty() {
            let help_width = width.saturating_sub(max_alias + 8).max(MIN_HELP_WIDTH);
            out.push_str("\nOptions:\n");
            out.push_str(&ctx.aligner().align(&rows, &AlignOptions::new(vec![4, 0, help_width])));
        }

        if !self.subcommands.is_empty() {
            let max_name = self
                .subcommands
                .iter()
                .map(|(name, _)| name.width())
                .max()
                .unwrap_or(0);
            let help_width = width.saturating_sub(max_alias + 7).max(MIN_HELP_WIDTH);
            let rows: Vec<Row> = self
                .subcommands
                .iter()
                .map(|(name, summary)| Row::cells(["", name.as_str(), summary.as_str()]))
                .collect();
            out.push_str("\nSubcommands:\n");
            out.push_str(
                &ctx.aligner()
                    .align(&rows, &AlignOptions::new(vec![4, max_name, help_width])),
            );
        }

        out
    }
}

fn option_rows<T: 'static>(table: &OptionTable<T>, has_subcommands: bool) -> Vec<Row> {
    let mut single: Vec<(u8, String, Vec<String>)> = Vec::new();
    let mut wrapped: Vec<Vec<String>> = Vec::new();

    for descriptor in table.descriptors() {
        if descriptor.hidden || (descriptor.role == Role::AllHelp && !has_subcommands) {
            continue;
        }
        let names = descriptor.help_names();
        let help = descriptor.annotated_help();
        match single_row_names(descriptor, &names) {
            Some(cell) => {
                let key = cell.trim_start_matches('-').to_lowercase();
                single.push((rank(descriptor.role), key, vec![String::new(), cell, help]));
            }
            None => wrapped.push(vec![String::new(), names.join("\n"), help]),
        }
    }

    single.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    wrapped.sort_by(|a, b| a[1].cmp(&b[1]));

    let mut rows: Vec<Row> = single.into_iter().map(|(_, _, cells)| Row::Cells(cells)).collect();
    for cells in wrapped {
        rows.push(Row::Blank);
        rows.push(Row::Cells(cells));
    }
    rows
}

fn single_row_names<T: 'static>(descriptor: &Descriptor<T>, names: &[String]) -> Option<String> {
    if names.len() == 1 {
        return Some(names[0].clone());
    }
    let joined = names.join(" ");
    (descriptor.kind() == OptionKind::Bool && joined.len() < SHORT_ALIAS_LIST).then_some(joined)
}

fn rank(role: Role) -> u8 {
    match role {
        Role::Help => 0,
        Role::AllHelp => 1,
        Role::Plain => 2,
    }
}

/// Color flag for a help document: the nearest boolean `color` option up the
/// frame chain, else terminal detection.
pub(crate) fn resolve_color(frame: &dyn Frame, ctx: &Context) -> bool {
    frame.find_bool("color").unwrap_or_else(|| ctx.is_terminal())
}

/// Labeled rule written before each subcommand's section of all-help output.
pub(crate) fn separator(path: &str, name: &str, width: usize) -> String {
    let label = format!("---[ {path} {name} ]");
    let fill = width.saturating_sub(label.width() + 1);
    format!("\n{label}{}\n\n", "-".repeat(fill))
}
