//! Column alignment for the options and subcommands tables.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::console::TableAligner;

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Cells left to right; a cell may contain newlines.
    Cells(Vec<String>),
    /// An empty separator line.
    Blank,
}

impl Row {
    /// Convenience constructor from string slices.
    pub fn cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Cells(cells.into_iter().map(Into::into).collect())
    }
}

/// Column layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignOptions {
    /// Width per column; `0` sizes the column to its widest line.
    pub widths: Vec<usize>,
    /// Text placed between adjacent columns.
    pub gap: String,
}

impl AlignOptions {
    /// Layout with the given widths and a two-space gap.
    pub fn new(widths: Vec<usize>) -> Self {
        Self {
            widths,
            gap: "  ".to_string(),
        }
    }
}

/// Pads fixed-width columns and word-wraps cells wider than their column.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnAligner;

impl TableAligner for ColumnAligner {
    fn align(&self, rows: &[Row], options: &AlignOptions) -> String {
        let columns = rows
            .iter()
            .map(|row| match row {
                Row::Cells(cells) => cells.len(),
                Row::Blank => 0,
            })
            .max()
            .unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|column| match options.widths.get(column).copied().unwrap_or(0) {
                0 => natural_width(rows, column),
                width => width,
            })
            .collect();

        let mut out = String::new();
        for row in rows {
            let cells = match row {
                Row::Cells(cells) => cells,
                Row::Blank => {
                    out.push('\n');
                    continue;
                }
            };
            let wrapped: Vec<Vec<String>> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| wrap(cell, width))
                .collect();
            let height = wrapped.iter().map(Vec::len).max().unwrap_or(0).max(1);
            for line_no in 0..height {
                let mut line = String::new();
                for (column, lines) in wrapped.iter().enumerate() {
                    if column > 0 {
                        line.push_str(&options.gap);
                    }
                    let text = lines.get(line_no).map(String::as_str).unwrap_or("");
                    line.push_str(text);
                    let pad = widths[column].saturating_sub(text.width());
                    line.extend(std::iter::repeat_n(' ', pad));
                }
                out.push_str(line.trim_end());
                out.push('\n');
            }
        }
        out
    }
}

fn natural_width(rows: &[Row], column: usize) -> usize {
    rows.iter()
        .filter_map(|row| match row {
            Row::Cells(cells) => cells.get(column),
            Row::Blank => None,
        })
        .flat_map(|cell| cell.lines())
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
}

/// Greedy word wrap; words longer than `width` are hard-split.
fn wrap(cell: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in cell.split('\n') {
        if paragraph.width() <= width {
            lines.push(paragraph.to_string());
            continue;
        }
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            for piece in split_word(word, width) {
                if line.is_empty() {
                    line = piece;
                } else if line.width() + 1 + piece.width() <= width {
                    line.push(' ');
                    line.push_str(&piece);
                } else {
                    lines.push(std::mem::take(&mut line));
                    line = piece;
                }
            }
        }
        lines.push(line);
    }
    lines
}

fn split_word(word: &str, width: usize) -> Vec<String> {
    if word.width() <= width || width == 0 {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut used = 0;
    for ch in word.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            used = 0;
        }
        piece.push(ch);
        used += ch_width;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
