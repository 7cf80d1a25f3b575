//! Table and box rendering.
//!
//! Renders rows of text cells under a label row, with a leading row index
//! column, per-column justification and styles, and a bounded total width.
//! Overflowing cells are clipped with an ellipsis.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::{Style, Theme};

/// Width used when the terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 80;

/// Narrowest a data column is squeezed to when fitting the width bound.
const MIN_COLUMN_WIDTH: usize = 4;

const ELLIPSIS: char = '…';
const HORIZONTAL: &str = "─";
const BORDER: &str = " │ ";
const CROSS: &str = "─┼─";
const GAP: &str = "  ";

/// Current terminal width in columns.
pub fn terminal_width() -> usize {
    match crossterm::terminal::size() {
        Ok((cols, _)) if cols > 0 => cols as usize,
        _ => DEFAULT_WIDTH,
    }
}

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Left,
    Right,
}

/// How much separation is drawn between rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compaction {
    /// Bordered columns, rule under the labels.
    Ruled,
    /// No column borders, rule under the labels only.
    #[default]
    Dense,
}

/// A table ready to render.
#[derive(Debug, Clone)]
pub struct Table<'a> {
    labels: Vec<String>,
    rows: Vec<Vec<String>>,
    justify: Vec<Justify>,
    column_styles: Vec<Style>,
    compaction: Compaction,
    max_width: usize,
    theme: &'a Theme,
}

impl<'a> Table<'a> {
    pub fn new(labels: Vec<String>, rows: Vec<Vec<String>>, theme: &'a Theme) -> Self {
        let columns = labels.len();
        Self {
            labels,
            rows,
            justify: vec![Justify::Left; columns],
            column_styles: vec![Style::plain(); columns],
            compaction: Compaction::default(),
            max_width: DEFAULT_WIDTH,
            theme,
        }
    }

    pub fn justify(mut self, justify: Vec<Justify>) -> Self {
        self.justify = justify;
        self
    }

    pub fn column_styles(mut self, styles: Vec<Style>) -> Self {
        self.column_styles = styles;
        self
    }

    pub fn compaction(mut self, compaction: Compaction) -> Self {
        self.compaction = compaction;
        self
    }

    pub fn max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    fn separator(&self) -> &'static str {
        match self.compaction {
            Compaction::Dense => GAP,
            Compaction::Ruled => BORDER,
        }
    }

    fn rule_joint(&self) -> &'static str {
        match self.compaction {
            Compaction::Dense => GAP,
            Compaction::Ruled => CROSS,
        }
    }

    /// Render to a string, one line per row plus label and rule lines.
    pub fn render(&self) -> String {
        // Column 0 is the row index.
        let mut labels: Vec<&str> = Vec::with_capacity(self.labels.len() + 1);
        let mut justify = Vec::with_capacity(self.labels.len() + 1);
        let mut styles = Vec::with_capacity(self.labels.len() + 1);
        labels.push("");
        justify.push(Justify::Right);
        styles.push(self.theme.comment);
        for (i, label) in self.labels.iter().enumerate() {
            labels.push(label);
            justify.push(self.justify.get(i).copied().unwrap_or_default());
            styles.push(self.column_styles.get(i).copied().unwrap_or_default());
        }

        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut cells = Vec::with_capacity(labels.len());
                cells.push((i + 1).to_string());
                cells.extend(row.iter().map(|c| single_line(c)));
                cells.resize(labels.len(), String::new());
                cells
            })
            .collect();

        let mut widths: Vec<usize> = labels.iter().map(|l| l.width()).collect();
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.width());
            }
        }
        fit_widths(&mut widths, 1, self.separator().width(), self.max_width);

        let border = self.theme.comment;
        let mut out = String::with_capacity(64 * (rows.len() + 2));

        let label_cells: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        self.push_line(&mut out, &label_cells, &widths, &justify, &vec![self.theme.title; labels.len()]);
        let rule = self.rule_line(&widths);
        out.push_str(&border.paint(&rule));
        out.push('\n');

        for row in &rows {
            self.push_line(&mut out, row, &widths, &justify, &styles);
        }
        out
    }

    fn push_line(
        &self,
        out: &mut String,
        cells: &[String],
        widths: &[usize],
        justify: &[Justify],
        styles: &[Style],
    ) {
        let last = cells.len().saturating_sub(1);
        let separator = self.theme.comment.paint(self.separator());
        let mut line = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                line.push_str(&separator);
            }
            let clipped = clip(cell, widths[i]);
            let padded = if i == last && justify[i] == Justify::Left {
                clipped
            } else {
                pad(&clipped, widths[i], justify[i])
            };
            line.push_str(&styles[i].paint(&padded));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    fn rule_line(&self, widths: &[usize]) -> String {
        widths
            .iter()
            .map(|w| HORIZONTAL.repeat(*w))
            .collect::<Vec<_>>()
            .join(self.rule_joint())
    }
}

/// Shrink the widest data columns until the table fits in `max_width`.
fn fit_widths(widths: &mut [usize], first_data: usize, separator: usize, max_width: usize) {
    let total = |widths: &[usize]| {
        widths.iter().sum::<usize>() + separator * widths.len().saturating_sub(1)
    };
    while total(widths) > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .skip(first_data)
            .filter(|(_, w)| **w > MIN_COLUMN_WIDTH)
            .max_by_key(|(i, w)| (**w, std::cmp::Reverse(*i)))
            .map(|(i, _)| i);
        match widest {
            Some(i) => widths[i] -= 1,
            None => break,
        }
    }
}

/// Collapse a cell to one line.
fn single_line(cell: &str) -> String {
    if cell.contains(['\n', '\r', '\t']) {
        cell.split(['\n', '\r', '\t'])
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        cell.to_string()
    }
}

/// Clip `text` to `width` display columns, marking the cut with an ellipsis.
pub fn clip(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push(ELLIPSIS);
    out
}

fn pad(text: &str, width: usize, justify: Justify) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    match justify {
        Justify::Left => format!("{text}{fill}"),
        Justify::Right => format!("{fill}{text}"),
    }
}

/// Render `text` inside a single-line box.
pub fn text_box(text: &str, style: Style) -> String {
    let inner = HORIZONTAL.repeat(text.width() + 2);
    let lines = [
        format!("┌{inner}┐"),
        format!("│ {text} │"),
        format!("└{inner}┘"),
    ];
    let mut out = String::new();
    for line in lines {
        out.push_str(&style.paint(&line));
        out.push('\n');
    }
    out
}

/// Render a `key: value` bullet line.
pub fn bullet(key: &str, value: &str, bullet: &str, theme: &Theme) -> String {
    let bullet = if bullet.is_empty() {
        String::new()
    } else {
        format!("{} ", theme.title.paint(bullet))
    };
    format!(
        "{bullet}{} {}\n",
        theme.option.paint(key),
        theme.description.paint(value)
    )
}

/// Format number with thousands separators.
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_dense_table() {
        let theme = Theme::plain();
        let table = Table::new(
            vec!["name".into(), "type".into()],
            rows(&[&["__name__", "str"], &["__path__", "list"]]),
            &theme,
        );
        assert_eq!(
            table.render(),
            "   name      type\n\
             ─  ────────  ────\n\
             1  __name__  str\n\
             2  __path__  list\n"
        );
    }

    #[test]
    fn test_ruled_table() {
        let theme = Theme::plain();
        let table = Table::new(vec!["module".into()], rows(&[&["numpy"], &["os"]]), &theme)
            .compaction(Compaction::Ruled);
        assert_eq!(
            table.render(),
            "  │ module\n──┼───────\n1 │ numpy\n2 │ os\n"
        );
    }

    #[test]
    fn test_width_bound_clips_widest_column() {
        let theme = Theme::plain();
        let long = "x".repeat(60);
        let out = Table::new(
            vec!["name".into(), "description".into()],
            rows(&[&["short", &long]]),
            &theme,
        )
        .max_width(30)
        .render();
        for line in out.lines() {
            assert!(line.width() <= 30, "line too wide: {line:?}");
        }
        assert!(out.contains('…'));
    }

    #[test]
    fn test_right_justify() {
        let theme = Theme::plain();
        let out = Table::new(vec!["count".into(), "name".into()], rows(&[&["7", "x"]]), &theme)
            .justify(vec![Justify::Right, Justify::Left])
            .render();
        assert_eq!(out.lines().nth(2), Some("1      7  x"));
    }

    #[test]
    fn test_multiline_cells_are_flattened() {
        let theme = Theme::plain();
        let out = Table::new(vec!["doc".into()], rows(&[&["one\ntwo"]]), &theme).render();
        assert!(out.contains("one two"));
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("abcdef", 10), "abcdef");
        assert_eq!(clip("abcdef", 4), "abc…");
        assert_eq!(clip("abcdef", 0), "");
    }

    #[test]
    fn test_text_box() {
        assert_eq!(
            text_box("Other", Style::plain()),
            "┌───────┐\n│ Other │\n└───────┘\n"
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1234567), "1,234,567");
    }
}
