// Plain-text tables for terminal output

use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Right,
}

/// Display width of a string. Location names carry accents (`Jaçanã`), so
/// byte length is wrong for alignment.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad a string to `width` display columns. Never truncates; amounts must be
/// shown in full.
pub(crate) fn pad(s: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(display_width(s)));
    match align {
        Align::Left => format!("{s}{fill}"),
        Align::Right => format!("{fill}{s}"),
    }
}

/// Header row, dashed rule, then one line per row. Columns are separated by
/// two spaces and trailing whitespace is trimmed.
pub(crate) fn render_table(headers: &[&str], aligns: &[Align], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(display_width(cell));
            }
        }
    }

    let align_of = |i: usize| aligns.get(i).copied().unwrap_or(Align::Left);
    let line = |cells: Vec<String>| -> String {
        let joined = cells
            .iter()
            .enumerate()
            .map(|(i, c)| pad(c, widths[i], align_of(i)))
            .collect::<Vec<_>>()
            .join("  ");
        joined.trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers.iter().map(|h| h.to_string()).collect()));
    out.push('\n');
    out.push_str(&line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    out.push('\n');
    for row in rows {
        let mut cells = row.clone();
        cells.resize(widths.len(), String::new());
        out.push_str(&line(cells));
        out.push('\n');
    }
    out
}
