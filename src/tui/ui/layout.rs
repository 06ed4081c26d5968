//! Layout calculations and text utilities.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a non-summary column may get.
pub const MAX_COLUMN_WIDTH: usize = 30;
/// Narrowest the summary column may get.
pub const MIN_SUMMARY_WIDTH: usize = 10;
/// Space between table columns.
pub const COLUMN_GAP: usize = 1;

/// Column widths for a table: each column as wide as its widest cell
/// (header included), capped at `MAX_COLUMN_WIDTH`. SUMMARY takes
/// whatever is left.
pub fn compute_column_widths(
    columns: &[String],
    rows: impl Iterator<Item = Vec<String>>,
    total_width: usize,
) -> Vec<usize> {
    let mut widths: Vec<usize> = columns.iter().map(|c| display_width(c)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(display_width(cell));
        }
    }
    for width in widths.iter_mut() {
        *width = (*width).min(MAX_COLUMN_WIDTH);
    }

    if let Some(summary) = columns.iter().position(|c| c == "SUMMARY") {
        let others: usize = widths
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != summary)
            .map(|(_, w)| w + COLUMN_GAP)
            .sum();
        widths[summary] = total_width.saturating_sub(others).max(MIN_SUMMARY_WIDTH);
    }
    widths
}

/// Calculate the display width of text (accounting for Unicode).
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Truncate text to a maximum display width.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > max_width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out
}

/// Truncate text with an ellipsis if it exceeds max width.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if display_width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 1 {
        return "…".to_string();
    }
    let truncated = truncate_to_width(text, max_width.saturating_sub(1));
    format!("{truncated}…")
}

/// Left-align text in exactly `width` cells, with an ellipsis when it does not fit.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let mut fitted = truncate_with_ellipsis(text, width);
    let pad = width.saturating_sub(display_width(&fitted));
    fitted.push_str(&" ".repeat(pad));
    fitted
}

/// Fit a Line to a maximum width by truncating spans.
pub fn fit_line_to_width<'a>(line: Line<'a>, max_width: usize) -> Line<'a> {
    if max_width == 0 {
        return Line::from(Vec::<Span>::new());
    }

    let Line {
        spans,
        alignment,
        style,
    } = line;
    let mut out: Vec<Span<'a>> = Vec::new();
    let mut used = 0usize;

    for span in spans {
        if used >= max_width {
            break;
        }
        let content = span.content.as_ref();
        let span_width = display_width(content);
        if used + span_width <= max_width {
            used += span_width;
            out.push(span);
        } else {
            let remaining = max_width.saturating_sub(used);
            let truncated = truncate_to_width(content, remaining);
            if !truncated.is_empty() {
                out.push(Span::styled(truncated, span.style));
            }
            break;
        }
    }

    Line {
        spans: out,
        alignment,
        style,
    }
}

/// A `width` x `height` rectangle centered in `r`, shrunk to fit.
pub fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

/// Calculate a centered popup rectangle within a container.
pub fn popup_rect(
    percent_x: u16,
    percent_y: u16,
    min_width: u16,
    min_height: u16,
    r: Rect,
) -> Rect {
    let max_width = r.width.saturating_sub(2).max(1);
    let max_height = r.height.saturating_sub(2).max(1);

    let target_width = (r.width.saturating_mul(percent_x) / 100).max(min_width);
    let target_height = (r.height.saturating_mul(percent_y) / 100).max(min_height);

    centered_rect(target_width.min(max_width), target_height.min(max_height), r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_summary_absorbs_remainder() {
        let columns = cols(&["KEY", "SUMMARY", "STATUS"]);
        let rows = vec![cols(&["ABC-1", "Fix it", "In Progress"])];
        let widths = compute_column_widths(&columns, rows.into_iter(), 80);
        // KEY 5 + gap, STATUS 11 + gap
        assert_eq!(widths, vec![5, 80 - 6 - 12, 11]);
    }

    #[test]
    fn test_widths_are_capped() {
        let columns = cols(&["KEY", "ASSIGNEE"]);
        let rows = vec![cols(&["ABC-1", &"x".repeat(50)])];
        let widths = compute_column_widths(&columns, rows.into_iter(), 80);
        assert_eq!(widths, vec![5, MAX_COLUMN_WIDTH]);
    }

    #[test]
    fn test_summary_minimum() {
        let columns = cols(&["SUMMARY", "ASSIGNEE"]);
        let rows = vec![cols(&["s", &"x".repeat(30)])];
        let widths = compute_column_widths(&columns, rows.into_iter(), 20);
        assert_eq!(widths[0], MIN_SUMMARY_WIDTH);
    }

    #[test]
    fn test_pad_to_width() {
        assert_eq!(pad_to_width("abc", 5), "abc  ");
        assert_eq!(pad_to_width("abcdef", 4), "abc…");
    }

    #[test]
    fn test_fit_line_cuts_wide_characters() {
        let line = Line::from(vec![Span::raw("ab"), Span::raw("日本語")]);
        let fitted = fit_line_to_width(line, 5);
        let text: Vec<&str> = fitted.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, vec!["ab", "日"]);
        assert!(fit_line_to_width(Line::from("abc"), 0).spans.is_empty());
    }

    #[test]
    fn test_centered_rect_shrinks() {
        let r = Rect::new(0, 0, 50, 10);
        assert_eq!(centered_rect(100, 20, r), r);
        assert_eq!(centered_rect(10, 4, r), Rect::new(20, 3, 10, 4));
    }
}
