//! Terminal rendering of classified lines
//!
//! Spans are resolved per character, so a later span (such as an escape
//! nested inside a string) overrides the earlier one it overlaps.

use crossterm::style::{Attribute, Color as TermColor, ContentStyle, StyledContent};

use crate::syntax::{Color, Span, Style, Theme, TokenType};

/// Map a palette color onto crossterm's
fn term_color(color: Color) -> Option<TermColor> {
    let color = match color {
        Color::Default => return None,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::White => TermColor::Grey,
        Color::BrightBlack => TermColor::DarkGrey,
        Color::BrightRed => TermColor::Red,
        Color::BrightGreen => TermColor::Green,
        Color::BrightYellow => TermColor::Yellow,
        Color::BrightBlue => TermColor::Blue,
        Color::BrightMagenta => TermColor::Magenta,
        Color::BrightCyan => TermColor::Cyan,
        Color::BrightWhite => TermColor::White,
    };
    Some(color)
}

/// Convert a style into crossterm's representation
pub fn content_style(style: Style) -> ContentStyle {
    let mut content = ContentStyle::new();
    content.foreground_color = term_color(style.fg);
    if style.bold {
        content.attributes.set(Attribute::Bold);
    }
    if style.italic {
        content.attributes.set(Attribute::Italic);
    }
    if style.underline {
        content.attributes.set(Attribute::Underlined);
    }
    content
}

/// Split a line into runs of identical token type
///
/// Bytes outside every span are `TokenType::Default`. Spans that run
/// past the end of the line are clipped.
pub fn token_runs<'a>(text: &'a str, spans: &[Span]) -> Vec<(TokenType, &'a str)> {
    let mut kinds = vec![TokenType::Default; text.len()];
    for span in spans.iter().filter(|span| !span.is_empty()) {
        let end = span.end.min(text.len());
        if span.start < end {
            kinds[span.start..end].fill(span.token_type);
        }
    }

    let mut runs: Vec<(TokenType, &str)> = Vec::new();
    let mut run_start = 0;
    let mut current = None;
    for (pos, _) in text.char_indices() {
        let kind = kinds[pos];
        match current {
            Some(prev) if prev == kind => {}
            Some(prev) => {
                runs.push((prev, &text[run_start..pos]));
                run_start = pos;
                current = Some(kind);
            }
            None => current = Some(kind),
        }
    }
    if let Some(kind) = current {
        runs.push((kind, &text[run_start..]));
    }
    runs
}

/// Render a line with ANSI styling
pub fn render_line(text: &str, spans: &[Span], theme: &Theme) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for (kind, piece) in token_runs(text, spans) {
        let style = theme.style_for(kind);
        if style.is_default() {
            out.push_str(piece);
        } else {
            out.push_str(&StyledContent::new(content_style(style), piece).to_string());
        }
    }
    out
}

/// One line per span: byte range, token type and the covered text
pub fn describe_spans(row: usize, text: &str, spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| {
            format!(
                "{}:{}..{} {} {:?}",
                row + 1,
                span.start,
                span.end,
                span.token_type.name(),
                span.text(text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
