use crate::config::PageConfig;
use crate::document::{Alignment, Document, Paragraph, ParagraphStyle, Run};

/// Convert a rendered document to Typst markup
pub fn document_to_typst(doc: &Document, page: &PageConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "#set page(width: {}in, height: {}in, margin: {}in",
        page.width, page.height, page.margin
    ));
    if page.numbers {
        out.push_str(", numbering: \"1\"");
    }
    out.push_str(")\n");
    // Set up paragraph settings to prevent widows/orphans
    out.push_str("#set par(linebreaks: \"optimized\")\n\n");

    let paragraphs = doc.paragraphs();
    let mut i = 0;
    while i < paragraphs.len() {
        let paragraph = &paragraphs[i];

        if is_heading(paragraph) {
            // Keep heading on the same page as what follows it
            out.push_str("#block(breakable: false)[\n");
            emit_paragraph(paragraph, &mut out);
            if i + 1 < paragraphs.len() && !is_heading(&paragraphs[i + 1]) {
                i += 1;
                emit_paragraph(&paragraphs[i], &mut out);
            }
            out.push_str("]\n\n");
        } else {
            emit_paragraph(paragraph, &mut out);
        }

        i += 1;
    }

    out
}

fn is_heading(paragraph: &Paragraph) -> bool {
    matches!(
        paragraph.style,
        ParagraphStyle::Title | ParagraphStyle::Heading(_)
    )
}

fn emit_paragraph(paragraph: &Paragraph, out: &mut String) {
    let centered = paragraph.alignment == Alignment::Center;
    if centered {
        out.push_str("#align(center)[");
    }

    match paragraph.style {
        ParagraphStyle::Title => {
            out.push_str("#heading(level: 1)[");
            runs_to_typst(&paragraph.runs, out);
            out.push(']');
        }
        ParagraphStyle::Heading(level) => {
            out.push_str(&format!("#heading(level: {})[", level + 1));
            runs_to_typst(&paragraph.runs, out);
            out.push(']');
        }
        ParagraphStyle::Normal if paragraph.is_empty() => {
            out.push_str("#v(1em)");
        }
        ParagraphStyle::Normal => {
            runs_to_typst(&paragraph.runs, out);
        }
        ParagraphStyle::ListBullet => {
            out.push_str("- ");
            runs_to_typst(&paragraph.runs, out);
        }
        ParagraphStyle::ListNumber { ordinal, .. } => {
            out.push_str(&format!("{ordinal}. "));
            runs_to_typst(&paragraph.runs, out);
        }
    }

    if centered {
        out.push(']');
    }
    out.push_str("\n\n");
}

fn runs_to_typst(runs: &[Run], out: &mut String) {
    for (i, run) in runs.iter().enumerate() {
        match run {
            Run::Plain(text) => escape_text(text, i == 0, out),
            Run::Bold(text) | Run::Italic(text) => {
                let func = if matches!(run, Run::Bold(_)) {
                    "strong"
                } else {
                    "emph"
                };
                out.push('#');
                out.push_str(func);
                out.push('[');
                // A content block starts a fresh line of markup
                escape_text(text, true, out);
                out.push(']');
                // Stop the embedded call from swallowing `(args)` or `.field`
                let next = runs.get(i + 1).and_then(|r| r.text().chars().next());
                if matches!(next, Some('(' | '.')) {
                    out.push(';');
                }
            }
        }
    }
}

fn escape_text(text: &str, line_start: bool, out: &mut String) {
    let text = if line_start {
        let rest = text.trim_start();
        out.push_str(&text[..text.len() - rest.len()]);
        protect_marker(rest, out)
    } else {
        text
    };

    // Escape special Typst characters
    for ch in text.chars() {
        if matches!(
            ch,
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '/' | '~'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
}

/// Text at the start of a line can read as a heading, list or enum marker.
/// Writes the escaped marker, if any, and returns the text after it.
fn protect_marker<'a>(text: &'a str, out: &mut String) -> &'a str {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && text[digits..].starts_with('.') {
        out.push_str(&text[..digits]);
        out.push_str("\\.");
        return &text[digits + 1..];
    }
    match text.chars().next() {
        Some(ch @ ('=' | '+' | '-')) => {
            out.push('\\');
            out.push(ch);
            &text[1..]
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use crate::{Config, markdown_to_typst};
    use pretty_assertions::assert_eq;

    const PREAMBLE: &str =
        "#set page(width: 6in, height: 9in, margin: 0.75in)\n#set par(linebreaks: \"optimized\")\n\n";

    fn typst(markdown: &str) -> String {
        markdown_to_typst(markdown, &Config::compiled_default())
    }

    #[test]
    fn title() {
        assert_eq!(
            typst("# Hello"),
            format!(
                "{PREAMBLE}#block(breakable: false)[\n#align(center)[#heading(level: 1)[Hello]]\n\n]\n\n"
            )
        );
    }

    #[test]
    fn heading_with_following_content() {
        // Heading should be grouped with following paragraph
        let result = typst("## Part\nSome text.");
        assert!(result.contains(
            "#block(breakable: false)[\n#heading(level: 2)[Part]\n\nSome text.\n\n]\n\n"
        ));
    }

    #[test]
    fn consecutive_headings_are_not_merged() {
        let result = typst("## One\n### Two\nbody");
        assert!(result.contains("#block(breakable: false)[\n#heading(level: 2)[One]\n\n]\n\n"));
        assert!(result.contains("#block(breakable: false)[\n#heading(level: 3)[Two]\n\nbody\n\n]\n\n"));
    }

    #[test]
    fn paragraph() {
        assert_eq!(typst("Hello world"), format!("{PREAMBLE}Hello world\n\n"));
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(
            typst("a **b** *c*"),
            format!("{PREAMBLE}a #strong[b] #emph[c]\n\n")
        );
    }

    #[test]
    fn bold_line() {
        assert_eq!(
            typst("**Remember**"),
            format!("{PREAMBLE}#strong[Remember]\n\n")
        );
    }

    #[test]
    fn call_terminated_before_parenthesis() {
        assert_eq!(
            typst("**Note**(aside)"),
            format!("{PREAMBLE}#strong[Note];(aside)\n\n")
        );
    }

    #[test]
    fn blank_is_vertical_space() {
        assert_eq!(
            typst("a\n\nb"),
            format!("{PREAMBLE}a\n\n#v(1em)\n\nb\n\n")
        );
    }

    #[test]
    fn bullet_list() {
        assert_eq!(
            typst("- one\n- two"),
            format!("{PREAMBLE}- one\n\n- two\n\n")
        );
    }

    #[test]
    fn numbered_list_uses_rendered_ordinals() {
        assert_eq!(
            typst("5. one\n9. two"),
            format!("{PREAMBLE}1. one\n\n2. two\n\n")
        );
    }

    #[test]
    fn escapes_special_chars() {
        assert_eq!(typst("a # b"), format!("{PREAMBLE}a \\# b\n\n"));
        assert_eq!(typst("a_b"), format!("{PREAMBLE}a\\_b\n\n"));
        assert_eq!(typst("see http://x"), format!("{PREAMBLE}see http:\\/\\/x\n\n"));
        assert_eq!(typst("5 * 3"), format!("{PREAMBLE}5 \\* 3\n\n"));
    }

    #[test]
    fn escapes_markers_at_line_start() {
        assert_eq!(typst("= not a heading"), format!("{PREAMBLE}\\= not a heading\n\n"));
        assert_eq!(typst("+1 for this"), format!("{PREAMBLE}\\+1 for this\n\n"));
        assert_eq!(typst("2024.\nwas long"), format!("{PREAMBLE}2024\\. was long\n\n"));
    }

    #[test]
    fn escapes_markers_after_leading_whitespace() {
        assert_eq!(
            typst("  - not a bullet"),
            format!("{PREAMBLE}  \\- not a bullet\n\n")
        );
        assert_eq!(typst("\t3. not a list"), format!("{PREAMBLE}\t3\\. not a list\n\n"));
    }

    #[test]
    fn escapes_markers_inside_emphasis() {
        assert_eq!(
            typst("**1. Key idea**"),
            format!("{PREAMBLE}#strong[1\\. Key idea]\n\n")
        );
        assert_eq!(
            typst("see *- this* - and that"),
            format!("{PREAMBLE}see #emph[\\- this] - and that\n\n")
        );
    }

    #[test]
    fn escapes_tilde() {
        assert_eq!(typst("about ~5 pages"), format!("{PREAMBLE}about \\~5 pages\n\n"));
    }

    #[test]
    fn rule_is_glyph_line() {
        assert_eq!(
            typst("---"),
            format!("{PREAMBLE}{}\n\n", "─".repeat(40))
        );
    }

    #[test]
    fn page_numbers_when_enabled() {
        let mut config = Config::compiled_default();
        config.page.numbers = true;
        assert!(markdown_to_typst("x", &config).starts_with(
            "#set page(width: 6in, height: 9in, margin: 0.75in, numbering: \"1\")\n"
        ));
    }
}
