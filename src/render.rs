use crate::block::{Block, Item};
use crate::config::Config;
use crate::document::{Document, Paragraph, ParagraphStyle, Run};
use crate::inline::resolve_emphasis;

/// Build the output document from parsed blocks.
pub fn render(blocks: &[Block], config: &Config) -> Document {
    let mut builder = Builder {
        doc: Document::new(),
        rule_line: config.rule.line(),
    };

    for block in blocks {
        match block {
            Block::Heading { level, text } => builder.heading(*level, text),
            Block::Rule => builder.rule(),
            Block::Text { items } => builder.text_block(items),
        }
    }

    log::debug!(
        "rendered {} paragraphs from {} blocks",
        builder.doc.paragraphs().len(),
        blocks.len()
    );
    builder.doc
}

struct Builder {
    doc: Document,
    rule_line: String,
}

impl Builder {
    fn heading(&mut self, level: u8, text: &str) {
        let paragraph = match level {
            1 => Paragraph::new(ParagraphStyle::Title).centered(),
            n => Paragraph::new(ParagraphStyle::Heading(n.saturating_sub(1).clamp(1, 3))),
        };
        self.doc
            .push(paragraph.with_runs([Run::Plain(text.to_string())]));
    }

    fn rule(&mut self) {
        self.doc.push(
            Paragraph::new(ParagraphStyle::Normal).with_runs([Run::Plain(self.rule_line.clone())]),
        );
    }

    fn text_block(&mut self, items: &[Item]) {
        let mut pending: Vec<&str> = Vec::new();
        // (list id, last ordinal) for the numbered list open in this block
        let mut numbering: Option<(usize, usize)> = None;

        for item in items {
            match item {
                Item::PlainLine(line) => pending.push(line),
                Item::Blank => {
                    self.flush(&mut pending);
                    self.doc.push(Paragraph::new(ParagraphStyle::Normal));
                }
                Item::Bullet(text) => {
                    self.flush(&mut pending);
                    self.doc.push(
                        Paragraph::new(ParagraphStyle::ListBullet).with_runs(resolve_emphasis(text)),
                    );
                }
                Item::Number(text) => {
                    self.flush(&mut pending);
                    let (list, ordinal) = match numbering {
                        Some((list, last)) => (list, last + 1),
                        None => (self.doc.start_numbered_list(), 1),
                    };
                    numbering = Some((list, ordinal));
                    self.doc.push(
                        Paragraph::new(ParagraphStyle::ListNumber { list, ordinal })
                            .with_runs(resolve_emphasis(text)),
                    );
                }
                Item::BoldLine(text) => {
                    self.flush(&mut pending);
                    self.doc.push(
                        Paragraph::new(ParagraphStyle::Normal).with_runs([Run::Bold(text.clone())]),
                    );
                }
            }
        }

        self.flush(&mut pending);
    }

    /// Emit accumulated plain lines as one paragraph.
    fn flush(&mut self, pending: &mut Vec<&str>) {
        if pending.is_empty() {
            return;
        }
        let text = pending.join(" ");
        pending.clear();
        self.doc
            .push(Paragraph::new(ParagraphStyle::Normal).with_runs(resolve_emphasis(&text)));
    }
}
