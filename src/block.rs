/// One entry inside a text block, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// `- text` or `* text`
    Bullet(String),
    /// `1. text`; the source ordinal is not kept.
    Number(String),
    /// A line wrapped entirely in `**`.
    BoldLine(String),
    /// Paragraph break. Never repeated back to back.
    Blank,
    /// Any other line, untrimmed. Joined into paragraphs by the renderer.
    PlainLine(String),
}

/// Top-level structure parsed from a manuscript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `#` through `####`, level 1 to 4.
    Heading { level: u8, text: String },
    Rule,
    /// Run of items between headings and rules. Never empty.
    Text { items: Vec<Item> },
}
