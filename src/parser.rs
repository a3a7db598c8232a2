use crate::block::{Block, Item};

/// Heading markers, checked in order. `# ` never matches `## ...` so the
/// order only matters for readability.
const HEADING_MARKERS: [(&str, u8); 4] = [("# ", 1), ("## ", 2), ("### ", 3), ("#### ", 4)];

/// What a single line means, decided without looking at its neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Heading { level: u8, text: String },
    Rule,
    Item(Item),
    /// A numbered marker with nothing after it.
    Dropped,
}

/// Classify one line. First match wins.
fn classify(line: &str) -> Line {
    for (marker, level) in HEADING_MARKERS {
        if let Some(rest) = line.strip_prefix(marker) {
            return Line::Heading {
                level,
                text: rest.trim().to_string(),
            };
        }
    }

    if line.starts_with("---") {
        return Line::Rule;
    }

    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Line::Item(Item::Bullet(rest.trim().to_string()));
    }

    if let Some(rest) = strip_ordinal(line) {
        if rest.is_empty() {
            return Line::Dropped;
        }
        return Line::Item(Item::Number(rest.trim().to_string()));
    }

    let trimmed = line.trim();
    if let Some(inner) = bold_line(trimmed) {
        return Line::Item(Item::BoldLine(inner.trim().to_string()));
    }

    if trimmed.is_empty() {
        return Line::Item(Item::Blank);
    }

    Line::Item(Item::PlainLine(line.to_string()))
}

/// Strip a `\d+\.\s` prefix, returning what follows the whitespace character.
fn strip_ordinal(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    let ws = rest.chars().next().filter(|c| c.is_whitespace())?;
    Some(&rest[ws.len_utf8()..])
}

/// Inner text of a line wrapped entirely in `**`. Overlapping delimiters
/// (`**`, `***`) leave nothing inside.
fn bold_line(trimmed: &str) -> Option<&str> {
    if !(trimmed.starts_with("**") && trimmed.ends_with("**")) {
        return None;
    }
    Some(trimmed.get(2..trimmed.len() - 2).unwrap_or(""))
}

#[derive(Default)]
struct ParseState {
    blocks: Vec<Block>,
    // Text block in progress
    items: Vec<Item>,
}

impl ParseState {
    fn flush(&mut self) {
        if !self.items.is_empty() {
            let items = std::mem::take(&mut self.items);
            self.blocks.push(Block::Text { items });
        }
    }

    fn push_line(&mut self, line: Line) {
        match line {
            Line::Heading { level, text } => {
                self.flush();
                self.blocks.push(Block::Heading { level, text });
            }
            Line::Rule => {
                self.flush();
                self.blocks.push(Block::Rule);
            }
            Line::Item(Item::Blank) => {
                if matches!(self.items.last(), Some(last) if *last != Item::Blank) {
                    self.items.push(Item::Blank);
                }
            }
            Line::Item(item) => self.items.push(item),
            Line::Dropped => {}
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

/// Parse manuscript text into blocks. Never fails: anything unrecognised is
/// kept as plain text.
pub fn parse(markdown: &str) -> Vec<Block> {
    let blocks = markdown
        .lines()
        .map(classify)
        .fold(ParseState::default(), |mut state, line| {
            state.push_line(line);
            state
        })
        .finish();

    log::debug!("parsed {} blocks", blocks.len());
    blocks
}
