//! Styled output produced by the renderer and consumed by the writers.

/// A span of text with one uniform style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    Plain(String),
    Bold(String),
    Italic(String),
}

impl Run {
    pub fn text(&self) -> &str {
        match self {
            Run::Plain(text) | Run::Bold(text) | Run::Italic(text) => text,
        }
    }
}

/// Paragraph style, named after the word-processor styles it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Normal,
    /// Top-level heading of the manuscript.
    Title,
    /// Headings below the title, level 1 to 3.
    Heading(u8),
    ListBullet,
    /// `list` identifies the numbered list; `ordinal` starts at 1 within it.
    ListNumber { list: usize, ordinal: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub alignment: Alignment,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle) -> Self {
        Self {
            style,
            alignment: Alignment::Left,
            runs: Vec::new(),
        }
    }

    pub fn centered(mut self) -> Self {
        self.alignment = Alignment::Center;
        self
    }

    /// Append runs, dropping any with no text.
    pub fn with_runs(mut self, runs: impl IntoIterator<Item = Run>) -> Self {
        self.runs
            .extend(runs.into_iter().filter(|run| !run.text().is_empty()));
        self
    }

    /// Concatenated text of all runs, without styling.
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::text).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Flat list of paragraphs ready to be written out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    paragraphs: Vec<Paragraph>,
    numbered_lists: usize,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Reserve an identifier for a new numbered list.
    pub fn start_numbered_list(&mut self) -> usize {
        let id = self.numbered_lists;
        self.numbered_lists += 1;
        id
    }

    /// Number of distinct numbered lists. List ids run from 0 to this value.
    pub fn numbered_lists(&self) -> usize {
        self.numbered_lists
    }

    /// Whitespace-separated words across every paragraph.
    pub fn word_count(&self) -> usize {
        self.paragraphs
            .iter()
            .map(|p| p.text().split_whitespace().count())
            .sum()
    }

    /// Estimated page count at the given density.
    pub fn page_estimate(&self, words_per_page: u32) -> f64 {
        if words_per_page == 0 {
            return 0.0;
        }
        self.word_count() as f64 / f64::from(words_per_page)
    }
}
