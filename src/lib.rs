//! Manuscript conversion: plain-text markup to styled, paginated documents.
//!
//! The pipeline is `parse` (text to [`Block`]s), `render` (blocks to a
//! [`Document`] of styled paragraphs), then a writer: DOCX via
//! [`DocxExporter`] or PDF via Typst.

pub mod batch;
mod block;
mod config;
mod document;
mod docx;
mod error;
mod inline;
mod parser;
mod render;
mod typst;

pub use block::{Block, Item};
pub use config::{BatchConfig, Config, PageConfig, RuleConfig};
pub use document::{Alignment, Document, Paragraph, ParagraphStyle, Run};
pub use docx::DocxExporter;
pub use error::{Error, Result};
pub use inline::resolve_emphasis;
pub use render::render;

use std::io::Cursor;

use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_pdf::PdfOptions;

/// Parse manuscript text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Parse and render in one step.
pub fn markdown_to_document(markdown: &str, config: &Config) -> Document {
    render(&parse(markdown), config)
}

/// Convert manuscript text to DOCX bytes.
pub fn markdown_to_docx(markdown: &str, title: &str, config: &Config) -> Result<Vec<u8>> {
    let doc = markdown_to_document(markdown, config);
    document_to_docx(&doc, title, config)
}

/// Write an already rendered document as DOCX bytes.
pub fn document_to_docx(doc: &Document, title: &str, config: &Config) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    DocxExporter::new(&config.page)
        .with_title(title)
        .export(doc, &mut cursor)?;
    Ok(cursor.into_inner())
}

/// Convert manuscript text to Typst markup.
pub fn markdown_to_typst(markdown: &str, config: &Config) -> String {
    let doc = markdown_to_document(markdown, config);
    typst::document_to_typst(&doc, &config.page)
}

/// Convert manuscript text to PDF bytes.
pub fn markdown_to_pdf(markdown: &str, config: &Config) -> Result<Vec<u8>> {
    let doc = markdown_to_document(markdown, config);
    document_to_pdf(&doc, config)
}

/// Typeset an already rendered document as PDF bytes.
pub fn document_to_pdf(doc: &Document, config: &Config) -> Result<Vec<u8>> {
    use typst_library::layout::PagedDocument;

    let typst_content = typst::document_to_typst(doc, &config.page);

    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    let compiled: PagedDocument = engine
        .compile()
        .output
        .map_err(|e| Error::Typst(format!("{:?}", e)))?;

    typst_pdf::pdf(&compiled, &PdfOptions::default()).map_err(|e| Error::Pdf(format!("{:?}", e)))
}
