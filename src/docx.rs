//! DOCX writer.
//!
//! Writes a [`Document`] as a minimal Office Open XML package: the main
//! document part, styles, list numbering and core properties.

use std::io::{Seek, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::config::PageConfig;
use crate::document::{Alignment, Document, Paragraph, ParagraphStyle, Run};
use crate::error::Result;

const TWIPS_PER_INCH: f64 = 1440.0;
const COMPRESSION_LEVEL: i64 = 6;

/// numId of the bullet list instance; numbered lists follow from 2.
const BULLET_NUM_ID: usize = 1;

/// DOCX exporter.
///
/// ```no_run
/// use manuscript::{Config, DocxExporter};
/// use std::fs::File;
///
/// let config = Config::compiled_default();
/// let doc = manuscript::markdown_to_document("# Hello", &config);
/// let mut file = File::create("hello.docx")?;
/// DocxExporter::new(&config.page).with_title("Hello").export(&doc, &mut file)?;
/// # Ok::<(), manuscript::Error>(())
/// ```
pub struct DocxExporter {
    page: PageConfig,
    title: Option<String>,
}

impl DocxExporter {
    pub fn new(page: &PageConfig) -> Self {
        Self {
            page: page.clone(),
            title: None,
        }
    }

    /// Title stored in the package's core properties.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn export<W: Write + Seek>(&self, doc: &Document, writer: &mut W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL));

        zip.start_file("[Content_Types].xml", deflated)?;
        zip.write_all(CONTENT_TYPES_XML)?;

        zip.start_file("_rels/.rels", deflated)?;
        zip.write_all(PACKAGE_RELS_XML)?;

        zip.start_file("docProps/core.xml", deflated)?;
        zip.write_all(core_xml(self.title.as_deref()).as_bytes())?;

        zip.start_file("word/_rels/document.xml.rels", deflated)?;
        zip.write_all(DOCUMENT_RELS_XML)?;

        zip.start_file("word/styles.xml", deflated)?;
        zip.write_all(STYLES_XML)?;

        zip.start_file("word/numbering.xml", deflated)?;
        zip.write_all(numbering_xml(doc.numbered_lists()).as_bytes())?;

        zip.start_file("word/document.xml", deflated)?;
        zip.write_all(document_xml(doc, &self.page).as_bytes())?;

        zip.finish()?;
        log::debug!(
            "wrote docx package with {} paragraphs",
            doc.paragraphs().len()
        );
        Ok(())
    }
}

fn twips(inches: f64) -> u32 {
    (inches * TWIPS_PER_INCH).round().max(0.0) as u32
}

fn document_xml(doc: &Document, page: &PageConfig) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(&format!("<w:document xmlns:w=\"{W_NS}\">"));
    xml.push_str("<w:body>");

    for paragraph in doc.paragraphs() {
        paragraph_xml(paragraph, &mut xml);
    }

    let margin = twips(page.margin);
    xml.push_str(&format!(
        "<w:sectPr><w:pgSz w:w=\"{}\" w:h=\"{}\"/>\
         <w:pgMar w:top=\"{margin}\" w:right=\"{margin}\" w:bottom=\"{margin}\" w:left=\"{margin}\" \
         w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/></w:sectPr>",
        twips(page.width),
        twips(page.height),
    ));
    xml.push_str("</w:body></w:document>");
    xml
}

fn paragraph_xml(paragraph: &Paragraph, xml: &mut String) {
    xml.push_str("<w:p><w:pPr>");

    let (style_id, num_id) = match paragraph.style {
        ParagraphStyle::Normal => ("Normal", None),
        ParagraphStyle::Title => ("Title", None),
        ParagraphStyle::Heading(1) => ("Heading1", None),
        ParagraphStyle::Heading(2) => ("Heading2", None),
        ParagraphStyle::Heading(_) => ("Heading3", None),
        ParagraphStyle::ListBullet => ("ListBullet", Some(BULLET_NUM_ID)),
        ParagraphStyle::ListNumber { list, .. } => ("ListNumber", Some(list + 2)),
    };
    xml.push_str(&format!("<w:pStyle w:val=\"{style_id}\"/>"));
    if let Some(num_id) = num_id {
        xml.push_str(&format!(
            "<w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"{num_id}\"/></w:numPr>"
        ));
    }
    if paragraph.alignment == Alignment::Center {
        xml.push_str("<w:jc w:val=\"center\"/>");
    }
    xml.push_str("</w:pPr>");

    for run in &paragraph.runs {
        run_xml(run, xml);
    }
    xml.push_str("</w:p>");
}

fn run_xml(run: &Run, xml: &mut String) {
    xml.push_str("<w:r>");
    match run {
        Run::Plain(_) => {}
        Run::Bold(_) => xml.push_str("<w:rPr><w:b/></w:rPr>"),
        Run::Italic(_) => xml.push_str("<w:rPr><w:i/></w:rPr>"),
    }
    xml.push_str("<w:t xml:space=\"preserve\">");
    xml.push_str(&escape_xml(run.text()));
    xml.push_str("</w:t></w:r>");
}

fn numbering_xml(numbered_lists: usize) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(&format!("<w:numbering xmlns:w=\"{W_NS}\">"));
    xml.push_str(&abstract_num(0, "bullet", "•"));
    xml.push_str(&abstract_num(1, "decimal", "%1."));
    xml.push_str(&format!(
        "<w:num w:numId=\"{BULLET_NUM_ID}\"><w:abstractNumId w:val=\"0\"/></w:num>"
    ));
    for list in 0..numbered_lists {
        xml.push_str(&format!(
            "<w:num w:numId=\"{}\"><w:abstractNumId w:val=\"1\"/>\
             <w:lvlOverride w:ilvl=\"0\"><w:startOverride w:val=\"1\"/></w:lvlOverride></w:num>",
            list + 2
        ));
    }
    xml.push_str("</w:numbering>");
    xml
}

fn abstract_num(id: usize, format: &str, text: &str) -> String {
    format!(
        "<w:abstractNum w:abstractNumId=\"{id}\"><w:multiLevelType w:val=\"singleLevel\"/>\
         <w:lvl w:ilvl=\"0\"><w:start w:val=\"1\"/><w:numFmt w:val=\"{format}\"/>\
         <w:lvlText w:val=\"{text}\"/><w:lvlJc w:val=\"left\"/>\
         <w:pPr><w:ind w:left=\"720\" w:hanging=\"360\"/></w:pPr></w:lvl></w:abstractNum>"
    )
}

fn core_xml(title: Option<&str>) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(
        "<cp:coreProperties \
         xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
         xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
         xmlns:dcterms=\"http://purl.org/dc/terms/\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">",
    );
    if let Some(title) = title {
        xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(title)));
    }
    xml.push_str("</cp:coreProperties>");
    xml
}

/// Escape XML special characters and drop characters XML 1.0 cannot carry.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(ch),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>
"#;

const PACKAGE_RELS_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>
"#;

const DOCUMENT_RELS_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
</Relationships>
"#;

const STYLES_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault><w:rPr><w:rFonts w:ascii="Georgia" w:hAnsi="Georgia" w:cs="Georgia"/><w:sz w:val="22"/></w:rPr></w:rPrDefault>
    <w:pPrDefault><w:pPr><w:spacing w:after="120" w:line="276" w:lineRule="auto"/></w:pPr></w:pPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/><w:qFormat/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Title">
    <w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:after="240"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="48"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="360" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="32"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading2">
    <w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="1"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="28"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading3">
    <w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="200" w:after="60"/><w:outlineLvl w:val="2"/></w:pPr>
    <w:rPr><w:b/><w:i/><w:sz w:val="24"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="ListBullet">
    <w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/>
    <w:pPr><w:spacing w:after="60"/><w:ind w:left="720" w:hanging="360"/></w:pPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="ListNumber">
    <w:name w:val="List Number"/><w:basedOn w:val="Normal"/>
    <w:pPr><w:spacing w:after="60"/><w:ind w:left="720" w:hanging="360"/></w:pPr>
  </w:style>
</w:styles>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::markdown_to_document;
    use pretty_assertions::assert_eq;

    fn document_part(markdown: &str) -> String {
        let config = Config::compiled_default();
        document_xml(&markdown_to_document(markdown, &config), &config.page)
    }

    #[test]
    fn page_geometry_in_twips() {
        let xml = document_part("text");
        assert!(xml.contains("<w:pgSz w:w=\"8640\" w:h=\"12960\"/>"));
        assert!(xml.contains("w:top=\"1080\" w:right=\"1080\" w:bottom=\"1080\" w:left=\"1080\""));
    }

    #[test]
    fn title_is_centered() {
        let xml = document_part("# Book");
        assert!(xml.contains(
            "<w:p><w:pPr><w:pStyle w:val=\"Title\"/><w:jc w:val=\"center\"/></w:pPr>\
             <w:r><w:t xml:space=\"preserve\">Book</w:t></w:r></w:p>"
        ));
    }

    #[test]
    fn runs_carry_bold_and_italic() {
        let xml = document_part("**a** and *b*");
        assert!(xml.contains("<w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">a</w:t></w:r>"));
        assert!(xml.contains("<w:r><w:t xml:space=\"preserve\"> and </w:t></w:r>"));
        assert!(xml.contains("<w:r><w:rPr><w:i/></w:rPr><w:t xml:space=\"preserve\">b</w:t></w:r>"));
    }

    #[test]
    fn blank_is_empty_paragraph() {
        let xml = document_part("a\n\nb");
        assert!(xml.contains("<w:p><w:pPr><w:pStyle w:val=\"Normal\"/></w:pPr></w:p>"));
    }

    #[test]
    fn lists_reference_numbering() {
        let xml = document_part("- dot\n1. one\n## Break\n1. again");
        assert!(xml.contains("<w:pStyle w:val=\"ListBullet\"/><w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"1\"/>"));
        assert!(xml.contains("<w:pStyle w:val=\"ListNumber\"/><w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"2\"/>"));
        assert!(xml.contains("<w:pStyle w:val=\"ListNumber\"/><w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"3\"/>"));
    }

    #[test]
    fn numbering_has_one_instance_per_list() {
        let xml = numbering_xml(2);
        assert_eq!(xml.matches("<w:num ").count(), 3);
        assert_eq!(xml.matches("<w:startOverride w:val=\"1\"/>").count(), 2);
        // abstract definitions must come before instances
        let last_abstract = xml.rfind("<w:abstractNum ").unwrap();
        let first_num = xml.find("<w:num ").unwrap();
        assert!(last_abstract < first_num);
    }

    #[test]
    fn text_is_escaped() {
        let xml = document_part("Tom & Jerry <3 \"quotes\"\u{0007}");
        assert!(xml.contains("Tom &amp; Jerry &lt;3 &quot;quotes&quot;</w:t>"));
    }

    #[test]
    fn core_properties_title() {
        assert!(core_xml(Some("A & B")).contains("<dc:title>A &amp; B</dc:title>"));
        assert!(!core_xml(None).contains("dc:title>"));
    }
}
