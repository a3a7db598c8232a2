use manuscript::{Config, markdown_to_pdf};

#[test]
fn compiles_to_pdf() {
    let markdown = "# Title\n\nOpening *line*.\n\n## Part\n\n- a **b**\n1. first\n\n---\n\n= literal";
    let pdf = markdown_to_pdf(markdown, &Config::compiled_default()).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}
