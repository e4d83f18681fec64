use document_processing::{
    clean_text, extract_text, extract_text_from_bytes, extract_text_from_pdf,
    parse_checkpoint_lines, top_words, ExtractionError,
};
use std::fs;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:r><w:t>RG-01 : la facture doit comporter un numéro unique</w:t></w:r></w:p>
<w:p><w:r><w:t>RG-02 : le montant TTC est calculé à partir du montant HT</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>RG-03 : une facture validée ne peut plus être modifiée</w:t></w:r></w:p>
</w:body>
</w:document>"#;

fn build_docx(document_xml: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    writer
        .start_file("[Content_Types].xml", options)
        .expect("start content types");
    writer
        .write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .expect("write content types");
    writer
        .start_file("word/document.xml", options)
        .expect("start document part");
    writer
        .write_all(document_xml.as_bytes())
        .expect("write document part");

    writer.finish().expect("finish zip").into_inner()
}

#[test]
fn test_docx_extraction_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cahier_des_charges.docx");
    fs::write(&path, build_docx(DOCUMENT_XML)).unwrap();

    let text = extract_text(&path).unwrap();

    assert_eq!(
        parse_checkpoint_lines(&text),
        vec![
            "RG-01 : la facture doit comporter un numéro unique",
            "RG-02 : le montant TTC est calculé à partir du montant HT",
            "RG-03 : une facture validée ne peut plus être modifiée",
        ]
    );
    // Empty paragraphs survive as blank lines
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn test_docx_without_document_part() {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("readme.txt", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"hello").unwrap();
    let bytes = writer.finish().unwrap().into_inner();

    let result = extract_text_from_bytes("broken.docx", &bytes);
    assert!(matches!(result, Err(ExtractionError::Docx(msg)) if msg.contains("word/document.xml")));
}

#[test]
fn test_txt_extraction_and_checkpoint_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("points_existants.txt");
    fs::write(&path, "1. Vérifier le montant\n\n  2. Contrôler la date  \n").unwrap();

    let text = extract_text(&path).unwrap();
    assert_eq!(
        parse_checkpoint_lines(&text),
        vec!["1. Vérifier le montant", "2. Contrôler la date"]
    );
}

#[test]
fn test_unsupported_format_is_rejected_before_reading() {
    // The file does not exist: the extension check must fail first
    let result = extract_text(std::path::Path::new("/nonexistent/specs.odt"));
    assert!(matches!(result, Err(ExtractionError::UnsupportedFormat(ext)) if ext == "odt"));
}

#[test]
fn test_missing_file_reports_io_error() {
    let result = extract_text(std::path::Path::new("/nonexistent/specs.pdf"));
    assert!(matches!(result, Err(ExtractionError::Io { .. })));
}

#[test]
fn test_invalid_pdf_bytes() {
    let result = extract_text_from_pdf(b"this is not a pdf document");
    assert!(matches!(result, Err(ExtractionError::Pdf(_))));
}

#[test]
fn test_frequency_over_extracted_docx() {
    let text = extract_text_from_bytes("cahier.docx", &build_docx(DOCUMENT_XML)).unwrap();
    let top = top_words(&clean_text(&text), 2);

    assert_eq!(top[0].word, "facture");
    assert_eq!(top[0].count, 2);
    assert_eq!(top[1].word, "montant");
    assert_eq!(top[1].count, 2);
}
