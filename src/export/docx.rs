//! DOCX生成
//!
//! 生徒1人またはクラス全員のレポートを Office Open XML 文書にする。
//!
//! ## 文書構成
//! - タイトル（見出しレベル0）: `Report <生徒名>`
//! - 教科ごとに見出しレベル1
//! - 項目ごとに箇条書き1行（項目名は太字、所見は標準）
//! - クラス全員の場合は生徒の間に改ページ（最後の生徒の後には入れない）

use crate::error::{ReportError, Result};
use class_report_common::{ReportMap, StudentRecord};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer as XmlWriter;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const WORDPROCESSING_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:sz w:val="52"/><w:color w:val="17365D"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="480" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/><w:color w:val="365F91"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:qFormat/><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr><w:spacing w:after="60"/><w:ind w:left="360" w:hanging="360"/></w:pPr></w:style></w:styles>"#;

const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

/// 文書オプション
#[derive(Debug, Clone)]
pub struct DocxOptions {
    /// タイトルの接頭辞（`<接頭辞> <生徒名>`）
    pub title_prefix: String,
}

impl Default for DocxOptions {
    fn default() -> Self {
        Self {
            title_prefix: "Report".into(),
        }
    }
}

/// 文書を構成する段落
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// 見出しレベル0
    Title(String),
    /// 見出しレベル1
    Heading(String),
    /// 箇条書き（太字ラベル + 本文）
    Bullet { label: String, text: String },
    PageBreak,
}

/// 書き出し前の文書
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDocument {
    blocks: Vec<Block>,
}

impl ReportDocument {
    /// 生徒1人分の文書
    pub fn for_student(name: &str, record: &StudentRecord, options: &DocxOptions) -> Self {
        let mut doc = Self::default();
        doc.push_student(name, record, options);
        doc
    }

    /// クラス全員分の文書（レポート順）
    pub fn for_class(report: &ReportMap, options: &DocxOptions) -> Self {
        let mut doc = Self::default();
        for (i, (name, record)) in report.iter().enumerate() {
            if i > 0 {
                doc.blocks.push(Block::PageBreak);
            }
            doc.push_student(name, record, options);
        }
        doc
    }

    fn push_student(&mut self, name: &str, record: &StudentRecord, options: &DocxOptions) {
        self.blocks
            .push(Block::Title(format!("{} {}", options.title_prefix, name)));
        for (subject, fields) in record.subjects() {
            self.blocks.push(Block::Heading(subject.to_string()));
            for (field, comment) in fields.iter() {
                self.blocks.push(Block::Bullet {
                    label: format!("{}: ", field),
                    text: comment.to_string(),
                });
            }
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn count_titles(&self) -> usize {
        self.blocks.iter().filter(|b| matches!(b, Block::Title(_))).count()
    }

    pub fn count_page_breaks(&self) -> usize {
        self.blocks.iter().filter(|b| matches!(b, Block::PageBreak)).count()
    }

    /// `word/document.xml` の内容
    pub fn document_xml(&self) -> Result<Vec<u8>> {
        let mut xml = BodyWriter::new();
        xml.decl()?;
        xml.start("w:document", &[("xmlns:w", WORDPROCESSING_NS)])?;
        xml.start("w:body", &[])?;

        for block in &self.blocks {
            match block {
                Block::Title(text) => xml.styled_paragraph("Title", text)?,
                Block::Heading(text) => xml.styled_paragraph("Heading1", text)?,
                Block::Bullet { label, text } => xml.bullet(label, text)?,
                Block::PageBreak => xml.page_break()?,
            }
        }

        xml.section_properties()?;
        xml.end("w:body")?;
        xml.end("w:document")?;
        Ok(xml.into_inner())
    }

    /// .docx のバイト列
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let document = self.document_xml()?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, &[u8]); 6] = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
            ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.as_bytes()),
            ("word/document.xml", &document),
            ("word/styles.xml", STYLES_XML.as_bytes()),
            ("word/numbering.xml", NUMBERING_XML.as_bytes()),
        ];

        for (name, data) in parts {
            zip.start_file(name, options).map_err(docx_error)?;
            zip.write_all(data)?;
        }

        let bytes = zip.finish().map_err(docx_error)?.into_inner();
        debug!(blocks = self.blocks.len(), bytes = bytes.len(), "DOCX生成");
        Ok(bytes)
    }
}

/// レポートを .docx にする
///
/// 生徒名を指定するとその生徒だけ、`None` ならクラス全員を出力する。
/// 指定した生徒がいなければ `StudentNotFound`。
pub fn render_document(
    student: Option<&str>,
    report: &ReportMap,
    options: &DocxOptions,
) -> Result<Vec<u8>> {
    build_document(student, report, options)?.to_bytes()
}

/// 書き出し前の文書を組み立てる
pub fn build_document(
    student: Option<&str>,
    report: &ReportMap,
    options: &DocxOptions,
) -> Result<ReportDocument> {
    match student {
        Some(name) => {
            let record = report.lookup(name)?;
            Ok(ReportDocument::for_student(name, record, options))
        }
        None => Ok(ReportDocument::for_class(report, options)),
    }
}

fn docx_error<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::DocxGeneration(e.to_string())
}

/// XML 1.0で使えない文字を除く（タブ・改行は残す）
fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|&c| match c {
            '\t' | '\n' | '\r' => true,
            '\u{FFFE}' | '\u{FFFF}' => false,
            c => c >= ' ',
        })
        .collect()
}

/// document.xml の書き出し
struct BodyWriter {
    writer: XmlWriter<Vec<u8>>,
}

impl BodyWriter {
    fn new() -> Self {
        Self {
            writer: XmlWriter::new(Vec::new()),
        }
    }

    fn into_inner(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(docx_error)
    }

    fn decl(&mut self) -> Result<()> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(elem))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Empty(elem))
    }

    /// `<w:r>` 1つ。改行は `<w:br/>`、タブは `<w:tab/>` にする
    fn run(&mut self, text: &str, bold: bool) -> Result<()> {
        self.start("w:r", &[])?;
        if bold {
            self.start("w:rPr", &[])?;
            self.empty("w:b", &[])?;
            self.end("w:rPr")?;
        }

        let text = clean_text(text).replace("\r\n", "\n").replace('\r', "\n");
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.empty("w:br", &[])?;
            }
            for (j, segment) in line.split('\t').enumerate() {
                if j > 0 {
                    self.empty("w:tab", &[])?;
                }
                if segment.is_empty() {
                    continue;
                }
                self.start("w:t", &[("xml:space", "preserve")])?;
                self.event(Event::Text(BytesText::new(segment)))?;
                self.end("w:t")?;
            }
        }

        self.end("w:r")
    }

    fn styled_paragraph(&mut self, style: &str, text: &str) -> Result<()> {
        self.start("w:p", &[])?;
        self.start("w:pPr", &[])?;
        self.empty("w:pStyle", &[("w:val", style)])?;
        self.end("w:pPr")?;
        self.run(text, false)?;
        self.end("w:p")
    }

    fn bullet(&mut self, label: &str, text: &str) -> Result<()> {
        self.start("w:p", &[])?;
        self.start("w:pPr", &[])?;
        self.empty("w:pStyle", &[("w:val", "ListBullet")])?;
        self.start("w:numPr", &[])?;
        self.empty("w:ilvl", &[("w:val", "0")])?;
        self.empty("w:numId", &[("w:val", "1")])?;
        self.end("w:numPr")?;
        self.end("w:pPr")?;
        self.run(label, true)?;
        self.run(text, false)?;
        self.end("w:p")
    }

    fn page_break(&mut self) -> Result<()> {
        self.start("w:p", &[])?;
        self.start("w:r", &[])?;
        self.empty("w:br", &[("w:type", "page")])?;
        self.end("w:r")?;
        self.end("w:p")
    }

    /// A4縦、余白1インチ
    fn section_properties(&mut self) -> Result<()> {
        self.start("w:sectPr", &[])?;
        self.empty("w:pgSz", &[("w:w", "11906"), ("w:h", "16838")])?;
        self.empty(
            "w:pgMar",
            &[
                ("w:top", "1440"),
                ("w:right", "1440"),
                ("w:bottom", "1440"),
                ("w:left", "1440"),
                ("w:header", "708"),
                ("w:footer", "708"),
                ("w:gutter", "0"),
            ],
        )?;
        self.end("w:sectPr")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use class_report_common::FieldMap;
    use std::io::Read;

    fn record(subjects: &[(&str, &str, &str)]) -> StudentRecord {
        let mut record = StudentRecord::default();
        for &(subject, field, comment) in subjects {
            record.insert_subject(subject, FieldMap::from_pairs([(field, comment)]).unwrap());
        }
        record
    }

    fn class() -> ReportMap {
        let mut report = ReportMap::default();
        report.insert_student("Jan Dupont", record(&[("Math", "Comment", "Good effort")]));
        report.insert_student("Marie Curie", record(&[("History", "Note", "Excellent")]));
        report
    }

    #[test]
    fn test_student_document_structure() {
        let report = class();
        let doc = build_document(Some("Jan Dupont"), &report, &DocxOptions::default()).unwrap();

        assert_eq!(
            doc.blocks(),
            &[
                Block::Title("Report Jan Dupont".into()),
                Block::Heading("Math".into()),
                Block::Bullet {
                    label: "Comment: ".into(),
                    text: "Good effort".into()
                },
            ]
        );
    }

    #[test]
    fn test_class_document_page_breaks_between_students() {
        let doc = ReportDocument::for_class(&class(), &DocxOptions::default());
        assert_eq!(doc.count_titles(), 2);
        assert_eq!(doc.count_page_breaks(), 1);
        assert_ne!(doc.blocks().last(), Some(&Block::PageBreak));
    }

    #[test]
    fn test_empty_class_has_no_blocks() {
        let doc = ReportDocument::for_class(&ReportMap::default(), &DocxOptions::default());
        assert!(doc.blocks().is_empty());
    }

    #[test]
    fn test_unknown_student() {
        let err = render_document(Some("Nobody"), &class(), &DocxOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ReportError::Common(class_report_common::Error::StudentNotFound(_))
        ));
    }

    #[test]
    fn test_document_xml_escapes_and_bolds() {
        let mut report = ReportMap::default();
        report.insert_student("A & B", record(&[("Math", "Comment", "x < y\nsecond line")]));
        let doc = ReportDocument::for_class(&report, &DocxOptions::default());

        let xml = String::from_utf8(doc.document_xml().unwrap()).unwrap();
        assert!(xml.contains("Report A &amp; B"));
        assert!(xml.contains("x &lt; y"));
        assert!(xml.contains("<w:br/>"));
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains(r#"<w:pStyle w:val="Title"/>"#));
        assert!(xml.contains(r#"<w:pStyle w:val="Heading1"/>"#));
        assert!(!xml.contains(r#"w:type="page""#));
    }

    #[test]
    fn test_to_bytes_is_docx_package() {
        let bytes = render_document(None, &class(), &DocxOptions::default()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        for part in ["[Content_Types].xml", "_rels/.rels", "word/styles.xml", "word/numbering.xml"] {
            assert!(archive.by_name(part).is_ok(), "missing part {}", part);
        }

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        assert_eq!(xml.matches(r#"w:type="page""#).count(), 1);
        assert!(xml.contains("Report Marie Curie"));
    }

    #[test]
    fn test_clean_text_drops_control_chars() {
        assert_eq!(clean_text("a\u{0b}b\tc"), "ab\tc");
    }

    #[test]
    fn test_clean_text_drops_noncharacters() {
        assert_eq!(clean_text("a\u{FFFE}b\u{FFFF}c\u{FFFD}"), "abc\u{FFFD}");
    }

    #[test]
    fn test_tab_becomes_tab_element() {
        let mut report = ReportMap::default();
        report.insert_student("Jan Dupont", record(&[("Math", "Comment", "Oral\tA\u{FFFF}")]));
        let doc = ReportDocument::for_class(&report, &DocxOptions::default());

        let xml = String::from_utf8(doc.document_xml().unwrap()).unwrap();
        assert!(xml.contains(r#"<w:t xml:space="preserve">Oral</w:t><w:tab/><w:t xml:space="preserve">A</w:t>"#));
        assert!(!xml.contains('\t'));
        assert!(!xml.contains('\u{FFFF}'));
    }
}
