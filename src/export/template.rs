//! 入力テンプレート（.xlsx）生成
//!
//! 教科ごとに1シート。1行目にバナー、3行目にヘッダー、
//! A列・B列が氏名（名・姓）、C列以降が評価項目。

use crate::error::{ReportError, Result};
use crate::normalizer::BANNER_ROWS;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// 氏名列の幅
const NAME_COL_WIDTH: f64 = 16.0;
/// 項目列の幅
const FIELD_COL_WIDTH: f64 = 40.0;

/// テンプレートの内容
#[derive(Debug, Clone, Default)]
pub struct TemplateSpec {
    /// 教科名（シート名）
    pub subjects: Vec<String>,
    /// 評価項目名
    pub fields: Vec<String>,
    /// 事前に記入する生徒（名, 姓）
    pub students: Vec<(String, String)>,
    /// バナー行に入れる見出し
    pub banner: Option<String>,
}

impl TemplateSpec {
    /// "Jan Dupont" を（名, 姓）に分ける。空白がなければ姓は空
    pub fn split_name(full: &str) -> (String, String) {
        let full = full.trim();
        match full.split_once(char::is_whitespace) {
            Some((first, last)) => (first.to_string(), last.trim().to_string()),
            None => (full.to_string(), String::new()),
        }
    }
}

/// テンプレートを生成してバイト列で返す
pub fn write_template(spec: &TemplateSpec) -> Result<Vec<u8>> {
    if spec.subjects.is_empty() {
        return Err(ReportError::TemplateGeneration(
            "教科が指定されていません".into(),
        ));
    }

    build_workbook(spec).map_err(|e| ReportError::TemplateGeneration(e.to_string()))
}

fn build_workbook(spec: &TemplateSpec) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let banner_format = Format::new().set_bold().set_font_size(14);
    let header_format = Format::new().set_bold().set_text_wrap();
    let wrap_format = Format::new().set_text_wrap();

    let header_row = BANNER_ROWS as u32;

    for subject in &spec.subjects {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(subject)?;

        let banner = spec.banner.as_deref().unwrap_or(subject);
        worksheet.write_string_with_format(0, 0, banner, &banner_format)?;

        worksheet.set_column_width(0, NAME_COL_WIDTH)?;
        worksheet.set_column_width(1, NAME_COL_WIDTH)?;

        for (i, field) in spec.fields.iter().enumerate() {
            let col = 2 + i as u16;
            worksheet.set_column_width(col, FIELD_COL_WIDTH)?;
            worksheet.write_string_with_format(header_row, col, field, &header_format)?;
        }

        for (i, (first, last)) in spec.students.iter().enumerate() {
            let row = header_row + 1 + i as u32;
            worksheet.write_string(row, 0, first)?;
            worksheet.write_string(row, 1, last)?;
            for j in 0..spec.fields.len() {
                worksheet.write_blank(row, 2 + j as u16, &wrap_format)?;
            }
        }
    }

    workbook.save_to_buffer()
}
