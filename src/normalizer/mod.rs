//! ワークブック正規化モジュール
//!
//! 教科ごとのシートを読み込み、生徒名をキーにしたテーブルへ整える。
//!
//! ## 処理フロー（シートごと）
//! 1. 先頭2行（バナー行）を読み飛ばし、3行目をヘッダーとする
//! 2. 全空行・全空列を除去
//! 3. 先頭2列を連結して生徒名にする
//! 4. 所見のない行・列を再度除去
//! 5. 新しい生徒名を初出順に記録

pub mod sheet;

pub use sheet::{normalize_sheet, Grid, BANNER_ROWS};

use crate::error::ParseError;
use calamine::{open_workbook_auto_from_rs, Reader};
use class_report_common::SubjectTables;
use std::collections::HashSet;
use std::io::Cursor;
use tracing::info;

/// 正規化結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedWorkbook {
    /// 教科名 → テーブル（シート順）
    pub tables: SubjectTables,
    /// 生徒名（全シートを通した初出順、重複なし）
    pub students: Vec<String>,
}

/// ワークブックのバイト列を正規化する
///
/// xlsx / ods / xls / xlsb を内容から判別する。
/// 1枚でも不正なシートがあれば全体を失敗とする。
pub fn normalize(bytes: &[u8]) -> Result<NormalizedWorkbook, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ParseError::Unreadable(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(ParseError::NoSheets);
    }

    let mut grids = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ParseError::Unreadable(format!("{}: {}", name, e)))?;
        grids.push((name, sheet::grid_from_range(&range)));
    }

    let normalized = normalize_grids(grids)?;
    info!(
        sheets = normalized.tables.len(),
        students = normalized.students.len(),
        "ワークブック読み込み完了"
    );
    Ok(normalized)
}

/// シート名とグリッドの組から正規化する
pub fn normalize_grids<I>(sheets: I) -> Result<NormalizedWorkbook, ParseError>
where
    I: IntoIterator<Item = (String, Grid)>,
{
    let mut result = NormalizedWorkbook::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (subject, grid) in sheets {
        let table = normalize_sheet(&subject, grid)?;

        for student in table.students() {
            if seen.insert(student.to_string()) {
                result.students.push(student.to_string());
            }
        }

        result.tables.insert(subject, table);
    }

    if result.tables.is_empty() {
        return Err(ParseError::NoSheets);
    }

    Ok(result)
}
