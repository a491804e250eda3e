//! シート単位の正規化
//!
//! - バナー行の読み飛ばし
//! - 空行・空列の除去
//! - 氏名列（先頭2列）の連結

use crate::error::ParseError;
use calamine::{Data, Range};
use class_report_common::{is_blank, FieldMap, SubjectTable};
use std::collections::HashMap;
use tracing::debug;

/// シート先頭の読み飛ばす行数
pub const BANNER_ROWS: usize = 2;

/// 氏名の断片を持つ列数（姓・名）
const NAME_COLUMNS: usize = 2;

/// セル値のグリッド（A1起点、空セルは `None`）
pub type Grid = Vec<Vec<Option<String>>>;

/// calamineのRangeをA1起点のグリッドにする
///
/// Rangeは最初の非空セルから始まるため、絶対座標で取り直して
/// 先頭の空行・空列を残す。
pub fn grid_from_range(range: &Range<Data>) -> Grid {
    let Some((end_row, end_col)) = range.end() else {
        return Vec::new();
    };

    (0..=end_row)
        .map(|row| {
            (0..=end_col)
                .map(|col| range.get_value((row, col)).and_then(cell_text))
                .collect()
        })
        .collect()
}

/// セルの表示文字列。空・エラーセルは欠損
pub fn cell_text(data: &Data) -> Option<String> {
    match data {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if is_blank(s) => None,
        Data::String(s) => Some(s.clone()),
        other => {
            let text = other.to_string();
            (!is_blank(&text)).then_some(text)
        }
    }
}

/// シート1枚を教科テーブルに正規化する
pub fn normalize_sheet(sheet: &str, grid: Grid) -> Result<SubjectTable, ParseError> {
    if grid.len() <= BANNER_ROWS {
        return Err(ParseError::MissingHeader {
            sheet: sheet.to_string(),
        });
    }

    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    if width < NAME_COLUMNS {
        return Err(ParseError::MissingNameColumns {
            sheet: sheet.to_string(),
        });
    }

    let mut rows = grid.into_iter().skip(BANNER_ROWS);
    let header = rows.next().unwrap_or_default();
    let headers = column_names(&header, width);

    // 全空行を除去
    let data: Vec<Vec<Option<String>>> = rows
        .filter(|row| row.iter().any(Option::is_some))
        .collect();

    // 全空列を除去（ヘッダーは判定に含めない）
    let kept: Vec<usize> = (0..width)
        .filter(|&col| data.iter().any(|row| cell(row, col).is_some()))
        .collect();

    debug!(
        sheet,
        rows = data.len(),
        columns = kept.len(),
        dropped_columns = width - kept.len(),
        "空行・空列を除去"
    );

    if !(0..NAME_COLUMNS).all(|col| kept.contains(&col)) {
        return Err(ParseError::MissingNameColumns {
            sheet: sheet.to_string(),
        });
    }

    let field_columns: Vec<usize> = kept.into_iter().filter(|&col| col >= NAME_COLUMNS).collect();

    let mut entries: Vec<(String, FieldMap)> = Vec::new();
    let mut skipped = 0usize;
    for row in &data {
        let Some(student) = student_name(row) else {
            skipped += 1;
            continue;
        };
        let pairs = field_columns
            .iter()
            .filter_map(|&col| cell(row, col).map(|text| (headers[col].as_str(), text)));
        // 所見が1件もない行は除去
        match FieldMap::from_pairs(pairs) {
            Some(fields) => entries.push((student, fields)),
            None => skipped += 1,
        }
    }

    // 氏名連結後に空になった列を除去
    let fields: Vec<String> = field_columns
        .iter()
        .map(|&col| headers[col].clone())
        .filter(|name| entries.iter().any(|(_, fields)| fields.get(name).is_some()))
        .collect();

    let mut table = SubjectTable::new(fields);
    for (student, fields) in entries {
        table.insert_row(student, fields);
    }

    debug!(sheet, students = table.len(), skipped, "シート正規化完了");
    Ok(table)
}

fn cell(row: &[Option<String>], col: usize) -> Option<&str> {
    row.get(col).and_then(|c| c.as_deref())
}

/// 先頭2列を半角スペースで連結した生徒名。どちらかが空なら `None`
fn student_name(row: &[Option<String>]) -> Option<String> {
    let first = cell(row, 0)?;
    let last = cell(row, 1)?;
    Some(format!("{} {}", first, last))
}

/// ヘッダー行から列名を作る
///
/// 空のヘッダーは `Unnamed: <列番号>`、重複には `.1`, `.2` を付ける。
fn column_names(header: &[Option<String>], width: usize) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    (0..width)
        .map(|col| {
            let base = cell(header, col)
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("Unnamed: {}", col));
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}
