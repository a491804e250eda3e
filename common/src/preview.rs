//! 画面表示用のMarkdownプレビュー

use crate::types::StudentRecord;
use std::fmt::Write;

/// 生徒1人分をMarkdownにする
///
/// 教科ごとに `## 教科`、項目ごとに `+ **項目: **所見` の行を出力する。
pub fn render_markdown(name: &str, title_prefix: &str, record: &StudentRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} {}", title_prefix, name);

    for (subject, fields) in record.subjects() {
        let _ = writeln!(out, "\n## {}", subject);
        for (field, comment) in fields.iter() {
            let _ = writeln!(out, "+ **{}: **{}", field, comment);
        }
    }

    out
}
