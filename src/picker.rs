//! 生徒の対話式選択モジュール

use crate::error::{ReportError, Result};
use class_report_common::ReportMap;
use dialoguer::Select;

/// レポート順の生徒一覧から1人を選ぶ
pub fn select_student_interactive(report: &ReportMap) -> Result<String> {
    let names: Vec<&str> = report.names().collect();
    if names.is_empty() {
        println!("⚠ レポートに生徒がいません");
        return Err(ReportError::SelectionCancelled);
    }

    let selection = Select::new()
        .with_prompt("生徒を選択してください")
        .items(&names)
        .default(0)
        .interact_opt()
        .map_err(|e| ReportError::Io(std::io::Error::other(e.to_string())))?;

    match selection {
        Some(index) => {
            println!("→ {} を選択", names[index]);
            Ok(names[index].to_string())
        }
        None => Err(ReportError::SelectionCancelled),
    }
}

/// `--student` / `--pick` から対象の生徒を決める。どちらもなければ `None`（クラス全体）
pub fn resolve_student(report: &ReportMap, student: Option<String>, pick: bool) -> Result<Option<String>> {
    match (student, pick) {
        (Some(name), _) => {
            report.lookup(&name)?;
            Ok(Some(name))
        }
        (None, true) => select_student_interactive(report).map(Some),
        (None, false) => Ok(None),
    }
}
