pub mod docx;
pub mod template;

pub use docx::{build_document, render_document, Block, DocxOptions, ReportDocument};
pub use template::{write_template, TemplateSpec};

use crate::error::Result;
use class_report_common::ReportMap;
use std::path::{Path, PathBuf};

/// クラス全体レポートの既定ファイル名
pub const CLASS_REPORT_FILE_NAME: &str = "class_report.docx";

/// 既定の出力ファイル名
pub fn default_file_name(student: Option<&str>) -> String {
    match student {
        Some(name) => format!("report_{}.docx", sanitize_file_name(name)),
        None => CLASS_REPORT_FILE_NAME.to_string(),
    }
}

/// ファイル名に使えない文字を `_` に置き換える
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// 出力先を決める
///
/// `output` がディレクトリまたは拡張子なしならその下に `file_name` を置く。
/// 未指定なら `fallback_dir`、それもなければカレントディレクトリ。
pub fn output_path_for(output: Option<&Path>, fallback_dir: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() || path.extension().is_none() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => fallback_dir
            .unwrap_or_else(|| Path::new("."))
            .join(file_name),
    }
}

/// レポートを .docx に書き出す
pub fn export_report(
    report: &ReportMap,
    student: Option<&str>,
    output_path: &Path,
    options: &DocxOptions,
) -> Result<()> {
    match student {
        Some(name) => println!("- {} のレポートを生成中...", name),
        None => println!("- クラス全体のレポートを生成中... ({}名)", report.len()),
    }

    let bytes = render_document(student, report, options)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, bytes)?;

    println!("✔ DOCX出力: {}", output_path.display());
    Ok(())
}
