//! Class Report Common Library
//!
//! 教科別評価シートを生徒別レポートに組み替える中核処理。
//! ファイル入出力を持たず、CLIから入力済みのテーブルを受け取る。

pub mod types;
pub mod error;
pub mod similarity;
pub mod report;
pub mod preview;

pub use types::{is_blank, FieldMap, NameMerge, ReportMap, StudentRecord, SubjectTable, SubjectTables};
pub use error::{Error, Result};
pub use similarity::similarity;
pub use report::{build_report, merge_near_duplicates, pivot, DUPLICATE_NAME_THRESHOLD};
pub use preview::render_markdown;
