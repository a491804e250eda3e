//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use class_report::error::{ParseError, ReportError};
use class_report::pipeline::load_report;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないファイルを読み込んだ場合
#[test]
fn test_load_nonexistent_file() {
    let result = load_report(Path::new("/nonexistent/path/12345.xlsx"), false);
    assert!(matches!(result.unwrap_err(), ReportError::FileNotFound(_)));
}

/// スプレッドシートでないファイル
#[test]
fn test_load_not_a_workbook() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("notes.xlsx");
    std::fs::write(&path, "hello").unwrap();

    let err = load_report(&path, false).unwrap_err();
    assert!(matches!(err, ReportError::Parse(ParseError::Unreadable(_))));
}

/// ReportErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        ReportError::Config("テスト設定エラー".to_string()),
        ReportError::FileNotFound("bilan.xlsx".to_string()),
        ReportError::DocxGeneration("DOCX生成エラー".to_string()),
        ReportError::TemplateGeneration("テンプレートエラー".to_string()),
        ReportError::SelectionCancelled,
        ReportError::Parse(ParseError::NoSheets),
        ReportError::Parse(ParseError::MissingNameColumns {
            sheet: "Math".to_string(),
        }),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// シート名がメッセージに含まれる
#[test]
fn test_parse_error_names_sheet() {
    let err = ReportError::Parse(ParseError::MissingHeader {
        sheet: "Histoire".to_string(),
    });
    assert!(format!("{}", err).contains("Histoire"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ReportError = io_err.into();

    assert!(matches!(err, ReportError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: ReportError = json_err.into();

    assert!(matches!(err, ReportError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_transparent() {
    let common_err = class_report_common::Error::StudentNotFound("Jan Dupont".to_string());
    let err: ReportError = common_err.into();

    assert!(matches!(err, ReportError::Common(_)));
    assert_eq!(format!("{}", err), "Student not found in report: Jan Dupont");
}
