//! テンプレート出力のテスト
//!
//! 生成したテンプレートがそのまま入力形式として読めることを確認する。

use class_report::export::{write_template, TemplateSpec};
use class_report::normalizer::normalize;

#[test]
fn test_template_with_roster_is_readable() {
    let spec = TemplateSpec {
        subjects: vec!["Math".into(), "History".into()],
        fields: vec!["Comment".into(), "Behavior".into()],
        students: vec![TemplateSpec::split_name("Jan Dupont")],
        banner: Some("Bilan 1er trimestre".into()),
    };

    let bytes = write_template(&spec).expect("テンプレート生成に失敗");
    let normalized = normalize(&bytes).expect("テンプレートを読めない");

    assert_eq!(normalized.tables.keys().collect::<Vec<_>>(), vec!["Math", "History"]);
    // 所見が空のうちは生徒として数えない
    assert!(normalized.students.is_empty());
    assert!(normalized.tables.values().all(|t| t.is_empty()));
}

#[test]
fn test_template_without_roster_has_no_name_columns() {
    let spec = TemplateSpec {
        subjects: vec!["Math".into()],
        fields: vec!["Comment".into()],
        ..Default::default()
    };

    let bytes = write_template(&spec).expect("テンプレート生成に失敗");
    // 生徒行がないシートは氏名列を判別できない
    assert!(normalize(&bytes).is_err());
}
