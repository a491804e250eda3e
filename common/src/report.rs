//! 生徒別レポートの構築
//!
//! ## 処理フロー
//! 1. 教科別テーブルを生徒別に組み替える（ピボット）
//! 2. 表記揺れの生徒名を代表名に統合する

use crate::similarity::similarity;
use crate::types::{ReportMap, StudentRecord, SubjectTables};
use tracing::{debug, info};

/// この類似度以上の名前は同一生徒とみなす
pub const DUPLICATE_NAME_THRESHOLD: f64 = 0.8;

/// 教科別テーブルから生徒別レポートを構築する
///
/// # Arguments
/// * `tables` - 教科名 → 正規化済みテーブル
/// * `names` - 生徒名（初出順、重複なし）
pub fn build_report(tables: &SubjectTables, names: &[String]) -> ReportMap {
    let records = pivot(tables, names);
    let report = merge_near_duplicates(records);
    info!(
        students = names.len(),
        canonical = report.len(),
        merged = report.merges().len(),
        "レポート構築完了"
    );
    report
}

/// 生徒ごとに、行がある教科だけを集める
///
/// テーブルの行は空でない所見を必ず1件以上持つので、
/// 行がない教科は記録に現れない。
pub fn pivot(tables: &SubjectTables, names: &[String]) -> Vec<(String, StudentRecord)> {
    names
        .iter()
        .map(|name| {
            let mut record = StudentRecord::default();
            for (subject, table) in tables {
                if let Some(fields) = table.get(name) {
                    record.insert_subject(subject.clone(), fields.clone());
                }
            }
            (name.clone(), record)
        })
        .collect()
}

/// 表記揺れの名前を統合する
///
/// 名前を順に見て、これまでに採用した代表名と採用順に比較する。
/// 最初に閾値以上となった代表名に記録を取り込み（教科単位で後勝ち）、
/// どれにも該当しなければ新しい代表名として採用する。
/// 代表名同士は後から比較し直さない。
pub fn merge_near_duplicates(records: Vec<(String, StudentRecord)>) -> ReportMap {
    let mut report = ReportMap::default();

    for (candidate, record) in records {
        let hit = report
            .names()
            .map(|canonical| (canonical, similarity(&candidate, canonical)))
            .find(|(_, score)| *score >= DUPLICATE_NAME_THRESHOLD)
            .map(|(canonical, score)| (canonical.to_string(), score));

        match hit {
            Some((canonical, score)) => {
                debug!(%candidate, %canonical, score, "表記揺れを統合");
                let absorbed = report.absorb(&canonical, candidate, record, score);
                debug_assert!(absorbed, "代表名はレポート内から選ばれる");
            }
            None => report.insert_student(candidate, record),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldMap, SubjectTable};

    /// (生徒, 項目, 所見) の並びからテーブルを作る
    fn table(cells: &[(&str, &str, &str)]) -> SubjectTable {
        let mut table = SubjectTable::new(vec!["Comment".into(), "Note".into()]);
        for &(student, field, comment) in cells {
            if let Some(fields) = FieldMap::from_pairs([(field, comment)]) {
                table.insert_row(student, fields);
            }
        }
        table
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pivot_only_present_subjects() {
        let mut tables = SubjectTables::new();
        tables.insert("Math".into(), table(&[("Jan Dupont", "Comment", "Good effort")]));
        tables.insert("History".into(), table(&[("Marie Curie", "Note", "Excellent")]));

        let records = pivot(&tables, &names(&["Jan Dupont", "Marie Curie"]));

        let (_, jan) = &records[0];
        assert!(jan.subject("Math").is_some());
        assert!(jan.subject("History").is_none());
        assert_eq!(jan.len(), 1);
    }

    #[test]
    fn test_merge_first_canonical_wins() {
        let mut tables = SubjectTables::new();
        tables.insert("Math".into(), table(&[("Jan Dupont", "Comment", "math")]));
        tables.insert("History".into(), table(&[("Jan Dupond", "Comment", "history")]));

        let report = build_report(&tables, &names(&["Jan Dupont", "Jan Dupond"]));

        assert_eq!(report.len(), 1);
        let jan = report.get("Jan Dupont").unwrap();
        assert_eq!(jan.subject("Math").unwrap().get("Comment"), Some("math"));
        assert_eq!(jan.subject("History").unwrap().get("Comment"), Some("history"));

        let merge = &report.merges()[0];
        assert_eq!(merge.candidate, "Jan Dupond");
        assert_eq!(merge.canonical, "Jan Dupont");
        assert!(merge.score >= DUPLICATE_NAME_THRESHOLD);
    }

    #[test]
    fn test_merge_candidate_subject_overwrites() {
        let mut tables = SubjectTables::new();
        tables.insert(
            "Math".into(),
            table(&[
                ("Jan Dupont", "Comment", "from canonical"),
                ("Jan Dupont", "Note", "A"),
                ("Jan Dupond", "Comment", "from candidate"),
            ]),
        );

        let report = build_report(&tables, &names(&["Jan Dupont", "Jan Dupond"]));

        let math = report.get("Jan Dupont").unwrap().subject("Math").unwrap();
        assert_eq!(math.get("Comment"), Some("from candidate"));
        // 教科単位の置き換えなので正規名側の項目は残らない
        assert_eq!(math.get("Note"), None);
    }

    #[test]
    fn test_merge_stops_at_first_canonical() {
        // "abcdefghij" と "abcdefgxyz" は 0.7 で別人。
        // "abcdefghiz" は両方と 0.8 以上だが、先に採用された方に統合される
        let records = vec![
            ("abcdefghij".to_string(), StudentRecord::default()),
            ("abcdefgxyz".to_string(), StudentRecord::default()),
            ("abcdefghiz".to_string(), StudentRecord::default()),
        ];

        let report = merge_near_duplicates(records);

        assert_eq!(report.names().collect::<Vec<_>>(), vec!["abcdefghij", "abcdefgxyz"]);
        assert_eq!(report.merges().len(), 1);
        assert_eq!(report.merges()[0].canonical, "abcdefghij");
    }

    #[test]
    fn test_merged_names_are_not_compared() {
        // "abcdefghXY" は "abcdefghij" に 0.8 で統合される。
        // "abcdefXYZW" は統合済みの "abcdefghXY" とは 0.8 だが、
        // 代表名 "abcdefghij" とは 0.6 なので別人のまま
        let records = vec![
            ("abcdefghij".to_string(), StudentRecord::default()),
            ("abcdefghXY".to_string(), StudentRecord::default()),
            ("abcdefXYZW".to_string(), StudentRecord::default()),
        ];
        assert!(similarity("abcdefXYZW", "abcdefghXY") >= DUPLICATE_NAME_THRESHOLD);

        let report = merge_near_duplicates(records);

        assert_eq!(report.names().collect::<Vec<_>>(), vec!["abcdefghij", "abcdefXYZW"]);
        assert_eq!(report.merges().len(), 1);
        assert_eq!(report.merges()[0].candidate, "abcdefghXY");
        assert_eq!(report.merges()[0].canonical, "abcdefghij");
    }

    #[test]
    fn test_candidate_is_first_argument() {
        // 類似度は非対称。比較は similarity(候補, 代表名) の順
        assert!(similarity("JanoDp ont", "Jan Dupont") >= DUPLICATE_NAME_THRESHOLD);
        assert!(similarity("Jan Dupont", "JanoDp ont") < DUPLICATE_NAME_THRESHOLD);
        assert!(similarity("JDna upont", "Jan Dupont") < DUPLICATE_NAME_THRESHOLD);
        assert!(similarity("Jan Dupont", "JDna upont") >= DUPLICATE_NAME_THRESHOLD);

        let records = vec![
            ("Jan Dupont".to_string(), StudentRecord::default()),
            ("JanoDp ont".to_string(), StudentRecord::default()),
            ("JDna upont".to_string(), StudentRecord::default()),
        ];

        let report = merge_near_duplicates(records);

        assert_eq!(report.names().collect::<Vec<_>>(), vec!["Jan Dupont", "JDna upont"]);
        assert_eq!(report.merges().len(), 1);
        assert_eq!(report.merges()[0].candidate, "JanoDp ont");
        assert!((report.merges()[0].score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_distinct_students_stay_separate() {
        let mut tables = SubjectTables::new();
        tables.insert(
            "Math".into(),
            table(&[
                ("Jan Dupont", "Comment", "Good effort"),
                ("Marie Curie", "Note", "Excellent"),
            ]),
        );

        let report = build_report(&tables, &names(&["Jan Dupont", "Marie Curie"]));
        assert_eq!(report.names().collect::<Vec<_>>(), vec!["Jan Dupont", "Marie Curie"]);
        assert!(report.merges().is_empty());
    }

    #[test]
    fn test_build_report_is_deterministic() {
        let mut tables = SubjectTables::new();
        tables.insert("Math".into(), table(&[("Jan Dupont", "Comment", "x")]));
        let list = names(&["Jan Dupont"]);

        assert_eq!(build_report(&tables, &list), build_report(&tables, &list));
    }
}
