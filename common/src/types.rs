//! レポートの型定義
//!
//! - SubjectTable: 教科シート1枚分（生徒名 → 項目 → 所見）
//! - StudentRecord: 生徒1人分（教科 → 項目 → 所見）
//! - ReportMap: クラス全体（代表名 → StudentRecord）
//!
//! 空の教科エントリは型で表現できない。`FieldMap` は常に1件以上の
//! 空でない所見を持ち、`StudentRecord` は `FieldMap` しか受け取らない。

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// 空白のみ・空文字を欠損として扱う
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// 空の項目マップを作ろうとした
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("field map must contain at least one non-blank comment")]
pub struct EmptyFieldMap;

/// 項目名 → 所見（列順を保持、1件以上）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, String>", into = "IndexMap<String, String>")]
pub struct FieldMap(IndexMap<String, String>);

impl FieldMap {
    /// 空でない所見だけを集めて作る。1件も残らなければ `None`
    pub fn from_pairs<I, K, V>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields: IndexMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !is_blank(v))
            .collect();

        if fields.is_empty() {
            None
        } else {
            Some(Self(fields))
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 構築上、常に `false`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 後から来た値で上書きする（項目単位）
    pub fn overlay(&mut self, other: FieldMap) {
        self.0.extend(other.0);
    }
}

impl TryFrom<IndexMap<String, String>> for FieldMap {
    type Error = EmptyFieldMap;

    fn try_from(value: IndexMap<String, String>) -> std::result::Result<Self, Self::Error> {
        FieldMap::from_pairs(value).ok_or(EmptyFieldMap)
    }
}

impl From<FieldMap> for IndexMap<String, String> {
    fn from(value: FieldMap) -> Self {
        value.0
    }
}

/// 教科シート1枚分の正規化済みテーブル
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectTable {
    /// 項目名（列順）
    fields: Vec<String>,
    /// 生徒名 → 所見
    rows: IndexMap<String, FieldMap>,
}

impl SubjectTable {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            rows: IndexMap::new(),
        }
    }

    /// 行を追加する。同じ生徒が既にいれば項目単位で後勝ち
    pub fn insert_row(&mut self, student: impl Into<String>, fields: FieldMap) {
        match self.rows.entry(student.into()) {
            indexmap::map::Entry::Occupied(mut e) => e.get_mut().overlay(fields),
            indexmap::map::Entry::Vacant(e) => {
                e.insert(fields);
            }
        }
    }

    pub fn get(&self, student: &str) -> Option<&FieldMap> {
        self.rows.get(student)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// 生徒名（シート内の出現順）
    pub fn students(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &FieldMap)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 教科名（シート名）→ テーブル。シート順を保持
pub type SubjectTables = IndexMap<String, SubjectTable>;

/// 生徒1人分のレポート
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentRecord {
    subjects: IndexMap<String, FieldMap>,
}

impl StudentRecord {
    /// 教科を追加する。既存の教科は丸ごと置き換え、以前の値を返す
    pub fn insert_subject(&mut self, subject: impl Into<String>, fields: FieldMap) -> Option<FieldMap> {
        self.subjects.insert(subject.into(), fields)
    }

    /// 別の記録を取り込む（教科単位で `other` が勝つ）
    pub fn merge_from(&mut self, other: StudentRecord) {
        self.subjects.extend(other.subjects);
    }

    pub fn subject(&self, subject: &str) -> Option<&FieldMap> {
        self.subjects.get(subject)
    }

    pub fn subjects(&self) -> impl Iterator<Item = (&str, &FieldMap)> {
        self.subjects.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// 表記揺れによる統合の記録
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameMerge {
    /// 統合された名前
    pub candidate: String,
    /// 統合先の代表名
    pub canonical: String,
    /// 類似度
    pub score: f64,
}

/// クラス全体のレポート（代表名の採用順）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMap {
    students: IndexMap<String, StudentRecord>,
    #[serde(default)]
    merges: Vec<NameMerge>,
}

impl ReportMap {
    /// 代表名として追加する
    pub fn insert_student(&mut self, name: impl Into<String>, record: StudentRecord) {
        self.students.insert(name.into(), record);
    }

    /// `candidate` の記録を代表名 `canonical` に取り込む。
    /// 代表名が存在しなければ何もせず `false` を返す
    #[must_use]
    pub fn absorb(&mut self, canonical: &str, candidate: String, record: StudentRecord, score: f64) -> bool {
        let Some(target) = self.students.get_mut(canonical) else {
            return false;
        };
        target.merge_from(record);
        self.merges.push(NameMerge {
            candidate,
            canonical: canonical.to_string(),
            score,
        });
        true
    }

    pub fn get(&self, name: &str) -> Option<&StudentRecord> {
        self.students.get(name)
    }

    /// 生徒の記録を取得（見つからなければ `StudentNotFound`）
    pub fn lookup(&self, name: &str) -> Result<&StudentRecord> {
        self.get(name)
            .ok_or_else(|| Error::StudentNotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.students.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StudentRecord)> {
        self.students.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn merges(&self) -> &[NameMerge] {
        &self.merges
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
