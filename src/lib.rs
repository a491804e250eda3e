//! class-report
//!
//! 教科ごとのシートを持つ評価ワークブックを読み込み、
//! 生徒別レポートに組み替えてDOCXで出力する。

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logger;
pub mod normalizer;
pub mod picker;
pub mod pipeline;

pub use class_report_common as common;
