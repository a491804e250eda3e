//! 読み込みからレポート構築までの一連の処理

use crate::cache::{content_hash, ReportCache};
use crate::error::{ReportError, Result};
use crate::normalizer;
use class_report_common::{build_report, ReportMap};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 読み込み結果
#[derive(Debug, Clone)]
pub struct LoadedReport {
    pub report: ReportMap,
    /// キャッシュから取得したか
    pub from_cache: bool,
}

/// ワークブックのバイト列からレポートを構築する
pub fn build_from_bytes(bytes: &[u8]) -> Result<ReportMap> {
    let normalized = normalizer::normalize(bytes)?;
    Ok(build_report(&normalized.tables, &normalized.students))
}

/// ワークブックファイルを読み込んでレポートにする
///
/// `use_cache` が有効なら、ファイルと同じフォルダのキャッシュを参照・更新する。
pub fn load_report(path: &Path, use_cache: bool) -> Result<LoadedReport> {
    if !path.is_file() {
        return Err(ReportError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let folder = path.parent().unwrap_or_else(|| Path::new("."));

    if !use_cache {
        let report = build_with_spinner(&bytes)?;
        return Ok(LoadedReport {
            report,
            from_cache: false,
        });
    }

    let hash = content_hash(&bytes);
    let mut cache = ReportCache::load(folder);

    if let Some(report) = cache.get(&hash) {
        info!(%hash, "キャッシュヒット");
        return Ok(LoadedReport {
            report: report.clone(),
            from_cache: true,
        });
    }
    debug!(%hash, "キャッシュミス");

    let report = build_with_spinner(&bytes)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    cache.insert(hash, file_name, bytes.len() as u64, report.clone());
    if let Err(e) = cache.save(folder) {
        // 保存できなくてもレポートは返す
        warn!(error = %e, "キャッシュを保存できません");
    }

    Ok(LoadedReport {
        report,
        from_cache: false,
    })
}

fn build_with_spinner(bytes: &[u8]) -> Result<ReportMap> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.enable_steady_tick(Duration::from_millis(100));

    spinner.set_message("ファイルを読み込み中...");
    let normalized = match normalizer::normalize(bytes) {
        Ok(n) => n,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    spinner.set_message("レポートを準備中...");
    let report = build_report(&normalized.tables, &normalized.students);
    spinner.finish_and_clear();

    Ok(report)
}
