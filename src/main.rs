use anyhow::Context;
use clap::Parser;
use class_report::{cache, cli, config, export, logger, picker, pipeline};
use class_report_common::render_markdown;
use cli::{Cli, Commands};
use config::Config;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);
    let config = Config::load().context("設定ファイルを読み込めません")?;

    match cli.command {
        Commands::Export { workbook, student, pick, output, use_cache } => {
            println!("📄 class-report - レポート出力\n");

            let loaded = load(&workbook, use_cache || config.use_cache, false)?;
            let student = picker::resolve_student(&loaded.report, student, pick)?;

            let file_name = export::default_file_name(student.as_deref());
            let output_path = export::output_path_for(
                output.as_deref(),
                config.output_dir.as_deref(),
                &file_name,
            );

            let options = export::DocxOptions {
                title_prefix: config.title_prefix.clone(),
            };
            export::export_report(&loaded.report, student.as_deref(), &output_path, &options)
                .with_context(|| format!("{} に書き出せません", output_path.display()))?;

            println!("\n✅ 出力完了");
        }

        Commands::Show { workbook, student, use_cache } => {
            let loaded = load(&workbook, use_cache || config.use_cache, false)?;

            let name = match student {
                Some(name) => name,
                None => picker::select_student_interactive(&loaded.report)?,
            };
            let record = loaded.report.lookup(&name)?;

            println!("{}", render_markdown(&name, &config.title_prefix, record));
        }

        Commands::Students { workbook, json, use_cache } => {
            let loaded = load(&workbook, use_cache || config.use_cache, json)?;
            let report = &loaded.report;

            if json {
                println!("{}", report.to_json()?);
                return Ok(());
            }

            println!("生徒一覧 ({}名):", report.len());
            for (i, (name, record)) in report.iter().enumerate() {
                println!("  {:>3}. {} ({}教科)", i + 1, name, record.len());
            }

            if !report.merges().is_empty() {
                println!("\n表記揺れの統合 ({}件):", report.merges().len());
                for merge in report.merges() {
                    println!(
                        "  {} → {} (類似度 {:.2})",
                        merge.candidate, merge.canonical, merge.score
                    );
                }
            }
        }

        Commands::Template { subjects, fields, students, banner, output } => {
            let spec = export::TemplateSpec {
                subjects,
                fields,
                students: students
                    .iter()
                    .map(|s| export::TemplateSpec::split_name(s))
                    .collect(),
                banner,
            };

            let bytes = export::write_template(&spec)?;
            std::fs::write(&output, bytes)
                .with_context(|| format!("{} に書き出せません", output.display()))?;
            println!("✔ テンプレート出力: {}", output.display());
        }

        Commands::Config { set_title_prefix, set_output_dir, use_cache, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(prefix) = set_title_prefix {
                config.set_title_prefix(prefix)?;
                println!("✔ タイトル接頭辞を設定しました");
                changed = true;
            }

            if let Some(dir) = set_output_dir {
                config.output_dir = Some(dir);
                println!("✔ 出力先フォルダを設定しました");
                changed = true;
            }

            if let Some(flag) = use_cache {
                config.use_cache = flag;
                println!("✔ キャッシュ設定を変更しました");
                changed = true;
            }

            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定:");
                println!("  タイトル接頭辞: {}", config.title_prefix);
                println!(
                    "  出力先: {}",
                    config
                        .output_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "カレントディレクトリ".into())
                );
                println!("  キャッシュ: {}", if config.use_cache { "有効" } else { "無効" });
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = cache::ReportCache::cache_path(&target);

            if info || !clear {
                if cache_path.exists() {
                    let cache = cache::ReportCache::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match cache::ReportCache::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}

/// ワークブックを読み込む。`quiet` なら進捗を表示しない
fn load(
    workbook: &std::path::Path,
    use_cache: bool,
    quiet: bool,
) -> anyhow::Result<pipeline::LoadedReport> {
    let loaded = pipeline::load_report(workbook, use_cache)
        .with_context(|| format!("{} を処理できません", workbook.display()))?;

    if quiet {
        return Ok(loaded);
    }
    println!(
        "✔ {}名の生徒を読み込みました{}",
        loaded.report.len(),
        if loaded.from_cache { " (キャッシュ)" } else { "" }
    );
    Ok(loaded)
}
