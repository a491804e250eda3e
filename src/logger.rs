//! ログ初期化

use tracing_subscriber::EnvFilter;

/// tracingの購読者を設定する
///
/// `RUST_LOG` があればそれを優先。なければ `--verbose` で debug、通常は warn。
/// ログは標準エラーへ出し、標準出力は進捗表示に使う。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
