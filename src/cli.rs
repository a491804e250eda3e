use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "class-report")]
#[command(about = "教科別評価シートから生徒別レポートを生成するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// レポートをDOCXで出力（クラス全体または生徒1人）
    Export {
        /// 評価ワークブック（xlsx/ods）
        #[arg(required = true)]
        workbook: PathBuf,

        /// 対象の生徒（省略時はクラス全体）
        #[arg(short, long, conflicts_with = "pick")]
        student: Option<String>,

        /// 生徒を一覧から選択
        #[arg(long)]
        pick: bool,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// キャッシュを使用（再構築をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// 生徒1人のレポートを画面に表示
    Show {
        /// 評価ワークブック（xlsx/ods）
        #[arg(required = true)]
        workbook: PathBuf,

        /// 対象の生徒（省略時は一覧から選択）
        #[arg(short, long)]
        student: Option<String>,

        /// キャッシュを使用（再構築をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// 生徒一覧と表記揺れの統合結果を表示
    Students {
        /// 評価ワークブック（xlsx/ods）
        #[arg(required = true)]
        workbook: PathBuf,

        /// レポート全体をJSONで出力
        #[arg(long)]
        json: bool,

        /// キャッシュを使用（再構築をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// 入力用の空テンプレート（xlsx）を生成
    Template {
        /// 教科名（シートごと、複数指定可）
        #[arg(short, long = "subject", required = true)]
        subjects: Vec<String>,

        /// 評価項目名（複数指定可）
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// 事前に記入する生徒名 "名 姓"（複数指定可）
        #[arg(short = 'n', long = "student")]
        students: Vec<String>,

        /// バナー行の見出し（省略時は教科名）
        #[arg(long)]
        banner: Option<String>,

        /// 出力ファイル
        #[arg(short, long, default_value = "template.xlsx")]
        output: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// タイトルの接頭辞を設定
        #[arg(long)]
        set_title_prefix: Option<String>,

        /// 既定の出力先フォルダを設定
        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        /// 常にキャッシュを使うか
        #[arg(long)]
        use_cache: Option<bool>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}
