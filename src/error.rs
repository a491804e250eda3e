use thiserror::Error;

/// ワークブック読み込み時のエラー
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("ワークブックを読み込めません: {0}")]
    Unreadable(String),

    #[error("ワークブックにシートがありません")]
    NoSheets,

    #[error("シート「{sheet}」にヘッダー行がありません（先頭2行はバナー行）")]
    MissingHeader { sheet: String },

    #[error("シート「{sheet}」に氏名列（先頭2列）がありません")]
    MissingNameColumns { sheet: String },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("ワークブック解析エラー: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Common(#[from] class_report_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("DOCX生成エラー: {0}")]
    DocxGeneration(String),

    #[error("テンプレート生成エラー: {0}")]
    TemplateGeneration(String),

    #[error("生徒の選択を中断しました")]
    SelectionCancelled,
}

pub type Result<T> = std::result::Result<T, ReportError>;
