/// 入力検証エラーの分類。
///
/// 入力形状のエラーは分類器を起動する前に検出し、部分的なレポートを
/// 返さずに中断する。
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 表形式入力に必須の `Text` 列が無い、またはパース不能。
    #[error("invalid input format: {0}")]
    InvalidInputFormat(String),
    /// CSV でも PDF でもないアップロード。
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    /// 取り込み後に使用可能なレコードがゼロ件。致命的ではない。
    #[error("no usable records found in the upload")]
    EmptyInput,
}

impl AnalysisError {
    /// HTTP レスポンスにマップする際のステータスコード。
    ///
    /// `EmptyInput` はエラー応答ではなく情報応答として扱うため、
    /// ここでは到達しない想定で 200 を返す。
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInputFormat(_) | Self::UnsupportedFileType(_) => StatusCode::BAD_REQUEST,
            Self::EmptyInput => StatusCode::OK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_shape_errors_map_to_bad_request() {
        let error = AnalysisError::InvalidInputFormat("missing `Text` column".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);

        let error = AnalysisError::UnsupportedFileType("notes.docx".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_input_is_not_an_error_status() {
        assert_eq!(AnalysisError::EmptyInput.status_code(), StatusCode::OK);
    }

    #[test]
    fn messages_are_specific() {
        let error = AnalysisError::InvalidInputFormat("missing `Text` column".to_string());
        assert_eq!(
            error.to_string(),
            "invalid input format: missing `Text` column"
        );
    }
}
