//! 給食検索のエラー型
//!
//! 画面上はすべて同じエラーパネルに集約されるが、ログには種類ごとの詳細を残す。

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MealError>;

#[derive(Debug, Error)]
pub enum MealError {
    /// `YYYY-MM-DD` 形式でない日付
    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("Network error: {0}")]
    Network(String),

    /// HTTP ステータスが 2xx 以外
    #[error("Network response was not ok (status {0})")]
    HttpStatus(u16),

    /// NEIS が成功以外の結果コードを返した
    #[error("Upstream error ({code}): {message}")]
    Upstream { code: String, message: String },

    #[error("Failed to parse XML: {0}")]
    Xml(String),
}

impl From<roxmltree::Error> for MealError {
    fn from(err: roxmltree::Error) -> Self {
        MealError::Xml(err.to_string())
    }
}

impl From<hyper_util::client::legacy::Error> for MealError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        MealError::Network(err.to_string())
    }
}
