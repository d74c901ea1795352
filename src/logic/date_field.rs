//! 日付入力欄の状態
//!
//! 値は `YYYY-MM-DD` の文字列として保持し、空かどうか以外は検証しない。

use chrono::Utc;
use chrono_tz::Asia::Seoul;

/// 学校のローカル日付（KST）で今日を `YYYY-MM-DD` で返す
pub fn today_string() -> String {
    Utc::now().with_timezone(&Seoul).format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateField {
    value: String,
}

impl Default for DateField {
    fn default() -> Self {
        Self {
            value: today_string(),
        }
    }
}

impl DateField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// 空白のみも空とみなす
    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}
