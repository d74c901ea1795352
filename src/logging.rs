//! ログ出力（コンソール + メモリ上のリングバッファ）
//!
//! タイムスタンプは学校のローカル時刻（KST）。

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

// ログバッファ用グローバルMutex（MAX_LOG_ENTRIES を超えた古いログは捨てる）
static LOG_BUFFER: Mutex<Option<VecDeque<LogEntry>>> = Mutex::new(None);
const MAX_LOG_ENTRIES: usize = 1000;

/// ログバッファを初期化
///
/// 複数回呼び出しても安全ですが、既存のログは破棄されます。
pub fn init_log_buffer() {
    match LOG_BUFFER.lock() {
        Ok(mut buffer) => {
            *buffer = Some(VecDeque::with_capacity(MAX_LOG_ENTRIES));
        }
        Err(e) => {
            eprintln!("Failed to initialize log buffer: {e}");
        }
    }
}

fn now_kst(format: &str) -> String {
    chrono::Utc::now()
        .with_timezone(&chrono_tz::Asia::Seoul)
        .format(format)
        .to_string()
}

/// ログエントリを追加（未初期化なら何もしない）
pub fn add_log_entry(level: &str, message: &str) {
    match LOG_BUFFER.lock() {
        Ok(mut buffer) => {
            if let Some(ref mut logs) = *buffer {
                logs.push_back(LogEntry {
                    timestamp: now_kst("%Y-%m-%d %H:%M:%S%.3f"),
                    level: level.to_string(),
                    message: message.to_string(),
                });

                if logs.len() > MAX_LOG_ENTRIES {
                    logs.pop_front();
                }
            }
        }
        Err(e) => {
            // ロック取得失敗時は標準エラー出力に出力
            eprintln!("Failed to lock log buffer for adding entry: {e}");
        }
    }
}

/// ログエントリを新しい順で返す
///
/// `limit` はレベルで絞り込んだ後の件数に適用される。
pub fn get_log_entries(
    level_filter: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<LogEntry>, String> {
    let buffer = LOG_BUFFER
        .lock()
        .map_err(|e| format!("Failed to lock log buffer: {e}"))?;

    let Some(ref logs) = *buffer else {
        return Ok(Vec::new());
    };

    let mut filtered: Vec<LogEntry> = logs
        .iter()
        .filter(|entry| level_filter.map_or(true, |level| entry.level == level))
        .cloned()
        .collect();
    filtered.reverse();

    if let Some(limit) = limit {
        filtered.truncate(limit);
    }
    Ok(filtered)
}

/// env_logger を初期化する。2回目以降の呼び出しは無視される
///
/// リリースビルドでは Warn 以上、デバッグビルドでは Info 以上（RUST_LOG で上書き可）。
pub fn init_logger() {
    init_log_buffer();

    #[cfg(debug_assertions)]
    let default_level = log::LevelFilter::Info;
    #[cfg(not(debug_assertions))]
    let default_level = log::LevelFilter::Warn;

    let result = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .format(|buf, record| {
            add_log_entry(&record.level().to_string(), &format!("{}", record.args()));

            writeln!(
                buf,
                "[{} {:5} {}] {}",
                now_kst("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();

    if let Err(e) = result {
        eprintln!("Logger already initialized: {e}");
    }
}
