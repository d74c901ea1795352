//! アプリケーション設定ファイルの管理
//!
//! NEIS の教育庁コード・学校コード・プロキシを meal_config.json で管理する。
//! ファイルがなければ既定値（固定の学校）で作成する。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "meal_config.json";

pub const DEFAULT_API_BASE_URL: &str = "https://open.neis.go.kr/hub/mealServiceDietInfo";
/// 서울특별시교육청
pub const DEFAULT_OFFICE_CODE: &str = "B10";
pub const DEFAULT_SCHOOL_CODE: &str = "7010536";
/// CORS 回避用の公開プロキシ（`url` クエリに上流URLを渡す）
pub const DEFAULT_PROXY_ENDPOINT: &str = "https://api.allorigins.win/raw";

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    /// ATPT_OFCDC_SC_CODE
    pub office_code: String,
    /// SD_SCHUL_CODE
    pub school_code: String,
    /// NEIS 認証キー。未設定でもサンプル件数までは取得できる
    #[serde(default)]
    pub api_key: Option<String>,
    /// None の場合はプロキシを経由せず直接取得する
    #[serde(default = "default_proxy_endpoint")]
    pub proxy_endpoint: Option<String>,
}

fn default_proxy_endpoint() -> Option<String> {
    Some(DEFAULT_PROXY_ENDPOINT.to_string())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            office_code: DEFAULT_OFFICE_CODE.to_string(),
            school_code: DEFAULT_SCHOOL_CODE.to_string(),
            api_key: None,
            proxy_endpoint: default_proxy_endpoint(),
        }
    }
}

/// 設定を読み込む。ファイルが存在しない場合はデフォルトを返し、保存する。
pub fn load(config_dir: &Path) -> Result<AppConfig, String> {
    let path = config_dir.join(CONFIG_FILENAME);

    if path.exists() {
        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        serde_json::from_str(&contents).map_err(|e| format!("Invalid config JSON: {e}"))
    } else {
        let config = AppConfig::default();
        save(config_dir, &config)?;
        Ok(config)
    }
}

/// 設定を保存する。
pub fn save(config_dir: &Path, config: &AppConfig) -> Result<(), String> {
    fs::create_dir_all(config_dir).map_err(|e| format!("Failed to create config dir: {e}"))?;

    let path = config_dir.join(CONFIG_FILENAME);
    let contents = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {e}"))?;

    fs::write(&path, contents).map_err(|e| format!("Failed to write config file: {e}"))
}
