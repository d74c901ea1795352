//! NEIS 給食食単 API クライアント
//!
//! # 取得経路
//! - 上流URL（教育庁コード・学校コード・日付）を組み立てる
//! - 公開 CORS プロキシの `url` パラメータにパーセントエンコードして埋め込む
//! - GET を1回だけ送る（リトライなし・クライアント側タイムアウトなし）
//!
//! # セキュリティ
//! - API キー（KEY）はログに出力しない

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use super::model::MealRow;
use super::parser::parse_xml_data;
use crate::config::AppConfig;
use crate::error::{MealError, Result};

/// 給食データ取得トレイト（テスト用モック対応）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MealClientTrait: Send + Sync {
    /// `YYYY-MM-DD` の日付の給食を取得してパースする
    async fn fetch_meal_data(&self, date: &str) -> Result<Vec<MealRow>>;
}

/// `YYYY-MM-DD` → `YYYYMMDD`
pub fn format_query_date(date: &str) -> Result<String> {
    let compact: String = date.trim().chars().filter(|c| *c != '-').collect();
    if compact.len() != 8 || !compact.chars().all(|c| c.is_ascii_digit()) {
        return Err(MealError::InvalidDate(date.to_string()));
    }
    Ok(compact)
}

/// 上流（NEIS）の URL を組み立てる
pub fn build_upstream_url(config: &AppConfig, query_date: &str) -> String {
    let mut url = format!(
        "{}?ATPT_OFCDC_SC_CODE={}&SD_SCHUL_CODE={}&MLSV_YMD={}",
        config.api_base_url,
        urlencoding::encode(&config.office_code),
        urlencoding::encode(&config.school_code),
        query_date
    );
    if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
        url.push_str("&Type=xml&KEY=");
        url.push_str(&urlencoding::encode(key));
    }
    url
}

/// 上流 URL をプロキシの `url` クエリパラメータとして包む
pub fn wrap_with_proxy(proxy_endpoint: &str, upstream_url: &str) -> String {
    let separator = if proxy_endpoint.contains('?') { '&' } else { '?' };
    format!(
        "{proxy_endpoint}{separator}url={}",
        urlencoding::encode(upstream_url)
    )
}

/// ルート証明書が読めない環境でも http:// の取得はできるようにする
fn build_https_connector() -> HttpsConnector<HttpConnector> {
    let builder = match hyper_rustls::HttpsConnectorBuilder::new().with_native_roots() {
        Ok(builder) => builder,
        Err(e) => {
            log::warn!("Failed to load native root certificates: {e}; https requests will fail");
            let tls = rustls::ClientConfig::builder()
                .with_root_certificates(rustls::RootCertStore::empty())
                .with_no_client_auth();
            hyper_rustls::HttpsConnectorBuilder::new().with_tls_config(tls)
        }
    };
    builder.https_or_http().enable_http1().build()
}

/// NEIS クライアント実装
pub struct NeisMealClient {
    config: AppConfig,
    http_client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl NeisMealClient {
    pub fn new(config: AppConfig) -> Self {
        let http_client = Client::builder(TokioExecutor::new()).build(build_https_connector());

        log::info!(
            "NeisMealClient created (office: {}, school: {}, proxy: {})",
            config.office_code,
            config.school_code,
            config.proxy_endpoint.as_deref().unwrap_or("none")
        );

        Self {
            config,
            http_client,
        }
    }

    /// 実際にリクエストする URL（プロキシ設定があれば包む）
    fn build_request_url(&self, query_date: &str) -> String {
        let upstream = build_upstream_url(&self.config, query_date);
        match self.config.proxy_endpoint.as_deref() {
            Some(proxy) => wrap_with_proxy(proxy, &upstream),
            None => upstream,
        }
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(url)
            .header("Accept", "application/xml, text/xml, */*")
            .body(Full::new(Bytes::new()))
            .map_err(|e| MealError::Network(format!("Failed to build request: {e}")))?;

        let response = self.http_client.request(req).await?;
        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| MealError::Network(format!("Failed to read response body: {e}")))?
            .to_bytes();

        if !status.is_success() {
            log::error!(
                "Meal API error (status {}), response body length: {} bytes",
                status,
                body_bytes.len()
            );
            return Err(MealError::HttpStatus(status.as_u16()));
        }

        Ok(String::from_utf8_lossy(&body_bytes).into_owned())
    }
}

#[async_trait]
impl MealClientTrait for NeisMealClient {
    async fn fetch_meal_data(&self, date: &str) -> Result<Vec<MealRow>> {
        let query_date = format_query_date(date)?;
        let url = self.build_request_url(&query_date);

        // KEY 以降はログに出さない
        let safe_url = url.split("KEY").next().unwrap_or(&url);
        log::debug!("Meal API URL: {}", safe_url);

        let body = self.get_text(&url).await?;
        log::info!("Meal API responded with {} bytes for {}", body.len(), query_date);

        parse_xml_data(&body)
    }
}
