//! E2E テスト用の外部APIモック
//!
//! 環境変数 MEAL_E2E_MOCK=1 が設定されている場合、NEIS（とプロキシ）への
//! 実際の API 呼び出しを固定の XML に置き換え、CI やローカル E2E で外部依存なしに
//! 画面を確認できるようにする。固定 XML も本物と同じパーサーを通す。

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};

use crate::config::AppConfig;
use crate::error::Result;
use crate::meal::client::format_query_date;
use crate::meal::{parse_xml_data, MealClientTrait, MealRow, NeisMealClient};

const E2E_WEEKDAY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mealServiceDietInfo>
  <head>
    <list_total_count>3</list_total_count>
    <RESULT><CODE>INFO-000</CODE><MESSAGE>정상 처리되었습니다.</MESSAGE></RESULT>
  </head>
  <row>
    <MLSV_YMD>{date}</MLSV_YMD>
    <MMEAL_SC_NM>조식</MMEAL_SC_NM>
    <DDISH_NM><![CDATA[토스트1.2.5.<br/>딸기잼<br/>우유2.]]></DDISH_NM>
    <SCHUL_NM>E2E테스트고등학교</SCHUL_NM>
  </row>
  <row>
    <MLSV_YMD>{date}</MLSV_YMD>
    <MMEAL_SC_NM>중식</MMEAL_SC_NM>
    <DDISH_NM><![CDATA[현미밥<br/>쇠고기미역국5.6.16.<br/>제육볶음10.13.<br/>배추김치9.]]></DDISH_NM>
    <SCHUL_NM>E2E테스트고등학교</SCHUL_NM>
  </row>
  <row>
    <MLSV_YMD>{date}</MLSV_YMD>
    <MMEAL_SC_NM>석식</MMEAL_SC_NM>
    <DDISH_NM><![CDATA[카레라이스2.5.6.<br/>단무지<br/>요구르트2.]]></DDISH_NM>
    <SCHUL_NM>E2E테스트고등학교</SCHUL_NM>
  </row>
</mealServiceDietInfo>"#;

const E2E_NO_DATA_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<RESULT><CODE>INFO-200</CODE><MESSAGE>해당하는 데이터가 없습니다.</MESSAGE></RESULT>"#;

/// E2E用 NEIS モック（平日は3食、土日は「データなし」を返す）
pub struct E2EMockMealClient;

#[async_trait]
impl MealClientTrait for E2EMockMealClient {
    async fn fetch_meal_data(&self, date: &str) -> Result<Vec<MealRow>> {
        let query_date = format_query_date(date)?;
        log::info!("[E2E Mock] NEIS fetch_meal_data: {}", query_date);

        let is_weekend = NaiveDate::parse_from_str(&query_date, "%Y%m%d")
            .map(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .unwrap_or(false);

        if is_weekend {
            parse_xml_data(E2E_NO_DATA_XML)
        } else {
            parse_xml_data(&E2E_WEEKDAY_XML.replace("{date}", &query_date))
        }
    }
}

/// 環境変数 MEAL_E2E_MOCK が設定されているか
pub fn is_e2e_mock_mode() -> bool {
    std::env::var("MEAL_E2E_MOCK").as_deref() == Ok("1")
}

/// NEIS クライアントの E2E 対応ラッパー（実機 or モックを切り替え）
pub enum MealClientForE2E {
    Real(NeisMealClient),
    Mock(E2EMockMealClient),
}

impl MealClientForE2E {
    pub fn from_config(config: AppConfig) -> Self {
        if is_e2e_mock_mode() {
            log::info!("MEAL_E2E_MOCK=1: using E2E mock meal client");
            Self::Mock(E2EMockMealClient)
        } else {
            Self::Real(NeisMealClient::new(config))
        }
    }
}

#[async_trait]
impl MealClientTrait for MealClientForE2E {
    async fn fetch_meal_data(&self, date: &str) -> Result<Vec<MealRow>> {
        match self {
            Self::Real(c) => c.fetch_meal_data(date).await,
            Self::Mock(m) => m.fetch_meal_data(date).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_weekday_returns_three_meals() {
        let rows = E2EMockMealClient.fetch_meal_data("2024-03-15").await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, "20240315");
        assert_eq!(rows[1].meal_type, "중식");
    }

    #[tokio::test]
    async fn test_mock_weekend_returns_no_rows() {
        let rows = E2EMockMealClient.fetch_meal_data("2024-03-16").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_mock_rejects_invalid_date() {
        assert!(E2EMockMealClient.fetch_meal_data("tomorrow").await.is_err());
    }
}
