//! NEIS レスポンス XML のパース
//!
//! 成功時の形:
//! ```text
//! <mealServiceDietInfo>
//!   <head><RESULT><CODE>INFO-000</CODE><MESSAGE>정상 처리되었습니다.</MESSAGE></RESULT></head>
//!   <row><MLSV_YMD>..</MLSV_YMD><MMEAL_SC_NM>..</MMEAL_SC_NM><DDISH_NM>..</DDISH_NM><SCHUL_NM>..</SCHUL_NM></row>
//! </mealServiceDietInfo>
//! ```
//! データがない日やエラー時はルートが `<RESULT>` になる。

use roxmltree::{Document, Node};

use super::model::MealRow;
use crate::error::{MealError, Result};

/// 正常処理
pub const SUCCESS_CODE: &str = "INFO-000";
/// 該当データなし（週末・休日など）
pub const NO_DATA_CODE: &str = "INFO-200";

const NOT_FOUND_MESSAGE: &str = "급식 정보를 찾을 수 없습니다";

/// XML テキストを `MealRow` の一覧に変換する（文書順）
///
/// - 結果コードが `INFO-000` 以外ならエラー（`INFO-200` は0件として扱う）
/// - 結果コードが見つからない場合は成功とみなす
/// - `row` が1件もなければ空の Vec を返す
pub fn parse_xml_data(xml_text: &str) -> Result<Vec<MealRow>> {
    let doc = Document::parse(xml_text)?;

    match find_result_code(&doc) {
        Some((code, _)) if code == SUCCESS_CODE => {}
        Some((code, _)) if code == NO_DATA_CODE => {
            log::info!("NEIS returned {code}: no meal data for the requested date");
            return Ok(Vec::new());
        }
        Some((code, message)) => {
            let message = if message.is_empty() {
                NOT_FOUND_MESSAGE.to_string()
            } else {
                message
            };
            return Err(MealError::Upstream { code, message });
        }
        None => {
            log::warn!("Result code not found in response; treating as success");
        }
    }

    let rows: Vec<MealRow> = doc
        .descendants()
        .filter(|n| n.has_tag_name("row"))
        .map(row_from_node)
        .collect();

    log::debug!("Parsed {} meal row(s)", rows.len());
    Ok(rows)
}

/// `RESULT` 直下の `CODE` を文書全体から探す。見つかれば (CODE, MESSAGE) を返す
fn find_result_code(doc: &Document) -> Option<(String, String)> {
    let code_node = doc.descendants().find(|n| {
        n.has_tag_name("CODE")
            && n.parent_element()
                .is_some_and(|p| p.has_tag_name("RESULT"))
    })?;

    let code = node_text(Some(code_node));
    let message = code_node
        .parent_element()
        .map(|result| child_text(result, "MESSAGE"))
        .unwrap_or_default();

    Some((code, message))
}

fn row_from_node(row: Node) -> MealRow {
    MealRow {
        date: child_text(row, "MLSV_YMD"),
        meal_type: child_text(row, "MMEAL_SC_NM"),
        menu: child_text(row, "DDISH_NM"),
        school_name: child_text(row, "SCHUL_NM"),
    }
}

/// 子要素のテキスト。要素がなければ空文字
fn child_text(parent: Node, name: &str) -> String {
    node_text(parent.children().find(|c| c.has_tag_name(name)))
}

fn node_text(node: Option<Node>) -> String {
    node.and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUCCESS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mealServiceDietInfo>
  <head>
    <list_total_count>2</list_total_count>
    <RESULT>
      <CODE>INFO-000</CODE>
      <MESSAGE>정상 처리되었습니다.</MESSAGE>
    </RESULT>
  </head>
  <row>
    <MLSV_YMD>20240315</MLSV_YMD>
    <MMEAL_SC_NM>중식</MMEAL_SC_NM>
    <DDISH_NM><![CDATA[쌀밥 <br/>미역국5.6.<br/>]]></DDISH_NM>
    <SCHUL_NM>테스트고등학교</SCHUL_NM>
  </row>
  <row>
    <MLSV_YMD>20240315</MLSV_YMD>
    <MMEAL_SC_NM>석식</MMEAL_SC_NM>
    <DDISH_NM>카레라이스</DDISH_NM>
  </row>
</mealServiceDietInfo>"#;

    #[test]
    fn test_parse_success_rows_in_document_order() {
        let rows = parse_xml_data(SUCCESS_XML).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "20240315");
        assert_eq!(rows[0].meal_type, "중식");
        assert_eq!(rows[0].menu, "쌀밥 <br/>미역국5.6.<br/>");
        assert_eq!(rows[0].school_name, "테스트고등학교");
        assert_eq!(rows[1].meal_type, "석식");
    }

    #[test]
    fn test_missing_field_defaults_to_empty() {
        let rows = parse_xml_data(SUCCESS_XML).unwrap();
        assert_eq!(rows[1].school_name, "");
    }

    #[test]
    fn test_success_without_rows_is_empty() {
        let xml = r#"<mealServiceDietInfo><head><RESULT><CODE>INFO-000</CODE></RESULT></head></mealServiceDietInfo>"#;
        assert!(parse_xml_data(xml).unwrap().is_empty());
    }

    #[test]
    fn test_no_data_code_is_empty_not_error() {
        let xml = r#"<RESULT><CODE>INFO-200</CODE><MESSAGE>해당하는 데이터가 없습니다.</MESSAGE></RESULT>"#;
        assert!(parse_xml_data(xml).unwrap().is_empty());
    }

    #[test]
    fn test_root_level_error_code_fails() {
        let xml = r#"<RESULT><CODE>ERROR-300</CODE><MESSAGE>필수 값이 누락되어 있습니다.</MESSAGE></RESULT>"#;
        match parse_xml_data(xml) {
            Err(MealError::Upstream { code, message }) => {
                assert_eq!(code, "ERROR-300");
                assert_eq!(message, "필수 값이 누락되어 있습니다.");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_error_code_fails_even_with_rows() {
        let xml = r#"<mealServiceDietInfo><head><RESULT><CODE>INFO-300</CODE></RESULT></head>
<row><MMEAL_SC_NM>중식</MMEAL_SC_NM></row></mealServiceDietInfo>"#;
        match parse_xml_data(xml) {
            Err(MealError::Upstream { code, message }) => {
                assert_eq!(code, "INFO-300");
                assert_eq!(message, NOT_FOUND_MESSAGE);
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_result_code_is_treated_as_success() {
        let xml = r#"<mealServiceDietInfo><row><MMEAL_SC_NM>조식</MMEAL_SC_NM><DDISH_NM>토스트</DDISH_NM></row></mealServiceDietInfo>"#;
        let rows = parse_xml_data(xml).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].meal_type, "조식");
    }

    #[test]
    fn test_code_outside_result_is_ignored() {
        // RESULT 以外の CODE は結果コードとみなさない
        let xml = r#"<mealServiceDietInfo><CODE>ERROR-500</CODE><row><MMEAL_SC_NM>중식</MMEAL_SC_NM></row></mealServiceDietInfo>"#;
        assert_eq!(parse_xml_data(xml).unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let result = parse_xml_data("<mealServiceDietInfo><row>");
        assert!(matches!(result, Err(MealError::Xml(_))));
    }
}
