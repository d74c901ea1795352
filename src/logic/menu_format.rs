//! 給食データの整形
//!
//! - 食事区分（조식/중식/석식）ごとに最初のメニューだけを残す
//! - `<br/>` 区切りの料理名を1品ずつに分け、アレルギー番号（"5.6." など）を除去
//! - 区分アイコンと韓国語の長い日付表記

use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::meal::MealRow;

/// NEIS の改行マーカー（`<br/>`, `<br>`, `<br />`）
static LINE_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>").expect("Invalid regex pattern for LINE_BREAK_REGEX")
});

/// 先頭のアレルギー番号（"1.Rice" の "1."）
static LEADING_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\d+\.)+").expect("Invalid regex pattern for LEADING_MARKER_REGEX")
});

/// 末尾のアレルギー番号（"미역국5.6.16."、"된장찌개 (5.6.9.13)"）
///
/// 料理名の途中の数字（"1.5L"、"2.5%"）には触れない。
static TRAILING_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\s*\(\d+(?:\.\d+)*\.?\)|(?:\d+\.)+)\s*$")
        .expect("Invalid regex pattern for TRAILING_MARKER_REGEX")
});

pub const DEFAULT_MEAL_ICON: &str = "🍽️";

/// 食事区分 → 最初に出現したメニュー文字列（出現順を保持）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealsByType {
    entries: Vec<(String, String)>,
}

impl MealsByType {
    pub fn get(&self, meal_type: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == meal_type)
            .map(|(_, menu)| menu.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (区分, メニュー) を初出順に返す
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, m)| (t.as_str(), m.as_str()))
    }

    fn insert_if_absent(&mut self, meal_type: &str, menu: &str) {
        if self.get(meal_type).is_none() {
            self.entries.push((meal_type.to_string(), menu.to_string()));
        }
    }
}

/// 画面に出す1ブロック分
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealGroup {
    pub meal_type: String,
    pub icon: &'static str,
    pub items: Vec<String>,
}

/// 区分ごとに最初の行だけを残す。2件目以降の同じ区分は捨てる
pub fn group_meals_by_type(meals: &[MealRow]) -> MealsByType {
    let mut grouped = MealsByType::default();
    for meal in meals {
        grouped.insert_if_absent(&meal.meal_type, &meal.menu);
    }
    grouped
}

fn strip_allergy_markers(item: &str) -> String {
    let without_leading = LEADING_MARKER_REGEX.replace(item, "");
    TRAILING_MARKER_REGEX
        .replace(&without_leading, "")
        .trim()
        .to_string()
}

/// メニュー文字列を1品ずつに分ける
///
/// `"1.Rice<br/>2.Soup<br/>"` → `["Rice", "Soup"]`
pub fn format_menu_items(menu: &str) -> Vec<String> {
    LINE_BREAK_REGEX
        .split(menu)
        .filter(|fragment| !fragment.trim().is_empty())
        .map(strip_allergy_markers)
        .filter(|item| !item.is_empty())
        .collect()
}

pub fn get_meal_type_icon(meal_type: &str) -> &'static str {
    let label: String = meal_type.trim().nfc().collect();
    match label.as_str() {
        "조식" | "아침" => "🌅",
        "중식" | "점심" => "☀️",
        "석식" | "저녁" => "🌙",
        _ => DEFAULT_MEAL_ICON,
    }
}

/// `MealsByType` を表示用ブロックに変換する
pub fn build_meal_groups(grouped: &MealsByType) -> Vec<MealGroup> {
    grouped
        .iter()
        .map(|(meal_type, menu)| MealGroup {
            meal_type: meal_type.to_string(),
            icon: get_meal_type_icon(meal_type),
            items: format_menu_items(menu),
        })
        .collect()
}

fn korean_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "월요일",
        Weekday::Tue => "화요일",
        Weekday::Wed => "수요일",
        Weekday::Thu => "목요일",
        Weekday::Fri => "금요일",
        Weekday::Sat => "토요일",
        Weekday::Sun => "일요일",
    }
}

/// `YYYY-MM-DD`（または `YYYYMMDD`）→ `2024년 3월 15일 금요일`
///
/// 解釈できない文字列はそのまま返す。
pub fn format_date(date: &str) -> String {
    let trimmed = date.trim();
    let parsed = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y%m%d"));

    match parsed {
        Ok(d) => format!(
            "{}년 {}월 {}일 {}",
            d.year(),
            d.month(),
            d.day(),
            korean_weekday(d.weekday())
        ),
        Err(_) => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(meal_type: &str, menu: &str) -> MealRow {
        MealRow {
            date: "20240315".to_string(),
            meal_type: meal_type.to_string(),
            menu: menu.to_string(),
            school_name: "테스트고등학교".to_string(),
        }
    }

    #[test]
    fn test_group_keeps_first_menu_per_type() {
        let rows = vec![
            row("중식", "first lunch"),
            row("석식", "dinner"),
            row("중식", "second lunch"),
        ];

        let grouped = group_meals_by_type(&rows);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.get("중식"), Some("first lunch"));
        assert_eq!(grouped.get("석식"), Some("dinner"));
    }

    #[test]
    fn test_group_preserves_first_seen_order() {
        let rows = vec![row("석식", "a"), row("조식", "b"), row("석식", "c"), row("중식", "d")];
        let grouped = group_meals_by_type(&rows);
        let order: Vec<&str> = grouped.iter().map(|(t, _)| t).collect();
        // 上流の出現順のまま（조식→중식→석식 に並べ替えない）
        assert_eq!(order, vec!["석식", "조식", "중식"]);
    }

    #[test]
    fn test_group_empty() {
        assert!(group_meals_by_type(&[]).is_empty());
    }

    #[test]
    fn test_format_menu_items_strips_markers_and_empty_fragments() {
        assert_eq!(
            format_menu_items("1.Rice<br/>2.Soup<br/>"),
            vec!["Rice".to_string(), "Soup".to_string()]
        );
    }

    #[test]
    fn test_format_menu_items_real_payload() {
        let items = format_menu_items("현미밥 <br/>쇠고기미역국5.6.16.<br/>  <br/>배추김치(9.13.)<br/>우유2.");
        assert_eq!(items, vec!["현미밥", "쇠고기미역국", "배추김치", "우유"]);
    }

    #[test]
    fn test_format_menu_items_strips_parenthesized_markers() {
        assert_eq!(
            format_menu_items("된장찌개 (5.6.9.13)<br/>쌀밥"),
            vec!["된장찌개", "쌀밥"]
        );
    }

    #[test]
    fn test_format_menu_items_keeps_numbers_inside_dish_names() {
        assert_eq!(
            format_menu_items("1.생수1.5L<br/>2.우유 2.5%"),
            vec!["생수1.5L", "우유 2.5%"]
        );
    }

    #[test]
    fn test_format_menu_items_br_variants() {
        assert_eq!(format_menu_items("밥<br>국<BR />김치"), vec!["밥", "국", "김치"]);
    }

    #[test]
    fn test_format_menu_items_empty() {
        assert!(format_menu_items("").is_empty());
        assert!(format_menu_items("<br/><br/>").is_empty());
    }

    #[test]
    fn test_meal_type_icons() {
        assert_eq!(get_meal_type_icon("조식"), "🌅");
        assert_eq!(get_meal_type_icon("아침"), "🌅");
        assert_eq!(get_meal_type_icon("중식"), "☀️");
        assert_eq!(get_meal_type_icon("점심"), "☀️");
        assert_eq!(get_meal_type_icon("석식"), "🌙");
        assert_eq!(get_meal_type_icon("저녁"), "🌙");
    }

    #[test]
    fn test_unknown_meal_type_falls_back() {
        assert_eq!(get_meal_type_icon("간식"), DEFAULT_MEAL_ICON);
        assert_eq!(get_meal_type_icon(""), DEFAULT_MEAL_ICON);
    }

    #[test]
    fn test_meal_type_icon_normalizes_decomposed_hangul() {
        // NFD（字母分解）で来ても同じアイコン
        let decomposed: String = "중식".nfd().collect();
        assert_eq!(get_meal_type_icon(&decomposed), "☀️");
        assert_eq!(get_meal_type_icon(" 석식 "), "🌙");
    }

    #[test]
    fn test_build_meal_groups() {
        let grouped = group_meals_by_type(&[row("중식", "1.밥<br/>2.국")]);
        let groups = build_meal_groups(&grouped);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].meal_type, "중식");
        assert_eq!(groups[0].icon, "☀️");
        assert_eq!(groups[0].items, vec!["밥", "국"]);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-15"), "2024년 3월 15일 금요일");
        assert_eq!(format_date("2024-03-16"), "2024년 3월 16일 토요일");
        assert_eq!(format_date("20240317"), "2024년 3월 17일 일요일");
    }

    #[test]
    fn test_format_date_invalid_returns_input() {
        assert_eq!(format_date("not-a-date"), "not-a-date");
        assert_eq!(format_date("2024-02-30"), "2024-02-30");
    }
}
