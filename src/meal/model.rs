use serde::{Deserialize, Serialize};

/// XML の `row` 要素1件分。1回の検索の間だけ存在する
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRow {
    /// MLSV_YMD（YYYYMMDD）
    pub date: String,
    /// MMEAL_SC_NM（조식 / 중식 / 석식 など）
    #[serde(rename = "type")]
    pub meal_type: String,
    /// DDISH_NM（`<br/>` 区切りの料理名）
    pub menu: String,
    /// SCHUL_NM
    pub school_name: String,
}
