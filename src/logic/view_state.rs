//! 画面状態（状態機械）と結果パネルの HTML 描画
//!
//! `Idle → Loading → {Success, Empty, Error}`。遷移関数は副作用を持たず、
//! 描画関数は状態を受け取って HTML 断片を返すだけ。表示/非表示の切り替えは
//! `ViewModel` のフラグとして WebView 側に渡す。

use serde::Serialize;

use super::menu_format::{build_meal_groups, format_date, group_meals_by_type, MealGroup};
use crate::error::MealError;
use crate::meal::MealRow;

/// エラーパネルの文言（エラー種別によらず共通）
pub const ERROR_MESSAGE: &str =
    "급식 정보를 불러오는 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";
/// 日付未入力時のプロンプト
pub const DATE_PROMPT: &str = "날짜를 선택해주세요.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Idle,
    Loading {
        request_id: u64,
    },
    Success {
        date: String,
        school_name: String,
        groups: Vec<MealGroup>,
    },
    /// 0件（週末・休日）。エラーではない
    Empty { date: String },
    Error {
        /// ログ用の詳細。画面には出さない
        detail: String,
    },
}

impl ViewState {
    pub fn begin_search(request_id: u64) -> Self {
        ViewState::Loading { request_id }
    }

    /// 取得・パース成功。0件なら Empty
    pub fn finish_with_rows(date: &str, rows: &[MealRow]) -> Self {
        if rows.is_empty() {
            return ViewState::Empty {
                date: date.to_string(),
            };
        }

        let grouped = group_meals_by_type(rows);
        ViewState::Success {
            date: date.to_string(),
            school_name: rows[0].school_name.clone(),
            groups: build_meal_groups(&grouped),
        }
    }

    pub fn finish_with_error(err: &MealError) -> Self {
        ViewState::Error {
            detail: err.to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading { .. } => "loading",
            ViewState::Success { .. } => "success",
            ViewState::Empty { .. } => "empty",
            ViewState::Error { .. } => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ViewState::Error { .. })
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_date_header(date: &str, school_name: &str) -> String {
    let school = if school_name.is_empty() {
        String::new()
    } else {
        format!(
            r#"<span class="school-name">{}</span>"#,
            html_escape(school_name)
        )
    };
    format!(
        r#"<div class="meal-date">📅 {}{school}</div>"#,
        html_escape(&format_date(date))
    )
}

fn render_meal_group(group: &MealGroup) -> String {
    let items: String = group
        .items
        .iter()
        .map(|item| format!("<li>{}</li>", html_escape(item)))
        .collect();

    format!(
        r#"<div class="meal-section">
    <h3 class="meal-type"><span class="meal-icon">{icon}</span>{meal_type}</h3>
    <ul class="meal-items">{items}</ul>
</div>"#,
        icon = group.icon,
        meal_type = html_escape(&group.meal_type),
    )
}

/// 結果パネルの中身。Loading / Error / Idle では空
pub fn render_html(state: &ViewState) -> String {
    match state {
        ViewState::Success {
            date,
            school_name,
            groups,
        } => {
            let mut html = render_date_header(date, school_name);
            for group in groups {
                html.push_str(&render_meal_group(group));
            }
            html
        }
        ViewState::Empty { date } => format!(
            r#"<div class="no-meal">
    <div class="meal-date">📅 {}</div>
    <p>급식 정보가 없습니다.</p>
    <p class="hint">주말이나 공휴일에는 급식이 제공되지 않습니다.</p>
</div>"#,
            html_escape(&format_date(date))
        ),
        ViewState::Idle | ViewState::Loading { .. } | ViewState::Error { .. } => String::new(),
    }
}

/// WebView に返す描画結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub state: &'static str,
    pub loading: bool,
    pub error_visible: bool,
    pub error_message: Option<&'static str>,
    pub result_html: String,
    /// ブロッキングなアラートで出す文言（日付未入力時）
    pub prompt: Option<&'static str>,
    /// 後発の検索に追い越された応答。WebView は描画しない
    pub stale: bool,
}

impl ViewModel {
    pub fn from_state(state: &ViewState) -> Self {
        Self {
            state: state.name(),
            loading: state.is_loading(),
            error_visible: state.is_error(),
            error_message: state.is_error().then_some(ERROR_MESSAGE),
            result_html: render_html(state),
            prompt: None,
            stale: false,
        }
    }

    /// 日付未入力。現在の表示はそのまま
    pub fn date_prompt(current: &ViewState) -> Self {
        Self {
            prompt: Some(DATE_PROMPT),
            ..Self::from_state(current)
        }
    }

    pub fn stale(current: &ViewState) -> Self {
        Self {
            stale: true,
            ..Self::from_state(current)
        }
    }
}
