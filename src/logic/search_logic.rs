//! 検索の実行（ボタン押下 / Enter キーからの単一エントリポイント）
//!
//! Tauri コマンドや UI 層は `SearchController::submit_search` を呼ぶだけにして、
//! 取得 → パース → 整形 → 状態遷移をここにまとめる。
//!
//! 検索ごとに連番のリクエスト ID を振り、最新でない応答は捨てる
//! （後から始めた検索の表示を古い応答で上書きしない）。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::date_field::DateField;
use super::view_state::{ViewModel, ViewState};
use crate::meal::MealClientTrait;

pub struct SearchController {
    client: Arc<dyn MealClientTrait>,
    state: Mutex<ViewState>,
    date_field: Mutex<DateField>,
    latest_request: AtomicU64,
}

impl SearchController {
    pub fn new(client: Arc<dyn MealClientTrait>) -> Self {
        Self {
            client,
            state: Mutex::new(ViewState::Idle),
            date_field: Mutex::new(DateField::new()),
            latest_request: AtomicU64::new(0),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ViewState> {
        // 描画状態だけなので、パニック後も中身をそのまま使う
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_state(&self) -> ViewState {
        self.lock_state().clone()
    }

    pub fn current_view(&self) -> ViewModel {
        ViewModel::from_state(&self.lock_state())
    }

    /// 日付入力欄の現在値（起動時は今日）
    pub fn date_value(&self) -> String {
        self.date_field
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .value()
            .to_string()
    }

    /// 検索を実行して描画結果を返す
    ///
    /// - 日付が空ならプロンプトを返すだけ（取得しない・状態は変えない）
    /// - 成功 0件 → Empty、1件以上 → Success、失敗 → Error
    pub async fn submit_search(&self, date: &str) -> ViewModel {
        if date.trim().is_empty() {
            log::info!("Search requested without a date; prompting user");
            return ViewModel::date_prompt(&self.lock_state());
        }
        self.date_field
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set(date);

        let request_id = {
            let mut state = self.lock_state();
            let id = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
            *state = ViewState::begin_search(id);
            id
        };
        log::info!("Searching meals for {date} (request #{request_id})");

        let next = match self.client.fetch_meal_data(date.trim()).await {
            Ok(rows) => {
                log::info!("Request #{request_id}: {} meal row(s)", rows.len());
                ViewState::finish_with_rows(date.trim(), &rows)
            }
            Err(e) => {
                log::error!("Request #{request_id}: meal search failed: {e}");
                ViewState::finish_with_error(&e)
            }
        };

        let mut state = self.lock_state();
        if self.latest_request.load(Ordering::SeqCst) != request_id {
            log::warn!("Discarding stale response for request #{request_id}");
            return ViewModel::stale(&state);
        }
        *state = next;
        ViewModel::from_state(&state)
    }
}
