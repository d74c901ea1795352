pub mod config;
pub mod e2e_mocks;
pub mod error;
pub mod logging;
pub mod logic;
pub mod meal;

pub use error::MealError;
pub use logic::search_logic::SearchController;
pub use logic::view_state::{ViewModel, ViewState};
pub use meal::{MealClientTrait, MealRow, NeisMealClient};

#[cfg(feature = "desktop")]
pub use desktop::run;

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::Arc;
    use tauri::Manager;
    use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

    use crate::config;
    use crate::e2e_mocks::MealClientForE2E;
    use crate::logging::{self, LogEntry};
    use crate::logic::search_logic::SearchController;
    use crate::logic::view_state::ViewModel;

    /// 日付入力欄の初期値（KST の今日）
    #[tauri::command]
    fn get_today(controller: tauri::State<'_, SearchController>) -> String {
        controller.date_value()
    }

    /// 検索ボタン / Enter キー
    #[tauri::command]
    async fn submit_search(
        app_handle: tauri::AppHandle,
        controller: tauri::State<'_, SearchController>,
        date: String,
    ) -> Result<ViewModel, String> {
        let view = controller.submit_search(&date).await;

        if let Some(prompt) = view.prompt {
            app_handle
                .dialog()
                .message(prompt)
                .title("급식 조회")
                .kind(MessageDialogKind::Warning)
                .show(|_| {});
        }

        Ok(view)
    }

    #[tauri::command]
    fn get_current_view(controller: tauri::State<'_, SearchController>) -> ViewModel {
        controller.current_view()
    }

    /// ログエントリを取得（新しい順）
    #[tauri::command]
    fn get_logs(level_filter: Option<String>, limit: Option<usize>) -> Result<Vec<LogEntry>, String> {
        logging::get_log_entries(level_filter.as_deref(), limit)
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        tauri::Builder::default()
            .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
                // 二重起動が検知された場合、既存のウィンドウを最前面に表示
                if let Some(window) = app.get_webview_window("main") {
                    let _ = window.unminimize();
                    let _ = window.show();
                    let _ = window.set_focus();
                    log::info!("Second instance detected - bringing existing window to front");
                }
            }))
            .plugin(tauri_plugin_dialog::init())
            .setup(|app| {
                logging::init_logger();

                let config_dir = app.path().app_config_dir()?;
                log::info!("Config dir: {}", config_dir.display());

                // 設定が壊れていても既定の学校で起動する
                let app_config = config::load(&config_dir).unwrap_or_else(|e| {
                    log::error!("Failed to load config, using defaults: {e}");
                    config::AppConfig::default()
                });

                let client = MealClientForE2E::from_config(app_config);
                app.manage(SearchController::new(Arc::new(client)));
                log::info!("Search controller initialized");

                Ok(())
            })
            .invoke_handler(tauri::generate_handler![
                get_today,
                submit_search,
                get_current_view,
                get_logs,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}
