// 機能モジュール構造
pub mod features;
pub mod shared;

use features::bills::{BillsPage, HttpBillStore, ListState};
use features::navigation::{Navigator, Route};
use features::session::{session_from_env, SessionStore};
use log::{error, info};
use shared::config::{initialize_application, log_initialization_complete};
use shared::{ApiClient, ApiClientConfig, AppResult};
use std::process::ExitCode;
use std::sync::Arc;

/// 請求書一覧を取得して表示する
///
/// # 戻り値
/// 一覧の取得に失敗した場合は`ExitCode::FAILURE`
///
/// # エラー
/// 設定・セッション・HTTPクライアントの初期化に失敗した場合
pub async fn run() -> AppResult<ExitCode> {
    let init = initialize_application()?;
    log_initialization_complete(&init);

    let sessions = SessionStore::new();
    sessions.login(session_from_env()?)?;
    let session = sessions.current()?;
    info!("ログインユーザー: email={}", session.email);

    let client = ApiClient::new(ApiClientConfig::from(&init.api_config))?;
    let store = Arc::new(HttpBillStore::new(client, session.token.clone()));
    let navigator: Arc<dyn Navigator> =
        Arc::new(|route: Route| info!("画面遷移要求（CLIでは無視）: route={route}"));

    let mut page = BillsPage::new(store, navigator);
    match page.load().await {
        ListState::Loaded(rows) => {
            if rows.is_empty() {
                println!("Aucune note de frais");
            }
            for row in rows {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    row.date, row.type_label, row.name, row.amount, row.status_label
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        ListState::Failed(list_error) => {
            error!(
                "請求書一覧の取得に失敗しました: class={:?}, message={}",
                list_error.status_class, list_error.message
            );
            eprintln!("{}", list_error.message);
            Ok(ExitCode::FAILURE)
        }
        ListState::Loading => Ok(ExitCode::FAILURE),
    }
}
