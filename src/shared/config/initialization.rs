use crate::shared::config::environment::{
    get_environment, initialize_logging_system, load_environment_variables, ApiConfig,
    Environment,
};
use crate::shared::errors::AppResult;

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 実行環境
    pub environment: Environment,
    /// APIサーバー設定
    pub api_config: ApiConfig,
}

/// アプリケーションの初期化を実行する
///
/// # 処理内容
/// 1. 環境変数（.env）の読み込み
/// 2. ログシステムの初期化
/// 3. API設定の読み込みと検証
pub fn initialize_application() -> AppResult<InitializationResult> {
    load_environment_variables();
    initialize_logging_system();

    let environment = get_environment();
    let api_config = ApiConfig::from_env()?;

    Ok(InitializationResult {
        environment,
        api_config,
    })
}

/// 初期化完了ログを出力する
pub fn log_initialization_complete(result: &InitializationResult) {
    log::info!("=== 初期化完了 ===");
    log::info!("環境: {:?}", result.environment);
    log::info!("APIサーバー: {}", result.api_config.base_url);
    if result.api_config.is_localhost() && result.environment == Environment::Production {
        log::warn!("本番環境でlocalhostのAPIサーバーが設定されています");
    }
}
