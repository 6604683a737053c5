/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有設定管理
pub mod config;

/// 汎用APIクライアント
pub mod api_client;

/// 共有ユーティリティ関数
pub mod utils;

// 便利な再エクスポート
pub use api_client::{ApiClient, ApiClientConfig};
pub use config::{
    initialize_application, initialize_logging_system, load_environment_variables, ApiConfig,
    Environment, EnvironmentConfig, InitializationResult,
};
pub use errors::{AppError, AppResult, ErrorSeverity, StatusClass};
