use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー（ローカルで検出され、永続化層には到達しない）
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 4xx系のHTTPエラー、またはサーバーに到達できなかった場合のエラー
    #[error("ネットワークエラー: {message} (status={status:?})")]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// 5xx系のHTTPエラー
    #[error("サーバーエラー: {message} (status={status})")]
    Server { status: u16, message: String },

    /// 更新対象のリソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// セッション関連のエラー
    #[error("セッションエラー: {0}")]
    Session(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

/// HTTPステータスの分類
///
/// 境界（APIクライアント）で一度だけ決定され、コントローラーは文字列ではなくこの値で分岐する
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StatusClass {
    /// 4xx系
    Client,
    /// 5xx系
    Server,
}

impl StatusClass {
    /// HTTPステータスコードから分類を判定
    ///
    /// # 戻り値
    /// 4xx/5xx以外の場合はNone
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            400..=499 => Some(StatusClass::Client),
            500..=599 => Some(StatusClass::Server),
            _ => None,
        }
    }
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（外部サービス一時的エラーなど）
    Medium,
    /// 高重要度（サーバーエラー、設定エラーなど）
    High,
}

impl ErrorSeverity {
    /// 重要度に対応するログレベル
    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Low => log::Level::Info,
            ErrorSeverity::Medium => log::Level::Warn,
            ErrorSeverity::High => log::Level::Error,
        }
    }
}

impl AppError {
    /// HTTPステータスから境界エラーを作成する
    ///
    /// # 引数
    /// * `status` - HTTPステータスコード
    /// * `message` - サーバーから返された詳細メッセージ
    ///
    /// # 戻り値
    /// 5xxの場合はServer、それ以外はNetwork
    pub fn from_status<S: Into<String>>(status: u16, message: S) -> Self {
        match StatusClass::from_status(status) {
            Some(StatusClass::Server) => AppError::Server {
                status,
                message: message.into(),
            },
            _ => AppError::Network {
                status: Some(status),
                message: message.into(),
            },
        }
    }

    /// ユーザーに表示するためのメッセージを取得
    ///
    /// HTTPエラーは `"<status> error"` の形で表示する
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Network {
                status: Some(status),
                ..
            } => format!("{status} error"),
            AppError::Network { status: None, .. } => {
                "Le serveur est injoignable, veuillez réessayer".to_string()
            }
            AppError::Server { status, .. } => format!("{status} error"),
            AppError::NotFound(_) => "404 error".to_string(),
            AppError::Session(_) => "Votre session a expiré, veuillez vous reconnecter".to_string(),
            AppError::Configuration(_) => "Erreur de configuration".to_string(),
            AppError::Io(_) => "Le fichier n'a pas pu être lu".to_string(),
            AppError::Json(_) => "La réponse du serveur est invalide".to_string(),
        }
    }

    /// HTTPステータスの分類を取得
    ///
    /// # 戻り値
    /// HTTP由来でないエラー（ステータスなしの接続失敗を含む）はNone
    pub fn status_class(&self) -> Option<StatusClass> {
        match self {
            AppError::Network {
                status: Some(status),
                ..
            } => StatusClass::from_status(*status),
            AppError::Server { .. } => Some(StatusClass::Server),
            AppError::NotFound(_) => Some(StatusClass::Client),
            _ => None,
        }
    }

    /// エラーの詳細情報を取得（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::Network { .. } => ErrorSeverity::Medium,
            AppError::Session(_) => ErrorSeverity::Medium,
            AppError::Io(_) => ErrorSeverity::Medium,
            AppError::Json(_) => ErrorSeverity::Medium,
            AppError::Server { .. } => ErrorSeverity::High,
            AppError::Configuration(_) => ErrorSeverity::High,
        }
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 接続失敗（ステータスなし）のネットワークエラーを作成するヘルパー関数
    pub fn unreachable<S: Into<String>>(message: S) -> Self {
        AppError::Network {
            status: None,
            message: message.into(),
        }
    }

    /// セッションエラーを作成するヘルパー関数
    pub fn session<S: Into<String>>(message: S) -> Self {
        AppError::Session(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}

/// AppErrorからStringへの変換（表示層へ渡すため）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message()
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        // 4xxはNetwork、5xxはServerに分類される
        let not_found = AppError::from_status(404, "Not Found");
        assert!(matches!(
            not_found,
            AppError::Network {
                status: Some(404),
                ..
            }
        ));
        assert_eq!(not_found.status_class(), Some(StatusClass::Client));

        let internal = AppError::from_status(500, "Internal Server Error");
        assert!(matches!(internal, AppError::Server { status: 500, .. }));
        assert_eq!(internal.status_class(), Some(StatusClass::Server));

        let bad_gateway = AppError::from_status(502, "Bad Gateway");
        assert_eq!(bad_gateway.status_class(), Some(StatusClass::Server));
    }

    #[test]
    fn test_user_message_for_http_errors() {
        assert_eq!(AppError::from_status(404, "x").user_message(), "404 error");
        assert_eq!(AppError::from_status(400, "x").user_message(), "400 error");
        assert_eq!(AppError::from_status(500, "x").user_message(), "500 error");
        assert_eq!(AppError::not_found("請求書").user_message(), "404 error");
    }

    #[test]
    fn test_unreachable_has_no_status_class() {
        let error = AppError::unreachable("connection refused");
        assert_eq!(error.status_class(), None);
        assert!(!error.user_message().is_empty());
    }

    #[test]
    fn test_error_severity() {
        assert_eq!(
            AppError::validation("テスト").severity(),
            ErrorSeverity::Low
        );
        assert_eq!(
            AppError::from_status(404, "x").severity(),
            ErrorSeverity::Medium
        );
        assert_eq!(
            AppError::from_status(503, "x").severity(),
            ErrorSeverity::High
        );
        assert_eq!(
            AppError::configuration("設定ファイル不正").severity(),
            ErrorSeverity::High
        );
    }

    #[test]
    fn test_severity_log_level() {
        assert_eq!(
            AppError::validation("x").severity().log_level(),
            log::Level::Info
        );
        assert_eq!(
            AppError::from_status(404, "x").severity().log_level(),
            log::Level::Warn
        );
        assert_eq!(
            AppError::from_status(500, "x").severity().log_level(),
            log::Level::Error
        );
    }

    #[test]
    fn test_string_conversion() {
        let error = AppError::validation("Le montant est requis");
        let error_string: String = error.into();
        assert_eq!(error_string, "Le montant est requis");
    }

    #[test]
    fn test_error_details() {
        let error = AppError::from_status(500, "boom");
        let details = error.details();
        assert!(details.contains("boom"));
        assert!(details.contains("500"));
    }
}
