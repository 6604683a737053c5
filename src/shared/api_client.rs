//! 汎用APIクライアント
//!
//! 請求書APIサーバーとの通信を行う。リトライもキャッシュも行わず、
//! 各呼び出しは毎回新しいリクエストになる（再試行は呼び出し側の責務）
use crate::shared::config::environment::ApiConfig;
use crate::shared::errors::{AppError, AppResult};
use log::{debug, info, warn};
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// APIクライアント設定
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5678".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(api_config: &ApiConfig) -> Self {
        Self {
            base_url: api_config.base_url.clone(),
            timeout_seconds: api_config.timeout_seconds,
        }
    }
}

/// APIサーバーからのエラーレスポンス
///
/// 構造化形式（`{"error": {...}}`）と簡易形式（`{"message": "..."}`）の両方を受け付ける
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorResponse {
    Structured { error: ErrorDetail },
    Flat { message: String },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: Option<String>,
    pub message: String,
}

impl ErrorResponse {
    /// エラーメッセージを取得
    pub fn message(&self) -> &str {
        match self {
            ErrorResponse::Structured { error } => &error.message,
            ErrorResponse::Flat { message } => message,
        }
    }
}

/// 汎用APIクライアント
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
}

impl ApiClient {
    /// 設定を指定してAPIクライアントを作成
    pub fn new(config: ApiClientConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// ベースURLを取得
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str, auth_token: Option<&str>) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        info!("GETリクエスト送信: endpoint={endpoint}");

        let request = self.client.get(self.url(endpoint));
        self.send(with_auth(request, auth_token), "GET", endpoint)
            .await
    }

    /// マルチパートのPOSTリクエストを送信
    pub async fn post_multipart<T>(
        &self,
        endpoint: &str,
        form: multipart::Form,
        auth_token: Option<&str>,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        info!("POSTリクエスト送信（multipart）: endpoint={endpoint}");

        let request = self.client.post(self.url(endpoint)).multipart(form);
        self.send(with_auth(request, auth_token), "POST", endpoint)
            .await
    }

    /// JSONボディのPATCHリクエストを送信
    pub async fn patch<B, T>(
        &self,
        endpoint: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("PATCHリクエスト送信: endpoint={endpoint}");

        let request = self.client.patch(self.url(endpoint)).json(body);
        self.send(with_auth(request, auth_token), "PATCH", endpoint)
            .await
    }

    /// マルチパートのPATCHリクエストを送信
    pub async fn patch_multipart<T>(
        &self,
        endpoint: &str,
        form: multipart::Form,
        auth_token: Option<&str>,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        info!("PATCHリクエスト送信（multipart）: endpoint={endpoint}");

        let request = self.client.patch(self.url(endpoint)).multipart(form);
        self.send(with_auth(request, auth_token), "PATCH", endpoint)
            .await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.base_url.trim_end_matches('/'))
    }

    /// リクエストを一度だけ送信し、レスポンスを解析する
    async fn send<T>(&self, request: RequestBuilder, method: &str, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(|e| {
            warn!("APIサーバーへの接続に失敗しました: method={method}, endpoint={endpoint}, error={e}");
            AppError::unreachable(format!("APIサーバーへの接続に失敗しました: {e}"))
        })?;

        if !response.status().is_success() {
            return Err(self.handle_error_response(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::unreachable(format!("レスポンス読み取り失敗: {e}")))?;
        let result: T = serde_json::from_str(&body)?;

        info!("{method}リクエスト成功: endpoint={endpoint}");
        Ok(result)
    }

    /// エラーレスポンスをステータス分類済みのAppErrorに変換する
    async fn handle_error_response(&self, response: Response) -> AppError {
        let status = response.status().as_u16();
        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "レスポンス読み取り失敗".to_string());

        let message = match serde_json::from_str::<ErrorResponse>(&response_text) {
            Ok(error_response) => {
                debug!(
                    "APIサーバーから構造化エラーレスポンスを受信: status={status}, message={}",
                    error_response.message()
                );
                error_response.message().to_string()
            }
            Err(_) => {
                warn!(
                    "APIサーバーから非構造化エラーレスポンス: status={status}, body={response_text}"
                );
                response_text
            }
        };

        AppError::from_status(status, message)
    }
}

/// 認証トークンがある場合はAuthorizationヘッダーを追加
fn with_auth(request: RequestBuilder, auth_token: Option<&str>) -> RequestBuilder {
    match auth_token {
        Some(token) => request.header("Authorization", format!("Bearer {token}")),
        None => request,
    }
}
