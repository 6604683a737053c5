use crate::features::bills::models::{Bill, BillUpdate, NewBill, ReceiptAttachment, ReceiptFile};
use crate::features::bills::receipts::content_type_for;
use crate::features::bills::store::BillStore;
use crate::shared::api_client::ApiClient;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

const BILLS_ENDPOINT: &str = "/bills";

/// REST APIに接続する永続化サービス
///
/// - `GET /bills` 一覧
/// - `POST /bills` 作成（multipartで`bill`パートと任意の`file`パート）
/// - `PATCH /bills/{id}` 更新（領収書のアップロードがある場合のみmultipart）
#[derive(Debug, Clone)]
pub struct HttpBillStore {
    client: ApiClient,
    auth_token: Option<String>,
}

impl HttpBillStore {
    pub fn new(client: ApiClient, auth_token: Option<String>) -> Self {
        Self { client, auth_token }
    }

    fn token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    fn bill_endpoint(id: &str) -> String {
        format!("{BILLS_ENDPOINT}/{}", urlencoding::encode(id))
    }
}

/// 領収書ファイルをmultipartのパートに変換
fn file_part(file: &ReceiptFile) -> AppResult<Part> {
    Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(content_type_for(&file.file_name))
        .map_err(|e| AppError::validation(format!("領収書のContent-Typeが不正です: {e}")))
}

/// `bill`パート（JSON）と任意の`file`パートからなるフォームを作成
fn bill_form(bill_json: String, file: Option<&ReceiptFile>) -> AppResult<Form> {
    let form = Form::new().text("bill", bill_json);
    match file {
        Some(file) => Ok(form.part("file", file_part(file)?)),
        None => Ok(form),
    }
}

/// 更新ボディのJSONを作成する（既存の領収書URLを紐付ける場合はここに含める）
fn update_body(payload: &BillUpdate) -> AppResult<Value> {
    let mut body = serde_json::to_value(payload)?;
    if let (Some(ReceiptAttachment::Link(link)), Value::Object(map)) =
        (&payload.receipt, &mut body)
    {
        map.insert("fileUrl".to_string(), Value::String(link.url.clone()));
        map.insert(
            "fileName".to_string(),
            Value::String(link.file_name.clone()),
        );
    }
    Ok(body)
}

#[async_trait]
impl BillStore for HttpBillStore {
    async fn list(&self) -> AppResult<Vec<Bill>> {
        let bills: Vec<Bill> = self.client.get(BILLS_ENDPOINT, self.token()).await?;
        debug!("請求書一覧を受信: count={}", bills.len());
        Ok(bills)
    }

    async fn create(&self, payload: NewBill) -> AppResult<Bill> {
        info!(
            "請求書作成リクエスト: email={}, has_receipt={}",
            payload.email,
            payload.receipt.is_some()
        );

        let bill_json = serde_json::to_string(&payload)?;
        let form = bill_form(bill_json, payload.receipt.as_ref())?;
        let bill: Bill = self
            .client
            .post_multipart(BILLS_ENDPOINT, form, self.token())
            .await?;

        info!("請求書作成成功: bill_id={}", bill.id);
        Ok(bill)
    }

    async fn update(&self, payload: BillUpdate) -> AppResult<Bill> {
        let endpoint = Self::bill_endpoint(&payload.id);
        info!("請求書更新リクエスト: bill_id={}", payload.id);

        let result: AppResult<Bill> = match &payload.receipt {
            Some(ReceiptAttachment::Upload(file)) => {
                let bill_json = serde_json::to_string(&payload)?;
                let form = bill_form(bill_json, Some(file))?;
                self.client
                    .patch_multipart(&endpoint, form, self.token())
                    .await
            }
            _ => {
                let body = update_body(&payload)?;
                self.client.patch(&endpoint, &body, self.token()).await
            }
        };

        match result {
            Ok(bill) => Ok(bill),
            Err(AppError::Network {
                status: Some(404), ..
            }) => Err(AppError::not_found(format!("請求書 {}", payload.id))),
            Err(error) => Err(error),
        }
    }
}
