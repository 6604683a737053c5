// 領収書ファイルの受付判定・プレビュー・後付け添付

use crate::features::bills::models::{Bill, BillUpdate, ReceiptAttachment, ReceiptFile, ReceiptRef};
use crate::features::bills::store::BillStore;
use crate::features::session::SessionContext;
use crate::shared::errors::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// 受け付ける領収書の拡張子
pub const ALLOWED_RECEIPT_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// 拡張子が不正な場合にユーザーへ表示する警告
pub const INVALID_RECEIPT_FORMAT_MESSAGE: &str = "Le format de l'image n'est pas valide";

static ACCEPTED_RECEIPT_NAME: Lazy<Regex> = Lazy::new(|| {
    // 定数から組み立てるのでパターンは常に有効
    Regex::new(&format!(
        r"(?i)\.(?:{})$",
        ALLOWED_RECEIPT_EXTENSIONS.join("|")
    ))
    .unwrap_or_else(|e| unreachable!("領収書拡張子の正規表現が不正です: {e}"))
});

/// ファイル名が受付可能な画像形式かどうかを判定する（大文字小文字は区別しない）
pub fn is_accepted_receipt(file_name: &str) -> bool {
    ACCEPTED_RECEIPT_NAME.is_match(file_name)
}

/// 領収書ファイルを検証する
///
/// # エラー
/// 拡張子が許可リストにない場合はバリデーションエラー
pub fn validate_receipt(file: &ReceiptFile) -> AppResult<()> {
    if is_accepted_receipt(&file.file_name) {
        Ok(())
    } else {
        log::warn!("領収書の形式が不正です: file_name={}", file.file_name);
        Err(AppError::validation(INVALID_RECEIPT_FORMAT_MESSAGE))
    }
}

/// ファイル名からContent-Typeを取得
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// 領収書プレビューの表示内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptPreview {
    /// 画像として表示
    Image { url: String, file_name: String },
    /// 埋め込みドキュメントとして表示
    Document { url: String, file_name: String },
    /// 領収書がない場合のプレースホルダー
    Placeholder,
}

impl ReceiptPreview {
    /// 領収書の参照からプレビューを作成する
    pub fn for_receipt(receipt: Option<&ReceiptRef>) -> Self {
        match receipt {
            None => ReceiptPreview::Placeholder,
            Some(receipt) if receipt.url.trim().is_empty() => ReceiptPreview::Placeholder,
            Some(receipt) => {
                let url = receipt.url.clone();
                let file_name = receipt.file_name.clone();
                if content_type_for(&receipt.file_name).starts_with("image/") {
                    ReceiptPreview::Image { url, file_name }
                } else {
                    ReceiptPreview::Document { url, file_name }
                }
            }
        }
    }

    /// 表示するURL（プレースホルダーの場合はNone）
    pub fn url(&self) -> Option<&str> {
        match self {
            ReceiptPreview::Image { url, .. } | ReceiptPreview::Document { url, .. } => Some(url),
            ReceiptPreview::Placeholder => None,
        }
    }
}

/// 作成済みの請求書に領収書を後から添付する
///
/// # 引数
/// * `store` - 永続化サービス
/// * `session` - ログイン中ユーザー（emailが更新ペイロードに付与される）
/// * `bill_id` - 対象の請求書ID
/// * `file` - 添付するファイル
///
/// # 戻り値
/// 更新後の請求書
///
/// # エラー
/// 形式が不正な場合はバリデーションエラー（サービスは呼ばれない）、
/// 請求書が存在しない場合はNotFound
pub async fn attach_receipt(
    store: &dyn BillStore,
    session: &SessionContext,
    bill_id: &str,
    file: ReceiptFile,
) -> AppResult<Bill> {
    validate_receipt(&file)?;

    log::info!(
        "領収書の添付を開始: bill_id={bill_id}, file_name={}",
        file.file_name
    );

    let update = BillUpdate {
        email: Some(session.email.clone()),
        receipt: Some(ReceiptAttachment::Upload(file)),
        ..BillUpdate::for_bill(bill_id)
    };
    let bill = store.update(update).await?;

    log::info!("領収書の添付に成功: bill_id={}", bill.id);
    Ok(bill)
}
