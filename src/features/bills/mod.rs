/// 請求書（ノート・ド・フレ）機能モジュール
///
/// このモジュールは請求書一覧に関連する機能を提供します：
/// - 請求書モデルとAPIのワイヤー形式
/// - 永続化サービス（REST API / インメモリ）
/// - 一覧表示用の整形と並び替え
/// - 領収書の受付判定とプレビュー
/// - 一覧画面のコントローラー
pub mod api_store;
pub mod controller;
pub mod formatter;
pub mod models;
pub mod receipts;
pub mod store;

// モデル
pub use models::{
    Bill, BillStatus, BillUpdate, DisplayRow, ExpenseType, NewBill, ReceiptAttachment,
    ReceiptFile, ReceiptRef, StatusTreatment,
};

// 永続化サービス
pub use api_store::HttpBillStore;
pub use store::{BillStore, InMemoryBillStore};

// 整形・領収書
pub use formatter::format_bills;
pub use receipts::{attach_receipt, is_accepted_receipt, ReceiptPreview};

// コントローラー
pub use controller::{BillsPage, ListError, ListModel, ListState};
