/// 新規請求書（提出フォーム）機能モジュール
///
/// 入力の下書き、領収書ファイルの受付判定、提出と失敗時の復帰を扱います
pub mod controller;
pub mod draft;

pub use controller::{FormState, NewBillForm, NewBillPage, ViewEffect};
pub use draft::{Draft, DraftField, DEFAULT_VAT_PERCENTAGE};
