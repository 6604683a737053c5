/// 機能別モジュール
///
/// 各機能モジュールは、その機能に関連するモデル・サービス・コントローラーを含む
/// 自己完結型のユニットです。
pub mod bills;
pub mod navigation;
pub mod new_bill;
pub mod session;
