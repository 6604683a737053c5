/// セッション機能モジュール
///
/// ログイン中ユーザーの読み取り専用コンテキストと、その寿命（ログインで設定、
/// ログアウトでクリア）を管理します
pub mod models;
pub mod store;

pub use models::{SessionContext, UserType};
pub use store::{session_from_env, SessionStore};
