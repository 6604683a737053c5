use crate::features::session::models::{SessionContext, UserType};
use crate::shared::errors::{AppError, AppResult};
use std::sync::{Arc, RwLock};

/// セッション情報を保持するストア
///
/// ログイン時に設定され、ログアウト時にクリアされる。
/// コントローラーは生成時に`current()`で取得したコピーを受け取る
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<SessionContext>>>,
}

impl SessionStore {
    /// 空のセッションストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ログインしてセッションを設定する
    pub fn login(&self, session: SessionContext) -> AppResult<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|e| AppError::session(format!("セッションロックの取得に失敗: {e}")))?;
        log::info!("セッションを開始しました: email={}", session.email);
        *guard = Some(session);
        Ok(())
    }

    /// ログアウトしてセッションをクリアする
    pub fn logout(&self) -> AppResult<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|e| AppError::session(format!("セッションロックの取得に失敗: {e}")))?;
        if let Some(session) = guard.take() {
            log::info!("セッションを終了しました: email={}", session.email);
        } else {
            log::warn!("終了対象のセッションがありません");
        }
        Ok(())
    }

    /// 現在のセッションを取得する
    ///
    /// # エラー
    /// ログインしていない場合はセッションエラー
    pub fn current(&self) -> AppResult<SessionContext> {
        let guard = self
            .inner
            .read()
            .map_err(|e| AppError::session(format!("セッションロックの取得に失敗: {e}")))?;
        guard
            .clone()
            .ok_or_else(|| AppError::session("ログインしていません"))
    }
}

/// 環境変数からセッションを作成する（CLI用）
///
/// # 環境変数
/// * `BILLED_USER_EMAIL` - 必須
/// * `BILLED_USER_TYPE` - 任意（デフォルト: Employee）
/// * `BILLED_AUTH_TOKEN` - 任意
pub fn session_from_env() -> AppResult<SessionContext> {
    let email = crate::get_env_var!("BILLED_USER_EMAIL")
        .map_err(|e| AppError::session(format!("ユーザー情報が設定されていません: {e}")))?;

    let user_type_raw = crate::get_env_var_or_default!("BILLED_USER_TYPE", "Employee");
    let user_type = UserType::parse(&user_type_raw).ok_or_else(|| {
        AppError::configuration(format!("不明なユーザー種別です: {user_type_raw}"))
    })?;

    Ok(SessionContext {
        email,
        user_type,
        token: crate::get_env_var_optional!("BILLED_AUTH_TOKEN"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_and_logout_lifecycle() {
        let store = SessionStore::new();
        assert!(store.current().is_err());
        assert!(matches!(store.current(), Err(AppError::Session(_))));

        store.login(SessionContext::employee("a@a")).unwrap();
        assert!(store.current().is_ok());
        assert_eq!(store.current().unwrap().email, "a@a");

        store.logout().unwrap();
        assert!(store.current().is_err());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        store.login(SessionContext::employee("a@a")).unwrap();
        assert_eq!(other.current().unwrap().email, "a@a");
    }

    #[test]
    fn test_logout_without_session_is_ok() {
        let store = SessionStore::new();
        assert!(store.logout().is_ok());
    }
}
