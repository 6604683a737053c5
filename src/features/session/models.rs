use serde::{Deserialize, Serialize};

/// ユーザー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Employee,
    Admin,
}

impl UserType {
    /// 文字列からユーザー種別を判定（大文字小文字は区別しない）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "employee" => Some(UserType::Employee),
            "admin" => Some(UserType::Admin),
            _ => None,
        }
    }
}

/// ログイン中ユーザーのセッション情報（読み取り専用）
///
/// 作成・更新リクエストにはここのemailが付与される
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub email: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    /// APIサーバー用のJWT
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub token: Option<String>,
}

impl SessionContext {
    /// 従業員セッションを作成する
    pub fn employee<S: Into<String>>(email: S) -> Self {
        Self {
            email: email.into(),
            user_type: UserType::Employee,
            token: None,
        }
    }

    /// トークンを設定する
    pub fn with_token<S: Into<String>>(mut self, token: S) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_parse() {
        assert_eq!(UserType::parse("Employee"), Some(UserType::Employee));
        assert_eq!(UserType::parse(" admin "), Some(UserType::Admin));
        assert_eq!(UserType::parse("guest"), None);
    }

    #[test]
    fn test_session_context_deserialization() {
        // ログイン時に保存される形式
        let json = r#"{"type": "Employee", "email": "a@a"}"#;
        let session: SessionContext = serde_json::from_str(json).unwrap();
        assert_eq!(session.email, "a@a");
        assert_eq!(session.user_type, UserType::Employee);
        assert_eq!(session.token, None);
    }

    #[test]
    fn test_session_context_builders() {
        let session = SessionContext::employee("a@a").with_token("jwt");
        assert_eq!(session.token.as_deref(), Some("jwt"));
        assert_eq!(session.user_type, UserType::Employee);
    }
}
