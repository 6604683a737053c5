pub mod nanoid;

use crate::shared::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

/// 日付文字列のバリデーション
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// 解析済みの日付、無効な場合はエラー
///
/// # バリデーション規則
/// - YYYY-MM-DD形式であること
/// - 実在する日付であること
/// - 1900年以降、2100年以前であること
pub fn validate_date(date_str: &str) -> AppResult<NaiveDate> {
    if date_str.len() != 10
        || date_str.chars().nth(4) != Some('-')
        || date_str.chars().nth(7) != Some('-')
    {
        return Err(AppError::validation(
            "La date doit être au format AAAA-MM-JJ",
        ));
    }

    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::validation("La date n'est pas valide"))?;

    if !(1900..=2100).contains(&date.year()) {
        return Err(AppError::validation(
            "La date doit être comprise entre 1900 et 2100",
        ));
    }

    Ok(date)
}

/// 必須フィールドのバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `message` - 空の場合のエラーメッセージ
pub fn validate_required_field(text: &str, message: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(())
}

/// 0以上の整数として解析する
///
/// # 引数
/// * `text` - 入力文字列
/// * `message` - 解析できない場合のエラーメッセージ
///
/// # 戻り値
/// 空文字列の場合はNone、整数の場合はSome
pub fn parse_non_negative_integer(text: &str, message: &str) -> AppResult<Option<u64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<u64>()
        .map(Some)
        .map_err(|_| AppError::validation(message))
}

/// 文字列の正規化（前後の空白を削除）
pub fn normalize_string(text: &str) -> String {
    text.trim().to_string()
}

/// 空白のみの文字列をNoneにする
pub fn non_empty(text: &str) -> Option<String> {
    let normalized = normalize_string(text);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
