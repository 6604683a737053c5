use nanoid::nanoid;

/// 請求書ID用のnanoIdを生成する
///
/// # 戻り値
/// 20文字のURL-safeなnanoId（リモートAPIのID長に合わせる）
pub fn generate_bill_id() -> String {
    nanoid!(20)
}
