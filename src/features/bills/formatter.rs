// 請求書一覧の整形（副作用なし）

use crate::features::bills::models::{Bill, BillStatus, DisplayRow, StatusTreatment};
use chrono::{Datelike, NaiveDate};

/// フランス語の月の略称（先頭3文字、先頭大文字）
const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// 並び替えキーとしてISO形式に正規化できる入力形式
const SORTABLE_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// 日付を一覧表示用に整形する
///
/// `"2004-04-04"` は `"4 Avr. 04"` になる。解析できない日付は元の文字列のまま返す
pub fn format_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => format!(
            "{} {}. {:02}",
            date.day(),
            MONTH_ABBREVIATIONS[date.month0() as usize],
            date.year().rem_euclid(100)
        ),
        Err(_) => {
            log::debug!("日付を整形できないため元の値を使用します: date={raw}");
            raw.to_string()
        }
    }
}

/// ステータスの表示ラベル
pub fn format_status(status: BillStatus) -> &'static str {
    match status {
        BillStatus::Pending => "En attente",
        BillStatus::Accepted => "Accepté",
        BillStatus::Refused => "Refusé",
    }
}

/// ステータスの表示上の扱い
pub fn status_treatment(status: BillStatus) -> StatusTreatment {
    match status {
        BillStatus::Pending => StatusTreatment::Pending,
        BillStatus::Accepted => StatusTreatment::Accepted,
        BillStatus::Refused => StatusTreatment::Refused,
    }
}

/// 金額を表示用に整形する
pub fn format_amount(amount: u64) -> String {
    format!("{amount} €")
}

/// 並び替えキーを取得する
///
/// 既知の形式はISO（YYYY-MM-DD）に正規化し、それ以外は前後の空白を除いた文字列で比較する
pub fn sort_key(raw: &str) -> String {
    let trimmed = raw.trim();
    SORTABLE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// 日付の降順（新しい順）に並び替える
///
/// 安定ソートなので同じ日付の請求書は入力順を保つ
pub fn sort_bills_desc(bills: &mut [Bill]) {
    bills.sort_by_cached_key(|bill| std::cmp::Reverse(sort_key(&bill.date)));
}

/// 請求書を一覧表示用の行に変換する
pub fn to_display_row(bill: &Bill) -> DisplayRow {
    DisplayRow {
        id: bill.id.clone(),
        type_label: bill.expense_type.label().to_string(),
        name: bill.name.clone(),
        date: format_date(&bill.date),
        raw_date: bill.date.clone(),
        amount: format_amount(bill.amount),
        status_label: format_status(bill.status),
        status_treatment: status_treatment(bill.status),
        receipt: bill.receipt(),
    }
}

/// 請求書一覧を並び替えて表示用の行に変換する
pub fn format_bills(mut bills: Vec<Bill>) -> Vec<DisplayRow> {
    sort_bills_desc(&mut bills);
    bills.iter().map(to_display_row).collect()
}
