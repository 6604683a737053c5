use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 経費カテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseType {
    #[serde(rename = "Transports")]
    Transports,
    #[serde(rename = "Restaurants et bars")]
    RestaurantsEtBars,
    #[serde(rename = "Hôtel et logement")]
    HotelEtLogement,
    #[serde(rename = "Services en ligne")]
    ServicesEnLigne,
    #[serde(rename = "IT et électronique")]
    ItEtElectronique,
    #[serde(rename = "Equipement et matériel")]
    EquipementEtMateriel,
    #[serde(rename = "Fournitures de bureau")]
    FournituresDeBureau,
    /// APIが返した未知のカテゴリ
    #[serde(other)]
    Unknown,
}

impl ExpenseType {
    /// フォームで選択可能なカテゴリ一覧
    pub const ALL: [ExpenseType; 7] = [
        ExpenseType::Transports,
        ExpenseType::RestaurantsEtBars,
        ExpenseType::HotelEtLogement,
        ExpenseType::ServicesEnLigne,
        ExpenseType::ItEtElectronique,
        ExpenseType::EquipementEtMateriel,
        ExpenseType::FournituresDeBureau,
    ];

    /// 表示ラベル（APIの値と同一）
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseType::Transports => "Transports",
            ExpenseType::RestaurantsEtBars => "Restaurants et bars",
            ExpenseType::HotelEtLogement => "Hôtel et logement",
            ExpenseType::ServicesEnLigne => "Services en ligne",
            ExpenseType::ItEtElectronique => "IT et électronique",
            ExpenseType::EquipementEtMateriel => "Equipement et matériel",
            ExpenseType::FournituresDeBureau => "Fournitures de bureau",
            ExpenseType::Unknown => "Autre",
        }
    }

    /// ラベルからカテゴリを取得（フォームの選択値用）
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 請求書のステータス
///
/// pending → accepted | refused の遷移は管理者側で行われる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Pending,
    Accepted,
    Refused,
}

/// 請求書（永続化エンティティ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    #[serde(default)]
    pub name: String,
    /// 保存されたままの日付文字列（通常はYYYY-MM-DD）
    pub date: String,
    pub amount: u64,
    #[serde(
        rename = "vat",
        default,
        deserialize_with = "deserialize_lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub vat_amount: Option<u64>,
    #[serde(
        rename = "pct",
        default,
        deserialize_with = "deserialize_lenient_u8",
        skip_serializing_if = "Option::is_none"
    )]
    pub vat_percentage: Option<u8>,
    pub status: BillStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    #[serde(
        rename = "commentAdmin",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub admin_commentary: Option<String>,
    #[serde(rename = "fileUrl", default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub receipt_file_name: Option<String>,
}

impl Bill {
    /// 領収書の参照を取得
    ///
    /// URLとファイル名の両方が揃っている場合のみSome
    pub fn receipt(&self) -> Option<ReceiptRef> {
        match (&self.receipt_url, &self.receipt_file_name) {
            (Some(url), Some(file_name)) if !url.is_empty() && !file_name.is_empty() => {
                Some(ReceiptRef {
                    url: url.clone(),
                    file_name: file_name.clone(),
                })
            }
            _ => None,
        }
    }
}

/// 保存済み領収書への参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRef {
    pub url: String,
    pub file_name: String,
}

/// アップロード前の領収書ファイル（中身は解釈しない）
#[derive(Clone, PartialEq, Eq)]
pub struct ReceiptFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ReceiptFile {
    pub fn new<S: Into<String>>(file_name: S, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

// バイト列はログに出さない
impl fmt::Debug for ReceiptFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiptFile")
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// 請求書作成用ペイロード
///
/// 検証済みの下書きからのみ作られる
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBill {
    pub email: String,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub name: String,
    pub date: String,
    pub amount: u64,
    #[serde(rename = "vat", skip_serializing_if = "Option::is_none")]
    pub vat_amount: Option<u64>,
    #[serde(rename = "pct")]
    pub vat_percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    pub status: BillStatus,
    /// multipartの別パートとして送信される
    #[serde(skip)]
    pub receipt: Option<ReceiptFile>,
}

/// 領収書の添付方法
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiptAttachment {
    /// ファイルをアップロードして添付
    Upload(ReceiptFile),
    /// アップロード済みのURLを紐付け
    Link(ReceiptRef),
}

/// 請求書更新用ペイロード（部分更新）
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BillUpdate {
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub expense_type: Option<ExpenseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(rename = "vat", skip_serializing_if = "Option::is_none")]
    pub vat_amount: Option<u64>,
    #[serde(rename = "pct", skip_serializing_if = "Option::is_none")]
    pub vat_percentage: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    /// 作成・更新時にセッションから付与される
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip)]
    pub receipt: Option<ReceiptAttachment>,
}

impl BillUpdate {
    /// 指定IDの空の更新を作成
    pub fn for_bill<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// ステータスの表示上の扱い（色分けは表示層が決める）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTreatment {
    Pending,
    Accepted,
    Refused,
}

/// 一覧表示用の行（取得のたびに再計算され、保存されない）
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub id: String,
    pub type_label: String,
    pub name: String,
    /// 整形済みの日付（解析できない場合は元の文字列）
    pub date: String,
    /// 元の日付文字列
    pub raw_date: String,
    pub amount: String,
    pub status_label: &'static str,
    pub status_treatment: StatusTreatment,
    pub receipt: Option<ReceiptRef>,
}

/// 数値・数値文字列・空文字列・nullのいずれも受け付ける
fn deserialize_lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Number(u64),
        Text(String),
    }

    match Option::<Lenient>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Lenient::Number(n)) => Ok(Some(n)),
        Some(Lenient::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Lenient::Text(text)) => text
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn deserialize_lenient_u8<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    // 範囲外の値は一覧全体を失敗させず、その請求書だけ率なしとして扱う
    match deserialize_lenient_u64(deserializer)? {
        None => Ok(None),
        Some(n) => match u8::try_from(n).ok().filter(|pct| *pct <= 100) {
            Some(pct) => Ok(Some(pct)),
            None => {
                log::warn!("TVA率が範囲外のため無視します: pct={n}");
                Ok(None)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_bill_json() -> &'static str {
        r#"{
            "id": "47qAXb6fIm2zOKkLzMro",
            "vat": "80",
            "fileUrl": "https://firebasestorage.googleapis.com/v0/b/billable-677b6.a/preview-facture-free-201801-pdf-1.jpg",
            "status": "pending",
            "type": "Hôtel et logement",
            "commentary": "séminaire billed",
            "name": "encore",
            "fileName": "preview-facture-free-201801-pdf-1.jpg",
            "date": "2004-04-04",
            "amount": 400,
            "commentAdmin": "ok",
            "email": "a@a",
            "pct": 20
        }"#
    }

    #[test]
    fn test_bill_deserialization_from_api() {
        let bill: Bill = serde_json::from_str(api_bill_json()).unwrap();

        assert_eq!(bill.id, "47qAXb6fIm2zOKkLzMro");
        assert_eq!(bill.expense_type, ExpenseType::HotelEtLogement);
        assert_eq!(bill.vat_amount, Some(80));
        assert_eq!(bill.vat_percentage, Some(20));
        assert_eq!(bill.status, BillStatus::Pending);
        assert_eq!(bill.admin_commentary.as_deref(), Some("ok"));
        assert_eq!(
            bill.receipt().map(|r| r.file_name),
            Some("preview-facture-free-201801-pdf-1.jpg".to_string())
        );
    }

    #[test]
    fn test_bill_lenient_vat_fields() {
        let json = r#"{"id": "b1", "type": "Transports", "date": "2001-01-01",
                       "amount": 100, "status": "accepted", "vat": "", "pct": null}"#;
        let bill: Bill = serde_json::from_str(json).unwrap();
        assert_eq!(bill.vat_amount, None);
        assert_eq!(bill.vat_percentage, None);
        assert!(bill.receipt().is_none());
    }

    #[test]
    fn test_out_of_range_pct_does_not_fail_the_list() {
        let json = r#"[
            {"id": "b1", "type": "Transports", "date": "2001-01-01",
             "amount": 100, "status": "accepted", "pct": 20},
            {"id": "b2", "type": "Transports", "date": "2002-02-02",
             "amount": 50, "status": "pending", "pct": 150},
            {"id": "b3", "type": "Transports", "date": "2003-03-03",
             "amount": 10, "status": "refused", "pct": "999"}
        ]"#;
        let bills: Vec<Bill> = serde_json::from_str(json).unwrap();

        assert_eq!(bills.len(), 3);
        assert_eq!(bills[0].vat_percentage, Some(20));
        assert_eq!(bills[1].vat_percentage, None);
        assert_eq!(bills[1].amount, 50);
        assert_eq!(bills[2].vat_percentage, None);
    }

    #[test]
    fn test_unknown_expense_type() {
        let json = r#"{"id": "b1", "type": "Voyage spatial", "date": "2001-01-01",
                       "amount": 100, "status": "refused"}"#;
        let bill: Bill = serde_json::from_str(json).unwrap();
        assert_eq!(bill.expense_type, ExpenseType::Unknown);
        assert_eq!(bill.expense_type.label(), "Autre");
    }

    #[test]
    fn test_receipt_requires_both_url_and_name() {
        let mut bill: Bill = serde_json::from_str(api_bill_json()).unwrap();
        bill.receipt_file_name = None;
        assert!(bill.receipt().is_none());
    }

    #[test]
    fn test_expense_type_from_label() {
        assert_eq!(
            ExpenseType::from_label("Restaurants et bars"),
            Some(ExpenseType::RestaurantsEtBars)
        );
        assert_eq!(ExpenseType::from_label(""), None);
        assert_eq!(ExpenseType::from_label("Autre"), None);
    }

    #[test]
    fn test_new_bill_serialization_skips_receipt() {
        let new_bill = NewBill {
            email: "a@a".to_string(),
            expense_type: ExpenseType::RestaurantsEtBars,
            name: "test".to_string(),
            date: "2021-03-01".to_string(),
            amount: 100,
            vat_amount: Some(20),
            vat_percentage: 45,
            commentary: None,
            status: BillStatus::Pending,
            receipt: Some(ReceiptFile::new("test_file.png", vec![1, 2, 3])),
        };

        let json = serde_json::to_value(&new_bill).unwrap();
        assert_eq!(json["type"], "Restaurants et bars");
        assert_eq!(json["pct"], 45);
        assert_eq!(json["status"], "pending");
        assert!(json.get("receipt").is_none());
        assert!(json.get("commentary").is_none());
    }

    #[test]
    fn test_receipt_file_debug_hides_bytes() {
        let file = ReceiptFile::new("a.png", vec![0; 2048]);
        let debug = format!("{file:?}");
        assert!(debug.contains("a.png"));
        assert!(debug.contains("2048"));
    }
}
