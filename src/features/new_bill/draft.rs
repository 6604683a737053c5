use crate::features::bills::models::{BillStatus, ExpenseType, NewBill, ReceiptFile};
use crate::features::session::SessionContext;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{
    non_empty, normalize_string, parse_non_negative_integer, validate_date,
    validate_required_field,
};

/// TVA率が未入力の場合の既定値
pub const DEFAULT_VAT_PERCENTAGE: u8 = 20;

/// フォームの入力項目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    ExpenseType,
    Name,
    Date,
    Amount,
    Vat,
    Pct,
    Commentary,
}

/// 提出前の下書き
///
/// 入力値は文字列のまま保持し、提出時にまとめて検証する。
/// 領収書は受付済みのものだけがここに置かれ、アップロードは提出時に行われる
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub expense_type: String,
    pub name: String,
    pub date: String,
    pub amount: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
    pub receipt: Option<ReceiptFile>,
}

impl Draft {
    /// 入力項目の値を取得
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::ExpenseType => &self.expense_type,
            DraftField::Name => &self.name,
            DraftField::Date => &self.date,
            DraftField::Amount => &self.amount,
            DraftField::Vat => &self.vat,
            DraftField::Pct => &self.pct,
            DraftField::Commentary => &self.commentary,
        }
    }

    /// 入力項目の値を設定
    pub fn set<S: Into<String>>(&mut self, field: DraftField, value: S) {
        let value = value.into();
        match field {
            DraftField::ExpenseType => self.expense_type = value,
            DraftField::Name => self.name = value,
            DraftField::Date => self.date = value,
            DraftField::Amount => self.amount = value,
            DraftField::Vat => self.vat = value,
            DraftField::Pct => self.pct = value,
            DraftField::Commentary => self.commentary = value,
        }
    }

    /// 下書きを検証して作成ペイロードに変換する
    ///
    /// # 引数
    /// * `session` - ログイン中ユーザー（emailが付与される）
    ///
    /// # 戻り値
    /// 検証済みのペイロード。最初に見つかった不備をバリデーションエラーとして返す
    pub fn to_new_bill(&self, session: &SessionContext) -> AppResult<NewBill> {
        validate_required_field(&self.expense_type, "Veuillez choisir un type de dépense")?;
        let expense_type = ExpenseType::from_label(&self.expense_type)
            .ok_or_else(|| AppError::validation("Le type de dépense n'est pas valide"))?;

        validate_required_field(&self.date, "Veuillez saisir une date")?;
        let date = validate_date(self.date.trim())?;

        let amount = parse_non_negative_integer(
            &self.amount,
            "Le montant doit être un nombre entier positif",
        )?
        .ok_or_else(|| AppError::validation("Veuillez saisir un montant"))?;

        let vat_amount =
            parse_non_negative_integer(&self.vat, "La TVA doit être un nombre entier positif")?;

        let vat_percentage = match parse_non_negative_integer(&self.pct, PCT_MESSAGE)? {
            None => DEFAULT_VAT_PERCENTAGE,
            Some(pct) => u8::try_from(pct)
                .ok()
                .filter(|pct| *pct <= 100)
                .ok_or_else(|| AppError::validation(PCT_MESSAGE))?,
        };

        Ok(NewBill {
            email: session.email.clone(),
            expense_type,
            name: normalize_string(&self.name),
            date: date.format("%Y-%m-%d").to_string(),
            amount,
            vat_amount,
            vat_percentage,
            commentary: non_empty(&self.commentary),
            status: BillStatus::Pending,
            receipt: self.receipt.clone(),
        })
    }
}

const PCT_MESSAGE: &str = "Le pourcentage de TVA doit être un entier entre 0 et 100";
