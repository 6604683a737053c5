use crate::features::bills::models::{Bill, BillUpdate, NewBill, ReceiptAttachment, ReceiptFile};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::nanoid::generate_bill_id;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// 請求書の永続化サービス
///
/// 各呼び出しは毎回リモートへの往復となり、リトライやキャッシュは行わない
#[async_trait]
pub trait BillStore: Send + Sync {
    /// 現在のユーザーが参照できる請求書をすべて取得する
    async fn list(&self) -> AppResult<Vec<Bill>>;

    /// 請求書を作成し、IDが割り当てられた保存済みレコードを返す
    async fn create(&self, payload: NewBill) -> AppResult<Bill>;

    /// 既存の請求書を部分更新する
    async fn update(&self, payload: BillUpdate) -> AppResult<Bill>;
}

#[async_trait]
impl<S> BillStore for Arc<S>
where
    S: BillStore + ?Sized,
{
    async fn list(&self) -> AppResult<Vec<Bill>> {
        (**self).list().await
    }

    async fn create(&self, payload: NewBill) -> AppResult<Bill> {
        (**self).create(payload).await
    }

    async fn update(&self, payload: BillUpdate) -> AppResult<Bill> {
        (**self).update(payload).await
    }
}

#[derive(Debug, Default)]
struct InMemoryState {
    bills: Vec<Bill>,
    next_failure: Option<AppError>,
    list_calls: usize,
    create_calls: usize,
    update_calls: usize,
}

/// プロセス内で完結する永続化サービス
///
/// IDはnanoIdで採番し、領収書URLは`receipt_base_url`から合成する。
/// 次の1回の呼び出しを失敗させる`fail_next`を持つ
#[derive(Debug, Clone)]
pub struct InMemoryBillStore {
    state: Arc<Mutex<InMemoryState>>,
    receipt_base_url: String,
}

impl Default for InMemoryBillStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBillStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState::default())),
            receipt_base_url: "memory://receipts".to_string(),
        }
    }

    /// 既存の請求書で初期化したストアを作成
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.bills = bills;
        }
        store
    }

    /// 次の1回の呼び出しを指定したエラーで失敗させる
    pub fn fail_next(&self, error: AppError) {
        if let Ok(mut state) = self.state.lock() {
            state.next_failure = Some(error);
        }
    }

    /// 保存されている請求書のスナップショット
    pub fn bills(&self) -> Vec<Bill> {
        self.state
            .lock()
            .map(|state| state.bills.clone())
            .unwrap_or_default()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().map(|s| s.list_calls).unwrap_or(0)
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().map(|s| s.create_calls).unwrap_or(0)
    }

    pub fn update_calls(&self) -> usize {
        self.state.lock().map(|s| s.update_calls).unwrap_or(0)
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, InMemoryState>> {
        self.state
            .lock()
            .map_err(|e| AppError::unreachable(format!("ストアのロック取得に失敗: {e}")))
    }

    fn receipt_url(&self, bill_id: &str, file: &ReceiptFile) -> String {
        format!(
            "{}/{}/{}",
            self.receipt_base_url,
            bill_id,
            urlencoding::encode(&file.file_name)
        )
    }
}

#[async_trait]
impl BillStore for InMemoryBillStore {
    async fn list(&self) -> AppResult<Vec<Bill>> {
        let mut state = self.lock()?;
        state.list_calls += 1;
        if let Some(error) = state.next_failure.take() {
            return Err(error);
        }
        Ok(state.bills.clone())
    }

    async fn create(&self, payload: NewBill) -> AppResult<Bill> {
        let mut state = self.lock()?;
        state.create_calls += 1;
        if let Some(error) = state.next_failure.take() {
            return Err(error);
        }

        let id = generate_bill_id();
        let (receipt_url, receipt_file_name) = match &payload.receipt {
            Some(file) => (
                Some(self.receipt_url(&id, file)),
                Some(file.file_name.clone()),
            ),
            None => (None, None),
        };

        let bill = Bill {
            id,
            email: payload.email,
            expense_type: payload.expense_type,
            name: payload.name,
            date: payload.date,
            amount: payload.amount,
            vat_amount: payload.vat_amount,
            vat_percentage: Some(payload.vat_percentage),
            status: payload.status,
            commentary: payload.commentary,
            admin_commentary: None,
            receipt_url,
            receipt_file_name,
        };

        log::debug!("インメモリストアに請求書を作成: bill_id={}", bill.id);
        state.bills.push(bill.clone());
        Ok(bill)
    }

    async fn update(&self, payload: BillUpdate) -> AppResult<Bill> {
        let mut state = self.lock()?;
        state.update_calls += 1;
        if let Some(error) = state.next_failure.take() {
            return Err(error);
        }

        let receipt = match &payload.receipt {
            Some(ReceiptAttachment::Upload(file)) => {
                Some((self.receipt_url(&payload.id, file), file.file_name.clone()))
            }
            Some(ReceiptAttachment::Link(link)) => Some((link.url.clone(), link.file_name.clone())),
            None => None,
        };

        let bill = state
            .bills
            .iter_mut()
            .find(|bill| bill.id == payload.id)
            .ok_or_else(|| AppError::not_found(format!("請求書 {}", payload.id)))?;

        if let Some(expense_type) = payload.expense_type {
            bill.expense_type = expense_type;
        }
        if let Some(name) = payload.name {
            bill.name = name;
        }
        if let Some(date) = payload.date {
            bill.date = date;
        }
        if let Some(amount) = payload.amount {
            bill.amount = amount;
        }
        if payload.vat_amount.is_some() {
            bill.vat_amount = payload.vat_amount;
        }
        if payload.vat_percentage.is_some() {
            bill.vat_percentage = payload.vat_percentage;
        }
        if payload.commentary.is_some() {
            bill.commentary = payload.commentary;
        }
        if let Some(email) = payload.email {
            bill.email = email;
        }
        if let Some((url, file_name)) = receipt {
            bill.receipt_url = Some(url);
            bill.receipt_file_name = Some(file_name);
        }

        Ok(bill.clone())
    }
}
