// 請求書一覧画面のコントローラー
//
// 状態遷移は純粋関数`reduce`で表し、`BillsPage`がストアと遷移関数に接続する

use crate::features::bills::formatter::format_bills;
use crate::features::bills::models::{Bill, DisplayRow, ReceiptRef};
use crate::features::bills::receipts::ReceiptPreview;
use crate::features::bills::store::BillStore;
use crate::features::navigation::{Navigator, Route};
use crate::shared::errors::{AppError, StatusClass};
use std::sync::Arc;

/// 一覧取得に失敗した際に表示層へ渡すエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListError {
    /// 4xx/5xxの分類（メッセージ表示にのみ使用）
    pub status_class: Option<StatusClass>,
    pub message: String,
}

impl From<&AppError> for ListError {
    fn from(error: &AppError) -> Self {
        Self {
            status_class: error.status_class(),
            message: error.user_message(),
        }
    }
}

/// 一覧の状態
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ListState {
    /// 取得中
    #[default]
    Loading,
    /// 取得済み（取得のたびに丸ごと置き換えられる）
    Loaded(Vec<DisplayRow>),
    /// 取得失敗（空の一覧としては扱わない）
    Failed(ListError),
}

/// 一覧画面のモデル
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListModel {
    pub state: ListState,
    /// 表示中の領収書プレビュー
    pub preview: Option<ReceiptPreview>,
}

/// 一覧画面へのイベント
#[derive(Debug)]
pub enum ListEvent {
    /// 画面が表示された（または再読み込み）
    Activated,
    BillsFetched(Vec<Bill>),
    FetchFailed(AppError),
    ClickNewBill,
    ClickIconEye(Option<ReceiptRef>),
    ClosePreview,
}

/// 実行すべき副作用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEffect {
    FetchBills,
    Navigate(Route),
}

/// 一覧画面の状態遷移
pub fn reduce(model: ListModel, event: ListEvent) -> (ListModel, Vec<ListEffect>) {
    match event {
        ListEvent::Activated => (
            ListModel {
                state: ListState::Loading,
                ..model
            },
            vec![ListEffect::FetchBills],
        ),
        ListEvent::BillsFetched(bills) => (
            ListModel {
                state: ListState::Loaded(format_bills(bills)),
                ..model
            },
            Vec::new(),
        ),
        ListEvent::FetchFailed(error) => (
            ListModel {
                state: ListState::Failed(ListError::from(&error)),
                ..model
            },
            Vec::new(),
        ),
        ListEvent::ClickNewBill => (model, vec![ListEffect::Navigate(Route::NewBill)]),
        ListEvent::ClickIconEye(receipt) => (
            ListModel {
                preview: Some(ReceiptPreview::for_receipt(receipt.as_ref())),
                ..model
            },
            Vec::new(),
        ),
        ListEvent::ClosePreview => (
            ListModel {
                preview: None,
                ..model
            },
            Vec::new(),
        ),
    }
}

/// 請求書一覧画面
pub struct BillsPage {
    store: Arc<dyn BillStore>,
    navigator: Arc<dyn Navigator>,
    model: ListModel,
}

impl BillsPage {
    pub fn new(store: Arc<dyn BillStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            model: ListModel::default(),
        }
    }

    /// 現在の一覧の状態
    pub fn state(&self) -> &ListState {
        &self.model.state
    }

    /// 表示中の領収書プレビュー
    pub fn preview(&self) -> Option<&ReceiptPreview> {
        self.model.preview.as_ref()
    }

    /// 請求書を取得して一覧を更新する
    ///
    /// 失敗時はエラー状態になり、再試行は行わない
    pub async fn load(&mut self) -> &ListState {
        let effects = self.dispatch(ListEvent::Activated);

        if effects.contains(&ListEffect::FetchBills) {
            let event = match self.store.list().await {
                Ok(bills) => {
                    log::info!("請求書一覧取得成功: count={}", bills.len());
                    ListEvent::BillsFetched(bills)
                }
                Err(error) => {
                    log::log!(
                        error.severity().log_level(),
                        "請求書一覧取得失敗: {}",
                        error.details()
                    );
                    ListEvent::FetchFailed(error)
                }
            };
            self.dispatch(event);
        }

        &self.model.state
    }

    /// 「新しいノート・ド・フレ」ボタン
    pub fn handle_click_new_bill(&mut self) {
        self.dispatch(ListEvent::ClickNewBill);
    }

    /// 目のアイコン：領収書プレビューを開く
    pub fn handle_click_icon_eye(&mut self, receipt: Option<&ReceiptRef>) -> &ReceiptPreview {
        self.dispatch(ListEvent::ClickIconEye(receipt.cloned()));
        self.model
            .preview
            .get_or_insert(ReceiptPreview::Placeholder)
    }

    /// 領収書プレビューを閉じる
    pub fn close_preview(&mut self) {
        self.dispatch(ListEvent::ClosePreview);
    }

    /// イベントを適用し、同期的な副作用（画面遷移）を実行する
    ///
    /// 非同期の副作用は呼び出し側に返す
    fn dispatch(&mut self, event: ListEvent) -> Vec<ListEffect> {
        let model = std::mem::take(&mut self.model);
        let (model, effects) = reduce(model, event);
        self.model = model;

        for effect in &effects {
            if let ListEffect::Navigate(route) = effect {
                log::debug!("画面遷移: route={route}");
                self.navigator.navigate(*route);
            }
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::bills::models::{BillStatus, ExpenseType, StatusTreatment};
    use crate::features::bills::store::InMemoryBillStore;
    use std::sync::Mutex;

    fn bill(id: &str, date: &str, receipt: Option<(&str, &str)>) -> Bill {
        Bill {
            id: id.to_string(),
            email: "a@a".to_string(),
            expense_type: ExpenseType::Transports,
            name: "test".to_string(),
            date: date.to_string(),
            amount: 100,
            vat_amount: None,
            vat_percentage: Some(20),
            status: BillStatus::Pending,
            commentary: None,
            admin_commentary: None,
            receipt_url: receipt.map(|(url, _)| url.to_string()),
            receipt_file_name: receipt.map(|(_, name)| name.to_string()),
        }
    }

    fn recording_navigator() -> (Arc<dyn Navigator>, Arc<Mutex<Vec<Route>>>) {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let sink = visited.clone();
        let navigator: Arc<dyn Navigator> =
            Arc::new(move |route: Route| sink.lock().unwrap().push(route));
        (navigator, visited)
    }

    #[test]
    fn test_reduce_activated_requests_fetch() {
        let (model, effects) = reduce(ListModel::default(), ListEvent::Activated);
        assert_eq!(model.state, ListState::Loading);
        assert_eq!(effects, vec![ListEffect::FetchBills]);
    }

    #[test]
    fn test_reduce_fetch_failed_keeps_status_class() {
        let (model, _) = reduce(
            ListModel::default(),
            ListEvent::FetchFailed(AppError::from_status(404, "not found")),
        );
        assert_eq!(
            model.state,
            ListState::Failed(ListError {
                status_class: Some(StatusClass::Client),
                message: "404 error".to_string(),
            })
        );

        let (model, _) = reduce(
            ListModel::default(),
            ListEvent::FetchFailed(AppError::from_status(500, "boom")),
        );
        assert_eq!(
            model.state,
            ListState::Failed(ListError {
                status_class: Some(StatusClass::Server),
                message: "500 error".to_string(),
            })
        );
    }

    #[test]
    fn test_reduce_click_new_bill_has_no_state_change() {
        let before = ListModel {
            state: ListState::Loaded(Vec::new()),
            preview: None,
        };
        let (after, effects) = reduce(before.clone(), ListEvent::ClickNewBill);
        assert_eq!(after, before);
        assert_eq!(effects, vec![ListEffect::Navigate(Route::NewBill)]);
    }

    #[tokio::test]
    async fn test_load_renders_sorted_rows() {
        let store = Arc::new(InMemoryBillStore::with_bills(vec![
            bill("old", "2001-01-01", None),
            bill("new", "2004-04-04", None),
        ]));
        let (navigator, _) = recording_navigator();
        let mut page = BillsPage::new(store.clone(), navigator);

        let state = page.load().await;

        match state {
            ListState::Loaded(rows) => {
                let dates: Vec<&str> = rows.iter().map(|r| r.raw_date.as_str()).collect();
                assert_eq!(dates, vec!["2004-04-04", "2001-01-01"]);
                assert_eq!(rows[0].status_label, "En attente");
                assert_eq!(rows[0].status_treatment, StatusTreatment::Pending);
                assert_eq!(rows[0].type_label, "Transports");
            }
            other => panic!("一覧が表示されるべき: {other:?}"),
        }
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_load_failure_shows_error_not_empty_list() {
        let store = Arc::new(InMemoryBillStore::with_bills(vec![bill(
            "a",
            "2004-04-04",
            None,
        )]));
        store.fail_next(AppError::from_status(404, "Not Found"));
        let (navigator, _) = recording_navigator();
        let mut page = BillsPage::new(store.clone(), navigator);

        let state = page.load().await.clone();
        assert!(matches!(state, ListState::Failed(ref e) if e.message == "404 error"));

        // 再読み込みはユーザー操作でのみ行われる
        assert_eq!(store.list_calls(), 1);
        let state = page.load().await;
        assert!(matches!(state, ListState::Loaded(rows) if rows.len() == 1));
    }

    #[tokio::test]
    async fn test_load_failure_500() {
        let store = Arc::new(InMemoryBillStore::new());
        store.fail_next(AppError::from_status(500, "Internal Server Error"));
        let (navigator, _) = recording_navigator();
        let mut page = BillsPage::new(store, navigator);

        let state = page.load().await;
        match state {
            ListState::Failed(error) => {
                assert_eq!(error.message, "500 error");
                assert_eq!(error.status_class, Some(StatusClass::Server));
            }
            other => panic!("エラー状態になるべき: {other:?}"),
        }
    }

    #[test]
    fn test_click_new_bill_navigates_once() {
        let (navigator, visited) = recording_navigator();
        let mut page = BillsPage::new(Arc::new(InMemoryBillStore::new()), navigator);

        page.handle_click_new_bill();

        assert_eq!(*visited.lock().unwrap(), vec![Route::NewBill]);
    }

    #[test]
    fn test_click_icon_eye_opens_preview() {
        let (navigator, visited) = recording_navigator();
        let mut page = BillsPage::new(Arc::new(InMemoryBillStore::new()), navigator);
        let receipt = ReceiptRef {
            url: "https://example.com/facture.jpg".to_string(),
            file_name: "facture.jpg".to_string(),
        };

        let preview = page.handle_click_icon_eye(Some(&receipt)).clone();

        assert_eq!(
            preview,
            ReceiptPreview::Image {
                url: "https://example.com/facture.jpg".to_string(),
                file_name: "facture.jpg".to_string(),
            }
        );
        assert_eq!(page.preview(), Some(&preview));
        assert!(visited.lock().unwrap().is_empty());

        page.close_preview();
        assert!(page.preview().is_none());
    }

    #[test]
    fn test_click_icon_eye_without_receipt_shows_placeholder() {
        let (navigator, _) = recording_navigator();
        let mut page = BillsPage::new(Arc::new(InMemoryBillStore::new()), navigator);

        let preview = page.handle_click_icon_eye(None);

        assert_eq!(preview, &ReceiptPreview::Placeholder);
    }

    #[tokio::test]
    async fn test_preview_from_loaded_row() {
        let store = Arc::new(InMemoryBillStore::with_bills(vec![bill(
            "a",
            "2004-04-04",
            Some(("https://example.com/a.pdf", "a.pdf")),
        )]));
        let (navigator, _) = recording_navigator();
        let mut page = BillsPage::new(store, navigator);

        let receipt = match page.load().await {
            ListState::Loaded(rows) => rows[0].receipt.clone(),
            other => panic!("一覧が表示されるべき: {other:?}"),
        };

        let preview = page.handle_click_icon_eye(receipt.as_ref());
        assert!(matches!(preview, ReceiptPreview::Document { .. }));
    }
}
