// 新規請求書フォームのコントローラー
//
// Editing → Submitting → Submitted の状態遷移を純粋関数`reduce`で表す。
// 作成の失敗時は入力を保持したままEditingに戻る

use crate::features::bills::models::{Bill, NewBill, ReceiptFile};
use crate::features::bills::receipts::validate_receipt;
use crate::features::bills::store::BillStore;
use crate::features::navigation::{Navigator, Route};
use crate::features::new_bill::draft::{Draft, DraftField};
use crate::features::session::SessionContext;
use crate::shared::errors::AppError;
use std::sync::Arc;

/// フォームの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Editing,
    /// 作成リクエストの完了待ち
    Submitting,
    /// 作成完了（終端）
    Submitted,
}

/// フォームのモデル
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewBillForm {
    pub state: FormState,
    pub draft: Draft,
    /// 直近に表示したエラーメッセージ
    pub last_error: Option<String>,
}

/// フォームへのイベント
#[derive(Debug)]
pub enum FormEvent {
    FieldChanged(DraftField, String),
    FileSelected(ReceiptFile),
    Submit,
    CreateSucceeded(Bill),
    CreateFailed(AppError),
}

/// 表示層に渡す効果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEffect {
    /// 警告ダイアログ
    Alert(String),
    /// ファイル入力欄をクリアする
    ClearFileInput,
    /// フォーム上にエラーを表示する
    ShowError(String),
}

/// 実行すべき副作用
#[derive(Debug, Clone, PartialEq)]
pub enum FormEffect {
    View(ViewEffect),
    CreateBill(NewBill),
    Navigate(Route),
}

/// フォームの状態遷移
///
/// Editing以外で受け取った入力・提出イベントは無視する（二重送信防止）
pub fn reduce(
    mut form: NewBillForm,
    event: FormEvent,
    session: &SessionContext,
) -> (NewBillForm, Vec<FormEffect>) {
    match (form.state, event) {
        (FormState::Editing, FormEvent::FieldChanged(field, value)) => {
            form.draft.set(field, value);
            (form, Vec::new())
        }
        (FormState::Editing, FormEvent::FileSelected(file)) => match validate_receipt(&file) {
            Ok(()) => {
                form.draft.receipt = Some(file);
                (form, Vec::new())
            }
            Err(error) => {
                form.draft.receipt = None;
                (
                    form,
                    vec![
                        FormEffect::View(ViewEffect::Alert(error.user_message())),
                        FormEffect::View(ViewEffect::ClearFileInput),
                    ],
                )
            }
        },
        (FormState::Editing, FormEvent::Submit) => match form.draft.to_new_bill(session) {
            Ok(payload) => {
                form.state = FormState::Submitting;
                form.last_error = None;
                (form, vec![FormEffect::CreateBill(payload)])
            }
            Err(error) => {
                let message = error.user_message();
                form.last_error = Some(message.clone());
                (form, vec![FormEffect::View(ViewEffect::ShowError(message))])
            }
        },
        (FormState::Submitting, FormEvent::CreateSucceeded(_)) => (
            NewBillForm {
                state: FormState::Submitted,
                draft: Draft::default(),
                last_error: None,
            },
            vec![FormEffect::Navigate(Route::Bills)],
        ),
        (FormState::Submitting, FormEvent::CreateFailed(error)) => {
            let message = error.user_message();
            form.state = FormState::Editing;
            form.last_error = Some(message.clone());
            (form, vec![FormEffect::View(ViewEffect::ShowError(message))])
        }
        (state, event) => {
            log::debug!("状態{state:?}では無視されるイベント: {event:?}");
            (form, Vec::new())
        }
    }
}

/// 新規請求書画面
pub struct NewBillPage {
    store: Arc<dyn BillStore>,
    navigator: Arc<dyn Navigator>,
    session: SessionContext,
    form: NewBillForm,
}

impl NewBillPage {
    pub fn new(
        store: Arc<dyn BillStore>,
        navigator: Arc<dyn Navigator>,
        session: SessionContext,
    ) -> Self {
        Self {
            store,
            navigator,
            session,
            form: NewBillForm::default(),
        }
    }

    pub fn form(&self) -> &NewBillForm {
        &self.form
    }

    pub fn state(&self) -> FormState {
        self.form.state
    }

    pub fn draft(&self) -> &Draft {
        &self.form.draft
    }

    /// 入力項目の変更
    pub fn handle_change_field<S: Into<String>>(
        &mut self,
        field: DraftField,
        value: S,
    ) -> Vec<ViewEffect> {
        self.dispatch(FormEvent::FieldChanged(field, value.into())).0
    }

    /// ファイル選択（受付判定のみ行い、アップロードは提出時）
    pub fn handle_change_file(&mut self, file: ReceiptFile) -> Vec<ViewEffect> {
        self.dispatch(FormEvent::FileSelected(file)).0
    }

    /// フォームの提出
    ///
    /// 作成に成功すると一覧画面へ遷移する。失敗はここで捕捉し、表示用の効果として返す
    pub async fn handle_submit(&mut self) -> Vec<ViewEffect> {
        let (mut view_effects, mut create) = self.dispatch(FormEvent::Submit);

        while let Some(payload) = create.take() {
            let event = self.create(payload).await;
            let (more, next) = self.dispatch(event);
            view_effects.extend(more);
            create = next;
        }

        view_effects
    }

    /// イベントを適用し、画面遷移を実行する
    ///
    /// 表示用の効果と、実行待ちの作成ペイロードを返す
    fn dispatch(&mut self, event: FormEvent) -> (Vec<ViewEffect>, Option<NewBill>) {
        let form = std::mem::take(&mut self.form);
        let (form, effects) = reduce(form, event, &self.session);
        self.form = form;

        let mut view_effects = Vec::new();
        let mut create = None;
        for effect in effects {
            match effect {
                FormEffect::View(view) => view_effects.push(view),
                FormEffect::Navigate(route) => {
                    log::debug!("画面遷移: route={route}");
                    self.navigator.navigate(route);
                }
                FormEffect::CreateBill(payload) => create = Some(payload),
            }
        }
        (view_effects, create)
    }

    async fn create(&self, payload: NewBill) -> FormEvent {
        log::info!(
            "請求書を提出します: email={}, has_receipt={}",
            payload.email,
            payload.receipt.is_some()
        );

        match self.store.create(payload).await {
            Ok(bill) => {
                log::info!("請求書の提出に成功: bill_id={}", bill.id);
                FormEvent::CreateSucceeded(bill)
            }
            Err(error) => {
                log::log!(
                    error.severity().log_level(),
                    "請求書の提出に失敗: {}",
                    error.details()
                );
                FormEvent::CreateFailed(error)
            }
        }
    }
}
