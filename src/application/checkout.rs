use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::adapters::postgres::{
    AdminBorrowSummary, BookHistoryRepository, BookItemRepository, BorrowSummary,
    FavoriteRepository, LoanPolicyRepository, NotificationRepository, UserRepository,
};
use crate::application::errors::{BusinessError, Result};
use crate::domain::checkout::{self, BookHistory};
use crate::domain::notification::NotificationKind;
use crate::domain::policy::LoanPolicy;
use crate::domain::{BookItemId, HistoryId, UserId};

/// 貸出成功の結果
#[derive(Debug, Clone)]
pub struct BorrowReceipt {
    pub history: BookHistory,
    pub due_date: DateTime<Utc>,
}

/// 返却成功の結果
#[derive(Debug, Clone)]
pub struct ReturnReceipt {
    pub history_id: HistoryId,
    pub book_item_id: BookItemId,
    pub returned_at: DateTime<Utc>,
    pub overdue: bool,
}

/// 貸出・返却サービス
///
/// 1冊1借り手の不変条件を守る場所。貸出の読み取り・検査・書き込みは
/// 単一のデータベーストランザクションで実行し、蔵書行は `FOR UPDATE`
/// でロックする。プロセス内ロックは使わない（トランザクション境界が
/// 唯一の同時実行制御）。
pub struct CheckoutService {
    pool: PgPool,
    items: BookItemRepository,
    histories: BookHistoryRepository,
    users: UserRepository,
    policies: LoanPolicyRepository,
    favorites: FavoriteRepository,
    notifications: NotificationRepository,
}

impl CheckoutService {
    pub fn new(
        pool: PgPool,
        items: BookItemRepository,
        histories: BookHistoryRepository,
        users: UserRepository,
        policies: LoanPolicyRepository,
        favorites: FavoriteRepository,
        notifications: NotificationRepository,
    ) -> Self {
        Self {
            pool,
            items,
            histories,
            users,
            policies,
            favorites,
            notifications,
        }
    }

    async fn load_policy(&self) -> Result<LoanPolicy> {
        self.policies
            .find()
            .await?
            .ok_or(BusinessError::LoanPolicyNotFound)
    }

    /// 蔵書を貸し出す
    ///
    /// 同一蔵書への同時リクエストは行ロックで直列化され、
    /// 敗者はBORROWEDを観測して BookAlreadyBorrowed で失敗する。
    pub async fn borrow(&self, user_id: UserId, book_item_id: BookItemId) -> Result<BorrowReceipt> {
        let policy = self.load_policy().await?;

        let mut tx = self.pool.begin().await?;

        let user = self
            .users
            .find_active_by_id_in(&mut *tx, user_id)
            .await?
            .ok_or(BusinessError::UserNotFound)?;

        // ソフトデリート済みはここで弾かれ NotFound になる
        let item = self
            .items
            .find_for_update(&mut *tx, book_item_id)
            .await?
            .ok_or(BusinessError::BookItemNotFound)?;

        let open_count = self
            .histories
            .count_open_by_user(&mut *tx, user_id)
            .await?;

        let loan = checkout::borrow_item(&item, user.id, open_count, &policy, Utc::now())?;

        let updated = self.items.mark_borrowed(&mut *tx, item.id).await?;
        if updated == 0 {
            return Err(BusinessError::BookAlreadyBorrowed);
        }

        let history = self.histories.insert_open(&mut *tx, &loan).await?;

        tx.commit().await?;

        tracing::info!(
            user_id = user_id.value(),
            book_item_id = book_item_id.value(),
            history_id = history.id.value(),
            "book borrowed"
        );

        let due_date = checkout::due_date(history.borrowed_at, &policy);
        Ok(BorrowReceipt { history, due_date })
    }

    /// 履歴IDで返却する
    ///
    /// 返却済み・存在しない履歴はいずれも NotFound。
    pub async fn return_by_history(&self, history_id: HistoryId) -> Result<ReturnReceipt> {
        let policy = self.load_policy().await?;

        let mut tx = self.pool.begin().await?;

        let history = self
            .histories
            .find_open_for_update(&mut *tx, history_id)
            .await?
            .ok_or(BusinessError::HistoryNotFound)?;

        let receipt = self.finish_return(&mut tx, history, &policy).await?;
        tx.commit().await?;

        self.notify_favorite_holders(receipt.book_item_id).await;
        Ok(receipt)
    }

    /// 蔵書IDで返却する（IoTの返却メッセージ経由）
    pub async fn return_by_item(&self, book_item_id: BookItemId) -> Result<ReturnReceipt> {
        let policy = self.load_policy().await?;

        let mut tx = self.pool.begin().await?;

        let history = self
            .histories
            .find_open_by_item_for_update(&mut *tx, book_item_id)
            .await?
            .ok_or(BusinessError::HistoryNotFound)?;

        let receipt = self.finish_return(&mut tx, history, &policy).await?;
        tx.commit().await?;

        self.notify_favorite_holders(receipt.book_item_id).await;
        Ok(receipt)
    }

    async fn finish_return(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        history: BookHistory,
        policy: &LoanPolicy,
    ) -> Result<ReturnReceipt> {
        let closed = checkout::close_loan(&history, policy, Utc::now())?;

        let updated = self.histories.close(&mut *tx, &closed).await?;
        if updated == 0 {
            return Err(BusinessError::HistoryNotFound);
        }

        // 蔵書がソフトデリート済みでも返却は成立させる
        self.items
            .mark_available(&mut *tx, closed.book_item_id)
            .await?;

        tracing::info!(
            history_id = closed.history_id.value(),
            book_item_id = closed.book_item_id.value(),
            overdue = closed.overdue,
            "book returned"
        );

        Ok(ReturnReceipt {
            history_id: closed.history_id,
            book_item_id: closed.book_item_id,
            returned_at: closed.returned_at,
            overdue: closed.overdue,
        })
    }

    /// お気に入り登録者への「返却されました」通知
    ///
    /// 返却自体は成立しているため、通知の失敗はログに残すだけで
    /// 呼び出し元には伝播させない。
    async fn notify_favorite_holders(&self, book_item_id: BookItemId) {
        let result: Result<()> = async {
            let holders = self.favorites.user_ids_by_item(book_item_id).await?;
            if holders.is_empty() {
                return Ok(());
            }

            let summary = self
                .items
                .find_summary(book_item_id)
                .await?
                .ok_or(BusinessError::BookItemNotFound)?;

            let content = format!("『{}』が返却され、貸出可能になりました", summary.title);
            for user_id in holders {
                self.notifications
                    .insert(
                        user_id,
                        NotificationKind::FavoriteBookAvailable,
                        &content,
                        Some(book_item_id.value()),
                    )
                    .await?;
            }
            Ok(())
        }
        .await;

        if let Err(e) = result {
            tracing::warn!(
                book_item_id = book_item_id.value(),
                error = %e,
                "favorite notification fan-out failed"
            );
        }
    }

    /// 延滞スイープ
    ///
    /// 貸出期間を超えたオープンな貸出に延滞フラグを立て、
    /// 借り手へ通知する。管理者操作から同期的に呼ばれる。
    pub async fn sweep_overdue(&self) -> Result<u64> {
        let policy = self.load_policy().await?;
        let cutoff = Utc::now() - Duration::days(i64::from(policy.loan_period_days));

        let candidates = self.histories.find_open_borrowed_before(cutoff).await?;
        let mut marked = 0u64;

        for history in candidates {
            // 暦日基準の判定で境界日を除外する
            if !checkout::is_past_due(&history, &policy, Utc::now()) {
                continue;
            }

            if self.histories.mark_overdue(history.id).await? == 0 {
                continue;
            }
            marked += 1;

            let content = format!(
                "貸出中の資料が返却期限を超過しています（貸出日: {}）",
                history.borrowed_at.date_naive()
            );
            self.notifications
                .insert(
                    history.user_id,
                    NotificationKind::Overdue,
                    &content,
                    Some(history.book_item_id.value()),
                )
                .await?;
        }

        tracing::info!(marked, "overdue sweep finished");
        Ok(marked)
    }

    /// 返却期限前日のリマインド
    ///
    /// 明日が返却期限になるオープンな貸出の借り手へ通知する。
    /// 延滞スイープと同じく管理者操作から同期的に呼ばれる。
    pub async fn remind_return_deadlines(&self) -> Result<u64> {
        let policy = self.load_policy().await?;

        // 期限前日 = (貸出期間 - 1)日前に借りたもの
        let borrowed_on = (Utc::now()
            - Duration::days(i64::from(policy.loan_period_days) - 1))
        .date_naive();

        let due_tomorrow = self.histories.find_open_borrowed_on(borrowed_on).await?;
        let mut reminded = 0u64;

        for history in &due_tomorrow {
            let content = format!(
                "貸出中の資料の返却期限は明日です（貸出日: {}）",
                history.borrowed_at.date_naive()
            );
            self.notifications
                .insert(
                    history.user_id,
                    NotificationKind::ReturnDeadline,
                    &content,
                    Some(history.book_item_id.value()),
                )
                .await?;
            reminded += 1;
        }

        tracing::info!(reminded, "return deadline reminders sent");
        Ok(reminded)
    }

    /// 利用者の現在貸出中一覧
    pub async fn current_borrows(
        &self,
        user_id: UserId,
        overdue_only: bool,
    ) -> Result<Vec<BorrowSummary>> {
        Ok(self
            .histories
            .list_current_by_user(user_id, overdue_only)
            .await?)
    }

    /// 利用者の貸出履歴（ページング）
    #[allow(clippy::too_many_arguments)]
    pub async fn user_history(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        overdue: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<BorrowSummary>, i64)> {
        Ok(self
            .histories
            .page_for_user(user_id, from, to, overdue, limit, offset)
            .await?)
    }

    /// 管理者向けの全体履歴（ページング）
    #[allow(clippy::too_many_arguments)]
    pub async fn admin_history(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        user_name: Option<&str>,
        company_id: Option<&str>,
        overdue: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AdminBorrowSummary>, i64)> {
        Ok(self
            .histories
            .page_for_admin(from, to, user_name, company_id, overdue, limit, offset)
            .await?)
    }
}
