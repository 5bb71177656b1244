use chrono::{DateTime, Duration, Utc};

use super::{
    BookItemId, BorrowError, HistoryId, ReturnError, UserId, book::BookItem, policy::LoanPolicy,
};

/// 貸出履歴 - 1回の貸出・返却イベント
///
/// `returned_at` が None の間は「オープンな貸出」。
/// 不変条件：1冊の蔵書に対しオープンな履歴は高々1件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookHistory {
    pub id: HistoryId,
    pub book_item_id: BookItemId,
    pub user_id: UserId,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub overdue: bool,
}

impl BookHistory {
    /// オープンな貸出（未返却）かどうか
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// 貸出の作成データ（ID採番前）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub book_item_id: BookItemId,
    pub user_id: UserId,
    pub borrowed_at: DateTime<Utc>,
}

/// 返却処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedLoan {
    pub history_id: HistoryId,
    pub book_item_id: BookItemId,
    pub user_id: UserId,
    pub returned_at: DateTime<Utc>,
    pub overdue: bool,
}

/// 純粋関数：蔵書を貸し出す
///
/// ビジネスルール：
/// - 蔵書がAVAILABLEであること（ソフトデリート済みは照会段階で除外される）
/// - 利用者のオープンな貸出数が `max_books` 未満であること
///
/// 副作用なし。作成すべき貸出データを返す。
pub fn borrow_item(
    item: &BookItem,
    user_id: UserId,
    open_loan_count: i64,
    policy: &LoanPolicy,
    now: DateTime<Utc>,
) -> Result<NewLoan, BorrowError> {
    if !item.is_available() {
        return Err(BorrowError::AlreadyBorrowed);
    }

    if open_loan_count >= i64::from(policy.max_books) {
        return Err(BorrowError::LimitExceeded);
    }

    Ok(NewLoan {
        book_item_id: item.id,
        user_id,
        borrowed_at: now,
    })
}

/// 純粋関数：貸出を返却する
///
/// ビジネスルール：
/// - 返却済みの履歴は再返却不可
/// - 延滞判定は返却時に確定する
///
/// 蔵書側のソフトデリートには依存しない。返却は履歴と
/// 蔵書ステータスのみに作用する。
pub fn close_loan(
    history: &BookHistory,
    policy: &LoanPolicy,
    returned_at: DateTime<Utc>,
) -> Result<ClosedLoan, ReturnError> {
    if history.returned_at.is_some() {
        return Err(ReturnError::AlreadyReturned);
    }

    let overdue = is_overdue(history.borrowed_at, returned_at, policy.loan_period_days);

    Ok(ClosedLoan {
        history_id: history.id,
        book_item_id: history.book_item_id,
        user_id: history.user_id,
        returned_at,
        overdue,
    })
}

/// 純粋関数：延滞判定
///
/// 経過日数（暦日差）が貸出期間を超えた場合のみ延滞。
/// ちょうど貸出期間と等しい場合は延滞ではない。
pub fn is_overdue(
    borrowed_at: DateTime<Utc>,
    returned_at: DateTime<Utc>,
    loan_period_days: i32,
) -> bool {
    let elapsed = returned_at.date_naive() - borrowed_at.date_naive();
    elapsed.num_days() > i64::from(loan_period_days)
}

/// 純粋関数：オープンな貸出が期限超過かどうか
///
/// 延滞スイープで使用される。判定基準は `is_overdue` と同一。
pub fn is_past_due(history: &BookHistory, policy: &LoanPolicy, now: DateTime<Utc>) -> bool {
    history.is_open() && is_overdue(history.borrowed_at, now, policy.loan_period_days)
}

/// 返却期限（貸出日 + 貸出期間）
pub fn due_date(borrowed_at: DateTime<Utc>, policy: &LoanPolicy) -> DateTime<Utc> {
    borrowed_at + Duration::days(i64::from(policy.loan_period_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::BookStatus;
    use crate::domain::{BookInfoId, BookItemId};

    fn policy() -> LoanPolicy {
        LoanPolicy::validated(5, 14).unwrap()
    }

    fn available_item(id: i32) -> BookItem {
        BookItem {
            id: BookItemId::from_raw(id),
            book_information_id: BookInfoId::from_raw(1),
            purchase_at: Utc::now(),
            status: BookStatus::Available,
            updated_at: Utc::now(),
            deleted: false,
        }
    }

    fn open_history(borrowed_at: DateTime<Utc>) -> BookHistory {
        BookHistory {
            id: HistoryId::from_raw(10),
            book_item_id: BookItemId::from_raw(1),
            user_id: UserId::from_raw(1),
            borrowed_at,
            returned_at: None,
            overdue: false,
        }
    }

    // TDD: borrow_item() のテスト
    #[test]
    fn test_borrow_item_success() {
        let item = available_item(1);
        let user_id = UserId::from_raw(7);
        let now = Utc::now();

        let loan = borrow_item(&item, user_id, 0, &policy(), now).unwrap();

        assert_eq!(loan.book_item_id, item.id);
        assert_eq!(loan.user_id, user_id);
        assert_eq!(loan.borrowed_at, now);
    }

    #[test]
    fn test_borrow_item_fails_when_already_borrowed() {
        let mut item = available_item(1);
        item.status = BookStatus::Borrowed;

        let result = borrow_item(&item, UserId::from_raw(7), 0, &policy(), Utc::now());
        assert_eq!(result.unwrap_err(), BorrowError::AlreadyBorrowed);
    }

    #[test]
    fn test_borrow_item_fails_for_deleted_item() {
        let mut item = available_item(1);
        item.deleted = true;

        let result = borrow_item(&item, UserId::from_raw(7), 0, &policy(), Utc::now());
        assert_eq!(result.unwrap_err(), BorrowError::AlreadyBorrowed);
    }

    #[test]
    fn test_borrow_item_limit_boundary() {
        let item = available_item(1);
        let user_id = UserId::from_raw(7);

        // max_books - 1 冊までは成功
        assert!(borrow_item(&item, user_id, 4, &policy(), Utc::now()).is_ok());

        // max_books 冊に達したら失敗
        let result = borrow_item(&item, user_id, 5, &policy(), Utc::now());
        assert_eq!(result.unwrap_err(), BorrowError::LimitExceeded);
    }

    // TDD: close_loan() のテスト
    #[test]
    fn test_close_loan_success_not_overdue() {
        let borrowed_at = Utc::now();
        let history = open_history(borrowed_at);
        let returned_at = borrowed_at + Duration::days(10);

        let closed = close_loan(&history, &policy(), returned_at).unwrap();

        assert_eq!(closed.history_id, history.id);
        assert_eq!(closed.returned_at, returned_at);
        assert!(!closed.overdue);
    }

    #[test]
    fn test_close_loan_detects_overdue() {
        let borrowed_at = Utc::now();
        let history = open_history(borrowed_at);
        let returned_at = borrowed_at + Duration::days(20);

        let closed = close_loan(&history, &policy(), returned_at).unwrap();
        assert!(closed.overdue);
    }

    #[test]
    fn test_close_loan_fails_when_already_returned() {
        let borrowed_at = Utc::now();
        let mut history = open_history(borrowed_at);
        history.returned_at = Some(borrowed_at + Duration::days(3));

        let result = close_loan(&history, &policy(), borrowed_at + Duration::days(4));
        assert_eq!(result.unwrap_err(), ReturnError::AlreadyReturned);
    }

    // TDD: is_overdue() の境界値テスト
    #[test]
    fn test_is_overdue_boundary_exactly_loan_period() {
        let borrowed_at = Utc::now();

        // ちょうど14日後は延滞ではない
        assert!(!is_overdue(borrowed_at, borrowed_at + Duration::days(14), 14));

        // 15日後は延滞
        assert!(is_overdue(borrowed_at, borrowed_at + Duration::days(15), 14));
    }

    #[test]
    fn test_is_overdue_uses_calendar_days() {
        // 時刻には依存せず暦日差のみで判定する
        let borrowed_at = "2026-01-01T23:50:00Z".parse::<DateTime<Utc>>().unwrap();
        let returned_at = "2026-01-15T00:10:00Z".parse::<DateTime<Utc>>().unwrap();

        // 暦日差は14日ちょうど
        assert!(!is_overdue(borrowed_at, returned_at, 14));

        let returned_next = "2026-01-16T00:10:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(is_overdue(borrowed_at, returned_next, 14));
    }

    #[test]
    fn test_is_past_due_only_for_open_loans() {
        let borrowed_at = Utc::now() - Duration::days(30);
        let mut history = open_history(borrowed_at);

        assert!(is_past_due(&history, &policy(), Utc::now()));

        history.returned_at = Some(Utc::now());
        assert!(!is_past_due(&history, &policy(), Utc::now()));
    }

    #[test]
    fn test_due_date() {
        let borrowed_at = Utc::now();
        assert_eq!(
            due_date(borrowed_at, &policy()),
            borrowed_at + Duration::days(14)
        );
    }
}
