use serde::{Deserialize, Serialize};

use super::PolicyError;

/// 貸出ポリシー - システム全体で1件の設定
///
/// 不変条件：`max_books` と `loan_period_days` は常に1以上。
/// 管理者の更新操作でのみ変更される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPolicy {
    /// 利用者1人あたりの同時貸出上限冊数
    pub max_books: i32,
    /// 貸出期間（日数）
    pub loan_period_days: i32,
}

impl LoanPolicy {
    /// 検証付きで作成する
    pub fn validated(max_books: i32, loan_period_days: i32) -> Result<Self, PolicyError> {
        validate_max_books(max_books)?;
        validate_loan_period(loan_period_days)?;
        Ok(Self {
            max_books,
            loan_period_days,
        })
    }

    /// 上限冊数を更新する
    pub fn update_max_books(&mut self, max_books: i32) -> Result<(), PolicyError> {
        validate_max_books(max_books)?;
        self.max_books = max_books;
        Ok(())
    }

    /// 貸出期間を更新する
    pub fn update_loan_period(&mut self, loan_period_days: i32) -> Result<(), PolicyError> {
        validate_loan_period(loan_period_days)?;
        self.loan_period_days = loan_period_days;
        Ok(())
    }
}

fn validate_max_books(max_books: i32) -> Result<(), PolicyError> {
    if max_books < 1 {
        return Err(PolicyError::InvalidMaxBooks);
    }
    Ok(())
}

fn validate_loan_period(loan_period_days: i32) -> Result<(), PolicyError> {
    if loan_period_days < 1 {
        return Err(PolicyError::InvalidLoanPeriod);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_accepts_positive_values() {
        let policy = LoanPolicy::validated(5, 14).unwrap();
        assert_eq!(policy.max_books, 5);
        assert_eq!(policy.loan_period_days, 14);
    }

    #[test]
    fn test_validated_rejects_non_positive_values() {
        assert_eq!(
            LoanPolicy::validated(0, 14).unwrap_err(),
            PolicyError::InvalidMaxBooks
        );
        assert_eq!(
            LoanPolicy::validated(5, 0).unwrap_err(),
            PolicyError::InvalidLoanPeriod
        );
    }

    #[test]
    fn test_update_keeps_invariant() {
        let mut policy = LoanPolicy::validated(5, 14).unwrap();

        assert_eq!(
            policy.update_max_books(-1).unwrap_err(),
            PolicyError::InvalidMaxBooks
        );
        // 失敗した更新は状態を変えない
        assert_eq!(policy.max_books, 5);

        policy.update_loan_period(7).unwrap();
        assert_eq!(policy.loan_period_days, 7);
    }
}
