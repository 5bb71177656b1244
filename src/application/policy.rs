use crate::adapters::postgres::LoanPolicyRepository;
use crate::application::errors::{BusinessError, Result};
use crate::domain::policy::LoanPolicy;

/// 貸出ポリシーサービス
///
/// 1行だけの設定を読む・更新する。更新値の検証はドメイン側で行う。
pub struct PolicyService {
    policies: LoanPolicyRepository,
}

impl PolicyService {
    pub fn new(policies: LoanPolicyRepository) -> Self {
        Self { policies }
    }

    pub async fn current(&self) -> Result<LoanPolicy> {
        self.policies
            .find()
            .await?
            .ok_or(BusinessError::LoanPolicyNotFound)
    }

    pub async fn update_max_books(&self, max_books: i32) -> Result<LoanPolicy> {
        let mut policy = self.current().await?;
        policy.update_max_books(max_books)?;
        self.policies.update(&policy).await?;

        tracing::info!(max_books, "loan policy updated");
        Ok(policy)
    }

    pub async fn update_loan_period(&self, loan_period_days: i32) -> Result<LoanPolicy> {
        let mut policy = self.current().await?;
        policy.update_loan_period(loan_period_days)?;
        self.policies.update(&policy).await?;

        tracing::info!(loan_period_days, "loan policy updated");
        Ok(policy)
    }

    pub async fn update_policy(&self, max_books: i32, loan_period_days: i32) -> Result<LoanPolicy> {
        // 既存行の存在確認を兼ねて読む
        self.current().await?;

        let policy = LoanPolicy::validated(max_books, loan_period_days)?;
        self.policies.update(&policy).await?;

        tracing::info!(max_books, loan_period_days, "loan policy updated");
        Ok(policy)
    }
}
