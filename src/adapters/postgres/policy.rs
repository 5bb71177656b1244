use sqlx::PgPool;

use crate::domain::policy::LoanPolicy;

/// 貸出ポリシーのID（常に1行のみ）
const DEFAULT_POLICY_ID: i32 = 1;

/// 貸出ポリシーリポジトリ
#[derive(Clone)]
pub struct LoanPolicyRepository {
    pool: PgPool,
}

impl LoanPolicyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self) -> sqlx::Result<Option<LoanPolicy>> {
        let row: Option<(i32, i32)> = sqlx::query_as(
            "SELECT max_books, loan_period_days FROM loan_policy WHERE id = $1",
        )
        .bind(DEFAULT_POLICY_ID)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(max_books, loan_period_days)| LoanPolicy {
            max_books,
            loan_period_days,
        }))
    }

    pub async fn update(&self, policy: &LoanPolicy) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE loan_policy SET max_books = $2, loan_period_days = $3 WHERE id = $1",
        )
        .bind(DEFAULT_POLICY_ID)
        .bind(policy.max_books)
        .bind(policy.loan_period_days)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
