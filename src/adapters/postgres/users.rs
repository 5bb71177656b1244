use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};

use crate::domain::UserId;
use crate::domain::user::{NewUser, Provider, Role, User};

const USER_COLUMNS: &str = "id, email, password_hash, user_name, company_id, role, provider, \
                            created_at, updated_at, deleted";

/// PostgreSQLの行データをUserに変換する
///
/// role / provider の文字列はドメインの列挙型にパースし、
/// 不正値はデコードエラーとして扱う。
fn map_row_to_user(row: &PgRow) -> sqlx::Result<User> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<Role>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;

    let provider: String = row.try_get("provider")?;
    let provider = provider
        .parse::<Provider>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;

    Ok(User {
        id: UserId::from_raw(row.try_get("id")?),
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        user_name: row.try_get("user_name")?,
        company_id: row.try_get("company_id")?,
        role,
        provider,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted: row.try_get("deleted")?,
    })
}

/// 利用者リポジトリ
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// メールアドレスで取得する（ソフトデリート済みを含む）
    ///
    /// ログイン判定はドメイン層が行うため、削除フラグ込みで返す。
    pub async fn find_by_email(&self, email: &str) -> sqlx::Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_user).transpose()
    }

    /// ソフトデリート済みを除いてメールアドレスで取得する
    pub async fn find_active_by_email(&self, email: &str) -> sqlx::Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted = FALSE"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_user).transpose()
    }

    /// (email, provider) の複合キーで取得する
    pub async fn find_by_email_and_provider(
        &self,
        email: &str,
        provider: Provider,
    ) -> sqlx::Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND provider = $2"
        ))
        .bind(email)
        .bind(provider.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_user).transpose()
    }

    pub async fn exists_by_email(&self, email: &str) -> sqlx::Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn exists_by_company_id(&self, company_id: &str) -> sqlx::Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE company_id = $1)")
            .bind(company_id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn insert(&self, user: &NewUser) -> sqlx::Result<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (email, password_hash, user_name, company_id, role, provider)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.user_name)
        .bind(&user.company_id)
        .bind(user.role.as_str())
        .bind(user.provider.as_str())
        .fetch_one(&self.pool)
        .await?;

        map_row_to_user(&row)
    }

    /// 管理者の利用者ID一覧
    ///
    /// 管理者向け通知のファンアウトに使用される。
    pub async fn find_admin_ids(&self) -> sqlx::Result<Vec<UserId>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT id FROM users WHERE role = 'ADMIN' AND deleted = FALSE ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(UserId::from_raw).collect())
    }

    /// トランザクション内での利用者取得
    pub async fn find_active_by_id_in(
        &self,
        conn: &mut PgConnection,
        id: UserId,
    ) -> sqlx::Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted = FALSE"
        ))
        .bind(id.value())
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(map_row_to_user).transpose()
    }
}
