use async_trait::async_trait;

use crate::domain::session::OAuth2Profile;
use crate::domain::user::Provider;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// OAuth2プロフィール取得ポート
///
/// プロバイダが発行したアクセストークンからプロフィールを取得し、
/// 正規化済みの (email, name) に変換する。プロバイダ固有の
/// レスポンス形状はアダプタに閉じ込める。
#[async_trait]
pub trait ProfileClient: Send + Sync {
    /// プロバイダのユーザー情報エンドポイントからプロフィールを取得する
    async fn fetch_profile(&self, provider: Provider, access_token: &str) -> Result<OAuth2Profile>;
}
