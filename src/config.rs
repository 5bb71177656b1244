use crate::application::auth::JwtConfig;

/// アプリケーション設定
///
/// 環境変数から読み込む。未設定の項目は開発用の既定値になる。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub jwt: JwtConfig,
    /// Cookieの Secure 属性（ローカル開発ではfalseにする）
    pub cookie_secure: bool,
    pub naver_client_id: String,
    pub naver_client_secret: String,
    pub dialogflow_project_id: String,
    pub dialogflow_access_token: String,
    pub chat_language: String,
    pub chat_confidence_threshold: f32,
    /// QRコードに埋め込むURLのベース
    pub qr_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env_or("DATABASE_URL", "postgres://localhost/smart_library"),
            redis_url: env_or("REDIS_URL", "redis://127.0.0.1:6379"),
            port: env_parse_or("PORT", 3000),
            jwt: JwtConfig {
                secret: env_or("JWT_SECRET", "dev-only-secret-change-in-production"),
                issuer: env_or("JWT_ISSUER", "smart-library"),
                // アクセス: 30分
                access_ttl_secs: env_parse_or("JWT_ACCESS_TTL_SECS", 30 * 60),
                // リフレッシュ: 14日
                refresh_ttl_secs: env_parse_or("JWT_REFRESH_TTL_SECS", 14 * 24 * 60 * 60),
                // 一時トークン: 5分
                temporary_ttl_secs: env_parse_or("JWT_TEMPORARY_TTL_SECS", 5 * 60),
            },
            cookie_secure: env_parse_or("COOKIE_SECURE", true),
            naver_client_id: env_or("NAVER_BOOKS_CLIENT_ID", ""),
            naver_client_secret: env_or("NAVER_BOOKS_CLIENT_SECRET", ""),
            dialogflow_project_id: env_or("DIALOGFLOW_PROJECT_ID", ""),
            dialogflow_access_token: env_or("DIALOGFLOW_ACCESS_TOKEN", ""),
            chat_language: env_or("CHATBOT_LANGUAGE", "ja"),
            chat_confidence_threshold: env_parse_or("CHATBOT_CONFIDENCE_THRESHOLD", 0.5),
            qr_base_url: env_or("QR_BASE_URL", "https://library.example.com/qr/books"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_or_falls_back_on_missing_key() {
        assert_eq!(env_parse_or("SMART_LIBRARY_NO_SUCH_KEY", 42u16), 42);
    }
}
