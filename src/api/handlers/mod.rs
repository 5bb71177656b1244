use std::sync::Arc;

use crate::application::auth::AuthService;
use crate::application::catalog::CatalogService;
use crate::application::chatbot::ChatbotService;
use crate::application::checkout::CheckoutService;
use crate::application::favorites::FavoriteService;
use crate::application::iot::DeviceHub;
use crate::application::notices::NoticeService;
use crate::application::notifications::NotificationService;
use crate::application::policy::PolicyService;
use crate::application::qna::QnaService;
use crate::application::ranking::RankingService;
use crate::ports::SnapshotStore;

pub mod auth;
pub mod books;
pub mod chatbot;
pub mod checkout;
pub mod favorites;
pub mod iot;
pub mod notices;
pub mod notifications;
pub mod policy;
pub mod qna;
pub mod recommendations;
pub mod shelves;
pub mod users;

/// ハンドラー間で共有されるアプリケーション状態
pub struct AppState {
    pub auth: AuthService,
    pub checkout: CheckoutService,
    pub catalog: CatalogService,
    pub favorites: FavoriteService,
    pub notifications: NotificationService,
    pub notices: NoticeService,
    pub qna: QnaService,
    pub policy: PolicyService,
    pub ranking: RankingService,
    pub chatbot: ChatbotService,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub hub: DeviceHub,
    /// Cookieの Secure 属性（環境により切り替え）
    pub cookie_secure: bool,
}
