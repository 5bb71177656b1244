use std::sync::Arc;

use smart_library::{
    adapters::http::{DialogflowClient, HttpProfileClient, NaverBooksClient},
    adapters::postgres::{
        BookHistoryRepository, BookInformationRepository, BookItemRepository,
        ChatbotFeedbackRepository, FavoriteRepository, LoanPolicyRepository, NoticeRepository,
        NotificationRepository, QnaRepository, QrCodeRepository, ShelfRepository, UserRepository,
    },
    adapters::redis::{RedisSnapshotStore, RedisTokenStore},
    api::{handlers::AppState, router::create_router},
    application::auth::{AuthService, JwtSigner},
    application::catalog::CatalogService,
    application::chatbot::ChatbotService,
    application::checkout::CheckoutService,
    application::favorites::FavoriteService,
    application::iot::DeviceHub,
    application::notices::NoticeService,
    application::notifications::NotificationService,
    application::policy::PolicyService,
    application::qna::QnaService,
    application::ranking::RankingService,
    config::AppConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smart_library=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Redis connection for refresh tokens and shelf snapshots
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Invalid Redis URL");
    let redis_conn = redis::aio::ConnectionManager::new(redis_client)
        .await
        .expect("Failed to connect to Redis");

    let http_client = reqwest::Client::new();

    // Repositories
    let users = UserRepository::new(pool.clone());
    let infos = BookInformationRepository::new(pool.clone());
    let items = BookItemRepository::new(pool.clone());
    let histories = BookHistoryRepository::new(pool.clone());
    let policies = LoanPolicyRepository::new(pool.clone());
    let favorites = FavoriteRepository::new(pool.clone());
    let notifications = NotificationRepository::new(pool.clone());
    let notices = NoticeRepository::new(pool.clone());
    let qnas = QnaRepository::new(pool.clone());
    let shelves = ShelfRepository::new(pool.clone());
    let qr_codes = QrCodeRepository::new(pool.clone());
    let feedbacks = ChatbotFeedbackRepository::new(pool.clone());

    // External adapters
    let token_store = Arc::new(RedisTokenStore::new(redis_conn.clone()));
    let snapshot_store = Arc::new(RedisSnapshotStore::new(redis_conn));
    let metadata_client = Arc::new(NaverBooksClient::new(
        http_client.clone(),
        config.naver_client_id.clone(),
        config.naver_client_secret.clone(),
    ));
    let profile_client = Arc::new(HttpProfileClient::new(http_client.clone()));
    let chatbot_client = Arc::new(DialogflowClient::new(
        http_client,
        config.dialogflow_project_id.clone(),
        config.dialogflow_access_token.clone(),
    ));

    // Services
    let notification_service = NotificationService::new(notifications.clone(), users.clone());
    let state = Arc::new(AppState {
        auth: AuthService::new(
            users.clone(),
            JwtSigner::new(&config.jwt),
            token_store,
            profile_client,
        ),
        checkout: CheckoutService::new(
            pool.clone(),
            items.clone(),
            histories.clone(),
            users.clone(),
            policies.clone(),
            favorites.clone(),
            notifications,
        ),
        catalog: CatalogService::new(
            infos,
            items.clone(),
            qr_codes,
            shelves,
            metadata_client,
            config.qr_base_url.clone(),
        ),
        favorites: FavoriteService::new(favorites, items),
        notifications: notification_service.clone(),
        notices: NoticeService::new(notices),
        qna: QnaService::new(qnas, notification_service),
        policy: PolicyService::new(policies),
        ranking: RankingService::new(histories),
        chatbot: ChatbotService::new(
            chatbot_client,
            feedbacks,
            config.chat_language.clone(),
            config.chat_confidence_threshold,
        ),
        snapshots: snapshot_store,
        hub: DeviceHub::new(),
        cookie_secure: config.cookie_secure,
    });

    // Create router
    let app = create_router(state);

    // Server configuration
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
