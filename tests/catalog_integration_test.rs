use std::sync::Arc;

use sqlx::PgPool;

use smart_library::adapters::mock::MockBookMetadataClient;
use smart_library::adapters::postgres::{
    BookInformationRepository, BookItemRepository, QrCodeRepository, ShelfRepository,
};
use smart_library::application::BusinessError;
use smart_library::application::catalog::CatalogService;
use smart_library::ports::BookMetadata;

mod common;

// ============================================================================
// カタログの結合テスト（PostgreSQLが必要、cargo test -- --ignored で実行）
// ============================================================================

fn catalog_service(pool: &PgPool, metadata: Arc<MockBookMetadataClient>) -> CatalogService {
    CatalogService::new(
        BookInformationRepository::new(pool.clone()),
        BookItemRepository::new(pool.clone()),
        QrCodeRepository::new(pool.clone()),
        ShelfRepository::new(pool.clone()),
        metadata,
        "https://library.example.com/qr/books".to_string(),
    )
}

fn unique_isbn() -> String {
    let digits = common::unique_suffix().replace('-', "");
    format!("978{}", &digits[digits.len() - 10..])
}

fn metadata_for(isbn: &str) -> BookMetadata {
    BookMetadata {
        title: "Programming Rust".to_string(),
        author: "Blandy, Orendorff".to_string(),
        publisher: Some("O'Reilly".to_string()),
        isbn: isbn.to_string(),
        published_at: None,
        image: None,
        description: Some("Systems programming".to_string()),
    }
}

#[tokio::test]
async fn test_invalid_isbn_is_rejected_before_lookup() {
    // ISBN検証は外部API・DBに触れる前に行われる
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .unwrap();
    let service = catalog_service(&pool, Arc::new(MockBookMetadataClient::new()));

    let result = service.fetch_or_create_information("definitely-not-an-isbn").await;
    assert!(matches!(result.unwrap_err(), BusinessError::InvalidIsbn));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_fetch_or_create_is_idempotent_per_isbn() {
    let pool = common::create_test_pool().await;
    let metadata = Arc::new(MockBookMetadataClient::new());
    let service = catalog_service(&pool, metadata.clone());

    let isbn = unique_isbn();
    metadata.add_book(metadata_for(&isbn));

    let first = service.fetch_or_create_information(&isbn).await.unwrap();
    assert_eq!(first.title, "Programming Rust");

    // 2回目は外部APIを引かず既存レコードを返す
    let second = service.fetch_or_create_information(&isbn).await.unwrap();
    assert_eq!(second.id, first.id);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_unknown_isbn_maps_to_not_found() {
    let pool = common::create_test_pool().await;
    let service = catalog_service(&pool, Arc::new(MockBookMetadataClient::new()));

    let result = service.fetch_or_create_information(&unique_isbn()).await;
    assert!(matches!(result.unwrap_err(), BusinessError::BookInfoNotFound));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_qr_code_is_issued_once_per_item() {
    let pool = common::create_test_pool().await;
    let metadata = Arc::new(MockBookMetadataClient::new());
    let service = catalog_service(&pool, metadata.clone());

    let isbn = unique_isbn();
    metadata.add_book(metadata_for(&isbn));

    let (item, _info) = service.create_item(&isbn).await.unwrap();

    let qr = service.create_qr_code(item.id).await.unwrap();
    assert!(qr.qr_value.ends_with(&format!("/{}", item.id.value())));

    let result = service.create_qr_code(item.id).await;
    assert!(matches!(result.unwrap_err(), BusinessError::DuplicateQrCode));

    // QR値から蔵書を逆引きできる
    let found = service.find_item_by_qr(&qr.qr_value).await.unwrap();
    assert_eq!(found.item.id, item.id);
}
