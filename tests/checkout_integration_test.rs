use chrono::{Duration, Utc};
use sqlx::PgPool;

use smart_library::adapters::postgres::{
    BookHistoryRepository, BookInformationRepository, BookItemRepository, FavoriteRepository,
    LoanPolicyRepository, NotificationRepository, UserRepository,
};
use smart_library::application::BusinessError;
use smart_library::application::checkout::CheckoutService;
use smart_library::application::favorites::{FavoriteService, FavoriteToggle};
use smart_library::domain::book::{BookStatus, NewBookInformation};
use smart_library::domain::checkout::NewLoan;
use smart_library::domain::user::{NewUser, Provider, Role, User};
use smart_library::domain::{BookItemId, UserId};

mod common;

// ============================================================================
// 貸出エンジンの結合テスト（PostgreSQLが必要、cargo test -- --ignored で実行）
// ============================================================================

fn checkout_service(pool: &PgPool) -> CheckoutService {
    CheckoutService::new(
        pool.clone(),
        BookItemRepository::new(pool.clone()),
        BookHistoryRepository::new(pool.clone()),
        UserRepository::new(pool.clone()),
        LoanPolicyRepository::new(pool.clone()),
        FavoriteRepository::new(pool.clone()),
        NotificationRepository::new(pool.clone()),
    )
}

async fn seed_user(pool: &PgPool) -> User {
    let suffix = common::unique_suffix();
    UserRepository::new(pool.clone())
        .insert(&NewUser {
            email: format!("user-{}@corp.example", suffix),
            password_hash: Some("$2b$12$test".to_string()),
            user_name: Some("Test User".to_string()),
            company_id: Some(format!("EMP-{}", suffix)),
            role: Role::User,
            provider: Provider::Local,
        })
        .await
        .expect("failed to seed user")
}

async fn seed_item(pool: &PgPool) -> BookItemId {
    let suffix = common::unique_suffix();
    let info = BookInformationRepository::new(pool.clone())
        .insert(&NewBookInformation {
            title: format!("Seeded Title {}", suffix),
            author: "Seeded Author".to_string(),
            publisher: None,
            isbn: format!("979{}", &suffix.replace('-', "")[..10]),
            published_at: None,
            image: None,
            description: None,
            category: None,
        })
        .await
        .expect("failed to seed book information");

    BookItemRepository::new(pool.clone())
        .insert(info.id)
        .await
        .expect("failed to seed book item")
        .id
}

/// 貸出日を過去に差し替えたオープンな履歴を作る（延滞判定用）
async fn seed_open_loan(pool: &PgPool, user_id: UserId, item_id: BookItemId, days_ago: i64) -> i32 {
    let mut conn = pool.acquire().await.unwrap();
    let history = BookHistoryRepository::new(pool.clone())
        .insert_open(
            &mut conn,
            &NewLoan {
                book_item_id: item_id,
                user_id,
                borrowed_at: Utc::now() - Duration::days(days_ago),
            },
        )
        .await
        .expect("failed to seed open loan");

    BookItemRepository::new(pool.clone())
        .mark_borrowed(&mut conn, item_id)
        .await
        .unwrap();

    history.id.value()
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_borrow_flips_status_and_opens_history() {
    let pool = common::create_test_pool().await;
    let service = checkout_service(&pool);

    let user = seed_user(&pool).await;
    let item_id = seed_item(&pool).await;

    let receipt = service.borrow(user.id, item_id).await.unwrap();
    assert!(receipt.history.is_open());
    assert_eq!(receipt.history.book_item_id, item_id);

    let item = BookItemRepository::new(pool.clone())
        .find_by_id(item_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.status, BookStatus::Borrowed);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_second_borrow_fails_with_conflict() {
    let pool = common::create_test_pool().await;
    let service = checkout_service(&pool);

    let first = seed_user(&pool).await;
    let second = seed_user(&pool).await;
    let item_id = seed_item(&pool).await;

    service.borrow(first.id, item_id).await.unwrap();

    let result = service.borrow(second.id, item_id).await;
    assert!(matches!(
        result.unwrap_err(),
        BusinessError::BookAlreadyBorrowed
    ));

    // 敗者側の履歴は作られない
    let mut conn = pool.acquire().await.unwrap();
    let open = BookHistoryRepository::new(pool.clone())
        .count_open_by_user(&mut conn, second.id)
        .await
        .unwrap();
    assert_eq!(open, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_borrow_limit_boundary() {
    let pool = common::create_test_pool().await;
    let service = checkout_service(&pool);
    let user = seed_user(&pool).await;

    // 既定ポリシーは maxBooks = 5。4冊まで借りた状態で5冊目は成功する
    for _ in 0..4 {
        let item_id = seed_item(&pool).await;
        service.borrow(user.id, item_id).await.unwrap();
    }

    let fifth = seed_item(&pool).await;
    service.borrow(user.id, fifth).await.unwrap();

    // 6冊目は上限超過
    let sixth = seed_item(&pool).await;
    let result = service.borrow(user.id, sixth).await;
    assert!(matches!(
        result.unwrap_err(),
        BusinessError::BorrowLimitExceeded
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_borrow_deleted_item_is_not_found() {
    let pool = common::create_test_pool().await;
    let service = checkout_service(&pool);

    let user = seed_user(&pool).await;
    let item_id = seed_item(&pool).await;

    BookItemRepository::new(pool.clone())
        .soft_delete(item_id)
        .await
        .unwrap();

    let result = service.borrow(user.id, item_id).await;
    assert!(matches!(
        result.unwrap_err(),
        BusinessError::BookItemNotFound
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_return_computes_overdue_on_boundary() {
    let pool = common::create_test_pool().await;
    let service = checkout_service(&pool);
    let user = seed_user(&pool).await;

    // 既定ポリシーは loanPeriod = 14日。14日ちょうどは延滞ではない
    let on_time_item = seed_item(&pool).await;
    let on_time = seed_open_loan(&pool, user.id, on_time_item, 14).await;
    let receipt = service
        .return_by_history(smart_library::domain::HistoryId::from_raw(on_time))
        .await
        .unwrap();
    assert!(!receipt.overdue);

    // 20日経過は延滞
    let late_item = seed_item(&pool).await;
    let late = seed_open_loan(&pool, user.id, late_item, 20).await;
    let receipt = service
        .return_by_history(smart_library::domain::HistoryId::from_raw(late))
        .await
        .unwrap();
    assert!(receipt.overdue);

    // 返却で蔵書はAVAILABLEに戻る
    let item = BookItemRepository::new(pool.clone())
        .find_by_id(late_item)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.status, BookStatus::Available);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_double_return_is_not_found() {
    let pool = common::create_test_pool().await;
    let service = checkout_service(&pool);

    let user = seed_user(&pool).await;
    let item_id = seed_item(&pool).await;

    let receipt = service.borrow(user.id, item_id).await.unwrap();
    service.return_by_history(receipt.history.id).await.unwrap();

    let result = service.return_by_history(receipt.history.id).await;
    assert!(matches!(result.unwrap_err(), BusinessError::HistoryNotFound));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_return_of_deleted_item_still_succeeds() {
    let pool = common::create_test_pool().await;
    let service = checkout_service(&pool);

    let user = seed_user(&pool).await;
    let item_id = seed_item(&pool).await;

    let receipt = service.borrow(user.id, item_id).await.unwrap();

    // 貸出中に除籍されても返却は成立する
    BookItemRepository::new(pool.clone())
        .soft_delete(item_id)
        .await
        .unwrap();

    let result = service.return_by_history(receipt.history.id).await;
    assert!(result.is_ok());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_favorite_toggle_twice_leaves_no_rows() {
    let pool = common::create_test_pool().await;

    let favorites = FavoriteService::new(
        FavoriteRepository::new(pool.clone()),
        BookItemRepository::new(pool.clone()),
    );

    let user = seed_user(&pool).await;
    let item_id = seed_item(&pool).await;

    assert_eq!(
        favorites.toggle(user.id, item_id).await.unwrap(),
        FavoriteToggle::Added
    );
    assert_eq!(
        favorites.toggle(user.id, item_id).await.unwrap(),
        FavoriteToggle::Removed
    );

    assert_eq!(favorites.count_for_item(item_id).await.unwrap(), 0);
    assert!(!favorites.is_favorite(user.id, item_id).await.unwrap());
}
