use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, auth, books, chatbot, checkout, favorites, iot, notices, notifications, policy, qna,
    recommendations, shelves, users,
};

/// Creates the API router with all resource endpoints
///
/// Routes under /api/admin require the ADMIN role; other /api routes
/// require authentication unless they are public reads.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Authentication
        .route("/api/auth/signup", post(auth::sign_up))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/reissue", post(auth::reissue))
        .route("/api/auth/oauth2/complete", post(auth::complete_oauth2_signup))
        .route("/api/auth/oauth2/:provider", post(auth::oauth2_login))
        .route("/api/users/me", get(users::me))
        // Catalog
        .route("/api/books", get(books::search_books))
        .route("/api/books/qrcodes/scan", get(books::scan_qr_code))
        .route("/api/books/info/:id", get(books::get_book_information))
        .route("/api/books/:id", get(books::get_book))
        .route("/api/books/:id/qrcodes", get(books::get_qr_code))
        .route("/api/books/:id/location", post(books::show_book_location))
        .route("/api/admin/books", post(books::acquire_book))
        .route("/api/admin/books/:id", delete(books::delete_book))
        .route("/api/admin/books/:id/status", patch(books::update_book_status))
        .route("/api/admin/books/:id/qrcodes", post(books::create_qr_code))
        // Checkout
        .route("/api/borrow", post(checkout::borrow_book))
        .route("/api/borrow/current", get(checkout::current_borrows))
        .route("/api/borrow/history", get(checkout::user_history))
        .route("/api/return", post(checkout::return_book))
        .route("/api/admin/borrow/history", get(checkout::admin_history))
        .route("/api/admin/overdue/sweep", post(checkout::sweep_overdue))
        .route(
            "/api/admin/reminders/return-deadline",
            post(checkout::remind_return_deadlines),
        )
        // Engagement
        .route("/api/favorites", get(favorites::list_favorites))
        .route("/api/favorites/:book_item_id", post(favorites::toggle_favorite))
        .route("/api/favorites/:book_item_id/count", get(favorites::favorite_count))
        .route("/api/notifications", get(notifications::list_notifications))
        .route("/api/notifications/unread", get(notifications::has_unread))
        .route(
            "/api/notifications/:id",
            get(notifications::get_notification).delete(notifications::delete_notification),
        )
        .route("/api/notifications/:id/read", patch(notifications::mark_read))
        .route("/api/notices", get(notices::list_notices))
        .route("/api/notices/:id", get(notices::get_notice))
        .route("/api/admin/notices", post(notices::create_notice))
        .route(
            "/api/admin/notices/:id",
            put(notices::update_notice).delete(notices::delete_notice),
        )
        .route("/api/qna", get(qna::list_qna).post(qna::create_qna))
        .route(
            "/api/qna/comments/:id",
            put(qna::update_comment).delete(qna::delete_comment),
        )
        .route(
            "/api/qna/:id",
            get(qna::get_qna).put(qna::update_qna).delete(qna::delete_qna),
        )
        .route("/api/qna/:id/comments", post(qna::add_comment))
        // Policy & shelves
        .route("/api/loan-policy", get(policy::get_policy))
        .route("/api/admin/loan-policy", put(policy::update_policy))
        .route("/api/admin/loan-policy/max-books", patch(policy::update_max_books))
        .route("/api/admin/loan-policy/loan-period", patch(policy::update_loan_period))
        .route("/api/shelves", get(shelves::list_shelves))
        .route("/api/admin/shelves", post(shelves::create_shelf))
        .route(
            "/api/admin/shelves/:id",
            put(shelves::update_shelf).delete(shelves::delete_shelf),
        )
        // Recommendations & chatbot
        .route("/api/recommendations", get(recommendations::recommendations))
        .route("/api/chatbot/messages", post(chatbot::send_message))
        .route("/api/chatbot/feedbacks", post(chatbot::submit_feedback))
        .route("/api/admin/chatbot/feedbacks", get(chatbot::list_feedback))
        .route(
            "/api/admin/chatbot/feedbacks/:id/resolve",
            patch(chatbot::resolve_feedback),
        )
        // IoT devices
        .route("/ws/iot", get(iot::iot_socket))
        .route("/api/admin/iot/snapshots/:device_id", get(iot::latest_snapshot))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
