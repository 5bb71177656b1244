pub mod book_information;
pub mod book_items;
pub mod chatbot_feedbacks;
pub mod favorites;
pub mod histories;
pub mod notices;
pub mod notifications;
pub mod policy;
pub mod qna;
pub mod qr_codes;
pub mod shelves;
pub mod users;

pub use book_information::BookInformationRepository;
pub use book_items::{BookItemRepository, BookItemSummary};
pub use chatbot_feedbacks::{ChatbotFeedback, ChatbotFeedbackRepository};
pub use favorites::{FavoriteRepository, FavoriteView};
pub use histories::{AdminBorrowSummary, BookHistoryRepository, BorrowSummary, RankedBook};
pub use notices::{Notice, NoticeRepository};
pub use notifications::NotificationRepository;
pub use policy::LoanPolicyRepository;
pub use qna::{Qna, QnaComment, QnaRepository};
pub use qr_codes::{QrCode, QrCodeRepository};
pub use shelves::ShelfRepository;
pub use users::UserRepository;
