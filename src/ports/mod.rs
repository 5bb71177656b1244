pub mod book_metadata;
pub mod chatbot;
pub mod profile_client;
pub mod snapshot_store;
pub mod token_store;

pub use book_metadata::{BookMetadata, BookMetadataClient};
pub use chatbot::{ChatQuery, ChatReply, ChatbotClient};
pub use profile_client::ProfileClient;
pub use snapshot_store::SnapshotStore;
pub use token_store::TokenStore;
