pub mod book_metadata;
pub mod chatbot;
pub mod profile_client;
pub mod snapshot_store;
pub mod token_store;

pub use book_metadata::MockBookMetadataClient;
pub use chatbot::MockChatbotClient;
pub use profile_client::MockProfileClient;
pub use snapshot_store::MockSnapshotStore;
pub use token_store::MockTokenStore;
