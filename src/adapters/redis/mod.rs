pub mod snapshot_store;
pub mod token_store;

pub use snapshot_store::RedisSnapshotStore;
pub use token_store::RedisTokenStore;
