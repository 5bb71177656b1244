pub mod http;
pub mod mock;
pub mod postgres;
pub mod redis;
