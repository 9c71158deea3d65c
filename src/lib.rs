pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod scheduler;
pub mod types;
