/// Shared modules for the CryptoAI dashboard binaries
pub mod api;
pub mod config;
pub mod curve;
pub mod error;
pub mod format;
pub mod insights;
pub mod logging;
pub mod observer;
pub mod quotes;
pub mod random;
pub mod refresh;
pub mod types;
pub mod view;
pub mod widget;
