//! 好きなサッカーチームの試合日程を Google カレンダーに同期する

pub mod auth;
pub mod calendar;
pub mod config;
pub mod error;
pub mod event;
pub mod fixtures;
pub mod selector;
pub mod sync;
pub mod teams;
pub mod utils;

pub use error::{Result, SyncError};
