pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod panels;
pub mod store;
pub mod user;

#[cfg(test)]
mod testing;

pub use db::Database;
pub use error::{InputError, StoreError, StoreResult};
pub use notify::{BufferedNotifier, Notice, Notifier};
pub use store::{Record, RecordStore, SqliteStore};
pub use user::{UserContext, UserHandle};
