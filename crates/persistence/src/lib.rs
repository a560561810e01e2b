//! Habit League Persistence - Local session store and caching layer

pub mod cache;
pub mod encryption;
pub mod sqlite;

pub use encryption::{SealedToken, SessionCipher};
pub use sqlite::Database;
