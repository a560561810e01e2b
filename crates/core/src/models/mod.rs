//! Data models for Habit League entities

mod achievement;
mod challenge;
mod evidence;
mod payment;
mod user;

pub use achievement::*;
pub use challenge::*;
pub use evidence::*;
pub use payment::*;
pub use user::*;
