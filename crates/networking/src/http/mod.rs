//! HTTP transport for the Habit League backend

mod client;
mod config;

pub use client::HabitLeagueClient;
pub use config::ClientConfig;
