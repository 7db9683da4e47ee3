pub mod api;
pub mod commands;
pub mod config;
pub mod database;
pub mod document;
pub mod index;
pub mod llm;
pub mod providers;
pub mod session;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used items
pub use config::Settings;
pub use session::{Session, SessionReply};
