pub mod chat;

pub use chat::{ChatEngine, ChatTurn, Role};
