//! Core conversation engine

pub mod chat;

pub use chat::{ChatEngine, ChatError};
