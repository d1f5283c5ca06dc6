//! Conversation session storage.

mod memory;

pub use memory::InMemoryConversationSessions;
