//! Post storage that needs no database.

mod memory;

pub use memory::InMemoryPostStore;
