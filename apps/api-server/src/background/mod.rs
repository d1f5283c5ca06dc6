//! Background jobs.

pub mod scheduler;
