//! # Postmate Core
//!
//! Post lifecycle, conversation handling and publishing for Postmate.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
