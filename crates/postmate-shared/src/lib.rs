//! # Postmate Shared
//!
//! Wire types for the management API and the WhatsApp webhook.

pub mod dto;
pub mod response;
pub mod webhook;

pub use response::{ApiResponse, ErrorResponse};
