//! Data Transfer Objects for REST request/response serialization.
//!
//! Identifiers cross the wire as plain integers.

pub mod list_dto;
pub mod system_dto;

pub use list_dto::*;
pub use system_dto::*;
