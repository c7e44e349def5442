//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) where rows are patched

pub mod domain;
pub mod grant;
pub mod job;
pub mod job_log;
pub mod member;
pub mod society;
pub mod status;
