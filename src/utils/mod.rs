//! Shared helpers for the feature modules.
//!
//! - [`auth_helpers`]: Course ownership checks used by instructor routes
//! - [`db_errors`]: Postgres error to HTTP status mapping
//! - [`email`]: SMTP email sending
//! - [`files`]: Best-effort removal of stored uploads
//! - [`search`]: Escaped `ILIKE` patterns for free-text filters

pub mod auth_helpers;
pub mod db_errors;
pub mod email;
pub mod files;
pub mod search;

#[cfg(test)]
pub mod test_helpers;
